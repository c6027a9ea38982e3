use std::{
    fmt,
    str::FromStr,
};

use serde::{
    Deserialize,
    Serialize,
};

use super::{
    utils::word_key,
    PointLearnError,
};

/// A percentage coordinate, always within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(f64);

impl Percent {
    pub const MIDPOINT: Percent = Percent(50.0);

    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && (0.0..=100.0).contains(&value) {
            Some(Percent(value))
        } else {
            None
        }
    }

    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIDPOINT;
        }
        Percent(value.clamp(0.0, 100.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn fraction(self) -> f64 {
        self.0 / 100.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: Percent,
    pub y: Percent,
}

impl Position {
    pub const CENTER: Position = Position { x: Percent::MIDPOINT, y: Percent::MIDPOINT };
}

impl Default for Position {
    fn default() -> Self {
        Self::CENTER
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyEntry {
    pub word: String,
    pub phonetic: String,
    pub translation: String,
    pub audio_ref: String,
    pub position: Position,
    /// Normalized progress key, derived once from `word`.
    key: String,
}

impl VocabularyEntry {
    pub fn new(
        word: impl Into<String>,
        phonetic: impl Into<String>,
        translation: impl Into<String>,
        audio_ref: impl Into<String>,
        position: Position,
    ) -> Self {
        let word = word.into();
        let key = word_key(&word);
        Self {
            word,
            phonetic: phonetic.into(),
            translation: translation.into(),
            audio_ref: audio_ref.into(),
            position,
            key,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: String,
    pub name: String,
    pub localized_name: Option<String>,
    pub image_path: String,
    /// Hex colour (no `#`) used for the placeholder image.
    pub color: Option<String>,
    pub vocabulary: Vec<VocabularyEntry>,
}

impl Scene {
    pub fn entry(&self, word: &str) -> Option<&VocabularyEntry> {
        let key = word_key(word);
        self.vocabulary.iter().find(|entry| entry.key() == key)
    }

    pub fn display_name(&self) -> &str {
        self.localized_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    #[default]
    Unmarked,
    Known,
    Unknown,
}

impl WordStatus {
    pub const ALL: [WordStatus; 3] = [WordStatus::Unmarked, WordStatus::Known, WordStatus::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            WordStatus::Unmarked => "unmarked",
            WordStatus::Known => "known",
            WordStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WordStatus {
    type Err = PointLearnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unmarked" => Ok(WordStatus::Unmarked),
            "known" => Ok(WordStatus::Known),
            "unknown" => Ok(WordStatus::Unknown),
            other => Err(PointLearnError::InvalidStatus(other.to_string())),
        }
    }
}
