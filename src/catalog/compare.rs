use std::fmt;

use super::SceneCatalog;
use crate::core::VocabularyEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// A difference between two catalogs that needs an explicit decision.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogDivergence {
    SceneOnlyIn { side: Side, scene: String },
    WordOnlyIn { side: Side, scene: String, word: String },
    /// Same word spelled with different casing.
    WordCasing { scene: String, left: String, right: String },
    AudioRef { scene: String, word: String, left: String, right: String, case_only: bool },
    Position { scene: String, word: String },
    Text { scene: String, word: String, field: &'static str },
}

impl fmt::Display for CatalogDivergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogDivergence::SceneOnlyIn { side, scene } => {
                write!(f, "scene '{}' only in {:?} catalog", scene, side)
            }
            CatalogDivergence::WordOnlyIn { side, scene, word } => {
                write!(f, "[{}] '{}' only in {:?} catalog", scene, word, side)
            }
            CatalogDivergence::WordCasing { scene, left, right } => {
                write!(f, "[{}] word casing differs: '{}' vs '{}'", scene, left, right)
            }
            CatalogDivergence::AudioRef { scene, word, left, right, case_only } => {
                let kind = if *case_only { "audio casing" } else { "audio" };
                write!(f, "[{}] '{}' {} differs: '{}' vs '{}'", scene, word, kind, left, right)
            }
            CatalogDivergence::Position { scene, word } => {
                write!(f, "[{}] '{}' position differs", scene, word)
            }
            CatalogDivergence::Text { scene, word, field } => {
                write!(f, "[{}] '{}' {} differs", scene, word, field)
            }
        }
    }
}

/// Lists every difference between two catalogs. Nothing is merged.
pub fn compare_catalogs(left: &SceneCatalog, right: &SceneCatalog) -> Vec<CatalogDivergence> {
    let mut divergences = Vec::new();

    for scene in left.get_all() {
        let Some(other) = right.get_scene(&scene.id) else {
            divergences
                .push(CatalogDivergence::SceneOnlyIn { side: Side::Left, scene: scene.id.clone() });
            continue;
        };

        for entry in &scene.vocabulary {
            match other.vocabulary.iter().find(|candidate| candidate.key() == entry.key()) {
                Some(counterpart) => compare_entries(&scene.id, entry, counterpart, &mut divergences),
                None => divergences.push(CatalogDivergence::WordOnlyIn {
                    side: Side::Left,
                    scene: scene.id.clone(),
                    word: entry.word.clone(),
                }),
            }
        }

        for entry in &other.vocabulary {
            if !scene.vocabulary.iter().any(|candidate| candidate.key() == entry.key()) {
                divergences.push(CatalogDivergence::WordOnlyIn {
                    side: Side::Right,
                    scene: scene.id.clone(),
                    word: entry.word.clone(),
                });
            }
        }
    }

    for scene in right.get_all() {
        if left.get_scene(&scene.id).is_none() {
            divergences
                .push(CatalogDivergence::SceneOnlyIn { side: Side::Right, scene: scene.id.clone() });
        }
    }

    divergences
}

fn compare_entries(
    scene: &str,
    left: &VocabularyEntry,
    right: &VocabularyEntry,
    divergences: &mut Vec<CatalogDivergence>,
) {
    if left.word != right.word {
        divergences.push(CatalogDivergence::WordCasing {
            scene: scene.to_string(),
            left: left.word.clone(),
            right: right.word.clone(),
        });
    }

    if left.audio_ref != right.audio_ref {
        divergences.push(CatalogDivergence::AudioRef {
            scene: scene.to_string(),
            word: left.word.clone(),
            left: left.audio_ref.clone(),
            right: right.audio_ref.clone(),
            case_only: left.audio_ref.eq_ignore_ascii_case(&right.audio_ref),
        });
    }

    if left.position != right.position {
        divergences
            .push(CatalogDivergence::Position { scene: scene.to_string(), word: left.word.clone() });
    }

    for (field, a, b) in [
        ("phonetic", &left.phonetic, &right.phonetic),
        ("translation", &left.translation, &right.translation),
    ] {
        if a != b {
            divergences.push(CatalogDivergence::Text {
                scene: scene.to_string(),
                word: left.word.clone(),
                field,
            });
        }
    }
}
