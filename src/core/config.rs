use std::{
    path::PathBuf,
    time::Duration,
};

use serde::{
    Deserialize,
    Serialize,
};

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_PLACEHOLDER_BASE: &str = "https://via.placeholder.com/1200x800";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioTimeouts {
    pub probe_ms: u64,
    pub reference_ms: u64,
    pub speech_ms: u64,
    /// Delay after which an idle synthesizer counts as having spoken.
    pub speech_idle_check_ms: u64,
}

impl Default for AudioTimeouts {
    fn default() -> Self {
        Self { probe_ms: 2000, reference_ms: 3000, speech_ms: 5000, speech_idle_check_ms: 100 }
    }
}

impl AudioTimeouts {
    pub fn probe(&self) -> Duration {
        Duration::from_millis(self.probe_ms)
    }

    pub fn reference(&self) -> Duration {
        Duration::from_millis(self.reference_ms)
    }

    pub fn speech(&self) -> Duration {
        Duration::from_millis(self.speech_ms)
    }

    pub fn speech_idle_check(&self) -> Duration {
        Duration::from_millis(self.speech_idle_check_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio_dir: PathBuf,
    pub image_dir: PathBuf,
    /// Replaces the built-in scene catalog when set.
    pub catalog_path: Option<PathBuf>,
    /// Pre-built audio manifest; built from `audio_dir` when absent.
    pub manifest_path: Option<PathBuf>,
    /// Probe filename variants at play time for words missing from the manifest.
    pub guess_unmapped_audio: bool,
    pub player_command: Vec<String>,
    /// Speech program and arguments; `{text}`, `{wpm}` and `{lang}` are substituted per utterance.
    pub speech_command: Vec<String>,
    pub speech_rate: f32,
    pub speech_lang: String,
    pub timeouts: AudioTimeouts,
    pub resize_debounce_ms: u64,
    /// A scene image not loaded within this time is replaced by the placeholder.
    pub image_load_timeout_ms: u64,
    pub placeholder_base: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("assets/audio"),
            image_dir: PathBuf::from("assets/images"),
            catalog_path: None,
            manifest_path: None,
            guess_unmapped_audio: true,
            player_command: vec![
                "mpv".to_string(),
                "--no-video".to_string(),
                "--really-quiet".to_string(),
            ],
            speech_command: ["espeak", "-s", "{wpm}", "-v", "{lang}", "{text}"]
                .iter()
                .map(|arg| arg.to_string())
                .collect(),
            speech_rate: 0.8,
            speech_lang: "en-us".to_string(),
            timeouts: AudioTimeouts::default(),
            resize_debounce_ms: 100,
            image_load_timeout_ms: 8000,
            placeholder_base: DEFAULT_PLACEHOLDER_BASE.to_string(),
        }
    }
}

impl AppConfig {
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn image_load_timeout(&self) -> Duration {
        Duration::from_millis(self.image_load_timeout_ms)
    }
}
