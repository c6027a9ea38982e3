use thiserror::Error;

#[derive(Error, Debug)]
pub enum PointLearnError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HJson error: {0}")]
    HJson(#[from] serde_hjson::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("Invalid word status: {0}")]
    InvalidStatus(String),

    #[error("Invalid display mode: {0}")]
    InvalidMode(String),

    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    #[error("Word not found in scene {scene}: {word}")]
    WordNotFound { scene: String, word: String },

    #[error("Duplicate scene id in catalog: {0}")]
    DuplicateScene(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Invalid size, expected WIDTHxHEIGHT: {0}")]
    InvalidSize(String),

    #[error("PointLearnError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for PointLearnError {
    fn from(error: std::io::Error) -> Self {
        PointLearnError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for PointLearnError {
    fn from(error: reqwest::Error) -> Self {
        PointLearnError::Reqwest(Box::new(error))
    }
}
