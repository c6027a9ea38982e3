pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod utils;

pub use config::{
    AppConfig,
    AudioTimeouts,
};
pub use errors::PointLearnError;
pub use models::{
    Percent,
    Position,
    Scene,
    VocabularyEntry,
    WordStatus,
};
