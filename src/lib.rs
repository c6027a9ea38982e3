pub mod app;
pub mod audio;
pub mod catalog;
pub mod core;
pub mod display;
pub mod layout;
pub mod metrics;
pub mod persistence;
pub mod player;
pub mod progress;

pub use crate::{
    app::AppContext,
    catalog::SceneCatalog,
    core::{
        AppConfig,
        PointLearnError,
        Scene,
        VocabularyEntry,
        WordStatus,
    },
    metrics::Metrics,
    progress::ProgressStore,
};
