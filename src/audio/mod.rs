pub mod backend;
pub mod candidates;
pub mod manifest;
pub mod resolver;

pub use backend::{
    LoadSignal,
    MediaBackend,
    Notice,
    Notifier,
    SpeechSignal,
    SpeechSynthesizer,
    Utterance,
};
pub use candidates::{
    candidate_file_names,
    candidate_paths,
};
pub use manifest::{
    AudioManifest,
    ManifestReport,
};
pub use resolver::{
    is_remote,
    AudioResolver,
    AudioTier,
};
