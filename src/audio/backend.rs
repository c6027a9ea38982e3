use futures::future::BoxFuture;

use crate::core::PointLearnError;

/// What a media backend reports after being asked to load a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSignal {
    /// Enough data is available to play to the end.
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechSignal {
    Ended,
    Failed(String),
}

/// Plays audio files or URLs. One source plays at a time.
pub trait MediaBackend: Send + Sync {
    /// Resolves once the source is playable or known to be broken. May never
    /// resolve; callers bound it with a timeout.
    fn load<'a>(&'a self, source: &'a str) -> BoxFuture<'a, LoadSignal>;

    /// Starts playback of a source previously reported as ready.
    fn play<'a>(&'a self, source: &'a str) -> BoxFuture<'a, Result<(), PointLearnError>>;

    fn stop(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    /// Relative speaking rate, `1.0` being the synthesizer's normal speed.
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>, lang: impl Into<String>, rate: f32) -> Self {
        Self { text: text.into(), lang: lang.into(), rate, pitch: 1.0, volume: 1.0 }
    }
}

pub trait SpeechSynthesizer: Send + Sync {
    fn speak<'a>(&'a self, utterance: &'a Utterance) -> BoxFuture<'a, SpeechSignal>;

    fn is_speaking(&self) -> bool;

    fn cancel(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Every audio source failed for this word.
    AudioUnavailable { word: String },
}

/// Surfaces user-facing notices. Must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
