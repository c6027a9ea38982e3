use std::{
    fmt,
    path::{
        Path,
        PathBuf,
    },
    sync::Arc,
};

use serde::Serialize;
use tokio::time::{
    sleep,
    timeout,
};
use tracing::{
    debug,
    info,
    warn,
};

use super::{
    backend::{
        LoadSignal,
        MediaBackend,
        Notice,
        Notifier,
        SpeechSignal,
        SpeechSynthesizer,
        Utterance,
    },
    candidates::candidate_paths,
    manifest::AudioManifest,
};
use crate::core::{
    utils::word_from_reference,
    AudioTimeouts,
};

const SPEECH_VOLUME: f32 = 0.8;

/// The fallback tier that produced sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioTier {
    Local,
    Reference,
    Speech,
}

impl fmt::Display for AudioTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AudioTier::Local => "local asset",
            AudioTier::Reference => "provided reference",
            AudioTier::Speech => "speech synthesis",
        };
        write!(f, "{}", name)
    }
}

/// Turns a word into sound: local asset, then the provided reference, then
/// speech synthesis. Emits a single notice when all of them fail.
pub struct AudioResolver {
    media: Arc<dyn MediaBackend>,
    speech: Arc<dyn SpeechSynthesizer>,
    notifier: Arc<dyn Notifier>,
    manifest: AudioManifest,
    audio_dir: PathBuf,
    guess_unmapped: bool,
    timeouts: AudioTimeouts,
    speech_rate: f32,
    speech_lang: String,
}

impl AudioResolver {
    pub fn new(
        media: Arc<dyn MediaBackend>,
        speech: Arc<dyn SpeechSynthesizer>,
        notifier: Arc<dyn Notifier>,
        timeouts: AudioTimeouts,
    ) -> Self {
        Self {
            media,
            speech,
            notifier,
            manifest: AudioManifest::default(),
            audio_dir: PathBuf::from("."),
            guess_unmapped: true,
            timeouts,
            speech_rate: 0.8,
            speech_lang: "en-us".to_string(),
        }
    }

    pub fn with_manifest(mut self, manifest: AudioManifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_audio_dir(mut self, audio_dir: impl Into<PathBuf>, guess_unmapped: bool) -> Self {
        self.audio_dir = audio_dir.into();
        self.guess_unmapped = guess_unmapped;
        self
    }

    pub fn with_voice(mut self, rate: f32, lang: impl Into<String>) -> Self {
        self.speech_rate = rate;
        self.speech_lang = lang.into();
        self
    }

    pub fn manifest(&self) -> &AudioManifest {
        &self.manifest
    }

    /// Returns true when something audible happened.
    pub async fn resolve(&self, word: &str, reference: Option<&str>) -> bool {
        self.resolve_tier(word, reference).await.is_some()
    }

    pub async fn resolve_tier(&self, word: &str, reference: Option<&str>) -> Option<AudioTier> {
        let reference = reference.map(str::trim).filter(|reference| !reference.is_empty());
        let word = match word.trim() {
            "" => reference.map(word_from_reference).unwrap_or_default(),
            word => word.to_string(),
        };

        let tier = self.run_tiers(&word, reference).await;
        match tier {
            Some(tier) => info!("Played '{}' via {}", word, tier),
            None => {
                warn!("No audio available for '{}'", word);
                self.notifier.notify(Notice::AudioUnavailable { word });
            }
        }
        tier
    }

    async fn run_tiers(&self, word: &str, reference: Option<&str>) -> Option<AudioTier> {
        if !word.is_empty() && self.try_local(word).await {
            return Some(AudioTier::Local);
        }
        if let Some(reference) = reference {
            if self.try_reference(reference).await {
                return Some(AudioTier::Reference);
            }
        }
        if !word.is_empty() && self.try_speech(word).await {
            return Some(AudioTier::Speech);
        }
        None
    }

    /// Stops media playback and cancels speech in progress.
    pub fn stop_all(&self) {
        self.media.stop();
        if self.speech.is_speaking() {
            self.speech.cancel();
        }
    }

    fn local_sources(&self, word: &str) -> Vec<String> {
        match self.manifest.lookup(word) {
            Some(path) => vec![path_source(path)],
            None if self.guess_unmapped => {
                candidate_paths(&self.audio_dir, word).iter().map(|path| path_source(path)).collect()
            }
            None => Vec::new(),
        }
    }

    async fn try_local(&self, word: &str) -> bool {
        for source in self.local_sources(word) {
            match timeout(self.timeouts.probe(), self.media.load(&source)).await {
                Ok(LoadSignal::Ready) => {}
                Ok(LoadSignal::Failed(reason)) => {
                    debug!("Candidate {} failed: {}", source, reason);
                    continue;
                }
                Err(_) => {
                    debug!("Candidate {} timed out", source);
                    continue;
                }
            }

            match self.media.play(&source).await {
                Ok(()) => {
                    debug!("Playing local audio {}", source);
                    return true;
                }
                Err(e) => debug!("Playback of {} failed: {}", source, e),
            }
        }
        false
    }

    async fn try_reference(&self, reference: &str) -> bool {
        let source = self.reference_source(reference);
        let attempt = async {
            match self.media.load(&source).await {
                LoadSignal::Ready => self.media.play(&source).await.is_ok(),
                LoadSignal::Failed(reason) => {
                    debug!("Reference {} failed: {}", source, reason);
                    false
                }
            }
        };

        match timeout(self.timeouts.reference(), attempt).await {
            Ok(played) => played,
            Err(_) => {
                debug!("Reference {} timed out", source);
                false
            }
        }
    }

    /// URLs and existing paths are used as given; other references are relative to the audio directory.
    fn reference_source(&self, reference: &str) -> String {
        if is_remote(reference) || Path::new(reference).exists() {
            reference.to_string()
        } else {
            path_source(&self.audio_dir.join(reference))
        }
    }

    async fn try_speech(&self, word: &str) -> bool {
        if self.speech.is_speaking() {
            self.speech.cancel();
        }

        let mut utterance = Utterance::new(word, self.speech_lang.clone(), self.speech_rate);
        utterance.volume = SPEECH_VOLUME;

        let mut spoken = self.speech.speak(&utterance);
        let deadline = sleep(self.timeouts.speech());
        let idle_check = sleep(self.timeouts.speech_idle_check());
        tokio::pin!(deadline, idle_check);
        let mut idle_checked = false;

        loop {
            tokio::select! {
                signal = &mut spoken => {
                    return match signal {
                        SpeechSignal::Ended => true,
                        SpeechSignal::Failed(reason) => {
                            debug!("Speech for '{}' failed: {}", word, reason);
                            false
                        }
                    };
                }
                _ = &mut deadline => {
                    debug!("Speech for '{}' timed out", word);
                    return false;
                }
                _ = &mut idle_check, if !idle_checked => {
                    idle_checked = true;
                    // Synthesizers that finish without signalling report idle here.
                    if !self.speech.is_speaking() {
                        return true;
                    }
                }
            }
        }
    }
}

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn path_source(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
