pub mod home;
pub mod scene_page;

use std::{
    path::Path,
    sync::Arc,
    time::Instant,
};

use tracing::{
    info,
    warn,
};

pub use home::{
    HomePage,
    SceneCard,
};
pub use scene_page::{
    FilterCounts,
    HotspotView,
    ScenePage,
    WordFilter,
};

use crate::{
    audio::{
        AudioManifest,
        AudioResolver,
        AudioTier,
    },
    catalog::{
        scene_image,
        ImageSource,
        SceneCatalog,
    },
    core::{
        config::CONFIG_FILE,
        AppConfig,
        PointLearnError,
        Scene,
    },
    metrics::Metrics,
    persistence::{
        load_json_or_default,
        FileStorage,
        KeyValueStorage,
    },
    player::build_resolver,
    progress::ProgressStore,
};

/// Everything a page needs, built once at startup and passed down explicitly.
pub struct AppContext {
    pub config: AppConfig,
    pub catalog: Arc<SceneCatalog>,
    pub progress: ProgressStore,
    pub resolver: AudioResolver,
    pub metrics: Metrics,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        catalog: Arc<SceneCatalog>,
        storage: Box<dyn KeyValueStorage>,
        resolver: AudioResolver,
    ) -> Self {
        let progress = ProgressStore::new(Arc::clone(&catalog), storage);
        Self { config, catalog, progress, resolver, metrics: Metrics::new() }
    }

    /// Production wiring: file-backed progress in `data_dir` and process-backed audio.
    pub fn load(config: AppConfig, data_dir: &Path) -> Result<Self, PointLearnError> {
        let catalog = Arc::new(load_catalog(&config)?);
        let manifest = load_manifest(&config, &catalog);
        let resolver = build_resolver(&config, manifest)?;
        let storage = Box::new(FileStorage::new(data_dir));

        info!("Loaded {} scenes, progress stored in {}", catalog.len(), data_dir.display());
        Ok(Self::new(config, catalog, storage, resolver))
    }

    pub fn scene_image(&self, scene: &Scene) -> Result<ImageSource, PointLearnError> {
        scene_image(scene, &self.config.image_dir, &self.config.placeholder_base)
    }

    /// Runs the audio fallback chain for `word` and records how long it took.
    pub async fn play_word(&self, word: &str, reference: Option<&str>) -> Option<AudioTier> {
        let started = Instant::now();
        let tier = self.resolver.resolve_tier(word, reference).await;
        self.metrics.record_audio(word, tier, started.elapsed());
        if tier.is_none() {
            self.metrics.record_error("audio", format!("No audio for {}", word));
        }
        tier
    }
}

pub fn load_config(data_dir: &Path) -> AppConfig {
    load_json_or_default(&data_dir.join(CONFIG_FILE))
}

pub fn load_catalog(config: &AppConfig) -> Result<SceneCatalog, PointLearnError> {
    match &config.catalog_path {
        Some(path) => SceneCatalog::load(path),
        None => SceneCatalog::builtin(),
    }
}

/// Reads the configured manifest file, building from the audio directory when absent or unreadable.
pub fn load_manifest(config: &AppConfig, catalog: &SceneCatalog) -> AudioManifest {
    if let Some(path) = config.manifest_path.as_deref().filter(|path| path.is_file()) {
        match AudioManifest::load(path) {
            Ok(manifest) => return manifest,
            Err(e) => warn!("Failed to load audio manifest {}: {}", path.display(), e),
        }
    }
    AudioManifest::build(catalog, &config.audio_dir).manifest
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Mutex,
    };

    use futures::future::{
        self,
        BoxFuture,
    };

    use super::*;
    use crate::{
        audio::{
            LoadSignal,
            MediaBackend,
            Notice,
            Notifier,
            SpeechSignal,
            SpeechSynthesizer,
            Utterance,
        },
        catalog::test_catalog,
        persistence::MemoryStorage,
    };

    /// Media that plays nothing; speech that always succeeds.
    #[derive(Default)]
    pub struct SilentMedia {
        pub stops: AtomicUsize,
    }

    impl MediaBackend for SilentMedia {
        fn load<'a>(&'a self, _source: &'a str) -> BoxFuture<'a, LoadSignal> {
            Box::pin(future::ready(LoadSignal::Failed("no media".to_string())))
        }

        fn play<'a>(&'a self, _source: &'a str) -> BoxFuture<'a, Result<(), PointLearnError>> {
            Box::pin(future::ready(Err(PointLearnError::Audio("no media".to_string()))))
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    pub struct EchoSpeech {
        pub spoken: Mutex<Vec<String>>,
    }

    impl SpeechSynthesizer for EchoSpeech {
        fn speak<'a>(&'a self, utterance: &'a Utterance) -> BoxFuture<'a, SpeechSignal> {
            self.spoken.lock().unwrap().push(utterance.text.clone());
            Box::pin(future::ready(SpeechSignal::Ended))
        }

        fn is_speaking(&self) -> bool {
            false
        }

        fn cancel(&self) {}
    }

    struct NullNotifier;

    impl Notifier for NullNotifier {
        fn notify(&self, _notice: Notice) {}
    }

    pub struct TestApp {
        pub context: AppContext,
        pub media: Arc<SilentMedia>,
        pub speech: Arc<EchoSpeech>,
    }

    pub fn test_app() -> TestApp {
        let media = Arc::new(SilentMedia::default());
        let speech = Arc::new(EchoSpeech::default());
        let config = AppConfig { guess_unmapped_audio: false, ..AppConfig::default() };
        let resolver = AudioResolver::new(
            media.clone(),
            speech.clone(),
            Arc::new(NullNotifier),
            config.timeouts.clone(),
        );
        let context = AppContext::new(
            config,
            Arc::new(test_catalog()),
            Box::new(MemoryStorage::new()),
            resolver,
        );
        TestApp { context, media, speech }
    }
}
