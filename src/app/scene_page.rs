use std::{
    collections::BTreeSet,
    fmt,
    str::FromStr,
    sync::mpsc::Receiver,
    time::{
        Duration,
        Instant,
    },
};

use tracing::{
    debug,
    info,
    warn,
};

use super::AppContext;
use crate::{
    catalog::{
        placeholder_url,
        ImageSource,
    },
    core::{
        PointLearnError,
        Scene,
        VocabularyEntry,
        WordStatus,
    },
    display::{
        DisplayMode,
        DisplayModeController,
        LabelStack,
        ModeChange,
    },
    layout::{
        AspectClass,
        HotspotPlacement,
        ImageToken,
        ResponsiveLayout,
        Size,
    },
    progress::{
        ChannelListener,
        ProgressEvent,
        SubscriptionId,
    },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WordFilter {
    #[default]
    All,
    Unmarked,
    Known,
    Unknown,
}

impl WordFilter {
    pub const ALL: [WordFilter; 4] =
        [WordFilter::All, WordFilter::Unmarked, WordFilter::Known, WordFilter::Unknown];

    pub fn matches(&self, status: WordStatus) -> bool {
        match self {
            WordFilter::All => true,
            WordFilter::Unmarked => status == WordStatus::Unmarked,
            WordFilter::Known => status == WordStatus::Known,
            WordFilter::Unknown => status == WordStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WordFilter::All => "all",
            WordFilter::Unmarked => "unmarked",
            WordFilter::Known => "known",
            WordFilter::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WordFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WordFilter {
    type Err = PointLearnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WordFilter::ALL
            .into_iter()
            .find(|filter| filter.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| PointLearnError::Custom(format!("Invalid word filter: {}", s)))
    }
}

/// Counts shown on the filter tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub all: usize,
    pub unmarked: usize,
    pub known: usize,
    pub unknown: usize,
}

impl FilterCounts {
    pub fn get(&self, filter: WordFilter) -> usize {
        match filter {
            WordFilter::All => self.all,
            WordFilter::Unmarked => self.unmarked,
            WordFilter::Known => self.known,
            WordFilter::Unknown => self.unknown,
        }
    }
}

/// Everything needed to draw one hotspot.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotView {
    pub word: String,
    pub status: WordStatus,
    pub visible: bool,
    pub labels: LabelStack,
    pub placement: Option<HotspotPlacement>,
}

/// The active scene: its hotspots, label modes, word filter and layout.
pub struct ScenePage {
    scene: Option<Scene>,
    image: Option<ImageSource>,
    image_token: Option<ImageToken>,
    image_requested: Option<Instant>,
    filter: WordFilter,
    counts: FilterCounts,
    display: DisplayModeController,
    layout: ResponsiveLayout,
    subscription: Option<(SubscriptionId, Receiver<ProgressEvent>)>,
}

impl ScenePage {
    pub fn new(resize_delay: Duration) -> Self {
        Self {
            scene: None,
            image: None,
            image_token: None,
            image_requested: None,
            filter: WordFilter::All,
            counts: FilterCounts::default(),
            display: DisplayModeController::new(),
            layout: ResponsiveLayout::new(resize_delay),
            subscription: None,
        }
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn image(&self) -> Option<&ImageSource> {
        self.image.as_ref()
    }

    pub fn filter(&self) -> WordFilter {
        self.filter
    }

    pub fn counts(&self) -> FilterCounts {
        self.counts
    }

    pub fn active_modes(&self) -> &BTreeSet<DisplayMode> {
        self.display.active_modes()
    }

    /// Replaces the current scene. Display modes and the filter go back to their defaults
    /// and no placements exist until the new image reports loaded.
    pub fn load_scene(
        &mut self,
        context: &mut AppContext,
        scene_id: &str,
    ) -> Result<(), PointLearnError> {
        let started = Instant::now();
        match self.enter_scene(context, scene_id) {
            Ok(()) => {
                context.metrics.record_scene_load(scene_id, started.elapsed());
                Ok(())
            }
            Err(e) => {
                context.metrics.record_error("scene", &e);
                Err(e)
            }
        }
    }

    fn enter_scene(
        &mut self,
        context: &mut AppContext,
        scene_id: &str,
    ) -> Result<(), PointLearnError> {
        let scene = context.catalog.require_scene(scene_id)?.clone();
        let image = context.scene_image(&scene)?;
        if self.scene.is_some() {
            self.leave(context);
        }

        self.display.reset_modes();
        self.display.register_hotspots(&scene.vocabulary);
        self.filter = WordFilter::All;
        self.image_token = self.layout.with_engine(|engine| {
            engine.set_hotspots(&scene.vocabulary);
            engine.begin_image_swap()
        });
        self.image = Some(image);
        self.image_requested = Some(Instant::now());

        let (listener, receiver) = ChannelListener::new();
        let id = context.progress.subscribe(listener);
        self.subscription = Some((id, receiver));

        info!("Loaded scene {} with {} words", scene.id, scene.vocabulary.len());
        self.scene = Some(scene);
        self.update_counts(context);
        Ok(())
    }

    /// Stops audio, drops hotspots and the progress subscription.
    pub fn leave(&mut self, context: &mut AppContext) {
        context.resolver.stop_all();
        if let Some((id, _)) = self.subscription.take() {
            context.progress.unsubscribe(id);
        }
        self.display.clear_hotspots();
        self.layout.with_engine(|engine| engine.clear_hotspots());
        if let Some(scene) = self.scene.take() {
            debug!("Left scene {}", scene.id);
        }
        self.image = None;
        self.image_token = None;
        self.image_requested = None;
        self.counts = FilterCounts::default();
    }

    /// Returns false for a load that no longer matches the current scene.
    pub fn on_image_loaded(&mut self, natural: Size) -> bool {
        let Some(token) = self.image_token else {
            return false;
        };
        let applied = self
            .layout
            .with_engine(|engine| engine.on_image_loaded(token, natural))
            .unwrap_or(false);
        if applied {
            self.image_requested = None;
        }
        applied
    }

    /// Swaps a local image that failed to load for the placeholder. Returns false when
    /// there is nothing left to fall back to.
    pub fn on_image_error(&mut self, context: &AppContext) -> Result<bool, PointLearnError> {
        let Some(scene) = &self.scene else {
            return Ok(false);
        };
        let Some(ImageSource::Local(path)) = &self.image else {
            warn!("Placeholder image for scene {} failed to load", scene.id);
            context.metrics.record_error("image", format!("Placeholder failed for {}", scene.id));
            return Ok(false);
        };

        warn!(
            "Image for scene {} failed to load ({}), using placeholder",
            scene.id,
            path.display()
        );
        context.metrics.record_error("image", format!("Failed to load {}", path.display()));
        let placeholder = placeholder_url(&context.config.placeholder_base, scene)?;

        self.image = Some(ImageSource::Placeholder(placeholder));
        self.image_token = self.layout.with_engine(|engine| engine.begin_image_swap());
        self.image_requested = Some(Instant::now());
        Ok(true)
    }

    /// Treats a local image still pending after the configured timeout as failed.
    pub fn check_image_timeout(&mut self, context: &AppContext) -> Result<bool, PointLearnError> {
        let timed_out = self
            .image_requested
            .map(|requested| requested.elapsed() >= context.config.image_load_timeout())
            .unwrap_or(false);
        if !timed_out || !matches!(self.image, Some(ImageSource::Local(_))) {
            return Ok(false);
        }
        self.on_image_error(context)
    }

    /// Debounced inside a tokio runtime, applied at once otherwise.
    pub fn on_resize(&mut self, container: Size) {
        self.layout.request_resize(container);
    }

    pub fn resize_now(&mut self, container: Size) {
        self.layout.resize_now(container);
    }

    pub fn aspect_class(&self) -> Option<AspectClass> {
        self.layout.with_engine(|engine| engine.aspect_class()).flatten()
    }

    pub fn switch_filter(&mut self, filter: WordFilter) {
        self.filter = filter;
    }

    pub fn toggle_mode(&mut self, mode: DisplayMode) -> ModeChange {
        self.display.toggle(mode)
    }

    pub fn set_modes(&mut self, modes: BTreeSet<DisplayMode>) {
        self.display.set_modes(modes);
    }

    /// Drains pending progress events; returns how many were applied.
    pub fn refresh(&mut self, context: &AppContext) -> usize {
        let drained = match &self.subscription {
            Some((_, receiver)) => receiver.try_iter().count(),
            None => 0,
        };
        if drained > 0 {
            self.update_counts(context);
        }
        drained
    }

    fn update_counts(&mut self, context: &AppContext) {
        let Some(scene) = &self.scene else {
            self.counts = FilterCounts::default();
            return;
        };
        let stats = context.progress.get_scene_stats(&scene.id);
        self.counts = FilterCounts {
            all: stats.total,
            unmarked: stats.unmarked,
            known: stats.known,
            unknown: stats.unknown,
        };
    }

    fn require_entry(&self, word: &str) -> Result<&VocabularyEntry, PointLearnError> {
        let scene = self
            .scene
            .as_ref()
            .ok_or_else(|| PointLearnError::Custom("No scene loaded".into()))?;
        scene.entry(word).ok_or_else(|| PointLearnError::WordNotFound {
            scene: scene.id.clone(),
            word: word.to_string(),
        })
    }

    pub fn mark(
        &mut self,
        context: &mut AppContext,
        word: &str,
        status: WordStatus,
    ) -> Result<(), PointLearnError> {
        let key = self.require_entry(word)?.key().to_string();
        context.metrics.record_interaction("mark");
        context.progress.set_status(&key, status);
        self.refresh(context);
        Ok(())
    }

    /// Plays the word's audio. Returns whether anything was audible.
    pub async fn click(&self, context: &AppContext, word: &str) -> Result<bool, PointLearnError> {
        let entry = self.require_entry(word)?;
        context.metrics.record_interaction("click");
        let reference = Some(entry.audio_ref.as_str()).filter(|reference| !reference.is_empty());
        Ok(context.play_word(&entry.word, reference).await.is_some())
    }

    pub fn hotspots(&self, context: &AppContext) -> Vec<HotspotView> {
        let Some(scene) = &self.scene else {
            return Vec::new();
        };
        let started = Instant::now();
        let placements = self.layout.placements();

        let views: Vec<HotspotView> = scene
            .vocabulary
            .iter()
            .map(|entry| {
                let status = context.progress.get_status(entry.key());
                HotspotView {
                    word: entry.word.clone(),
                    status,
                    visible: self.filter.matches(status),
                    labels: self.display.label_stack(entry.key()).cloned().unwrap_or_default(),
                    placement: placements.iter().find(|placement| placement.word == entry.word).cloned(),
                }
            })
            .collect();

        context.metrics.record_render(&scene.id, views.len(), started.elapsed());
        views
    }

    pub fn visible_words(&self, context: &AppContext) -> Vec<String> {
        self.hotspots(context)
            .into_iter()
            .filter(|hotspot| hotspot.visible)
            .map(|hotspot| hotspot.word)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        sync::atomic::Ordering,
    };

    use super::*;
    use crate::{
        app::testing::test_app,
        persistence::test_dir,
    };

    fn page() -> ScenePage {
        ScenePage::new(Duration::from_millis(10))
    }

    #[test]
    fn test_load_resets_modes_and_filter() {
        let mut app = test_app();
        let mut page = page();
        page.load_scene(&mut app.context, "park").unwrap();
        page.toggle_mode(DisplayMode::Phonetic);
        page.switch_filter(WordFilter::Known);

        page.load_scene(&mut app.context, "kitchen").unwrap();
        assert_eq!(page.filter(), WordFilter::All);
        assert_eq!(page.active_modes(), &DisplayModeController::default_modes());
        assert_eq!(page.counts(), FilterCounts { all: 5, unmarked: 5, known: 0, unknown: 0 });
        assert!(matches!(page.image(), Some(ImageSource::Placeholder(url)) if url.contains("87CEEB")));
        // Leaving the park stopped its audio.
        assert_eq!(app.media.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_scene_keeps_current() {
        let mut app = test_app();
        let mut page = page();
        page.load_scene(&mut app.context, "park").unwrap();

        let result = page.load_scene(&mut app.context, "attic");
        assert!(matches!(result, Err(PointLearnError::SceneNotFound(_))));
        assert_eq!(page.scene().unwrap().id, "park");
    }

    #[test]
    fn test_filter_visibility_and_counts() {
        let mut app = test_app();
        let mut page = page();
        page.load_scene(&mut app.context, "kitchen").unwrap();

        page.mark(&mut app.context, "Oven", WordStatus::Known).unwrap();
        page.mark(&mut app.context, "stove", WordStatus::Unknown).unwrap();
        assert_eq!(page.counts(), FilterCounts { all: 5, unmarked: 3, known: 1, unknown: 1 });

        page.switch_filter(WordFilter::Known);
        assert_eq!(page.visible_words(&app.context), vec!["oven"]);
        page.switch_filter(WordFilter::Unmarked);
        assert_eq!(page.visible_words(&app.context).len(), 3);
        page.switch_filter(WordFilter::All);
        assert_eq!(page.visible_words(&app.context).len(), 5);
    }

    #[test]
    fn test_external_changes_picked_up_on_refresh() {
        let mut app = test_app();
        let mut page = page();
        page.load_scene(&mut app.context, "park").unwrap();

        app.context.progress.set_status("bench", WordStatus::Known);
        assert_eq!(page.counts().known, 0);
        assert_eq!(page.refresh(&app.context), 1);
        assert_eq!(page.counts().known, 1);

        app.context.progress.reset_all();
        page.refresh(&app.context);
        assert_eq!(page.counts(), FilterCounts { all: 2, unmarked: 2, known: 0, unknown: 0 });
    }

    #[test]
    fn test_mark_rejects_words_outside_scene() {
        let mut app = test_app();
        let mut page = page();
        page.load_scene(&mut app.context, "park").unwrap();

        let result = page.mark(&mut app.context, "oven", WordStatus::Known);
        assert!(matches!(result, Err(PointLearnError::WordNotFound { .. })));
        assert_eq!(app.context.progress.get_status("oven"), WordStatus::Unmarked);
    }

    #[test]
    fn test_placements_wait_for_image() {
        let mut app = test_app();
        let mut page = page();
        page.load_scene(&mut app.context, "kitchen").unwrap();
        page.resize_now(Size::new(600.0, 1000.0));
        assert!(page.hotspots(&app.context).iter().all(|hotspot| hotspot.placement.is_none()));

        assert!(page.on_image_loaded(Size::new(1200.0, 1600.0)));
        assert_eq!(page.aspect_class(), Some(AspectClass::Standard));
        let oven = &page.hotspots(&app.context)[0];
        assert_eq!(oven.placement.as_ref().map(|placement| placement.left), Some(180.0));
        assert_eq!(oven.labels.labels[0].text, "oven");
    }

    #[test]
    fn test_broken_image_falls_back_to_placeholder() {
        let mut app = test_app();
        let dir = test_dir();
        fs::create_dir_all(dir.join("scenes")).unwrap();
        fs::write(dir.join("scenes/kitchen.jpg"), b"not a jpeg").unwrap();
        app.context.config.image_dir = dir.clone();

        let mut page = page();
        page.load_scene(&mut app.context, "kitchen").unwrap();
        assert_eq!(page.image(), Some(&ImageSource::Local(dir.join("scenes/kitchen.jpg"))));

        assert!(page.on_image_error(&app.context).unwrap());
        assert!(matches!(page.image(), Some(ImageSource::Placeholder(url)) if url.contains("87CEEB")));
        assert!(!page.on_image_error(&app.context).unwrap());
        assert_eq!(app.context.metrics.errors().len(), 2);

        page.resize_now(Size::new(600.0, 1000.0));
        assert!(page.hotspots(&app.context).iter().all(|hotspot| hotspot.placement.is_none()));
        assert!(page.on_image_loaded(Size::new(1200.0, 1600.0)));
        assert!(page.hotspots(&app.context)[0].placement.is_some());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_empty_image_file_uses_placeholder_on_load() {
        let mut app = test_app();
        let dir = test_dir();
        fs::create_dir_all(dir.join("scenes")).unwrap();
        fs::write(dir.join("scenes/kitchen.jpg"), b"").unwrap();
        app.context.config.image_dir = dir.clone();

        let mut page = page();
        page.load_scene(&mut app.context, "kitchen").unwrap();
        assert!(matches!(page.image(), Some(ImageSource::Placeholder(_))));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_stalled_image_times_out() {
        let mut app = test_app();
        let dir = test_dir();
        fs::create_dir_all(dir.join("scenes")).unwrap();
        fs::write(dir.join("scenes/park.jpg"), b"jpg").unwrap();
        app.context.config.image_dir = dir.clone();
        app.context.config.image_load_timeout_ms = 0;

        let mut page = page();
        page.load_scene(&mut app.context, "park").unwrap();
        assert!(page.check_image_timeout(&app.context).unwrap());
        assert!(matches!(page.image(), Some(ImageSource::Placeholder(_))));
        assert!(!page.check_image_timeout(&app.context).unwrap());

        // A load that arrives in time is never replaced.
        page.load_scene(&mut app.context, "park").unwrap();
        assert!(page.on_image_loaded(Size::new(1200.0, 1600.0)));
        assert!(!page.check_image_timeout(&app.context).unwrap());
        assert!(matches!(page.image(), Some(ImageSource::Local(_))));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_resize_applies_without_runtime() {
        let mut app = test_app();
        let mut page = page();
        page.load_scene(&mut app.context, "park").unwrap();
        page.on_image_loaded(Size::new(1200.0, 1600.0));

        page.on_resize(Size::new(600.0, 1000.0));
        assert!(page.hotspots(&app.context).iter().all(|hotspot| hotspot.placement.is_some()));
    }

    #[tokio::test]
    async fn test_interactions_and_loads_recorded() {
        let mut app = test_app();
        let mut page = page();
        page.load_scene(&mut app.context, "park").unwrap();
        assert!(page.load_scene(&mut app.context, "attic").is_err());

        page.mark(&mut app.context, "bench", WordStatus::Known).unwrap();
        page.click(&app.context, "swing").await.unwrap();

        let report = app.context.metrics.report();
        assert_eq!(report.interactions, 2);
        assert_eq!(report.scene_loads.len(), 1);
        assert_eq!(report.scene_loads[0].scene_id, "park");
        assert_eq!(report.audio_loads[0].word, "swing");
        assert_eq!(report.errors[0].source, "scene");
    }

    #[test]
    fn test_leave_clears_everything() {
        let mut app = test_app();
        let mut page = page();
        page.load_scene(&mut app.context, "park").unwrap();
        page.leave(&mut app.context);

        assert!(page.scene().is_none());
        assert!(page.hotspots(&app.context).is_empty());
        assert!(!page.on_image_loaded(Size::new(1200.0, 1600.0)));
        app.context.progress.set_status("bench", WordStatus::Known);
        assert_eq!(page.refresh(&app.context), 0);
    }

    #[tokio::test]
    async fn test_click_falls_back_to_speech() {
        let mut app = test_app();
        let mut page = page();
        page.load_scene(&mut app.context, "park").unwrap();

        assert!(page.click(&app.context, "Swing").await.unwrap());
        assert_eq!(*app.speech.spoken.lock().unwrap(), vec!["swing".to_string()]);
        assert!(page.click(&app.context, "oven").await.is_err());
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!("Known".parse::<WordFilter>().unwrap(), WordFilter::Known);
        assert!("maybe".parse::<WordFilter>().is_err());
    }
}
