pub mod debounce;
pub mod engine;
pub mod geometry;

use std::{
    sync::{
        Arc,
        Mutex,
    },
    time::Duration,
};

use tracing::warn;

pub use debounce::Debouncer;
pub use engine::{
    HotspotLayoutEngine,
    HotspotPlacement,
    ImageToken,
};
pub use geometry::{
    fit_image,
    AspectClass,
    DisplayBox,
    Size,
};

/// A layout engine whose resize events are debounced.
pub struct ResponsiveLayout {
    engine: Arc<Mutex<HotspotLayoutEngine>>,
    debouncer: Debouncer,
}

impl ResponsiveLayout {
    pub fn new(resize_delay: Duration) -> Self {
        Self {
            engine: Arc::new(Mutex::new(HotspotLayoutEngine::new())),
            debouncer: Debouncer::new(resize_delay),
        }
    }

    /// Applies `container` once resizing has settled.
    pub fn request_resize(&mut self, container: Size) {
        let engine = self.engine.clone();
        self.debouncer.call(move || match engine.lock() {
            Ok(mut engine) => engine.on_resize(container),
            Err(_) => warn!("Layout state poisoned; resize dropped"),
        });
    }

    /// Applies `container` immediately, discarding any pending resize.
    pub fn resize_now(&mut self, container: Size) {
        self.debouncer.cancel();
        self.with_engine(|engine| engine.on_resize(container));
    }

    pub fn with_engine<R>(&self, f: impl FnOnce(&mut HotspotLayoutEngine) -> R) -> Option<R> {
        self.engine.lock().ok().map(|mut engine| f(&mut engine))
    }

    pub fn placements(&self) -> Vec<HotspotPlacement> {
        self.with_engine(|engine| engine.placements()).unwrap_or_default()
    }
}
