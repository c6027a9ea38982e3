use tracing::debug;

use super::geometry::{
    fit_image,
    AspectClass,
    DisplayBox,
    Size,
};
use crate::core::{
    Position,
    VocabularyEntry,
};

/// Where a hotspot marker sits, in container pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotPlacement {
    pub word: String,
    pub left: f64,
    pub top: f64,
}

/// Identifies one image load; results for an older swap are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageToken(u64);

/// Keeps hotspot markers aligned with the displayed image.
///
/// Placements exist only while the current image's natural size and the
/// container size are both known. Swapping the image drops the natural size
/// until that image reports loaded.
#[derive(Debug, Default)]
pub struct HotspotLayoutEngine {
    hotspots: Vec<(String, Position)>,
    natural: Option<Size>,
    container: Option<Size>,
    generation: u64,
}

impl HotspotLayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_hotspots<'a>(&mut self, entries: impl IntoIterator<Item = &'a VocabularyEntry>) {
        self.hotspots =
            entries.into_iter().map(|entry| (entry.word.clone(), entry.position)).collect();
    }

    pub fn clear_hotspots(&mut self) {
        self.hotspots.clear();
    }

    pub fn begin_image_swap(&mut self) -> ImageToken {
        self.generation += 1;
        self.natural = None;
        ImageToken(self.generation)
    }

    /// Returns false when the token belongs to a superseded image.
    pub fn on_image_loaded(&mut self, token: ImageToken, natural: Size) -> bool {
        if token.0 != self.generation {
            debug!("Ignoring load of superseded image {}", token.0);
            return false;
        }
        self.natural = Some(natural);
        true
    }

    pub fn on_resize(&mut self, container: Size) {
        self.container = Some(container);
    }

    pub fn display_box(&self) -> Option<DisplayBox> {
        fit_image(self.natural?, self.container?)
    }

    pub fn aspect_class(&self) -> Option<AspectClass> {
        self.natural.map(AspectClass::of)
    }

    pub fn placements(&self) -> Vec<HotspotPlacement> {
        let Some(display_box) = self.display_box() else {
            return Vec::new();
        };

        self.hotspots
            .iter()
            .map(|(word, position)| {
                let (left, top) = display_box.locate(*position);
                HotspotPlacement { word: word.clone(), left, top }
            })
            .collect()
    }
}
