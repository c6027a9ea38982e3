use std::{
    collections::{
        BTreeMap,
        BTreeSet,
    },
    fmt,
    str::FromStr,
};

use tracing::debug;

use crate::core::{
    utils::word_key,
    PointLearnError,
    VocabularyEntry,
};

/// Vertical offset of the first label above its marker, in pixels.
pub const LABEL_BASE_OFFSET: i32 = -25;
/// Distance between stacked labels, in pixels.
pub const LABEL_SPACING: i32 = 22;

/// Declaration order is stacking priority, nearest the marker first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DisplayMode {
    English,
    Phonetic,
    Chinese,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 3] = [DisplayMode::English, DisplayMode::Phonetic, DisplayMode::Chinese];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::English => "english",
            DisplayMode::Phonetic => "phonetic",
            DisplayMode::Chinese => "chinese",
        }
    }

    pub fn localized_name(&self) -> &'static str {
        match self {
            DisplayMode::English => "英语",
            DisplayMode::Phonetic => "音标",
            DisplayMode::Chinese => "中文",
        }
    }

    pub fn text_of<'a>(&self, entry: &'a VocabularyEntry) -> &'a str {
        match self {
            DisplayMode::English => &entry.word,
            DisplayMode::Phonetic => &entry.phonetic,
            DisplayMode::Chinese => &entry.translation,
        }
    }

    /// Parses a comma-separated list such as `"english,phonetic"`. `"none"` is the empty set.
    pub fn parse_list(text: &str) -> Result<BTreeSet<DisplayMode>, PointLearnError> {
        if text.trim().eq_ignore_ascii_case("none") {
            return Ok(BTreeSet::new());
        }
        text.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(DisplayMode::from_str)
            .collect()
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = PointLearnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(DisplayMode::English),
            "phonetic" | "ipa" => Ok(DisplayMode::Phonetic),
            "chinese" | "translation" | "zh" => Ok(DisplayMode::Chinese),
            _ => Err(PointLearnError::InvalidMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub mode: DisplayMode,
    pub text: String,
    pub offset_y: i32,
}

/// Labels shown above one hotspot marker, nearest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelStack {
    pub labels: Vec<Label>,
}

impl LabelStack {
    pub fn build(entry: &VocabularyEntry, modes: &BTreeSet<DisplayMode>) -> Self {
        let labels = modes
            .iter()
            .zip((0..).map(|index: i32| LABEL_BASE_OFFSET - index * LABEL_SPACING))
            .map(|(mode, offset_y)| Label {
                mode: *mode,
                text: mode.text_of(entry).to_string(),
                offset_y,
            })
            .collect();
        Self { labels }
    }

    pub fn is_hidden(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, mode: DisplayMode) -> Option<&Label> {
        self.labels.iter().find(|label| label.mode == mode)
    }
}

/// Result of a toggle, for "mode on/off" feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub mode: DisplayMode,
    pub active: bool,
}

impl fmt::Display for ModeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.active { "on" } else { "off" };
        write!(f, "{} ({}) {}", self.mode.localized_name(), self.mode, state)
    }
}

/// Tracks which label kinds are active and the resulting label stack of every registered hotspot.
#[derive(Debug, Clone)]
pub struct DisplayModeController {
    active: BTreeSet<DisplayMode>,
    hotspots: Vec<VocabularyEntry>,
    stacks: BTreeMap<String, LabelStack>,
}

impl Default for DisplayModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayModeController {
    pub fn new() -> Self {
        Self { active: Self::default_modes(), hotspots: Vec::new(), stacks: BTreeMap::new() }
    }

    pub fn default_modes() -> BTreeSet<DisplayMode> {
        BTreeSet::from([DisplayMode::English])
    }

    pub fn active_modes(&self) -> &BTreeSet<DisplayMode> {
        &self.active
    }

    pub fn is_active(&self, mode: DisplayMode) -> bool {
        self.active.contains(&mode)
    }

    pub fn toggle(&mut self, mode: DisplayMode) -> ModeChange {
        let active = if self.active.remove(&mode) {
            false
        } else {
            self.active.insert(mode);
            true
        };
        debug!("Display mode {} {}", mode, if active { "on" } else { "off" });
        self.update_all();
        ModeChange { mode, active }
    }

    pub fn set_modes(&mut self, modes: BTreeSet<DisplayMode>) {
        self.active = modes;
        self.update_all();
    }

    pub fn reset_modes(&mut self) {
        self.set_modes(Self::default_modes());
    }

    pub fn register_hotspots<'a>(&mut self, entries: impl IntoIterator<Item = &'a VocabularyEntry>) {
        self.hotspots = entries.into_iter().cloned().collect();
        self.update_all();
    }

    pub fn clear_hotspots(&mut self) {
        self.hotspots.clear();
        self.stacks.clear();
    }

    pub fn update_all(&mut self) {
        self.stacks = self
            .hotspots
            .iter()
            .map(|entry| (entry.key().to_string(), LabelStack::build(entry, &self.active)))
            .collect();
    }

    pub fn label_stack(&self, word: &str) -> Option<&LabelStack> {
        self.stacks.get(&word_key(word))
    }

    pub fn hotspot_count(&self) -> usize {
        self.hotspots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_catalog;

    fn kitchen_controller() -> DisplayModeController {
        let catalog = test_catalog();
        let mut controller = DisplayModeController::new();
        controller.register_hotspots(&catalog.get_scene("kitchen").unwrap().vocabulary);
        controller
    }

    #[test]
    fn test_default_is_english_only() {
        let controller = kitchen_controller();
        let stack = controller.label_stack("oven").unwrap();

        assert_eq!(
            stack.labels,
            vec![Label { mode: DisplayMode::English, text: "oven".to_string(), offset_y: -25 }]
        );
        assert_eq!(controller.hotspot_count(), 5);
    }

    #[test]
    fn test_all_modes_stack_in_priority_order() {
        let mut controller = kitchen_controller();
        assert_eq!(controller.toggle(DisplayMode::Chinese), ModeChange { mode: DisplayMode::Chinese, active: true });
        controller.toggle(DisplayMode::Phonetic);

        let stack = controller.label_stack("Oven").unwrap();
        let offsets: Vec<(DisplayMode, i32)> =
            stack.labels.iter().map(|label| (label.mode, label.offset_y)).collect();
        assert_eq!(
            offsets,
            vec![
                (DisplayMode::English, -25),
                (DisplayMode::Phonetic, -47),
                (DisplayMode::Chinese, -69),
            ]
        );
        assert_eq!(stack.label(DisplayMode::Chinese).unwrap().text, "烤箱");
    }

    #[test]
    fn test_empty_set_hides_labels() {
        let mut controller = kitchen_controller();
        let change = controller.toggle(DisplayMode::English);

        assert!(!change.active);
        assert!(controller.active_modes().is_empty());
        assert!(controller.label_stack("stove").unwrap().is_hidden());
    }

    #[test]
    fn test_single_non_english_mode_starts_at_base() {
        let mut controller = kitchen_controller();
        controller.set_modes(BTreeSet::from([DisplayMode::Chinese]));
        let stack = controller.label_stack("stool").unwrap();
        assert_eq!(stack.labels.len(), 1);
        assert_eq!(stack.labels[0].offset_y, LABEL_BASE_OFFSET);

        controller.reset_modes();
        assert_eq!(controller.active_modes(), &DisplayModeController::default_modes());
    }

    #[test]
    fn test_clear_hotspots() {
        let mut controller = kitchen_controller();
        controller.clear_hotspots();
        assert!(controller.label_stack("oven").is_none());
        controller.toggle(DisplayMode::Phonetic);
        assert_eq!(controller.hotspot_count(), 0);
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("IPA".parse::<DisplayMode>().unwrap(), DisplayMode::Phonetic);
        assert!("klingon".parse::<DisplayMode>().is_err());
        assert_eq!(
            DisplayMode::parse_list("chinese, english").unwrap(),
            BTreeSet::from([DisplayMode::English, DisplayMode::Chinese])
        );
        assert!(DisplayMode::parse_list("none").unwrap().is_empty());
        assert_eq!(
            ModeChange { mode: DisplayMode::Phonetic, active: false }.to_string(),
            "音标 (phonetic) off"
        );
    }
}
