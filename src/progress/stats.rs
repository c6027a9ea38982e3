use serde::{
    Deserialize,
    Serialize,
};

use crate::core::WordStatus;

/// Per-status word counts for a scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneStats {
    pub known: usize,
    pub unknown: usize,
    pub unmarked: usize,
    pub total: usize,
}

impl SceneStats {
    pub fn record(&mut self, status: WordStatus) {
        match status {
            WordStatus::Known => self.known += 1,
            WordStatus::Unknown => self.unknown += 1,
            WordStatus::Unmarked => self.unmarked += 1,
        }
    }

    pub fn count(&self, status: WordStatus) -> usize {
        match status {
            WordStatus::Known => self.known,
            WordStatus::Unknown => self.unknown,
            WordStatus::Unmarked => self.unmarked,
        }
    }

    pub fn progress(&self) -> SceneProgress {
        SceneProgress::new(self.known, self.total)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneProgress {
    pub known: usize,
    pub total: usize,
    pub percentage: u32,
}

impl SceneProgress {
    pub fn new(known: usize, total: usize) -> Self {
        Self { known, total, percentage: percentage(known, total) }
    }

    pub fn text(&self) -> String {
        format!("{}/{} known", self.known, self.total)
    }

    pub fn badge(&self) -> ProgressBadge {
        match self.percentage {
            0 => ProgressBadge::Empty,
            100 => ProgressBadge::Complete,
            _ => ProgressBadge::InProgress,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBadge {
    Empty,
    InProgress,
    Complete,
}

impl ProgressBadge {
    pub fn class_name(&self) -> &'static str {
        match self {
            ProgressBadge::Empty => "progress-0",
            ProgressBadge::InProgress => "progress-in-progress",
            ProgressBadge::Complete => "progress-complete",
        }
    }
}

/// Totals over every stored word, independent of the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningStats {
    pub total_marked: usize,
    pub known: usize,
    pub unknown: usize,
    pub unmarked: usize,
}

/// `round(known / total * 100)`, `0` for an empty scene. Halves round up.
pub fn percentage(known: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let known = known.min(total);
    ((known * 100 + total / 2) / total) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(2, 5), 40);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn test_badges() {
        assert_eq!(SceneProgress::new(0, 5).badge(), ProgressBadge::Empty);
        assert_eq!(SceneProgress::new(0, 0).badge(), ProgressBadge::Empty);
        assert_eq!(SceneProgress::new(3, 5).badge(), ProgressBadge::InProgress);
        assert_eq!(SceneProgress::new(5, 5).badge(), ProgressBadge::Complete);
        assert_eq!(ProgressBadge::Complete.class_name(), "progress-complete");
    }

    #[test]
    fn test_stats_record() {
        let mut stats = SceneStats::default();
        for status in [WordStatus::Known, WordStatus::Known, WordStatus::Unknown] {
            stats.record(status);
            stats.total += 1;
        }
        assert_eq!(stats.count(WordStatus::Known), 2);
        assert_eq!(stats.count(WordStatus::Unknown), 1);
        assert_eq!(stats.progress(), SceneProgress { known: 2, total: 3, percentage: 67 });
        assert_eq!(stats.progress().text(), "2/3 known");
    }
}
