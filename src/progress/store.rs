use std::{
    collections::BTreeMap,
    sync::Arc,
};

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    error,
    warn,
};

use super::{
    events::{
        ProgressEvent,
        ProgressListener,
        SubscriptionId,
    },
    stats::{
        LearningStats,
        SceneProgress,
        SceneStats,
    },
};
use crate::{
    catalog::SceneCatalog,
    core::{
        utils::word_key,
        PointLearnError,
        WordStatus,
    },
    persistence::KeyValueStorage,
};

pub const STORAGE_KEY: &str = "englishPointLearn_userProgress";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordState {
    pub status: WordStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// The persisted blob. `scene_progress` is written for external readers but never read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub user_id: String,
    #[serde(default)]
    pub word_states: BTreeMap<String, WordState>,
    #[serde(default)]
    pub scene_progress: BTreeMap<String, SceneProgress>,
}

impl ProgressRecord {
    pub fn new() -> Self {
        Self {
            user_id: uuid::Uuid::new_v4().to_string(),
            word_states: BTreeMap::new(),
            scene_progress: BTreeMap::new(),
        }
    }

    /// Re-keys entries by normalized word; the newest entry wins a collision.
    fn normalize_keys(&mut self) -> usize {
        let mut merged: BTreeMap<String, WordState> = BTreeMap::new();
        let mut rekeyed = 0;

        for (word, state) in std::mem::take(&mut self.word_states) {
            let key = word_key(&word);
            if key != word {
                rekeyed += 1;
            }
            match merged.get(&key) {
                Some(existing) if existing.timestamp >= state.timestamp => {}
                _ => {
                    merged.insert(key, state);
                }
            }
        }

        self.word_states = merged;
        rekeyed
    }
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Word learning status with write-through persistence and synchronous change notification.
pub struct ProgressStore {
    catalog: Arc<SceneCatalog>,
    storage: Box<dyn KeyValueStorage>,
    record: ProgressRecord,
    listeners: Vec<(SubscriptionId, Box<dyn ProgressListener>)>,
    next_subscription: u64,
}

impl ProgressStore {
    pub fn new(catalog: Arc<SceneCatalog>, storage: Box<dyn KeyValueStorage>) -> Self {
        let record = Self::load_record(storage.as_ref());
        Self { catalog, storage, record, listeners: Vec::new(), next_subscription: 1 }
    }

    fn load_record(storage: &dyn KeyValueStorage) -> ProgressRecord {
        let stored = match storage.get_item(STORAGE_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return ProgressRecord::new(),
            Err(e) => {
                warn!("Failed to load user progress: {}", e);
                return ProgressRecord::new();
            }
        };

        match serde_json::from_str::<ProgressRecord>(&stored) {
            Ok(mut record) => {
                let rekeyed = record.normalize_keys();
                if rekeyed > 0 {
                    debug!("Normalized {} stored progress keys", rekeyed);
                }
                debug!("Loaded progress for {} words", record.word_states.len());
                record
            }
            Err(e) => {
                warn!("Failed to parse user progress: {}", e);
                ProgressRecord::new()
            }
        }
    }

    pub fn user_id(&self) -> &str {
        &self.record.user_id
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn catalog(&self) -> &SceneCatalog {
        &self.catalog
    }

    pub fn get_status(&self, word: &str) -> WordStatus {
        self.record
            .word_states
            .get(&word_key(word))
            .map(|state| state.status)
            .unwrap_or_default()
    }

    pub fn set_status(&mut self, word: &str, status: WordStatus) {
        let key = word_key(word);
        if key.is_empty() {
            warn!("Ignoring status change for an empty word");
            return;
        }

        self.record.word_states.insert(key, WordState { status, timestamp: Utc::now() });
        self.persist();
        self.emit(&ProgressEvent::Updated { word: word.to_string(), status });
    }

    /// Parses and applies a status name; unknown names are rejected without side effects.
    pub fn set_status_str(&mut self, word: &str, status: &str) -> bool {
        match status.parse::<WordStatus>() {
            Ok(status) => {
                self.set_status(word, status);
                true
            }
            Err(e) => {
                warn!("{} (word: {})", e, word);
                false
            }
        }
    }

    pub fn get_scene_stats(&self, scene_id: &str) -> SceneStats {
        let Some(scene) = self.catalog.get_scene(scene_id) else {
            return SceneStats::default();
        };

        let mut stats = SceneStats { total: scene.vocabulary.len(), ..SceneStats::default() };
        for entry in &scene.vocabulary {
            stats.record(self.get_status(entry.key()));
        }
        stats
    }

    pub fn get_scene_progress(&self, scene_id: &str) -> SceneProgress {
        self.get_scene_stats(scene_id).progress()
    }

    pub fn reset_scene(&mut self, scene_id: &str) -> Result<(), PointLearnError> {
        let catalog = Arc::clone(&self.catalog);
        let scene = catalog.require_scene(scene_id)?;

        let removed = scene
            .vocabulary
            .iter()
            .filter(|entry| self.record.word_states.remove(entry.key()).is_some())
            .count();
        debug!("Reset {} words in scene {}", removed, scene_id);

        self.persist();
        self.emit(&ProgressEvent::SceneReset { scene_id: scene_id.to_string() });
        Ok(())
    }

    pub fn reset_all(&mut self) {
        self.record.word_states.clear();
        self.record.scene_progress.clear();
        self.persist();
        self.emit(&ProgressEvent::Reset);
    }

    pub fn learning_stats(&self) -> LearningStats {
        let total_marked = self.record.word_states.len();
        let known = self
            .record
            .word_states
            .values()
            .filter(|state| state.status == WordStatus::Known)
            .count();
        let unknown = self
            .record
            .word_states
            .values()
            .filter(|state| state.status == WordStatus::Unknown)
            .count();

        LearningStats { total_marked, known, unknown, unmarked: total_marked - known - unknown }
    }

    pub fn subscribe(&mut self, listener: impl ProgressListener + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn emit(&self, event: &ProgressEvent) {
        for (_, listener) in &self.listeners {
            listener.on_progress(event);
        }
    }

    /// Write-through. Failures are logged and the in-memory record stays authoritative.
    fn persist(&mut self) {
        self.record.scene_progress = self
            .catalog
            .get_all()
            .iter()
            .map(|scene| (scene.id.clone(), self.get_scene_progress(&scene.id)))
            .collect();

        let json = match serde_json::to_string(&self.record) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize user progress: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set_item(STORAGE_KEY, &json) {
            error!("Failed to save user progress: {}", e);
        }
    }
}
