use std::{
    collections::VecDeque,
    fmt,
    path::Path,
    sync::Mutex,
    time::{
        Duration,
        Instant,
    },
};

use chrono::{
    DateTime,
    Utc,
};
use serde::Serialize;
use tracing::debug;

use crate::{
    audio::AudioTier,
    core::PointLearnError,
    persistence::save_json,
};

/// Samples kept per timing series; older ones are dropped first.
pub const MAX_SAMPLES: usize = 200;
pub const MAX_ERRORS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneLoadSample {
    pub scene_id: String,
    pub millis: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioSample {
    pub word: String,
    /// `None` when every tier failed.
    pub tier: Option<AudioTier>,
    pub millis: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSample {
    pub scene_id: String,
    pub hotspots: usize,
    pub millis: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub time: DateTime<Utc>,
    pub source: String,
    pub message: String,
}

/// Snapshot written by [`Metrics::export`].
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub exported_at: DateTime<Utc>,
    pub uptime_secs: f64,
    pub interactions: u64,
    pub scene_load_avg_ms: f64,
    pub audio_load_avg_ms: f64,
    pub hotspot_render_avg_ms: f64,
    pub scene_loads: Vec<SceneLoadSample>,
    pub audio_loads: Vec<AudioSample>,
    pub hotspot_renders: Vec<RenderSample>,
    pub errors: Vec<ErrorRecord>,
}

#[derive(Debug, Default)]
struct MetricsData {
    scene_loads: VecDeque<SceneLoadSample>,
    audio_loads: VecDeque<AudioSample>,
    hotspot_renders: VecDeque<RenderSample>,
    interactions: u64,
    errors: VecDeque<ErrorRecord>,
}

fn push_bounded<T>(queue: &mut VecDeque<T>, item: T, cap: usize) {
    queue.push_back(item);
    while queue.len() > cap {
        queue.pop_front();
    }
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

fn average<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Session timings, interaction count and recent errors.
#[derive(Debug)]
pub struct Metrics {
    started: Instant,
    data: Mutex<MetricsData>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self { started: Instant::now(), data: Mutex::new(MetricsData::default()) }
    }

    fn update(&self, f: impl FnOnce(&mut MetricsData)) {
        if let Ok(mut data) = self.data.lock() {
            f(&mut data);
        }
    }

    pub fn record_scene_load(&self, scene_id: &str, elapsed: Duration) {
        debug!("Scene {} loaded in {:.1}ms", scene_id, millis(elapsed));
        let sample = SceneLoadSample { scene_id: scene_id.to_string(), millis: millis(elapsed) };
        self.update(|data| push_bounded(&mut data.scene_loads, sample, MAX_SAMPLES));
    }

    pub fn record_audio(&self, word: &str, tier: Option<AudioTier>, elapsed: Duration) {
        let sample = AudioSample { word: word.to_string(), tier, millis: millis(elapsed) };
        self.update(|data| push_bounded(&mut data.audio_loads, sample, MAX_SAMPLES));
    }

    pub fn record_render(&self, scene_id: &str, hotspots: usize, elapsed: Duration) {
        let sample =
            RenderSample { scene_id: scene_id.to_string(), hotspots, millis: millis(elapsed) };
        self.update(|data| push_bounded(&mut data.hotspot_renders, sample, MAX_SAMPLES));
    }

    pub fn record_interaction(&self, action: &str) {
        debug!("User {}", action);
        self.update(|data| data.interactions += 1);
    }

    pub fn record_error(&self, source: &str, message: impl fmt::Display) {
        let record = ErrorRecord {
            time: Utc::now(),
            source: source.to_string(),
            message: message.to_string(),
        };
        self.update(|data| push_bounded(&mut data.errors, record, MAX_ERRORS));
    }

    pub fn interactions(&self) -> u64 {
        self.data.lock().map(|data| data.interactions).unwrap_or(0)
    }

    pub fn errors(&self) -> Vec<ErrorRecord> {
        self.data.lock().map(|data| data.errors.iter().cloned().collect()).unwrap_or_default()
    }

    pub fn report(&self) -> MetricsReport {
        let data = match self.data.lock() {
            Ok(data) => data,
            Err(poisoned) => poisoned.into_inner(),
        };

        MetricsReport {
            exported_at: Utc::now(),
            uptime_secs: self.started.elapsed().as_secs_f64(),
            interactions: data.interactions,
            scene_load_avg_ms: average(data.scene_loads.iter().map(|sample| &sample.millis)),
            audio_load_avg_ms: average(data.audio_loads.iter().map(|sample| &sample.millis)),
            hotspot_render_avg_ms: average(
                data.hotspot_renders.iter().map(|sample| &sample.millis),
            ),
            scene_loads: data.scene_loads.iter().cloned().collect(),
            audio_loads: data.audio_loads.iter().cloned().collect(),
            hotspot_renders: data.hotspot_renders.iter().cloned().collect(),
            errors: data.errors.iter().cloned().collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, PointLearnError> {
        Ok(serde_json::to_string_pretty(&self.report())?)
    }

    pub fn export(&self, path: &Path) -> Result<(), PointLearnError> {
        save_json(&self.report(), path)
    }
}
