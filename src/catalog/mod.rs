pub mod compare;
pub mod images;
pub mod themes;

use std::{
    collections::HashMap,
    fs,
    path::Path,
};

use serde::Deserialize;
use tracing::{
    debug,
    warn,
};

pub use self::{
    compare::{
        compare_catalogs,
        CatalogDivergence,
    },
    images::{
        placeholder_url,
        scene_image,
        ImageSource,
    },
    themes::{
        Theme,
        ThemeCatalog,
        ALL_THEME_ID,
    },
};
use crate::core::{
    utils::{
        sanitize_position,
        word_key,
        RawCoordinate,
    },
    PointLearnError,
    Scene,
    VocabularyEntry,
};

const BUILTIN_CATALOG: &str = include_str!("../../data/scenes.hjson");

#[derive(Debug, Deserialize)]
struct CatalogData {
    scenes: Vec<SceneData>,
    #[serde(default)]
    themes: Vec<Theme>,
}

#[derive(Debug, Deserialize)]
struct SceneData {
    id: String,
    name: String,
    #[serde(default)]
    localized_name: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    color: Option<String>,
    vocabulary: Vec<EntryData>,
}

#[derive(Debug, Deserialize)]
struct EntryData {
    word: String,
    #[serde(default)]
    phonetic: String,
    #[serde(default, alias = "chinese")]
    translation: String,
    #[serde(default, alias = "audio_ref")]
    audio: String,
    position: PositionData,
}

#[derive(Debug, Deserialize)]
struct PositionData {
    x: RawCoordinate,
    y: RawCoordinate,
}

/// Read-only scene lookup, constructed once at startup.
#[derive(Debug, Clone)]
pub struct SceneCatalog {
    scenes: Vec<Scene>,
    index: HashMap<String, usize>,
    themes: ThemeCatalog,
}

impl SceneCatalog {
    pub fn builtin() -> Result<Self, PointLearnError> {
        Self::from_hjson(BUILTIN_CATALOG)
    }

    /// Loads a catalog file. HJSON is a superset of JSON so both formats are accepted.
    pub fn load(path: &Path) -> Result<Self, PointLearnError> {
        let content = fs::read_to_string(path).map_err(|e| {
            PointLearnError::Custom(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_hjson(&content)?;
        debug!("Loaded {} scenes from {}", catalog.scenes.len(), path.display());
        Ok(catalog)
    }

    pub fn from_hjson(content: &str) -> Result<Self, PointLearnError> {
        let data: CatalogData = serde_hjson::from_str(content)?;

        let scenes = data
            .scenes
            .into_iter()
            .map(|scene| {
                let vocabulary = scene
                    .vocabulary
                    .into_iter()
                    .map(|entry| {
                        let position =
                            sanitize_position(&entry.word, &entry.position.x, &entry.position.y);
                        VocabularyEntry::new(
                            entry.word,
                            entry.phonetic,
                            entry.translation,
                            entry.audio,
                            position,
                        )
                    })
                    .collect();

                Scene {
                    image_path: scene.image.unwrap_or_else(|| default_image_path(&scene.id)),
                    id: scene.id,
                    name: scene.name,
                    localized_name: scene.localized_name,
                    color: scene.color,
                    vocabulary,
                }
            })
            .collect();

        Self::with_themes(scenes, data.themes)
    }

    pub fn from_scenes(scenes: Vec<Scene>) -> Result<Self, PointLearnError> {
        Self::with_themes(scenes, Vec::new())
    }

    fn with_themes(scenes: Vec<Scene>, themes: Vec<Theme>) -> Result<Self, PointLearnError> {
        let mut index = HashMap::with_capacity(scenes.len());
        for (position, scene) in scenes.iter().enumerate() {
            if index.insert(scene.id.clone(), position).is_some() {
                return Err(PointLearnError::DuplicateScene(scene.id.clone()));
            }

            let mut seen = HashMap::new();
            for entry in &scene.vocabulary {
                if let Some(previous) = seen.insert(entry.key().to_string(), &entry.word) {
                    warn!(
                        "Scene {} lists {:?} and {:?} under the same progress key",
                        scene.id, previous, entry.word
                    );
                }
            }
        }

        let scene_ids: Vec<String> = scenes.iter().map(|scene| scene.id.clone()).collect();
        let themes = ThemeCatalog::new(themes, &scene_ids);

        Ok(Self { scenes, index, themes })
    }

    pub fn get_scene(&self, id: &str) -> Option<&Scene> {
        self.index.get(id).map(|&position| &self.scenes[position])
    }

    pub fn require_scene(&self, id: &str) -> Result<&Scene, PointLearnError> {
        self.get_scene(id).ok_or_else(|| PointLearnError::SceneNotFound(id.to_string()))
    }

    pub fn get_all(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn themes(&self) -> &ThemeCatalog {
        &self.themes
    }

    /// Scenes of a theme in theme order; ids missing from the catalog are skipped.
    pub fn scenes_for_theme(&self, theme_id: &str) -> Vec<&Scene> {
        match self.themes.get_theme(theme_id) {
            Some(theme) => theme.scenes.iter().filter_map(|id| self.get_scene(id)).collect(),
            None => Vec::new(),
        }
    }

    /// First scene that contains `word`, with the matching entry.
    pub fn find_entry(&self, word: &str) -> Option<(&Scene, &VocabularyEntry)> {
        let key = word_key(word);
        self.scenes.iter().find_map(|scene| {
            scene.vocabulary.iter().find(|entry| entry.key() == key).map(|entry| (scene, entry))
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = &VocabularyEntry> {
        self.scenes.iter().flat_map(|scene| scene.vocabulary.iter())
    }
}

pub fn default_image_path(scene_id: &str) -> String {
    format!("scenes/{}.jpg", scene_id)
}

#[cfg(test)]
pub(crate) fn test_catalog() -> SceneCatalog {
    SceneCatalog::from_hjson(
        r#"{
          scenes: [
            {
              id: "kitchen"
              name: "Kitchen"
              color: "87CEEB"
              vocabulary: [
                { word: "oven", phonetic: "/ˈʌvən/", translation: "烤箱", audio: "oven.MP3", position: { x: "30%", y: "27.5%" } }
                { word: "stove", phonetic: "/stoʊv/", translation: "炉灶", audio: "stove.MP3", position: { x: "72%", y: "44%" } }
                { word: "kitchen island", phonetic: "/ˈkɪtʃɪn ˈaɪlənd/", translation: "厨房岛台", audio: "kitchen_island.MP3", position: { x: "36%", y: "55%" } }
                { word: "stool", phonetic: "/stuːl/", translation: "凳子", audio: "stool.MP3", position: { x: "61%", y: "81%" } }
                { word: "pendant light", phonetic: "/ˈpɛndənt laɪt/", translation: "吊灯", audio: "pendant_light.MP3", position: { x: "150%", y: "-10%" } }
              ]
            }
            {
              id: "park"
              name: "Park"
              vocabulary: [
                { word: "bench", phonetic: "/bɛntʃ/", translation: "长椅", audio: "Bench.MP3", position: { x: "39%", y: "71%" } }
                { word: "swing", phonetic: "/swɪŋ/", translation: "秋千", audio: "Swing.MP3", position: { x: "20%", y: "55%" } }
              ]
            }
            {
              id: "empty"
              name: "Empty"
              vocabulary: []
            }
          ]
          themes: [
            { id: "all", name: "All", scenes: [] }
            { id: "home", name: "Home", scenes: ["kitchen", "attic"] }
            { id: "recreation", name: "Recreation", scenes: ["park"] }
          ]
        }"#,
    )
    .expect("test catalog parses")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Position;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = SceneCatalog::builtin().unwrap();

        assert_eq!(catalog.len(), 8);
        let kitchen = catalog.get_scene("kitchen").unwrap();
        assert_eq!(kitchen.name, "Kitchen");
        assert_eq!(kitchen.image_path, "scenes/kitchen.jpg");
        assert_eq!(kitchen.vocabulary.len(), 5);
        assert_eq!(kitchen.vocabulary[0].word, "oven");
        assert_eq!(kitchen.vocabulary[0].position.x.value(), 30.07);

        let living = catalog.get_scene("living").unwrap();
        assert_eq!(living.entry("washing machine").unwrap().translation, "洗衣机");
        assert!(catalog.get_scene("attic").is_none());
    }

    #[test]
    fn test_invalid_position_sanitized_on_load() {
        let catalog = test_catalog();
        let kitchen = catalog.get_scene("kitchen").unwrap();
        assert_eq!(kitchen.entry("pendant light").unwrap().position, Position::CENTER);
    }

    #[test]
    fn test_duplicate_scene_ids_rejected() {
        let scene = test_catalog().get_scene("park").unwrap().clone();
        let result = SceneCatalog::from_scenes(vec![scene.clone(), scene]);
        assert!(matches!(result, Err(PointLearnError::DuplicateScene(id)) if id == "park"));
    }

    #[test]
    fn test_theme_scenes_skip_missing() {
        let catalog = test_catalog();

        let home: Vec<&str> =
            catalog.scenes_for_theme("home").iter().map(|scene| scene.id.as_str()).collect();
        assert_eq!(home, vec!["kitchen"]);

        let all: Vec<&str> =
            catalog.scenes_for_theme(ALL_THEME_ID).iter().map(|scene| scene.id.as_str()).collect();
        assert_eq!(all, vec!["kitchen", "park", "empty"]);

        assert!(catalog.scenes_for_theme("nope").is_empty());
    }

    #[test]
    fn test_find_entry_across_scenes() {
        let catalog = test_catalog();
        let (scene, entry) = catalog.find_entry("Swing").unwrap();
        assert_eq!(scene.id, "park");
        assert_eq!(entry.audio_ref, "Swing.MP3");
        assert!(catalog.find_entry("rocket").is_none());
        assert_eq!(catalog.entries().count(), 7);
    }
}
