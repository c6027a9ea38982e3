use serde::{
    Deserialize,
    Serialize,
};

pub const ALL_THEME_ID: &str = "all";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Theme {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub scenes: Vec<String>,
}

/// Theme groupings over the catalog. The `all` theme always lists every scene.
#[derive(Debug, Clone, Default)]
pub struct ThemeCatalog {
    themes: Vec<Theme>,
}

impl ThemeCatalog {
    pub fn new(mut themes: Vec<Theme>, scene_ids: &[String]) -> Self {
        match themes.iter_mut().find(|theme| theme.id == ALL_THEME_ID) {
            Some(all) => all.scenes = scene_ids.to_vec(),
            None => themes.insert(
                0,
                Theme {
                    id: ALL_THEME_ID.to_string(),
                    name: "All".to_string(),
                    scenes: scene_ids.to_vec(),
                },
            ),
        }
        Self { themes }
    }

    pub fn all_themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn get_theme(&self, theme_id: &str) -> Option<&Theme> {
        self.themes.iter().find(|theme| theme.id == theme_id)
    }

    /// The first specific theme listing the scene, `all` otherwise.
    pub fn theme_of(&self, scene_id: &str) -> Option<&Theme> {
        self.themes
            .iter()
            .filter(|theme| theme.id != ALL_THEME_ID)
            .find(|theme| theme.scenes.iter().any(|id| id == scene_id))
            .or_else(|| self.get_theme(ALL_THEME_ID))
    }
}
