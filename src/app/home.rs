use tracing::warn;

use super::AppContext;
use crate::{
    catalog::{
        Theme,
        ALL_THEME_ID,
    },
    progress::{
        ProgressBadge,
        SceneProgress,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct SceneCard {
    pub id: String,
    pub name: String,
    pub localized_name: Option<String>,
    pub progress: SceneProgress,
}

impl SceneCard {
    pub fn badge(&self) -> ProgressBadge {
        self.progress.badge()
    }
}

/// The scene grid, filtered by the selected theme.
#[derive(Debug, Clone)]
pub struct HomePage {
    theme_id: String,
}

impl Default for HomePage {
    fn default() -> Self {
        Self { theme_id: ALL_THEME_ID.to_string() }
    }
}

impl HomePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn theme_id(&self) -> &str {
        &self.theme_id
    }

    pub fn themes<'a>(&self, context: &'a AppContext) -> &'a [Theme] {
        context.catalog.themes().all_themes()
    }

    /// Unknown themes are ignored and keep the current selection.
    pub fn switch_theme(&mut self, context: &AppContext, theme_id: &str) -> bool {
        if context.catalog.themes().get_theme(theme_id).is_none() {
            warn!("Unknown theme: {}", theme_id);
            return false;
        }
        self.theme_id = theme_id.to_string();
        true
    }

    pub fn cards(&self, context: &AppContext) -> Vec<SceneCard> {
        context
            .catalog
            .scenes_for_theme(&self.theme_id)
            .into_iter()
            .map(|scene| SceneCard {
                id: scene.id.clone(),
                name: scene.name.clone(),
                localized_name: scene.localized_name.clone(),
                progress: context.progress.get_scene_progress(&scene.id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::testing::test_app,
        core::WordStatus,
    };

    #[test]
    fn test_cards_follow_theme_and_progress() {
        let mut app = test_app();
        app.context.progress.set_status("bench", WordStatus::Known);
        app.context.progress.set_status("swing", WordStatus::Known);
        app.context.progress.set_status("oven", WordStatus::Known);

        let mut home = HomePage::new();
        let all = home.cards(&app.context);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].progress.text(), "1/5 known");
        assert_eq!(all[0].badge(), ProgressBadge::InProgress);
        assert_eq!(all[1].badge(), ProgressBadge::Complete);
        assert_eq!(all[2].badge(), ProgressBadge::Empty);

        assert!(home.switch_theme(&app.context, "recreation"));
        let recreation = home.cards(&app.context);
        assert_eq!(recreation.len(), 1);
        assert_eq!(recreation[0].id, "park");
        assert_eq!(recreation[0].progress.percentage, 100);
    }

    #[test]
    fn test_unknown_theme_keeps_selection() {
        let app = test_app();
        let mut home = HomePage::new();
        assert!(!home.switch_theme(&app.context, "space"));
        assert_eq!(home.theme_id(), ALL_THEME_ID);
        assert_eq!(home.themes(&app.context)[0].id, ALL_THEME_ID);
    }
}
