use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use reqwest::Url;
use tracing::warn;

use crate::core::{
    PointLearnError,
    Scene,
};

pub const DEFAULT_PLACEHOLDER_COLOR: &str = "CCCCCC";
const PLACEHOLDER_TEXT_COLOR: &str = "333333";

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Local(PathBuf),
    Placeholder(String),
}

/// `{base}/{color}/333333?text={scene name}`
pub fn placeholder_url(base: &str, scene: &Scene) -> Result<String, PointLearnError> {
    let color = scene.color.as_deref().unwrap_or(DEFAULT_PLACEHOLDER_COLOR);
    let raw = format!("{}/{}/{}", base.trim_end_matches('/'), color, PLACEHOLDER_TEXT_COLOR);
    let url = Url::parse_with_params(&raw, &[("text", scene.name.as_str())])
        .map_err(|e| PointLearnError::Custom(format!("Invalid placeholder URL {}: {}", raw, e)))?;
    Ok(url.to_string())
}

/// Local scene image when present and non-empty, placeholder service otherwise.
pub fn scene_image(
    scene: &Scene,
    image_dir: &Path,
    placeholder_base: &str,
) -> Result<ImageSource, PointLearnError> {
    let local = image_dir.join(&scene.image_path);
    match fs::metadata(&local) {
        Ok(metadata) if metadata.is_file() && metadata.len() > 0 => {
            return Ok(ImageSource::Local(local));
        }
        Ok(_) => {
            warn!("Image for scene {} is empty ({}), using placeholder", scene.id, local.display())
        }
        Err(_) => {
            warn!("Image missing for scene {} ({}), using placeholder", scene.id, local.display())
        }
    }

    placeholder_url(placeholder_base, scene).map(ImageSource::Placeholder)
}
