//! Scene loading, dispatched by file extension.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use udimscan_core::{MemoryScene, SceneQuery};
use udimscan_gltf::GltfScene;

/// Recognized glTF extensions.
pub const GLTF_EXTENSIONS: &[&str] = &["glb", "gltf"];

/// Recognized scene document extensions.
pub const JSON_EXTENSIONS: &[&str] = &["json"];

/// Identifies the format of a scene file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    /// glTF 2.0, binary or JSON.
    Gltf,
    /// udimscan scene document.
    Json,
}

impl SceneKind {
    /// Picks the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if GLTF_EXTENSIONS.contains(&ext.as_str()) {
            Some(SceneKind::Gltf)
        } else if JSON_EXTENSIONS.contains(&ext.as_str()) {
            Some(SceneKind::Json)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SceneKind::Gltf => "gltf",
            SceneKind::Json => "json",
        }
    }
}

impl std::fmt::Display for SceneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Loads a scene from disk.
pub fn load_scene(path: &Path) -> Result<Box<dyn SceneQuery>> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }

    let kind = SceneKind::from_path(path).with_context(|| {
        format!(
            "Unsupported scene file: {} (expected .glb, .gltf or .json)",
            path.display()
        )
    })?;

    let scene: Box<dyn SceneQuery> = match kind {
        SceneKind::Gltf => Box::new(
            GltfScene::from_path(path)
                .with_context(|| format!("Failed to load glTF scene: {}", path.display()))?,
        ),
        SceneKind::Json => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read scene file: {}", path.display()))?;
            Box::new(
                MemoryScene::from_slice(&bytes)
                    .with_context(|| format!("Failed to parse scene file: {}", path.display()))?,
            )
        }
    };
    tracing::debug!(path = %path.display(), %kind, "loaded scene");
    Ok(scene)
}
