use crate::mesh::compact::DedupStrategy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-load import options. Also the `.meta` settings of
/// [`SkinnedSceneLoader`](crate::loader::SkinnedSceneLoader).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Uniform factor applied to control point positions.
    pub scale: f32,
    /// Extension (without the dot) texture file names are rewritten to.
    pub texture_extension: String,
    /// Run the right-handed to left-handed conversion on meshes.
    /// Joint transforms are always converted.
    pub convert_handedness: bool,
    pub dedup: DedupStrategy,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            texture_extension: "dds".to_string(),
            convert_handedness: true,
            dedup: DedupStrategy::default(),
        }
    }
}

/// A file to import together with the settings to import it with.
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    pub path: PathBuf,
    pub settings: ImportSettings,
}

impl ImportConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            settings: ImportSettings::default(),
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.settings.scale = scale;
        self
    }
}
