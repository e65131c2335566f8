use crate::error::LoadError;
use crate::labels::ColorFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Per-layer entry of the feature catalog descriptor (`mappings/feature_data.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    /// Human-readable layer name ("Climate", "Wheat (Low)").
    pub display_name: String,
    /// Hotkeys the front end binds to this layer.
    #[serde(default)]
    pub hotkey: Vec<String>,
    /// Numerical layers store a 0..=255 level instead of a categorical label.
    #[serde(default, alias = "isGradient")]
    pub is_numerical: bool,
    /// Whether the label table writes colors as hex text.
    #[serde(default = "default_true")]
    pub needs_rgb_conversion: bool,
    /// Feature-to-region mapping file, relative to the resource directory.
    #[serde(default)]
    pub file_details: Option<PathBuf>,
    /// Label table file, relative to the resource directory.
    #[serde(default)]
    pub file_data: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl FeatureDescriptor {
    pub fn color_format(&self) -> ColorFormat {
        if self.needs_rgb_conversion {
            ColorFormat::Hex
        } else {
            ColorFormat::Triple
        }
    }

    /// Mapping file, defaulting to `mappings/location_<key>.csv`.
    pub fn mapping_path(&self, resource_dir: &Path, key: &str) -> PathBuf {
        match &self.file_details {
            Some(p) => resource_dir.join(p),
            None => resource_dir
                .join("mappings")
                .join(format!("location_{}.csv", key)),
        }
    }

    /// Label table, defaulting to `feature_details/feature_details_<key>.csv`.
    pub fn labels_path(&self, resource_dir: &Path, key: &str) -> PathBuf {
        match &self.file_data {
            Some(p) => resource_dir.join(p),
            None => resource_dir
                .join("feature_details")
                .join(format!("feature_details_{}.csv", key)),
        }
    }
}

/// Loads the descriptor, keyed by feature key. Layers come back in key order.
pub fn load_feature_descriptors(
    path: &Path,
) -> Result<BTreeMap<String, FeatureDescriptor>, LoadError> {
    let json = std::fs::read_to_string(path).map_err(LoadError::io(path))?;
    let descriptors: BTreeMap<String, FeatureDescriptor> =
        serde_json::from_str(&json).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Loaded {} feature descriptors", descriptors.len());
    Ok(descriptors)
}
