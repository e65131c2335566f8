use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use v3edit_core::EngineConfig;

/// Layer that is loaded no matter what the settings say.
pub const ALWAYS_ENABLED: &str = "climate";

/// Editor settings (`editor_settings.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub default_map_type: String,
    pub enabled_maps: Vec<String>,
    /// Victoria 3 installation.
    #[serde(deserialize_with = "empty_as_none")]
    pub game_directory: Option<PathBuf>,
    /// Province map image; defaults to the game's or `<resource_dir>/provinces.png`.
    #[serde(deserialize_with = "empty_as_none")]
    pub locations_file: Option<PathBuf>,
    #[serde(deserialize_with = "empty_as_none")]
    pub state_regions_path: Option<PathBuf>,
    /// Root of `mappings/` and `feature_details/`.
    pub resource_dir: PathBuf,
    pub export_dir: PathBuf,
    pub engine: EngineConfig,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            default_map_type: ALWAYS_ENABLED.to_string(),
            enabled_maps: vec![ALWAYS_ENABLED.to_string()],
            game_directory: None,
            locations_file: None,
            state_regions_path: None,
            resource_dir: PathBuf::from("res"),
            export_dir: PathBuf::from("exports"),
            engine: EngineConfig::default(),
        }
    }
}

/// Older settings files write unset paths as `""`.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let path = Option::<PathBuf>::deserialize(deserializer)?;
    Ok(path.filter(|p| !p.as_os_str().is_empty()))
}

fn template_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".template");
    PathBuf::from(name)
}

impl EditorSettings {
    /// Loads settings, falling back to `<path>.template` (which is then saved
    /// as `path`) and finally to defaults. Unreadable files are logged and
    /// skipped.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match Self::read(path) {
                Ok(settings) => return settings.normalized(),
                Err(e) => log::warn!("Ignoring settings file: {:#}", e),
            }
        }

        let template = template_path(path);
        if template.exists() {
            match Self::read(&template) {
                Ok(settings) => {
                    let settings = settings.normalized();
                    if let Err(e) = settings.save(path) {
                        log::warn!("Could not save settings from template: {:#}", e);
                    }
                    return settings;
                }
                Err(e) => log::warn!("Ignoring settings template: {:#}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    fn read(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.clone().normalized())?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }

    /// Ensures the always-on layer is enabled.
    pub fn normalized(mut self) -> Self {
        if !self.enabled_maps.iter().any(|m| m == ALWAYS_ENABLED) {
            self.enabled_maps.push(ALWAYS_ENABLED.to_string());
        }
        self
    }

    /// Province map image to load.
    pub fn base_raster_path(&self) -> PathBuf {
        if let Some(path) = &self.locations_file {
            return path.clone();
        }
        match &self.game_directory {
            Some(game) => game.join("game").join("map_data").join("provinces.png"),
            None => self.resource_dir.join("provinces.png"),
        }
    }

    /// State regions directory: explicit, then the game directory, then
    /// `<resource_dir>/state_regions`, then an auto-detected install.
    pub fn state_regions_dir(&self) -> Option<PathBuf> {
        if self.state_regions_path.is_some() || self.game_directory.is_some() {
            return v3data::path::resolve_state_regions(
                self.state_regions_path.as_deref(),
                self.game_directory.as_deref(),
            );
        }
        let bundled = self.resource_dir.join("state_regions");
        if bundled.is_dir() {
            return Some(bundled);
        }
        v3data::path::resolve_state_regions(None, None)
    }
}
