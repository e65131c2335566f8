//! Exports and project snapshots.
//!
//! An export is a timestamped directory holding one `<attribute>.csv` per
//! registry attribute (`region,value` rows, no header) and a
//! `project_state.json` with the undo history. Replaying that history onto
//! freshly loaded data reproduces the exported registry.

use crate::catalog::{FeatureCatalog, FeatureType};
use crate::journal::{EditJournal, EditRecord};
use crate::registry::ProvinceRegistry;
use crate::session::EditorSession;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use v3data::RegionId;

pub const PROJECT_FILE: &str = "project_state.json";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error writing {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ExportError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn csv(path: &Path) -> impl FnOnce(csv::Error) -> Self + '_ {
        move |source| ExportError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path) -> impl FnOnce(serde_json::Error) -> Self + '_ {
        move |source| ExportError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One journal entry as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub map_type: String,
    #[serde(rename = "location_HEX")]
    pub location: String,
    pub old_feature: String,
    pub new_feature: String,
}

/// Contents of `project_state.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub undo_stack: Vec<SnapshotEntry>,
    pub current_map_type: String,
    #[serde(default)]
    pub loaded_maps: Vec<String>,
}

impl ProjectSnapshot {
    /// Drops history for layers outside `enabled`. When anything was dropped,
    /// `loaded_maps` becomes `enabled`.
    pub fn retain_map_types<S: AsRef<str>>(&mut self, enabled: &[S]) {
        let before = self.undo_stack.len();
        self.undo_stack
            .retain(|e| enabled.iter().any(|m| m.as_ref() == e.map_type));
        let dropped = before - self.undo_stack.len();
        if dropped > 0 {
            log::info!("Dropped {} changes for layers that are not loaded", dropped);
            self.loaded_maps = enabled.iter().map(|m| m.as_ref().to_string()).collect();
        }
    }

    /// Resolves the history against a catalog. Entries naming an unknown
    /// layer or a malformed region are dropped with a warning.
    pub fn to_records(&self, catalog: &FeatureCatalog) -> Vec<EditRecord> {
        let mut records = Vec::with_capacity(self.undo_stack.len());
        for (i, entry) in self.undo_stack.iter().enumerate() {
            let Some(map_type) = catalog.lookup(&entry.map_type) else {
                log::warn!("Change {}: unknown map type '{}'", i, entry.map_type);
                continue;
            };
            let region = match entry.location.parse::<RegionId>() {
                Ok(region) => region,
                Err(e) => {
                    log::warn!("Change {}: bad location '{}': {}", i, entry.location, e);
                    continue;
                }
            };
            records.push(EditRecord {
                map_type,
                region,
                old_label: Some(entry.old_feature.clone()),
                new_label: entry.new_feature.clone(),
            });
        }
        records
    }
}

/// One column per attribute, `(region, value)` in region order.
pub fn export_columns(registry: &ProvinceRegistry) -> BTreeMap<String, Vec<(RegionId, String)>> {
    registry
        .attribute_keys()
        .into_iter()
        .map(|key| {
            let rows = registry
                .column(key)
                .map(|(region, value)| (region, value.to_string()))
                .collect();
            (key.to_string(), rows)
        })
        .collect()
}

pub fn export_journal(
    journal: &EditJournal,
    catalog: &FeatureCatalog,
    active: FeatureType,
    loaded: impl IntoIterator<Item = FeatureType>,
) -> ProjectSnapshot {
    ProjectSnapshot {
        undo_stack: journal
            .undo_history()
            .map(|r| SnapshotEntry {
                map_type: catalog.key(r.map_type).to_string(),
                location: r.region.to_string(),
                old_feature: r.old_label.clone().unwrap_or_default(),
                new_feature: r.new_label.clone(),
            })
            .collect(),
        current_map_type: catalog.key(active).to_string(),
        loaded_maps: loaded
            .into_iter()
            .map(|ft| catalog.key(ft).to_string())
            .collect(),
    }
}

impl EditorSession {
    pub fn snapshot(&self) -> ProjectSnapshot {
        export_journal(
            &self.journal,
            &self.catalog,
            self.active,
            self.loaded_map_types(),
        )
    }

    /// Writes the registry and history under `root/<timestamp>/`.
    pub fn export(&self, root: &Path) -> Result<PathBuf, ExportError> {
        write_export(root, &self.registry, &self.snapshot())
    }
}

/// Creates `root/YYYYmmdd_HHMMSS/` and writes the export into it.
pub fn write_export(
    root: &Path,
    registry: &ProvinceRegistry,
    snapshot: &ProjectSnapshot,
) -> Result<PathBuf, ExportError> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let dir = root.join(stamp);
    write_export_to(&dir, registry, snapshot)?;
    Ok(dir)
}

/// Writes an export into `dir`, creating it if needed.
pub fn write_export_to(
    dir: &Path,
    registry: &ProvinceRegistry,
    snapshot: &ProjectSnapshot,
) -> Result<(), ExportError> {
    fs::create_dir_all(dir).map_err(ExportError::io(dir))?;

    for (column, rows) in export_columns(registry) {
        let path = dir.join(format!("{}.csv", column));
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(ExportError::csv(&path))?;
        for (region, value) in &rows {
            writer
                .write_record([region.to_string().as_str(), value.as_str()])
                .map_err(ExportError::csv(&path))?;
        }
        writer.flush().map_err(ExportError::io(&path))?;
        log::info!("Exported {} rows of {} to {}", rows.len(), column, path.display());
    }

    let path = dir.join(PROJECT_FILE);
    let json = serde_json::to_string_pretty(snapshot).map_err(ExportError::json(&path))?;
    fs::write(&path, json).map_err(ExportError::io(&path))?;
    log::info!(
        "Saved {} changes to {}",
        snapshot.undo_stack.len(),
        path.display()
    );
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<ProjectSnapshot, ExportError> {
    let json = fs::read_to_string(path).map_err(ExportError::io(path))?;
    let snapshot: ProjectSnapshot =
        serde_json::from_str(&json).map_err(ExportError::json(path))?;
    log::info!(
        "Loaded project with {} changes, current map '{}'",
        snapshot.undo_stack.len(),
        snapshot.current_map_type
    );
    Ok(snapshot)
}
