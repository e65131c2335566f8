//! Point edits, the picker, and undo/redo.
//!
//! An edit walks `resolve -> validate -> commit -> repaint`. Every routine
//! rejection (pointer off the map, nothing picked, wrong layer active) comes
//! back as [`EditOutcome::NoOp`] rather than an error.

use crate::catalog::FeatureType;
use crate::journal::EditRecord;
use crate::observer::Direction;
use crate::session::{EditorSession, Picker};
use thiserror::Error;
use v3data::RegionId;

/// Why an edit did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    OutOfBounds,
    NoPicker,
    /// The color under the pointer has no registry record.
    UnknownRegion,
    /// The active layer is not the picker's layer.
    LayerMismatch,
    /// The region's current label is not in the catalog.
    UnavailableLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied(RegionId),
    NoOp(NoOpReason),
}

impl EditOutcome {
    pub fn region(self) -> Option<RegionId> {
        match self {
            EditOutcome::Applied(region) => Some(region),
            EditOutcome::NoOp(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOutcome {
    Applied(EditRecord),
    NothingToDo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied(Picker),
    /// No usable label under the pointer; the picker was cleared.
    Invalid,
    OutOfBounds,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[error("Unknown feature '{0}'")]
    UnknownFeature(String),
    #[error("Unknown label '{label}' for feature '{feature}'")]
    UnknownLabel { feature: String, label: String },
}

impl EditorSession {
    /// Sets the picker from a legend entry.
    pub fn select(&mut self, map_type: FeatureType, label: &str) -> Result<&Picker, SelectError> {
        let Some(descriptor) = self.catalog.descriptor(map_type) else {
            return Err(SelectError::UnknownFeature(map_type.to_string()));
        };
        let Some(entry) = descriptor.label(label) else {
            return Err(SelectError::UnknownLabel {
                feature: descriptor.key.clone(),
                label: label.to_string(),
            });
        };
        let picker = Picker {
            map_type,
            label: label.to_string(),
            color: entry.color,
        };
        Ok(self.picker.insert(picker))
    }

    /// [`select`](Self::select) by feature key.
    pub fn select_by_name(&mut self, feature: &str, label: &str) -> Result<&Picker, SelectError> {
        let map_type = self
            .catalog
            .lookup(feature)
            .ok_or_else(|| SelectError::UnknownFeature(feature.to_string()))?;
        self.select(map_type, label)
    }

    pub fn clear_picker(&mut self) {
        self.picker = None;
    }

    /// Picks the active layer's label of the region under the pointer.
    pub fn copy_at(&mut self, x: i64, y: i64) -> CopyOutcome {
        let Some(region) = self.region_at(x, y) else {
            return CopyOutcome::OutOfBounds;
        };
        let map_type = self.active;
        let picked = self.current_label(region, map_type).flatten().and_then(|label| {
            self.catalog.color_of(map_type, label).map(|color| Picker {
                map_type,
                label: label.to_string(),
                color,
            })
        });
        self.picker = picked.clone();
        match picked {
            Some(picker) => CopyOutcome::Copied(picker),
            None => CopyOutcome::Invalid,
        }
    }

    /// Paints the picker's label onto the region under the pointer.
    pub fn apply_at(&mut self, x: i64, y: i64) -> EditOutcome {
        match self.region_at(x, y) {
            Some(region) => self.apply_to_region(region),
            None => EditOutcome::NoOp(NoOpReason::OutOfBounds),
        }
    }

    pub fn paste_at(&mut self, x: i64, y: i64) -> EditOutcome {
        self.apply_at(x, y)
    }

    /// Paints the picker's label onto `region`.
    pub fn apply_to_region(&mut self, region: RegionId) -> EditOutcome {
        let Some(picker) = &self.picker else {
            return EditOutcome::NoOp(NoOpReason::NoPicker);
        };
        let Some(current) = self.current_label(region, picker.map_type) else {
            return EditOutcome::NoOp(NoOpReason::UnknownRegion);
        };
        if self.active != picker.map_type {
            return EditOutcome::NoOp(NoOpReason::LayerMismatch);
        }
        // Unassigned regions may be painted; unknown labels may not.
        let unavailable = current
            .is_some_and(|c| !c.is_empty() && self.catalog.resolve(picker.map_type, c).is_none());
        if unavailable {
            return EditOutcome::NoOp(NoOpReason::UnavailableLabel);
        }

        let record = EditRecord {
            map_type: picker.map_type,
            region,
            old_label: current.map(str::to_string),
            new_label: picker.label.clone(),
        };
        self.journal.push(record.clone());
        self.write_label(record.map_type, region, Some(&record.new_label));
        EditOutcome::Applied(region)
    }

    /// Reverts the newest edit and shows its layer.
    pub fn undo(&mut self) -> HistoryOutcome {
        let Some(record) = self.journal.undo() else {
            self.observer().nothing_to_do(Direction::Undo);
            return HistoryOutcome::NothingToDo;
        };
        self.set_map_type(record.map_type);
        self.write_label(record.map_type, record.region, record.old_label.as_deref());
        HistoryOutcome::Applied(record)
    }

    /// Re-applies the newest undone edit and shows its layer.
    pub fn redo(&mut self) -> HistoryOutcome {
        let Some(record) = self.journal.redo() else {
            self.observer().nothing_to_do(Direction::Redo);
            return HistoryOutcome::NothingToDo;
        };
        self.set_map_type(record.map_type);
        self.write_label(record.map_type, record.region, Some(&record.new_label));
        HistoryOutcome::Applied(record)
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod tests;
