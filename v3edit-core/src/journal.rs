use crate::catalog::FeatureType;
use std::collections::VecDeque;
use v3data::RegionId;

/// One reversible change of one region's label on one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRecord {
    pub map_type: FeatureType,
    pub region: RegionId,
    /// `None` when the region had no value on this layer.
    pub old_label: Option<String>,
    pub new_label: String,
}

/// Undo/redo history. No branching: any new edit drops every pending redo.
#[derive(Debug, Clone, Default)]
pub struct EditJournal {
    undo: VecDeque<EditRecord>,
    redo: Vec<EditRecord>,
    cap: Option<usize>,
}

impl EditJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Journal keeping at most `cap` undo entries.
    pub fn with_cap(cap: Option<usize>) -> Self {
        Self {
            cap,
            ..Self::default()
        }
    }

    pub fn push(&mut self, record: EditRecord) {
        self.redo.clear();
        self.push_undo(record);
    }

    /// Appends replayed records in order. Clears redo.
    pub fn extend(&mut self, records: impl IntoIterator<Item = EditRecord>) {
        self.redo.clear();
        for record in records {
            self.push_undo(record);
        }
    }

    fn push_undo(&mut self, record: EditRecord) {
        self.undo.push_back(record);
        if let Some(cap) = self.cap {
            while self.undo.len() > cap {
                self.undo.pop_front();
            }
        }
    }

    /// Moves the newest undo entry to the redo stack and returns it.
    pub fn undo(&mut self) -> Option<EditRecord> {
        let record = self.undo.pop_back()?;
        self.redo.push(record.clone());
        Some(record)
    }

    /// Moves the newest redo entry back onto the undo stack and returns it.
    pub fn redo(&mut self) -> Option<EditRecord> {
        let record = self.redo.pop()?;
        self.push_undo(record.clone());
        Some(record)
    }

    /// Undo history, oldest first.
    pub fn undo_history(&self) -> impl ExactSizeIterator<Item = &EditRecord> {
        self.undo.iter()
    }

    /// Redo history, most recently undone last.
    pub fn redo_history(&self) -> &[EditRecord] {
        &self.redo
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
