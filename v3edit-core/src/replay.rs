//! Batch replay of a saved edit history.
//!
//! Records are collapsed per `(layer, region)` so each region is repainted
//! once with its final label, yet every record still lands in the journal
//! with its old label chained from its predecessor, so interactive undo walks
//! back one step at a time. Each layer is repainted in a single pass through
//! a [`ScratchRaster`].

use crate::catalog::FeatureType;
use crate::journal::EditRecord;
use crate::raster::ScratchRaster;
use crate::session::EditorSession;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use v3data::RegionId;

/// What a replay did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Input records.
    pub records: usize,
    /// Records added to the journal.
    pub applied: usize,
    /// Records dropped with a warning.
    pub skipped: usize,
    /// Distinct regions repainted.
    pub repainted: usize,
    /// Layers finalized.
    pub groups: usize,
    /// Stopped early between layers.
    pub cancelled: bool,
}

struct CollapsedKey {
    region: RegionId,
    /// Input positions, in input order.
    records: Vec<usize>,
}

struct Group {
    map_type: FeatureType,
    keys: Vec<CollapsedKey>,
}

impl Group {
    fn record_count(&self) -> usize {
        self.keys.iter().map(|k| k.records.len()).sum()
    }
}

/// Groups records by layer (first appearance order) and, within a layer, by
/// region (first appearance order).
fn collapse(history: &[EditRecord]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut group_of: FxHashMap<FeatureType, usize> = FxHashMap::default();
    let mut key_of: FxHashMap<(FeatureType, RegionId), usize> = FxHashMap::default();

    for (i, record) in history.iter().enumerate() {
        let g = *group_of.entry(record.map_type).or_insert_with(|| {
            groups.push(Group {
                map_type: record.map_type,
                keys: Vec::new(),
            });
            groups.len() - 1
        });
        let keys = &mut groups[g].keys;
        match key_of.entry((record.map_type, record.region)) {
            Entry::Occupied(slot) => keys[*slot.get()].records.push(i),
            Entry::Vacant(slot) => {
                slot.insert(keys.len());
                keys.push(CollapsedKey {
                    region: record.region,
                    records: vec![i],
                });
            }
        }
    }
    groups
}

struct Progress {
    done: usize,
    total: usize,
    interval: usize,
    reported: usize,
}

impl Progress {
    fn advance(&mut self, session: &EditorSession, by: usize) {
        for _ in 0..by {
            self.done += 1;
            if self.done % self.interval == 0 {
                session.observer().report_progress(self.done, self.total);
                self.reported = self.done;
            }
        }
    }

    fn finish(&mut self, session: &EditorSession) {
        if self.reported != self.done {
            session.observer().report_progress(self.done, self.total);
            self.reported = self.done;
        }
    }
}

impl EditorSession {
    /// Replays `history` onto the current state.
    ///
    /// Old labels in the input are ignored; the journal gets the labels the
    /// registry actually held. Pending redos are always dropped, even when
    /// nothing is replayed.
    pub fn replay(&mut self, history: &[EditRecord]) -> ReplayReport {
        self.replay_with_cancel(history, || false)
    }

    /// [`replay`](Self::replay), polling `cancel` before each layer. Layers
    /// finished before cancellation stay applied and journaled.
    pub fn replay_with_cancel(
        &mut self,
        history: &[EditRecord],
        mut cancel: impl FnMut() -> bool,
    ) -> ReplayReport {
        let mut report = ReplayReport {
            records: history.len(),
            ..ReplayReport::default()
        };
        if history.is_empty() {
            self.journal.extend(std::iter::empty());
            return report;
        }

        let groups = collapse(history);
        log::info!(
            "Replaying {} changes over {} layers",
            history.len(),
            groups.len()
        );
        let mut progress = Progress {
            done: 0,
            total: history.len(),
            interval: self.config.progress_interval.max(1),
            reported: 0,
        };
        let mut journaled: Vec<(usize, EditRecord)> = Vec::with_capacity(history.len());

        for group in groups {
            if cancel() {
                log::info!("Replay cancelled after {} layers", report.groups);
                report.cancelled = true;
                break;
            }
            let map_type = group.map_type;
            let key = self.catalog.key(map_type).to_string();

            let layer = if self.set_map_type(map_type) {
                self.layers.remove(&map_type)
            } else {
                None
            };
            let Some(layer) = layer else {
                let count = group.record_count();
                self.warn(&format!(
                    "Skipping {} changes for '{}': layer not loaded",
                    count, key
                ));
                report.skipped += count;
                progress.advance(self, count);
                continue;
            };

            let mut scratch = ScratchRaster::new(layer);
            for collapsed in &group.keys {
                let count = collapsed.records.len();
                let Some(current) = self.current_label(collapsed.region, map_type) else {
                    self.warn(&format!(
                        "Skipping {} changes for '{}': region {} is not defined",
                        count, key, collapsed.region
                    ));
                    report.skipped += count;
                    progress.advance(self, count);
                    continue;
                };
                let unknown = collapsed
                    .records
                    .iter()
                    .map(|&i| history[i].new_label.as_str())
                    .find(|label| self.catalog.resolve(map_type, label).is_none());
                if let Some(label) = unknown {
                    self.warn(&format!(
                        "Skipping {} changes for '{}' at {}: unknown label '{}'",
                        count, key, collapsed.region, label
                    ));
                    report.skipped += count;
                    progress.advance(self, count);
                    continue;
                }

                let mut old = current.map(str::to_string);
                for &i in &collapsed.records {
                    let new = history[i].new_label.clone();
                    journaled.push((
                        i,
                        EditRecord {
                            map_type,
                            region: collapsed.region,
                            old_label: std::mem::replace(&mut old, Some(new.clone())),
                            new_label: new,
                        },
                    ));
                }
                if let Some(last) = old {
                    self.registry.set_attribute(collapsed.region, &key, &last);
                    scratch.paint(collapsed.region, self.label_color(map_type, &last));
                }
                report.repainted += 1;
                progress.advance(self, count);
            }

            let layer = scratch.finalize(self.base.image());
            self.observer().notify_repaint(&key, &layer);
            self.layers.insert(map_type, layer);
            report.groups += 1;
        }
        progress.finish(self);

        journaled.sort_unstable_by_key(|(i, _)| *i);
        report.applied = journaled.len();
        self.journal
            .extend(journaled.into_iter().map(|(_, record)| record));

        log::info!(
            "Replay done: {} applied, {} skipped, {} regions repainted",
            report.applied,
            report.skipped,
            report.repainted
        );
        report
    }
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
