//! Hooks from the engine to whatever front end hosts it.
//!
//! The engine never draws or beeps itself. Repaints, batch progress, data
//! warnings and empty undo/redo requests are reported through a
//! [`SessionObserver`]; [`LogObserver`] routes them to the `log` facade.

use image::RgbImage;
use std::fmt;

/// Which history an undo/redo request targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Undo => write!(f, "undo"),
            Direction::Redo => write!(f, "redo"),
        }
    }
}

/// Receives engine notifications. All methods default to doing nothing.
pub trait SessionObserver: Send {
    /// A layer's pixels changed, or the active layer switched.
    fn notify_repaint(&self, _map_type: &str, _layer: &RgbImage) {}

    /// Batch replay progress, in input records.
    fn report_progress(&self, _done: usize, _total: usize) {}

    /// Recoverable data problem (unknown label, missing region).
    fn emit_warning(&self, _message: &str) {}

    /// Undo or redo was requested with an empty history.
    fn nothing_to_do(&self, _direction: Direction) {}
}

/// Observer that writes everything to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SessionObserver for LogObserver {
    fn notify_repaint(&self, map_type: &str, layer: &RgbImage) {
        let (width, height) = layer.dimensions();
        log::debug!("Repainted {} ({}x{})", map_type, width, height);
    }

    fn report_progress(&self, done: usize, total: usize) {
        log::info!("Applying changes... ({}/{})", done, total);
    }

    fn emit_warning(&self, message: &str) {
        log::warn!("{}", message);
    }

    fn nothing_to_do(&self, direction: Direction) {
        log::info!("Nothing to {}", direction);
    }
}
