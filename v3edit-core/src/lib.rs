//! # Province Feature Map Engine
//!
//! Edits per-region feature labels (climate, topography, vegetation, crop
//! suitability) over a color-keyed province map and keeps one rendered
//! raster per feature layer in sync.
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌──────────────┐
//! │ BaseRaster   │──▶│ synthesize    │──▶│ layer rasters│
//! │ (read-only)  │   │ (table pass)  │   │ (one/layer)  │
//! └──────────────┘   └───────▲───────┘   └──────▲───────┘
//!                            │                  │ repaint_region
//! ┌──────────────┐   ┌───────┴───────┐   ┌──────┴───────┐
//! │FeatureCatalog│──▶│ProvinceRegistry│◀──│ EditorSession│──▶ EditJournal
//! └──────────────┘   └───────────────┘   └──────┬───────┘
//!                                               │ replay / snapshot
//!                                               ▼
//!                                         project_state.json
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`EditorSession`] | Owns registry, catalog, journal and layers |
//! | [`FeatureCatalog`] | Layers and their label domains |
//! | [`ProvinceRegistry`] | Region identity -> attribute record |
//! | [`EditJournal`] | Undo/redo history |
//! | [`ProjectSnapshot`] | Persisted history, replayed on import |
//! | [`SessionObserver`] | Repaint, progress and warning notifications |

pub mod catalog;
pub mod config;
pub mod editor;
pub mod journal;
pub mod observer;
pub mod raster;
pub mod registry;
pub mod replay;
pub mod session;
pub mod snapshot;
pub mod testing;

pub use catalog::{FeatureCatalog, FeatureType, FeatureTypeDescriptor, LabelDescriptor};
pub use config::{EngineConfig, LookupStrategy};
pub use editor::{CopyOutcome, EditOutcome, HistoryOutcome, NoOpReason, SelectError};
pub use journal::{EditJournal, EditRecord};
pub use observer::{Direction, LogObserver, SessionObserver};
pub use raster::{BaseRaster, ScratchRaster, SubstitutionTable, SynthesisReport};
pub use registry::{ProvinceRecord, ProvinceRegistry};
pub use replay::ReplayReport;
pub use session::{EditorSession, FeatureValue, Picker, RegionInfo};
pub use snapshot::{ExportError, ProjectSnapshot, SnapshotEntry};
