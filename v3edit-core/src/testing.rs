//! Fixtures for tests: a small hand-built session and an observer that
//! records what it is told.

use crate::catalog::{FeatureCatalog, FeatureTypeDescriptor};
use crate::config::{EngineConfig, LookupStrategy};
use crate::observer::{Direction, SessionObserver};
use crate::registry::{ProvinceRecord, ProvinceRegistry};
use crate::session::EditorSession;
use image::{Rgb, RgbImage};
use std::sync::{Arc, Mutex};
use v3data::labels::{LabelRow, SUITABILITY_BANDS};
use v3data::terrain::TerrainMap;
use v3data::{Color, RegionId};

/// Parses a fixture region key.
///
/// # Panics
/// On a malformed key.
pub fn region(hex: &str) -> RegionId {
    hex.parse()
        .unwrap_or_else(|e| panic!("bad fixture region {:?}: {}", hex, e))
}

fn label(key: &str, hex: &str, desc_short: &str) -> LabelRow {
    LabelRow {
        key: key.to_string(),
        color: Color::parse_hex(hex).unwrap_or(Color::BLANK),
        desc_short: desc_short.to_string(),
        desc_long: String::new(),
    }
}

pub struct SessionBuilder {
    config: EngineConfig,
    catalog: FeatureCatalog,
    registry: ProvinceRegistry,
    image: RgbImage,
    enabled: Option<Vec<String>>,
    active: String,
    terrains: TerrainMap,
    observer: Option<Box<dyn SessionObserver>>,
}

impl SessionBuilder {
    /// Empty catalog and registry over `image`.
    pub fn new(image: RgbImage) -> Self {
        Self {
            config: EngineConfig {
                lookup: LookupStrategy::Sparse,
                ..EngineConfig::default()
            },
            catalog: FeatureCatalog::new(),
            registry: ProvinceRegistry::new(),
            image,
            enabled: None,
            active: "climate".to_string(),
            terrains: TerrainMap::new(),
            observer: None,
        }
    }

    /// An 8x4 map:
    ///
    /// ```text
    /// FF0000 FF0000 00FF00 00FF00 0000FF 0000FF FFFF00 FFFF00
    /// FF0000 FF0000 00FF00 00FF00 0000FF 0000FF FFFF00 FFFF00
    /// FF0000 FF0000 00FF00 00FF00 0000FF 0000FF 000080 000080
    /// FF0000 FF0000 00FF00 00FF00 0000FF 0000FF 000080 000080
    /// ```
    /// `000080` is ocean with no record. Layers: `climate`, `topography`,
    /// `vegetation` and the numerical `low_wheat` and `high_wheat`. No region
    /// has a `high_wheat` value.
    pub fn standard() -> Self {
        let image = RgbImage::from_fn(8, 4, |x, y| match (x, y) {
            (0..=1, _) => Rgb([0xFF, 0, 0]),
            (2..=3, _) => Rgb([0, 0xFF, 0]),
            (4..=5, _) => Rgb([0, 0, 0xFF]),
            (_, 0..=1) => Rgb([0xFF, 0xFF, 0]),
            _ => Rgb([0, 0, 0x80]),
        });

        Self::new(image)
            .with_feature(FeatureTypeDescriptor::categorical(
                "climate",
                "Climate",
                vec![
                    label("Cfa", "00C800", "Humid subtropical"),
                    label("BWh", "E6B450", "Hot desert"),
                    label("Dfb", "3C8CC8", "Warm-summer continental"),
                ],
            ))
            .with_feature(FeatureTypeDescriptor::categorical(
                "topography",
                "Topography",
                vec![
                    label("plains", "A0DC78", "Plains"),
                    label("hills", "B48C50", "Hills"),
                ],
            ))
            .with_feature(FeatureTypeDescriptor::categorical(
                "vegetation",
                "Vegetation",
                vec![
                    label("forest", "287828", "Forest"),
                    label("grassland", "C8E678", "Grassland"),
                ],
            ))
            .with_feature(FeatureTypeDescriptor::numerical(
                "low_wheat",
                "Wheat (Low)",
                &SUITABILITY_BANDS,
            ))
            .with_feature(FeatureTypeDescriptor::numerical(
                "high_wheat",
                "Wheat (High)",
                &SUITABILITY_BANDS,
            ))
            .with_state("SKANE", &["FF0000"])
            .with_state("SVEALAND", &["00FF00", "0000FF"])
            .with_state("NORRLAND", &["FFFF00"])
            .assign("00FF00", "climate", "Cfa")
            .assign("0000FF", "climate", "Dfb")
            .assign("FFFF00", "climate", "BWh")
            .assign("FF0000", "topography", "plains")
            .assign("00FF00", "topography", "hills")
            .assign("FF0000", "low_wheat", "130")
            .assign("00FF00", "low_wheat", "0")
            .assign("0000FF", "low_wheat", "255")
            .assign("FFFF00", "low_wheat", "51")
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn lookup(mut self, lookup: LookupStrategy) -> Self {
        self.config.lookup = lookup;
        self
    }

    pub fn with_feature(mut self, descriptor: FeatureTypeDescriptor) -> Self {
        self.catalog.add(descriptor);
        self
    }

    /// Adds seeded records for each region of a state.
    pub fn with_state(mut self, name: &str, regions: &[&str]) -> Self {
        for hex in regions {
            self.registry.insert(region(hex), ProvinceRecord::new(name));
        }
        self
    }

    pub fn assign(mut self, hex: &str, feature: &str, label: &str) -> Self {
        self.registry.set_attribute(region(hex), feature, label);
        self
    }

    /// Layers to load; all catalog layers when never called.
    pub fn enabled(mut self, features: &[&str]) -> Self {
        self.enabled = Some(features.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn active(mut self, feature: &str) -> Self {
        self.active = feature.to_string();
        self
    }

    pub fn with_terrain(mut self, hex: &str, terrain: &str) -> Self {
        self.terrains.insert(region(hex), terrain.to_string());
        self
    }

    pub fn observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> EditorSession {
        let catalog = self.catalog;
        let enabled: Vec<_> = match &self.enabled {
            Some(names) => names.iter().filter_map(|n| catalog.lookup(n)).collect(),
            None => catalog.types().collect(),
        };
        let active = catalog
            .lookup(&self.active)
            .or_else(|| enabled.first().copied())
            .or_else(|| catalog.types().next());
        let Some(active) = active else {
            panic!("fixture session needs at least one feature");
        };

        let session = EditorSession::new(
            self.config,
            catalog,
            self.registry,
            self.image,
            &enabled,
            active,
        )
        .with_terrains(self.terrains);
        match self.observer {
            Some(observer) => session.with_observer(observer),
            None => session,
        }
    }
}

/// Something a [`RecordingObserver`] was told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Repaint(String),
    Progress(usize, usize),
    Warning(String),
    NothingToDo(Direction),
}

/// Observer that keeps every notification. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<Observed>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Observed> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn record(&self, event: Observed) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl SessionObserver for RecordingObserver {
    fn notify_repaint(&self, map_type: &str, _layer: &RgbImage) {
        self.record(Observed::Repaint(map_type.to_string()));
    }

    fn report_progress(&self, done: usize, total: usize) {
        self.record(Observed::Progress(done, total));
    }

    fn emit_warning(&self, message: &str) {
        self.record(Observed::Warning(message.to_string()));
    }

    fn nothing_to_do(&self, direction: Direction) {
        self.record(Observed::NothingToDo(direction));
    }
}
