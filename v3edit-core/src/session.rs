use crate::catalog::{FeatureCatalog, FeatureType, LabelDescriptor};
use crate::config::EngineConfig;
use crate::journal::EditJournal;
use crate::observer::{LogObserver, SessionObserver};
use crate::raster::{repaint_region, synthesize, BaseRaster};
use crate::registry::ProvinceRegistry;
use image::RgbImage;
use rayon::prelude::*;
use std::collections::BTreeMap;
use v3data::terrain::TerrainMap;
use v3data::{Color, RegionId};

/// The value the next paint writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picker {
    pub map_type: FeatureType,
    pub label: String,
    pub color: Color,
}

/// One layer's value for an inspected region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureValue {
    pub map_type: FeatureType,
    pub key: String,
    pub display_name: String,
    /// Stored label; empty when unassigned.
    pub label: String,
    /// `None` when the label is not in the catalog.
    pub descriptor: Option<LabelDescriptor>,
}

/// What is known about the region under a pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionInfo {
    pub region: RegionId,
    /// State name, `None` for colors outside the registry.
    pub name: Option<String>,
    /// The game's own terrain type, if known.
    pub terrain: Option<String>,
    /// Every catalog layer, in catalog order.
    pub features: Vec<FeatureValue>,
}

/// An editing session: registry, catalog, history, base raster and one
/// rendered layer per loaded feature type.
///
/// All mutation goes through `&mut self`, so an edit is never observed half
/// applied.
pub struct EditorSession {
    pub(crate) config: EngineConfig,
    pub(crate) catalog: FeatureCatalog,
    pub(crate) registry: ProvinceRegistry,
    pub(crate) journal: EditJournal,
    pub(crate) base: BaseRaster,
    pub(crate) layers: BTreeMap<FeatureType, RgbImage>,
    pub(crate) active: FeatureType,
    pub(crate) picker: Option<Picker>,
    terrains: TerrainMap,
    observer: Box<dyn SessionObserver>,
}

impl EditorSession {
    /// Builds a session and renders every layer in `enabled` plus `active`.
    /// Layers render in parallel.
    pub fn new(
        config: EngineConfig,
        catalog: FeatureCatalog,
        registry: ProvinceRegistry,
        base: RgbImage,
        enabled: &[FeatureType],
        active: FeatureType,
    ) -> Self {
        let base = BaseRaster::new(base);
        let mut loaded: Vec<FeatureType> = enabled
            .iter()
            .copied()
            .chain(std::iter::once(active))
            .filter(|&ft| catalog.descriptor(ft).is_some())
            .collect();
        loaded.sort_unstable();
        loaded.dedup();

        let rendered: Vec<(FeatureType, RgbImage)> = loaded
            .par_iter()
            .map(|&ft| {
                let (layer, _) = synthesize(&base, &registry, &catalog, ft, config.lookup);
                (ft, layer)
            })
            .collect();
        log::info!(
            "Session ready: {} regions, {} layers, active '{}'",
            registry.len(),
            rendered.len(),
            catalog.key(active)
        );

        let journal = EditJournal::with_cap(config.journal_cap);
        Self {
            config,
            catalog,
            registry,
            journal,
            base,
            layers: rendered.into_iter().collect(),
            active,
            picker: None,
            terrains: TerrainMap::new(),
            observer: Box::new(LogObserver),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_terrains(mut self, terrains: TerrainMap) -> Self {
        self.terrains = terrains;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &ProvinceRegistry {
        &self.registry
    }

    pub fn journal(&self) -> &EditJournal {
        &self.journal
    }

    pub fn base_raster(&self) -> &BaseRaster {
        &self.base
    }

    pub fn picker(&self) -> Option<&Picker> {
        self.picker.as_ref()
    }

    pub fn active_map_type(&self) -> FeatureType {
        self.active
    }

    pub fn layer(&self, map_type: FeatureType) -> Option<&RgbImage> {
        self.layers.get(&map_type)
    }

    /// The displayed layer.
    pub fn active_layer(&self) -> Option<&RgbImage> {
        self.layers.get(&self.active)
    }

    pub fn loaded_map_types(&self) -> impl Iterator<Item = FeatureType> + '_ {
        self.layers.keys().copied()
    }

    pub fn is_loaded(&self, map_type: FeatureType) -> bool {
        self.layers.contains_key(&map_type)
    }

    /// Switches the displayed layer. Returns `false` if it is not loaded.
    pub fn set_map_type(&mut self, map_type: FeatureType) -> bool {
        let Some(layer) = self.layers.get(&map_type) else {
            return false;
        };
        if self.active != map_type {
            self.active = map_type;
            self.observer.notify_repaint(self.catalog.key(map_type), layer);
        }
        true
    }

    /// Region color under a pixel; `None` outside the raster.
    pub fn region_at(&self, x: i64, y: i64) -> Option<RegionId> {
        self.base.region_at(x, y)
    }

    pub fn inspect(&self, x: i64, y: i64) -> Option<RegionInfo> {
        self.region_at(x, y).map(|region| self.inspect_region(region))
    }

    pub fn inspect_region(&self, region: RegionId) -> RegionInfo {
        let record = self.registry.get(region);
        let features = self
            .catalog
            .types()
            .filter_map(|ft| {
                let descriptor = self.catalog.descriptor(ft)?;
                let label = record
                    .and_then(|r| r.attribute(&descriptor.key))
                    .unwrap_or("")
                    .to_string();
                Some(FeatureValue {
                    map_type: ft,
                    key: descriptor.key.clone(),
                    display_name: descriptor.display_name.clone(),
                    descriptor: descriptor.label(&label).cloned(),
                    label,
                })
            })
            .collect();
        RegionInfo {
            region,
            name: record.map(|r| r.name.clone()),
            terrain: self.terrains.get(&region).cloned(),
            features,
        }
    }

    /// Renders a layer from the current registry state, without touching the
    /// displayed one.
    pub fn synthesize(&self, map_type: FeatureType) -> RgbImage {
        synthesize(
            &self.base,
            &self.registry,
            &self.catalog,
            map_type,
            self.config.lookup,
        )
        .0
    }

    /// Label stored for a region on a layer. `None` for an unknown region,
    /// `Some(None)` when the region has no value on that layer.
    pub(crate) fn current_label(
        &self,
        region: RegionId,
        map_type: FeatureType,
    ) -> Option<Option<&str>> {
        let record = self.registry.get(region)?;
        Some(record.attribute(self.catalog.key(map_type)))
    }

    /// Label color, or blank for an unassigned or unknown label.
    pub(crate) fn label_color(&self, map_type: FeatureType, label: &str) -> Color {
        self.catalog.color_of(map_type, label).unwrap_or(Color::BLANK)
    }

    /// Writes a label (or removes it for `None`) and repaints its region on
    /// that layer.
    pub(crate) fn write_label(
        &mut self,
        map_type: FeatureType,
        region: RegionId,
        label: Option<&str>,
    ) {
        let key = self.catalog.key(map_type).to_string();
        let color = match label {
            Some(label) => {
                self.registry.set_attribute(region, &key, label);
                self.label_color(map_type, label)
            }
            None => {
                self.registry.remove_attribute(region, &key);
                Color::BLANK
            }
        };
        let Some(layer) = self.layers.get_mut(&map_type) else {
            log::debug!("{} is not loaded, skipping repaint of {}", key, region);
            return;
        };
        let painted = repaint_region(self.base.image(), layer, region, color);
        log::debug!(
            "{}: {} -> '{}' ({} px)",
            key,
            region,
            label.unwrap_or(""),
            painted
        );
        self.observer.notify_repaint(&key, layer);
    }

    pub(crate) fn observer(&self) -> &dyn SessionObserver {
        self.observer.as_ref()
    }

    pub(crate) fn warn(&self, message: &str) {
        log::warn!("{}", message);
        self.observer.emit_warning(message);
    }
}
