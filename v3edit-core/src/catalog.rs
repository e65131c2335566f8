//! Feature catalog: the editable layers and the labels each one accepts.
//!
//! Layers are fixed when the catalog is built. Each gets a [`FeatureType`]
//! handle; feature names coming from files or the command line are resolved to
//! a handle once, through [`FeatureCatalog::lookup`], and everything past that
//! point works with handles.

use rustc_hash::FxHashMap;
use std::fmt;
use v3data::labels::{numerical_labels, LabelRow};
use v3data::Color;

/// Handle of one layer in a [`FeatureCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureType(u16);

impl FeatureType {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Rendering of one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDescriptor {
    pub color: Color,
    pub desc_short: String,
    pub desc_long: String,
}

/// One layer: its name, kind and label domain.
#[derive(Debug, Clone)]
pub struct FeatureTypeDescriptor {
    /// Feature key, also the attribute name in province records.
    pub key: String,
    pub display_name: String,
    pub hotkey: Vec<String>,
    pub is_numerical: bool,
    labels: FxHashMap<String, LabelDescriptor>,
    /// Label keys in table order, for legends and listings.
    order: Vec<String>,
}

impl FeatureTypeDescriptor {
    /// Categorical layer from label table rows. A repeated key keeps its last row.
    pub fn categorical(key: &str, display_name: &str, rows: Vec<LabelRow>) -> Self {
        let mut labels = FxHashMap::default();
        let mut order = Vec::with_capacity(rows.len());
        for row in rows {
            if !labels.contains_key(&row.key) {
                order.push(row.key.clone());
            }
            labels.insert(
                row.key,
                LabelDescriptor {
                    color: row.color,
                    desc_short: row.desc_short,
                    desc_long: row.desc_long,
                },
            );
        }
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            hotkey: Vec::new(),
            is_numerical: false,
            labels,
            order,
        }
    }

    /// Numerical layer: 256 gray levels named by suitability band.
    pub fn numerical<S: AsRef<str>>(key: &str, display_name: &str, bands: &[S]) -> Self {
        let mut descriptor = Self::categorical(key, display_name, numerical_labels(bands));
        descriptor.is_numerical = true;
        descriptor
    }

    pub fn with_hotkey(mut self, hotkey: Vec<String>) -> Self {
        self.hotkey = hotkey;
        self
    }

    pub fn label(&self, key: &str) -> Option<&LabelDescriptor> {
        self.labels.get(key)
    }

    /// Labels in table order (level order for numerical layers).
    pub fn labels(&self) -> impl Iterator<Item = (&str, &LabelDescriptor)> {
        self.order
            .iter()
            .filter_map(|k| self.labels.get(k).map(|d| (k.as_str(), d)))
    }

    pub fn label_count(&self) -> usize {
        self.order.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureCatalog {
    types: Vec<FeatureTypeDescriptor>,
    by_name: FxHashMap<String, FeatureType>,
}

impl FeatureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer and returns its handle. Re-adding a key replaces the
    /// layer in place and keeps the handle.
    pub fn add(&mut self, descriptor: FeatureTypeDescriptor) -> FeatureType {
        if let Some(&existing) = self.by_name.get(&descriptor.key) {
            log::warn!("Feature '{}' defined twice, keeping the last", descriptor.key);
            self.types[existing.index()] = descriptor;
            return existing;
        }
        let handle = FeatureType(self.types.len() as u16);
        self.by_name.insert(descriptor.key.clone(), handle);
        self.types.push(descriptor);
        handle
    }

    /// Handle for a feature key.
    pub fn lookup(&self, key: &str) -> Option<FeatureType> {
        self.by_name.get(key).copied()
    }

    pub fn descriptor(&self, feature: FeatureType) -> Option<&FeatureTypeDescriptor> {
        self.types.get(feature.index())
    }

    /// Feature key of a handle, or `""` for a handle from another catalog.
    pub fn key(&self, feature: FeatureType) -> &str {
        self.descriptor(feature).map_or("", |d| d.key.as_str())
    }

    pub fn resolve(&self, feature: FeatureType, label: &str) -> Option<&LabelDescriptor> {
        self.descriptor(feature)?.label(label)
    }

    pub fn color_of(&self, feature: FeatureType, label: &str) -> Option<Color> {
        self.resolve(feature, label).map(|d| d.color)
    }

    /// Handles in creation order.
    pub fn types(&self) -> impl Iterator<Item = FeatureType> + '_ {
        (0..self.types.len()).map(|i| FeatureType(i as u16))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use v3data::labels::SUITABILITY_BANDS;

    fn row(key: &str, color: Color) -> LabelRow {
        LabelRow {
            key: key.to_string(),
            color,
            desc_short: key.to_lowercase(),
            desc_long: String::new(),
        }
    }

    #[test]
    fn test_lookup_and_resolve() {
        let mut catalog = FeatureCatalog::new();
        let climate = catalog.add(FeatureTypeDescriptor::categorical(
            "climate",
            "Climate",
            vec![row("Cfa", Color::new(0, 255, 0)), row("BWh", Color::new(255, 0, 0))],
        ));
        let wheat = catalog.add(FeatureTypeDescriptor::numerical(
            "low_wheat",
            "Wheat (Low)",
            &SUITABILITY_BANDS,
        ));

        assert_eq!(catalog.lookup("climate"), Some(climate));
        assert_eq!(catalog.lookup("low_wheat"), Some(wheat));
        assert_eq!(catalog.lookup("climat"), None);
        assert_eq!(catalog.key(wheat), "low_wheat");

        assert_eq!(catalog.color_of(climate, "Cfa"), Some(Color::new(0, 255, 0)));
        assert!(catalog.resolve(climate, "Dfb").is_none());
        assert!(catalog.resolve(climate, "").is_none());

        let level = catalog.resolve(wheat, "130").unwrap();
        assert_eq!(level.color, Color::gray(130));
        assert_eq!(level.desc_long, "Favourable");
        assert!(catalog.resolve(wheat, "256").is_none());
        assert!(catalog.descriptor(wheat).unwrap().is_numerical);
    }

    #[test]
    fn test_labels_keep_table_order() {
        let descriptor = FeatureTypeDescriptor::categorical(
            "topography",
            "Topography",
            vec![
                row("plains", Color::new(1, 1, 1)),
                row("hills", Color::new(2, 2, 2)),
                row("plains", Color::new(3, 3, 3)),
            ],
        );
        let keys: Vec<&str> = descriptor.labels().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["plains", "hills"]);
        assert_eq!(descriptor.label("plains").unwrap().color, Color::new(3, 3, 3));
    }

    #[test]
    fn test_readding_a_key_keeps_handle() {
        let mut catalog = FeatureCatalog::new();
        let first = catalog.add(FeatureTypeDescriptor::categorical("climate", "A", vec![]));
        let second = catalog.add(FeatureTypeDescriptor::categorical("climate", "B", vec![]));
        assert_eq!(first, second);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.descriptor(first).unwrap().display_name, "B");
    }
}
