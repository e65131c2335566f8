use std::collections::{BTreeMap, BTreeSet};
use v3data::mappings::LocationMapping;
use v3data::states::StateRegion;
use v3data::RegionId;

/// Attributes every record starts with, all unassigned.
pub const SEEDED_FEATURES: [&str; 3] = ["climate", "topography", "vegetation"];

/// Everything known about one region.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProvinceRecord {
    /// Owning state, without the `STATE_` prefix.
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Feature key -> label key. An empty label means unassigned.
    pub attributes: BTreeMap<String, String>,
}

impl ProvinceRecord {
    pub fn new(name: &str) -> Self {
        let attributes = SEEDED_FEATURES
            .iter()
            .map(|f| (f.to_string(), String::new()))
            .collect();
        Self {
            name: name.to_string(),
            attributes,
            ..Default::default()
        }
    }

    pub fn attribute(&self, feature: &str) -> Option<&str> {
        self.attributes.get(feature).map(String::as_str)
    }
}

/// Region identity -> record. Iteration is in identity order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvinceRegistry {
    records: BTreeMap<RegionId, ProvinceRecord>,
}

impl ProvinceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One seeded record per region listed by the states.
    pub fn from_states(states: &[StateRegion]) -> Self {
        let mut registry = Self::new();
        for state in states {
            for &region in &state.provinces {
                registry.insert(region, ProvinceRecord::new(&state.name));
            }
        }
        log::info!(
            "Registry seeded with {} regions from {} states",
            registry.len(),
            states.len()
        );
        registry
    }

    pub fn insert(&mut self, region: RegionId, record: ProvinceRecord) {
        self.records.insert(region, record);
    }

    pub fn get(&self, region: RegionId) -> Option<&ProvinceRecord> {
        self.records.get(&region)
    }

    pub fn contains(&self, region: RegionId) -> bool {
        self.records.contains_key(&region)
    }

    pub fn attribute(&self, region: RegionId, feature: &str) -> Option<&str> {
        self.records.get(&region)?.attribute(feature)
    }

    /// Replaces one attribute. Returns `false` if the region is unknown.
    pub fn set_attribute(&mut self, region: RegionId, feature: &str, value: &str) -> bool {
        match self.records.get_mut(&region) {
            Some(record) => {
                record
                    .attributes
                    .insert(feature.to_string(), value.to_string());
                true
            }
            None => false,
        }
    }

    /// Drops one attribute, leaving the region without a value for it.
    /// Returns `false` if the region is unknown.
    pub fn remove_attribute(&mut self, region: RegionId, feature: &str) -> bool {
        match self.records.get_mut(&region) {
            Some(record) => {
                record.attributes.remove(feature);
                true
            }
            None => false,
        }
    }

    /// Merges feature-to-region rows. Rows for unknown regions are dropped.
    /// Returns the number of rows merged.
    pub fn merge_mapping(&mut self, feature: &str, rows: &[LocationMapping]) -> usize {
        let mut merged = 0;
        for row in rows {
            if self.set_attribute(row.region, feature, &row.label) {
                merged += 1;
            }
        }
        let dropped = rows.len() - merged;
        if dropped > 0 {
            log::debug!(
                "{}: {} mapping rows name regions outside the registry",
                feature,
                dropped
            );
        }
        merged
    }

    /// First region, in identity order, whose state name starts with `prefix`
    /// (case-insensitive).
    pub fn find_by_name_prefix(&self, prefix: &str) -> Option<RegionId> {
        let prefix = prefix.to_lowercase();
        self.records
            .iter()
            .find(|(_, record)| record.name.to_lowercase().starts_with(&prefix))
            .map(|(&region, _)| region)
    }

    /// `(region, value)` for every record carrying `feature`.
    pub fn column<'a>(&'a self, feature: &'a str) -> impl Iterator<Item = (RegionId, &'a str)> + 'a {
        self.records
            .iter()
            .filter_map(move |(&region, record)| record.attribute(feature).map(|v| (region, v)))
    }

    /// Every attribute name used by any record.
    pub fn attribute_keys(&self) -> BTreeSet<&str> {
        self.records
            .values()
            .flat_map(|r| r.attributes.keys().map(String::as_str))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &ProvinceRecord)> {
        self.records.iter().map(|(&region, record)| (region, record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
