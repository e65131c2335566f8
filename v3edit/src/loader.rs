//! Builds an [`EditorSession`] from a resource tree and the editor settings.
//!
//! Resource layout:
//! ```text
//! <resource_dir>/
//!   mappings/feature_data.json          layer descriptors
//!   mappings/location_<key>.csv         region,label rows per layer
//!   mappings/province_terrains.txt      optional game terrain types
//!   feature_details/feature_details_<key>.csv
//!   provinces.png, state_regions/       when no game directory is set
//! ```

use crate::settings::EditorSettings;
use anyhow::{anyhow, bail, Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use v3data::features::{load_feature_descriptors, FeatureDescriptor};
use v3data::labels::load_label_table;
use v3data::mappings::load_location_mappings;
use v3data::raster::load_base_raster;
use v3data::states::load_state_regions;
use v3data::terrain::load_province_terrains;
use v3edit_core::{
    EditorSession, FeatureCatalog, FeatureType, FeatureTypeDescriptor, ProvinceRegistry,
};

pub const FEATURE_DATA: &str = "mappings/feature_data.json";
pub const PROVINCE_TERRAINS: &str = "mappings/province_terrains.txt";

type Descriptors = BTreeMap<String, FeatureDescriptor>;

/// Builds the catalog from the layer descriptors. Numerical layers get
/// synthesized labels named by `bands`; categorical layers read their table.
pub fn load_catalog<S: AsRef<str>>(
    resource_dir: &Path,
    descriptors: &Descriptors,
    bands: &[S],
) -> Result<FeatureCatalog> {
    let mut catalog = FeatureCatalog::new();

    for (key, descriptor) in descriptors {
        let layer = if descriptor.is_numerical {
            FeatureTypeDescriptor::numerical(key, &descriptor.display_name, bands)
        } else {
            let path = descriptor.labels_path(resource_dir, key);
            let rows = load_label_table(&path, descriptor.color_format())
                .with_context(|| format!("loading labels of '{}'", key))?;
            log::debug!("Layer '{}': {} labels", key, rows.len());
            FeatureTypeDescriptor::categorical(key, &descriptor.display_name, rows)
        };
        catalog.add(layer.with_hotkey(descriptor.hotkey.clone()));
    }
    Ok(catalog)
}

/// Merges each layer's location mapping into `registry`. A layer without a
/// mapping file keeps its seeded values.
pub fn merge_mappings(
    registry: &mut ProvinceRegistry,
    descriptors: &Descriptors,
    resource_dir: &Path,
) -> Result<()> {
    for (key, descriptor) in descriptors {
        let path = descriptor.mapping_path(resource_dir, key);
        if !path.exists() {
            log::warn!("No mapping for '{}' at {}", key, path.display());
            continue;
        }
        let rows = load_location_mappings(&path)?;
        let merged = registry.merge_mapping(key, &rows);
        if merged < rows.len() {
            log::warn!(
                "'{}': {} of {} mapped regions are not in any state",
                key,
                rows.len() - merged,
                rows.len()
            );
        }
        log::info!("Merged {} '{}' values", merged, key);
    }
    Ok(())
}

/// Resolves the enabled layers and the active one. Unknown names are logged
/// and dropped; the active layer falls back to the first enabled one.
pub fn resolve_layers(
    catalog: &FeatureCatalog,
    settings: &EditorSettings,
) -> Result<(Vec<FeatureType>, FeatureType)> {
    let mut enabled = Vec::new();
    for name in &settings.enabled_maps {
        match catalog.lookup(name) {
            Some(ft) => enabled.push(ft),
            None => log::warn!("Enabled map '{}' is not in the catalog", name),
        }
    }

    let active = match catalog.lookup(&settings.default_map_type) {
        Some(ft) => ft,
        None => {
            log::warn!(
                "Default map '{}' is not in the catalog",
                settings.default_map_type
            );
            *enabled
                .first()
                .ok_or_else(|| anyhow!("no enabled map type is in the catalog"))?
        }
    };
    Ok((enabled, active))
}

/// Loads the catalog, registry, terrains and base raster and renders the
/// enabled layers.
pub fn load_session(settings: &EditorSettings) -> Result<EditorSession> {
    let resource_dir = settings.resource_dir.as_path();
    let raster_path = settings.base_raster_path();
    let Some(states_dir) = settings.state_regions_dir() else {
        bail!("state regions not found; set game_directory or state_regions_path");
    };
    log::info!("Base raster: {}", raster_path.display());
    log::info!("State regions: {}", states_dir.display());

    let (base, states) = rayon::join(
        || load_base_raster(&raster_path),
        || load_state_regions(&states_dir),
    );
    let base = base.with_context(|| format!("loading {}", raster_path.display()))?;
    let states = states.with_context(|| format!("loading {}", states_dir.display()))?;

    let descriptor_path = resource_dir.join(FEATURE_DATA);
    let descriptors = load_feature_descriptors(&descriptor_path)?;
    if descriptors.is_empty() {
        bail!("{} describes no layers", descriptor_path.display());
    }
    let catalog = load_catalog(resource_dir, &descriptors, &settings.engine.suitability_bands)?;

    let mut registry = ProvinceRegistry::from_states(&states);
    merge_mappings(&mut registry, &descriptors, resource_dir)?;
    let terrains = load_province_terrains(&resource_dir.join(PROVINCE_TERRAINS))?;

    let (enabled, active) = resolve_layers(&catalog, settings)?;
    Ok(EditorSession::new(
        settings.engine.clone(),
        catalog,
        registry,
        base,
        &enabled,
        active,
    )
    .with_terrains(terrains))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::write_resources;
    use tempfile::tempdir;
    use v3data::RegionId;

    fn region(hex: &str) -> RegionId {
        hex.parse().unwrap()
    }

    #[test]
    fn test_load_catalog() {
        let dir = tempdir().unwrap();
        write_resources(dir.path());
        let descriptors = load_feature_descriptors(&dir.path().join(FEATURE_DATA)).unwrap();
        let catalog = load_catalog(dir.path(), &descriptors, &["Low", "High"]).unwrap();

        assert_eq!(catalog.len(), 3);
        let climate = catalog.lookup("climate").unwrap();
        assert_eq!(catalog.descriptor(climate).unwrap().label_count(), 2);
        assert_eq!(catalog.descriptor(climate).unwrap().hotkey, vec!["c"]);

        let wheat = catalog.lookup("low_wheat").unwrap();
        let descriptor = catalog.descriptor(wheat).unwrap();
        assert!(descriptor.is_numerical);
        assert_eq!(descriptor.label_count(), 256);
        assert_eq!(descriptor.label("200").unwrap().desc_long, "High");
    }

    #[test]
    fn test_load_session() {
        let dir = tempdir().unwrap();
        write_resources(dir.path());
        let settings = EditorSettings {
            resource_dir: dir.path().to_path_buf(),
            enabled_maps: vec!["climate".into(), "low_wheat".into(), "nope".into()],
            ..EditorSettings::default()
        };

        let session = load_session(&settings).unwrap();
        assert_eq!(session.registry().len(), 3);
        assert_eq!(session.registry().attribute(region("FF0000"), "climate"), Some("Cfa"));
        assert_eq!(session.registry().attribute(region("00FF00"), "climate"), Some(""));
        assert_eq!(session.registry().attribute(region("0000FF"), "low_wheat"), Some("200"));
        assert_eq!(session.loaded_map_types().count(), 2);
        assert_eq!(
            session.active_map_type(),
            session.catalog().lookup("climate").unwrap()
        );

        let info = session.inspect(0, 0).unwrap();
        assert_eq!(info.name.as_deref(), Some("SKANE"));
        assert_eq!(info.terrain.as_deref(), Some("plains"));
    }

    #[test]
    fn test_missing_states_is_fatal() {
        let dir = tempdir().unwrap();
        write_resources(dir.path());
        let settings = EditorSettings {
            resource_dir: dir.path().to_path_buf(),
            state_regions_path: Some(dir.path().join("missing")),
            ..EditorSettings::default()
        };
        assert!(load_session(&settings).is_err());
    }

    #[test]
    fn test_malformed_mapping_is_fatal() {
        let dir = tempdir().unwrap();
        write_resources(dir.path());
        std::fs::write(
            dir.path().join("mappings/location_climate.csv"),
            "FF0000,Cfa,extra\n",
        )
        .unwrap();
        let settings = EditorSettings {
            resource_dir: dir.path().to_path_buf(),
            ..EditorSettings::default()
        };
        assert!(load_session(&settings).is_err());
    }
}
