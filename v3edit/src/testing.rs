//! On-disk fixture resource tree for loader and CLI tests.
//!
//! A 6x2 map with three regions:
//!
//! | Columns | Region | State |
//! |---------|--------|-------|
//! | 0-1 | `FF0000` | SKANE |
//! | 2-3 | `00FF00` | SVEALAND |
//! | 4-5 | `0000FF` | SVEALAND |

use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;

const FEATURE_DATA: &str = r#"{
    "climate": {
        "display_name": "Climate",
        "hotkey": ["c"],
        "needs_rgb_conversion": true
    },
    "topography": {
        "display_name": "Topography",
        "needs_rgb_conversion": false
    },
    "low_wheat": {
        "display_name": "Wheat (Low)",
        "isGradient": true
    }
}"#;

const CLIMATE_LABELS: &str = "Climate\n\
Cfa;00C800;Humid subtropical;Hot humid summers\n\
BWh;E6B450;Hot desert;Very dry\n";

const TOPOGRAPHY_LABELS: &str = "plains;100,150,100;Plains;Flat\n\
hills;150 120 80;Hills;Rolling\n";

const STATES: &str = "STATE_SKANE = {\n\
    id = 1\n\
    provinces = { \"xFF0000\" }\n\
}\n\
STATE_SVEALAND = {\n\
    id = 2\n\
    provinces = { \"x00FF00\" \"x0000FF\" }\n\
}\n";

/// Base raster of the fixture tree.
pub fn fixture_map() -> RgbImage {
    RgbImage::from_fn(6, 2, |x, _| match x {
        0 | 1 => Rgb([0xFF, 0, 0]),
        2 | 3 => Rgb([0, 0xFF, 0]),
        _ => Rgb([0, 0, 0xFF]),
    })
}

/// Writes the fixture tree under `root`, laid out as a resource directory
/// with a bundled `provinces.png` and `state_regions/`.
///
/// # Panics
/// If any file cannot be written.
pub fn write_resources(root: &Path) {
    let write = |rel: &str, contents: &str| {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    };

    write("mappings/feature_data.json", FEATURE_DATA);
    write("mappings/location_climate.csv", "FF0000,Cfa\n0000FF,BWh\n");
    write(
        "mappings/location_low_wheat.csv",
        "FF0000,10\n00FF00,100\n0000FF,200\n",
    );
    write("mappings/province_terrains.txt", "xFF0000=\"plains\"\n");
    write("feature_details/feature_details_climate.csv", CLIMATE_LABELS);
    write("feature_details/feature_details_topography.csv", TOPOGRAPHY_LABELS);
    write("state_regions/00_states.txt", STATES);

    fixture_map().save(root.join("provinces.png")).unwrap();
}
