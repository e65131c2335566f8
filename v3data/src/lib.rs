//! # Victoria 3 map data
//!
//! Loaders for the files the province feature editor is built from:
//!
//! | Module | Source |
//! |--------|--------|
//! | [`states`] | `game/map_data/state_regions/*.txt` |
//! | [`raster`] | `provinces.png` |
//! | [`features`] | `mappings/feature_data.json` |
//! | [`labels`] | `feature_details/feature_details_<key>.csv` |
//! | [`mappings`] | `mappings/location_<key>.csv` |
//! | [`terrain`] | `mappings/province_terrains.txt` |
//!
//! Every loader fails with [`LoadError`]; none of them return partial data.

pub mod color;
pub mod error;
pub mod features;
pub mod labels;
pub mod mappings;
pub mod path;
pub mod raster;
pub mod states;
pub mod terrain;

pub use color::{Color, ColorParseError, RegionId, hex_of, rgb_of};
pub use error::LoadError;
