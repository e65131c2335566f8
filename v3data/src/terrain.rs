use crate::color::RegionId;
use crate::error::LoadError;
use std::collections::HashMap;
use std::path::Path;

pub type TerrainMap = HashMap<RegionId, String>;

/// Parse `province_terrains.txt` and extract region → game terrain type.
///
/// Format, one entry per line:
/// ```text
/// x5F2A3D="plains"
/// xC0FFEE="mountain"
/// ```
/// A missing file yields an empty map; the terrain is informational only.
pub fn load_province_terrains(path: &Path) -> Result<TerrainMap, LoadError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let contents = std::fs::read_to_string(path).map_err(LoadError::io(path))?;
    let terrains = parse_province_terrains(&contents, path)?;
    log::info!("Loaded {} province terrains", terrains.len());
    Ok(terrains)
}

fn parse_province_terrains(contents: &str, source: &Path) -> Result<TerrainMap, LoadError> {
    let mut terrains = HashMap::new();
    for (i, line) in contents.lines().enumerate() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        let region = key
            .trim()
            .parse::<RegionId>()
            .map_err(|e| LoadError::malformed(source, i as u64 + 1, e.to_string()))?;
        terrains.insert(region, value.trim().trim_matches('"').to_string());
    }
    Ok(terrains)
}
