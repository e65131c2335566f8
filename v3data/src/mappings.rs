use crate::color::RegionId;
use crate::error::LoadError;
use encoding_rs_io::DecodeReaderBytesBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One `region,label` row of a feature-to-region mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationMapping {
    pub region: RegionId,
    pub label: String,
}

/// Parses a feature-to-region mapping (`mappings/location_<key>.csv`).
///
/// Lines without a comma are ignored. Any other row must be exactly
/// `region_identity,label_key`.
pub fn parse_location_mappings<R: Read>(
    reader: R,
    source: &Path,
) -> Result<Vec<LocationMapping>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(DecodeReaderBytesBuilder::new().build(reader));

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(LoadError::csv(source))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        match record.len() {
            0 | 1 => continue,
            2 => {}
            n => {
                return Err(LoadError::malformed(
                    source,
                    line,
                    format!("expected region,label but found {} fields", n),
                ));
            }
        }
        let region = record[0]
            .trim()
            .parse::<RegionId>()
            .map_err(|e| LoadError::malformed(source, line, e.to_string()))?;
        rows.push(LocationMapping {
            region,
            label: record[1].trim().to_string(),
        });
    }
    Ok(rows)
}

pub fn load_location_mappings(path: &Path) -> Result<Vec<LocationMapping>, LoadError> {
    let file = File::open(path).map_err(LoadError::io(path))?;
    let rows = parse_location_mappings(file, path)?;
    log::debug!("Loaded {} mappings from {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location_mappings() {
        let rows = parse_location_mappings(
            "\u{feff}5F2A3D,Cfa\nC0FFEE,BWh\n\nheader without comma\n".as_bytes(),
            Path::new("m.csv"),
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region.to_string(), "5F2A3D");
        assert_eq!(rows[0].label, "Cfa");
        assert_eq!(rows[1].label, "BWh");
    }

    #[test]
    fn test_parse_location_mappings_empty_label_is_kept() {
        let rows = parse_location_mappings("000001,\n".as_bytes(), Path::new("m.csv")).unwrap();
        assert_eq!(rows[0].label, "");
    }

    #[test]
    fn test_parse_location_mappings_bad_region_is_fatal() {
        let err = parse_location_mappings("nothex,Cfa\n".as_bytes(), Path::new("m.csv"));
        assert!(matches!(err, Err(LoadError::Malformed { line: 1, .. })));
    }

    #[test]
    fn test_parse_location_mappings_extra_fields_is_fatal() {
        let err = parse_location_mappings("000001,Cfa,extra\n".as_bytes(), Path::new("m.csv"));
        assert!(matches!(err, Err(LoadError::Malformed { .. })));
    }
}
