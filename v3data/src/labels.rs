//! Feature label tables (`feature_details/feature_details_<key>.csv`) and the
//! synthesized labels of numerical layers.

use crate::color::Color;
use crate::error::LoadError;
use encoding_rs_io::DecodeReaderBytesBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Suitability bands used by numerical (gradient) layers, lowest first.
pub const SUITABILITY_BANDS: [&str; 5] = [
    "Unsuitable",
    "Suboptimal",
    "Favourable",
    "Excellent",
    "Exceptional",
];

/// How the color column of a label table is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    /// `RRGGBB` hex text.
    Hex,
    /// Decimal triple, `r,g,b` or `r g b`.
    Triple,
}

/// One row of a label table: `key;color;desc_short;desc_long`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    pub key: String,
    pub color: Color,
    pub desc_short: String,
    pub desc_long: String,
}

/// Parses a label table from any reader. `source` is only used in errors.
///
/// Lines without a `;` are ignored (titles, blank lines). A line with a `;`
/// but not exactly four fields, or with an unreadable color, is fatal.
pub fn parse_label_table<R: Read>(
    reader: R,
    format: ColorFormat,
    source: &Path,
) -> Result<Vec<LabelRow>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(DecodeReaderBytesBuilder::new().build(reader));

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(LoadError::csv(source))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() <= 1 {
            continue;
        }
        if record.len() != 4 {
            return Err(LoadError::malformed(
                source,
                line,
                format!("expected 4 fields, found {}", record.len()),
            ));
        }

        let color_text = record[1].trim();
        let color = match format {
            ColorFormat::Hex => Color::parse_hex(color_text),
            ColorFormat::Triple => Color::parse_triple(color_text),
        }
        .map_err(|e| LoadError::malformed(source, line, e.to_string()))?;

        rows.push(LabelRow {
            key: record[0].trim().to_string(),
            color,
            desc_short: record[2].trim().to_string(),
            desc_long: record[3].trim().to_string(),
        });
    }
    Ok(rows)
}

/// Loads a label table from disk.
pub fn load_label_table(path: &Path, format: ColorFormat) -> Result<Vec<LabelRow>, LoadError> {
    let file = File::open(path).map_err(LoadError::io(path))?;
    let rows = parse_label_table(file, format, path)?;
    log::debug!("Loaded {} labels from {}", rows.len(), path.display());
    Ok(rows)
}

/// Index of the suitability band for a grayscale level.
///
/// `[0, 256)` is split into `band_count` equal-width buckets; the top bucket
/// is clamped.
pub fn suitability_band(level: u8, band_count: usize) -> usize {
    if band_count == 0 {
        return 0;
    }
    let width = 256.0 / band_count as f64;
    ((level as f64 / width) as usize).min(band_count - 1)
}

/// The 256 labels of a numerical layer: key and short description are the
/// level, color is the matching gray, long description is the band name.
pub fn numerical_labels<S: AsRef<str>>(bands: &[S]) -> Vec<LabelRow> {
    (0..=255u8)
        .map(|level| LabelRow {
            key: level.to_string(),
            color: Color::gray(level),
            desc_short: level.to_string(),
            desc_long: bands
                .get(suitability_band(level, bands.len()))
                .map(|b| b.as_ref().to_string())
                .unwrap_or_default(),
        })
        .collect()
}
