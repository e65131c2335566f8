//! Feature-layer rasters.
//!
//! A layer is the base raster with every region color substituted by the
//! color of that region's label. Full synthesis goes through a
//! [`SubstitutionTable`]; single edits repaint one region with a mask pass
//! ([`repaint_region`]); batch replay accumulates many repaints in a
//! [`ScratchRaster`] and applies them in one pass.

use crate::catalog::{FeatureCatalog, FeatureType};
use crate::config::LookupStrategy;
use crate::registry::ProvinceRegistry;
use image::RgbImage;
use rustc_hash::{FxHashMap, FxHashSet};
use v3data::{Color, RegionId};

const DENSE_LEN: usize = 1 << 24;

/// The read-only province map and the distinct region colors it contains.
#[derive(Debug, Clone)]
pub struct BaseRaster {
    image: RgbImage,
    regions: Vec<RegionId>,
}

impl BaseRaster {
    pub fn new(image: RgbImage) -> Self {
        let mut seen = FxHashSet::default();
        for pixel in image.pixels() {
            seen.insert(Color::from_pixel(pixel).packed());
        }
        let mut regions: Vec<RegionId> = seen
            .into_iter()
            .map(|packed| RegionId::from_color(Color::from_packed(packed)))
            .collect();
        regions.sort_unstable();
        Self { image, regions }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Region under a pixel, or `None` outside the raster.
    pub fn region_at(&self, x: i64, y: i64) -> Option<RegionId> {
        let (width, height) = self.image.dimensions();
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            return None;
        }
        let pixel = self.image.get_pixel(x as u32, y as u32);
        Some(RegionId::from_color(Color::from_pixel(pixel)))
    }

    /// Distinct colors present in the raster, in identity order.
    pub fn regions(&self) -> &[RegionId] {
        &self.regions
    }
}

/// Maps a base color to its output color. Colors never inserted map to
/// [`Color::BLANK`].
#[derive(Debug, Clone)]
pub enum SubstitutionTable {
    /// One packed entry per 24-bit color.
    Dense(Vec<u32>),
    Sparse(FxHashMap<u32, u32>),
}

impl SubstitutionTable {
    pub fn new(strategy: LookupStrategy) -> Self {
        match strategy {
            LookupStrategy::Dense => Self::Dense(vec![0; DENSE_LEN]),
            LookupStrategy::Sparse => Self::Sparse(FxHashMap::default()),
        }
    }

    pub fn insert(&mut self, source: RegionId, target: Color) {
        let key = source.packed();
        match self {
            Self::Dense(table) => table[key as usize] = target.packed(),
            Self::Sparse(table) => {
                table.insert(key, target.packed());
            }
        }
    }

    pub fn get(&self, source: Color) -> Color {
        let key = source.packed();
        let packed = match self {
            Self::Dense(table) => table[key as usize],
            Self::Sparse(table) => table.get(&key).copied().unwrap_or(0),
        };
        Color::from_packed(packed)
    }

    /// Applies the table to every pixel of `base`.
    pub fn apply(&self, base: &RgbImage) -> RgbImage {
        let (width, height) = base.dimensions();
        let mut out = RgbImage::new(width, height);
        for (src, dst) in base.pixels().zip(out.pixels_mut()) {
            *dst = self.get(Color::from_pixel(src)).to_pixel();
        }
        out
    }
}

/// Data-quality counts from one synthesis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisReport {
    /// Raster colors with no registry record.
    pub unmapped_regions: usize,
    /// Records whose label is not in the catalog (unassigned labels excluded).
    pub unavailable_labels: usize,
}

impl SynthesisReport {
    pub fn is_clean(&self) -> bool {
        self.unmapped_regions == 0 && self.unavailable_labels == 0
    }
}

/// Builds the substitution table for one layer over the colors of `base`.
pub fn build_table(
    base: &BaseRaster,
    registry: &ProvinceRegistry,
    catalog: &FeatureCatalog,
    feature: FeatureType,
    strategy: LookupStrategy,
) -> (SubstitutionTable, SynthesisReport) {
    let key = catalog.key(feature);
    let mut table = SubstitutionTable::new(strategy);
    let mut report = SynthesisReport::default();

    for &region in base.regions() {
        let Some(record) = registry.get(region) else {
            report.unmapped_regions += 1;
            continue;
        };
        let label = record.attribute(key).unwrap_or("");
        match catalog.color_of(feature, label) {
            Some(color) => table.insert(region, color),
            None if label.is_empty() => {}
            None => {
                log::debug!("{}: region {} has unavailable label '{}'", key, region, label);
                report.unavailable_labels += 1;
            }
        }
    }
    (table, report)
}

/// Renders one layer from scratch.
pub fn synthesize(
    base: &BaseRaster,
    registry: &ProvinceRegistry,
    catalog: &FeatureCatalog,
    feature: FeatureType,
    strategy: LookupStrategy,
) -> (RgbImage, SynthesisReport) {
    let (table, report) = build_table(base, registry, catalog, feature, strategy);
    if !report.is_clean() {
        log::warn!(
            "{}: {} raster colors without a region, {} regions with unavailable labels",
            catalog.key(feature),
            report.unmapped_regions,
            report.unavailable_labels
        );
    }
    (table.apply(base.image()), report)
}

/// Paints every pixel whose base color is `region` with `color`.
/// Returns the number of pixels written.
pub fn repaint_region(base: &RgbImage, layer: &mut RgbImage, region: RegionId, color: Color) -> usize {
    let target = region.color();
    let fill = color.to_pixel();
    let mut painted = 0;
    for (src, dst) in base.pixels().zip(layer.pixels_mut()) {
        if Color::from_pixel(src) == target {
            *dst = fill;
            painted += 1;
        }
    }
    painted
}

/// A layer taken out of a session while a batch of repaints accumulates.
///
/// Repaints are only recorded; [`ScratchRaster::finalize`] applies all of
/// them in one pass and hands the layer back.
#[derive(Debug)]
pub struct ScratchRaster {
    layer: RgbImage,
    pending: FxHashMap<u32, Color>,
}

impl ScratchRaster {
    pub fn new(layer: RgbImage) -> Self {
        Self {
            layer,
            pending: FxHashMap::default(),
        }
    }

    /// Records a repaint. A later repaint of the same region wins.
    pub fn paint(&mut self, region: RegionId, color: Color) {
        self.pending.insert(region.packed(), color);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn finalize(mut self, base: &RgbImage) -> RgbImage {
        if self.pending.is_empty() {
            return self.layer;
        }
        for (src, dst) in base.pixels().zip(self.layer.pixels_mut()) {
            if let Some(color) = self.pending.get(&Color::from_pixel(src).packed()) {
                *dst = color.to_pixel();
            }
        }
        self.layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{region, SessionBuilder};

    #[test]
    fn test_region_at_bounds() {
        let base = BaseRaster::new(RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3])));
        assert_eq!(base.region_at(0, 0), Some(region("010203")));
        assert_eq!(base.region_at(2, 1), Some(region("010203")));
        assert_eq!(base.region_at(3, 0), None);
        assert_eq!(base.region_at(0, 2), None);
        assert_eq!(base.region_at(-1, 0), None);
        assert_eq!(base.regions(), &[region("010203")]);
    }

    #[test]
    fn test_dense_and_sparse_tables_agree() {
        let session = SessionBuilder::standard().build();
        let climate = session.catalog().lookup("climate").unwrap();
        let (dense, dense_report) = synthesize(
            session.base_raster(),
            session.registry(),
            session.catalog(),
            climate,
            LookupStrategy::Dense,
        );
        let (sparse, sparse_report) = synthesize(
            session.base_raster(),
            session.registry(),
            session.catalog(),
            climate,
            LookupStrategy::Sparse,
        );
        assert_eq!(dense, sparse);
        assert_eq!(dense_report, sparse_report);
    }

    #[test]
    fn test_synthesis_blanks_unmapped_and_unavailable() {
        let session = SessionBuilder::standard()
            .assign("00FF00", "climate", "Zzz")
            .build();
        let climate = session.catalog().lookup("climate").unwrap();
        let (layer, report) = synthesize(
            session.base_raster(),
            session.registry(),
            session.catalog(),
            climate,
            LookupStrategy::Sparse,
        );
        // The standard raster has one ocean color (000080) with no record.
        assert_eq!(report.unmapped_regions, 1);
        assert_eq!(report.unavailable_labels, 1);
        for (src, dst) in session.base_raster().image().pixels().zip(layer.pixels()) {
            let src = Color::from_pixel(src);
            if src == Color::new(0, 0, 0x80) || src == Color::new(0, 0xFF, 0) {
                assert_eq!(Color::from_pixel(dst), Color::BLANK);
            }
        }
    }

    #[test]
    fn test_repaint_region_touches_only_matching_pixels() {
        let mut base = RgbImage::from_pixel(4, 1, image::Rgb([9, 9, 9]));
        base.put_pixel(1, 0, image::Rgb([255, 0, 0]));
        base.put_pixel(3, 0, image::Rgb([255, 0, 0]));
        let mut layer = RgbImage::new(4, 1);

        let painted = repaint_region(&base, &mut layer, region("FF0000"), Color::new(0, 200, 0));
        assert_eq!(painted, 2);
        assert_eq!(layer.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(layer.get_pixel(1, 0).0, [0, 200, 0]);
        assert_eq!(layer.get_pixel(2, 0).0, [0, 0, 0]);
        assert_eq!(layer.get_pixel(3, 0).0, [0, 200, 0]);
    }

    #[test]
    fn test_scratch_raster_last_paint_wins() {
        let mut base = RgbImage::from_pixel(2, 1, image::Rgb([9, 9, 9]));
        base.put_pixel(0, 0, image::Rgb([255, 0, 0]));

        let mut scratch = ScratchRaster::new(RgbImage::new(2, 1));
        scratch.paint(region("FF0000"), Color::new(1, 1, 1));
        scratch.paint(region("FF0000"), Color::new(2, 2, 2));
        assert_eq!(scratch.pending(), 1);

        let layer = scratch.finalize(&base);
        assert_eq!(layer.get_pixel(0, 0).0, [2, 2, 2]);
        assert_eq!(layer.get_pixel(1, 0).0, [0, 0, 0]);
    }
}
