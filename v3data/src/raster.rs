use crate::error::LoadError;
use image::RgbImage;
use std::path::Path;

/// Loads the province map as 8-bit RGB. Alpha, if present, is dropped.
pub fn load_base_raster(path: &Path) -> Result<RgbImage, LoadError> {
    log::info!(
        "Loading base raster from {}",
        path.display().to_string().replace('\\', "/")
    );
    let image = image::open(path)
        .map_err(|source| LoadError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();
    let (width, height) = image.dimensions();
    log::info!("Base raster dimensions: {}x{}", width, height);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn test_load_base_raster_drops_alpha() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("provinces.png");
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        rgba.put_pixel(1, 0, Rgba([0, 0, 255, 10]));
        rgba.save(&path).unwrap();

        let rgb = load_base_raster(&path).unwrap();
        assert_eq!(rgb.dimensions(), (2, 1));
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(1, 0).0, [0, 0, 255]);
    }

    #[test]
    fn test_load_base_raster_missing() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_base_raster(&dir.path().join("none.png")),
            Err(LoadError::Image { .. })
        ));
    }
}
