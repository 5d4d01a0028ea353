//! Shared test utilities for the image-studio test suite.
//!
//! Synthetic rasters with known pixel values, plus fixture folders of encoded
//! files for codec tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_image_folder();
//! let report = encode_folder(tmp.path(), &EncodeOptions::default(), None, None).unwrap();
//! assert_eq!(list_images(&report.table), vec!["red_square", "blue_dot"]);
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::imaging::{OutputFormat, Quality, encode_image};
use crate::raster::{ColorMode, RasterImage};

// =========================================================================
// Rasters
// =========================================================================

/// Opaque RGBA gradient: red grows left to right, green top to bottom.
pub fn gradient_rgba(width: u32, height: u32) -> RasterImage {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x * 255 / width.saturating_sub(1).max(1)) as u8);
            pixels.push((y * 255 / height.saturating_sub(1).max(1)) as u8);
            pixels.push(128);
            pixels.push(255);
        }
    }
    RasterImage::new(width, height, ColorMode::Rgba, pixels).unwrap()
}

/// Every pixel set to `pixel`.
pub fn solid(width: u32, height: u32, mode: ColorMode, pixel: &[u8]) -> RasterImage {
    RasterImage::filled(width, height, mode, pixel).unwrap()
}

// =========================================================================
// Fixture folders
// =========================================================================

/// Encode `img` as PNG into `dir/file_name`.
pub fn write_png(dir: &Path, file_name: &str, img: &RasterImage) -> PathBuf {
    let path = dir.join(file_name);
    let bytes = encode_image(img, OutputFormat::Png, Quality::default()).unwrap();
    std::fs::write(&path, bytes).unwrap();
    path
}

/// A temp folder with two decodable PNGs and one non-image file:
///
/// ```text
/// Red Square.png  8x8 opaque red
/// blue-dot.PNG    4x2 translucent blue
/// notes.txt
/// ```
pub fn setup_image_folder() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_png(
        tmp.path(),
        "Red Square.png",
        &solid(8, 8, ColorMode::Rgba, &[255, 0, 0, 255]),
    );
    write_png(
        tmp.path(),
        "blue-dot.PNG",
        &solid(4, 2, ColorMode::Rgba, &[0, 0, 255, 100]),
    );
    std::fs::write(tmp.path().join("notes.txt"), "not an image").unwrap();
    tmp
}
