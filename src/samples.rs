//! Synthetic sample images for demos and smoke tests.
//!
//! `image-studio sample` writes one of each into a directory so the other
//! commands have something to chew on without any assets, plus a short
//! animated GIF cycling the circle through a few tints.

use crate::animation::{FrameDelay, Repeat, encode_gif, tinted_variants};
use crate::error::{Error, Result};
use crate::imaging::{OutputFormat, Quality, save_image};
use crate::raster::{ColorMode, RasterImage};
use std::path::{Path, PathBuf};

/// RGB gradient: red rises left to right, blue falls, green rises top to bottom.
pub fn gradient(width: u32, height: u32) -> Result<RasterImage> {
    check_size(width, height)?;
    let sx = width.saturating_sub(1).max(1);
    let sy = height.saturating_sub(1).max(1);
    let mut pixels = Vec::with_capacity(buffer_len(width, height, 3));
    for y in 0..height {
        for x in 0..width {
            let r = (x as u64 * 255 / sx as u64) as u8;
            let g = (y as u64 * 255 / sy as u64) as u8;
            pixels.extend_from_slice(&[r, g, 255 - r]);
        }
    }
    RasterImage::new(width, height, ColorMode::Rgb, pixels)
}

/// Alternating square cells of `cell` pixels, starting with `a` at the origin.
pub fn checkerboard(
    width: u32,
    height: u32,
    cell: u32,
    a: [u8; 3],
    b: [u8; 3],
) -> Result<RasterImage> {
    check_size(width, height)?;
    if cell == 0 {
        return Err(Error::validation("checkerboard cell size must be at least 1"));
    }
    let mut pixels = Vec::with_capacity(buffer_len(width, height, 3));
    for y in 0..height {
        for x in 0..width {
            let color = if (x / cell + y / cell) % 2 == 0 { a } else { b };
            pixels.extend_from_slice(&color);
        }
    }
    RasterImage::new(width, height, ColorMode::Rgb, pixels)
}

/// A filled circle of `color` at `alpha` on a fully transparent square.
pub fn translucent_circle(size: u32, color: [u8; 3], alpha: u8) -> Result<RasterImage> {
    check_size(size, size)?;
    let center = size as f32 / 2.0;
    let radius = size as f32 * 0.4;
    let mut pixels = Vec::with_capacity(buffer_len(size, size, 4));
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            if dx * dx + dy * dy <= radius * radius {
                pixels.extend_from_slice(&[color[0], color[1], color[2], alpha]);
            } else {
                pixels.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    RasterImage::new(size, size, ColorMode::Rgba, pixels)
}

/// Largest edge accepted for generated samples.
pub const MAX_SAMPLE_SIZE: u32 = 8192;

fn check_size(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::validation(format!(
            "sample size must be non-zero, got {width}x{height}"
        )));
    }
    if width.max(height) > MAX_SAMPLE_SIZE {
        return Err(Error::validation(format!(
            "sample size must be at most {MAX_SAMPLE_SIZE}, got {width}x{height}"
        )));
    }
    Ok(())
}

fn buffer_len(width: u32, height: u32, channels: usize) -> usize {
    width as usize * height as usize * channels
}

/// Tints cycled by the `pulse.gif` sample.
const PULSE_COLORS: [[u8; 3]; 4] = [[255, 64, 64], [255, 200, 0], [64, 200, 64], [64, 64, 255]];

/// Write `gradient.png`, `checkerboard.png`, `circle.png` and `pulse.gif`
/// into `dir`.
pub fn write_samples(dir: &Path, size: u32) -> Result<Vec<PathBuf>> {
    check_size(size, size)?;
    std::fs::create_dir_all(dir)?;
    let samples = [
        ("gradient.png", gradient(size, size * 3 / 4 + 1)?),
        (
            "checkerboard.png",
            checkerboard(size, size, (size / 8).max(1), [240, 240, 240], [40, 40, 40])?,
        ),
        ("circle.png", translucent_circle(size, [30, 144, 255], 160)?),
    ];

    let mut written = Vec::with_capacity(samples.len());
    for (file_name, image) in &samples {
        let path = dir.join(file_name);
        save_image(image, &path, Some(OutputFormat::Png), Quality::default())?;
        log::debug!("wrote sample {}", path.display());
        written.push(path);
    }

    let circle = &samples[2].1;
    let pulse = tinted_variants(circle, &PULSE_COLORS, 0.6, FrameDelay::Uniform(150))?;
    let path = dir.join("pulse.gif");
    std::fs::write(&path, encode_gif(&pulse, Repeat::Infinite)?)?;
    written.push(path);
    Ok(written)
}
