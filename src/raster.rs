//! In-memory raster images.
//!
//! [`RasterImage`] is an owned 8-bit pixel buffer with explicit dimensions and
//! a [`ColorMode`]. The buffer length always equals
//! `width * height * mode.channels()`; the only way to build one is through a
//! checked constructor, so every value in circulation upholds that.
//!
//! Conversions to and from [`image::DynamicImage`] are provided for the
//! operations that delegate to the `image` crate (resampling, blur, codecs).
//! Higher bit depths are narrowed to 8 bits on the way in.

use crate::error::{Error, Result};
use image::{DynamicImage, ImageBuffer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel layout of a [`RasterImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    /// Single luminance channel.
    #[serde(rename = "L")]
    L,
    /// Luminance + alpha.
    #[serde(rename = "LA")]
    La,
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "RGBA")]
    Rgba,
}

impl ColorMode {
    pub fn channels(self) -> usize {
        match self {
            ColorMode::L => 1,
            ColorMode::La => 2,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, ColorMode::La | ColorMode::Rgba)
    }

    pub fn has_color(self) -> bool {
        matches!(self, ColorMode::Rgb | ColorMode::Rgba)
    }

    /// The same layout with an alpha channel added (identity if present).
    pub fn with_alpha(self) -> Self {
        match self {
            ColorMode::L | ColorMode::La => ColorMode::La,
            ColorMode::Rgb | ColorMode::Rgba => ColorMode::Rgba,
        }
    }

    /// The same layout with color channels (identity if present).
    pub fn with_color(self) -> Self {
        match self {
            ColorMode::L | ColorMode::Rgb => ColorMode::Rgb,
            ColorMode::La | ColorMode::Rgba => ColorMode::Rgba,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColorMode::L => "L",
            ColorMode::La => "LA",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
        };
        f.write_str(label)
    }
}

/// Decoded 8-bit bitmap with explicit dimensions and color mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    mode: ColorMode,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Build a raster from raw interleaved pixels.
    ///
    /// Fails with [`Error::Validation`] when the buffer length does not match
    /// `width * height * channels`.
    pub fn new(width: u32, height: u32, mode: ColorMode, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(mode.channels()))
            .ok_or_else(|| Error::validation(format!("{width}x{height} image is too large")))?;
        if pixels.len() != expected {
            return Err(Error::validation(format!(
                "pixel buffer has {} bytes, expected {expected} for {width}x{height} {mode}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            mode,
            pixels,
        })
    }

    /// Build a raster where every pixel has the same value.
    pub fn filled(width: u32, height: u32, mode: ColorMode, pixel: &[u8]) -> Result<Self> {
        if pixel.len() != mode.channels() {
            return Err(Error::validation(format!(
                "fill pixel has {} channels, {mode} needs {}",
                pixel.len(),
                mode.channels()
            )));
        }
        let count = width as usize * height as usize;
        Self::new(width, height, mode, pixel.repeat(count))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    pub fn has_alpha(&self) -> bool {
        self.mode.has_alpha()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Channel values of one pixel. Panics if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let c = self.channels();
        let start = (y as usize * self.width as usize + x as usize) * c;
        &self.pixels[start..start + c]
    }

    /// The alpha plane, or `None` for modes without alpha.
    pub fn alpha_channel(&self) -> Option<Vec<u8>> {
        if !self.has_alpha() {
            return None;
        }
        let c = self.channels();
        Some(self.pixels.chunks_exact(c).map(|px| px[c - 1]).collect())
    }

    /// True when every pixel is fully opaque (always true without alpha).
    pub fn is_opaque(&self) -> bool {
        self.alpha_channel()
            .is_none_or(|alpha| alpha.iter().all(|&a| a == u8::MAX))
    }

    /// Convert to another color mode, returning a new raster.
    ///
    /// Widening conversions (adding color or alpha) are lossless: luminance is
    /// replicated into RGB and alpha starts fully opaque.
    pub fn convert(&self, mode: ColorMode) -> RasterImage {
        if mode == self.mode {
            return self.clone();
        }
        let dynamic = self.to_dynamic();
        let converted = match mode {
            ColorMode::L => DynamicImage::ImageLuma8(dynamic.to_luma8()),
            ColorMode::La => DynamicImage::ImageLumaA8(dynamic.to_luma_alpha8()),
            ColorMode::Rgb => DynamicImage::ImageRgb8(dynamic.to_rgb8()),
            ColorMode::Rgba => DynamicImage::ImageRgba8(dynamic.to_rgba8()),
        };
        RasterImage::from(converted)
    }

    /// Copy into an [`image::DynamicImage`] of the matching 8-bit variant.
    pub fn to_dynamic(&self) -> DynamicImage {
        let (w, h) = (self.width, self.height);
        let raw = self.pixels.clone();
        const CHECKED: &str = "buffer length checked on construction";
        match self.mode {
            ColorMode::L => DynamicImage::ImageLuma8(ImageBuffer::from_raw(w, h, raw).expect(CHECKED)),
            ColorMode::La => {
                DynamicImage::ImageLumaA8(ImageBuffer::from_raw(w, h, raw).expect(CHECKED))
            }
            ColorMode::Rgb => DynamicImage::ImageRgb8(ImageBuffer::from_raw(w, h, raw).expect(CHECKED)),
            ColorMode::Rgba => {
                DynamicImage::ImageRgba8(ImageBuffer::from_raw(w, h, raw).expect(CHECKED))
            }
        }
    }
}

impl From<DynamicImage> for RasterImage {
    fn from(img: DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        let (mode, pixels) = match img {
            DynamicImage::ImageLuma8(buf) => (ColorMode::L, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (ColorMode::La, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (ColorMode::Rgb, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (ColorMode::Rgba, buf.into_raw()),
            other => {
                let color = other.color();
                match (color.has_color(), color.has_alpha()) {
                    (true, true) => (ColorMode::Rgba, other.to_rgba8().into_raw()),
                    (true, false) => (ColorMode::Rgb, other.to_rgb8().into_raw()),
                    (false, true) => (ColorMode::La, other.to_luma_alpha8().into_raw()),
                    (false, false) => (ColorMode::L, other.to_luma8().into_raw()),
                }
            }
        };
        Self {
            width,
            height,
            mode,
            pixels,
        }
    }
}
