//! Codec backend built on the `image` crate's pure Rust decoders and encoders.
//!
//! No system libraries are needed; every codec is compiled in through the
//! crate features enabled in `Cargo.toml`.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, GIF, BMP, TIFF, WebP) | `image::ImageReader` with magic-byte format detection |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality-controlled, alpha dropped) |
//! | Encode → GIF | `image::codecs::gif::GifEncoder` (single frame) |
//! | Encode → BMP / TIFF | `BmpEncoder` / `TiffEncoder` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless only) |

use super::backend::{ImageBackend, OutputFormat};
use super::params::Quality;
use crate::error::{Error, Result};
use crate::raster::{ColorMode, RasterImage};
use image::codecs::bmp::BmpEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, Frame, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions paired with the decoder that handles them.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has an extension we can decode (case insensitive).
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8], origin: &str) -> Result<RasterImage> {
        load_image_bytes(bytes, origin)
    }

    fn encode(&self, image: &RasterImage, format: OutputFormat, quality: Quality) -> Result<Vec<u8>> {
        encode_image(image, format, quality)
    }
}

/// Decode in-memory container bytes, detecting the format from magic bytes.
pub fn load_image_bytes(bytes: &[u8], origin: &str) -> Result<RasterImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::decode(origin, e))?;
    if reader.format().is_none() {
        return Err(Error::decode(origin, "unrecognized image format"));
    }
    let decoded = reader.decode().map_err(|e| Error::decode(origin, e))?;
    Ok(RasterImage::from(decoded))
}

/// Load and decode an image from disk.
///
/// Filesystem failures are returned unchanged as [`Error::Io`].
pub fn load_image(path: &Path) -> Result<RasterImage> {
    let bytes = std::fs::read(path)?;
    load_image_bytes(&bytes, &path.display().to_string())
}

/// Adapt the color mode to what the target encoder accepts.
fn prepare_for(image: &RasterImage, format: OutputFormat) -> DynamicImage {
    let mode = image.mode();
    let target = if !format.supports_alpha() {
        if !image.is_opaque() {
            log::warn!("{format} has no alpha channel; transparency is discarded");
        }
        if mode.has_color() { ColorMode::Rgb } else { ColorMode::L }
    } else {
        match (format, mode) {
            (OutputFormat::Tiff | OutputFormat::WebP, ColorMode::L) => ColorMode::Rgb,
            (OutputFormat::Tiff | OutputFormat::WebP, ColorMode::La) => ColorMode::Rgba,
            _ => mode,
        }
    };
    if target == mode {
        image.to_dynamic()
    } else {
        image.convert(target).to_dynamic()
    }
}

/// Encode a raster into container bytes.
pub fn encode_image(image: &RasterImage, format: OutputFormat, quality: Quality) -> Result<Vec<u8>> {
    let dynamic = prepare_for(image, format);
    let mut cursor = Cursor::new(Vec::new());
    let written = match format {
        OutputFormat::Png => dynamic.write_with_encoder(PngEncoder::new(&mut cursor)),
        OutputFormat::Jpeg => dynamic
            .write_with_encoder(JpegEncoder::new_with_quality(&mut cursor, quality.value())),
        OutputFormat::Bmp => dynamic.write_with_encoder(BmpEncoder::new(&mut cursor)),
        OutputFormat::Tiff => dynamic.write_with_encoder(TiffEncoder::new(&mut cursor)),
        OutputFormat::WebP => dynamic.write_with_encoder(WebPEncoder::new_lossless(&mut cursor)),
        OutputFormat::Gif => {
            let mut encoder = GifEncoder::new(&mut cursor);
            encoder.encode_frame(Frame::new(dynamic.to_rgba8()))
        }
    };
    written.map_err(|e| Error::Encode {
        format: format.to_string(),
        reason: e.to_string(),
    })?;
    Ok(cursor.into_inner())
}

/// Encode and write to `path`.
///
/// The format is taken from `format` when given, otherwise from the path's
/// extension.
pub fn save_image(
    image: &RasterImage,
    path: &Path,
    format: Option<OutputFormat>,
    quality: Quality,
) -> Result<OutputFormat> {
    let format = format
        .or_else(|| OutputFormat::from_path(path))
        .ok_or_else(|| {
            Error::Validation(format!(
                "cannot infer output format from {}; use one of: {}",
                path.display(),
                OutputFormat::ALL.map(|f| f.name()).join(", ")
            ))
        })?;
    let bytes = encode_image(image, format, quality)?;
    std::fs::write(path, bytes)?;
    Ok(format)
}
