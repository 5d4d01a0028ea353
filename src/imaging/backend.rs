//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the codec needs from
//! an image library: decode bytes into a [`RasterImage`] and encode a raster
//! into a container format.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the pure Rust decoders and
//! encoders from the `image` crate. Folder encoding accepts any backend so
//! tests can substitute a mock.

use super::params::Quality;
use crate::error::Result;
use crate::raster::RasterImage;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Container formats supported for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
    Gif,
    Bmp,
    #[value(alias = "tif")]
    Tiff,
    #[value(name = "webp")]
    WebP,
}

impl OutputFormat {
    /// Every format, in the order used for listings.
    pub const ALL: [OutputFormat; 6] = [
        OutputFormat::Png,
        OutputFormat::Jpeg,
        OutputFormat::Gif,
        OutputFormat::Bmp,
        OutputFormat::Tiff,
        OutputFormat::WebP,
    ];

    /// Match a file extension (case insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "gif" => Some(OutputFormat::Gif),
            "bmp" => Some(OutputFormat::Bmp),
            "tif" | "tiff" => Some(OutputFormat::Tiff),
            "webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Short lowercase name, also used in embedded tables.
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Gif => "gif",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tiff",
            OutputFormat::WebP => "webp",
        }
    }

    /// Whether the container can carry an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, OutputFormat::Jpeg)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for image codec backends.
pub trait ImageBackend: Sync {
    /// Decode container bytes. `origin` names the source in error messages.
    fn decode(&self, bytes: &[u8], origin: &str) -> Result<RasterImage>;

    /// Encode into the given container. `quality` only affects lossy formats.
    fn encode(&self, image: &RasterImage, format: OutputFormat, quality: Quality) -> Result<Vec<u8>>;
}
