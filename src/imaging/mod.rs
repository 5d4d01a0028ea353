//! Image processing: the transformation pipeline and the codec backend.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format guessed from magic bytes) |
//! | **Resize** | `imageops` filters: nearest, triangle, Catmull-Rom, Lanczos3 |
//! | **Rotate** | exact quarter turns or bilinear inverse mapping |
//! | **Color** | per-pixel math on the interleaved 8-bit buffer |
//! | **Blur** | `DynamicImage::blur` |
//! | **Encode** | PNG, JPEG, GIF, BMP, TIFF, lossless WebP |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: [`TransformConfig`] and the types it is built from
//! - **Operations**: One function per transformation
//! - **Pipeline**: [`apply_transformations`], the fixed-order driver
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod pipeline;
pub mod rust_backend;

pub use backend::{ImageBackend, OutputFormat};
pub use calculations::{
    calculate_center_offset, calculate_fill_dimensions, calculate_fit_dimensions,
    calculate_limited_dimensions, calculate_rotated_canvas,
};
pub use params::{
    Quality, ResampleFilter, Resize, ResizeMode, Rotation, Step, Tint, TransformConfig,
};
pub use pipeline::apply_transformations;
pub use rust_backend::{
    RustBackend, encode_image, load_image, load_image_bytes, save_image,
    supported_input_extensions,
};
