//! Embedded images: `icons`
//!
//! Generated by image-studio 0.3.0; regenerate with `image-studio embed`
//! instead of editing by hand.
//!
//! Source: assets/icons
//! Storage: lossless PNG

#![allow(dead_code)]

pub const GENERATED_AT: &str = "2024-05-01T12:00:00Z";
pub const SOURCE_FOLDER: &str = "assets/icons";
pub const IMAGE_COUNT: usize = 2;
pub const QUALITY: Option<u8> = None;
pub const MAX_SIZE: Option<u32> = None;
pub const CONTENT_HASH: &str = "684e8c0750309b5d8decd77400eb7bece733678758d050ae1d6b864601bac970";

/// `(name, format, width, height, base64)`, in source filename order.
pub static IMAGES: &[(&str, &str, u32, u32, &str)] = &[
    ("logo", "png", 2, 2, "iVBORw0KGgoAAAANSUhEUgAAAAIAAAACCAYAAABytg0kAAAAFElEQVR42mP4z8DwHwgbGMA0EAAAP9cIeV/HbbEAAAAASUVORK5CYII="),
    ("logo_2", "png", 3, 1, "iVBORw0KGgoAAAANSUhEUgAAAAMAAAABCAIAAACUgoPjAAAAEklEQVR42mPgEpHTMLJxC4gCAAZ8AcMlDnEcAAAAAElFTkSuQmCC"),
];

/// Names of all embedded images, in table order.
pub fn list_images() -> Vec<&'static str> {
    image_studio::codec::static_names(IMAGES)
}

/// Decode an embedded image by name.
pub fn get_image(name: &str) -> image_studio::Result<image_studio::RasterImage> {
    image_studio::codec::lookup_static(IMAGES, name)
}
