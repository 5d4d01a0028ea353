//! # Image Studio
//!
//! Raster image transformations, folder-to-source embedding, and animated GIF
//! assembly, as a library and a small command-line tool.
//!
//! # Architecture
//!
//! Everything flows through one owned value type, [`RasterImage`]:
//!
//! ```text
//! bytes / file ──decode──▶ RasterImage ──apply_transformations──▶ RasterImage ──encode──▶ file
//!                              │
//!                              ├──▶ codec:     folder → EmbeddedImageTable → generated .rs module
//!                              └──▶ animation: frames + delays → animated GIF
//! ```
//!
//! Transformations never mutate their input, so one decoded image can feed
//! any number of pipelines, animation frames or threads.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`raster`] | `RasterImage` and `ColorMode`: the checked in-memory bitmap |
//! | [`imaging`] | Transform parameters, the fixed-order pipeline, codec backend and file I/O |
//! | [`codec`] | Folder → embedded table → generated Rust module, and the lookups back |
//! | [`animation`] | Frame sets, GIF encode/decode, tinted frame cycles |
//! | [`samples`] | Synthetic gradient, checkerboard and translucent circle images |
//! | [`config`] | `image-studio.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//! | [`error`] | The crate-wide [`Error`] taxonomy |
//!
//! # Design Decisions
//!
//! ## Fixed Pipeline Order
//!
//! A [`TransformConfig`](imaging::TransformConfig) is a set of optional
//! operations, not a script. They always run as resize → rotate → grayscale →
//! contrast → saturation → brightness → tint → transparency → blur, so the same
//! config gives the same result regardless of how it was assembled (CLI flags,
//! a TOML preset, or code).
//!
//! ## Reject, Don't Clamp
//!
//! Out-of-range parameters (a tint intensity of 1.5, a negative blur radius,
//! quality 0) are reported as [`Error::Validation`] before any pixel is
//! touched.
//!
//! ## Pure-Rust Codecs
//!
//! Decoding and encoding use the `image` crate's pure Rust codecs only. The
//! binary needs no system libraries, and generated modules depend on nothing
//! but this crate.
//!
//! ## Generated Modules Are Data
//!
//! `image-studio embed` writes plain Rust: constants, one static slice of
//! tuples, and two small accessors. The module carries a content hash, so
//! re-running the embed on an unchanged folder leaves the file (and its
//! modification time) alone.

pub mod animation;
pub mod codec;
pub mod config;
pub mod error;
pub mod imaging;
pub mod output;
pub mod raster;
pub mod samples;

pub use error::{Error, Result};
pub use raster::{ColorMode, RasterImage};

#[cfg(test)]
pub(crate) mod test_helpers;
