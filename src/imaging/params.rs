//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between callers (CLI flags, TOML presets, animation helpers) and
//! the [`pipeline`](super::pipeline), which does the pixel work in a fixed
//! order.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1-100, default 90).
//! - [`Resize`]: Target box, [`ResizeMode`] and [`ResampleFilter`].
//! - [`Rotation`]: Angle in degrees (counter-clockwise) plus the expand flag.
//! - [`Tint`]: Solid RGB color and blend intensity (0.0-1.0).
//! - [`TransformConfig`]: Every optional operation; `Default` is the identity.
//! - [`Step`]: One planned, non-identity operation, in application order.
//!
//! ## Out-of-range policy
//!
//! Values are **rejected**, never clamped. [`TransformConfig::validate`] runs
//! once before any pixel is touched and reports the first offending field as
//! [`Error::Validation`].

use crate::error::{Error, Result};
use clap::ValueEnum;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// Checked constructor: values outside 1..=100 are a validation error.
    pub fn new(value: u8) -> Result<Self> {
        if (1..=100).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::validation(format!("quality must be 1-100, got {value}")))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

impl TryFrom<u8> for Quality {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.0
    }
}

/// Resampling filter used by resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    Nearest,
    Bilinear,
    Bicubic,
    #[default]
    Lanczos,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Bilinear => FilterType::Triangle,
            ResampleFilter::Bicubic => FilterType::CatmullRom,
            ResampleFilter::Lanczos => FilterType::Lanczos3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResampleFilter::Nearest => "nearest",
            ResampleFilter::Bilinear => "bilinear",
            ResampleFilter::Bicubic => "bicubic",
            ResampleFilter::Lanczos => "lanczos",
        }
    }
}

/// How the source aspect ratio relates to the requested box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Stretch to exactly the requested dimensions.
    #[default]
    Exact,
    /// Keep aspect ratio; output is the largest size fitting inside the box.
    Fit,
    /// Keep aspect ratio; cover the box and center-crop the overflow.
    Fill,
    /// Fit, then center on a canvas of exactly the box size.
    Pad,
}

impl ResizeMode {
    pub fn label(self) -> &'static str {
        match self {
            ResizeMode::Exact => "exact",
            ResizeMode::Fit => "fit",
            ResizeMode::Fill => "fill",
            ResizeMode::Pad => "pad",
        }
    }
}

/// Target box for a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub mode: ResizeMode,
    #[serde(default)]
    pub filter: ResampleFilter,
}

impl Resize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            mode: ResizeMode::default(),
            filter: ResampleFilter::default(),
        }
    }

    /// Build from untrusted signed components (e.g. CLI input).
    pub fn from_components(width: i64, height: i64) -> Result<Self> {
        let dim = |name: &str, v: i64| {
            u32::try_from(v)
                .ok()
                .filter(|&v| v > 0)
                .ok_or_else(|| Error::validation(format!("resize {name} must be positive, got {v}")))
        };
        Ok(Self::new(dim("width", width)?, dim("height", height)?))
    }

    pub fn with_mode(mut self, mode: ResizeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Rotation by an arbitrary angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rotation {
    /// Counter-clockwise angle in degrees.
    pub degrees: f32,
    /// Grow the canvas to the rotated bounding box instead of clipping.
    #[serde(default)]
    pub expand: bool,
}

impl Rotation {
    pub fn new(degrees: f32, expand: bool) -> Self {
        Self { degrees, expand }
    }

    /// Angle reduced to `[0, 360)`.
    pub fn normalized_degrees(&self) -> f64 {
        (self.degrees as f64).rem_euclid(360.0)
    }

    pub fn is_identity(&self) -> bool {
        let d = self.normalized_degrees();
        d.abs() < 1e-9 || (360.0 - d).abs() < 1e-9
    }
}

/// Proportional blend toward a solid color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tint {
    pub color: [u8; 3],
    /// 0.0 keeps the original, 1.0 replaces color channels with `color`.
    pub intensity: f32,
}

impl Tint {
    pub fn new(color: [u8; 3], intensity: f32) -> Self {
        Self { color, intensity }
    }

    /// Build from untrusted components; each must be within 0..=255.
    pub fn from_components(components: &[i64], intensity: f32) -> Result<Self> {
        let [r, g, b] = components else {
            return Err(Error::validation(format!(
                "tint color needs 3 components, got {}",
                components.len()
            )));
        };
        let channel = |v: i64| {
            u8::try_from(v)
                .map_err(|_| Error::validation(format!("tint component {v} is outside 0-255")))
        };
        Ok(Self::new([channel(*r)?, channel(*g)?, channel(*b)?], intensity))
    }

    pub fn hex(&self) -> String {
        let [r, g, b] = self.color;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Optional operations applied by
/// [`apply_transformations`](super::pipeline::apply_transformations).
///
/// Unset fields are identity transforms. Deserializable from TOML presets;
/// unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    pub resize: Option<Resize>,
    pub rotate: Option<Rotation>,
    pub grayscale: bool,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
    pub brightness: Option<f32>,
    pub tint: Option<Tint>,
    /// Alpha multiplier in `[0, 1]`.
    pub transparency: Option<f32>,
    /// Gaussian blur radius (sigma) in pixels.
    pub blur: Option<f32>,
}

/// A single planned operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Resize(Resize),
    Rotate(Rotation),
    Grayscale,
    Contrast(f32),
    Saturation(f32),
    Brightness(f32),
    Tint(Tint),
    Transparency(f32),
    Blur(f32),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Resize(r) => write!(
                f,
                "resize {}x{} ({}, {})",
                r.width,
                r.height,
                r.mode.label(),
                r.filter.label()
            ),
            Step::Rotate(r) => write!(
                f,
                "rotate {}°{}",
                r.degrees,
                if r.expand { " (expand)" } else { "" }
            ),
            Step::Grayscale => f.write_str("grayscale"),
            Step::Contrast(v) => write!(f, "contrast ×{v}"),
            Step::Saturation(v) => write!(f, "saturation ×{v}"),
            Step::Brightness(v) => write!(f, "brightness ×{v}"),
            Step::Tint(t) => write!(f, "tint {} @ {:.2}", t.hex(), t.intensity),
            Step::Transparency(v) => write!(f, "transparency ×{v}"),
            Step::Blur(r) => write!(f, "blur r={r}"),
        }
    }
}

fn check_finite(field: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::validation(format!("{field} must be a finite number, got {value}")))
    }
}

fn check_non_negative(field: &str, value: f32) -> Result<()> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(Error::validation(format!("{field} must be >= 0, got {value}")));
    }
    Ok(())
}

fn check_unit(field: &str, value: f32) -> Result<()> {
    check_finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::validation(format!("{field} must be within 0.0-1.0, got {value}")));
    }
    Ok(())
}

impl TransformConfig {
    /// Parse a TOML preset. Syntax and type errors are validation errors.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::validation(format!("invalid transform preset: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Single validation pass over every field.
    pub fn validate(&self) -> Result<()> {
        if let Some(r) = &self.resize {
            if r.width == 0 || r.height == 0 {
                return Err(Error::validation(format!(
                    "resize target must be non-zero, got {}x{}",
                    r.width, r.height
                )));
            }
        }
        if let Some(r) = &self.rotate {
            check_finite("rotate.degrees", r.degrees)?;
        }
        if let Some(v) = self.contrast {
            check_non_negative("contrast", v)?;
        }
        if let Some(v) = self.saturation {
            check_non_negative("saturation", v)?;
        }
        if let Some(v) = self.brightness {
            check_non_negative("brightness", v)?;
        }
        if let Some(t) = &self.tint {
            check_unit("tint.intensity", t.intensity)?;
        }
        if let Some(v) = self.transparency {
            check_unit("transparency", v)?;
        }
        if let Some(v) = self.blur {
            check_non_negative("blur", v)?;
        }
        Ok(())
    }

    /// Non-identity operations in application order.
    ///
    /// The order is fixed: resize, rotate, grayscale, contrast, saturation,
    /// brightness, tint, transparency, blur.
    pub fn steps(&self) -> Vec<Step> {
        let mut steps = Vec::new();
        if let Some(r) = self.resize {
            steps.push(Step::Resize(r));
        }
        if let Some(r) = self.rotate.filter(|r| !r.is_identity()) {
            steps.push(Step::Rotate(r));
        }
        if self.grayscale {
            steps.push(Step::Grayscale);
        }
        if let Some(v) = self.contrast.filter(|&v| v != 1.0) {
            steps.push(Step::Contrast(v));
        }
        if let Some(v) = self.saturation.filter(|&v| v != 1.0) {
            steps.push(Step::Saturation(v));
        }
        if let Some(v) = self.brightness.filter(|&v| v != 1.0) {
            steps.push(Step::Brightness(v));
        }
        if let Some(t) = self.tint.filter(|t| t.intensity != 0.0) {
            steps.push(Step::Tint(t));
        }
        if let Some(v) = self.transparency.filter(|&v| v != 1.0) {
            steps.push(Step::Transparency(v));
        }
        if let Some(v) = self.blur.filter(|&v| v != 0.0) {
            steps.push(Step::Blur(v));
        }
        steps
    }

    pub fn is_identity(&self) -> bool {
        self.steps().is_empty()
    }
}
