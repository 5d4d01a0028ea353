//! Tool configuration module.
//!
//! Handles loading, validating, and merging `image-studio.toml`. Stock
//! defaults are the base layer; a user file overrides just the keys it names,
//! and command-line flags override both.
//!
//! ## Config File Location
//!
//! `image-studio.toml` in the working directory is picked up automatically.
//! `--config PATH` points at any other file (which then must exist).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! quality = 90              # JPEG quality for `process` (1-100)
//!
//! [resize]
//! filter = "lanczos"        # nearest | bilinear | bicubic | lanczos
//! mode = "exact"            # exact | fit | fill | pad
//!
//! [embed]
//! # quality = 85            # Omit for lossless PNG; set for JPEG on opaque images
//! # max_size = 512          # Downscale so the longer edge fits
//! collisions = "suffix"     # suffix | reject
//! on_error = "lenient"      # lenient | strict
//! recursive = false
//!
//! [animation]
//! delay_ms = 100            # Default per-frame delay
//! loops = 0                 # 0 = forever
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::animation::{FrameDelay, Repeat};
use crate::codec::{CollisionPolicy, EncodeOptions, FailurePolicy};
use crate::imaging::{Quality, ResampleFilter, ResizeMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "image-studio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `image-studio.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Encoding settings for `process`.
    pub output: OutputConfig,
    /// Defaults for `--resize`.
    pub resize: ResizeConfig,
    /// Folder embedding settings.
    pub embed: EmbedConfig,
    pub animation: AnimationConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl StudioConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if let Some(q) = self.embed.quality {
            if !(1..=100).contains(&q) {
                return Err(ConfigError::Validation(
                    "embed.quality must be 1-100".into(),
                ));
            }
        }
        if self.embed.max_size == Some(0) {
            return Err(ConfigError::Validation(
                "embed.max_size must be at least 1".into(),
            ));
        }
        if self.animation.delay_ms == 0 {
            return Err(ConfigError::Validation(
                "animation.delay_ms must be at least 1".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Output quality as the checked pipeline type.
    pub fn output_quality(&self) -> Quality {
        Quality::new(self.output.quality).unwrap_or_default()
    }

    /// Folder encoding options described by the `[embed]` section.
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            quality: self.embed.quality.and_then(|q| Quality::new(q).ok()),
            max_size: self.embed.max_size,
            collisions: self.embed.collisions,
            on_error: self.embed.on_error,
            recursive: self.embed.recursive,
        }
    }

    pub fn frame_delay(&self) -> FrameDelay {
        FrameDelay::Uniform(self.animation.delay_ms)
    }

    pub fn repeat(&self) -> Repeat {
        Repeat::from_loops(self.animation.loops)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality (1-100). Other formats ignore it.
    pub quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub filter: ResampleFilter,
    pub mode: ResizeMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbedConfig {
    /// `None` stores lossless PNG.
    pub quality: Option<u8>,
    pub max_size: Option<u32>,
    pub collisions: CollisionPolicy,
    pub on_error: FailurePolicy,
    pub recursive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    pub delay_ms: u32,
    /// Total plays; `0` loops forever.
    pub loops: u16,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            delay_ms: 100,
            loops: 0,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(StudioConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StudioConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StudioConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `image-studio.toml` from `dir`, falling back to stock defaults.
pub fn load_config(dir: &Path) -> Result<StudioConfig, ConfigError> {
    let overlay = load_raw_config(&dir.join(CONFIG_FILE_NAME))?;
    if overlay.is_some() {
        log::debug!("using {}", dir.join(CONFIG_FILE_NAME).display());
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Load an explicitly named config file, which must exist.
pub fn load_config_file(path: &Path) -> Result<StudioConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

/// Returns a fully-commented stock `image-studio.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Studio Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the working directory as image-studio.toml, or pass
# --config PATH. Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output encoding (process command)
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1 = worst, 100 = best). PNG, GIF, BMP, TIFF and WebP
# (always lossless) ignore it.
quality = 90

# ---------------------------------------------------------------------------
# Resize defaults
# ---------------------------------------------------------------------------
[resize]
# Resampling filter: nearest, bilinear, bicubic, lanczos.
filter = "lanczos"

# How the source aspect ratio relates to the requested box:
#   exact - stretch to exactly WxH
#   fit   - largest size inside the box, aspect preserved
#   fill  - cover the box, then center-crop
#   pad   - fit, then center on a WxH canvas (transparent or black)
mode = "exact"

# ---------------------------------------------------------------------------
# Folder embedding (embed command)
# ---------------------------------------------------------------------------
[embed]
# Lossy quality for opaque images (stored as JPEG). Images with transparency
# are always stored as PNG. Omit to store everything as lossless PNG.
# quality = 85

# Downscale images whose longer edge exceeds this many pixels.
# max_size = 512

# Two files deriving the same name:
#   suffix - first file (in filename order) keeps it, later ones get _2, _3, ...
#   reject - fail naming both files
collisions = "suffix"

# A file that cannot be decoded:
#   lenient - skip it and report it
#   strict  - fail the whole run
on_error = "lenient"

# Include images in subdirectories.
recursive = false

# ---------------------------------------------------------------------------
# Animation (animate command)
# ---------------------------------------------------------------------------
[animation]
# Delay between frames in milliseconds. GIF stores hundredths of a second.
delay_ms = 100

# Total number of plays. 0 loops forever.
loops = 0

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
