//! Folder → [`EmbeddedImageTable`].
//!
//! ## Flow
//!
//! ```text
//! list files (walkdir, filename order)
//!   → assign names (before any decoding)
//!   → per file, in parallel: read → decode → limit size → encode → base64
//!   → collect in filename order, applying the failure policy
//! ```
//!
//! ## Storage format
//!
//! | `quality` | Opaque image | Image with alpha |
//! |---|---|---|
//! | `None` | PNG | PNG |
//! | `Some(q)` | JPEG at `q` | PNG |
//!
//! Files are processed on rayon's global pool. Progress is reported as
//! [`EncodeEvent`]s over an optional channel; the channel is only written to,
//! so a caller that does not drain it loses nothing but output.

use super::naming::{CollisionPolicy, assign_names};
use super::table::{EmbeddedEntry, EmbeddedImageTable};
use crate::error::{Error, Result};
use crate::imaging::operations::resize;
use crate::imaging::rust_backend::is_supported_input;
use crate::imaging::{
    ImageBackend, OutputFormat, Quality, Resize, RustBackend, calculate_limited_dimensions,
};
use base64::{Engine as _, engine::general_purpose};
use chrono::{SecondsFormat, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use walkdir::WalkDir;

/// What to do when a file cannot be read, decoded or encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort with the first failure in filename order.
    Strict,
    /// Skip the file and record it in [`EncodeReport::failures`].
    #[default]
    Lenient,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeOptions {
    /// `None` stores lossless PNG.
    pub quality: Option<Quality>,
    /// Longer-edge limit; larger images are downscaled, smaller ones untouched.
    pub max_size: Option<u32>,
    pub collisions: CollisionPolicy,
    pub on_error: FailurePolicy,
    /// Descend into subdirectories.
    pub recursive: bool,
}

impl EncodeOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_size == Some(0) {
            return Err(Error::validation("max_size must be at least 1"));
        }
        Ok(())
    }
}

/// A file that was skipped under [`FailurePolicy::Lenient`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    /// Path relative to the encoded folder.
    pub source: String,
    /// The name the file reserved.
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct EncodeReport {
    pub table: EmbeddedImageTable,
    pub failures: Vec<FileFailure>,
    /// Files ignored because their extension is not a supported image type.
    pub ignored: Vec<String>,
}

/// Progress events, sent as files complete (not in filename order).
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeEvent {
    Started {
        folder: String,
        total: usize,
    },
    Encoded {
        /// 1-based position in filename order.
        index: usize,
        name: String,
        source: String,
        format: OutputFormat,
        width: u32,
        height: u32,
        bytes: usize,
    },
    Failed {
        index: usize,
        name: String,
        source: String,
        reason: String,
    },
}

/// Encode every supported image in `folder` with the pure Rust backend.
pub fn encode_folder(
    folder: &Path,
    options: &EncodeOptions,
    cancel: Option<&AtomicBool>,
    events: Option<Sender<EncodeEvent>>,
) -> Result<EncodeReport> {
    encode_folder_with_backend(&RustBackend::new(), folder, options, cancel, events)
}

/// Encode using a specific backend (allows testing with mock).
pub fn encode_folder_with_backend(
    backend: &impl ImageBackend,
    folder: &Path,
    options: &EncodeOptions,
    cancel: Option<&AtomicBool>,
    events: Option<Sender<EncodeEvent>>,
) -> Result<EncodeReport> {
    options.validate()?;
    let (sources, ignored) = list_sources(folder, options.recursive)?;
    let names = assign_names(&sources, options.collisions)?;

    log::debug!(
        "encoding {} files from {} ({} ignored)",
        sources.len(),
        folder.display(),
        ignored.len()
    );
    if let Some(tx) = &events {
        tx.send(EncodeEvent::Started {
            folder: folder.display().to_string(),
            total: sources.len(),
        })
        .ok();
    }

    let is_cancelled = || cancel.is_some_and(|flag| flag.load(Ordering::SeqCst));

    let results: Vec<Result<EmbeddedEntry>> = sources
        .par_iter()
        .zip(names.par_iter())
        .enumerate()
        .map_with(events, |tx, (i, (rel, name))| {
            if is_cancelled() {
                return Err(Error::Cancelled);
            }
            let source = rel.display().to_string();
            let result = encode_file(backend, &folder.join(rel), &source, name, options);
            if let Some(tx) = tx {
                let event = match &result {
                    Ok(entry) => EncodeEvent::Encoded {
                        index: i + 1,
                        name: name.clone(),
                        source,
                        format: entry.format,
                        width: entry.width,
                        height: entry.height,
                        bytes: entry.payload_len(),
                    },
                    Err(e) => EncodeEvent::Failed {
                        index: i + 1,
                        name: name.clone(),
                        source,
                        reason: e.to_string(),
                    },
                };
                tx.send(event).ok();
            }
            result
        })
        .collect();

    if results.iter().any(|r| matches!(r, Err(Error::Cancelled))) {
        return Err(Error::Cancelled);
    }

    let mut entries = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for ((result, rel), name) in results.into_iter().zip(&sources).zip(&names) {
        match result {
            Ok(entry) => entries.push(entry),
            Err(e) => match options.on_error {
                FailurePolicy::Strict => return Err(e),
                FailurePolicy::Lenient => {
                    log::warn!("skipping {}: {e}", rel.display());
                    failures.push(FileFailure {
                        source: rel.display().to_string(),
                        name: name.clone(),
                        reason: e.to_string(),
                    });
                }
            },
        }
    }

    Ok(EncodeReport {
        table: EmbeddedImageTable {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            source_folder: folder.display().to_string(),
            quality: options.quality.map(Quality::value),
            max_size: options.max_size,
            entries,
        },
        failures,
        ignored: ignored.iter().map(|p| p.display().to_string()).collect(),
    })
}

/// Supported and ignored files under `folder`, as sorted relative paths.
fn list_sources(folder: &Path, recursive: bool) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    if !folder.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", folder.display()),
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut sources = Vec::new();
    let mut ignored = Vec::new();
    for entry in WalkDir::new(folder).min_depth(1).max_depth(max_depth) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(folder)
            .unwrap_or(entry.path())
            .to_path_buf();
        if is_supported_input(&rel) {
            sources.push(rel);
        } else {
            ignored.push(rel);
        }
    }
    sources.sort();
    ignored.sort();
    Ok((sources, ignored))
}

fn encode_file(
    backend: &impl ImageBackend,
    path: &Path,
    source: &str,
    name: &str,
    options: &EncodeOptions,
) -> Result<EmbeddedEntry> {
    let bytes = std::fs::read(path)?;
    let mut image = backend.decode(&bytes, source)?;

    if let Some(max) = options.max_size {
        if let Some((w, h)) = calculate_limited_dimensions(image.dimensions(), max) {
            log::debug!("{source}: limiting {}x{} to {w}x{h}", image.width(), image.height());
            image = resize(&image, &Resize::new(w, h));
        }
    }

    let format = match options.quality {
        Some(_) if image.is_opaque() => OutputFormat::Jpeg,
        _ => OutputFormat::Png,
    };
    let encoded = backend.encode(&image, format, options.quality.unwrap_or_default())?;
    log::debug!("{source} → {name} ({format}, {} bytes)", encoded.len());

    Ok(EmbeddedEntry {
        name: name.to_string(),
        format,
        width: image.width(),
        height: image.height(),
        data: general_purpose::STANDARD.encode(encoded),
    })
}
