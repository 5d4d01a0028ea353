//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each image is shown by its identity first (positional index and name) with
//! file paths and sizes as secondary context. The same `NNN name` header is
//! used whether the image is being embedded, listed or extracted, so output
//! from different commands lines up.
//!
//! # Output Format
//!
//! ## Process
//!
//! ```text
//! photo.jpg (640x480 RGB)
//!     001 resize 320x240 (fit, lanczos)
//!     002 grayscale
//!     → thumb.png (320x240 RGB, png)
//! ```
//!
//! ## Embed
//!
//! ```text
//! Embedding 3 images from assets/icons
//!     001 logo ← logo.png (png 64x64, 1.2 KB)
//!     002 broken ← broken.png FAILED: Failed to decode broken.png: ...
//!     003 photo ← Photo.JPG (jpeg 512x384, 40.1 KB)
//! Embedded 2 images → src/icons.rs (hash 9f86d081)
//!     Skipped 1 file
//! ```
//!
//! ## List
//!
//! ```text
//! assets/icons (2 images, lossless)
//!     001 logo (png 64x64, 1.2 KB)
//!     002 photo (png 512x384, 310.0 KB)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::animation::{AnimationFrameSet, Repeat};
use crate::codec::{EmbeddedImageTable, EncodeEvent, EncodeReport};
use crate::imaging::{OutputFormat, Step};
use crate::raster::RasterImage;
use serde::Serialize;
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count.
pub fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// `WxH MODE` description of a raster.
fn describe(image: &RasterImage) -> String {
    format!("{}x{} {}", image.width(), image.height(), image.mode())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(8)]
}

// ============================================================================
// Process
// ============================================================================

/// Format the result of running the pipeline on one file.
pub fn format_process_output(
    source: &Path,
    before: &RasterImage,
    steps: &[Step],
    target: &Path,
    after: &RasterImage,
    format: OutputFormat,
) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", file_name(source), describe(before))];
    if steps.is_empty() {
        lines.push(format!("{}(no transformations)", indent(1)));
    }
    for (i, step) in steps.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), step));
    }
    lines.push(format!(
        "{}→ {} ({}, {})",
        indent(1),
        target.display(),
        describe(after),
        format
    ));
    lines
}

/// Print process output to stdout.
pub fn print_process_output(
    source: &Path,
    before: &RasterImage,
    steps: &[Step],
    target: &Path,
    after: &RasterImage,
    format: OutputFormat,
) {
    for line in format_process_output(source, before, steps, target, after, format) {
        println!("{}", line);
    }
}

// ============================================================================
// Embed
// ============================================================================

/// Format a single progress event from folder encoding.
pub fn format_encode_event(event: &EncodeEvent) -> Vec<String> {
    match event {
        EncodeEvent::Started { folder, total } => {
            let noun = if *total == 1 { "image" } else { "images" };
            vec![format!("Embedding {} {} from {}", total, noun, folder)]
        }
        EncodeEvent::Encoded {
            index,
            name,
            source,
            format,
            width,
            height,
            bytes,
        } => vec![format!(
            "{}{} {} ← {} ({} {}x{}, {})",
            indent(1),
            format_index(*index),
            name,
            source,
            format,
            width,
            height,
            format_bytes(*bytes)
        )],
        EncodeEvent::Failed {
            index,
            name,
            source,
            reason,
        } => vec![format!(
            "{}{} {} ← {} FAILED: {}",
            indent(1),
            format_index(*index),
            name,
            source,
            reason
        )],
    }
}

/// Format the closing summary of an `embed` run.
///
/// `written` is false when the existing module already had the same content
/// hash and was left untouched.
pub fn format_embed_summary(report: &EncodeReport, output: &Path, written: bool) -> Vec<String> {
    let table = &report.table;
    let hash = table.content_hash();
    let mut lines = Vec::new();
    if written {
        let noun = if table.image_count() == 1 { "image" } else { "images" };
        lines.push(format!(
            "Embedded {} {} → {} (hash {})",
            table.image_count(),
            noun,
            output.display(),
            short_hash(&hash)
        ));
    } else {
        lines.push(format!(
            "Unchanged: {} (hash {})",
            output.display(),
            short_hash(&hash)
        ));
    }
    if !report.failures.is_empty() {
        let noun = if report.failures.len() == 1 { "file" } else { "files" };
        lines.push(format!("{}Skipped {} {}", indent(1), report.failures.len(), noun));
        for failure in &report.failures {
            lines.push(format!("{}{}: {}", indent(2), failure.source, failure.reason));
        }
    }
    if !report.ignored.is_empty() {
        lines.push(format!(
            "{}Ignored {} non-image {}",
            indent(1),
            report.ignored.len(),
            if report.ignored.len() == 1 { "file" } else { "files" }
        ));
    }
    lines
}

/// Print embed summary to stdout.
pub fn print_embed_summary(report: &EncodeReport, output: &Path, written: bool) {
    for line in format_embed_summary(report, output, written) {
        println!("{}", line);
    }
}

// ============================================================================
// List
// ============================================================================

fn storage_label(table: &EmbeddedImageTable) -> String {
    match (table.quality, table.max_size) {
        (None, None) => "lossless".to_string(),
        (Some(q), None) => format!("quality {q}"),
        (None, Some(m)) => format!("lossless, max {m}px"),
        (Some(q), Some(m)) => format!("quality {q}, max {m}px"),
    }
}

/// Format the contents of an embedded table.
pub fn format_image_list(table: &EmbeddedImageTable) -> Vec<String> {
    let noun = if table.image_count() == 1 { "image" } else { "images" };
    let mut lines = vec![format!(
        "{} ({} {}, {})",
        table.source_folder,
        table.image_count(),
        noun,
        storage_label(table)
    )];
    for (i, entry) in table.entries.iter().enumerate() {
        lines.push(format!(
            "{}{} {} ({} {}x{}, {})",
            indent(1),
            format_index(i + 1),
            entry.name,
            entry.format,
            entry.width,
            entry.height,
            format_bytes(entry.payload_len())
        ));
    }
    lines
}

/// Print image list to stdout.
pub fn print_image_list(table: &EmbeddedImageTable) {
    for line in format_image_list(table) {
        println!("{}", line);
    }
}

#[derive(Serialize)]
struct ListingJson<'a> {
    source_folder: &'a str,
    generated_at: &'a str,
    quality: Option<u8>,
    max_size: Option<u32>,
    content_hash: String,
    images: Vec<ListingEntry<'a>>,
}

#[derive(Serialize)]
struct ListingEntry<'a> {
    name: &'a str,
    format: OutputFormat,
    width: u32,
    height: u32,
    bytes: usize,
}

/// Table metadata and entries (without payloads) as pretty JSON.
pub fn format_image_list_json(table: &EmbeddedImageTable) -> serde_json::Result<String> {
    let listing = ListingJson {
        source_folder: &table.source_folder,
        generated_at: &table.generated_at,
        quality: table.quality,
        max_size: table.max_size,
        content_hash: table.content_hash(),
        images: table
            .entries
            .iter()
            .map(|e| ListingEntry {
                name: &e.name,
                format: e.format,
                width: e.width,
                height: e.height,
                bytes: e.payload_len(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&listing)
}

// ============================================================================
// Extract, animate, sample
// ============================================================================

/// Format the result of extracting one embedded image.
pub fn format_extract_output(name: &str, image: &RasterImage, target: &Path) -> Vec<String> {
    vec![format!("{} ({}) → {}", name, describe(image), target.display())]
}

/// Format the result of writing an animation.
pub fn format_animation_output(
    set: &AnimationFrameSet,
    repeat: Repeat,
    target: &Path,
    bytes: usize,
) -> Vec<String> {
    let (w, h) = set.dimensions();
    let looping = match repeat {
        Repeat::Infinite => "loops forever".to_string(),
        Repeat::Finite(1) => "plays once".to_string(),
        Repeat::Finite(n) => format!("plays {n} times"),
    };
    let mut lines = vec![format!(
        "{}: {} frames, {}x{}, {} ms total, {} ({})",
        target.display(),
        set.len(),
        w,
        h,
        set.total_duration_ms(),
        looping,
        format_bytes(bytes)
    )];
    for (i, frame) in set.frames().iter().enumerate() {
        lines.push(format!(
            "{}{} {} ms",
            indent(1),
            format_index(i + 1),
            frame.delay_ms
        ));
    }
    lines
}

/// Format the list of generated sample files.
pub fn format_sample_output(dir: &Path, paths: &[PathBuf]) -> Vec<String> {
    let mut lines = vec![format!("Samples in {}", dir.display())];
    for (i, path) in paths.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), file_name(path)));
    }
    lines
}

/// Print any pre-formatted lines.
pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
