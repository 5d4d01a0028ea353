//! The embedded image table and lookups against it.
//!
//! An [`EmbeddedImageTable`] is the in-memory form of a generated module:
//! ordered entries of `(name, format, width, height, base64 payload)` plus the
//! metadata written into the module header. Generated modules store the same
//! entries as a static slice of [`StaticEntry`] tuples and resolve names
//! through [`lookup_static`], so both paths share one decoder.

use crate::error::{Error, Result};
use crate::imaging::{OutputFormat, load_image_bytes};
use crate::raster::RasterImage;
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// `(name, format, width, height, base64)` as laid out in generated modules.
pub type StaticEntry = (&'static str, &'static str, u32, u32, &'static str);

/// One embedded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedEntry {
    pub name: String,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    /// Base64 (standard alphabet, padded) of the encoded container bytes.
    pub data: String,
}

impl EmbeddedEntry {
    /// Encoded size of the payload in bytes (before base64).
    pub fn payload_len(&self) -> usize {
        let padding = self.data.bytes().rev().take_while(|&c| c == b'=').count();
        (self.data.len() / 4 * 3).saturating_sub(padding)
    }
}

/// Ordered, uniquely named embedded images plus generation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedImageTable {
    /// UTC, RFC 3339, whole seconds.
    pub generated_at: String,
    pub source_folder: String,
    /// `None` means every entry is lossless PNG.
    pub quality: Option<u8>,
    pub max_size: Option<u32>,
    pub entries: Vec<EmbeddedEntry>,
}

impl EmbeddedImageTable {
    pub fn image_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, name: &str) -> Option<&EmbeddedEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// SHA-256 over names, formats, dimensions and payloads, as lowercase hex.
    ///
    /// The timestamp and source folder are excluded so that regenerating an
    /// unchanged folder yields the same hash.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"embedded-images\0");
        for entry in &self.entries {
            hasher.update(entry.name.as_bytes());
            hasher.update(b"\0");
            hasher.update(entry.format.name().as_bytes());
            hasher.update(b"\0");
            hasher.update(entry.width.to_le_bytes());
            hasher.update(entry.height.to_le_bytes());
            hasher.update(entry.data.as_bytes());
            hasher.update(b"\0");
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Names in table order.
pub fn list_images(table: &EmbeddedImageTable) -> Vec<&str> {
    table.entries.iter().map(|e| e.name.as_str()).collect()
}

/// Decode the named entry back into a raster.
pub fn get_image(table: &EmbeddedImageTable, name: &str) -> Result<RasterImage> {
    let entry = table.entry(name).ok_or_else(|| Error::NotFound {
        name: name.to_string(),
        available: list_images(table).into_iter().map(String::from).collect(),
    })?;
    decode_payload(&entry.name, &entry.data)
}

/// Raw container bytes of the named entry.
pub fn get_image_bytes(table: &EmbeddedImageTable, name: &str) -> Result<Vec<u8>> {
    let entry = table.entry(name).ok_or_else(|| Error::NotFound {
        name: name.to_string(),
        available: list_images(table).into_iter().map(String::from).collect(),
    })?;
    decode_base64(&entry.name, &entry.data)
}

/// Lookup used by generated modules.
pub fn lookup_static(entries: &[StaticEntry], name: &str) -> Result<RasterImage> {
    let (entry_name, _, _, _, data) = entries
        .iter()
        .find(|(n, ..)| *n == name)
        .ok_or_else(|| Error::NotFound {
            name: name.to_string(),
            available: entries.iter().map(|(n, ..)| n.to_string()).collect(),
        })?;
    decode_payload(entry_name, data)
}

/// Names of a static entry slice, in order.
pub fn static_names(entries: &[StaticEntry]) -> Vec<&'static str> {
    entries.iter().map(|(n, ..)| *n).collect()
}

fn decode_base64(name: &str, data: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(data)
        .map_err(|e| Error::decode(name, format!("invalid base64 payload: {e}")))
}

fn decode_payload(name: &str, data: &str) -> Result<RasterImage> {
    let bytes = decode_base64(name, data)?;
    load_image_bytes(&bytes, name)
}
