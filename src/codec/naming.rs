//! Identifier derivation for embedded images.
//!
//! Every file in an embedded folder is addressed by a name derived from its
//! file stem. Names are plain lowercase identifiers so they read well both as
//! lookup keys and inside generated source:
//!
//! - `Red Square.png` → `red_square`
//! - `icon-24x24@2x.PNG` → `icon_24x24_2x`
//! - `2024 banner.jpg` → `img_2024_banner`
//! - `---.gif` → `image`
//!
//! When two files derive the same name, [`assign_names`] resolves the clash
//! according to the [`CollisionPolicy`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// What to do when two files derive the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// First file keeps the name, later ones get `_2`, `_3`, ...
    #[default]
    Suffix,
    /// Fail naming both files.
    Reject,
}

/// Derive an embedded-image name from a file stem.
pub fn derive_identifier(stem: &str) -> String {
    let mut name = String::with_capacity(stem.len());
    let mut in_run = false;
    for c in stem.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            name.push(c);
            in_run = false;
        } else if !in_run {
            name.push('_');
            in_run = true;
        }
    }

    let trimmed = name.trim_matches('_');
    if trimmed.is_empty() {
        "image".to_string()
    } else if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("img_{trimmed}")
    } else {
        trimmed.to_string()
    }
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
];

/// Whether `name` can be used as a module name in generated source.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && name != "_"
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&name)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Assign a unique name to each path, in order.
///
/// Paths must already be in their final (filename) order; the first path to
/// derive a name keeps it. Under [`CollisionPolicy::Suffix`] every base name
/// is reserved up front, so a generated suffix never steals the name another
/// file derives on its own.
pub fn assign_names(paths: &[PathBuf], policy: CollisionPolicy) -> Result<Vec<String>> {
    let bases: Vec<String> = paths.iter().map(|p| derive_identifier(&stem_of(p))).collect();

    let mut taken: HashSet<String> = bases.iter().cloned().collect();
    let mut first_owner: Vec<(&str, &Path)> = Vec::new();
    let mut names = Vec::with_capacity(paths.len());

    for (base, path) in bases.iter().zip(paths) {
        let owner = first_owner
            .iter()
            .find(|(name, _)| *name == base.as_str())
            .map(|(_, p)| *p);
        match (owner, policy) {
            (None, _) => {
                first_owner.push((base.as_str(), path.as_path()));
                names.push(base.clone());
            }
            (Some(existing), CollisionPolicy::Reject) => {
                return Err(Error::validation(format!(
                    "{} and {} both map to the name '{base}'",
                    existing.display(),
                    path.display()
                )));
            }
            (Some(_), CollisionPolicy::Suffix) => {
                let mut n = 2;
                while taken.contains(&format!("{base}_{n}")) {
                    n += 1;
                }
                let name = format!("{base}_{n}");
                log::debug!("{} renamed to '{name}' to avoid a collision", path.display());
                taken.insert(name.clone());
                names.push(name);
            }
        }
    }
    Ok(names)
}
