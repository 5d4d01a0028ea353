//! Rust source generation for embedded image tables, and the reverse.
//!
//! ## Generated layout
//!
//! ```text
//! //! Embedded images: `icons`          header with module name and folder
//! pub const GENERATED_AT: &str = ...;   metadata constants
//! pub const CONTENT_HASH: &str = ...;
//! pub static IMAGES: &[(...)] = &[      one tuple per image
//!     ("logo", "png", 64, 64, "iVBORw0..."),
//! ];
//! pub fn list_images() / get_image()    accessors calling back into this crate
//! ```
//!
//! The output is a pure function of the table: two runs over the same folder
//! with the same options differ only in `GENERATED_AT`. [`parse_module`] reads
//! the constants and the `IMAGES` literal back, checking the count and the
//! content hash.

use super::naming::is_valid_identifier;
use super::table::{EmbeddedEntry, EmbeddedImageTable};
use crate::error::{Error, Result};
use crate::imaging::OutputFormat;
use std::fmt::{self, Write as _};

const ORIGIN: &str = "generated module";

/// Render `table` as the source of a Rust module named `module_name`.
pub fn generate_module(table: &EmbeddedImageTable, module_name: &str) -> Result<String> {
    if !is_valid_identifier(module_name) {
        return Err(Error::validation(format!(
            "'{module_name}' is not a valid Rust module name"
        )));
    }
    let mut out = String::new();
    render(&mut out, table, module_name).map_err(|e| Error::Encode {
        format: "rust module".to_string(),
        reason: e.to_string(),
    })?;
    Ok(out)
}

fn render(out: &mut String, table: &EmbeddedImageTable, module_name: &str) -> fmt::Result {
    let storage = match table.quality {
        Some(q) => format!("JPEG quality {q} for opaque images, PNG otherwise"),
        None => "lossless PNG".to_string(),
    };
    writeln!(out, "//! Embedded images: `{module_name}`")?;
    writeln!(out, "//!")?;
    writeln!(
        out,
        "//! Generated by image-studio {}; regenerate with `image-studio embed`",
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out, "//! instead of editing by hand.")?;
    writeln!(out, "//!")?;
    writeln!(out, "//! Source: {}", table.source_folder.replace('\n', " "))?;
    writeln!(out, "//! Storage: {storage}")?;
    writeln!(out)?;
    writeln!(out, "#![allow(dead_code)]")?;
    writeln!(out)?;

    writeln!(out, "pub const GENERATED_AT: &str = {:?};", table.generated_at)?;
    writeln!(out, "pub const SOURCE_FOLDER: &str = {:?};", table.source_folder)?;
    writeln!(out, "pub const IMAGE_COUNT: usize = {};", table.image_count())?;
    writeln!(out, "pub const QUALITY: Option<u8> = {:?};", table.quality)?;
    writeln!(out, "pub const MAX_SIZE: Option<u32> = {:?};", table.max_size)?;
    writeln!(out, "pub const CONTENT_HASH: &str = {:?};", table.content_hash())?;
    writeln!(out)?;

    writeln!(out, "/// `(name, format, width, height, base64)`, in source filename order.")?;
    writeln!(out, "pub static IMAGES: &[(&str, &str, u32, u32, &str)] = &[")?;
    for entry in &table.entries {
        writeln!(
            out,
            "    ({:?}, {:?}, {}, {}, {:?}),",
            entry.name,
            entry.format.name(),
            entry.width,
            entry.height,
            entry.data
        )?;
    }
    writeln!(out, "];")?;
    writeln!(out)?;

    writeln!(out, "/// Names of all embedded images, in table order.")?;
    writeln!(out, "pub fn list_images() -> Vec<&'static str> {{")?;
    writeln!(out, "    image_studio::codec::static_names(IMAGES)")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "/// Decode an embedded image by name.")?;
    writeln!(
        out,
        "pub fn get_image(name: &str) -> image_studio::Result<image_studio::RasterImage> {{"
    )?;
    writeln!(out, "    image_studio::codec::lookup_static(IMAGES, name)")?;
    writeln!(out, "}}")
}

/// Load a module produced by [`generate_module`] back into a table.
pub fn parse_module(text: &str) -> Result<EmbeddedImageTable> {
    let generated_at = parse_string(const_value(text, "GENERATED_AT")?)?;
    let source_folder = parse_string(const_value(text, "SOURCE_FOLDER")?)?;
    let count: usize = parse_number(const_value(text, "IMAGE_COUNT")?)?;
    let quality: Option<u8> = parse_option(const_value(text, "QUALITY")?)?;
    let max_size: Option<u32> = parse_option(const_value(text, "MAX_SIZE")?)?;
    let expected_hash = parse_string(const_value(text, "CONTENT_HASH")?)?;

    let mut lines = text.lines().skip_while(|l| !l.starts_with("pub static IMAGES"));
    if lines.next().is_none() {
        return Err(malformed("missing IMAGES table"));
    }
    let mut entries = Vec::new();
    let mut closed = false;
    for line in lines {
        let line = line.trim();
        if line == "];" {
            closed = true;
            break;
        }
        entries.push(parse_entry(line)?);
    }
    if !closed {
        return Err(malformed("unterminated IMAGES table"));
    }

    let table = EmbeddedImageTable {
        generated_at,
        source_folder,
        quality,
        max_size,
        entries,
    };
    if table.image_count() != count {
        return Err(malformed(format!(
            "IMAGE_COUNT is {count} but the table has {} entries",
            table.image_count()
        )));
    }
    if table.content_hash() != expected_hash {
        return Err(malformed("CONTENT_HASH does not match the embedded images"));
    }
    Ok(table)
}

fn malformed(reason: impl ToString) -> Error {
    Error::decode(ORIGIN, reason)
}

/// Text between `=` and `;` of `pub const NAME: T = value;`.
fn const_value<'a>(text: &'a str, name: &str) -> Result<&'a str> {
    let prefix = format!("pub const {name}:");
    text.lines()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .and_then(|rest| rest.split_once(" = "))
        .and_then(|(_, value)| value.trim_end().strip_suffix(';'))
        .ok_or_else(|| malformed(format!("missing constant {name}")))
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| malformed(format!("expected a number, found `{value}`")))
}

fn parse_option<T: std::str::FromStr>(value: &str) -> Result<Option<T>> {
    let value = value.trim();
    if value == "None" {
        return Ok(None);
    }
    value
        .strip_prefix("Some(")
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(|| malformed(format!("expected an Option, found `{value}`")))
        .and_then(|v| parse_number(v).map(Some))
}

fn parse_string(value: &str) -> Result<String> {
    let mut cursor = Cursor::new(value.trim());
    let s = cursor.string()?;
    if !cursor.rest.is_empty() {
        return Err(malformed(format!("trailing text after string: `{}`", cursor.rest)));
    }
    Ok(s)
}

fn parse_entry(line: &str) -> Result<EmbeddedEntry> {
    let inner = line
        .strip_prefix('(')
        .and_then(|l| l.strip_suffix("),"))
        .ok_or_else(|| malformed(format!("unexpected line in IMAGES: `{line}`")))?;
    let mut cursor = Cursor::new(inner);
    let name = cursor.string()?;
    cursor.comma()?;
    let format_name = cursor.string()?;
    cursor.comma()?;
    let width = cursor.number()?;
    cursor.comma()?;
    let height = cursor.number()?;
    cursor.comma()?;
    let data = cursor.string()?;
    if !cursor.rest.trim().is_empty() {
        return Err(malformed(format!("extra fields for '{name}'")));
    }
    let format = OutputFormat::from_extension(&format_name)
        .ok_or_else(|| malformed(format!("unknown format '{format_name}' for '{name}'")))?;
    Ok(EmbeddedEntry {
        name,
        format,
        width,
        height,
        data,
    })
}

/// Minimal reader for the literals `generate_module` writes.
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(rest: &'a str) -> Self {
        Self { rest }
    }

    fn comma(&mut self) -> Result<()> {
        self.rest = self
            .rest
            .trim_start()
            .strip_prefix(',')
            .ok_or_else(|| malformed("expected `,`"))?
            .trim_start();
        Ok(())
    }

    fn number(&mut self) -> Result<u32> {
        let end = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        let (digits, rest) = self.rest.split_at(end);
        self.rest = rest;
        parse_number(digits)
    }

    /// A double-quoted literal with Rust `Debug` escapes.
    fn string(&mut self) -> Result<String> {
        let body = self
            .rest
            .strip_prefix('"')
            .ok_or_else(|| malformed("expected a string literal"))?;
        let mut out = String::new();
        let mut chars = body.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.rest = &body[i + 1..];
                    return Ok(out);
                }
                '\\' => {
                    let (_, esc) = chars
                        .next()
                        .ok_or_else(|| malformed("dangling escape"))?;
                    match esc {
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        '0' => out.push('\0'),
                        '\\' | '"' | '\'' => out.push(esc),
                        'u' => {
                            let hex: String = chars
                                .by_ref()
                                .map(|(_, c)| c)
                                .skip_while(|&c| c == '{')
                                .take_while(|&c| c != '}')
                                .collect();
                            let ch = u32::from_str_radix(&hex, 16)
                                .ok()
                                .and_then(char::from_u32)
                                .ok_or_else(|| malformed(format!("bad unicode escape `{hex}`")))?;
                            out.push(ch);
                        }
                        other => return Err(malformed(format!("unknown escape `\\{other}`"))),
                    }
                }
                _ => out.push(c),
            }
        }
        Err(malformed("unterminated string literal"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> EmbeddedImageTable {
        EmbeddedImageTable {
            generated_at: "2024-05-01T12:00:00Z".into(),
            source_folder: "assets/\"odd\" folder\\é\n".into(),
            quality: Some(80),
            max_size: None,
            entries: vec![
                EmbeddedEntry {
                    name: "logo".into(),
                    format: OutputFormat::Png,
                    width: 64,
                    height: 32,
                    data: "iVBORw0KGgo=".into(),
                },
                EmbeddedEntry {
                    name: "photo_2".into(),
                    format: OutputFormat::Jpeg,
                    width: 1,
                    height: 1,
                    data: "/9j/4AAQ".into(),
                },
            ],
        }
    }

    #[test]
    fn generated_text_has_constants_and_accessors() {
        let text = generate_module(&sample_table(), "icons").unwrap();
        assert!(text.starts_with("//! Embedded images: `icons`\n"));
        assert!(text.contains("pub const IMAGE_COUNT: usize = 2;\n"));
        assert!(text.contains("pub const QUALITY: Option<u8> = Some(80);\n"));
        assert!(text.contains("pub const MAX_SIZE: Option<u32> = None;\n"));
        assert!(text.contains("    (\"logo\", \"png\", 64, 32, \"iVBORw0KGgo=\"),\n"));
        assert!(text.contains("pub fn get_image(name: &str)"));
        assert!(text.contains("image_studio::codec::lookup_static(IMAGES, name)"));
    }

    #[test]
    fn invalid_module_name_is_rejected() {
        for bad in ["", "my-icons", "1icons", "fn"] {
            assert!(
                matches!(
                    generate_module(&sample_table(), bad),
                    Err(Error::Validation(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_restores_table() {
        let table = sample_table();
        let text = generate_module(&table, "icons").unwrap();
        assert_eq!(parse_module(&text).unwrap(), table);
    }

    #[test]
    fn only_timestamp_differs_between_runs() {
        let a = sample_table();
        let mut b = sample_table();
        b.generated_at = "2025-01-01T00:00:00Z".into();
        let ta = generate_module(&a, "icons").unwrap();
        let tb = generate_module(&b, "icons").unwrap();
        let differing: Vec<_> = ta
            .lines()
            .zip(tb.lines())
            .filter(|(x, y)| x != y)
            .collect();
        assert_eq!(differing.len(), 1);
        assert!(differing[0].0.starts_with("pub const GENERATED_AT"));
    }

    #[test]
    fn empty_table_roundtrips() {
        let mut table = sample_table();
        table.entries.clear();
        let text = generate_module(&table, "empty").unwrap();
        assert_eq!(parse_module(&text).unwrap().entries, vec![]);
    }

    #[test]
    fn tampered_payload_fails_hash_check() {
        let text = generate_module(&sample_table(), "icons").unwrap();
        let tampered = text.replace("iVBORw0KGgo=", "iVBORw0KGgA=");
        assert!(matches!(
            parse_module(&tampered),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn count_mismatch_is_detected() {
        let text = generate_module(&sample_table(), "icons").unwrap();
        let wrong = text.replace("IMAGE_COUNT: usize = 2", "IMAGE_COUNT: usize = 3");
        match parse_module(&wrong) {
            Err(Error::Decode { reason, .. }) => assert!(reason.contains("IMAGE_COUNT"), "{reason}"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn arbitrary_text_is_malformed() {
        assert!(matches!(
            parse_module("fn main() {}"),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(parse_string(r#""a\"b\\c\n\u{1f600}""#).unwrap(), "a\"b\\c\n😀");
        assert!(parse_string(r#""open"#).is_err());
        assert!(parse_string(r#""x" y"#).is_err());
    }
}
