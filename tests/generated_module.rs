//! A generated module compiled as real Rust.
//!
//! `fixtures/icons.rs` is `image-studio embed` output for a two-image folder.
//! Including it as a module checks that the emitted source builds against the
//! crate and that its accessors decode the payloads.

#[path = "fixtures/icons.rs"]
mod icons;

use image_studio::codec::{self, parse_module};
use image_studio::{ColorMode, Error, RasterImage};

const ICONS_SOURCE: &str = include_str!("fixtures/icons.rs");

#[test]
fn accessors_list_names_in_table_order() {
    assert_eq!(icons::list_images(), vec!["logo", "logo_2"]);
    assert_eq!(icons::IMAGE_COUNT, icons::IMAGES.len());
    assert_eq!(icons::QUALITY, None);
    assert_eq!(icons::MAX_SIZE, None);
}

#[test]
fn accessor_decodes_lossless_pixels() {
    let expected = RasterImage::new(
        2,
        2,
        ColorMode::Rgba,
        vec![
            255, 0, 0, 255, 0, 255, 0, 128, //
            0, 0, 255, 0, 255, 255, 255, 255,
        ],
    )
    .unwrap();
    assert_eq!(icons::get_image("logo").unwrap(), expected);

    let opaque = RasterImage::new(3, 1, ColorMode::Rgb, vec![10, 20, 30, 40, 50, 60, 70, 80, 90])
        .unwrap();
    assert_eq!(icons::get_image("logo_2").unwrap(), opaque);
}

#[test]
fn accessor_reports_unknown_names() {
    match icons::get_image("logo_3") {
        Err(Error::NotFound { name, available }) => {
            assert_eq!(name, "logo_3");
            assert_eq!(available, vec!["logo", "logo_2"]);
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn text_reader_agrees_with_compiled_module() {
    let table = parse_module(ICONS_SOURCE).unwrap();
    assert_eq!(table.generated_at, icons::GENERATED_AT);
    assert_eq!(table.source_folder, icons::SOURCE_FOLDER);
    assert_eq!(table.content_hash(), icons::CONTENT_HASH);
    assert_eq!(codec::list_images(&table), icons::list_images());
    for name in icons::list_images() {
        assert_eq!(
            codec::get_image(&table, name).unwrap(),
            icons::get_image(name).unwrap()
        );
    }
}

#[test]
fn regenerating_the_table_reproduces_the_source() {
    let table = parse_module(ICONS_SOURCE).unwrap();
    let regenerated = codec::generate_module(&table, "icons").unwrap();
    let without_version = |text: &str| {
        text.lines()
            .filter(|l| !l.starts_with("//! Generated by"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    assert_eq!(without_version(&regenerated), without_version(ICONS_SOURCE));
}
