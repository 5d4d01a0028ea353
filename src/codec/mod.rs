//! Embedding image folders as base64 payloads in generated Rust modules.
//!
//! ```text
//! assets/icons/  ──encode_folder──▶  EmbeddedImageTable  ──generate_module──▶  icons.rs
//!                                          ▲                                     │
//!                                          └───────────parse_module──────────────┘
//! ```
//!
//! A generated module is self-contained data plus two accessors,
//! `list_images()` and `get_image(name)`, which call [`lookup_static`] in this
//! crate. The same lookups are available on an in-memory table through
//! [`list_images`] and [`get_image`].
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | file stem → identifier, collision policy |
//! | [`table`] | table types, content hash, lookups |
//! | [`encode`] | folder listing, parallel decode/limit/encode |
//! | [`module`] | Rust source generation and parsing |

pub mod encode;
pub mod module;
pub mod naming;
pub mod table;

pub use encode::{
    EncodeEvent, EncodeOptions, EncodeReport, FailurePolicy, FileFailure, encode_folder,
    encode_folder_with_backend,
};
pub use module::{generate_module, parse_module};
pub use naming::{CollisionPolicy, derive_identifier, is_valid_identifier};
pub use table::{
    EmbeddedEntry, EmbeddedImageTable, StaticEntry, get_image, get_image_bytes, list_images,
    lookup_static, static_names,
};
