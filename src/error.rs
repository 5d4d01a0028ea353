//! Error taxonomy shared by the pipeline, the codec and animation assembly.
//!
//! | Variant | Raised when |
//! |---|---|
//! | [`Error::Validation`] | a parameter, name or frame set is malformed or out of range |
//! | [`Error::NotFound`] | an embedded image name does not exist (lists the alternatives) |
//! | [`Error::Decode`] | bytes, base64 or generated module text cannot be parsed |
//! | [`Error::Encode`] | an encoder rejects an image |
//! | [`Error::Io`] | the filesystem fails; passed through unchanged |
//! | [`Error::Cancelled`] | a folder encoding run was cancelled between files |
//!
//! Nothing in the crate retries or swallows these; adapters decide how to
//! present them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Image '{name}' not found. Available: [{}]", available.join(", "))]
    NotFound { name: String, available: Vec<String> },
    #[error("Failed to decode {origin}: {reason}")]
    Decode { origin: String, reason: String },
    #[error("Failed to encode {format}: {reason}")]
    Encode { format: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub(crate) fn decode(origin: impl Into<String>, reason: impl ToString) -> Self {
        Error::Decode {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_available_names() {
        let err = Error::NotFound {
            name: "missing".into(),
            available: vec!["alpha".into(), "beta".into()],
        };
        assert_eq!(
            err.to_string(),
            "Image 'missing' not found. Available: [alpha, beta]"
        );
    }

    #[test]
    fn decode_error_carries_origin() {
        let err = Error::decode("icons/a.png", "bad magic");
        assert_eq!(err.to_string(), "Failed to decode icons/a.png: bad magic");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied));
    }
}
