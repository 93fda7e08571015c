//! Codec error types.

use shared_types::ChainError;
use thiserror::Error;

/// Canonical encoder/decoder rejection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before the declared structure was complete.
    #[error("Unexpected end of input")]
    UnexpectedEof,

    /// Bytes remained after the outermost item was decoded.
    #[error("Trailing bytes after decoded item")]
    TrailingBytes,

    /// Unknown type tag.
    #[error("Invalid type tag: {0}")]
    InvalidTag(u64),

    /// Unsupported wire version.
    #[error("Invalid version: {0}")]
    InvalidVersion(u64),

    /// Integer encoded with leading zeros or a redundant long form.
    #[error("Non-minimal integer encoding")]
    NonMinimalInteger,

    /// A length prefix exceeds what the platform can address.
    #[error("Length overflow")]
    LengthOverflow,

    /// Expected a byte string but found a list, or vice versa.
    #[error("Unexpected item shape: expected {expected}")]
    UnexpectedShape {
        /// What the decoder was looking for ("bytes" or "list").
        expected: &'static str,
    },

    /// A fixed-width field had the wrong length.
    #[error("Bad field width: expected {expected} bytes, got {actual}")]
    BadFieldWidth {
        /// Required byte width.
        expected: usize,
        /// Observed byte width.
        actual: usize,
    },

    /// A list had the wrong number of elements for its tag.
    #[error("Bad field count: expected {expected}, got {actual}")]
    BadFieldCount {
        /// Required element count.
        expected: usize,
        /// Observed element count.
        actual: usize,
    },
}

impl From<CodecError> for ChainError {
    fn from(err: CodecError) -> Self {
        ChainError::EncodingError(err.to_string())
    }
}
