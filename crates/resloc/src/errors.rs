//! Error types for namespaced key parsing and resolution.

use thiserror::Error;

use crate::parse::MAX_LENGTH;

/// Errors produced while parsing or resolving namespaced keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The input was empty where a key is required.
    #[error("namespaced key is empty")]
    Empty,

    /// The raw input exceeded [`MAX_LENGTH`] bytes.
    #[error("namespaced key is too long: {len} bytes (max {max})", max = MAX_LENGTH)]
    TooLong { len: usize },

    /// The input ended with a trailing ':' separator.
    #[error("namespaced key contains a trailing ':'")]
    TrailingSeparator,

    /// Strict parsing found a character that is not valid in its position.
    #[error("invalid character {ch:?} at byte {index}: {kind}")]
    InvalidChar {
        ch: char,
        index: usize,
        kind: InvalidCharKind,
    },

    /// A structural accessor was invoked on a nil handle.
    #[error("nil namespace or key handle")]
    NilHandle,
}

/// Why the strict parser rejected a character.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidCharKind {
    /// A second ':' after the namespace/key split was already fixed.
    #[error("found multiple ':' separators")]
    DoubledSeparator,

    /// A ':' where no separator is permitted (bare key or namespace).
    #[error("':' is not allowed in this position")]
    SeparatorNotAllowed,

    /// A '/' or '.' in namespace position.
    #[error("'/' and '.' are only allowed in a key")]
    PathInNamespace,

    /// Any other character, including all non-ASCII input.
    #[error("character is not allowed in a namespace or key")]
    Unrecognized,
}

pub type Result<T> = std::result::Result<T, KeyError>;
