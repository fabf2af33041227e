//! Error types for information element and frame parsing.
//!
//! Strongly-typed parse errors. Malformed input never panics; every length
//! is checked before the corresponding slice is taken. Wire status codes are
//! a separate concern: parse errors are mapped to a status only where a
//! reply frame is built.

use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors from parsing or serializing FT wire structures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer ends before the structure's fixed part
    #[error("truncated {element}: need {expected} bytes, have {actual}")]
    Truncated {
        /// Structure being parsed
        element: &'static str,
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Element ID octet does not match the expected element
    #[error("wrong element id: expected {expected}, got {actual}")]
    WrongElementId {
        /// Element ID required here
        expected: u8,
        /// Element ID found
        actual: u8,
    },

    /// Element body length is invalid for this element type
    #[error("invalid {element} length {length}")]
    InvalidLength {
        /// Structure being parsed
        element: &'static str,
        /// Declared body length
        length: usize,
    },

    /// A sub-element declares more bytes than remain in the buffer
    #[error("sub-element overruns buffer: declared {declared}, remaining {remaining}")]
    SubElementOverrun {
        /// Declared sub-element length
        declared: usize,
        /// Bytes remaining after the sub-element header
        remaining: usize,
    },

    /// Serialized length disagrees with the declared element length
    #[error("element length mismatch: declared {declared}, serialized {serialized}")]
    LengthMismatch {
        /// Length written into the element header
        declared: usize,
        /// Bytes actually produced
        serialized: usize,
    },

    /// Element body too large for the one-octet length field
    #[error("element body {0} bytes exceeds the 255-byte element limit")]
    ElementTooLarge(usize),

    /// Frame category octet is not the fast BSS transition category
    #[error("not an FT action frame: category {0}")]
    WrongCategory(u8),

    /// Action octet is not a known FT action
    #[error("unknown FT action {0}")]
    UnknownAction(u8),
}
