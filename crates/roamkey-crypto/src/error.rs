//! Error types for key derivation and wrapping.

use thiserror::Error;

/// Errors from the key hierarchy and wrapping primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// R0 key holder identity outside the 1..=48 byte range
    #[error("R0KH-ID length {0} outside 1..=48")]
    InvalidR0khIdLength(usize),

    /// Requested PTK length is not a supported cipher-suite length
    #[error("unsupported PTK length {0}, expected 48 or 64")]
    InvalidPtkLength(usize),

    /// Key wrap input is not a multiple of the 8-byte semiblock size
    #[error("key wrap input length {0} is not a multiple of 8")]
    UnalignedWrapInput(usize),

    /// Key unwrap failed integrity verification
    #[error("key unwrap integrity check failed")]
    UnwrapIntegrity,
}
