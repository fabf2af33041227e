//! Error types for the handshake engine.
//!
//! Validation failures are a separate enum from engine errors: a validation
//! failure still produces a reply frame carrying a wire status code, while
//! an [`FtError`] means no reply could be built at all. The status mapping
//! lives here and nowhere else; engine logic only ever names the typed
//! variant.

use roamkey_crypto::CryptoError;
use roamkey_proto::{ProtocolError, StatusCode};
use thiserror::Error;

/// A handshake rejection, mapped to a wire status at the encode boundary.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Mobility domain element absent, malformed, or for another domain
    #[error("invalid mobility domain element")]
    InvalidMdie,

    /// AKM suite is not the one this network runs
    #[error("invalid AKM suite")]
    InvalidAkmp,

    /// Pairwise cipher is not enabled on this BSS
    #[error("invalid pairwise cipher")]
    InvalidPairwiseCipher,

    /// PMKID does not name a key this AP can use
    #[error("invalid PMKID")]
    InvalidPmkid,

    /// Fast transition element absent, malformed, or inconsistent
    #[error("invalid fast transition element")]
    InvalidFtie,

    /// Frame MIC did not verify under the derived KCK
    #[error("MIC mismatch")]
    MicMismatch,

    /// No key material reachable for the claimed R0 key holder
    #[error("R0 key holder unreachable")]
    R0khUnreachable,

    /// A confirm arrived with no pending handshake to confirm
    #[error("no pending handshake for this station")]
    NoPendingHandshake,
}

impl ValidationError {
    /// Wire status code for a reply frame.
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::InvalidMdie => StatusCode::InvalidMdie,
            Self::InvalidAkmp => StatusCode::InvalidAkmp,
            Self::InvalidPairwiseCipher => StatusCode::InvalidPairwiseCipher,
            Self::InvalidPmkid => StatusCode::InvalidPmkid,
            // A bad MIC is a malformed FTIE as far as the wire is concerned
            Self::InvalidFtie | Self::MicMismatch => StatusCode::InvalidFtie,
            Self::R0khUnreachable => StatusCode::R0khUnreachable,
            Self::NoPendingHandshake => StatusCode::UnspecifiedFailure,
        }
    }
}

/// Errors that abort frame handling entirely.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FtError {
    /// Frame envelope could not be parsed
    #[error("frame parse error: {0}")]
    Parse(#[from] ProtocolError),

    /// Fast transition is not enabled on this BSS
    #[error("fast transition is not enabled")]
    NotEnabled,

    /// Frame type is not one this side handles
    #[error("unexpected frame for an AP: {0}")]
    UnexpectedFrame(&'static str),

    /// R1 key holder store is full
    #[error("R1 key store at capacity {capacity}")]
    CapacityExceeded {
        /// Configured entry limit
        capacity: usize,
    },

    /// Engine configuration is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Inter-AP transport failed to carry a frame
    #[error("inter-AP transport: {0}")]
    Transport(String),

    /// Key derivation or wrapping failed
    #[error("crypto error: {0}")]
    Internal(#[from] CryptoError),
}

/// Configuration validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// SSID must be 1 to 32 bytes
    #[error("SSID length {0} outside 1..=32")]
    InvalidSsidLength(usize),

    /// R0KH-ID must be 1 to 48 bytes
    #[error("R0KH-ID length {0} outside 1..=48")]
    InvalidR0khIdLength(usize),

    /// Group key must be 1 to 32 bytes
    #[error("group key length {0} outside 1..=32")]
    InvalidGroupKeyLength(usize),

    /// Group key id must be 0 to 3
    #[error("group key id {0} outside 0..=3")]
    InvalidGroupKeyId(u8),

    /// AKM suite must be an FT suite
    #[error("configured AKM is not a fast transition suite")]
    NotAnFtAkm,

    /// At least one pairwise cipher must be enabled
    #[error("no pairwise cipher configured")]
    NoPairwiseCipher,

    /// Store capacity must be non-zero
    #[error("key store capacity must be non-zero")]
    ZeroCapacity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_validation_error_maps_to_a_failure_status() {
        let all = [
            ValidationError::InvalidMdie,
            ValidationError::InvalidAkmp,
            ValidationError::InvalidPairwiseCipher,
            ValidationError::InvalidPmkid,
            ValidationError::InvalidFtie,
            ValidationError::MicMismatch,
            ValidationError::R0khUnreachable,
            ValidationError::NoPendingHandshake,
        ];
        for err in all {
            assert!(!err.status_code().is_success(), "{err} must not map to success");
        }
    }

    #[test]
    fn status_values_match_the_standard() {
        assert_eq!(ValidationError::InvalidPairwiseCipher.status_code().to_u16(), 19);
        assert_eq!(ValidationError::R0khUnreachable.status_code().to_u16(), 28);
        assert_eq!(ValidationError::InvalidAkmp.status_code().to_u16(), 43);
        assert_eq!(ValidationError::InvalidPmkid.status_code().to_u16(), 53);
        assert_eq!(ValidationError::InvalidMdie.status_code().to_u16(), 54);
        assert_eq!(ValidationError::InvalidFtie.status_code().to_u16(), 55);
    }
}
