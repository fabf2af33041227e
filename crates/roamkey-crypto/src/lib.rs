//! Roamkey Cryptographic Primitives
//!
//! Key hierarchy and integrity primitives for fast BSS transition (IEEE
//! 802.11r). Pure functions with deterministic outputs; callers provide all
//! randomness, so every derivation is reproducible in tests.
//!
//! # Key Hierarchy
//!
//! A single pairwise master key fans out across the mobility domain. The
//! top-level R0 key lives only at the R0 key holder; each AP receives an R1
//! key bound to its own key-holder identity, and per-association transient
//! keys are derived from that.
//!
//! ```text
//! Root PMK (from the initial 802.1X/PSK association)
//!        │
//!        ▼
//! KDF-384 → PMK-R0 + PMKR0Name   (per station, per mobility domain)
//!        │
//!        ▼
//! KDF-256 → PMK-R1 + PMKR1Name   (per R1 key holder)
//!        │
//!        ▼
//! KDF     → PTK + PTKName        (per association; KCK ‖ KEK ‖ TK)
//! ```
//!
//! # Security
//!
//! Key Separation:
//! - Each derivation is labeled; R0, R1, and PTK material never mix
//! - Key names are one-way digests and safe to put on the wire
//! - Compromising one AP's PMK-R1 exposes neither PMK-R0 nor sibling R1 keys
//!
//! Hygiene:
//! - Secret key types zeroize their material on drop
//! - No secret key type implements `Debug` over its bytes
//! - MIC comparison is constant-time
//!
//! Integrity:
//! - Handshake frames carry an AES-128-CMAC over the exact transmitted
//!   element bytes, keyed by the KCK

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod hierarchy;
mod kdf;
mod keywrap;
mod mic;

pub use error::CryptoError;
pub use hierarchy::{
    PMK_R0_LEN, PMK_R1_LEN, PTK_CCMP_LEN, PTK_TKIP_LEN, PmkR0, PmkR1, Ptk, derive_pmk_r0,
    derive_pmk_r1, derive_pmk_r1_name, derive_ptk,
};
pub use kdf::{kdf_sha256, sha256};
pub use keywrap::{unwrap_key, wrap_key};
pub use mic::{FT_MIC_LEN, MicInput, compute_mic, verify_mic};
