//! Roamkey Fast BSS Transition Engine
//!
//! AP-side engine for the over-the-DS fast transition handshake: it caches
//! R1 key material, validates Request and Confirm frames, derives the
//! transient key, and builds the Response and Ack replies. Frames for other
//! APs cross the inter-AP boundary as opaque bytes.
//!
//! The engine is synchronous and owns no I/O. The surrounding system feeds
//! it frames and implements three small traits: the inter-AP transport, the
//! key install sink, and the disassociation notifier. Randomness comes from
//! an [`Environment`], so tests script every nonce and replay entire
//! handshakes deterministically.
//!
//! # Security
//!
//! - Validation chains are fail-fast with a distinct status per step and
//!   the MIC checked last, over the bytes exactly as received
//! - Key material never appears in logs; secret types zeroize on drop
//! - Cached keys expire via the maintenance tick, and each expiry triggers
//!   exactly one disassociation

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod engine;
mod env;
mod error;
mod session;
mod store;
mod transport;

pub use config::FtConfig;
pub use engine::{Disposition, FtEngine};
pub use env::{Environment, SystemEnv};
pub use error::{ConfigError, FtError, ValidationError};
pub use session::{HandshakeContext, HandshakeState};
pub use store::{R1KeyEntry, R1KeyStore};
pub use transport::{
    DisassocNotifier, InterApTransport, KeyInstallSink, RemoteRequest, RemoteRequestType,
};
