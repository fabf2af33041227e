//! Environment abstraction for deterministic testing.
//!
//! Decouples the handshake engine from system randomness. Production uses
//! the OS entropy source; tests script the nonces so every derived key is
//! reproducible.

use rand::RngCore;

/// Abstract source of randomness for the engine.
///
/// # Invariants
///
/// - Production implementations MUST use cryptographically secure entropy;
///   the bytes become handshake nonces that feed key derivation
pub trait Environment: Send + Sync + 'static {
    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a 32-byte handshake nonce.
    fn random_nonce(&self) -> [u8; 32] {
        let mut nonce = [0u8; 32];
        self.random_bytes(&mut nonce);
        nonce
    }
}

/// Production environment backed by the operating system RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn random_bytes(&self, buffer: &mut [u8]) {
        rand::rngs::OsRng.fill_bytes(buffer);
    }
}
