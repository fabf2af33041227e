//! Counter-mode KDF and hashing used by the FT key hierarchy.
//!
//! The KDF is the IEEE 802.11-2016 12.7.1.7.2 construction: HMAC-SHA-256 in
//! counter mode, with the iteration counter and the total output length in
//! bits both encoded little-endian.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Derive `out_len` bytes from `key` under `label` and `context`.
///
/// Each iteration MACs `i ‖ label ‖ context ‖ bits`, with `i` counting from 1
/// and both `i` and `bits` as 16-bit little-endian values.
///
/// Deterministic: same inputs always produce the same output.
pub fn kdf_sha256(key: &[u8], label: &[u8], context: &[u8], out_len: usize) -> Vec<u8> {
    let bits = (out_len as u16).wrapping_mul(8);
    let iterations = out_len.div_ceil(32);

    let mut out = Vec::with_capacity(iterations * 32);
    for i in 1..=iterations as u16 {
        let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
            unreachable!("HMAC-SHA256 accepts any key size");
        };
        mac.update(&i.to_le_bytes());
        mac.update(label);
        mac.update(context);
        mac.update(&bits.to_le_bytes());
        out.extend_from_slice(&mac.finalize().into_bytes());
    }

    out.truncate(out_len);
    out
}

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(data));
    digest
}
