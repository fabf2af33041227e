//! FT key hierarchy: PMK-R0, PMK-R1, and PTK derivation with key names.
//!
//! Context layouts and labels follow IEEE 802.11-2016 12.7.1.7.3-12.7.1.7.5.
//! All derivations are pure; the same inputs always yield the same keys and
//! names. Key names are 128-bit digests and are not secret.
//!
//! # Security
//!
//! - `PmkR0`, `PmkR1`, and `Ptk` zeroize their material on drop
//! - Key names bind every identity in the derivation path, so a name match
//!   proves both peers used the same hierarchy inputs

use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::kdf::{kdf_sha256, sha256};

/// PMK-R0 key length in bytes.
pub const PMK_R0_LEN: usize = 32;

/// PMK-R1 key length in bytes.
pub const PMK_R1_LEN: usize = 32;

/// PTK length for a CCMP pairwise cipher (KCK ‖ KEK ‖ 16-byte TK).
pub const PTK_CCMP_LEN: usize = 48;

/// PTK length for a TKIP pairwise cipher (KCK ‖ KEK ‖ 32-byte TK).
pub const PTK_TKIP_LEN: usize = 64;

const R0_NAME_SALT_LEN: usize = 16;
const KCK_LEN: usize = 16;
const KEK_LEN: usize = 16;

/// Label for PMK-R0 derivation
const R0_LABEL: &[u8] = b"FT-R0";

/// Label for the PMK-R0 name digest
const R0_NAME_LABEL: &[u8] = b"FT-R0N";

/// Label for PMK-R1 derivation
const R1_LABEL: &[u8] = b"FT-R1";

/// Label for the PMK-R1 name digest
const R1_NAME_LABEL: &[u8] = b"FT-R1N";

/// Label for PTK derivation
const PTK_LABEL: &[u8] = b"FT-PTK";

/// Label for the PTK name digest
const PTK_NAME_LABEL: &[u8] = b"FT-PTKN";

/// Top-level FT master key, held only by the R0 key holder.
pub struct PmkR0 {
    key: [u8; PMK_R0_LEN],
}

impl PmkR0 {
    /// Raw key bytes.
    pub fn key(&self) -> &[u8; PMK_R0_LEN] {
        &self.key
    }
}

impl Drop for PmkR0 {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Second-level key bound to one R1 key holder.
#[derive(Clone)]
pub struct PmkR1 {
    key: [u8; PMK_R1_LEN],
}

impl PmkR1 {
    /// Construct from raw bytes, e.g. when received over the inter-AP
    /// channel from the R0 key holder.
    pub fn from_bytes(key: [u8; PMK_R1_LEN]) -> Self {
        Self { key }
    }

    /// Raw key bytes.
    pub fn key(&self) -> &[u8; PMK_R1_LEN] {
        &self.key
    }
}

impl Drop for PmkR1 {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Pairwise transient key: KCK ‖ KEK ‖ TK.
pub struct Ptk {
    key: Vec<u8>,
}

impl Ptk {
    /// Key confirmation key, MICs the handshake frames.
    pub fn kck(&self) -> &[u8; KCK_LEN] {
        let Ok(kck) = self.key[..KCK_LEN].try_into() else {
            unreachable!("PTK is always at least KCK_LEN + KEK_LEN bytes");
        };
        kck
    }

    /// Key encryption key, wraps the group key in the final handshake frame.
    pub fn kek(&self) -> &[u8; KEK_LEN] {
        let Ok(kek) = self.key[KCK_LEN..KCK_LEN + KEK_LEN].try_into() else {
            unreachable!("PTK is always at least KCK_LEN + KEK_LEN bytes");
        };
        kek
    }

    /// Temporal key handed to the cipher engine.
    pub fn tk(&self) -> &[u8] {
        &self.key[KCK_LEN + KEK_LEN..]
    }

    /// Full PTK length in bytes.
    pub fn len(&self) -> usize {
        self.key.len()
    }

    /// False; a derived PTK always has KCK and KEK material.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl Drop for Ptk {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Derive PMK-R0 and its name from the root key of the initial association.
///
/// Context is `len(ssid) ‖ ssid ‖ mdId ‖ len(r0khId) ‖ r0khId ‖ staMac`.
/// KDF-384 output splits into the 32-byte key and a 16-byte name salt;
/// `PMKR0Name = Truncate-128(SHA-256("FT-R0N" ‖ salt))`.
pub fn derive_pmk_r0(
    root_key: &[u8],
    ssid: &[u8],
    md_id: [u8; 2],
    r0kh_id: &[u8],
    sta_mac: [u8; 6],
) -> Result<(PmkR0, [u8; 16]), CryptoError> {
    if r0kh_id.is_empty() || r0kh_id.len() > 48 {
        return Err(CryptoError::InvalidR0khIdLength(r0kh_id.len()));
    }

    // Capacity: 1 + ssid + 2 + 1 + r0kh_id + 6
    let mut context = Vec::with_capacity(10 + ssid.len() + r0kh_id.len());
    context.push(ssid.len() as u8);
    context.extend_from_slice(ssid);
    context.extend_from_slice(&md_id);
    context.push(r0kh_id.len() as u8);
    context.extend_from_slice(r0kh_id);
    context.extend_from_slice(&sta_mac);

    let mut derived = kdf_sha256(root_key, R0_LABEL, &context, PMK_R0_LEN + R0_NAME_SALT_LEN);

    let mut key = [0u8; PMK_R0_LEN];
    key.copy_from_slice(&derived[..PMK_R0_LEN]);

    let mut name_input = Vec::with_capacity(R0_NAME_LABEL.len() + R0_NAME_SALT_LEN);
    name_input.extend_from_slice(R0_NAME_LABEL);
    name_input.extend_from_slice(&derived[PMK_R0_LEN..]);
    derived.zeroize();

    let name = truncate_128(&sha256(&name_input));
    Ok((PmkR0 { key }, name))
}

/// Derive the PMK-R1 name without the key material.
///
/// `PMKR1Name = Truncate-128(SHA-256("FT-R1N" ‖ pmkR0Name ‖ r1khId ‖
/// staMac))`. Pure; used by the validation path to locate a cached key from
/// a claimed PMK-R0 name.
pub fn derive_pmk_r1_name(pmk_r0_name: &[u8; 16], r1kh_id: &[u8; 6], sta_mac: &[u8; 6]) -> [u8; 16] {
    let mut input = Vec::with_capacity(R1_NAME_LABEL.len() + 16 + 6 + 6);
    input.extend_from_slice(R1_NAME_LABEL);
    input.extend_from_slice(pmk_r0_name);
    input.extend_from_slice(r1kh_id);
    input.extend_from_slice(sta_mac);
    truncate_128(&sha256(&input))
}

/// Derive PMK-R1 and its name for one R1 key holder.
pub fn derive_pmk_r1(
    pmk_r0: &PmkR0,
    pmk_r0_name: &[u8; 16],
    r1kh_id: &[u8; 6],
    sta_mac: &[u8; 6],
) -> (PmkR1, [u8; 16]) {
    let mut context = Vec::with_capacity(6 + 6);
    context.extend_from_slice(r1kh_id);
    context.extend_from_slice(sta_mac);

    let mut derived = kdf_sha256(pmk_r0.key(), R1_LABEL, &context, PMK_R1_LEN);
    let mut key = [0u8; PMK_R1_LEN];
    key.copy_from_slice(&derived);
    derived.zeroize();

    let name = derive_pmk_r1_name(pmk_r0_name, r1kh_id, sta_mac);
    (PmkR1 { key }, name)
}

/// Derive the PTK and its name for one association.
///
/// `key_len` is [`PTK_CCMP_LEN`] or [`PTK_TKIP_LEN`] depending on the
/// negotiated pairwise cipher. KDF context is `sNonce ‖ aNonce ‖ bssid ‖
/// staMac`; the name digests `pmkR1Name ‖ "FT-PTKN"` followed by the same
/// context.
pub fn derive_ptk(
    pmk_r1: &PmkR1,
    pmk_r1_name: &[u8; 16],
    anonce: &[u8; 32],
    snonce: &[u8; 32],
    bssid: &[u8; 6],
    sta_mac: &[u8; 6],
    key_len: usize,
) -> Result<(Ptk, [u8; 16]), CryptoError> {
    if key_len != PTK_CCMP_LEN && key_len != PTK_TKIP_LEN {
        return Err(CryptoError::InvalidPtkLength(key_len));
    }

    let mut context = Vec::with_capacity(32 + 32 + 6 + 6);
    context.extend_from_slice(snonce);
    context.extend_from_slice(anonce);
    context.extend_from_slice(bssid);
    context.extend_from_slice(sta_mac);

    let key = kdf_sha256(pmk_r1.key(), PTK_LABEL, &context, key_len);

    let mut name_input = Vec::with_capacity(16 + PTK_NAME_LABEL.len() + context.len());
    name_input.extend_from_slice(pmk_r1_name);
    name_input.extend_from_slice(PTK_NAME_LABEL);
    name_input.extend_from_slice(&context);
    let name = truncate_128(&sha256(&name_input));

    Ok((Ptk { key }, name))
}

fn truncate_128(digest: &[u8; 32]) -> [u8; 16] {
    let mut name = [0u8; 16];
    name.copy_from_slice(&digest[..16]);
    name
}
