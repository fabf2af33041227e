//! BSS-level fast transition configuration.
//!
//! One [`FtConfig`] per BSS: the mobility domain, the key holder
//! identities, the security suites the network runs, and the group key
//! handed out at the end of a successful handshake. Validated once at
//! engine construction; the handshake paths rely on these invariants.

use roamkey_proto::{
    AKM_FT_8021X, AKM_FT_PSK, CIPHER_CCMP, MacAddr, MobilityDomainId, SuiteSelector,
};
use zeroize::Zeroize;

use crate::error::ConfigError;

/// Configuration of one FT-enabled BSS.
pub struct FtConfig {
    /// Fast transition enabled on this BSS.
    pub enabled: bool,
    /// Own BSSID; doubles as the R1 key holder identity.
    pub bssid: MacAddr,
    /// Network SSID, 1 to 32 bytes.
    pub ssid: Vec<u8>,
    /// Mobility domain identifier.
    pub md_id: MobilityDomainId,
    /// Advertise and accept FT over the distribution system.
    pub ft_over_ds: bool,
    /// Advertise the resource request protocol capability.
    pub resource_request: bool,
    /// R0 key holder identity, 1 to 48 bytes.
    pub r0kh_id: Vec<u8>,
    /// AKM suite this network runs; must be an FT suite.
    pub akm: SuiteSelector,
    /// Pairwise ciphers enabled on this BSS.
    pub pairwise_ciphers: Vec<SuiteSelector>,
    /// Group data cipher.
    pub group_cipher: SuiteSelector,
    /// Current group temporal key.
    pub group_key: Vec<u8>,
    /// Group key identifier, 0 to 3.
    pub group_key_id: u8,
    /// Receive sequence counter for the group key.
    pub group_rsc: [u8; 8],
    /// R1 key lifetime in maintenance ticks; caps every cached entry.
    pub key_lifetime_ticks: u32,
    /// Ticks a pending handshake may wait for its reassociation.
    pub reassoc_deadline_ticks: u32,
    /// Maximum number of cached R1 keys.
    pub store_capacity: usize,
}

impl FtConfig {
    /// Typical configuration for an FT-over-PSK BSS; fields are public, so
    /// callers adjust what differs and [`validate`](Self::validate) checks
    /// the result.
    pub fn new(bssid: MacAddr, ssid: &[u8], md_id: MobilityDomainId, r0kh_id: &[u8]) -> Self {
        Self {
            enabled: true,
            bssid,
            ssid: ssid.to_vec(),
            md_id,
            ft_over_ds: true,
            resource_request: false,
            r0kh_id: r0kh_id.to_vec(),
            akm: AKM_FT_PSK,
            pairwise_ciphers: vec![CIPHER_CCMP],
            group_cipher: CIPHER_CCMP,
            group_key: vec![0; 16],
            group_key_id: 1,
            group_rsc: [0; 8],
            key_lifetime_ticks: 3600,
            reassoc_deadline_ticks: 10,
            store_capacity: 64,
        }
    }

    /// Check every field constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() || self.ssid.len() > 32 {
            return Err(ConfigError::InvalidSsidLength(self.ssid.len()));
        }
        if self.r0kh_id.is_empty() || self.r0kh_id.len() > 48 {
            return Err(ConfigError::InvalidR0khIdLength(self.r0kh_id.len()));
        }
        if self.group_key.is_empty() || self.group_key.len() > 32 {
            return Err(ConfigError::InvalidGroupKeyLength(self.group_key.len()));
        }
        if self.group_key_id > 3 {
            return Err(ConfigError::InvalidGroupKeyId(self.group_key_id));
        }
        if self.akm != AKM_FT_PSK && self.akm != AKM_FT_8021X {
            return Err(ConfigError::NotAnFtAkm);
        }
        if self.pairwise_ciphers.is_empty() {
            return Err(ConfigError::NoPairwiseCipher);
        }
        if self.store_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    /// R1 key holder identity: the BSSID.
    pub fn r1kh_id(&self) -> &[u8; 6] {
        self.bssid.as_bytes()
    }

    /// Capability bits advertised in the MDIE.
    pub fn mdie_capabilities(&self) -> u8 {
        let mut caps = 0;
        if self.ft_over_ds {
            caps |= roamkey_proto::CAP_FT_OVER_DS;
        }
        if self.resource_request {
            caps |= roamkey_proto::CAP_RESOURCE_REQUEST;
        }
        caps
    }
}

impl Drop for FtConfig {
    fn drop(&mut self) {
        self.group_key.zeroize();
    }
}
