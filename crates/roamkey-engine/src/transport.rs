//! Collaborator traits at the engine boundary.
//!
//! The engine never touches the air interface, the driver's key tables, or
//! the inter-AP channel directly. It calls these traits; the surrounding
//! system decides what a remote-request frame or a key install actually
//! looks like. Payloads crossing the inter-AP boundary are carried as
//! opaque bytes and never inspected in transit.

use roamkey_crypto::Ptk;
use roamkey_proto::{MacAddr, SuiteSelector};

/// Direction of a remote-request frame between APs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteRequestType {
    /// Station-to-target traffic: Request or Confirm, wire value 0.
    Request,
    /// Target-to-station traffic: Response or Ack, wire value 1.
    Response,
}

impl RemoteRequestType {
    /// Wire value.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Request => 0,
            Self::Response => 1,
        }
    }
}

/// One frame relayed between APs over the distribution system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    /// Traffic direction.
    pub request_type: RemoteRequestType,
    /// Station the handshake belongs to.
    pub sta_mac: MacAddr,
    /// AP the handshake targets.
    pub target_ap: MacAddr,
    /// Complete FT action frame body, opaque to the relay.
    pub payload: Vec<u8>,
}

/// Inter-AP channel for remote-request frames.
pub trait InterApTransport: Send + Sync {
    /// Carry a frame to the AP named in `request.target_ap` (or back to the
    /// station's current AP for [`RemoteRequestType::Response`] traffic).
    fn send(&self, request: RemoteRequest) -> Result<(), String>;
}

/// Receives the PTK once a handshake completes.
pub trait KeyInstallSink: Send + Sync {
    /// Install the transient key for a station. Called exactly once per
    /// successful handshake.
    fn install_ptk(&self, sta_mac: MacAddr, ptk: &Ptk, pairwise_cipher: SuiteSelector);
}

/// Told when a cached key expires so the station can be disassociated.
pub trait DisassocNotifier: Send + Sync {
    /// A station's key material lapsed.
    fn notify(&self, sta_mac: MacAddr);
}
