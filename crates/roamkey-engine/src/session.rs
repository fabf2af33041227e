//! Per-station handshake context.
//!
//! A context is created when a Request validates and lives until the Ack
//! completes the handshake, a validation failure terminates it, or its
//! reassociation deadline lapses. No context means the station is idle;
//! a Confirm without a context is rejected, never queued.

use roamkey_crypto::Ptk;
use roamkey_proto::{MacAddr, SuiteSelector};

/// Handshake progress for one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Response sent; waiting for the station's Confirm.
    AwaitingConfirm,
    /// Ack sent and PTK installed.
    Authenticated,
    /// Rejected; the station must start over.
    Failed,
}

impl HandshakeState {
    /// Whether a Confirm frame is acceptable in this state.
    pub fn accepts_confirm(self) -> bool {
        matches!(self, Self::AwaitingConfirm)
    }
}

/// In-flight handshake for one station.
pub struct HandshakeContext {
    /// Current state.
    pub state: HandshakeState,
    /// Station address.
    pub sta_mac: MacAddr,
    /// Name of the PMK-R1 this handshake runs on.
    pub pmk_r1_name: [u8; 16],
    /// Nonce this AP chose in its Response.
    pub anonce: [u8; 32],
    /// Nonce the station sent in its Request.
    pub snonce: [u8; 32],
    /// Derived transient key.
    pub ptk: Ptk,
    /// Name of the derived PTK.
    pub ptk_name: [u8; 16],
    /// Pairwise cipher the PTK was derived for.
    pub pairwise_cipher: SuiteSelector,
    /// Ticks left for the station to confirm and reassociate.
    pub deadline: u32,
}

impl HandshakeContext {
    /// One maintenance tick; returns `true` when the context has expired.
    pub fn tick(&mut self) -> bool {
        self.deadline = self.deadline.saturating_sub(1);
        self.deadline == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_awaiting_confirm_accepts_a_confirm() {
        assert!(HandshakeState::AwaitingConfirm.accepts_confirm());
        assert!(!HandshakeState::Authenticated.accepts_confirm());
        assert!(!HandshakeState::Failed.accepts_confirm());
    }
}
