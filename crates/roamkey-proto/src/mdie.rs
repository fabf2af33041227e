//! Mobility Domain element (MDIE).
//!
//! Three-byte body: two-octet mobility domain identifier and one capability
//! octet. Advertised by every AP in the domain; a station echoes it back
//! verbatim, and a mismatch rejects the handshake before any key work.

use crate::errors::{ProtocolError, Result};
use crate::types::MobilityDomainId;

/// Element ID of the Mobility Domain element.
pub const EID_MDIE: u8 = 54;

/// FT-over-DS capability bit.
pub const CAP_FT_OVER_DS: u8 = 0x01;

/// Resource request protocol capability bit.
pub const CAP_RESOURCE_REQUEST: u8 = 0x02;

const BODY_LEN: usize = 3;

/// Parsed Mobility Domain element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MdIe {
    /// Mobility domain this AP belongs to.
    pub md_id: MobilityDomainId,
    /// FT capability and policy bits.
    pub ft_capabilities: u8,
}

impl MdIe {
    /// Construct from a domain identifier and capability bits.
    pub fn new(md_id: MobilityDomainId, ft_capabilities: u8) -> Self {
        Self { md_id, ft_capabilities }
    }

    /// Parse a full element (ID and length octets included).
    ///
    /// The body length must be exactly 3; anything else is a malformed MDIE.
    pub fn parse(ie: &[u8]) -> Result<Self> {
        if ie.len() < 2 {
            return Err(ProtocolError::Truncated { element: "MDIE", expected: 2, actual: ie.len() });
        }
        if ie[0] != EID_MDIE {
            return Err(ProtocolError::WrongElementId { expected: EID_MDIE, actual: ie[0] });
        }
        let len = ie[1] as usize;
        if len != BODY_LEN {
            return Err(ProtocolError::InvalidLength { element: "MDIE", length: len });
        }
        if ie.len() < 2 + BODY_LEN {
            return Err(ProtocolError::Truncated {
                element: "MDIE",
                expected: 2 + BODY_LEN,
                actual: ie.len(),
            });
        }
        Ok(Self {
            md_id: MobilityDomainId([ie[2], ie[3]]),
            ft_capabilities: ie[4],
        })
    }

    /// Append the full element to `out`.
    pub fn write_into(&self, out: &mut Vec<u8>) {
        out.push(EID_MDIE);
        out.push(BODY_LEN as u8);
        out.extend_from_slice(self.md_id.as_bytes());
        out.push(self.ft_capabilities);
    }

    /// True when the FT-over-DS bit is set.
    pub fn ft_over_ds(&self) -> bool {
        self.ft_capabilities & CAP_FT_OVER_DS != 0
    }

    /// True when the resource request protocol bit is set.
    pub fn resource_request(&self) -> bool {
        self.ft_capabilities & CAP_RESOURCE_REQUEST != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let mdie = MdIe::new(MobilityDomainId([0x36, 0x34]), CAP_FT_OVER_DS);
        let mut buf = Vec::new();
        mdie.write_into(&mut buf);
        assert_eq!(buf, [54, 3, 0x36, 0x34, 0x01]);
        assert_eq!(MdIe::parse(&buf).unwrap(), mdie);
    }

    #[test]
    fn reject_wrong_element_id() {
        assert_eq!(
            MdIe::parse(&[55, 3, 0, 0, 0]),
            Err(ProtocolError::WrongElementId { expected: 54, actual: 55 })
        );
    }

    #[test]
    fn reject_wrong_body_length() {
        assert_eq!(
            MdIe::parse(&[54, 2, 0, 0]),
            Err(ProtocolError::InvalidLength { element: "MDIE", length: 2 })
        );
        assert_eq!(
            MdIe::parse(&[54, 4, 0, 0, 0, 0]),
            Err(ProtocolError::InvalidLength { element: "MDIE", length: 4 })
        );
    }

    #[test]
    fn reject_truncated_body() {
        assert!(matches!(
            MdIe::parse(&[54, 3, 0x36]),
            Err(ProtocolError::Truncated { element: "MDIE", .. })
        ));
    }

    #[test]
    fn capability_bits() {
        let mdie = MdIe::new(MobilityDomainId([0, 0]), CAP_FT_OVER_DS | CAP_RESOURCE_REQUEST);
        assert!(mdie.ft_over_ds());
        assert!(mdie.resource_request());

        let bare = MdIe::new(MobilityDomainId([0, 0]), 0);
        assert!(!bare.ft_over_ds());
        assert!(!bare.resource_request());
    }
}
