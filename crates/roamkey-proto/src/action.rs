//! FT action frame codec.
//!
//! Over-the-DS handshake frames: category 6 (fast BSS transition), an action
//! octet, the station and target AP addresses, a status code on Response and
//! Ack, then the security elements. The raw bytes of each element are kept
//! alongside any parsed view because the frame MIC covers the bytes exactly
//! as transmitted; re-encoding a parsed element must never feed the MIC.

use bytes::Bytes;

use crate::errors::{ProtocolError, Result};
use crate::ftie::{EID_FTIE, FtIe};
use crate::mdie::{EID_MDIE, MdIe};
use crate::rsne::{EID_RSN, Rsne};
use crate::status::StatusCode;
use crate::types::MacAddr;

/// Action frame category for fast BSS transition.
pub const CATEGORY_FT: u8 = 6;

/// Element ID of the RIC data element that opens a resource request.
pub const EID_RIC_DATA: u8 = 57;

/// FT action frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtAction {
    /// Station opens a transition toward a target AP.
    Request,
    /// Target AP answers a request.
    Response,
    /// Station confirms with a MIC'd frame.
    Confirm,
    /// Target AP completes the handshake.
    Ack,
}

impl FtAction {
    /// Wire value.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Request => 1,
            Self::Response => 2,
            Self::Confirm => 3,
            Self::Ack => 4,
        }
    }

    /// Decode a wire value.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Request),
            2 => Ok(Self::Response),
            3 => Ok(Self::Confirm),
            4 => Ok(Self::Ack),
            other => Err(ProtocolError::UnknownAction(other)),
        }
    }

    /// True for the frames that carry a status code.
    pub fn carries_status(self) -> bool {
        matches!(self, Self::Response | Self::Ack)
    }
}

/// Security elements of one frame, raw bytes plus parse-on-demand views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FtElements {
    rsne: Option<Bytes>,
    mdie: Option<Bytes>,
    ftie: Option<Bytes>,
    ric: Bytes,
}

impl FtElements {
    /// Raw RSNE bytes, empty when absent.
    pub fn rsne_bytes(&self) -> &[u8] {
        self.rsne.as_deref().unwrap_or(&[])
    }

    /// Raw MDIE bytes, empty when absent.
    pub fn mdie_bytes(&self) -> &[u8] {
        self.mdie.as_deref().unwrap_or(&[])
    }

    /// Raw FTIE bytes, empty when absent.
    pub fn ftie_bytes(&self) -> &[u8] {
        self.ftie.as_deref().unwrap_or(&[])
    }

    /// Raw resource request bytes, empty when absent.
    pub fn ric_bytes(&self) -> &[u8] {
        &self.ric
    }

    /// Parsed MDIE; `None` when the frame has none.
    pub fn mdie(&self) -> Result<Option<MdIe>> {
        self.mdie.as_ref().map(|ie| MdIe::parse(ie)).transpose()
    }

    /// Parsed FTIE; `None` when the frame has none.
    pub fn ftie(&self) -> Result<Option<FtIe>> {
        self.ftie.as_ref().map(|ie| FtIe::parse(ie)).transpose()
    }

    /// Parsed RSNE; `None` when the frame has none.
    pub fn rsne(&self) -> Result<Option<Rsne>> {
        self.rsne.as_ref().map(|ie| Rsne::parse(ie)).transpose()
    }

    /// True when the frame carries no RSNE (an open-security transition).
    pub fn is_open(&self) -> bool {
        self.rsne.is_none()
    }

    /// Serialize and attach an MDIE.
    pub fn set_mdie(&mut self, mdie: &MdIe) {
        let mut buf = Vec::new();
        mdie.write_into(&mut buf);
        self.mdie = Some(Bytes::from(buf));
    }

    /// Serialize and attach an FTIE.
    pub fn set_ftie(&mut self, ftie: &FtIe) -> Result<()> {
        let mut buf = Vec::new();
        ftie.write_into(&mut buf)?;
        self.ftie = Some(Bytes::from(buf));
        Ok(())
    }

    /// Replace the raw FTIE bytes, e.g. after patching in a computed MIC.
    pub fn set_ftie_bytes(&mut self, bytes: Vec<u8>) {
        self.ftie = Some(Bytes::from(bytes));
    }

    /// Serialize and attach an RSNE.
    pub fn set_rsne(&mut self, rsne: &Rsne) -> Result<()> {
        let mut buf = Vec::new();
        rsne.write_into(&mut buf)?;
        self.rsne = Some(Bytes::from(buf));
        Ok(())
    }

    /// Attach raw resource request bytes.
    pub fn set_ric_bytes(&mut self, bytes: Vec<u8>) {
        self.ric = Bytes::from(bytes);
    }

    fn scan(buf: &[u8]) -> Result<Self> {
        let mut elements = Self::default();
        let mut rest = buf;
        while !rest.is_empty() {
            if rest.len() < 2 {
                return Err(ProtocolError::Truncated {
                    element: "action frame element",
                    expected: 2,
                    actual: rest.len(),
                });
            }
            let eid = rest[0];
            let len = rest[1] as usize;
            if rest.len() < 2 + len {
                return Err(ProtocolError::Truncated {
                    element: "action frame element",
                    expected: 2 + len,
                    actual: rest.len(),
                });
            }

            if eid == EID_RIC_DATA {
                // Resource request: everything from here on, carried opaquely
                elements.ric = Bytes::copy_from_slice(rest);
                break;
            }

            let ie = Bytes::copy_from_slice(&rest[..2 + len]);
            match eid {
                EID_RSN => elements.rsne = Some(ie),
                EID_MDIE => elements.mdie = Some(ie),
                EID_FTIE => elements.ftie = Some(ie),
                _ => {},
            }
            rest = &rest[2 + len..];
        }
        Ok(elements)
    }

    fn write_into(&self, out: &mut Vec<u8>) {
        // On-air order: RSNE, MDIE, FTIE, then any resource request
        if let Some(rsne) = &self.rsne {
            out.extend_from_slice(rsne);
        }
        if let Some(mdie) = &self.mdie {
            out.extend_from_slice(mdie);
        }
        if let Some(ftie) = &self.ftie {
            out.extend_from_slice(ftie);
        }
        out.extend_from_slice(&self.ric);
    }
}

/// One FT action frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtActionFrame {
    /// Frame type.
    pub action: FtAction,
    /// Non-AP station address.
    pub sta_mac: MacAddr,
    /// AP the station wants to transition to.
    pub target_ap: MacAddr,
    /// Status code; present exactly on Response and Ack.
    pub status: Option<StatusCode>,
    /// Security elements.
    pub elements: FtElements,
}

impl FtActionFrame {
    /// Fixed header length before the elements: category, action, two
    /// addresses.
    const FIXED_LEN: usize = 1 + 1 + 6 + 6;

    /// Parse a frame body starting at the category octet.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::FIXED_LEN {
            return Err(ProtocolError::Truncated {
                element: "FT action frame",
                expected: Self::FIXED_LEN,
                actual: buf.len(),
            });
        }
        if buf[0] != CATEGORY_FT {
            return Err(ProtocolError::WrongCategory(buf[0]));
        }
        let action = FtAction::from_u8(buf[1])?;

        let mut sta = [0u8; 6];
        sta.copy_from_slice(&buf[2..8]);
        let mut target = [0u8; 6];
        target.copy_from_slice(&buf[8..14]);

        let mut rest = &buf[Self::FIXED_LEN..];
        let status = if action.carries_status() {
            if rest.len() < 2 {
                return Err(ProtocolError::Truncated {
                    element: "FT action frame status",
                    expected: 2,
                    actual: rest.len(),
                });
            }
            let code = StatusCode::from_u16(u16::from_le_bytes([rest[0], rest[1]]));
            rest = &rest[2..];
            Some(code)
        } else {
            None
        };

        Ok(Self {
            action,
            sta_mac: MacAddr(sta),
            target_ap: MacAddr(target),
            status,
            elements: FtElements::scan(rest)?,
        })
    }

    /// Serialize the frame body starting at the category octet.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::FIXED_LEN + 2 + 128);
        out.push(CATEGORY_FT);
        out.push(self.action.to_u8());
        out.extend_from_slice(self.sta_mac.as_bytes());
        out.extend_from_slice(self.target_ap.as_bytes());
        if self.action.carries_status() {
            let status = self.status.unwrap_or(StatusCode::Success);
            out.extend_from_slice(&status.to_u16().to_le_bytes());
        }
        self.elements.write_into(&mut out);
        out
    }
}
