//! Fast BSS Transition element (FTIE).
//!
//! Fixed body: two-octet MIC control (the element count in the high octet),
//! 16-octet MIC, 32-octet ANonce, 32-octet SNonce. Optional parameters
//! follow as sub-elements: R1KH-ID (1), GTK (2), R0KH-ID (3).
//!
//! # Invariants
//!
//! - Serialization declares the element length up front and fails if the
//!   produced bytes disagree with it
//! - Parsing never reads past the declared element length

use crate::errors::{ProtocolError, Result};
use crate::gtk::GtkSubElement;
use crate::subelem::{SubElements, write_sub_element};

/// Element ID of the Fast BSS Transition element.
pub const EID_FTIE: u8 = 55;

/// Sub-element ID of the R1 key holder identity.
pub const SUB_R1KH_ID: u8 = 1;

/// Sub-element ID of the wrapped group key.
pub const SUB_GTK: u8 = 2;

/// Sub-element ID of the R0 key holder identity.
pub const SUB_R0KH_ID: u8 = 3;

/// Fixed body length before any sub-element.
const FIXED_LEN: usize = 2 + 16 + 32 + 32;

/// Offset of the MIC field from the start of the full element bytes.
const MIC_OFFSET: usize = 2 + 2;

/// Parsed Fast BSS Transition element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FtIe {
    /// Number of elements covered by the frame MIC.
    pub element_count: u8,
    /// Frame MIC; zero on frames sent before the PTK exists.
    pub mic: [u8; 16],
    /// AP-chosen nonce.
    pub anonce: [u8; 32],
    /// Station-chosen nonce.
    pub snonce: [u8; 32],
    /// R0 key holder identity, 1 to 48 bytes.
    pub r0kh_id: Option<Vec<u8>>,
    /// R1 key holder identity.
    pub r1kh_id: Option<[u8; 6]>,
    /// Wrapped group key, present only on the final frame.
    pub gtk: Option<GtkSubElement>,
}

impl FtIe {
    /// Parse a full element (ID and length octets included).
    ///
    /// Reads exactly the declared element length; unknown sub-elements are
    /// skipped, malformed ones reject the element.
    pub fn parse(ie: &[u8]) -> Result<Self> {
        if ie.len() < 2 {
            return Err(ProtocolError::Truncated { element: "FTIE", expected: 2, actual: ie.len() });
        }
        if ie[0] != EID_FTIE {
            return Err(ProtocolError::WrongElementId { expected: EID_FTIE, actual: ie[0] });
        }
        let len = ie[1] as usize;
        if len < FIXED_LEN {
            return Err(ProtocolError::InvalidLength { element: "FTIE", length: len });
        }
        if ie.len() < 2 + len {
            return Err(ProtocolError::Truncated {
                element: "FTIE",
                expected: 2 + len,
                actual: ie.len(),
            });
        }
        let body = &ie[2..2 + len];

        let mic_control = u16::from_le_bytes([body[0], body[1]]);
        let mut ftie = Self {
            element_count: (mic_control >> 8) as u8,
            ..Self::default()
        };
        ftie.mic.copy_from_slice(&body[2..18]);
        ftie.anonce.copy_from_slice(&body[18..50]);
        ftie.snonce.copy_from_slice(&body[50..82]);

        for item in SubElements::new(&body[FIXED_LEN..]) {
            let (id, value) = item?;
            match id {
                SUB_R1KH_ID => {
                    let Ok(r1kh) = <[u8; 6]>::try_from(value) else {
                        return Err(ProtocolError::InvalidLength {
                            element: "R1KH-ID sub-element",
                            length: value.len(),
                        });
                    };
                    ftie.r1kh_id = Some(r1kh);
                },
                SUB_GTK => ftie.gtk = Some(GtkSubElement::parse(value)?),
                SUB_R0KH_ID => {
                    if value.is_empty() || value.len() > 48 {
                        return Err(ProtocolError::InvalidLength {
                            element: "R0KH-ID sub-element",
                            length: value.len(),
                        });
                    }
                    ftie.r0kh_id = Some(value.to_vec());
                },
                _ => {},
            }
        }
        Ok(ftie)
    }

    /// Append the full element to `out`.
    ///
    /// The declared length is computed before serialization; a disagreement
    /// with the bytes actually produced is an error, not silent corruption.
    pub fn write_into(&self, out: &mut Vec<u8>) -> Result<()> {
        let declared = self.body_len();
        if declared > u8::MAX as usize {
            return Err(ProtocolError::ElementTooLarge(declared));
        }

        let mut body = Vec::with_capacity(declared);
        let mic_control = u16::from(self.element_count) << 8;
        body.extend_from_slice(&mic_control.to_le_bytes());
        body.extend_from_slice(&self.mic);
        body.extend_from_slice(&self.anonce);
        body.extend_from_slice(&self.snonce);
        if let Some(r1kh) = &self.r1kh_id {
            write_sub_element(&mut body, SUB_R1KH_ID, r1kh);
        }
        if let Some(gtk) = &self.gtk {
            write_sub_element(&mut body, SUB_GTK, &gtk.to_value());
        }
        if let Some(r0kh) = &self.r0kh_id {
            write_sub_element(&mut body, SUB_R0KH_ID, r0kh);
        }

        if body.len() != declared {
            return Err(ProtocolError::LengthMismatch {
                declared,
                serialized: body.len(),
            });
        }

        out.push(EID_FTIE);
        out.push(declared as u8);
        out.extend_from_slice(&body);
        Ok(())
    }

    fn body_len(&self) -> usize {
        let mut len = FIXED_LEN;
        if let Some(r1kh) = &self.r1kh_id {
            len += 2 + r1kh.len();
        }
        if let Some(gtk) = &self.gtk {
            len += 2 + gtk.to_value().len();
        }
        if let Some(r0kh) = &self.r0kh_id {
            len += 2 + r0kh.len();
        }
        len
    }
}

/// Copy a serialized FTIE with its MIC field zeroed.
///
/// The frame MIC covers the FTIE as transmitted except for its own MIC
/// field. The received buffer is never mutated.
pub fn mic_zeroed(ie: &[u8]) -> Result<Vec<u8>> {
    if ie.len() < 2 + FIXED_LEN {
        return Err(ProtocolError::Truncated {
            element: "FTIE",
            expected: 2 + FIXED_LEN,
            actual: ie.len(),
        });
    }
    if ie[0] != EID_FTIE {
        return Err(ProtocolError::WrongElementId { expected: EID_FTIE, actual: ie[0] });
    }
    let mut copy = ie.to_vec();
    copy[MIC_OFFSET..MIC_OFFSET + 16].fill(0);
    Ok(copy)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::proptest;

    use super::*;

    fn sample() -> FtIe {
        FtIe {
            element_count: 3,
            mic: [0xAB; 16],
            anonce: [0x11; 32],
            snonce: [0x22; 32],
            r0kh_id: Some(b"r0kh.example".to_vec()),
            r1kh_id: Some([1, 2, 3, 4, 5, 6]),
            gtk: None,
        }
    }

    #[test]
    fn round_trips_with_sub_elements() {
        let ftie = sample();
        let mut buf = Vec::new();
        ftie.write_into(&mut buf).unwrap();
        assert_eq!(buf[0], EID_FTIE);
        assert_eq!(buf[1] as usize, buf.len() - 2, "declared length must match body");
        assert_eq!(FtIe::parse(&buf).unwrap(), ftie);
    }

    #[test]
    fn round_trips_bare_fixed_body() {
        let ftie = FtIe { element_count: 0, ..FtIe::default() };
        let mut buf = Vec::new();
        ftie.write_into(&mut buf).unwrap();
        assert_eq!(buf.len(), 2 + FIXED_LEN);
        assert_eq!(FtIe::parse(&buf).unwrap(), ftie);
    }

    #[test]
    fn element_count_lives_in_the_high_octet() {
        let ftie = FtIe { element_count: 3, ..FtIe::default() };
        let mut buf = Vec::new();
        ftie.write_into(&mut buf).unwrap();
        // Little-endian MIC control: low octet first, count in the second
        assert_eq!(buf[2], 0);
        assert_eq!(buf[3], 3);
    }

    #[test]
    fn reject_short_body() {
        let mut buf = vec![EID_FTIE, 10];
        buf.extend_from_slice(&[0; 10]);
        assert_eq!(
            FtIe::parse(&buf),
            Err(ProtocolError::InvalidLength { element: "FTIE", length: 10 })
        );
    }

    #[test]
    fn reject_declared_length_past_buffer() {
        let mut buf = Vec::new();
        sample().write_into(&mut buf).unwrap();
        buf.truncate(buf.len() - 4);
        assert!(matches!(
            FtIe::parse(&buf),
            Err(ProtocolError::Truncated { element: "FTIE", .. })
        ));
    }

    #[test]
    fn reject_bad_r1kh_id_length() {
        let ftie = FtIe { element_count: 0, ..FtIe::default() };
        let mut buf = Vec::new();
        ftie.write_into(&mut buf).unwrap();
        // Append an R1KH-ID sub-element with 5 bytes instead of 6
        buf.extend_from_slice(&[SUB_R1KH_ID, 5, 1, 2, 3, 4, 5]);
        buf[1] += 7;
        assert!(matches!(
            FtIe::parse(&buf),
            Err(ProtocolError::InvalidLength { element: "R1KH-ID sub-element", .. })
        ));
    }

    #[test]
    fn unknown_sub_elements_are_skipped() {
        let ftie = FtIe { element_count: 0, r1kh_id: Some([9; 6]), ..FtIe::default() };
        let mut buf = Vec::new();
        ftie.write_into(&mut buf).unwrap();
        // Vendor sub-element between known ones is ignored
        buf.extend_from_slice(&[200, 2, 0xDE, 0xAD]);
        buf[1] += 4;
        let parsed = FtIe::parse(&buf).unwrap();
        assert_eq!(parsed.r1kh_id, Some([9; 6]));
    }

    #[test]
    fn gtk_sub_element_round_trips() {
        let ftie = FtIe {
            element_count: 3,
            gtk: Some(GtkSubElement::new(1, 16, [0; 8], vec![0xEE; 24])),
            ..FtIe::default()
        };
        let mut buf = Vec::new();
        ftie.write_into(&mut buf).unwrap();
        let parsed = FtIe::parse(&buf).unwrap();
        assert_eq!(parsed.gtk, ftie.gtk);
    }

    #[test]
    fn oversized_element_is_rejected() {
        let ftie = FtIe {
            r0kh_id: Some(vec![1; 48]),
            r1kh_id: Some([0; 6]),
            gtk: Some(GtkSubElement::new(0, 32, [0; 8], vec![0; 120])),
            ..FtIe::default()
        };
        assert!(matches!(
            ftie.write_into(&mut Vec::new()),
            Err(ProtocolError::ElementTooLarge(_))
        ));
    }

    #[test]
    fn mic_zeroed_clears_only_the_mic() {
        let ftie = sample();
        let mut buf = Vec::new();
        ftie.write_into(&mut buf).unwrap();
        let zeroed = mic_zeroed(&buf).unwrap();
        assert_eq!(zeroed.len(), buf.len());
        assert!(zeroed[MIC_OFFSET..MIC_OFFSET + 16].iter().all(|&b| b == 0));
        assert_eq!(zeroed[..MIC_OFFSET], buf[..MIC_OFFSET]);
        assert_eq!(zeroed[MIC_OFFSET + 16..], buf[MIC_OFFSET + 16..]);
        // Original untouched
        assert_eq!(buf[MIC_OFFSET], 0xAB);
    }

    proptest! {
        #[test]
        fn parse_never_panics_on_arbitrary_bytes(bytes in proptest::collection::vec(0u8..=255, 0..300)) {
            let _ = FtIe::parse(&bytes);
        }
    }
}
