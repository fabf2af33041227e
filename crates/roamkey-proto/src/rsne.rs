//! RSN element (RSNE) parsing and construction.
//!
//! Only the fields the FT handshake inspects are modeled: suite lists, the
//! capability field, and the PMKID list that carries key names during a
//! transition. Trailing fields are optional on the wire; parsing stops
//! cleanly at a field boundary and rejects a field cut off mid-way.

use crate::errors::{ProtocolError, Result};

/// Element ID of the RSN element.
pub const EID_RSN: u8 = 48;

/// Four-octet cipher or AKM suite selector.
pub type SuiteSelector = [u8; 4];

/// AKM suite: FT over IEEE 802.1X.
pub const AKM_FT_8021X: SuiteSelector = [0x00, 0x0F, 0xAC, 3];

/// AKM suite: FT over PSK.
pub const AKM_FT_PSK: SuiteSelector = [0x00, 0x0F, 0xAC, 4];

/// Pairwise cipher: TKIP.
pub const CIPHER_TKIP: SuiteSelector = [0x00, 0x0F, 0xAC, 2];

/// Pairwise cipher: CCMP-128.
pub const CIPHER_CCMP: SuiteSelector = [0x00, 0x0F, 0xAC, 4];

const RSN_VERSION: u16 = 1;

/// Parsed RSN element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rsne {
    /// RSN version, 1 on every deployed network.
    pub version: u16,
    /// Group data cipher suite.
    pub group_cipher: Option<SuiteSelector>,
    /// Pairwise cipher suites offered or selected.
    pub pairwise_ciphers: Vec<SuiteSelector>,
    /// AKM suites offered or selected.
    pub akm_suites: Vec<SuiteSelector>,
    /// RSN capabilities field.
    pub capabilities: Option<u16>,
    /// PMKID list; carries key names during a fast transition.
    pub pmkids: Vec<[u8; 16]>,
}

impl Default for Rsne {
    fn default() -> Self {
        Self {
            version: RSN_VERSION,
            group_cipher: None,
            pairwise_ciphers: Vec::new(),
            akm_suites: Vec::new(),
            capabilities: None,
            pmkids: Vec::new(),
        }
    }
}

struct FieldReader<'a> {
    buf: &'a [u8],
}

impl<'a> FieldReader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.buf.len() < n {
            return Err(ProtocolError::Truncated {
                element: "RSNE",
                expected: n,
                actual: self.buf.len(),
            });
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn u16_le(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Rsne {
    /// Parse a full element (ID and length octets included).
    pub fn parse(ie: &[u8]) -> Result<Self> {
        if ie.len() < 2 {
            return Err(ProtocolError::Truncated { element: "RSNE", expected: 2, actual: ie.len() });
        }
        if ie[0] != EID_RSN {
            return Err(ProtocolError::WrongElementId { expected: EID_RSN, actual: ie[0] });
        }
        let len = ie[1] as usize;
        if ie.len() < 2 + len {
            return Err(ProtocolError::Truncated {
                element: "RSNE",
                expected: 2 + len,
                actual: ie.len(),
            });
        }

        let mut reader = FieldReader { buf: &ie[2..2 + len] };
        let mut rsne = Self { version: reader.u16_le()?, ..Self::default() };

        // Every field after the version is optional; absence ends the parse.
        if reader.is_empty() {
            return Ok(rsne);
        }
        rsne.group_cipher = Some(Self::read_suite(&mut reader)?);

        if reader.is_empty() {
            return Ok(rsne);
        }
        rsne.pairwise_ciphers = Self::read_suite_list(&mut reader)?;

        if reader.is_empty() {
            return Ok(rsne);
        }
        rsne.akm_suites = Self::read_suite_list(&mut reader)?;

        if reader.is_empty() {
            return Ok(rsne);
        }
        rsne.capabilities = Some(reader.u16_le()?);

        if reader.is_empty() {
            return Ok(rsne);
        }
        let pmkid_count = reader.u16_le()? as usize;
        for _ in 0..pmkid_count {
            let bytes = reader.take(16)?;
            let Ok(pmkid) = <[u8; 16]>::try_from(bytes) else {
                unreachable!("take(16) yields exactly 16 bytes");
            };
            rsne.pmkids.push(pmkid);
        }

        Ok(rsne)
    }

    fn read_suite(reader: &mut FieldReader<'_>) -> Result<SuiteSelector> {
        let bytes = reader.take(4)?;
        let Ok(suite) = SuiteSelector::try_from(bytes) else {
            unreachable!("take(4) yields exactly 4 bytes");
        };
        Ok(suite)
    }

    fn read_suite_list(reader: &mut FieldReader<'_>) -> Result<Vec<SuiteSelector>> {
        let count = reader.u16_le()? as usize;
        // Each suite is 4 bytes; an absurd count is caught by the take below
        let mut suites = Vec::with_capacity(count.min(16));
        for _ in 0..count {
            suites.push(Self::read_suite(reader)?);
        }
        Ok(suites)
    }

    /// Append the full element to `out`.
    pub fn write_into(&self, out: &mut Vec<u8>) -> Result<()> {
        let mut body = Vec::with_capacity(64);
        body.extend_from_slice(&self.version.to_le_bytes());

        let trailing =
            self.capabilities.is_some() || !self.pmkids.is_empty();
        if self.group_cipher.is_some()
            || !self.pairwise_ciphers.is_empty()
            || !self.akm_suites.is_empty()
            || trailing
        {
            // Positional fields: everything before the last present field
            // must be emitted, defaults filling the gaps.
            body.extend_from_slice(&self.group_cipher.unwrap_or(CIPHER_CCMP));
            Self::write_suite_list(&mut body, &self.pairwise_ciphers);
            Self::write_suite_list(&mut body, &self.akm_suites);
            if trailing {
                body.extend_from_slice(&self.capabilities.unwrap_or(0).to_le_bytes());
            }
            if !self.pmkids.is_empty() {
                body.extend_from_slice(&(self.pmkids.len() as u16).to_le_bytes());
                for pmkid in &self.pmkids {
                    body.extend_from_slice(pmkid);
                }
            }
        }

        if body.len() > u8::MAX as usize {
            return Err(ProtocolError::ElementTooLarge(body.len()));
        }
        out.push(EID_RSN);
        out.push(body.len() as u8);
        out.extend_from_slice(&body);
        Ok(())
    }

    fn write_suite_list(body: &mut Vec<u8>, suites: &[SuiteSelector]) {
        body.extend_from_slice(&(suites.len() as u16).to_le_bytes());
        for suite in suites {
            body.extend_from_slice(suite);
        }
    }

    /// Copy of this element carrying exactly one PMKID.
    pub fn with_pmkid(&self, pmkid: [u8; 16]) -> Self {
        let mut rsne = self.clone();
        rsne.pmkids = vec![pmkid];
        if rsne.capabilities.is_none() {
            rsne.capabilities = Some(0);
        }
        rsne
    }

    /// First PMKID in the list, if any.
    pub fn pmkid(&self) -> Option<&[u8; 16]> {
        self.pmkids.first()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::proptest;

    use super::*;

    fn ft_psk_rsne() -> Rsne {
        Rsne {
            group_cipher: Some(CIPHER_CCMP),
            pairwise_ciphers: vec![CIPHER_CCMP],
            akm_suites: vec![AKM_FT_PSK],
            capabilities: Some(0),
            ..Rsne::default()
        }
    }

    #[test]
    fn round_trips_without_pmkid() {
        let rsne = ft_psk_rsne();
        let mut buf = Vec::new();
        rsne.write_into(&mut buf).unwrap();
        assert_eq!(Rsne::parse(&buf).unwrap(), rsne);
    }

    #[test]
    fn round_trips_with_pmkid() {
        let rsne = ft_psk_rsne().with_pmkid([0x3C; 16]);
        let mut buf = Vec::new();
        rsne.write_into(&mut buf).unwrap();
        let parsed = Rsne::parse(&buf).unwrap();
        assert_eq!(parsed.pmkid(), Some(&[0x3C; 16]));
        assert_eq!(parsed, rsne);
    }

    #[test]
    fn version_only_element_parses() {
        let parsed = Rsne::parse(&[EID_RSN, 2, 1, 0]).unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.group_cipher, None);
        assert!(parsed.akm_suites.is_empty());
    }

    #[test]
    fn reject_field_cut_mid_way() {
        // Group cipher truncated after two bytes
        assert!(matches!(
            Rsne::parse(&[EID_RSN, 4, 1, 0, 0x00, 0x0F]),
            Err(ProtocolError::Truncated { element: "RSNE", .. })
        ));
    }

    #[test]
    fn reject_suite_count_past_buffer() {
        // Pairwise count of 200 with no suite bytes
        let buf = [EID_RSN, 8, 1, 0, 0x00, 0x0F, 0xAC, 4, 200, 0];
        assert!(matches!(
            Rsne::parse(&buf),
            Err(ProtocolError::Truncated { element: "RSNE", .. })
        ));
    }

    #[test]
    fn reject_pmkid_count_past_buffer() {
        let mut buf = Vec::new();
        ft_psk_rsne().with_pmkid([1; 16]).write_into(&mut buf).unwrap();
        let len = buf.len();
        // Claim two PMKIDs but carry one
        let pmkid_count_offset = len - 18;
        buf[pmkid_count_offset] = 2;
        assert!(matches!(
            Rsne::parse(&buf),
            Err(ProtocolError::Truncated { element: "RSNE", .. })
        ));
    }

    #[test]
    fn wrong_element_id_is_rejected() {
        assert_eq!(
            Rsne::parse(&[54, 2, 1, 0]),
            Err(ProtocolError::WrongElementId { expected: EID_RSN, actual: 54 })
        );
    }

    proptest! {
        #[test]
        fn parse_never_panics_on_arbitrary_bytes(bytes in proptest::collection::vec(0u8..=255, 0..300)) {
            let _ = Rsne::parse(&bytes);
        }
    }
}
