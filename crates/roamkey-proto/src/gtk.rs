//! GTK sub-element carried in the final handshake frame.
//!
//! Layout: two-octet key info (key id in the low two bits, little-endian),
//! one-octet key length, eight-octet receive sequence counter, then the
//! AES-key-wrapped group key. The plaintext key is padded before wrapping;
//! [`pad_group_key`] produces the padded form and the declared key length
//! tells the receiver where the real key ends.

use crate::errors::{ProtocolError, Result};

/// Minimum plaintext length fed to the key wrap.
const MIN_WRAP_INPUT: usize = 16;

/// Padding marker appended after the key bytes.
const PAD_MARKER: u8 = 0xDD;

/// Fixed part of the sub-element body before the wrapped key.
const FIXED_LEN: usize = 2 + 1 + 8;

/// Parsed GTK sub-element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GtkSubElement {
    /// Key information field; bits 0..2 carry the key id.
    pub key_info: u16,
    /// Length of the real key inside the unwrapped, padded bytes.
    pub key_len: u8,
    /// Receive sequence counter for the group key.
    pub rsc: [u8; 8],
    /// AES-key-wrapped, padded group key.
    pub wrapped_key: Vec<u8>,
}

impl GtkSubElement {
    /// Construct from an already wrapped key.
    pub fn new(key_id: u8, key_len: u8, rsc: [u8; 8], wrapped_key: Vec<u8>) -> Self {
        Self { key_info: u16::from(key_id & 0x03), key_len, rsc, wrapped_key }
    }

    /// Group key identifier (0..=3).
    pub fn key_id(&self) -> u8 {
        (self.key_info & 0x03) as u8
    }

    /// Parse from a sub-element value.
    pub fn parse(value: &[u8]) -> Result<Self> {
        if value.len() < FIXED_LEN {
            return Err(ProtocolError::Truncated {
                element: "GTK sub-element",
                expected: FIXED_LEN,
                actual: value.len(),
            });
        }
        let key_info = u16::from_le_bytes([value[0], value[1]]);
        let key_len = value[2];
        let mut rsc = [0u8; 8];
        rsc.copy_from_slice(&value[3..11]);
        let wrapped_key = value[FIXED_LEN..].to_vec();
        if wrapped_key.is_empty() {
            return Err(ProtocolError::InvalidLength {
                element: "GTK sub-element",
                length: value.len(),
            });
        }
        Ok(Self { key_info, key_len, rsc, wrapped_key })
    }

    /// Serialize into a sub-element value.
    pub fn to_value(&self) -> Vec<u8> {
        let mut value = Vec::with_capacity(FIXED_LEN + self.wrapped_key.len());
        value.extend_from_slice(&self.key_info.to_le_bytes());
        value.push(self.key_len);
        value.extend_from_slice(&self.rsc);
        value.extend_from_slice(&self.wrapped_key);
        value
    }

    /// Recover the real key bytes from unwrapped, padded key material.
    ///
    /// Fails when the declared key length exceeds the unwrapped length.
    pub fn truncate_unwrapped(&self, unwrapped: &[u8]) -> Result<Vec<u8>> {
        let key_len = self.key_len as usize;
        if key_len > unwrapped.len() {
            return Err(ProtocolError::InvalidLength {
                element: "GTK sub-element",
                length: key_len,
            });
        }
        Ok(unwrapped[..key_len].to_vec())
    }
}

/// Pad a plaintext group key for wrapping.
///
/// A key that is not a multiple of 8 gets 0xDD and then zeros up to the
/// next semiblock boundary; anything still below 16 bytes is zero-extended
/// to the minimum without a marker. The declared key length disambiguates
/// on the receive side either way.
pub fn pad_group_key(key: &[u8]) -> Vec<u8> {
    let mut padded = key.to_vec();
    if padded.len() % 8 != 0 {
        padded.push(PAD_MARKER);
        while padded.len() % 8 != 0 {
            padded.push(0);
        }
    }
    if padded.len() < MIN_WRAP_INPUT {
        padded.resize(MIN_WRAP_INPUT, 0);
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_aligned_key_is_unchanged() {
        let key = [7u8; 16];
        assert_eq!(pad_group_key(&key), key);
        let long = [7u8; 32];
        assert_eq!(pad_group_key(&long), long);
    }

    #[test]
    fn pad_short_key_reaches_minimum() {
        let padded = pad_group_key(&[1, 2, 3, 4, 5]);
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[..5], &[1, 2, 3, 4, 5]);
        assert_eq!(padded[5], PAD_MARKER);
        assert!(padded[6..].iter().all(|&b| b == 0));
    }

    #[test]
    fn pad_aligned_short_key_uses_plain_zeros() {
        let padded = pad_group_key(&[4u8; 8]);
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[..8], &[4u8; 8]);
        assert!(padded[8..].iter().all(|&b| b == 0), "no marker when already a semiblock multiple");
    }

    #[test]
    fn pad_unaligned_long_key_rounds_up() {
        let padded = pad_group_key(&[9u8; 17]);
        assert_eq!(padded.len(), 24);
        assert_eq!(padded[17], PAD_MARKER);
    }

    #[test]
    fn value_round_trips() {
        let gtk = GtkSubElement::new(2, 16, [1, 0, 0, 0, 0, 0, 0, 0], vec![0xEE; 24]);
        let value = gtk.to_value();
        assert_eq!(GtkSubElement::parse(&value).unwrap(), gtk);
        assert_eq!(gtk.key_id(), 2);
    }

    #[test]
    fn reject_truncated_fixed_part() {
        assert!(matches!(
            GtkSubElement::parse(&[0u8; 10]),
            Err(ProtocolError::Truncated { element: "GTK sub-element", .. })
        ));
    }

    #[test]
    fn reject_missing_wrapped_key() {
        assert!(matches!(
            GtkSubElement::parse(&[0u8; FIXED_LEN]),
            Err(ProtocolError::InvalidLength { .. })
        ));
    }

    #[test]
    fn truncate_unwrapped_respects_declared_length() {
        let gtk = GtkSubElement::new(1, 16, [0; 8], vec![0; 24]);
        let unwrapped = pad_group_key(&[0x5Au8; 16]);
        assert_eq!(gtk.truncate_unwrapped(&unwrapped).unwrap(), vec![0x5A; 16]);

        let lying = GtkSubElement::new(1, 40, [0; 8], vec![0; 24]);
        assert!(lying.truncate_unwrapped(&unwrapped).is_err());
    }
}
