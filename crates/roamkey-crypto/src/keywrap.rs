//! AES key wrap for group key delivery.
//!
//! NIST SP800-38F / RFC 3394 wrap under the KEK. The group key carried in
//! the final handshake frame is wrapped here; padding to the 8-byte
//! semiblock size is the wire codec's job, this module only enforces it.

use aes_kw::KekAes128;

use crate::error::CryptoError;

const SEMIBLOCK: usize = 8;

/// Wrap `plaintext` under the 16-byte KEK.
///
/// `plaintext` must be a multiple of 8 bytes and at least 16; the output is
/// 8 bytes longer than the input.
pub fn wrap_key(kek: &[u8; 16], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if plaintext.len() < 2 * SEMIBLOCK || plaintext.len() % SEMIBLOCK != 0 {
        return Err(CryptoError::UnalignedWrapInput(plaintext.len()));
    }

    let mut out = vec![0u8; plaintext.len() + SEMIBLOCK];
    KekAes128::from(*kek)
        .wrap(plaintext, &mut out)
        .map_err(|_| CryptoError::UnalignedWrapInput(plaintext.len()))?;
    Ok(out)
}

/// Unwrap `ciphertext` under the 16-byte KEK, verifying its integrity tag.
pub fn unwrap_key(kek: &[u8; 16], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() < 3 * SEMIBLOCK || ciphertext.len() % SEMIBLOCK != 0 {
        return Err(CryptoError::UnwrapIntegrity);
    }

    let mut out = vec![0u8; ciphertext.len() - SEMIBLOCK];
    KekAes128::from(*kek)
        .unwrap(ciphertext, &mut out)
        .map_err(|_| CryptoError::UnwrapIntegrity)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_unwrap_round_trip() {
        let kek = [0x0Fu8; 16];
        let key = [0xABu8; 16];
        let wrapped = wrap_key(&kek, &key).unwrap();
        assert_eq!(wrapped.len(), 24);
        let unwrapped = unwrap_key(&kek, &wrapped).unwrap();
        assert_eq!(unwrapped, key);
    }

    #[test]
    fn rfc3394_known_vector() {
        // RFC 3394 section 4.1: 128-bit KEK, 128-bit key data.
        let kek: [u8; 16] = hex::decode("000102030405060708090A0B0C0D0E0F")
            .unwrap()
            .try_into()
            .unwrap();
        let data = hex::decode("00112233445566778899AABBCCDDEEFF").unwrap();
        let expected =
            hex::decode("1FA68B0A8112B447AEF34BD8FB5A7B829D3E862371D2CFE5").unwrap();
        assert_eq!(wrap_key(&kek, &data).unwrap(), expected);
    }

    #[test]
    fn wrap_rejects_unaligned_input() {
        let kek = [0u8; 16];
        assert_eq!(wrap_key(&kek, &[1u8; 17]).unwrap_err(), CryptoError::UnalignedWrapInput(17));
        assert_eq!(wrap_key(&kek, &[1u8; 8]).unwrap_err(), CryptoError::UnalignedWrapInput(8));
    }

    #[test]
    fn unwrap_rejects_tampered_ciphertext() {
        let kek = [0x0Fu8; 16];
        let mut wrapped = wrap_key(&kek, &[0xABu8; 16]).unwrap();
        wrapped[3] ^= 0x80;
        assert_eq!(unwrap_key(&kek, &wrapped).unwrap_err(), CryptoError::UnwrapIntegrity);
    }

    #[test]
    fn unwrap_rejects_wrong_kek() {
        let wrapped = wrap_key(&[0x0Fu8; 16], &[0xABu8; 16]).unwrap();
        assert_eq!(unwrap_key(&[0x10u8; 16], &wrapped).unwrap_err(), CryptoError::UnwrapIntegrity);
    }

    #[test]
    fn unwrap_rejects_short_input() {
        assert_eq!(unwrap_key(&[0u8; 16], &[0u8; 16]).unwrap_err(), CryptoError::UnwrapIntegrity);
    }
}
