//! AES-128-CMAC message integrity code for FT handshake frames.
//!
//! The MIC is keyed by the KCK and covers the two addresses, the handshake
//! sequence number, and the exact transmitted bytes of the security elements
//! with the FTIE's own MIC field zeroed. Callers supply the element bytes as
//! received or as serialized; this module never re-encodes them.

use aes::Aes128;
use cmac::{Cmac, Mac};
use subtle::ConstantTimeEq;

/// FT MIC length in bytes.
pub const FT_MIC_LEN: usize = 16;

/// The covered portion of one handshake frame.
///
/// Element slices carry the full IE bytes including the element ID and
/// length octets. `ftie` must already have its 16-byte MIC field zeroed;
/// `ric` is empty when the frame carries no resource request.
pub struct MicInput<'a> {
    /// Non-AP station address.
    pub sta_mac: [u8; 6],
    /// AP (BSSID) address.
    pub ap_mac: [u8; 6],
    /// Handshake sequence number (3 = confirm, 4 = ack, 5/6 = reassociation).
    pub seq: u8,
    /// RSN element bytes.
    pub rsne: &'a [u8],
    /// Mobility domain element bytes.
    pub mdie: &'a [u8],
    /// Fast transition element bytes with the MIC field zeroed.
    pub ftie: &'a [u8],
    /// Resource request bytes, possibly empty.
    pub ric: &'a [u8],
}

/// Compute the FT MIC over `input` keyed by the KCK.
pub fn compute_mic(kck: &[u8; 16], input: &MicInput<'_>) -> [u8; FT_MIC_LEN] {
    let Ok(mut mac) = Cmac::<Aes128>::new_from_slice(kck) else {
        unreachable!("AES-128-CMAC accepts a 16-byte key");
    };
    mac.update(&input.sta_mac);
    mac.update(&input.ap_mac);
    mac.update(&[input.seq]);
    mac.update(input.rsne);
    mac.update(input.mdie);
    mac.update(input.ftie);
    mac.update(input.ric);

    let mut mic = [0u8; FT_MIC_LEN];
    mic.copy_from_slice(&mac.finalize().into_bytes());
    mic
}

/// Constant-time comparison of a computed MIC against a received one.
pub fn verify_mic(expected: &[u8; FT_MIC_LEN], received: &[u8; FT_MIC_LEN]) -> bool {
    expected.ct_eq(received).into()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::proptest;

    use super::*;

    fn sample_input<'a>(rsne: &'a [u8], mdie: &'a [u8], ftie: &'a [u8]) -> MicInput<'a> {
        MicInput {
            sta_mac: [1, 2, 3, 4, 5, 6],
            ap_mac: [6, 5, 4, 3, 2, 1],
            seq: 3,
            rsne,
            mdie,
            ftie,
            ric: &[],
        }
    }

    #[test]
    fn mic_is_deterministic() {
        let kck = [0x42u8; 16];
        let input = sample_input(&[48, 2, 1, 0], &[54, 3, 0x36, 0x34, 1], &[55, 4, 0, 0, 0, 0]);
        assert_eq!(compute_mic(&kck, &input), compute_mic(&kck, &input));
    }

    #[test]
    fn sequence_number_changes_mic() {
        let kck = [0x42u8; 16];
        let mut input = sample_input(&[48, 2, 1, 0], &[54, 3, 0x36, 0x34, 1], &[55, 2, 0, 0]);
        let confirm = compute_mic(&kck, &input);
        input.seq = 4;
        let ack = compute_mic(&kck, &input);
        assert_ne!(confirm, ack, "confirm and ack MICs must differ");
    }

    #[test]
    fn kck_changes_mic() {
        let input = sample_input(&[48, 2, 1, 0], &[54, 3, 0x36, 0x34, 1], &[55, 2, 0, 0]);
        let a = compute_mic(&[0x11; 16], &input);
        let b = compute_mic(&[0x22; 16], &input);
        assert_ne!(a, b);
    }

    #[test]
    fn verify_accepts_equal_and_rejects_unequal() {
        let kck = [7u8; 16];
        let input = sample_input(&[48, 2, 1, 0], &[54, 3, 0x36, 0x34, 1], &[55, 2, 0, 0]);
        let mic = compute_mic(&kck, &input);
        let same = mic;
        assert!(verify_mic(&mic, &same));

        let mut tampered = mic;
        tampered[0] ^= 1;
        assert!(!verify_mic(&mic, &tampered));
    }

    proptest! {
        #[test]
        fn any_single_bit_flip_in_elements_is_detected(
            bit in 0usize..(13 * 8),
        ) {
            let kck = [0x42u8; 16];
            let rsne = [48u8, 2, 1, 0];
            let mdie = [54u8, 3, 0x36, 0x34, 1];
            let ftie = [55u8, 2, 0, 0];
            let baseline = compute_mic(&kck, &sample_input(&rsne, &mdie, &ftie));

            // Flip one bit across the concatenated element bytes
            let mut bytes: Vec<u8> = [rsne.as_slice(), mdie.as_slice(), ftie.as_slice()].concat();
            bytes[bit / 8] ^= 1 << (bit % 8);
            let (r, rest) = bytes.split_at(rsne.len());
            let (m, f) = rest.split_at(mdie.len());
            let mutated = compute_mic(&kck, &sample_input(r, m, f));

            assert_ne!(baseline, mutated, "bit {bit} flip must change the MIC");
        }
    }
}
