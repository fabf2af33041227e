//! 802.11 status codes used in FT action responses.

/// Wire status code carried in Response and Ack frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// Operation succeeded.
    Success,
    /// Unspecified failure.
    UnspecifiedFailure,
    /// Offered pairwise cipher is not valid here.
    InvalidPairwiseCipher,
    /// R0 key holder cannot be reached or has no key for this station.
    R0khUnreachable,
    /// Offered AKM suite is not valid here.
    InvalidAkmp,
    /// PMKID does not name a usable key.
    InvalidPmkid,
    /// Mobility domain element is absent or wrong.
    InvalidMdie,
    /// Fast transition element is absent or wrong.
    InvalidFtie,
    /// Any other status value.
    Other(u16),
}

impl StatusCode {
    /// Wire value.
    pub fn to_u16(self) -> u16 {
        match self {
            Self::Success => 0,
            Self::UnspecifiedFailure => 1,
            Self::InvalidPairwiseCipher => 19,
            Self::R0khUnreachable => 28,
            Self::InvalidAkmp => 43,
            Self::InvalidPmkid => 53,
            Self::InvalidMdie => 54,
            Self::InvalidFtie => 55,
            Self::Other(value) => value,
        }
    }

    /// Decode a wire value.
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::Success,
            1 => Self::UnspecifiedFailure,
            19 => Self::InvalidPairwiseCipher,
            28 => Self::R0khUnreachable,
            43 => Self::InvalidAkmp,
            53 => Self::InvalidPmkid,
            54 => Self::InvalidMdie,
            55 => Self::InvalidFtie,
            other => Self::Other(other),
        }
    }

    /// True for the success code.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_round_trip() {
        for value in [0u16, 1, 19, 28, 43, 53, 54, 55] {
            let code = StatusCode::from_u16(value);
            assert_eq!(code.to_u16(), value);
            assert!(!matches!(code, StatusCode::Other(_)));
        }
    }

    #[test]
    fn unknown_codes_are_preserved() {
        assert_eq!(StatusCode::from_u16(77), StatusCode::Other(77));
        assert_eq!(StatusCode::Other(77).to_u16(), 77);
    }

    #[test]
    fn only_zero_is_success() {
        assert!(StatusCode::Success.is_success());
        assert!(!StatusCode::InvalidMdie.is_success());
        assert!(!StatusCode::Other(2).is_success());
    }
}
