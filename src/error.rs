//! Crate-wide error type.

/// Everything that can go wrong decoding a Mode S reply.
///
/// `FrameTooShort` is raised by the [`crate::bitreader::BitReader`]/
/// [`crate::frame`] boundary before any inner field is addressed.
/// `BadFormat` and `UnspecifiedFormat` are the two kinds described at the
/// protocol level: a malformed inner field vs. a reserved, undecodable
/// DF/first_field combination.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected at least {expected} bytes, got {actual}")]
    FrameTooShort { expected: usize, actual: usize },

    #[error("bad format: {reason}")]
    BadFormat { reason: &'static str },

    #[error("unspecified format: downlink_format={downlink_format} first_field={first_field}")]
    UnspecifiedFormat { downlink_format: u8, first_field: u8 },

    #[error("cpr decode failed: {reason}")]
    CprUnavailable { reason: &'static str },
}

impl DecodeError {
    pub(crate) fn bad_format(reason: &'static str) -> Self {
        Self::BadFormat { reason }
    }
}

impl From<crate::adsb::cpr::CprError> for DecodeError {
    fn from(error: crate::adsb::cpr::CprError) -> Self {
        let reason = match error {
            crate::adsb::cpr::CprError::DifferentLongitudeZones => {
                "messages are from different longitude zones"
            }
            crate::adsb::cpr::CprError::Unreasonable { .. } => {
                "decoded position is unreasonably far from the last trusted fix"
            }
        };
        Self::CprUnavailable { reason }
    }
}
