//! Mode S frame parsing: the first, DF-independent layer.
//!
//! Mode S has two frame lengths: short (56 bits / 7 bytes) and long (112
//! bits / 14 bytes). This module establishes the length from the Downlink
//! Format (`DF`, the first 5 bits) and slices out each format's fields
//! without interpreting them; the [`crate::adsb`] module interprets the
//! Extended Squitter `ME` field.
//!
//! <https://mode-s.org/1090mhz/content/mode-s/1-basics.html>

use bytes::Buf;

use crate::{
    address::{CodeFormat, QualifiedAddress},
    error::DecodeError,
    gillham::{decode_gillham_ac13, decode_gillham_id13},
};

pub const LENGTH_SHORT: usize = 7;
pub const LENGTH_LONG: usize = 14;

fn get_bytes<B: Buf, const N: usize>(buffer: &mut B) -> [u8; N] {
    let mut data = [0u8; N];
    buffer.copy_to_slice(&mut data[..]);
    data
}

/// The downlink format: the first 5 bits of every Mode S reply (2 for DF24+).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DownlinkFormat {
    ShortAirAirSurveillance,
    SurveillanceAltitudeReply,
    SurveillanceIdentityReply,
    AllCallReply,
    LongAirAirSurveillance,
    ExtendedSquitter,
    ExtendedSquitterNonTransponder,
    MilitaryExtendedSquitter,
    CommBAltitudeReply,
    CommBIdentityReply,
    MilitaryUse,
    CommD,
    /// Unassigned downlink format. This crate still frames the reply (so a
    /// caller can see it exists and how long it was) but does not interpret
    /// any field beyond the DF itself.
    Reserved(u8),
}

impl DownlinkFormat {
    pub fn from_byte_0(byte_0: u8) -> Self {
        let bits_1_to_5 = byte_0 >> 3;
        match bits_1_to_5 {
            0 => Self::ShortAirAirSurveillance,
            4 => Self::SurveillanceAltitudeReply,
            5 => Self::SurveillanceIdentityReply,
            11 => Self::AllCallReply,
            16 => Self::LongAirAirSurveillance,
            17 => Self::ExtendedSquitter,
            18 => Self::ExtendedSquitterNonTransponder,
            19 => Self::MilitaryExtendedSquitter,
            20 => Self::CommBAltitudeReply,
            21 => Self::CommBIdentityReply,
            22 => Self::MilitaryUse,
            24..=31 => Self::CommD,
            other => Self::Reserved(other),
        }
    }

    pub fn frame_length(&self) -> usize {
        match self {
            Self::ShortAirAirSurveillance
            | Self::SurveillanceAltitudeReply
            | Self::SurveillanceIdentityReply
            | Self::AllCallReply => LENGTH_SHORT,
            _ => LENGTH_LONG,
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Self::ShortAirAirSurveillance => 0,
            Self::SurveillanceAltitudeReply => 4,
            Self::SurveillanceIdentityReply => 5,
            Self::AllCallReply => 11,
            Self::LongAirAirSurveillance => 16,
            Self::ExtendedSquitter => 17,
            Self::ExtendedSquitterNonTransponder => 18,
            Self::MilitaryExtendedSquitter => 19,
            Self::CommBAltitudeReply => 20,
            Self::CommBIdentityReply => 21,
            Self::MilitaryUse => 22,
            Self::CommD => 24,
            Self::Reserved(value) => *value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Squawk(pub u16);

impl Squawk {
    pub fn decode(code: u16) -> Self {
        Self(decode_gillham_id13(code))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AltitudeCode13(pub u16);

impl AltitudeCode13 {
    pub fn feet(&self) -> Option<i32> {
        decode_gillham_ac13(self.0)
    }
}

/// The 3-bit transponder capability (CA) field carried by DF11's
/// `first_field`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capability(pub u8);

impl Capability {
    /// Level 1 transponder (surveillance only); cannot set CA=7.
    pub const LEVEL1: Self = Self(0b000);
    /// Level 2+ transponder, can set CA=7, on the ground.
    pub const LEVEL2_GROUND: Self = Self(0b100);
    /// Level 2+ transponder, can set CA=7, airborne.
    pub const LEVEL2_AIRBORNE: Self = Self(0b101);
    /// Level 2+ transponder, can set CA=7, ground or airborne.
    pub const LEVEL2_GROUND_OR_AIRBORNE: Self = Self(0b110);
    /// DR field nonzero, or FS field in 2..=5; ground or airborne.
    pub const DR_NONZERO_OR_FS_2_TO_5: Self = Self(0b111);
}

/// A decoded Mode S reply. Variants that carry a 56-bit `ME` field keep it
/// raw; [`crate::adsb::Message::decode`] interprets it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    ShortAirAirSurveillance { vertical_status: crate::adsb::VerticalStatus, altitude: AltitudeCode13 },
    SurveillanceAltitudeReply { altitude: AltitudeCode13 },
    SurveillanceIdentityReply { identity: Squawk },
    AllCallReply { address: [u8; 3], capability: Capability },
    LongAirAirSurveillance { vertical_status: crate::adsb::VerticalStatus, altitude: AltitudeCode13 },
    ExtendedSquitter { address: [u8; 3], me: [u8; 7] },
    ExtendedSquitterNonTransponder { code_format: CodeFormat, address: Option<[u8; 3]>, me: [u8; 7] },
    MilitaryExtendedSquitter { address: [u8; 3], me: [u8; 7] },
    CommBAltitudeReply { altitude: AltitudeCode13 },
    CommBIdentityReply { identity: Squawk },
    MilitaryUse { application_field: u8 },
    CommD,
    Reserved { downlink_format: u8 },
}

impl Frame {
    /// Parses one Mode S reply. `bytes` must already have any CRC/parity
    /// overlay stripped or otherwise validated by the caller; this crate does
    /// not check parity (see crate docs).
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::FrameTooShort { expected: 1, actual: 0 });
        }
        let downlink_format = DownlinkFormat::from_byte_0(bytes[0]);
        let expected = downlink_format.frame_length();
        // The only use of BitReader here: confirming the buffer actually
        // holds the full frame before any field inside it is addressed.
        crate::bitreader::BitReader::new(bytes).get_bytes(0, expected)?;

        let byte_0 = bytes[0];
        let bits_6_to_8 = byte_0 & 0b111;
        let mut buffer = &bytes[1..expected];

        let frame = match downlink_format {
            DownlinkFormat::ShortAirAirSurveillance => Self::ShortAirAirSurveillance {
                vertical_status: vertical_status_from_bit(bits_6_to_8 & 0b100 != 0),
                altitude: decode_frame_aligned_ac13(&mut buffer),
            },
            DownlinkFormat::SurveillanceAltitudeReply => {
                Self::SurveillanceAltitudeReply { altitude: decode_frame_aligned_ac13(&mut buffer) }
            }
            DownlinkFormat::SurveillanceIdentityReply => {
                let code = decode_frame_aligned_ac13_raw(&mut buffer);
                Self::SurveillanceIdentityReply { identity: Squawk::decode(code) }
            }
            DownlinkFormat::AllCallReply => {
                Self::AllCallReply { address: get_bytes(&mut buffer), capability: Capability(bits_6_to_8) }
            }
            DownlinkFormat::LongAirAirSurveillance => Self::LongAirAirSurveillance {
                vertical_status: vertical_status_from_bit(bits_6_to_8 & 0b100 != 0),
                altitude: decode_frame_aligned_ac13(&mut buffer),
            },
            DownlinkFormat::ExtendedSquitter => Self::ExtendedSquitter {
                address: get_bytes(&mut buffer),
                me: get_bytes(&mut buffer),
            },
            DownlinkFormat::ExtendedSquitterNonTransponder => {
                let code_format = CodeFormat(bits_6_to_8);
                // TIS-B-and-ADS-R management broadcasts carry no address
                // field at all; every other code format reuses the
                // address-announced slot.
                let address = (code_format.0 != CodeFormat::TISB_AND_ADSR_MANAGEMENT.0)
                    .then(|| get_bytes(&mut buffer));
                let me = if address.is_some() {
                    get_bytes(&mut buffer)
                } else {
                    let data: [u8; 10] = get_bytes(&mut buffer);
                    let mut me = [0u8; 7];
                    me.copy_from_slice(&data[..7]);
                    me
                };
                Self::ExtendedSquitterNonTransponder { code_format, address, me }
            }
            DownlinkFormat::MilitaryExtendedSquitter => {
                if bits_6_to_8 == 0 {
                    Self::MilitaryExtendedSquitter {
                        address: get_bytes(&mut buffer),
                        me: get_bytes(&mut buffer),
                    }
                } else {
                    Self::Reserved { downlink_format: downlink_format.as_u8() }
                }
            }
            DownlinkFormat::CommBAltitudeReply => {
                Self::CommBAltitudeReply { altitude: decode_frame_aligned_ac13(&mut buffer) }
            }
            DownlinkFormat::CommBIdentityReply => {
                let code = decode_frame_aligned_ac13_raw(&mut buffer);
                Self::CommBIdentityReply { identity: Squawk::decode(code) }
            }
            DownlinkFormat::MilitaryUse => Self::MilitaryUse { application_field: bits_6_to_8 },
            DownlinkFormat::CommD => Self::CommD,
            DownlinkFormat::Reserved(value) => Self::Reserved { downlink_format: value },
        };
        Ok(frame)
    }

    pub fn downlink_format(&self) -> u8 {
        match self {
            Self::ShortAirAirSurveillance { .. } => 0,
            Self::SurveillanceAltitudeReply { .. } => 4,
            Self::SurveillanceIdentityReply { .. } => 5,
            Self::AllCallReply { .. } => 11,
            Self::LongAirAirSurveillance { .. } => 16,
            Self::ExtendedSquitter { .. } => 17,
            Self::ExtendedSquitterNonTransponder { .. } => 18,
            Self::MilitaryExtendedSquitter { .. } => 19,
            Self::CommBAltitudeReply { .. } => 20,
            Self::CommBIdentityReply { .. } => 21,
            Self::MilitaryUse { .. } => 22,
            Self::CommD => 24,
            Self::Reserved { downlink_format } => *downlink_format,
        }
    }

    /// The qualified address and raw `ME` field, for replies that carry one.
    pub fn adsb_source(&self) -> Option<(QualifiedAddress, [u8; 7])> {
        match self {
            Self::ExtendedSquitter { address, me } => {
                Some((QualifiedAddress::icao24(*address), *me))
            }
            Self::ExtendedSquitterNonTransponder { code_format, address: Some(address), me } => {
                Some((QualifiedAddress::new(*address, code_format.address_qualifier()), *me))
            }
            Self::MilitaryExtendedSquitter { address, me } => {
                Some((QualifiedAddress::icao24(*address), *me))
            }
            _ => None,
        }
    }
}

fn vertical_status_from_bit(ground: bool) -> crate::adsb::VerticalStatus {
    if ground { crate::adsb::VerticalStatus::Ground } else { crate::adsb::VerticalStatus::Airborne }
}

fn decode_frame_aligned_ac13_raw(buffer: &mut &[u8]) -> u16 {
    let bytes: [u8; 2] = get_bytes(buffer);
    (u16::from(bytes[0] & 0b0001_1111) << 8) | u16::from(bytes[1])
}

fn decode_frame_aligned_ac13(buffer: &mut &[u8]) -> AltitudeCode13 {
    AltitudeCode13(decode_frame_aligned_ac13_raw(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_extended_squitter() {
        let bytes = hex_decode("8D4840D6202CC371C32CE0");
        let frame = Frame::decode(&bytes).unwrap();
        assert_eq!(frame.downlink_format(), 17);
        let (address, me) = frame.adsb_source().unwrap();
        assert_eq!(address.address, [0x48, 0x40, 0xD6]);
        assert_eq!(me[0] >> 3, 4);
    }

    #[test]
    fn rejects_short_buffer() {
        let bytes = [0x8Du8, 0x48];
        assert!(matches!(Frame::decode(&bytes), Err(DecodeError::FrameTooShort { .. })));
    }

    #[test]
    fn decodes_surveillance_identity_reply_squawk() {
        // DF5, identity code chosen so the Gillham unscramble is exercised.
        let bytes = hex_decode("280008a238c00000000000");
        let frame = Frame::decode(&bytes[..7]).unwrap();
        assert!(matches!(frame, Frame::SurveillanceIdentityReply { .. }));
    }

    #[test]
    fn all_call_reply_carries_address_and_capability() {
        // DF11 (byte 0 bits 1-5 = 11), CA = 0b101 (level 2+, airborne).
        let byte_0 = (11 << 3) | 0b101;
        let bytes = [byte_0, 0x48, 0x40, 0xD6, 0x00, 0x00, 0x00];
        let frame = Frame::decode(&bytes).unwrap();
        let Frame::AllCallReply { address, capability } = frame else {
            panic!("expected an all-call reply, got {:?}", frame);
        };
        assert_eq!(address, [0x48, 0x40, 0xD6]);
        assert_eq!(capability, Capability::LEVEL2_AIRBORNE);
    }

    fn hex_decode(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }
}
