//! Mode S / ADS-B 1090 MHz downlink message decoder.
//!
//! Two layers:
//!
//! - [`frame`] and [`adsb`] are stateless: a byte slice in, a typed shape
//!   out, no memory between calls.
//! - [`state::StatefulDecoder`] correlates replies by sender across calls —
//!   CPR pairing, ADS-B version tracking, NIC supplement bits, stashed
//!   callsign/geo-minus-baro — and is what most callers want.
//!
//! This crate does not validate Mode S CRC/parity; callers are expected to
//! hand it already-validated frames (see a receiver front end such as a
//! Beast-format or raw-IQ demodulator).

pub mod address;
pub mod adsb;
pub mod bitreader;
pub mod error;
pub mod frame;
pub mod gillham;
pub mod state;
pub mod variant;

pub use address::{AddressQualifier, QualifiedAddress};
pub use adsb::cpr::Position;
pub use error::DecodeError;
pub use state::{DecodedReply, EvictionPolicy, Fix, PositionAltitudeType, StatefulDecoder};
pub use variant::Variant;

/// Accepts either raw Mode S bytes or an even-length hex string (case
/// insensitive, as produced by most SDR/Beast front ends) and returns the
/// raw bytes `Frame::decode`/`StatefulDecoder::decode` expect.
///
/// This is a convenience used by [`StatefulDecoder::decode_hex`]; most
/// callers feeding already-framed bytes from a receiver should call
/// [`StatefulDecoder::decode`] directly.
pub fn decode_hex_frame(hex_frame: &str) -> Result<Vec<u8>, DecodeError> {
    hex::decode(hex_frame.trim()).map_err(|_| DecodeError::BadFormat { reason: "invalid hex frame" })
}

impl StatefulDecoder {
    /// Convenience wrapper around [`StatefulDecoder::decode`] for hex-encoded
    /// input.
    pub fn decode_hex(&mut self, hex_frame: &str, now_ms: u64) -> Result<DecodedReply, DecodeError> {
        let bytes = decode_hex_frame(hex_frame)?;
        self.decode(&bytes, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_hex_frame_accepts_mixed_case() {
        let bytes = decode_hex_frame("8D4840D6202CC371C32CE0").unwrap();
        assert_eq!(bytes.len(), 11);
        let lower = decode_hex_frame("8d4840d6202cc371c32ce0").unwrap();
        assert_eq!(bytes, lower);
    }

    #[test]
    fn decode_hex_frame_rejects_garbage() {
        assert!(decode_hex_frame("not hex").is_err());
    }

    #[test]
    fn decode_hex_roundtrips_through_stateful_decoder() {
        let mut decoder = StatefulDecoder::new();
        let reply = decoder.decode_hex("8D4840D6202CC371C32CE0", 0).unwrap();
        assert!(!reply.variant.is_position());
    }
}
