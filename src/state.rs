//! Stateful, per-aircraft correlation on top of the stateless decoders in
//! [`crate::frame`] and [`crate::adsb`].
//!
//! A single Extended Squitter frame rarely carries a complete position: CPR
//! needs an even/odd pair, and a transponder's declared MOPS version changes
//! how later fields are interpreted. [`StatefulDecoder`] is the thing that
//! remembers this across calls, keyed by [`QualifiedAddress`], and is also
//! the dispatcher: it is what turns a stateless [`Frame`] into the
//! deepest [`Variant`] this crate knows how to produce.
//!
//! Grounded on the `Airplanes` map in the rsadsb lineage (prune-by-age,
//! per-key update-in-place), adapted to this crate's call-count/entry-count
//! eviction policy.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    address::QualifiedAddress,
    adsb::{
        cpr::{CprDecoder, Position as CprPosition},
        AdsbVersion, AircraftOperationalStatus, AltitudeType, Message, VerticalStatus,
    },
    error::DecodeError,
    frame::Frame,
    variant::{NicSnapshot, Variant},
};

/// Thresholds controlling when a tracked aircraft is forgotten.
///
/// An entry is evicted once it has not been touched for `max_age_ms`, *and*
/// a sweep is only run every `max_calls_since_cleanup` decode calls, *and*
/// only once the map holds more than `max_entries` aircraft — so a receiver
/// watching a handful of aircraft never pays a sweep it doesn't need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    pub max_calls_since_cleanup: u64,
    pub max_entries: usize,
    pub max_age_ms: u64,
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self { max_calls_since_cleanup: 1_000_000, max_entries: 30_000, max_age_ms: 3_600_000 }
    }
}

/// Everything remembered about one aircraft between calls.
#[derive(Debug, Clone)]
pub struct AircraftState {
    pub adsb_version: AdsbVersion,
    pub nic_suppl_a: bool,
    pub nic_suppl_c: Option<u8>,
    pub callsign: Option<[u8; 8]>,
    pub geo_minus_baro_feet: Option<i32>,
    pub last_used_ms: u64,
    cpr: CprDecoder,
}

impl AircraftState {
    fn new(now_ms: u64) -> Self {
        Self {
            adsb_version: AdsbVersion::V0,
            nic_suppl_a: false,
            nic_suppl_c: None,
            callsign: None,
            geo_minus_baro_feet: None,
            last_used_ms: now_ms,
            cpr: CprDecoder::new(),
        }
    }

    fn nic_airborne(&self) -> NicSnapshot {
        NicSnapshot {
            version: self.adsb_version,
            nic_suppl_a: self.adsb_version != AdsbVersion::V0 && self.nic_suppl_a,
            nic_suppl_c: None,
        }
    }

    fn nic_surface(&self) -> NicSnapshot {
        NicSnapshot {
            version: self.adsb_version,
            nic_suppl_a: self.adsb_version != AdsbVersion::V0 && self.nic_suppl_a,
            nic_suppl_c: if self.adsb_version == AdsbVersion::V0 { None } else { self.nic_suppl_c },
        }
    }
}

/// A decoded reply, correlated against the sender's prior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedReply {
    /// `None` for replies that carry no ADS-B address (non-ADS-B DFs, and
    /// DF18 TIS-B/ADS-R management broadcasts, which have no address field
    /// at all — see [`Frame::adsb_source`]).
    pub address: Option<QualifiedAddress>,
    pub variant: Variant,
}

/// A fully assembled geographic fix: CPR-decoded latitude/longitude plus the
/// altitude carried by the source position variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_feet: i32,
    pub altitude_type: PositionAltitudeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionAltitudeType {
    Barometric,
    AboveEllipsoid,
    AboveGroundLevel,
}

/// The stateful correlator: a map of [`QualifiedAddress`] to
/// [`AircraftState`], plus the bookkeeping needed to run
/// [`EvictionPolicy`].
pub struct StatefulDecoder {
    aircraft: BTreeMap<QualifiedAddress, AircraftState>,
    policy: EvictionPolicy,
    calls_since_cleanup: u64,
    latest_timestamp_ms: u64,
    reasonableness_threshold_nm: Option<f64>,
}

impl StatefulDecoder {
    pub fn new() -> Self {
        Self::with_policy(EvictionPolicy::default())
    }

    pub fn with_policy(policy: EvictionPolicy) -> Self {
        Self {
            aircraft: BTreeMap::new(),
            policy,
            calls_since_cleanup: 0,
            latest_timestamp_ms: 0,
            reasonableness_threshold_nm: Some(crate::adsb::cpr::DEFAULT_REASONABLENESS_THRESHOLD_NM),
        }
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }

    pub fn get(&self, address: &QualifiedAddress) -> Option<&AircraftState> {
        self.aircraft.get(address)
    }

    /// Decode one already-CRC-validated Mode S reply, at `now_ms`
    /// (milliseconds, any monotonic epoch the caller likes, consistent
    /// across calls). This is the dispatcher: it turns the
    /// stateless [`Frame`]/[`Message`] shapes into the deepest [`Variant`]
    /// this crate can produce for the sender's current state, and updates
    /// that state (version, NIC supplements, stashed geo-minus-baro, CPR
    /// pairing cell) before returning.
    pub fn decode(&mut self, bytes: &[u8], now_ms: u64) -> Result<DecodedReply, DecodeError> {
        let frame = Frame::decode(bytes)?;
        self.latest_timestamp_ms = self.latest_timestamp_ms.max(now_ms);
        self.calls_since_cleanup += 1;
        if self.calls_since_cleanup >= self.policy.max_calls_since_cleanup {
            self.clear_stale(now_ms);
        }

        let Some((address, me)) = frame.adsb_source() else {
            return Ok(DecodedReply { address: None, variant: Variant::Envelope(frame) });
        };

        let state = self.aircraft.entry(address).or_insert_with(|| AircraftState::new(now_ms));
        state.last_used_ms = now_ms;

        let mut buffer: &[u8] = &me;
        let message = Message::decode(&mut buffer, state.adsb_version)?;

        match &message {
            Message::AircraftOperationalStatus(status) => {
                let fields = match status {
                    AircraftOperationalStatus::Airborne(fields)
                    | AircraftOperationalStatus::Surface(fields) => Some(*fields),
                    AircraftOperationalStatus::Reserved { .. } => None,
                };
                if let Some(fields) = fields {
                    if fields.version >= state.adsb_version {
                        debug!(?address, from = ?state.adsb_version, to = ?fields.version, "adsb version updated");
                        state.adsb_version = fields.version;
                        state.nic_suppl_a = fields.nic_suppl_a;
                        state.nic_suppl_c = fields.nic_suppl_c;
                    }
                }
            }
            Message::AircraftIdentification(identification) => {
                state.callsign = Some(identification.callsign.decode());
            }
            Message::AirborneVelocity(velocity) => {
                if let Some(feet) = velocity.altitude_difference.feet() {
                    state.geo_minus_baro_feet = Some(feet);
                }
            }
            Message::AirbornePosition(fields) => {
                if let Some(cpr) = fields.cpr {
                    state.cpr.observe(cpr, now_ms);
                }
            }
            Message::SurfacePosition(fields) => {
                state.cpr.observe(fields.cpr, now_ms);
            }
            _ => {}
        }

        let nic = match &message {
            Message::AirbornePosition(_) => state.nic_airborne(),
            Message::SurfacePosition(_) => state.nic_surface(),
            _ => NicSnapshot::default(),
        };
        let variant = Variant::from_adsb_message(message, nic).unwrap_or(Variant::Envelope(frame));

        Ok(DecodedReply { address: Some(address), variant })
    }

    /// Lazily decode a geographic fix for a position variant. `receiver`,
    /// if given, is used for local decode when no matched opposite-parity
    /// sample is available within the pairing window. Returns `Ok(None)` if
    /// no decode is currently possible (unpaired and no receiver given), not
    /// an error.
    pub fn extract_position(
        &mut self,
        reply: &DecodedReply,
        receiver: Option<CprPosition>,
    ) -> Result<Option<Fix>, DecodeError> {
        let Some(address) = reply.address else { return Ok(None) };
        let Some(state) = self.aircraft.get_mut(&address) else { return Ok(None) };

        let (format, vertical_status, altitude_feet, altitude_type) = match reply.variant {
            Variant::AirbornePosition(position) => {
                let format = position.fields.cpr.map(|cpr| cpr.format);
                let Some(format) = format else { return Ok(None) };
                let altitude_feet = position.fields.altitude_code.and_then(|code| code.feet());
                let altitude_type = match position.fields.altitude_type {
                    AltitudeType::Barometric => PositionAltitudeType::Barometric,
                    AltitudeType::Gnss => PositionAltitudeType::AboveEllipsoid,
                };
                (format, VerticalStatus::Airborne, altitude_feet, altitude_type)
            }
            Variant::SurfacePosition(position) => (
                position.fields.cpr.format,
                VerticalStatus::Ground,
                Some(0),
                PositionAltitudeType::AboveGroundLevel,
            ),
            _ => return Ok(None),
        };

        let position = state.cpr.decode(format, vertical_status, receiver, self.reasonableness_threshold_nm)?;

        Ok(position.and_then(|position| {
            altitude_feet.map(|altitude_feet| Fix {
                latitude: position.latitude,
                longitude: position.longitude,
                altitude_feet,
                altitude_type,
            })
        }))
    }

    /// The ADS-B version currently tracked for `reply`'s sender, `0` if
    /// unknown.
    pub fn adsb_version(&self, reply: &DecodedReply) -> u8 {
        reply.address.and_then(|address| self.get(&address)).map_or(0, |state| state.adsb_version.as_u8())
    }

    /// The most recently stashed geometric-minus-barometric altitude
    /// difference for `reply`'s sender.
    pub fn geo_minus_baro(&self, reply: &DecodedReply) -> Option<i32> {
        reply.address.and_then(|address| self.get(&address)).and_then(|state| state.geo_minus_baro_feet)
    }

    /// Evict aircraft untouched for longer than the policy's `max_age_ms`,
    /// but only once the map holds more entries than `max_entries`.
    pub fn clear_stale(&mut self, now_ms: u64) {
        self.calls_since_cleanup = 0;
        self.latest_timestamp_ms = self.latest_timestamp_ms.max(now_ms);
        if self.aircraft.len() <= self.policy.max_entries {
            return;
        }
        let max_age_ms = self.policy.max_age_ms;
        let latest = self.latest_timestamp_ms;
        let before = self.aircraft.len();
        self.aircraft.retain(|_, state| latest.saturating_sub(state.last_used_ms) < max_age_ms);
        let evicted = before - self.aircraft.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.aircraft.len(), "evicted stale aircraft");
        }
    }
}

impl Default for StatefulDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::variant::Variant;

    use super::*;

    fn hex_decode(s: &str) -> Vec<u8> {
        (0..s.len()).step_by(2).map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap()).collect()
    }

    #[test]
    fn decodes_identification_and_remembers_callsign() {
        let mut decoder = StatefulDecoder::new();
        let bytes = hex_decode("8D4840D6202CC371C32CE0");
        let reply = decoder.decode(&bytes, 0).unwrap();
        assert!(matches!(reply.variant, Variant::Identification(_)));
        let state = decoder.get(&reply.address.unwrap()).unwrap();
        assert!(state.callsign.is_some());
    }

    #[test]
    fn eviction_removes_aircraft_past_max_age_once_over_capacity() {
        let mut decoder = StatefulDecoder::with_policy(EvictionPolicy {
            max_calls_since_cleanup: 1,
            max_entries: 0,
            max_age_ms: 1_000,
        });
        let bytes = hex_decode("8D4840D6202CC371C32CE0");
        decoder.decode(&bytes, 0).unwrap();
        assert_eq!(decoder.len(), 1);

        decoder.clear_stale(2_000);
        assert_eq!(decoder.len(), 0);
    }

    #[test]
    fn eviction_keeps_recent_aircraft() {
        let mut decoder = StatefulDecoder::with_policy(EvictionPolicy {
            max_calls_since_cleanup: 1,
            max_entries: 0,
            max_age_ms: 10_000,
        });
        let bytes = hex_decode("8D4840D6202CC371C32CE0");
        decoder.decode(&bytes, 0).unwrap();
        decoder.clear_stale(500);
        assert_eq!(decoder.len(), 1);
    }

    #[test]
    fn eviction_resets_tracked_version_and_nic_supplements() {
        let mut decoder = StatefulDecoder::with_policy(EvictionPolicy {
            max_calls_since_cleanup: 1,
            max_entries: 0,
            max_age_ms: 1_000,
        });
        // TC31 subtype 0, version bits = 2, nic_suppl_a bit set. Byte 0 is
        // TC/subtype; bytes 1-4 are the capability/operational-mode words;
        // byte 5 carries version (top 3 bits) and nic_suppl_a (bit 4).
        let mut me = [0u8; 7];
        me[0] = 31 << 3;
        me[5] = 0b010_1_0000;
        let mut frame = vec![0x8Du8, 0x48, 0x40, 0xD6];
        frame.extend_from_slice(&me);
        frame.extend_from_slice(&[0, 0, 0]);

        let reply = decoder.decode(&frame, 0).unwrap();
        let address = reply.address.unwrap();
        assert_eq!(decoder.get(&address).unwrap().adsb_version, AdsbVersion::V2);
        assert!(decoder.get(&address).unwrap().nic_suppl_a);

        decoder.clear_stale(2_000);
        assert!(decoder.get(&address).is_none());
    }

    #[test]
    fn decoding_same_frame_twice_at_same_timestamp_is_idempotent_on_map_size() {
        let mut decoder = StatefulDecoder::new();
        let bytes = hex_decode("8D4840D6202CC371C32CE0");
        decoder.decode(&bytes, 0).unwrap();
        let size_after_first = decoder.len();
        let reply_a = decoder.decode(&bytes, 0).unwrap();
        let reply_b = decoder.decode(&bytes, 0).unwrap();
        assert_eq!(decoder.len(), size_after_first);
        assert_eq!(reply_a, reply_b);
    }

    #[test]
    fn airborne_position_is_unresolved_until_paired() {
        let mut decoder = StatefulDecoder::new();
        // DF17, TC 11, even frame: altitude 38000ft, CPR raw lat/lon 93000/51372.
        let even = hex_decode("8D40621D58C382D690C8AC2863A7");
        let reply_even = decoder.decode(&even, 1_000).unwrap();
        let Variant::AirbornePosition(position) = reply_even.variant else {
            panic!("expected an airborne position variant");
        };
        assert_eq!(position.fields.altitude_code.unwrap().feet(), Some(38_000));
        assert!(decoder.extract_position(&reply_even, None).unwrap().is_none());
    }

    #[test]
    fn airborne_position_falls_back_to_local_decode_with_a_receiver() {
        let mut decoder = StatefulDecoder::new();
        let even = hex_decode("8D40621D58C382D690C8AC2863A7");
        let reply_even = decoder.decode(&even, 1_000).unwrap();
        // Reference position near the expected fix (52.257N, 3.919E), as an
        // ADS-B receiver would supply its own known location.
        let receiver = CprPosition { latitude: 52.25, longitude: 3.92 };
        let fix = decoder.extract_position(&reply_even, Some(receiver)).unwrap();
        let fix = fix.expect("local decode should resolve against a nearby receiver");
        assert_eq!(fix.altitude_feet, 38_000);
        assert_eq!(fix.altitude_type, PositionAltitudeType::Barometric);
        assert!((fix.latitude - 52.257).abs() < 0.1);
    }
}
