//! ADS-B Extended Squitter messages (the `ME` field of DF17/18/19).
//!
//! Reference: RTCA DO-260B, page 39 ff; <https://mode-s.org/1090mhz/content/ads-b/1-basics.html>

pub mod cpr;

use bytes::Buf;

use crate::{
    error::DecodeError,
    gillham::{decode_gillham_ac12, decode_gillham_id13},
};

fn get_bytes<B: Buf, const N: usize>(buffer: &mut B) -> [u8; N] {
    let mut data = [0u8; N];
    buffer.copy_to_slice(&mut data[..]);
    data
}

fn decode_frame_aligned_cpr(bytes: &[u8]) -> cpr::Cpr {
    let format = cpr::Format::from_bit(bytes[0] & 0b0000_0100 != 0);
    let position = cpr::PositionCode {
        latitude: cpr::CprCoordinate::from_u32_unchecked(
            (u32::from(bytes[0] & 0b11) << 15) | (u32::from(bytes[1]) << 7) | u32::from(bytes[2] >> 1),
        ),
        longitude: cpr::CprCoordinate::from_u32_unchecked(
            (u32::from(bytes[2] & 0b1) << 16) | (u32::from(bytes[3]) << 8) | u32::from(bytes[4]),
        ),
    };
    cpr::Cpr { format, position }
}

/// The 56-bit ADS-B payload, fully decoded.
///
/// Reference page 39.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Message {
    AircraftIdentification(AircraftIdentification),
    SurfacePosition(SurfacePosition),
    AirbornePosition(AirbornePosition),
    AirborneVelocity(AirborneVelocity),
    AircraftStatus(AircraftStatus),
    TargetStateAndStatus(TargetStateAndStatus),
    AircraftOperationalStatus(AircraftOperationalStatus),
    /// A type code this crate does not give a typed variant to (no
    /// assumption is made that every TFC/subtype combination is typed).
    Reserved { type_code: u8, sub_type: u8, data: [u8; 6] },
}

impl Message {
    pub fn decode<B: Buf>(buffer: &mut B, version: AdsbVersion) -> Result<Self, DecodeError> {
        let byte_0 = buffer.get_u8();
        let type_code = byte_0 >> 3;
        let bits_6_to_8 = byte_0 & 0b111;

        let reserved = |buffer: &mut B| {
            Self::Reserved { type_code, sub_type: bits_6_to_8, data: get_bytes(buffer) }
        };

        let message = match type_code {
            1..=4 => {
                Self::AircraftIdentification(AircraftIdentification::decode(buffer, type_code, bits_6_to_8))
            }
            5..=8 => Self::SurfacePosition(SurfacePosition::decode(buffer, bits_6_to_8)),
            0 | 9..=18 | 20..=22 => {
                Self::AirbornePosition(AirbornePosition::decode(buffer, type_code, bits_6_to_8))
            }
            19 => match bits_6_to_8 {
                1..=4 => Self::AirborneVelocity(AirborneVelocity::decode(buffer, bits_6_to_8)?),
                _ => reserved(buffer),
            },
            28 => Self::AircraftStatus(AircraftStatus::decode(buffer, bits_6_to_8)),
            29 => {
                let sub_type = bits_6_to_8 >> 1;
                // ME bit 11 is bit 2 (0-indexed from the MSB) of the byte
                // that follows TC/subtype, i.e. local bit 2 of the next
                // unconsumed byte; DO-260B reserves it on V0 transponders
                // that don't implement Target State & Status.
                let me_bit_11_set = buffer.chunk().first().is_some_and(|b| b & 0b0010_0000 != 0);
                if sub_type == 1 && !(version == AdsbVersion::V0 && me_bit_11_set) {
                    Self::TargetStateAndStatus(TargetStateAndStatus::decode(buffer))
                } else {
                    reserved(buffer)
                }
            }
            31 => {
                Self::AircraftOperationalStatus(AircraftOperationalStatus::decode(buffer, bits_6_to_8)?)
            }
            _ => reserved(buffer),
        };
        Ok(message)
    }
}

/// The ADS-B protocol version a transponder advertises via Operational
/// Status. Tracked per aircraft; never written except by a TFC 31 message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AdsbVersion {
    #[default]
    V0,
    V1,
    V2,
}

impl AdsbVersion {
    pub fn from_bits(bits: u8) -> Result<Self, DecodeError> {
        match bits {
            0 => Ok(Self::V0),
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            _ => Err(DecodeError::bad_format("adsb version bits > 2")),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::V0 => 0,
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalStatus {
    Airborne,
    Ground,
}

// --- Identification (TC 1-4) ------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AircraftIdentification {
    pub category_set: CategorySet,
    pub category: u8,
    pub callsign: EncodedCallsign,
}

impl AircraftIdentification {
    pub fn decode<B: Buf>(buffer: &mut B, type_code: u8, bits_6_to_8: u8) -> Self {
        Self {
            category_set: CategorySet::from_type_code(type_code),
            category: bits_6_to_8,
            callsign: EncodedCallsign(get_bytes(buffer)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategorySet {
    A,
    B,
    C,
    D,
}

impl CategorySet {
    pub fn from_type_code(type_code: u8) -> Self {
        match type_code {
            1 => Self::A,
            2 => Self::B,
            3 => Self::C,
            _ => Self::D,
        }
    }
}

/// 8 bytes of 6-bit-packed characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodedCallsign([u8; 8]);

const CHAR_LOOKUP: &[u8; 64] =
    b"#ABCDEFGHIJKLMNOPQRSTUVWXYZ##### ###############0123456789######";

impl EncodedCallsign {
    /// Decode the eight 6-bit characters into an ASCII callsign, trailing
    /// spaces included (the wire format pads with spaces, not nulls).
    pub fn decode(&self) -> [u8; 8] {
        let bits = &self.0;
        let indices = [
            bits[0] >> 2,
            ((bits[0] & 0b11) << 4) | (bits[1] >> 4),
            ((bits[1] & 0b1111) << 2) | (bits[2] >> 6),
            bits[2] & 0b0011_1111,
            bits[3] >> 2,
            ((bits[3] & 0b11) << 4) | (bits[4] >> 4),
            ((bits[4] & 0b1111) << 2) | (bits[5] >> 6),
            bits[5] & 0b0011_1111,
        ];
        let mut out = [0u8; 8];
        for (o, idx) in out.iter_mut().zip(indices) {
            *o = CHAR_LOOKUP[idx as usize];
        }
        out
    }
}

// --- Position (TC 5-8 surface, TC 0/9-18/20-22 airborne) ---------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Movement(pub u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroundTrack(pub u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfacePosition {
    pub movement: Movement,
    pub ground_track: Option<GroundTrack>,
    pub time: bool,
    pub cpr: cpr::Cpr,
}

impl SurfacePosition {
    pub fn decode<B: Buf>(buffer: &mut B, bits_6_to_8: u8) -> Self {
        let bytes: [u8; 6] = get_bytes(buffer);
        let a = (bits_6_to_8 << 4) | (bytes[0] >> 4);
        let b = bytes[0] & 0b0000_1000 != 0;
        let c = ((bytes[0] & 0b0000_0111) << 4) | (bytes[1] >> 4);
        let d = bytes[1] & 0b0000_1000 != 0;

        Self {
            movement: Movement(a),
            ground_track: b.then_some(GroundTrack(c)),
            time: d,
            cpr: decode_frame_aligned_cpr(&bytes[1..]),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AltitudeType {
    Barometric,
    Gnss,
}

impl AltitudeType {
    pub fn from_type_code(type_code: u8) -> Self {
        if type_code == 0 || (9..=18).contains(&type_code) { Self::Barometric } else { Self::Gnss }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AltitudeCode(pub u16);

impl AltitudeCode {
    /// Decode to feet. `None` if the field is unavailable. Applies the
    /// Q-bit-dependent scaling internally — see [`decode_gillham_ac12`].
    pub fn feet(&self) -> Option<i32> {
        decode_gillham_ac12(self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurveillanceStatus(pub u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AirbornePosition {
    pub altitude_type: AltitudeType,
    pub surveillance_status: SurveillanceStatus,
    pub single_antenna_flag: bool,
    pub altitude_code: Option<AltitudeCode>,
    pub time: bool,
    pub cpr: Option<cpr::Cpr>,
}

impl AirbornePosition {
    pub fn decode<B: Buf>(buffer: &mut B, type_code: u8, bits_6_to_8: u8) -> Self {
        let bytes: [u8; 6] = get_bytes(buffer);
        let a = bits_6_to_8 >> 1;
        let b = bits_6_to_8 & 0b1 == 1;
        let c = (u16::from(bytes[0]) << 4) | u16::from(bytes[1] >> 4);
        let d = bytes[1] & 0b0000_1000 != 0;

        Self {
            altitude_type: AltitudeType::from_type_code(type_code),
            surveillance_status: SurveillanceStatus(a),
            single_antenna_flag: b,
            altitude_code: (c != 0).then_some(AltitudeCode(c)),
            time: d,
            cpr: (type_code != 0).then(|| decode_frame_aligned_cpr(&bytes[1..])),
        }
    }
}

// --- Velocity (TC 19) ---------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NacV(pub u8);

impl NacV {
    /// Navigation accuracy category for velocity, in meters/second. `None`
    /// means "unknown, or > 10 m/s".
    pub fn meters_per_second(&self) -> Option<f64> {
        match self.0 {
            1 => Some(10.0),
            2 => Some(3.0),
            3 => Some(1.0),
            4 => Some(0.3),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalRateSource {
    Geometric,
    Barometric,
}

/// Vertical rate; sign is applied by the `feet_per_minute` accessor, not at
/// construction, so an unavailable magnitude never reads as `Some(0)` with a
/// spurious sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerticalRate {
    pub source: VerticalRateSource,
    sign_down: bool,
    raw: u16,
}

impl VerticalRate {
    pub fn has_value(&self) -> bool {
        self.raw != 0
    }

    pub fn feet_per_minute(&self) -> Option<i32> {
        self.has_value().then(|| {
            let magnitude = (i32::from(self.raw) - 1) * 64;
            if self.sign_down { -magnitude } else { magnitude }
        })
    }
}

/// Geometric-minus-barometric altitude difference; sign applied at read
/// time, same rationale as [`VerticalRate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AltitudeDifference {
    sign_below: bool,
    raw: u16,
}

impl AltitudeDifference {
    pub fn has_value(&self) -> bool {
        self.raw != 0
    }

    pub fn feet(&self) -> Option<i32> {
        self.has_value().then(|| {
            let magnitude = (i32::from(self.raw) - 1) * 25;
            if self.sign_below { -magnitude } else { magnitude }
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroundSpeed {
    pub direction_east_west: bool,
    velocity_east_west: u16,
    pub direction_north_south: bool,
    velocity_north_south: u16,
}

impl GroundSpeed {
    /// Ground speed in knots and track angle in degrees, `None` if either
    /// raw velocity component is unavailable (raw == 0).
    pub fn speed_and_track(&self) -> Option<(f64, f64)> {
        if self.velocity_east_west == 0 || self.velocity_north_south == 0 {
            return None;
        }
        let v_ew = f64::from(self.velocity_east_west - 1) * if self.direction_east_west { -1.0 } else { 1.0 };
        let v_ns = f64::from(self.velocity_north_south - 1) * if self.direction_north_south { -1.0 } else { 1.0 };
        let speed = v_ew.hypot(v_ns);
        let track = v_ew.atan2(v_ns).to_degrees().rem_euclid(360.0);
        Some((speed, track))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Airspeed {
    heading_status: bool,
    heading_raw: u16,
    pub is_true_airspeed: bool,
    airspeed_raw: u16,
    pub is_supersonic: bool,
}

impl Airspeed {
    pub fn has_heading(&self) -> bool {
        self.heading_status
    }

    pub fn heading_degrees(&self) -> Option<f64> {
        self.has_heading().then(|| f64::from(self.heading_raw) * 360.0 / 1024.0)
    }

    pub fn has_airspeed(&self) -> bool {
        self.airspeed_raw != 0
    }

    pub fn airspeed_knots(&self) -> Option<i32> {
        self.has_airspeed().then(|| {
            let knots = i32::from(self.airspeed_raw) - 1;
            if self.is_supersonic { knots * 4 } else { knots }
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VelocityType {
    GroundSpeed(GroundSpeed),
    Airspeed(Airspeed),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AirborneVelocity {
    pub intent_change_flag: bool,
    pub nac_v: NacV,
    pub velocity_type: VelocityType,
    pub vertical_rate: VerticalRate,
    pub altitude_difference: AltitudeDifference,
}

impl AirborneVelocity {
    pub fn decode<B: Buf>(buffer: &mut B, bits_6_to_8: u8) -> Result<Self, DecodeError> {
        let sub_type = bits_6_to_8;
        let bytes: [u8; 6] = get_bytes(buffer);

        // byte               0        1        2        3        4        5
        // field       abcccdee eeeeeeee fggggggg ggghijjj jjjjjjkk lmmmmmmm
        let a = bytes[0] & 0b1000_0000 != 0;
        let c = (bytes[0] & 0b0011_1000) >> 3;
        let d = bytes[0] & 0b0000_0100 != 0;
        let e = (u16::from(bytes[0] & 0b0000_0011) << 8) | u16::from(bytes[1]);
        let f = bytes[2] & 0b1000_0000 != 0;
        let g = (u16::from(bytes[2] & 0b0111_1111) << 3) | u16::from(bytes[3] >> 5);
        let h = bytes[3] & 0b0001_0000 != 0;
        let i = bytes[3] & 0b0000_1000 != 0;
        let j = (u16::from(bytes[3] & 0b0000_0111) << 6) | u16::from(bytes[4] >> 2);
        let l = bytes[5] & 0b1000_0000 != 0;
        let m = u16::from(bytes[5] & 0b0111_1111);

        let velocity_type = match sub_type {
            1 | 2 => VelocityType::GroundSpeed(GroundSpeed {
                direction_east_west: d,
                velocity_east_west: e,
                direction_north_south: f,
                velocity_north_south: g,
            }),
            3 | 4 => VelocityType::Airspeed(Airspeed {
                heading_status: d,
                heading_raw: e,
                is_true_airspeed: f,
                airspeed_raw: g,
                is_supersonic: sub_type == 4,
            }),
            _ => return Err(DecodeError::bad_format("airborne velocity subtype must be 1..=4")),
        };

        Ok(Self {
            intent_change_flag: a,
            nac_v: NacV(c),
            velocity_type,
            vertical_rate: VerticalRate {
                source: if h { VerticalRateSource::Barometric } else { VerticalRateSource::Geometric },
                sign_down: i,
                raw: j,
            },
            altitude_difference: AltitudeDifference { sign_below: l, raw: m },
        })
    }
}

// --- Aircraft status (TC 28) --------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Squawk(pub u16);

impl Squawk {
    pub fn from_gillham(code: u16) -> Self {
        Self(decode_gillham_id13(code))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AircraftStatus {
    EmergencyPriorityStatus(EmergencyPriorityStatus),
    TcasResolutionAdvisory(TcasResolutionAdvisory),
    Reserved { sub_type: u8, data: [u8; 6] },
}

impl AircraftStatus {
    pub fn decode<B: Buf>(buffer: &mut B, bits_6_to_8: u8) -> Self {
        match bits_6_to_8 {
            1 => Self::EmergencyPriorityStatus(EmergencyPriorityStatus::decode(buffer)),
            2 => Self::TcasResolutionAdvisory(TcasResolutionAdvisory::decode(buffer)),
            sub_type => Self::Reserved { sub_type, data: get_bytes(buffer) },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmergencyPriorityStatus {
    pub emergency_state: EmergencyState,
    pub squawk: Squawk,
}

impl EmergencyPriorityStatus {
    pub fn decode<B: Buf>(buffer: &mut B) -> Self {
        let bytes: [u8; 2] = get_bytes(buffer);
        let identity_code = (u16::from(bytes[0] & 0b0001_1111) << 8) | u16::from(bytes[1]);
        buffer.advance(4);
        Self {
            emergency_state: EmergencyState::from_u8(bytes[0] >> 5),
            squawk: Squawk::from_gillham(identity_code),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmergencyState {
    None,
    General,
    Lifeguard,
    MinimumFuel,
    NoCommunications,
    UnlawfulInterference,
    DownedAircraft,
    Reserved(u8),
}

impl EmergencyState {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::General,
            2 => Self::Lifeguard,
            3 => Self::MinimumFuel,
            4 => Self::NoCommunications,
            5 => Self::UnlawfulInterference,
            6 => Self::DownedAircraft,
            other => Self::Reserved(other),
        }
    }
}

/// TCAS Resolution Advisory Broadcast. DO-260B §2.2.3.2.7.1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TcasResolutionAdvisory {
    pub active_resolution_advisories: u16,
    pub ra_terminated: bool,
    pub multiple_threat_encounter: bool,
    pub threat_type: ThreatType,
    pub threat_identity_data: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreatType {
    NoThreatData,
    IcaoAddress([u8; 3]),
    Other,
    Reserved,
}

impl TcasResolutionAdvisory {
    pub fn decode<B: Buf>(buffer: &mut B) -> Self {
        let bytes: [u8; 6] = get_bytes(buffer);
        // byte               0        1        2        3        4        5
        // field       aaaaaaaa aaaaaabc ddtttttt tttttttt tttttttt tttttttt
        let active_resolution_advisories = (u16::from(bytes[0]) << 6) | u16::from(bytes[1] >> 2);
        let ra_terminated = bytes[1] & 0b0000_0010 != 0;
        let multiple_threat_encounter = bytes[1] & 0b0000_0001 != 0;
        let tti = bytes[2] >> 6;
        let tid = (u32::from(bytes[2] & 0b0011_1111) << 20)
            | (u32::from(bytes[3]) << 12)
            | (u32::from(bytes[4]) << 4)
            | u32::from(bytes[5] >> 4);

        let threat_type = match tti {
            0 => ThreatType::NoThreatData,
            1 => ThreatType::IcaoAddress([
                ((tid >> 16) & 0xff) as u8,
                ((tid >> 8) & 0xff) as u8,
                (tid & 0xff) as u8,
            ]),
            2 => ThreatType::Other,
            _ => ThreatType::Reserved,
        };

        Self {
            active_resolution_advisories,
            ra_terminated,
            multiple_threat_encounter,
            threat_type,
            threat_identity_data: tid,
        }
    }
}

// --- Target State & Status (TC 29, subtype 1) ----------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetStateAndStatus {
    pub is_fms_selected_altitude: bool,
    selected_altitude_raw: u16,
    pub barometric_pressure_setting_raw: u16,
    pub heading_status: bool,
    heading_raw: u16,
    pub nac_p: u8,
    pub nic_baro: bool,
    pub sil: u8,
    pub sil_supplement: bool,
    pub is_mcp_autopilot_engaged: bool,
    pub is_vnav_engaged: bool,
    pub is_altitude_hold_active: bool,
    pub is_approach_mode_active: bool,
    pub is_tcas_operational: bool,
    pub is_lnav_engaged: bool,
}

impl TargetStateAndStatus {
    pub fn decode<B: Buf>(buffer: &mut B) -> Self {
        let bytes: [u8; 6] = get_bytes(buffer);

        let is_fms_selected_altitude = bytes[0] & 0b1000_0000 != 0;
        let selected_altitude_raw =
            (u16::from(bytes[0] & 0b0111_1111) << 4) | u16::from(bytes[1] >> 4);
        let barometric_pressure_setting_raw = (u16::from(bytes[1] & 0b0000_1111) << 5) | u16::from(bytes[2] >> 3);
        let heading_status = bytes[2] & 0b0000_0100 != 0;
        let heading_raw = (u16::from(bytes[2] & 0b0000_0011) << 7) | u16::from(bytes[3] >> 1);
        let nac_p = ((bytes[3] & 0b0000_0001) << 3) | (bytes[4] >> 5);
        let nic_baro = bytes[4] & 0b0001_0000 != 0;
        let sil = (bytes[4] & 0b0000_1100) >> 2;
        let sil_supplement = bytes[4] & 0b0000_0010 != 0;
        let is_mcp_autopilot_engaged = bytes[5] & 0b1000_0000 != 0;
        let is_vnav_engaged = bytes[5] & 0b0100_0000 != 0;
        let is_altitude_hold_active = bytes[5] & 0b0010_0000 != 0;
        let is_approach_mode_active = bytes[5] & 0b0000_1000 != 0;
        let is_tcas_operational = bytes[5] & 0b0000_0100 != 0;
        let is_lnav_engaged = bytes[5] & 0b0000_0010 != 0;

        Self {
            is_fms_selected_altitude,
            selected_altitude_raw,
            barometric_pressure_setting_raw,
            heading_status,
            heading_raw,
            nac_p,
            nic_baro,
            sil,
            sil_supplement,
            is_mcp_autopilot_engaged,
            is_vnav_engaged,
            is_altitude_hold_active,
            is_approach_mode_active,
            is_tcas_operational,
            is_lnav_engaged,
        }
    }

    pub fn has_selected_altitude(&self) -> bool {
        self.selected_altitude_raw != 0
    }

    pub fn selected_altitude_feet(&self) -> Option<i32> {
        self.has_selected_altitude().then(|| i32::from(self.selected_altitude_raw) * 32)
    }

    pub fn has_heading(&self) -> bool {
        self.heading_status
    }

    pub fn heading_degrees(&self) -> Option<f64> {
        self.has_heading().then(|| f64::from(self.heading_raw) * 180.0 / 256.0)
    }
}

// --- Operational Status (TC 31) ------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AircraftOperationalStatus {
    Airborne(OperationalStatusFields),
    Surface(OperationalStatusFields),
    Reserved { sub_type: u8, data: [u8; 6] },
}

/// A single flat record reused across airborne/surface and V0/V1/V2: the
/// source treats these as structurally identical; only the `version` and
/// `is_airborne` fields change how the raw capability/mode words upstream of
/// this struct should be interpreted by a caller that needs them (version 0
/// transponders pack a different, largely-unused capability word that this
/// crate does not attempt to further specialize).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationalStatusFields {
    pub version: AdsbVersion,
    pub nic_suppl_a: bool,
    pub nic_suppl_c: Option<u8>,
    pub nac_p: u8,
    pub sil: u8,
    pub sil_supplement: bool,
    pub nic_baro_or_track_heading: bool,
    pub horizontal_reference_direction: bool,
}

impl AircraftOperationalStatus {
    pub fn decode<B: Buf>(buffer: &mut B, bits_6_to_8: u8) -> Result<Self, DecodeError> {
        let sub_type = bits_6_to_8;
        if sub_type != 0 && sub_type != 1 {
            return Ok(Self::Reserved { sub_type, data: get_bytes(buffer) });
        }

        // byte         0        1        2        3        4        5
        // field aaaaaaaa aaaaaaaa bbbbbbbb bbbbbbbb cccdeeee ffgghijk
        let a = buffer.get_u16();
        let b = buffer.get_u16();

        let byte_4 = buffer.get_u8();
        let version_bits = byte_4 >> 5;
        let version = AdsbVersion::from_bits(version_bits)?;
        let nic_suppl_a = byte_4 & 0b0001_0000 != 0;
        let nac_p = byte_4 & 0b0000_1111;

        let byte_5 = buffer.get_u8();
        let sil = (byte_5 & 0b0011_0000) >> 4;
        let nic_baro_or_track_heading = byte_5 & 0b0000_1000 != 0;
        let horizontal_reference_direction = byte_5 & 0b0000_0100 != 0;
        let sil_supplement = byte_5 & 0b0000_0010 != 0;

        let nic_suppl_c = (sub_type == 1 && version != AdsbVersion::V0).then_some(a as u8 & 0b1);

        let fields = OperationalStatusFields {
            version,
            nic_suppl_a,
            nic_suppl_c,
            nac_p,
            sil,
            sil_supplement,
            nic_baro_or_track_heading,
            horizontal_reference_direction,
        };
        let _ = b;

        Ok(if sub_type == 0 { Self::Airborne(fields) } else { Self::Surface(fields) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_state_and_status_suppressed_on_v0_with_me_bit_11_set() {
        // TC 29, subtype 1: byte 0 = (29 << 3) | 0b010.
        let mut me_bit_11_clear: &[u8] = &[(29 << 3) | 0b010, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let message = Message::decode(&mut me_bit_11_clear, AdsbVersion::V0).unwrap();
        assert!(matches!(message, Message::TargetStateAndStatus(_)));

        // ME bit 11 is bit 2 of the byte after TC/subtype: 0b0010_0000.
        let mut me_bit_11_set: &[u8] =
            &[(29 << 3) | 0b010, 0b0010_0000, 0x00, 0x00, 0x00, 0x00, 0x00];
        let message = Message::decode(&mut me_bit_11_set, AdsbVersion::V0).unwrap();
        assert!(matches!(message, Message::Reserved { .. }));
    }

    #[test]
    fn target_state_and_status_not_suppressed_above_v0() {
        let mut bytes: &[u8] = &[(29 << 3) | 0b010, 0b0010_0000, 0x00, 0x00, 0x00, 0x00, 0x00];
        let message = Message::decode(&mut bytes, AdsbVersion::V1).unwrap();
        assert!(matches!(message, Message::TargetStateAndStatus(_)));
    }

    #[test]
    fn decodes_callsign() {
        // "KLM1017 " packed 6 bits per character.
        let encoded = EncodedCallsign([
            0b00_1011_00,
            0b1100_1100,
            0b01_0000_10,
            0b1001_0000,
            0b0111_0010,
            0b10_0000_00,
        ]);
        let decoded = encoded.decode();
        assert_eq!(&decoded, b"KLM1017 ");
    }

    #[test]
    fn airborne_velocity_rejects_bad_subtype() {
        let mut bytes: &[u8] = &[0u8; 6];
        assert!(AirborneVelocity::decode(&mut bytes, 0).is_err());
    }

    #[test]
    fn airborne_velocity_supersonic_scales_airspeed() {
        let mut bytes: &[u8] = &[0x00, 0x04, 0x80, 0x00, 0x00, 0x00];
        let velocity = AirborneVelocity::decode(&mut bytes, 4).unwrap();
        let VelocityType::Airspeed(airspeed) = velocity.velocity_type else {
            panic!("expected airspeed variant");
        };
        assert!(airspeed.is_supersonic);
        assert_eq!(airspeed.airspeed_knots(), Some(0));
        assert!(airspeed.has_airspeed());
    }

    #[test]
    fn operational_status_rejects_invalid_version() {
        let mut bytes: &[u8] = &[0x00, 0x00, 0x00, 0x00, 0b0110_0000, 0x00];
        assert!(AircraftOperationalStatus::decode(&mut bytes, 0).is_err());
    }

    #[test]
    fn tcas_resolution_advisory_decodes_flags() {
        let mut bytes: &[u8] = &[0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let status = AircraftStatus::decode(&mut bytes, 2);
        let AircraftStatus::TcasResolutionAdvisory(ra) = status else {
            panic!("expected tcas resolution advisory");
        };
        assert!(!ra.ra_terminated);
        assert!(!ra.multiple_threat_encounter);
        assert_eq!(ra.threat_type, ThreatType::NoThreatData);
    }
}
