//! The deepest-specialized message a [`crate::state::StatefulDecoder`] can
//! produce for one reply.
//!
//! The source expresses this as a class hierarchy; here it is one tagged
//! `enum` with a flat payload per case, matched rather than dispatched
//! virtually. Non-ADS-B downlink formats never get deeper than
//! [`crate::frame::Frame`] itself — `Envelope` carries that unchanged, which
//! is also where DF17/18/19 messages with no typed ME variant, and TIS-B/
//! ADS-R non-transponder replies this crate does not further specialize,
//! land.

use crate::adsb::{
    self, AdsbVersion, AircraftIdentification, AircraftOperationalStatus, AirborneVelocity,
    EmergencyPriorityStatus, Message, OperationalStatusFields, TargetStateAndStatus,
    TcasResolutionAdvisory,
};
use crate::frame::Frame;

/// ADS-B version and NIC supplement bits as tracked for the sending aircraft
/// at the moment this variant was produced — a snapshot, not a live view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct NicSnapshot {
    pub version: AdsbVersion,
    pub nic_suppl_a: bool,
    pub nic_suppl_c: Option<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AirbornePositionVariant {
    pub fields: adsb::AirbornePosition,
    pub nic: NicSnapshot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfacePositionVariant {
    pub fields: adsb::SurfacePosition,
    pub nic: NicSnapshot,
}

/// One decoded Mode S reply, specialized as deeply as this crate knows how.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Identification (ADS-B TC 1-4).
    Identification(AircraftIdentification),
    /// Airborne position (ADS-B TC 0, 9-18, 20-22).
    AirbornePosition(AirbornePositionVariant),
    /// Surface position (ADS-B TC 5-8).
    SurfacePosition(SurfacePositionVariant),
    /// Velocity over ground (ADS-B TC 19, subtype 1-2).
    VelocityOverGround(AirborneVelocity),
    /// Airspeed & heading (ADS-B TC 19, subtype 3-4).
    AirspeedHeading(AirborneVelocity),
    /// Emergency/priority status (ADS-B TC 28, subtype 1).
    EmergencyPriorityStatus(EmergencyPriorityStatus),
    /// TCAS Resolution Advisory report (ADS-B TC 28, subtype 2).
    TcasResolutionAdvisory(TcasResolutionAdvisory),
    /// Target State & Status (ADS-B TC 29, subtype 1; suppressed on V0 when ME bit 11 is set).
    TargetStateAndStatus(TargetStateAndStatus),
    /// Airborne Operational Status (ADS-B TC 31, subtype 0).
    AirborneOperationalStatus(OperationalStatusFields),
    /// Surface Operational Status (ADS-B TC 31, subtype 1).
    SurfaceOperationalStatus(OperationalStatusFields),
    /// A recognized ME type code/subtype this crate gives no typed payload
    /// to, or the raw Mode S envelope for anything outside DF17/18/19
    /// (DF0/4/5/11/16/20/21/24+, reserved DFs, and untyped TIS-B/ADS-R).
    Envelope(Frame),
}

impl Variant {
    /// Build the deepest variant for an already-decoded ADS-B `ME` message,
    /// given the version/NIC-supplement snapshot the dispatcher is using for
    /// this aircraft at this moment. Returns `None` for ME shapes this crate
    /// gives no typed payload to; the caller falls back to `Envelope`.
    pub(crate) fn from_adsb_message(message: Message, nic: NicSnapshot) -> Option<Self> {
        Some(match message {
            Message::AircraftIdentification(identification) => Self::Identification(identification),
            Message::AirbornePosition(fields) => {
                Self::AirbornePosition(AirbornePositionVariant { fields, nic })
            }
            Message::SurfacePosition(fields) => {
                Self::SurfacePosition(SurfacePositionVariant { fields, nic })
            }
            Message::AirborneVelocity(velocity) => match velocity.velocity_type {
                adsb::VelocityType::GroundSpeed(_) => Self::VelocityOverGround(velocity),
                adsb::VelocityType::Airspeed(_) => Self::AirspeedHeading(velocity),
            },
            Message::AircraftStatus(adsb::AircraftStatus::EmergencyPriorityStatus(status)) => {
                Self::EmergencyPriorityStatus(status)
            }
            Message::AircraftStatus(adsb::AircraftStatus::TcasResolutionAdvisory(ra)) => {
                Self::TcasResolutionAdvisory(ra)
            }
            Message::TargetStateAndStatus(tss) => Self::TargetStateAndStatus(tss),
            Message::AircraftOperationalStatus(AircraftOperationalStatus::Airborne(fields)) => {
                Self::AirborneOperationalStatus(fields)
            }
            Message::AircraftOperationalStatus(AircraftOperationalStatus::Surface(fields)) => {
                Self::SurfaceOperationalStatus(fields)
            }
            Message::AircraftStatus(adsb::AircraftStatus::Reserved { .. })
            | Message::AircraftOperationalStatus(AircraftOperationalStatus::Reserved { .. })
            | Message::Reserved { .. } => return None,
        })
    }

    pub fn is_airborne_position(&self) -> bool {
        matches!(self, Self::AirbornePosition(_))
    }

    pub fn is_surface_position(&self) -> bool {
        matches!(self, Self::SurfacePosition(_))
    }

    pub fn is_position(&self) -> bool {
        self.is_airborne_position() || self.is_surface_position()
    }
}
