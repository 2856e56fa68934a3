//! Qualified aircraft addressing.
//!
//! The ICAO24 alone is not a unique key for per-aircraft state: DF18 replies
//! with `first_field >= 2` describe non-ICAO emitters (TIS-B, ADS-R) that can
//! collide with a real ICAO address. `QualifiedAddress` is the key actually
//! used by the stateful correlator.

/// How the 24-bit address in [`QualifiedAddress`] should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressQualifier {
    Icao24,
    TisBIcao,
    TisBOther,
    AdsR,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedAddress {
    pub address: [u8; 3],
    pub qualifier: AddressQualifier,
}

impl QualifiedAddress {
    pub fn new(address: [u8; 3], qualifier: AddressQualifier) -> Self {
        Self { address, qualifier }
    }

    pub fn icao24(address: [u8; 3]) -> Self {
        Self::new(address, AddressQualifier::Icao24)
    }
}

/// Code Format field of DF18 (first_field), selecting the address qualifier.
///
/// <https://mode-s.org>, reference page 39 ff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeFormat(pub u8);

impl CodeFormat {
    pub const ADSB_WITH_ICAO_ADDRESS: Self = Self(0);
    pub const ADSB_WITH_NON_ICAO_ADDRESS: Self = Self(1);
    pub const TISB_WITH_ICAO_ADDRESS_1: Self = Self(2);
    pub const TISB_WITH_ICAO_ADDRESS_2: Self = Self(3);
    pub const TISB_AND_ADSR_MANAGEMENT: Self = Self(4);
    pub const TISB_WITH_NON_ICAO_ADDRESS: Self = Self(5);
    pub const ADSB_REBROADCAST: Self = Self(6);
    pub const RESERVED: Self = Self(7);

    /// Classify a DF18 `first_field` into the four-way qualifier the
    /// per-aircraft state map keys on.
    ///
    /// `ADSB_WITH_ICAO_ADDRESS`/`ADSB_WITH_NON_ICAO_ADDRESS` carry a genuine
    /// (if sometimes non-ICAO-assigned) 24-bit address in the same position
    /// as DF17, so they key as plain ICAO24. `ADSB_REBROADCAST` (CF=6) is a
    /// ground station rebroadcasting someone else's ADS-B under ADS-R; it
    /// keys separately so it cannot collide with the rebroadcast aircraft's
    /// own direct reception. `TISB_AND_ADSR_MANAGEMENT` (CF=4) carries no
    /// address field at all (see [`super::Frame::decode`]) and never reaches
    /// this function with a real address.
    pub fn address_qualifier(self) -> AddressQualifier {
        match self.0 {
            2 | 3 => AddressQualifier::TisBIcao,
            5 => AddressQualifier::TisBOther,
            6 => AddressQualifier::AdsR,
            _ => AddressQualifier::Icao24,
        }
    }
}
