//! Compact Position Reporting
//!
//! Latitude and longitude are reported using two alternating messages (even
//! and odd). The original position can be recovered two ways:
//!
//! - global: needs both messages, fails if they straddle different
//!   longitude zones.
//! - local: needs a single message plus a recent reference position.
//!
//! <https://mode-s.org/1090mhz/content/ads-b/3-airborne-position.html>

use std::ops::Not;

use crate::adsb::VerticalStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cpr {
    pub format: Format,
    pub position: PositionCode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Format {
    Even,
    Odd,
}

impl Format {
    pub fn from_bit(bit: bool) -> Self {
        if bit { Format::Odd } else { Format::Even }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::Even => Self::Odd,
            Self::Odd => Self::Even,
        }
    }
}

impl Not for Format {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.other()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionCode {
    pub latitude: CprCoordinate,
    pub longitude: CprCoordinate,
}

/// A 17 (airborne) or 19 (surface) bit encoded latitude/longitude component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CprCoordinate(u32);

impl CprCoordinate {
    pub const fn from_u32_unchecked(word: u32) -> Self {
        Self(word)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq)]
pub enum CprError {
    #[error("messages are from different longitude zones")]
    DifferentLongitudeZones,
    #[error("decoded position is farther than {threshold_nm} nm from the last trusted fix")]
    Unreasonable { threshold_nm: f64 },
}

/// Encoding parameters shared by the global and local decode algorithms.
///
/// Reference: ICAO 9871 (D.2.4.7), RTCA DO-260B A.1.7 (page A-55).
mod algorithm {
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    use super::{CprCoordinate, CprError, Format, Position, PositionCode};

    const N_Z: f64 = 15.0;

    #[inline]
    fn fix_lat(mut lat: f64) -> f64 {
        if lat >= 270.0 {
            lat -= 360.0;
        }
        lat
    }

    #[inline]
    fn fix_lon(mut lon: f64) -> f64 {
        if lon >= 180.0 {
            lon -= 360.0;
        }
        lon
    }

    #[inline]
    fn i(format: Format) -> f64 {
        match format {
            Format::Even => 0.0,
            Format::Odd => 1.0,
        }
    }

    /// The NL ("number of longitude zones") function, computed in closed
    /// form rather than via a lookup table.
    pub fn n_l(lat: f64) -> f64 {
        if lat == 0.0 {
            59.0
        } else if lat == 87.0 || lat == -87.0 {
            2.0
        } else if lat > 87.0 || lat < -87.0 {
            1.0
        } else {
            let a = 1.0 - (FRAC_PI_2 / N_Z).cos();
            let b = (PI * lat.abs() / 180.0).cos().powi(2);
            (TAU / (1.0 - a / b).acos()).floor()
        }
    }

    #[derive(Clone, Copy, Debug)]
    pub struct Algorithm {
        pub nb: u8,
        pub d_factor: f64,
    }

    impl Algorithm {
        pub const AIRBORNE: Self = Self { nb: 17, d_factor: 1.0 };
        pub const SURFACE: Self = Self { nb: 19, d_factor: 0.25 };

        #[inline]
        fn pow_2_nb(&self) -> f64 {
            2.0f64.powi(self.nb.into())
        }

        #[inline]
        fn scaled(&self, position: PositionCode) -> [f64; 2] {
            let pow_2_nb = self.pow_2_nb();
            [
                position.latitude.as_u32() as f64 / pow_2_nb,
                position.longitude.as_u32() as f64 / pow_2_nb,
            ]
        }

        /// Decode a single CPR frame against a nearby reference position.
        pub fn decode_local(&self, field: Cpr, reference: Position) -> Position {
            let i = i(field.format);
            let [yz, xz] = self.scaled(field.position);

            let d_lat = self.d_factor * 360.0 / (4.0 * N_Z - i);
            let j = (reference.latitude / d_lat).floor()
                + (0.5 + reference.latitude.rem_euclid(d_lat) / d_lat - yz).floor();
            let r_lat = d_lat * (j + yz);

            let d_lon = 360.0 / (n_l(r_lat) - i).max(1.0);
            let m = (reference.longitude / d_lon).floor()
                + (0.5 + reference.longitude.rem_euclid(d_lon) / d_lon - xz).floor();
            let r_lon = fix_lon(d_lon * (m + xz));

            Position { latitude: r_lat, longitude: r_lon }
        }

        /// Decode a matched even/odd CPR pair.
        pub fn decode_global(
            &self,
            cpr_even: PositionCode,
            cpr_odd: PositionCode,
            most_recent: Format,
        ) -> Result<Position, CprError> {
            let [yz_even, xz_even] = self.scaled(cpr_even);
            let [yz_odd, xz_odd] = self.scaled(cpr_odd);

            let d_lat_even = self.d_factor * 360.0 / (4.0 * N_Z);
            let d_lat_odd = self.d_factor * 360.0 / (4.0 * N_Z - 1.0);

            let j = (59.0 * yz_even - 60.0 * yz_odd + 0.5).floor();
            let r_lat_even = fix_lat(d_lat_even * (j.rem_euclid(60.0) + yz_even));
            let r_lat_odd = fix_lat(d_lat_odd * (j.rem_euclid(59.0) + yz_odd));

            let nl_even = n_l(r_lat_even);
            let nl_odd = n_l(r_lat_odd);
            if nl_even != nl_odd {
                return Err(CprError::DifferentLongitudeZones);
            }

            let (r_lat, nl_r_lat, xz, n) = match most_recent {
                Format::Even => (r_lat_even, nl_even, xz_even, nl_even.max(1.0)),
                Format::Odd => (r_lat_odd, nl_odd, xz_odd, (nl_odd - 1.0).max(1.0)),
            };

            let d_lon = 360.0 / n;
            let m = (xz_even * (nl_r_lat - 1.0) - xz_odd * nl_r_lat + 0.5).floor();
            let r_lon = fix_lon(d_lon * (m.rem_euclid(n) + xz));

            Ok(Position { latitude: r_lat, longitude: r_lon })
        }
    }
}

pub use algorithm::Algorithm;

/// Approximate great-circle distance in nautical miles (haversine formula on
/// a spherical-earth approximation, which is all the reasonableness check
/// needs).
fn distance_nm(a: Position, b: Position) -> f64 {
    const EARTH_RADIUS_NM: f64 = 3440.065;
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_NM * h.sqrt().asin()
}

#[derive(Clone, Copy, Debug)]
struct Bin {
    position: PositionCode,
    time_ms: u64,
}

/// Per-aircraft CPR pairing cell: holds at most one even and one odd sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct CprDecoder {
    even: Option<Bin>,
    odd: Option<Bin>,
    last_trusted_fix: Option<Position>,
}

/// Global-decode validity windows, per DO-260B.
const AIRBORNE_PAIR_WINDOW_MS: u64 = 10_000;
const SURFACE_PAIR_WINDOW_MS: u64 = 50_000;

/// Default reasonableness threshold applied by [`crate::state::StatefulDecoder`]:
/// a newly decoded position farther than this from the last trusted fix is
/// rejected rather than accepted as a valid fix. Chosen well above the
/// fastest civil aircraft's plausible travel between two Extended Squitter
/// messages a few seconds apart.
pub const DEFAULT_REASONABLENESS_THRESHOLD_NM: f64 = 600.0;

impl CprDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a CPR sample in the aircraft's pairing cell. This is the only
    /// part of CPR handling that must run on every position message, since
    /// global decode needs the opposite-parity sample to still be here on a
    /// later call; it does not itself compute a position (see [`Self::decode`]).
    pub fn observe(&mut self, cpr: Cpr, time_ms: u64) {
        let bin = Bin { position: cpr.position, time_ms };
        match cpr.format {
            Format::Even => self.even = Some(bin),
            Format::Odd => self.odd = Some(bin),
        }
    }

    /// Lazily decode the most recently observed sample of `format`: global
    /// decode against the stored opposite-parity sample if one is within the
    /// pairing window, else local decode against `reference` if given.
    /// Applies the reasonableness check against the last trusted fix when a
    /// threshold is given. Returns `Ok(None)` if no decode was possible, not
    /// an error — an unpaired, reference-less position is simply not yet
    /// resolvable.
    pub fn decode(
        &mut self,
        format: Format,
        vertical_status: VerticalStatus,
        reference: Option<Position>,
        reasonableness_threshold_nm: Option<f64>,
    ) -> Result<Option<Position>, CprError> {
        let Some(this_bin) = (match format {
            Format::Even => self.even,
            Format::Odd => self.odd,
        }) else {
            return Ok(None);
        };
        let cpr = Cpr { format, position: this_bin.position };

        let algorithm = match vertical_status {
            VerticalStatus::Airborne => Algorithm::AIRBORNE,
            VerticalStatus::Ground => Algorithm::SURFACE,
        };
        let window_ms = match vertical_status {
            VerticalStatus::Airborne => AIRBORNE_PAIR_WINDOW_MS,
            VerticalStatus::Ground => SURFACE_PAIR_WINDOW_MS,
        };

        let other_bin = match format {
            Format::Even => self.odd,
            Format::Odd => self.even,
        };

        let global = other_bin.filter(|other| this_bin.time_ms.abs_diff(other.time_ms) <= window_ms).map(
            |other| {
                let most_recent = if this_bin.time_ms >= other.time_ms { format } else { format.other() };
                let (even, odd) = match format {
                    Format::Even => (cpr.position, other.position),
                    Format::Odd => (other.position, cpr.position),
                };
                algorithm.decode_global(even, odd, most_recent)
            },
        );

        let position = match global {
            Some(result) => Some(result?),
            None => reference.map(|reference| Ok(algorithm.decode_local(cpr, reference))).transpose()?,
        };

        if let (Some(position), Some(threshold)) = (position, reasonableness_threshold_nm) {
            if let Some(last_fix) = self.last_trusted_fix {
                if distance_nm(last_fix, position) > threshold {
                    return Err(CprError::Unreasonable { threshold_nm: threshold });
                }
            }
        }

        if let Some(position) = position {
            self.last_trusted_fix = Some(position);
        }
        Ok(position)
    }
}
