//! End-to-end decode scenarios against the public API, one per documented
//! concrete example.

use mode_s_decode::{
    adsb::{AdsbVersion, VelocityType},
    state::PositionAltitudeType,
    DecodeError, EvictionPolicy, StatefulDecoder, Variant,
};

fn hex_decode(s: &str) -> Vec<u8> {
    (0..s.len()).step_by(2).map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap()).collect()
}

fn frame(downlink_byte_0: u8, address: [u8; 3], me: [u8; 7]) -> Vec<u8> {
    let mut bytes = vec![downlink_byte_0];
    bytes.extend_from_slice(&address);
    bytes.extend_from_slice(&me);
    bytes.extend_from_slice(&[0, 0, 0]); // CRC/parity, not checked by this crate
    bytes
}

#[test]
fn identification_decodes_callsign_and_category() {
    let mut decoder = StatefulDecoder::new();
    let bytes = hex_decode("8D4840D6202CC371C32CE0");
    let reply = decoder.decode(&bytes, 0).unwrap();

    let Variant::Identification(identification) = reply.variant else {
        panic!("expected an identification variant, got {:?}", reply.variant);
    };
    assert_eq!(&identification.callsign.decode(), b"KLM1017 ");
    assert_eq!(identification.category, 0);
    assert_eq!(identification.category_set, mode_s_decode::adsb::CategorySet::D);
}

#[test]
fn airborne_position_v0_even_reports_raw_cpr_and_altitude() {
    let mut decoder = StatefulDecoder::new();
    let bytes = hex_decode("8D40621D58C382D690C8AC2863A7");
    let reply = decoder.decode(&bytes, 1_000).unwrap();

    let Variant::AirbornePosition(position) = reply.variant else {
        panic!("expected an airborne position variant, got {:?}", reply.variant);
    };
    assert_eq!(position.nic.version, AdsbVersion::V0);
    assert_eq!(position.fields.altitude_code.unwrap().feet(), Some(38_000));
    let cpr = position.fields.cpr.unwrap();
    assert_eq!(cpr.format, mode_s_decode::adsb::cpr::Format::Even);
    assert_eq!(cpr.position.latitude.as_u32(), 93_000);
    assert_eq!(cpr.position.longitude.as_u32(), 51_372);
}

#[test]
fn velocity_over_ground_then_later_operational_status_upgrades_tracked_version() {
    let mut decoder = StatefulDecoder::new();
    let address = [0x40, 0x62, 0x1D];

    // TFC 19 subtype 1 (ground speed): ME first byte 0x99.
    let mut velocity_me = [0u8; 7];
    velocity_me[0] = 0x99;
    let reply = decoder.decode(&frame(0x8D, address, velocity_me), 0).unwrap();
    assert!(matches!(reply.variant, Variant::VelocityOverGround(_)));
    assert_eq!(decoder.adsb_version(&reply), 0);

    // TFC 31 subtype 0, version bits = 2, nic_suppl_a set.
    let mut status_me = [0u8; 7];
    status_me[0] = 31 << 3;
    status_me[5] = 0b010_1_0000;
    let status_reply = decoder.decode(&frame(0x8D, address, status_me), 1_000).unwrap();
    assert!(matches!(status_reply.variant, Variant::AirborneOperationalStatus(_)));

    // A subsequent airborne position frame from the same address now carries
    // the upgraded version and NIC supplement.
    let position_bytes = hex_decode("8D40621D58C382D690C8AC2863A7");
    let position_reply = decoder.decode(&position_bytes, 2_000).unwrap();
    let Variant::AirbornePosition(position) = position_reply.variant else {
        panic!("expected an airborne position variant");
    };
    assert_eq!(position.nic.version, AdsbVersion::V2);
    assert!(position.nic.nic_suppl_a);
}

#[test]
fn supersonic_airspeed_scales_reported_knots() {
    let mut decoder = StatefulDecoder::new();
    let me = [0x9C, 0x00, 0x04, 0x80, 0x00, 0x00, 0x00];
    let reply = decoder.decode(&frame(0x8D, [0xAB, 0xCD, 0xEF], me), 0).unwrap();

    let Variant::AirspeedHeading(velocity) = reply.variant else {
        panic!("expected an airspeed/heading variant, got {:?}", reply.variant);
    };
    let VelocityType::Airspeed(airspeed) = velocity.velocity_type else {
        panic!("expected the airspeed branch of velocity_type");
    };
    assert!(airspeed.is_supersonic);
    assert_eq!(airspeed.airspeed_knots(), Some(0));
}

#[test]
fn operational_status_rejects_invalid_version_bits() {
    let mut decoder = StatefulDecoder::new();
    let mut me = [0u8; 7];
    me[0] = 31 << 3;
    me[5] = 0b011_0_0000; // version bits = 3, out of range
    let result = decoder.decode(&frame(0x8D, [0x11, 0x22, 0x33], me), 0);
    assert!(matches!(result, Err(DecodeError::BadFormat { .. })));
}

#[test]
fn tcas_resolution_advisory_reports_threat_type() {
    let mut decoder = StatefulDecoder::new();
    // TC 28, subtype 2: first ME byte 0xE2 (TC=28 << 3 | subtype=2).
    let me = [0xE2, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    let reply = decoder.decode(&frame(0x8D, [0x11, 0x22, 0x33], me), 0).unwrap();

    let Variant::TcasResolutionAdvisory(ra) = reply.variant else {
        panic!("expected a TCAS resolution advisory variant, got {:?}", reply.variant);
    };
    assert!(!ra.ra_terminated);
    assert!(!ra.multiple_threat_encounter);
    assert_eq!(ra.threat_type, mode_s_decode::adsb::ThreatType::NoThreatData);
}

#[test]
fn default_eviction_policy_matches_documented_thresholds() {
    let policy = EvictionPolicy::default();
    assert_eq!(policy.max_calls_since_cleanup, 1_000_000);
    assert_eq!(policy.max_entries, 30_000);
    assert_eq!(policy.max_age_ms, 3_600_000);
}

#[test]
fn eviction_drops_entries_past_max_age_once_over_capacity() {
    // Same mechanics as the default policy, at a scale a test can run
    // quickly: capacity of zero forces every cleanup pass to consider
    // eviction, and a one-call cleanup interval means every decode call
    // can trigger one.
    let mut decoder = StatefulDecoder::with_policy(EvictionPolicy {
        max_calls_since_cleanup: 1,
        max_entries: 0,
        max_age_ms: 3_600_000,
    });
    let bytes = hex_decode("8D4840D6202CC371C32CE0");
    let reply = decoder.decode(&bytes, 0).unwrap();
    assert_eq!(decoder.len(), 1);

    decoder.clear_stale(3_600_001);
    assert!(decoder.get(&reply.address.unwrap()).is_none());
}

#[test]
fn extract_position_falls_back_to_local_decode_with_a_known_receiver_location() {
    let mut decoder = StatefulDecoder::new();
    let bytes = hex_decode("8D40621D58C382D690C8AC2863A7");
    let reply = decoder.decode(&bytes, 1_000).unwrap();

    let receiver = mode_s_decode::Position { latitude: 52.25, longitude: 3.92 };
    let fix = decoder.extract_position(&reply, Some(receiver)).unwrap().unwrap();
    assert_eq!(fix.altitude_feet, 38_000);
    assert_eq!(fix.altitude_type, PositionAltitudeType::Barometric);
    assert!((fix.latitude - 52.257).abs() < 0.1);
    assert!((fix.longitude - 3.919).abs() < 0.1);
}
