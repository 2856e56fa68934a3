//! Gillham code
//!
//! We could implement the gillham code once, but depending on where it is
//! used, the data bits are still jumbled differently. So instead of
//! bit-shuffling twice, each caller gets a function for its specific layout.
//!
//! <https://en.wikipedia.org/wiki/Gillham_code>

/// Decodes the 13-bit identity code used in DF5/DF21 (Mode A, not ADS-B).
///
/// ```text
/// input:  C1 A1 C2 A2 C4 A4 ID B1 D1 B2 D2 B4 D4
/// output: A4 A2 A1 B4 B2 B1 C4 C2 C1 D4 D2 D1
/// ```
///
/// The ID bit (the IDENT flag) in the input is ignored.
pub fn decode_gillham_id13(code: u16) -> u16 {
    let mut value = 0;
    if code & 0b1_0000_0000_0000 != 0 {
        value |= 0b000_000_001_000; // C1
    }
    if code & 0b0_1000_0000_0000 != 0 {
        value |= 0b001_000_000_000; // A1
    }
    if code & 0b0_0100_0000_0000 != 0 {
        value |= 0b000_000_010_000; // C2
    }
    if code & 0b0_0010_0000_0000 != 0 {
        value |= 0b010_000_000_000; // A2
    }
    if code & 0b0_0001_0000_0000 != 0 {
        value |= 0b000_000_100_000; // C4
    }
    if code & 0b0_0000_1000_0000 != 0 {
        value |= 0b100_000_000_000; // A4
    }
    if code & 0b0_0000_0010_0000 != 0 {
        value |= 0b000_001_000_000; // B1
    }
    if code & 0b0_0000_0001_0000 != 0 {
        value |= 0b000_000_000_001; // D1
    }
    if code & 0b0_0000_0000_1000 != 0 {
        value |= 0b000_010_000_000; // B2
    }
    if code & 0b0_0000_0000_0100 != 0 {
        value |= 0b000_000_000_010; // D2
    }
    if code & 0b0_0000_0000_0010 != 0 {
        value |= 0b000_100_000_000; // B4
    }
    if code & 0b0_0000_0000_0001 != 0 {
        value |= 0b000_000_000_100; // D4
    }
    value
}

/// Decodes the 13-bit Gillham altitude code used in DF0/DF4/DF16/DF20 (Mode
/// C, not ADS-B).
///
/// ```text
/// bit:     0  1  2  3  4  5  6  7  8  9 10 11 12
/// input:  C1 A1 C2 A2 C4 A4  M B1  Q B2 D2 B4 D4
/// ```
///
/// Returns feet, or `None` for the two sentinel values meaning "no altitude"
/// (`0`) or M-bit-set (metric altitude, unsupported).
///
/// The Q bit selects between two unrelated encodings sharing this field: set,
/// the remaining bits are an 11-bit binary altitude in 25-ft increments;
/// clear, they are a 100-ft-increment Gillham (Mode C) code that must be
/// Gray-unscrambled first. Each path has its own feet-per-count and offset.
pub fn decode_gillham_ac13(code: u16) -> Option<i32> {
    if code == 0 {
        return None;
    }
    let m_bit = code & 0b0_0000_0100_0000 != 0;
    if m_bit {
        return None;
    }
    let q_bit = code & 0b0_0000_0001_0000 != 0;
    if q_bit {
        // 11-bit binary altitude: remove the M and Q bits, shift out the gap.
        let n = ((code & 0b1_1111_1000_0000) >> 2)
            | ((code & 0b0_0000_0010_0000) >> 1)
            | (code & 0b0_0000_0000_1111);
        return Some(i32::from(n) * 25 - 1_000);
    }

    let mut value = 0u16;
    if code & 0b1_0000_0000_0000 != 0 {
        value |= 0b00000000100; // C1
    }
    if code & 0b0_1000_0000_0000 != 0 {
        value |= 0b00100000000; // A1
    }
    if code & 0b0_0010_0000_0000 != 0 {
        value |= 0b00000000010; // C2
    }
    if code & 0b0_0001_0000_0000 != 0 {
        value |= 0b00010000000; // A2
    }
    if code & 0b0_0000_1000_0000 != 0 {
        value |= 0b00000000001; // C4
    }
    if code & 0b0_0000_0100_0000 != 0 {
        value |= 0b00001000000; // A4
    }
    if code & 0b0_0000_0010_0000 != 0 {
        value |= 0b00000100000; // B1
    }
    if code & 0b0_0000_0000_1000 != 0 {
        value |= 0b00000010000; // B2
    }
    if code & 0b0_0000_0000_0100 != 0 {
        value |= 0b00000000001; // D2
    }
    if code & 0b0_0000_0000_0010 != 0 {
        value |= 0b00000001000; // B4
    }
    if code & 0b0_0000_0000_0001 != 0 {
        value |= 0b01000000000; // D4
    }
    // 100-ft Gillham code: Gray-unscrambled value is a plain count, not a
    // 25-ft increment.
    Some(i32::from(value) * 100 - 1_200)
}

/// Decodes the 12-bit altitude code used in ADS-B `AirbornePosition` frames.
///
/// ```text
/// bit:     0  1  2  3  4  5  6  7  8  9 10 11
/// input:  C1 A1 C2 A2 C4 A4 B1  Q B2 D2 B4 D4
/// ```
///
/// Returns feet; same Q-bit-dependent dual encoding as
/// [`decode_gillham_ac13`], minus the M bit (absent in this 12-bit field).
pub fn decode_gillham_ac12(code: u16) -> Option<i32> {
    if code == 0 {
        return None;
    }
    let q_bit = code & 0b0000_0001_0000 != 0;
    if q_bit {
        let n = ((code & 0b1111_1110_0000) >> 1) | (code & 0b0000_0000_1111);
        return Some(i32::from(n) * 25 - 1_000);
    }

    // Gillham (Mode C) encoding, same layout minus the M bit (absent in the
    // 12-bit field).
    let mut value = 0u16;
    if code & 0b1000_0000_0000 != 0 {
        value |= 0b00000000100; // C1
    }
    if code & 0b0100_0000_0000 != 0 {
        value |= 0b00100000000; // A1
    }
    if code & 0b0010_0000_0000 != 0 {
        value |= 0b00000000010; // C2
    }
    if code & 0b0001_0000_0000 != 0 {
        value |= 0b00010000000; // A2
    }
    if code & 0b0000_1000_0000 != 0 {
        value |= 0b00000000001; // C4
    }
    if code & 0b0000_0100_0000 != 0 {
        value |= 0b00001000000; // A4
    }
    if code & 0b0000_0010_0000 != 0 {
        value |= 0b00000100000; // B1
    }
    if code & 0b0000_0000_1000 != 0 {
        value |= 0b00000010000; // B2
    }
    if code & 0b0000_0000_0100 != 0 {
        value |= 0b00000000001; // D2
    }
    if code & 0b0000_0000_0010 != 0 {
        value |= 0b00000001000; // B4
    }
    if code & 0b0000_0000_0001 != 0 {
        value |= 0b01000000000; // D4
    }
    Some(i32::from(value) * 100 - 1_200)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_id13() {
        assert_eq!(decode_gillham_id13(2214), 2882); // squawk 5502
        assert_eq!(decode_gillham_id13(2048), 512); // squawk 1000
        assert_eq!(decode_gillham_id13(5147), 413); // squawk 0635
    }

    #[test]
    fn ac12_q_bit_path_decodes_25ft_increments() {
        // Q-bit set: 11-bit binary altitude in 25-ft increments once the
        // M/Q bits are stripped out.
        let raw = 0b0000_0001_1010; // q-bit set, low nibble 0b1010
        let decoded = decode_gillham_ac12(raw).unwrap();
        assert_eq!(decoded, 10 * 25 - 1_000);
    }

    #[test]
    fn ac12_non_q_path_decodes_100ft_gillham_code() {
        // Q-bit clear: a 100-ft-increment Gillham code, Gray-unscrambled and
        // scaled as n*100-1200, not n*25-1000.
        let raw = 0b1000_0000_0000; // C1 only, q-bit clear
        let decoded = decode_gillham_ac12(raw).unwrap();
        assert_eq!(decoded, 4 * 100 - 1_200);
    }

    #[test]
    fn ac12_zero_is_unavailable() {
        assert_eq!(decode_gillham_ac12(0), None);
    }

    #[test]
    fn ac13_non_q_path_decodes_100ft_gillham_code() {
        let raw = 0b1_0000_0000_0000; // C1 only, m/q bits clear
        let decoded = decode_gillham_ac13(raw).unwrap();
        assert_eq!(decoded, 4 * 100 - 1_200);
    }
}
