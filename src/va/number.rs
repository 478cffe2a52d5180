//! # Byte-Comparable Number Encoding
//!
//! Payload encodings for integers and IEEE floats whose unsigned
//! lexicographic byte order equals numeric order.
//!
//! ## Integer Selector Scheme
//!
//! Integers of every width share one encoding over the domain
//! `[i64::MIN, u64::MAX]`, computed in `i128`. A selector byte jointly
//! encodes sign and magnitude length, followed by the big-endian, biased
//! magnitude:
//!
//! ```text
//! selector      meaning                       payload after selector
//! 0x01..=0x08   v <= -120, 8..1 bytes         !(-120 - v), n bytes BE
//! 0x09..=0xF7   -119 <= v <= 119 (folded)     none
//! 0xF8..=0xFF   v >= 120, 1..8 bytes          v - 120, n bytes BE
//! ```
//!
//! Longer negative magnitudes get smaller selectors and longer positive
//! magnitudes get larger ones, so the selector alone orders values of
//! different lengths. Within one length, the complemented (negative) or
//! plain (positive) big-endian magnitude orders the rest.
//!
//! ```text
//! -128 -> 08 F7      -1 -> 7F      0 -> 80      1 -> 81
//!  127 -> F8 07     128 -> F8 08
//! ```
//!
//! ## Float Encoding
//!
//! IEEE 754 bit manipulation preserves ordering:
//! - Non-negative sign bit: flip the sign bit (bits ^ SIGN)
//! - Negative sign bit: invert all bits (!bits)
//!
//! Stored big-endian. The resulting order is `total_cmp` order, so `-0.0`
//! sorts just below `+0.0` and NaNs sort at the extremes by sign.

use eyre::{bail, ensure, Result};

use crate::config::{
    INT_FOLD_CENTER, INT_FOLD_MAX, INT_FOLD_MIN, INT_MAX_MAGNITUDE_LEN, INT_NEG_BASE,
    INT_POS_BASE,
};

/// Smallest integer the codec accepts.
pub const INT_DOMAIN_MIN: i128 = i64::MIN as i128;
/// Largest integer the codec accepts.
pub const INT_DOMAIN_MAX: i128 = u64::MAX as i128;

const F32_SIGN: u32 = 1 << 31;
const F64_SIGN: u64 = 1 << 63;

#[inline]
fn magnitude_len(m: u64) -> usize {
    (INT_MAX_MAGNITUDE_LEN - (m.leading_zeros() as usize / 8)).max(1)
}

/// Payload length of the integer encoding of `value`.
#[inline]
pub fn int_payload_len(value: i128) -> usize {
    if (INT_FOLD_MIN..=INT_FOLD_MAX).contains(&value) {
        1
    } else if value > INT_FOLD_MAX {
        1 + magnitude_len((value - INT_FOLD_MAX - 1) as u64)
    } else {
        1 + magnitude_len((INT_FOLD_MIN - 1 - value) as u64)
    }
}

/// Appends the integer payload (no VA header) to `out`.
pub fn encode_int_to(value: i128, out: &mut Vec<u8>) {
    debug_assert!(
        (INT_DOMAIN_MIN..=INT_DOMAIN_MAX).contains(&value),
        "integer {} outside the encodable domain",
        value
    );

    if (INT_FOLD_MIN..=INT_FOLD_MAX).contains(&value) {
        out.push((INT_FOLD_CENTER as i128 + value) as u8);
    } else if value > INT_FOLD_MAX {
        let m = (value - INT_FOLD_MAX - 1) as u64;
        let n = magnitude_len(m);
        out.push(INT_POS_BASE + n as u8);
        out.extend_from_slice(&m.to_be_bytes()[INT_MAX_MAGNITUDE_LEN - n..]);
    } else {
        let m = (INT_FOLD_MIN - 1 - value) as u64;
        let n = magnitude_len(m);
        out.push(INT_NEG_BASE - n as u8);
        out.extend_from_slice(&(!m).to_be_bytes()[INT_MAX_MAGNITUDE_LEN - n..]);
    }
}

/// Decodes an integer payload produced by [`encode_int_to`].
pub fn decode_int(payload: &[u8]) -> Result<i128> {
    ensure!(!payload.is_empty(), "empty integer payload");

    let selector = payload[0];
    let body = &payload[1..];

    if selector > INT_POS_BASE {
        let n = (selector - INT_POS_BASE) as usize;
        ensure!(
            body.len() == n,
            "integer selector 0x{:02x} expects {} bytes, got {}",
            selector,
            n,
            body.len()
        );
        Ok(be_u64(body) as i128 + INT_FOLD_MAX + 1)
    } else if selector >= INT_NEG_BASE {
        ensure!(
            body.is_empty(),
            "folded integer selector 0x{:02x} has {} trailing bytes",
            selector,
            body.len()
        );
        Ok(selector as i128 - INT_FOLD_CENTER as i128)
    } else if selector > 0 {
        let n = (INT_NEG_BASE - selector) as usize;
        ensure!(
            body.len() == n,
            "integer selector 0x{:02x} expects {} bytes, got {}",
            selector,
            n,
            body.len()
        );
        let m = !be_u64(body) & low_mask(n);
        Ok(INT_FOLD_MIN - 1 - m as i128)
    } else {
        bail!("invalid integer selector 0x{:02x}", selector)
    }
}

#[inline]
fn be_u64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

#[inline]
fn low_mask(n: usize) -> u64 {
    if n >= INT_MAX_MAGNITUDE_LEN {
        u64::MAX
    } else {
        (1u64 << (8 * n)) - 1
    }
}

#[inline]
pub fn f32_to_key_bits(value: f32) -> u32 {
    let bits = value.to_bits();
    if bits & F32_SIGN == 0 {
        bits ^ F32_SIGN
    } else {
        !bits
    }
}

#[inline]
pub fn f64_to_key_bits(value: f64) -> u64 {
    let bits = value.to_bits();
    if bits & F64_SIGN == 0 {
        bits ^ F64_SIGN
    } else {
        !bits
    }
}

pub fn encode_f32_to(value: f32, out: &mut Vec<u8>) {
    out.extend_from_slice(&f32_to_key_bits(value).to_be_bytes());
}

pub fn encode_f64_to(value: f64, out: &mut Vec<u8>) {
    out.extend_from_slice(&f64_to_key_bits(value).to_be_bytes());
}

pub fn decode_f32(payload: &[u8]) -> Result<f32> {
    let bytes: [u8; 4] = payload
        .try_into()
        .map_err(|_| eyre::eyre!("float payload must be 4 bytes, got {}", payload.len()))?;
    let k = u32::from_be_bytes(bytes);
    let bits = if k & F32_SIGN != 0 { k ^ F32_SIGN } else { !k };
    Ok(f32::from_bits(bits))
}

pub fn decode_f64(payload: &[u8]) -> Result<f64> {
    let bytes: [u8; 8] = payload
        .try_into()
        .map_err(|_| eyre::eyre!("double payload must be 8 bytes, got {}", payload.len()))?;
    let k = u64::from_be_bytes(bytes);
    let bits = if k & F64_SIGN != 0 { k ^ F64_SIGN } else { !k };
    Ok(f64::from_bits(bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(v: i128) -> Vec<u8> {
        let mut out = Vec::new();
        encode_int_to(v, &mut out);
        out
    }

    #[test]
    fn small_values_fold_into_selector() {
        assert_eq!(enc(0), vec![0x80]);
        assert_eq!(enc(1), vec![0x81]);
        assert_eq!(enc(-1), vec![0x7F]);
        assert_eq!(enc(119), vec![0xF7]);
        assert_eq!(enc(-119), vec![0x09]);
    }

    #[test]
    fn boundary_values_use_one_magnitude_byte() {
        assert_eq!(enc(120), vec![0xF8, 0x00]);
        assert_eq!(enc(127), vec![0xF8, 0x07]);
        assert_eq!(enc(128), vec![0xF8, 0x08]);
        assert_eq!(enc(-120), vec![0x08, 0xFF]);
        assert_eq!(enc(-128), vec![0x08, 0xF7]);
    }

    #[test]
    fn concrete_sequence_is_strictly_increasing() {
        let values = [-128i128, -1, 0, 1, 127, 128];
        let encoded: Vec<Vec<u8>> = values.iter().map(|&v| enc(v)).collect();
        for pair in encoded.windows(2) {
            assert!(pair[0] < pair[1], "{:02x?} !< {:02x?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn extremes_use_eight_magnitude_bytes() {
        let min = enc(i64::MIN as i128);
        assert_eq!(min[0], 0x01);
        assert_eq!(min.len(), 9);

        let max = enc(u64::MAX as i128);
        assert_eq!(max[0], 0xFF);
        assert_eq!(max.len(), 9);

        assert_eq!(decode_int(&min).unwrap(), i64::MIN as i128);
        assert_eq!(decode_int(&max).unwrap(), u64::MAX as i128);
    }

    #[test]
    fn length_transitions_stay_ordered() {
        let values = [
            -(1i128 << 40),
            -65_656,
            -65_655,
            -376,
            -375,
            -121,
            375,
            376,
            65_655,
            65_656,
            1i128 << 40,
        ];
        for pair in values.windows(2) {
            let (a, b) = (enc(pair[0]), enc(pair[1]));
            assert!(a < b, "{} -> {:02x?} !< {} -> {:02x?}", pair[0], a, pair[1], b);
            assert_eq!(decode_int(&a).unwrap(), pair[0]);
        }
    }

    #[test]
    fn payload_len_matches_encoding() {
        for v in [-1i128 << 63, -300, -120, 0, 119, 120, 70_000, u64::MAX as i128] {
            assert_eq!(int_payload_len(v), enc(v).len());
        }
    }

    #[test]
    fn decode_rejects_malformed_payloads() {
        assert!(decode_int(&[]).is_err());
        assert!(decode_int(&[0x00]).is_err());
        assert!(decode_int(&[0xF9, 0x01]).is_err());
        assert!(decode_int(&[0x80, 0x01]).is_err());
    }

    #[test]
    fn floats_order_like_total_cmp() {
        let values = [
            f64::NEG_INFINITY,
            -1e300,
            -1.5,
            -0.0,
            0.0,
            f64::MIN_POSITIVE,
            2.5,
            f64::INFINITY,
        ];
        for pair in values.windows(2) {
            let (mut a, mut b) = (Vec::new(), Vec::new());
            encode_f64_to(pair[0], &mut a);
            encode_f64_to(pair[1], &mut b);
            assert!(a < b, "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn floats_round_trip_bit_exact() {
        for v in [0.0f32, -0.0, 1.25, -7.5, f32::MAX, f32::NAN] {
            let mut out = Vec::new();
            encode_f32_to(v, &mut out);
            assert_eq!(decode_f32(&out).unwrap().to_bits(), v.to_bits());
        }
        for v in [0.0f64, -0.0, 1e-300, -42.0, f64::NAN] {
            let mut out = Vec::new();
            encode_f64_to(v, &mut out);
            assert_eq!(decode_f64(&out).unwrap().to_bits(), v.to_bits());
        }
    }

    #[test]
    fn float_decode_rejects_wrong_width() {
        assert!(decode_f32(&[0; 3]).is_err());
        assert!(decode_f64(&[0; 4]).is_err());
    }
}
