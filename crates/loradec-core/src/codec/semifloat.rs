//! Signed 16-bit "semi-float" values.
//!
//! Bit layout, most significant first:
//! - bit 15: sign
//! - bits 14..=11: exponent, biased by 15
//! - bits 10..=0: mantissa, not normalized (no implicit leading one)
//!
//! A pattern decodes to `sign * (mantissa / 2048) * 2^(exponent - 15)`, which
//! keeps every value inside the open interval (-1.0, 1.0). Devices use it for
//! readings that were pre-divided by a fixed factor (usually 100).

pub const NEGATIVE_ZERO: u16 = 0x8000;
/// Largest positive pattern; the encoder saturates to it.
pub const MAX_POSITIVE: u16 = 0x7fff;
/// Largest negative pattern; the encoder saturates to it.
pub const MAX_NEGATIVE: u16 = 0xffff;

const SIGN_MASK: u16 = 0x8000;
const EXPONENT_SHIFT: u32 = 11;
const EXPONENT_MASK: u16 = 0x000f;
const MANTISSA_MASK: u16 = 0x07ff;
const MANTISSA_SCALE: f64 = 2048.0;
const EXPONENT_BIAS: i32 = 15;
const MANTISSA_BITS: i32 = 11;
const MANTISSA_MIN_NORMAL: f64 = 1024.0;

/// Decode a semi-float bit pattern.
///
/// # Examples
/// ```
/// use loradec_core::codec::decode_semi_float;
///
/// assert_eq!(decode_semi_float(0x7c00), 0.5);
/// assert_eq!(decode_semi_float(0xf400), -0.25);
/// assert!(decode_semi_float(0x8000).is_sign_negative());
/// ```
pub fn decode_semi_float(raw: u16) -> f64 {
    if raw == NEGATIVE_ZERO {
        return -0.0;
    }
    let sign = if raw & SIGN_MASK != 0 { -1.0 } else { 1.0 };
    let exponent = i32::from((raw >> EXPONENT_SHIFT) & EXPONENT_MASK);
    let fraction = f64::from(raw & MANTISSA_MASK) / MANTISSA_SCALE;
    sign * fraction * 2f64.powi(exponent - EXPONENT_BIAS)
}

/// Decode the low 16 bits of a wider integer as a semi-float.
///
/// Upper bits are discarded, so this is total over `u32`.
pub fn decode_semi_float_bits(raw: u32) -> f64 {
    decode_semi_float((raw & 0xffff) as u16)
}

/// Encode a value into the semi-float layout, as the device firmware does.
///
/// Values at or beyond +/-1.0 saturate, NaN encodes as zero, and magnitudes
/// below the smallest exponent lose mantissa bits until they reach zero.
///
/// # Examples
/// ```
/// use loradec_core::codec::{decode_semi_float, encode_semi_float};
///
/// assert_eq!(encode_semi_float(0.5), 0x7c00);
/// assert_eq!(encode_semi_float(2.0), 0x7fff);
/// let reading = 0.2345;
/// assert!((decode_semi_float(encode_semi_float(reading)) - reading).abs() < 1e-3);
/// ```
pub fn encode_semi_float(value: f64) -> u16 {
    if value.is_nan() {
        return 0;
    }
    if value >= 1.0 {
        return MAX_POSITIVE;
    }
    if value <= -1.0 {
        return MAX_NEGATIVE;
    }

    let sign = if value.is_sign_negative() { SIGN_MASK } else { 0 };
    let magnitude = value.abs();
    if magnitude == 0.0 {
        return sign;
    }

    let mut biased = (binary_exponent(magnitude) + EXPONENT_BIAS).max(0);
    let mut mantissa = scaled_mantissa(magnitude, biased);
    if mantissa >= MANTISSA_SCALE {
        if biased == EXPONENT_BIAS {
            return sign | MAX_POSITIVE;
        }
        biased += 1;
        mantissa = MANTISSA_MIN_NORMAL;
    }

    sign | ((biased as u16) << EXPONENT_SHIFT) | (mantissa as u16 & MANTISSA_MASK)
}

// Exponent `e` such that `magnitude = f * 2^e` with `f` in [0.5, 1).
fn binary_exponent(magnitude: f64) -> i32 {
    let mut exponent = magnitude.log2().floor() as i32 + 1;
    let normal = magnitude * 2f64.powi(-exponent);
    if normal >= 1.0 {
        exponent += 1;
    } else if normal < 0.5 {
        exponent -= 1;
    }
    exponent
}

fn scaled_mantissa(magnitude: f64, biased: i32) -> f64 {
    (magnitude * 2f64.powi(MANTISSA_BITS + EXPONENT_BIAS - biased)).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_patterns_keep_their_sign() {
        let positive = decode_semi_float(0x0000);
        let negative = decode_semi_float(0x8000);
        assert_eq!(positive, 0.0);
        assert!(positive.is_sign_positive());
        assert_eq!(negative, 0.0);
        assert!(negative.is_sign_negative());
        assert_ne!(positive.to_bits(), negative.to_bits());
    }

    #[test]
    fn exponent_zero_uses_smallest_scale() {
        // mantissa 0x400 = 1024 -> 0.5 * 2^-15
        assert_eq!(decode_semi_float(0x0400), 0.5 * 2f64.powi(-15));
        assert_eq!(decode_semi_float(0x0001), 2f64.powi(-26));
        assert_eq!(decode_semi_float(0x8001), -(2f64.powi(-26)));
    }

    #[test]
    fn exponent_fifteen_uses_unit_scale() {
        assert_eq!(decode_semi_float(0x7c00), 0.5);
        assert_eq!(decode_semi_float(0x7fff), 2047.0 / 2048.0);
        assert_eq!(decode_semi_float(0xffff), -2047.0 / 2048.0);
    }

    #[test]
    fn zero_mantissa_decodes_to_zero_for_any_exponent() {
        assert_eq!(decode_semi_float(0x4000), 0.0);
        assert_eq!(decode_semi_float(0x7800), 0.0);
    }

    #[test]
    fn mantissa_high_bit_is_not_an_exponent_bit() {
        // 0x4400: exponent 8, mantissa 0x400
        assert_eq!(decode_semi_float(0x4400), 0.5 * 2f64.powi(-7));
    }

    #[test]
    fn bit_fields_are_extracted_independently() {
        // exponent 0b1000 = 8, mantissa 0b101_0000_0000 = 1280
        let expected = 1280.0 / 2048.0 * 2f64.powi(8 - 15);
        assert_eq!(decode_semi_float(0x4500), expected);
        assert_eq!(decode_semi_float(0xc500), -expected);
    }

    #[test]
    fn every_pattern_is_inside_open_unit_interval() {
        for raw in 0..=u16::MAX {
            let value = decode_semi_float(raw);
            assert!(value > -1.0 && value < 1.0, "pattern {raw:#06x} -> {value}");
            assert!(value.is_finite());
        }
    }

    #[test]
    fn decoding_is_deterministic() {
        for raw in [0x0000, 0x0001, 0x4500, 0x7fff, 0x8000, 0xabcd, 0xffff] {
            assert_eq!(
                decode_semi_float(raw).to_bits(),
                decode_semi_float(raw).to_bits()
            );
        }
    }

    #[test]
    fn wide_input_is_masked() {
        assert_eq!(decode_semi_float_bits(0x0001_7c00), 0.5);
        assert!(decode_semi_float_bits(0xffff_8000).is_sign_negative());
        assert_eq!(decode_semi_float_bits(0xdead_0000), 0.0);
    }

    #[test]
    fn encode_saturates_out_of_range_values() {
        assert_eq!(encode_semi_float(1.0), MAX_POSITIVE);
        assert_eq!(encode_semi_float(42.0), MAX_POSITIVE);
        assert_eq!(encode_semi_float(-1.0), MAX_NEGATIVE);
        assert_eq!(encode_semi_float(f64::NEG_INFINITY), MAX_NEGATIVE);
        assert_eq!(encode_semi_float(0.99999), MAX_POSITIVE);
    }

    #[test]
    fn encode_handles_zero_and_nan() {
        assert_eq!(encode_semi_float(0.0), 0x0000);
        assert_eq!(encode_semi_float(-0.0), NEGATIVE_ZERO);
        assert_eq!(encode_semi_float(f64::NAN), 0x0000);
    }

    #[test]
    fn encode_matches_known_patterns() {
        assert_eq!(encode_semi_float(0.5), 0x7c00);
        assert_eq!(encode_semi_float(-0.25), 0xf400);
        assert_eq!(encode_semi_float(0.5 * 2f64.powi(-15)), 0x0400);
    }

    #[test]
    fn encode_underflows_gradually() {
        assert_eq!(encode_semi_float(2f64.powi(-26)), 0x0001);
        assert_eq!(encode_semi_float(2f64.powi(-30)), 0x0000);
        assert_eq!(encode_semi_float(-(2f64.powi(-30))), NEGATIVE_ZERO);
    }

    #[test]
    fn decode_of_encode_stays_within_one_step() {
        for value in [0.2345, -0.2345, 0.7, -0.999, 0.0123, 1e-4, -3.3e-5] {
            let decoded = decode_semi_float(encode_semi_float(value));
            let tolerance = value.abs() / 1024.0 + 2f64.powi(-26);
            assert!(
                (decoded - value).abs() <= tolerance,
                "{value} decoded as {decoded}"
            );
        }
    }
}
