//! Unit conversion helpers.
//!
//! The suggestion engine does its statistics in `f64` at gwei scale and
//! converts back to wei at the API boundary. A double's 53-bit mantissa is
//! wide enough that realistic fee values survive the round trip to the
//! precision suggestions are published at.

use ethereum_types::U256;

/// Number of wei in one gwei.
pub const GWEI_TO_WEI: u64 = 1_000_000_000;

/// Serializes a serializable into a `serde_json::Value`
pub(crate) fn serialize<T: serde::Serialize>(t: &T) -> serde_json::Value {
    serde_json::to_value(t).expect("Types never fail to serialize.")
}

/// Converts a wei amount to gwei, as a float.
pub fn wei_to_gwei(wei: U256) -> f64 {
    u256_to_f64(wei) / GWEI_TO_WEI as f64
}

/// Converts a gwei-scale float back to wei, rounding to the nearest wei.
///
/// Negative, NaN and infinite inputs saturate to zero / `U256::max_value()`.
pub fn gwei_to_wei(gwei: f64) -> U256 {
    if gwei.is_nan() || gwei <= 0.0 {
        return U256::zero()
    }
    u256_from_f64_saturating(gwei * GWEI_TO_WEI as f64)
}

/// Lossy conversion from a [`U256`] to the nearest `f64`.
pub fn u256_to_f64(value: U256) -> f64 {
    let U256(limbs) = value;
    limbs
        .iter()
        .enumerate()
        .map(|(i, &limb)| limb as f64 * 2f64.powi(64 * i as i32))
        .sum()
}

/// Convert a floating point value to its nearest [`U256`] integer.
///
/// It is saturating, so values $\ge 2^{256}$ will be rounded to
/// [`U256::max_value()`] and values $< 0$ to zero. This includes positive
/// and negative infinity.
///
/// # Panics
///
/// Panics if `f` is NaN.
pub fn u256_from_f64_saturating(mut f: f64) -> U256 {
    if f.is_nan() {
        panic!("NaN is not a valid value for U256");
    }
    if f < 0.5 {
        return U256::zero()
    }
    if f >= 1.157_920_892_373_162e77_f64 {
        return U256::max_value()
    }
    // All non-normal cases should have been handled above
    assert!(f.is_normal());
    // Turn nearest rounding into truncated rounding
    f += 0.5;

    // Parse IEEE-754 double into U256
    // Sign should be zero, exponent should be >= 0.
    let bits = f.to_bits();
    let sign = bits >> 63;
    assert!(sign == 0);
    let biased_exponent = (bits >> 52) & 0x7ff;
    assert!(biased_exponent >= 1023);
    let exponent = biased_exponent - 1023;
    let fraction = bits & 0xfffffffffffff;
    let mantissa = 0x10000000000000 | fraction;
    if exponent > 255 {
        U256::max_value()
    } else if exponent < 52 {
        // Truncate mantissa
        U256([mantissa, 0, 0, 0]) >> (52 - exponent)
    } else {
        U256([mantissa, 0, 0, 0]) << (exponent - 52)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gwei_round_trips_through_wei() {
        // values picked across the magnitudes the engine publishes at
        for wei in [1u64, 1_000_000_000, 1_500_000_000, 23_149_734_459, 87_000_000_000_000] {
            let wei = U256::from(wei);
            assert_eq!(gwei_to_wei(wei_to_gwei(wei)), wei);
        }
    }

    #[test]
    fn gwei_conversion_scales() {
        assert_eq!(wei_to_gwei(U256::from(GWEI_TO_WEI)), 1.0);
        assert_eq!(gwei_to_wei(1.5), U256::from(1_500_000_000u64));
        assert_eq!(gwei_to_wei(0.0), U256::zero());
        assert_eq!(gwei_to_wei(-3.0), U256::zero());
        assert_eq!(gwei_to_wei(f64::NAN), U256::zero());
    }

    #[test]
    fn test_small_integers() {
        for i in 0..=255 {
            let f = i as f64;
            let u = u256_from_f64_saturating(f);
            assert_eq!(u, U256::from(i));
        }
    }

    #[test]
    fn test_small_integers_round_down() {
        for i in 0..=255 {
            let f = (i as f64) + 0.499;
            let u = u256_from_f64_saturating(f);
            assert_eq!(u, U256::from(i));
        }
    }

    #[test]
    fn test_infinities() {
        assert_eq!(u256_from_f64_saturating(f64::INFINITY), U256::max_value());
        assert_eq!(u256_from_f64_saturating(f64::NEG_INFINITY), U256::zero());
    }

    #[test]
    fn test_saturating() {
        assert_eq!(u256_from_f64_saturating(-1.0), U256::zero());
        assert_eq!(u256_from_f64_saturating(1e90_f64), U256::max_value());
    }

    #[test]
    fn u256_to_f64_covers_wide_values() {
        assert_eq!(u256_to_f64(U256::zero()), 0.0);
        assert_eq!(u256_to_f64(U256::from(1u64) << 60), 2f64.powi(60));
        assert_eq!(u256_to_f64(U256::from(12_345u64)), 12_345.0);
    }
}
