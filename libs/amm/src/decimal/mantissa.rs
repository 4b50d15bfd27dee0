//! Big-integer coefficient backends for [`BigDecimal`](super::BigDecimal)
//!
//! The coefficient of every decimal is an unsigned 512-bit integer. Two
//! independently implemented integer crates back it:
//!
//! | Backend | Integer type | Working digits |
//! |---------|--------------|----------------|
//! | Precise | `primitive_types::U512` | 72 |
//! | Reference | `alloy_primitives::Uint<512, 8>` (ruint) | 70 |
//!
//! `DIGITS` is capped at 74: the widest intermediate is an aligned addition
//! or a division numerator of `2 * DIGITS + 2` digits, which must stay below
//! 10^154 (the largest power of ten under 2^512).

use std::fmt;
use std::ops::{Add, Div, Mul, Rem, Sub};

/// Coefficient storage for the decimal engine
pub trait Mantissa:
    Copy
    + Ord
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Rem<Output = Self>
{
    /// Significant decimal digits kept after every operation
    const DIGITS: u32;

    /// Backend label used in logs and benchmarks
    const NAME: &'static str;

    fn from_u64(value: u64) -> Self;

    /// Parse a plain base-10 digit string; `None` on overflow or bad input
    fn parse_decimal(digits: &str) -> Option<Self>;

    /// Number of significant bits (0 for zero)
    fn bit_length(&self) -> u32;

    fn is_zero_value(&self) -> bool;

    /// Lowest 64-bit limb
    fn low_u64(&self) -> u64;

    fn zero() -> Self {
        Self::from_u64(0)
    }

    fn one() -> Self {
        Self::from_u64(1)
    }

    fn from_u128(value: u128) -> Self {
        let high = Self::from_u64((value >> 64) as u64);
        let low = Self::from_u64(value as u64);
        let shift = Self::from_u64(1 << 32);
        high * shift * shift + low
    }

    /// 10^exp, built from 10^19 chunks so it works on any backend
    fn pow10(exp: u32) -> Self {
        const CHUNK: u32 = 19;
        let chunk = Self::from_u64(10_000_000_000_000_000_000);

        let mut result = Self::one();
        let mut remaining = exp;
        while remaining >= CHUNK {
            result = result * chunk;
            remaining -= CHUNK;
        }
        result * Self::from_u64(10u64.pow(remaining))
    }

    /// Number of base-10 digits (0 for zero)
    fn digit_count(&self) -> u32 {
        if self.is_zero_value() {
            return 0;
        }
        // log10(2) lower bound keeps the estimate at or below the true count
        let mut digits = (self.bit_length() - 1) * 30_102 / 100_000 + 1;
        while *self >= Self::pow10(digits) {
            digits += 1;
        }
        digits
    }
}

impl Mantissa for primitive_types::U512 {
    const DIGITS: u32 = 72;
    const NAME: &'static str = "primitive-types";

    fn from_u64(value: u64) -> Self {
        primitive_types::U512::from(value)
    }

    fn parse_decimal(digits: &str) -> Option<Self> {
        primitive_types::U512::from_dec_str(digits).ok()
    }

    fn bit_length(&self) -> u32 {
        self.bits() as u32
    }

    fn is_zero_value(&self) -> bool {
        self.is_zero()
    }

    fn low_u64(&self) -> u64 {
        primitive_types::U512::low_u64(self)
    }
}

/// ruint's 512-bit integer as re-exported by alloy
pub type RuintU512 = alloy_primitives::Uint<512, 8>;

impl Mantissa for RuintU512 {
    const DIGITS: u32 = 70;
    const NAME: &'static str = "ruint";

    fn from_u64(value: u64) -> Self {
        RuintU512::from(value)
    }

    fn parse_decimal(digits: &str) -> Option<Self> {
        RuintU512::from_str_radix(digits, 10).ok()
    }

    fn bit_length(&self) -> u32 {
        self.bit_len() as u32
    }

    fn is_zero_value(&self) -> bool {
        self.is_zero()
    }

    fn low_u64(&self) -> u64 {
        self.as_limbs()[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U512;

    fn check_backend<M: Mantissa>() {
        assert_eq!(M::zero().digit_count(), 0);
        assert_eq!(M::one().digit_count(), 1);
        assert_eq!(M::from_u64(9).digit_count(), 1);
        assert_eq!(M::from_u64(10).digit_count(), 2);
        assert_eq!(M::from_u64(u64::MAX).digit_count(), 20);

        for exp in [1u32, 18, 19, 38, 72, 150] {
            let power = M::pow10(exp);
            assert_eq!(power.digit_count(), exp + 1);
            assert_eq!((power - M::one()).digit_count(), exp);
        }

        let parsed = M::parse_decimal("123456789012345678901234567890").unwrap();
        assert_eq!(parsed.to_string(), "123456789012345678901234567890");
        assert!(M::parse_decimal("12a").is_none());

        let wide = M::from_u128(u128::MAX);
        assert_eq!(wide.to_string(), u128::MAX.to_string());
        assert_eq!(M::from_u64(77).low_u64(), 77);
    }

    #[test]
    fn test_primitive_types_backend() {
        check_backend::<U512>();
        assert_eq!(U512::pow10(40), U512::exp10(40));
    }

    #[test]
    fn test_ruint_backend() {
        check_backend::<RuintU512>();
        assert_eq!(
            <RuintU512 as Mantissa>::pow10(40).to_string(),
            U512::exp10(40).to_string()
        );
    }

    #[test]
    fn test_digit_budget_fits_512_bits() {
        let widest = 2 * U512::DIGITS.max(RuintU512::DIGITS) + 3;
        assert!(widest <= 154);
        // six digits of series loss on top of the 64-digit floor
        assert!(U512::DIGITS.min(RuintU512::DIGITS) >= 70);
        assert!(U512::pow10(153) < U512::MAX / U512::from(10u64));
    }
}
