//! Fixed-point base units for 18-decimal token amounts
//!
//! Every reserve, supply and trade amount handled by the engine is an integer
//! count of the smallest token unit (10^-18 of a nominal token). Values are
//! stored in an unsigned 256-bit integer and never pass through floating point.
//!
//! Examples:
//! - 1 token      = BaseUnits(1_000_000_000_000_000_000)
//! - 0.5 tokens   = BaseUnits(500_000_000_000_000_000)
//! - 1 base unit  = BaseUnits(1)

use crate::common::errors::FixedPointError;
use primitive_types::U256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unsigned 18-decimal fixed-point amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BaseUnits(pub U256);

impl BaseUnits {
    /// Decimal places of the fixed-point scale
    pub const DECIMALS: u32 = 18;

    /// Zero base units
    pub const ZERO: Self = Self(U256([0; 4]));

    /// A single base unit (10^-18 tokens)
    pub const ONE_UNIT: Self = Self(U256([1, 0, 0, 0]));

    /// Scale factor between nominal tokens and base units (10^18)
    pub fn scale() -> U256 {
        U256::exp10(Self::DECIMALS as usize)
    }

    /// Wrap a raw base-unit integer
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Whole nominal tokens, e.g. `from_whole(5)` is 5 * 10^18 base units
    pub fn from_whole(tokens: u64) -> Self {
        Self(U256::from(tokens) * Self::scale())
    }

    /// Parse a raw base-unit integer string such as `"1500000000000000000"`.
    ///
    /// This is the interchange format used by chain-state readers.
    pub fn from_raw_str(s: &str) -> Result<Self, FixedPointError> {
        let trimmed = s.trim();
        if trimmed.starts_with('-') {
            return Err(FixedPointError::Negative {
                input: s.to_string(),
            });
        }
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FixedPointError::InvalidDecimal {
                input: s.to_string(),
            });
        }

        U256::from_dec_str(trimmed)
            .map(Self)
            .map_err(|_| FixedPointError::Overflow {
                input: s.to_string(),
            })
    }

    /// Parse a nominal decimal string such as `"1.5"` into base units.
    ///
    /// Rejects negative values and more than 18 fractional digits rather
    /// than silently truncating them.
    ///
    /// # Examples
    /// ```
    /// use yieldspace_types::BaseUnits;
    ///
    /// let amount = BaseUnits::from_decimal_str("1.5").unwrap();
    /// assert_eq!(amount.to_string(), "1500000000000000000");
    /// ```
    pub fn from_decimal_str(s: &str) -> Result<Self, FixedPointError> {
        let trimmed = s.trim();
        if trimmed.starts_with('-') {
            return Err(FixedPointError::Negative {
                input: s.to_string(),
            });
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction)
        {
            return Err(FixedPointError::InvalidDecimal {
                input: s.to_string(),
            });
        }

        if fraction.len() > Self::DECIMALS as usize {
            return Err(FixedPointError::PrecisionLoss {
                input: s.to_string(),
                max_decimals: Self::DECIMALS,
            });
        }

        let mut digits = String::with_capacity(whole.len() + Self::DECIMALS as usize);
        digits.push_str(whole);
        digits.push_str(fraction);
        for _ in fraction.len()..Self::DECIMALS as usize {
            digits.push('0');
        }

        let significant = digits.trim_start_matches('0');
        if significant.is_empty() {
            return Ok(Self::ZERO);
        }

        U256::from_dec_str(significant)
            .map(Self)
            .map_err(|_| FixedPointError::Overflow {
                input: s.to_string(),
            })
    }

    /// Get the raw base-unit integer
    pub fn raw(self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition - returns an error on 256-bit overflow
    pub fn checked_add(self, rhs: Self) -> Result<Self, FixedPointError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(FixedPointError::OutOfRange {
                operation: "addition",
            })
    }

    /// Checked subtraction - returns an error when the result would be negative
    pub fn checked_sub(self, rhs: Self) -> Result<Self, FixedPointError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(FixedPointError::OutOfRange {
                operation: "subtraction",
            })
    }

    /// Nominal decimal rendering, e.g. `"1.5"` for 1.5 * 10^18 base units.
    ///
    /// For display only; trailing fractional zeros are trimmed.
    pub fn to_decimal_string(&self) -> String {
        let raw = self.0.to_string();
        let decimals = Self::DECIMALS as usize;

        let (whole, fraction) = if raw.len() > decimals {
            let split = raw.len() - decimals;
            (raw[..split].to_string(), raw[split..].to_string())
        } else {
            ("0".to_string(), format!("{:0>width$}", raw, width = decimals))
        };

        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            whole
        } else {
            format!("{}.{}", whole, fraction)
        }
    }
}

/// Raw integer rendering, the interchange format
impl fmt::Display for BaseUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BaseUnits {
    type Err = FixedPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_raw_str(s)
    }
}

impl From<u64> for BaseUnits {
    fn from(raw: u64) -> Self {
        Self(U256::from(raw))
    }
}

impl From<u128> for BaseUnits {
    fn from(raw: u128) -> Self {
        Self(U256::from(raw))
    }
}

/// Serialized as the raw integer string so JSON consumers never see a float
impl Serialize for BaseUnits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for BaseUnits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_raw_str(&raw).map_err(de::Error::custom)
    }
}
