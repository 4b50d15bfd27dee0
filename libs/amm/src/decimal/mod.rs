//! Arbitrary-precision decimal engine
//!
//! `rust_decimal` tops out at 28 significant digits, which is not enough to
//! raise 18-decimal reserves to a fractional power and floor the result to
//! the exact base unit. [`BigDecimal`] keeps a sign, a 512-bit integer
//! coefficient and a base-10 exponent, and rounds half-up to
//! [`Mantissa::DIGITS`] significant digits after every operation.
//!
//! Fractional powers go through `exp(y * ln x)`:
//! - `ln` reduces the argument to `[1, 10)` by its decimal exponent, takes
//!   square roots until it is within 5% of one, then sums the `atanh` series
//! - `exp` reduces by multiples of `ln 10`, divides by 2^8, sums the Taylor
//!   series and squares back up
//!
//! Both series stop once a term no longer moves the working precision, so
//! results carry roughly `DIGITS - 6` correct digits: 66 on the precise
//! backend and 64 on the reference backend, enough to floor curve outputs
//! exactly.

pub mod mantissa;

use crate::errors::{Result, YieldMathError};
use mantissa::Mantissa;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;
use yieldspace_types::BaseUnits;

pub use mantissa::RuintU512;

/// Coefficient type of the default 72-digit backend
pub type PreciseMantissa = primitive_types::U512;

/// Coefficient type of the independent 70-digit backend
pub type ReferenceMantissa = RuintU512;

pub type PreciseDecimal = BigDecimal<PreciseMantissa>;
pub type ReferenceDecimal = BigDecimal<ReferenceMantissa>;

/// ln(10) to 120 digits, truncated to the backend precision on parse
const LN_10: &str = "2.30258509299404568401799145468436420760110148862877297603332790096757260967735248023599720508959829834196778404228624863";

/// Decimal exponents beyond this are rejected as a precision failure
const MAX_EXPONENT: i64 = 1_000_000;

/// Argument halvings applied before the `exp` Taylor series
const EXP_HALVINGS: u32 = 8;

const MAX_SQRT_ITERATIONS: usize = 200;

/// Signed decimal `(-1)^negative * coefficient * 10^exponent`
#[derive(Clone, Copy)]
pub struct BigDecimal<M: Mantissa> {
    negative: bool,
    coefficient: M,
    exponent: i32,
}

impl<M: Mantissa> BigDecimal<M> {
    pub fn zero() -> Self {
        Self {
            negative: false,
            coefficient: M::zero(),
            exponent: 0,
        }
    }

    pub fn one() -> Self {
        Self::from_u64(1)
    }

    pub fn from_u64(value: u64) -> Self {
        Self::normalized(false, M::from_u64(value), 0)
    }

    pub fn from_i64(value: i64) -> Self {
        Self::normalized(value < 0, M::from_u64(value.unsigned_abs()), 0)
    }

    /// `coefficient * 10^exponent`, used for literal constants
    fn from_parts(negative: bool, coefficient: u64, exponent: i32) -> Self {
        Self::normalized(negative, M::from_u64(coefficient), exponent)
    }

    /// Round a raw triple to working precision (round half up on magnitude)
    fn normalized(negative: bool, coefficient: M, exponent: i32) -> Self {
        if coefficient.is_zero_value() {
            return Self::zero();
        }

        let digits = coefficient.digit_count();
        if digits <= M::DIGITS {
            return Self {
                negative,
                coefficient,
                exponent,
            };
        }

        let excess = digits - M::DIGITS;
        let divisor = M::pow10(excess);
        let remainder = coefficient % divisor;
        let mut rounded = coefficient / divisor;
        let mut exponent = exponent + excess as i32;

        if remainder + remainder >= divisor {
            rounded = rounded + M::one();
            if rounded == M::pow10(M::DIGITS) {
                rounded = rounded / M::from_u64(10);
                exponent += 1;
            }
        }

        Self {
            negative,
            coefficient: rounded,
            exponent,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero_value()
    }

    pub fn is_negative(&self) -> bool {
        self.negative && !self.is_zero()
    }

    /// Strictly greater than zero
    pub fn is_positive(&self) -> bool {
        !self.negative && !self.is_zero()
    }

    pub fn abs(self) -> Self {
        Self {
            negative: false,
            ..self
        }
    }

    /// Power of ten of the most significant digit
    fn adjusted_exponent(&self) -> i32 {
        self.exponent + self.coefficient.digit_count() as i32 - 1
    }

    /// Multiply by 10^places without rounding
    pub fn shift_decimal(self, places: i32) -> Self {
        if self.is_zero() {
            return self;
        }
        Self {
            exponent: self.exponent + places,
            ..self
        }
    }

    fn add_signed(self, rhs: Self) -> Self {
        if self.is_zero() {
            return rhs;
        }
        if rhs.is_zero() {
            return self;
        }

        // The smaller operand cannot reach the rounding digit of the larger
        let gap = self.adjusted_exponent() - rhs.adjusted_exponent();
        if gap.unsigned_abs() > M::DIGITS + 1 {
            return if gap > 0 { self } else { rhs };
        }

        let exponent = self.exponent.min(rhs.exponent);
        let lhs = self.coefficient * M::pow10((self.exponent - exponent) as u32);
        let rhs_coefficient = rhs.coefficient * M::pow10((rhs.exponent - exponent) as u32);

        if self.negative == rhs.negative {
            Self::normalized(self.negative, lhs + rhs_coefficient, exponent)
        } else if lhs >= rhs_coefficient {
            Self::normalized(self.negative, lhs - rhs_coefficient, exponent)
        } else {
            Self::normalized(rhs.negative, rhs_coefficient - lhs, exponent)
        }
    }

    /// Division rounded to working precision; zero divisor is a domain error
    pub fn checked_div(self, rhs: Self) -> Result<Self> {
        if rhs.is_zero() {
            return Err(YieldMathError::domain("division by zero"));
        }
        if self.is_zero() {
            return Ok(Self::zero());
        }

        let shift = (M::DIGITS + 2 + rhs.coefficient.digit_count())
            .saturating_sub(self.coefficient.digit_count());
        let numerator = self.coefficient * M::pow10(shift);

        Ok(Self::normalized(
            self.negative != rhs.negative,
            numerator / rhs.coefficient,
            self.exponent - rhs.exponent - shift as i32,
        ))
    }

    /// Largest integer not greater than `self`
    pub fn floor(self) -> Self {
        if self.exponent >= 0 || self.is_zero() {
            return self;
        }

        let shift = self.exponent.unsigned_abs();
        let (whole, has_fraction) = if shift > self.coefficient.digit_count() {
            (M::zero(), true)
        } else {
            let divisor = M::pow10(shift);
            (
                self.coefficient / divisor,
                !(self.coefficient % divisor).is_zero_value(),
            )
        };

        let whole = if self.negative && has_fraction {
            whole + M::one()
        } else {
            whole
        };
        Self::normalized(self.negative, whole, 0)
    }

    /// Smallest integer not less than `self`
    pub fn ceil(self) -> Self {
        -(-self).floor()
    }

    /// Round half away from zero to `places` fractional digits
    pub fn round_dp(self, places: u32) -> Self {
        let target = -(places as i32);
        if self.exponent >= target || self.is_zero() {
            return self;
        }

        let shift = (target - self.exponent) as u32;
        if shift > self.coefficient.digit_count() {
            return Self::zero();
        }

        let divisor = M::pow10(shift);
        let remainder = self.coefficient % divisor;
        let mut rounded = self.coefficient / divisor;
        if remainder + remainder >= divisor {
            rounded = rounded + M::one();
        }
        Self::normalized(self.negative, rounded, target)
    }

    /// Integer value as `i64`, `None` when fractional or out of range
    pub fn to_i64(&self) -> Option<i64> {
        if self.is_zero() {
            return Some(0);
        }
        if self.exponent < 0 || self.coefficient.bit_length() > 63 {
            return None;
        }

        let scale = 10i64.checked_pow(self.exponent as u32)?;
        let magnitude = i64::try_from(self.coefficient.low_u64())
            .ok()?
            .checked_mul(scale)?;
        Some(if self.negative { -magnitude } else { magnitude })
    }

    pub fn sqrt(self) -> Result<Self> {
        if self.is_negative() {
            return Err(YieldMathError::domain("square root of a negative value"));
        }
        if self.is_zero() {
            return Ok(Self::zero());
        }

        // Pull out an even power of ten so Newton starts from [1, 100)
        let adjusted = self.adjusted_exponent();
        let half_power = adjusted.div_euclid(2);
        let reduced = self.shift_decimal(-2 * half_power);

        let two = Self::from_u64(2);
        let tolerance = Self::from_parts(false, 1, 2 - M::DIGITS as i32);
        let mut guess = (reduced + Self::one()).checked_div(two)?;

        for _ in 0..MAX_SQRT_ITERATIONS {
            let next = (guess + reduced.checked_div(guess)?).checked_div(two)?;
            let converged = (next - guess).abs() <= tolerance;
            guess = next;
            if converged {
                return Ok(guess.shift_decimal(half_power));
            }
        }

        Err(YieldMathError::precision(format!(
            "square root of {} did not converge",
            self
        )))
    }

    /// Natural logarithm; the argument must be strictly positive
    pub fn ln(self) -> Result<Self> {
        if !self.is_positive() {
            return Err(YieldMathError::domain(format!(
                "logarithm of non-positive value {}",
                self
            )));
        }
        let one = Self::one();
        if self == one {
            return Ok(Self::zero());
        }

        // self = m * 10^power with m in [1, 10); values just under one are
        // left alone so they do not pick up a -ln(10) term
        let mut power = self.adjusted_exponent();
        let mut reduced = self.shift_decimal(-power);
        if power == -1 {
            reduced = self;
            power = 0;
        }

        let upper = Self::from_parts(false, 105, -2);
        let lower = Self::from_parts(false, 95, -2);
        let mut halvings = 0u32;
        while reduced > upper || reduced < lower {
            reduced = reduced.sqrt()?;
            halvings += 1;
        }

        // ln(m) = 2 * atanh((m - 1) / (m + 1))
        let z = (reduced - one).checked_div(reduced + one)?;
        let z_squared = z * z;
        let mut term = z;
        let mut sum = z;
        let mut denominator = 1u64;
        while !term.is_zero() {
            term = term * z_squared;
            denominator += 2;
            let contribution = term.checked_div(Self::from_u64(denominator))?;
            if contribution.is_zero() || sum.is_negligible(&contribution) {
                break;
            }
            sum = sum + contribution;
        }

        let mut result = sum * Self::from_u64(1u64 << (halvings + 1));
        if power != 0 {
            result = result + Self::from_i64(i64::from(power)) * Self::ln_10()?;
        }
        Ok(result)
    }

    /// e^self
    pub fn exp(self) -> Result<Self> {
        let one = Self::one();
        if self.is_zero() {
            return Ok(one);
        }

        let ln_10 = Self::ln_10()?;
        let power = self
            .checked_div(ln_10)?
            .floor()
            .to_i64()
            .filter(|power| power.abs() <= MAX_EXPONENT)
            .ok_or_else(|| {
                YieldMathError::precision(format!("exp({}) leaves the decimal exponent range", self))
            })?;

        // self = power * ln(10) + r with r in [0, ln 10)
        let remainder = self - Self::from_i64(power) * ln_10;
        let reduced = remainder.checked_div(Self::from_u64(1 << EXP_HALVINGS))?;

        let mut sum = one;
        let mut term = one;
        let mut n = 0u64;
        loop {
            n += 1;
            term = (term * reduced).checked_div(Self::from_u64(n))?;
            if term.is_zero() || sum.is_negligible(&term) {
                break;
            }
            sum = sum + term;
        }

        for _ in 0..EXP_HALVINGS {
            sum = sum * sum;
        }

        Ok(sum.shift_decimal(power as i32))
    }

    /// `self^exponent` for a non-negative base
    ///
    /// Exact shortcuts: `x^0 = 1`, `0^y = 0` for `y > 0`, `1^y = 1`,
    /// `x^1 = x`. Everything else is `exp(y * ln x)`.
    pub fn pow(self, exponent: Self) -> Result<Self> {
        let one = Self::one();
        if exponent.is_zero() {
            return Ok(one);
        }
        if self.is_zero() {
            if exponent.is_negative() {
                return Err(YieldMathError::domain("zero raised to a negative power"));
            }
            return Ok(Self::zero());
        }
        if self.is_negative() {
            return Err(YieldMathError::domain(format!(
                "fractional power of negative value {}",
                self
            )));
        }
        if self == one || exponent == one {
            return Ok(self);
        }

        (exponent * self.ln()?).exp()
    }

    /// True when `term` can no longer change `self` at working precision
    fn is_negligible(&self, term: &Self) -> bool {
        self.adjusted_exponent() - term.adjusted_exponent() > M::DIGITS as i32 + 1
    }

    fn ln_10() -> Result<Self> {
        Self::from_str(LN_10)
            .map_err(|_| YieldMathError::precision("ln(10) constant failed to parse"))
    }

    /// Exact conversion of an integer base-unit amount
    pub fn from_base_units(units: &BaseUnits) -> Result<Self> {
        let digits = units.raw().to_string();
        let significant = digits.trim_end_matches('0');
        if significant.is_empty() {
            return Ok(Self::zero());
        }
        if significant.len() > M::DIGITS as usize {
            return Err(YieldMathError::precision(format!(
                "{} has more than {} significant digits",
                digits,
                M::DIGITS
            )));
        }

        let coefficient = M::parse_decimal(significant).ok_or_else(|| {
            YieldMathError::precision(format!("{} does not fit the {} backend", digits, M::NAME))
        })?;
        Ok(Self {
            negative: false,
            coefficient,
            exponent: (digits.len() - significant.len()) as i32,
        })
    }

    /// Nominal token value of a base-unit amount (`units / 10^18`)
    pub fn from_nominal(units: &BaseUnits) -> Result<Self> {
        Ok(Self::from_base_units(units)?.shift_decimal(-(BaseUnits::DECIMALS as i32)))
    }

    /// Floor to a whole number of base units
    pub fn to_base_units(&self) -> Result<BaseUnits> {
        if self.is_negative() {
            return Err(YieldMathError::domain(format!(
                "negative amount {} has no base-unit representation",
                self
            )));
        }
        let floored = self.floor().to_string();
        BaseUnits::from_raw_str(&floored).map_err(|err| YieldMathError::precision(err.to_string()))
    }

    /// Round up to a whole number of base units
    pub fn to_base_units_ceil(&self) -> Result<BaseUnits> {
        self.ceil().to_base_units()
    }

    /// Floor a nominal token value to base units (`self * 10^18`)
    pub fn to_nominal_base_units(&self) -> Result<BaseUnits> {
        self.shift_decimal(BaseUnits::DECIMALS as i32).to_base_units()
    }

    /// Round to the 28 digits `rust_decimal` can hold, for presentation
    pub fn to_decimal(&self) -> Result<Decimal> {
        const MAX_SCALE: i32 = 28;
        let adjusted = self.adjusted_exponent();
        let places = if adjusted < 0 {
            MAX_SCALE
        } else {
            (MAX_SCALE - 1 - adjusted).max(0)
        };
        let rounded = self.round_dp(places as u32).to_string();
        Decimal::from_str(&rounded).map_err(|err| {
            YieldMathError::precision(format!("{} does not fit rust_decimal: {}", rounded, err))
        })
    }
}

impl<M: Mantissa> From<Decimal> for BigDecimal<M> {
    fn from(value: Decimal) -> Self {
        let mantissa = value.mantissa();
        Self::normalized(
            mantissa < 0,
            M::from_u128(mantissa.unsigned_abs()),
            -(value.scale() as i32),
        )
    }
}

impl<M: Mantissa> Add for BigDecimal<M> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.add_signed(rhs)
    }
}

impl<M: Mantissa> Sub for BigDecimal<M> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.add_signed(-rhs)
    }
}

impl<M: Mantissa> Mul for BigDecimal<M> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::normalized(
            self.negative != rhs.negative,
            self.coefficient * rhs.coefficient,
            self.exponent + rhs.exponent,
        )
    }
}

impl<M: Mantissa> Neg for BigDecimal<M> {
    type Output = Self;

    fn neg(self) -> Self {
        if self.is_zero() {
            return self;
        }
        Self {
            negative: !self.negative,
            ..self
        }
    }
}

impl<M: Mantissa> Ord for BigDecimal<M> {
    fn cmp(&self, other: &Self) -> Ordering {
        let difference = *self - *other;
        if difference.is_zero() {
            Ordering::Equal
        } else if difference.negative {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

impl<M: Mantissa> PartialOrd for BigDecimal<M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<M: Mantissa> PartialEq for BigDecimal<M> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<M: Mantissa> Eq for BigDecimal<M> {}

impl<M: Mantissa> Default for BigDecimal<M> {
    fn default() -> Self {
        Self::zero()
    }
}

/// Plain notation, trailing fractional zeros trimmed
impl<M: Mantissa> fmt::Display for BigDecimal<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.pad("0");
        }

        let digits = self.coefficient.to_string();
        let mut out = String::with_capacity(digits.len() + 4);
        if self.negative {
            out.push('-');
        }

        if self.exponent >= 0 {
            out.push_str(&digits);
            out.extend(std::iter::repeat('0').take(self.exponent as usize));
        } else {
            let scale = self.exponent.unsigned_abs() as usize;
            let (whole, fraction) = if scale < digits.len() {
                let split = digits.len() - scale;
                (digits[..split].to_string(), digits[split..].to_string())
            } else {
                ("0".to_string(), format!("{:0>width$}", digits, width = scale))
            };
            out.push_str(&whole);
            let fraction = fraction.trim_end_matches('0');
            if !fraction.is_empty() {
                out.push('.');
                out.push_str(fraction);
            }
        }

        f.pad(&out)
    }
}

impl<M: Mantissa> fmt::Debug for BigDecimal<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigDecimal<{}>({})", M::NAME, self)
    }
}

/// Accepts `123`, `-1.5`, `.25`, `1e-18` and `2.5E+3`
impl<M: Mantissa> FromStr for BigDecimal<M> {
    type Err = YieldMathError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || YieldMathError::domain(format!("invalid decimal literal '{}'", s));

        let input = s.trim();
        let (negative, unsigned) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };

        let (number, mut exponent) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
            Some(idx) => {
                let exponent = unsigned[idx + 1..].parse::<i64>().map_err(|_| invalid())?;
                (&unsigned[..idx], exponent)
            }
            None => (unsigned, 0),
        };

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
            return Err(invalid());
        }

        exponent -= fraction.len() as i64;
        let mut digits = String::with_capacity(whole.len() + fraction.len());
        digits.push_str(whole);
        digits.push_str(fraction);

        let significant = digits.trim_start_matches('0');
        if significant.is_empty() {
            return Ok(Self::zero());
        }

        // Two guard digits are enough for the final half-up rounding
        let keep = (M::DIGITS + 2) as usize;
        let kept = if significant.len() > keep {
            exponent += (significant.len() - keep) as i64;
            &significant[..keep]
        } else {
            significant
        };

        if exponent.abs() > MAX_EXPONENT {
            return Err(YieldMathError::precision(format!(
                "decimal literal '{}' leaves the exponent range",
                s
            )));
        }

        let coefficient = M::parse_decimal(kept).ok_or_else(invalid)?;
        Ok(Self::normalized(negative, coefficient, exponent as i32))
    }
}
