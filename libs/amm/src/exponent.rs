//! Time-decay exponent of the YieldSpace invariant
//!
//! The curve is `Z^a + Y^a = const` with `a = 1 - g * k * t`, where `t` is
//! the seconds left to maturity and `k` normalizes time against a four year
//! horizon. At `t = 0` the curve is constant-sum (`a = 1`); far from
//! maturity it bends toward constant-product.

use crate::decimal::{mantissa::Mantissa, BigDecimal};
use crate::errors::{Result, YieldMathError};
use tracing::debug;

/// Four years of 365 days, the time normalization of `k`
pub const SECONDS_PER_4_YEARS: u64 = 4 * 365 * 24 * 60 * 60;

/// Fee multiplier applied when base flows into the pool (`g1 = 950/1000`)
pub const G1_NUMERATOR: u64 = 950;
pub const G1_DENOMINATOR: u64 = 1000;

/// Which fee multiplier `g` the exponent is built with
///
/// The asset flowing into the pool decides the regime, not whether the
/// trader calls the trade a buy or a sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeRegime {
    /// `g = 1`, the reference curve used to isolate fees
    Feeless,
    /// `g1 = 950/1000`: sell base, or buy principal paying base
    BaseIn,
    /// `g2 = 1000/950`: sell principal, or buy base paying principal
    PrincipalIn,
}

impl FeeRegime {
    /// `g` as an exact `(numerator, denominator)` ratio
    pub fn ratio(self) -> (u64, u64) {
        match self {
            FeeRegime::Feeless => (1, 1),
            FeeRegime::BaseIn => (G1_NUMERATOR, G1_DENOMINATOR),
            FeeRegime::PrincipalIn => (G1_DENOMINATOR, G1_NUMERATOR),
        }
    }

    pub fn g<M: Mantissa>(self) -> Result<BigDecimal<M>> {
        let (numerator, denominator) = self.ratio();
        BigDecimal::from_u64(numerator).checked_div(BigDecimal::from_u64(denominator))
    }
}

/// Validated exponent `a` with its reciprocal
#[derive(Debug, Clone, Copy)]
pub struct CurveExponent<M: Mantissa> {
    pub a: BigDecimal<M>,
    pub inv_a: BigDecimal<M>,
    pub regime: FeeRegime,
    pub time_to_maturity: u64,
}

impl<M: Mantissa> CurveExponent<M> {
    /// Build `a = 1 - g * k * t`, failing with a maturity error when `a <= 0`
    pub fn new(time_to_maturity: u64, regime: FeeRegime) -> Result<Self> {
        let one = BigDecimal::<M>::one();
        let (numerator, denominator) = regime.ratio();

        // g * k * t folded into a single division so boundary cases stay exact
        let decay = (BigDecimal::from_u64(time_to_maturity) * BigDecimal::from_u64(numerator))
            .checked_div(
                BigDecimal::from_u64(SECONDS_PER_4_YEARS) * BigDecimal::from_u64(denominator),
            )?;
        let a = one - decay;

        if !a.is_positive() {
            debug!(
                time_to_maturity,
                ?regime,
                a = %a,
                "curve exponent is not positive"
            );
            return Err(YieldMathError::maturity(format!(
                "exponent {} is not positive for {} seconds to maturity under {:?}",
                a, time_to_maturity, regime
            )));
        }

        Ok(Self {
            a,
            inv_a: one.checked_div(a)?,
            regime,
            time_to_maturity,
        })
    }

    /// Constant-sum curve, reached exactly at maturity
    pub fn is_linear(&self) -> bool {
        self.a == BigDecimal::one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{PreciseMantissa, ReferenceMantissa};

    type Exponent = CurveExponent<PreciseMantissa>;

    #[test]
    fn test_constants() {
        assert_eq!(SECONDS_PER_4_YEARS, 126_144_000);
        let g1: BigDecimal<PreciseMantissa> = FeeRegime::BaseIn.g().unwrap();
        let g2: BigDecimal<PreciseMantissa> = FeeRegime::PrincipalIn.g().unwrap();
        assert_eq!(g1.to_string(), "0.95");
        assert!((g1 * g2 - BigDecimal::one()).abs() < "1e-70".parse().unwrap());
    }

    #[test]
    fn test_exponent_at_maturity_is_one() {
        for regime in [FeeRegime::Feeless, FeeRegime::BaseIn, FeeRegime::PrincipalIn] {
            let exponent = Exponent::new(0, regime).unwrap();
            assert!(exponent.is_linear());
            assert_eq!(exponent.inv_a, BigDecimal::one());
        }
    }

    #[test]
    fn test_exponent_one_year_out() {
        // a = 1 - 0.95 * 31_536_000 / 126_144_000 = 1 - 0.2375
        let exponent = Exponent::new(31_536_000, FeeRegime::BaseIn).unwrap();
        assert_eq!(exponent.a.to_string(), "0.7625");
        assert!(!exponent.is_linear());

        let feeless = Exponent::new(31_536_000, FeeRegime::Feeless).unwrap();
        assert_eq!(feeless.a.to_string(), "0.75");
        assert_eq!(feeless.inv_a.round_dp(60).to_string(), format!("1.{}", "3".repeat(60)));
    }

    #[test]
    fn test_maturity_error_when_exponent_not_positive() {
        // Feeless a hits zero exactly four years out
        let err = Exponent::new(SECONDS_PER_4_YEARS, FeeRegime::Feeless).unwrap_err();
        assert!(matches!(err, YieldMathError::Maturity(_)));

        // g2 > 1 fails earlier than the feeless curve
        let horizon = SECONDS_PER_4_YEARS * G1_NUMERATOR / G1_DENOMINATOR;
        assert!(Exponent::new(horizon - 1, FeeRegime::PrincipalIn).is_ok());
        assert!(matches!(
            Exponent::new(horizon + 1, FeeRegime::PrincipalIn),
            Err(YieldMathError::Maturity(_))
        ));

        // g1 < 1 survives past four years
        assert!(Exponent::new(SECONDS_PER_4_YEARS, FeeRegime::BaseIn).is_ok());
    }

    #[test]
    fn test_backends_agree() {
        let precise = Exponent::new(10_000_000, FeeRegime::PrincipalIn).unwrap();
        let reference =
            CurveExponent::<ReferenceMantissa>::new(10_000_000, FeeRegime::PrincipalIn).unwrap();
        assert_eq!(
            precise.a.round_dp(40).to_string(),
            reference.a.round_dp(40).to_string()
        );
    }
}
