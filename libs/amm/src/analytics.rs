//! Yield and lending analytics
//!
//! Read-only helpers built on the decimal engine: the APR implied by a
//! fixed-rate trade and the collateral health of a borrowing position.

use crate::decimal::{mantissa::Mantissa, BigDecimal, PreciseMantissa};
use crate::errors::{Result, YieldMathError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::debug;
use yieldspace_types::BaseUnits;

/// 365 days
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Annual log-growth past which the APR exceeds every `Decimal` bound
const MAX_ANNUAL_LOG_GROWTH: u64 = 1_000;

/// Range of APR values (in percent) reported as meaningful
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AprBounds {
    pub min_percent: Decimal,
    pub max_percent: Decimal,
    /// Whether the end points themselves are accepted
    #[serde(default)]
    pub inclusive: bool,
}

impl Default for AprBounds {
    fn default() -> Self {
        Self {
            min_percent: dec!(0),
            max_percent: dec!(100),
            inclusive: false,
        }
    }
}

impl AprBounds {
    /// Accept every finite APR, including zero and negative yields
    pub fn unbounded() -> Self {
        Self {
            min_percent: Decimal::MIN,
            max_percent: Decimal::MAX,
            inclusive: true,
        }
    }

    pub fn contains<M: Mantissa>(&self, apr: &BigDecimal<M>) -> bool {
        let min = BigDecimal::<M>::from(self.min_percent);
        let max = BigDecimal::<M>::from(self.max_percent);
        if self.inclusive {
            min <= *apr && *apr <= max
        } else {
            min < *apr && *apr < max
        }
    }
}

/// Tunables for [`Analytics`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub apr_bounds: AprBounds,
    /// Collateral value / debt value at which a position is liquidated
    pub liquidation_ratio: Decimal,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            apr_bounds: AprBounds::default(),
            liquidation_ratio: dec!(1.5),
        }
    }
}

/// APR and collateral analytics over a decimal backend
#[derive(Debug, Clone)]
pub struct Analytics<M: Mantissa = PreciseMantissa> {
    config: AnalyticsConfig,
    _backend: PhantomData<M>,
}

impl<M: Mantissa> Default for Analytics<M> {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

impl<M: Mantissa> Analytics<M> {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            _backend: PhantomData,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Annualized yield (percent) of turning `rate` into `amount` by `maturity`
    ///
    /// `apr = ((amount / rate)^(1 / years) - 1) * 100`, where `years` is the
    /// time from `from_date` (default: now) to `maturity`. Returns `None` once
    /// matured or when the result falls outside the configured bounds. A
    /// total loss annualized over a short horizon is reported as `-100`.
    pub fn calculate_apr(
        &self,
        rate: BaseUnits,
        amount: BaseUnits,
        maturity: u64,
        from_date: Option<u64>,
    ) -> Result<Option<BigDecimal<M>>> {
        let from = from_date.unwrap_or_else(unix_now);
        if maturity <= from {
            debug!(maturity, from, "APR requested at or after maturity");
            return Ok(None);
        }
        if rate.is_zero() {
            return Err(YieldMathError::domain("APR rate must be non-zero"));
        }

        let one = BigDecimal::<M>::one();
        let years = BigDecimal::<M>::from_u64(maturity - from)
            .checked_div(BigDecimal::from_u64(SECONDS_PER_YEAR))?;
        let growth = BigDecimal::<M>::from_base_units(&amount)?
            .checked_div(BigDecimal::from_base_units(&rate)?)?;

        let inverse_years = one.checked_div(years)?;
        let annual_growth = if growth.is_zero() {
            BigDecimal::zero()
        } else {
            // Short horizons annualize to powers far outside the exponent range
            let annual_log = growth.ln()? * inverse_years;
            let ceiling = BigDecimal::<M>::from_u64(MAX_ANNUAL_LOG_GROWTH);
            if annual_log > ceiling {
                debug!(annual_log = %annual_log, "APR beyond any reportable bound");
                return Ok(None);
            }
            if annual_log < -ceiling {
                BigDecimal::zero()
            } else {
                growth.pow(inverse_years)?
            }
        };

        let apr = (annual_growth - one) * BigDecimal::from_u64(100);
        if !self.config.apr_bounds.contains(&apr) {
            debug!(apr = %apr, bounds = ?self.config.apr_bounds, "APR outside reported range");
            return Ok(None);
        }
        Ok(Some(apr))
    }

    /// `amount * price / debt`, times 100 when `as_percent`
    ///
    /// `price` is an 18-decimal fixed-point quote of collateral in debt
    /// units. Returns `None` for a position without debt.
    pub fn collateralization_ratio(
        &self,
        collateral_amount: BaseUnits,
        collateral_price: BaseUnits,
        debt_value: BaseUnits,
        as_percent: bool,
    ) -> Result<Option<BigDecimal<M>>> {
        if debt_value.is_zero() {
            return Ok(None);
        }

        let ratio = collateral_value::<M>(collateral_amount, collateral_price)?
            .checked_div(BigDecimal::from_base_units(&debt_value)?)?;
        Ok(Some(if as_percent {
            ratio * BigDecimal::from_u64(100)
        } else {
            ratio
        }))
    }

    /// Extra debt the position supports at the configured liquidation ratio
    pub fn borrowing_power(
        &self,
        collateral_amount: BaseUnits,
        collateral_price: BaseUnits,
        debt_value: BaseUnits,
    ) -> Result<BigDecimal<M>> {
        self.borrowing_power_at(
            collateral_amount,
            collateral_price,
            debt_value,
            self.config.liquidation_ratio,
        )
    }

    /// `max(0, collateral_value / liquidation_ratio - debt)` in debt base units
    pub fn borrowing_power_at(
        &self,
        collateral_amount: BaseUnits,
        collateral_price: BaseUnits,
        debt_value: BaseUnits,
        liquidation_ratio: Decimal,
    ) -> Result<BigDecimal<M>> {
        if liquidation_ratio <= Decimal::ZERO {
            return Err(YieldMathError::domain(format!(
                "liquidation ratio {} must be positive",
                liquidation_ratio
            )));
        }

        let capacity = collateral_value::<M>(collateral_amount, collateral_price)?
            .checked_div(BigDecimal::from(liquidation_ratio))?;
        let headroom = capacity - BigDecimal::from_base_units(&debt_value)?;
        Ok(headroom.max(BigDecimal::zero()))
    }
}

/// Collateral value in debt base units (`amount * price / 10^18`)
fn collateral_value<M: Mantissa>(amount: BaseUnits, price: BaseUnits) -> Result<BigDecimal<M>> {
    Ok(BigDecimal::<M>::from_base_units(&amount)? * BigDecimal::from_nominal(&price)?)
}

fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::ReferenceMantissa;

    type PreciseAnalytics = Analytics<PreciseMantissa>;

    const START: u64 = 1_700_000_000;

    #[test]
    fn test_default_config() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.liquidation_ratio, dec!(1.5));
        assert_eq!(config.apr_bounds.min_percent, dec!(0));
        assert_eq!(config.apr_bounds.max_percent, dec!(100));
        assert!(!config.apr_bounds.inclusive);
    }

    #[test]
    fn test_apr_half_year() {
        let analytics = PreciseAnalytics::default();
        let apr = analytics
            .calculate_apr(
                BaseUnits::from_whole(95),
                BaseUnits::from_whole(100),
                START + SECONDS_PER_YEAR / 2,
                Some(START),
            )
            .unwrap()
            .unwrap();
        assert_eq!(apr.round_dp(10).to_string(), "10.8033240997");
        assert_eq!(apr.to_decimal().unwrap().round_dp(4), dec!(10.8033));
    }

    #[test]
    fn test_apr_none_at_or_after_maturity() {
        let analytics = PreciseAnalytics::default();
        let rate = BaseUnits::from_whole(95);
        let amount = BaseUnits::from_whole(100);
        assert!(analytics.calculate_apr(rate, amount, START, Some(START)).unwrap().is_none());
        assert!(analytics.calculate_apr(rate, amount, START - 1, Some(START)).unwrap().is_none());
    }

    #[test]
    fn test_apr_bounds() {
        let analytics = PreciseAnalytics::default();
        let maturity = START + SECONDS_PER_YEAR;

        // Break-even is excluded by the default open interval
        let even = BaseUnits::from_whole(100);
        assert!(analytics.calculate_apr(even, even, maturity, Some(START)).unwrap().is_none());

        // Doubling in a year is exactly 100%, also excluded
        let doubled = analytics
            .calculate_apr(BaseUnits::from_whole(50), BaseUnits::from_whole(100), maturity, Some(START))
            .unwrap();
        assert!(doubled.is_none());

        let unbounded = PreciseAnalytics::new(AnalyticsConfig {
            apr_bounds: AprBounds::unbounded(),
            ..AnalyticsConfig::default()
        });
        let zero = unbounded
            .calculate_apr(even, even, maturity, Some(START))
            .unwrap()
            .unwrap();
        assert!(zero.is_zero());

        let negative = unbounded
            .calculate_apr(BaseUnits::from_whole(100), BaseUnits::from_whole(90), maturity, Some(START))
            .unwrap()
            .unwrap();
        assert_eq!(negative.round_dp(20).to_string(), "-10");
    }

    #[test]
    fn test_apr_short_horizons_stay_in_range() {
        let analytics = PreciseAnalytics::default();
        let apr = |rate: u64, amount: u64, seconds: u64| {
            analytics.calculate_apr(
                BaseUnits::from_whole(rate),
                BaseUnits::from_whole(amount),
                START + seconds,
                Some(START),
            )
        };

        assert!(apr(50, 100, 1).unwrap().is_none());
        assert!(apr(1, 100, 60).unwrap().is_none());
        assert!(apr(100, 1, 1).unwrap().is_none());
        assert!(apr(95, 100, 1).unwrap().is_none());

        let unbounded = Analytics::<ReferenceMantissa>::new(AnalyticsConfig {
            apr_bounds: AprBounds::unbounded(),
            ..AnalyticsConfig::default()
        });
        let loss = unbounded
            .calculate_apr(BaseUnits::from_whole(100), BaseUnits::from_whole(1), START + 1, Some(START))
            .unwrap()
            .unwrap();
        assert_eq!(loss.to_string(), "-100");

        // Far beyond Decimal::MAX, so outside even the unbounded range
        assert!(unbounded
            .calculate_apr(BaseUnits::from_whole(50), BaseUnits::from_whole(100), START + 1, Some(START))
            .unwrap()
            .is_none());

        let wiped = unbounded
            .calculate_apr(BaseUnits::from_whole(100), BaseUnits::ZERO, START + 60, Some(START))
            .unwrap()
            .unwrap();
        assert_eq!(wiped.to_string(), "-100");
    }

    #[test]
    fn test_apr_rejects_zero_rate() {
        let analytics = PreciseAnalytics::default();
        let err = analytics
            .calculate_apr(BaseUnits::ZERO, BaseUnits::from_whole(1), START + 10, Some(START))
            .unwrap_err();
        assert!(matches!(err, YieldMathError::Domain(_)));
    }

    #[test]
    fn test_apr_defaults_to_now() {
        let analytics = PreciseAnalytics::default();
        let apr = analytics
            .calculate_apr(BaseUnits::from_whole(95), BaseUnits::from_whole(100), u64::MAX / 2, None)
            .unwrap();
        // Maturity so far out annualizes a 5% gain to almost nothing
        assert!(apr.is_some());
        assert!(analytics
            .calculate_apr(BaseUnits::from_whole(95), BaseUnits::from_whole(100), 1, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_collateralization_ratio() {
        let analytics = PreciseAnalytics::default();
        let eth = BaseUnits::from_whole(10);
        let price = BaseUnits::from_whole(2_000);
        let debt = BaseUnits::from_whole(10_000);

        let ratio = analytics.collateralization_ratio(eth, price, debt, false).unwrap().unwrap();
        assert_eq!(ratio.to_string(), "2");

        let percent = analytics.collateralization_ratio(eth, price, debt, true).unwrap().unwrap();
        assert_eq!(percent.to_string(), "200");

        assert!(analytics
            .collateralization_ratio(eth, price, BaseUnits::ZERO, true)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_fractional_price() {
        let analytics = PreciseAnalytics::default();
        let price = BaseUnits::from_decimal_str("0.25").unwrap();
        let ratio = analytics
            .collateralization_ratio(BaseUnits::from_whole(8), price, BaseUnits::from_whole(1), false)
            .unwrap()
            .unwrap();
        assert_eq!(ratio.to_string(), "2");
    }

    #[test]
    fn test_borrowing_power() {
        let analytics = PreciseAnalytics::default();
        let eth = BaseUnits::from_whole(10);
        let price = BaseUnits::from_whole(2_000);

        let power = analytics
            .borrowing_power(eth, price, BaseUnits::from_whole(10_000))
            .unwrap();
        assert_eq!(power.to_base_units().unwrap().to_string(), "3333333333333333333333");

        let underwater = analytics
            .borrowing_power(eth, price, BaseUnits::from_whole(20_000))
            .unwrap();
        assert!(underwater.is_zero());

        let at_two = analytics
            .borrowing_power_at(eth, price, BaseUnits::from_whole(5_000), dec!(2))
            .unwrap();
        assert_eq!(at_two.to_base_units().unwrap(), BaseUnits::from_whole(5_000));

        assert!(analytics
            .borrowing_power_at(eth, price, BaseUnits::ZERO, dec!(0))
            .is_err());
    }

    #[test]
    fn test_config_serde() {
        let json = r#"{"apr_bounds":{"min_percent":"-5","max_percent":"250"},"liquidation_ratio":"1.25"}"#;
        let config: AnalyticsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.apr_bounds.min_percent, dec!(-5));
        assert!(!config.apr_bounds.inclusive);
        assert_eq!(config.liquidation_ratio, dec!(1.25));

        let partial: AnalyticsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(partial, AnalyticsConfig::default());
    }
}
