//! Protocol fee implied by a principal trade
//!
//! The fee is the gap between the fee-applied curve and the feeless
//! reference curve for the same trade, denominated in base. It is always a
//! cost to the trader.

use crate::decimal::{mantissa::Mantissa, BigDecimal};
use crate::errors::Result;
use crate::pricing::{FeeMode, YieldMath};
use tracing::trace;
use yieldspace_types::{BaseUnits, FixedPointError, Reserves};

/// Direction of a principal trade from the trader's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrincipalFlow {
    /// Trader buys principal, paying base
    Buy,
    /// Trader sells principal, receiving base
    Sell,
}

impl PrincipalFlow {
    /// Split a signed raw amount: positive (or zero) buys, negative sells
    ///
    /// # Examples
    /// ```
    /// use yieldspace_amm::fees::PrincipalFlow;
    /// use yieldspace_types::BaseUnits;
    ///
    /// let (flow, amount) = PrincipalFlow::from_signed("-2500").unwrap();
    /// assert_eq!(flow, PrincipalFlow::Sell);
    /// assert_eq!(amount, BaseUnits::from(2500u64));
    /// ```
    pub fn from_signed(raw: &str) -> std::result::Result<(Self, BaseUnits), FixedPointError> {
        let trimmed = raw.trim();
        match trimmed.strip_prefix('-') {
            Some(magnitude) => Ok((PrincipalFlow::Sell, BaseUnits::from_raw_str(magnitude)?)),
            None => Ok((PrincipalFlow::Buy, BaseUnits::from_raw_str(trimmed)?)),
        }
    }
}

impl<M: Mantissa> YieldMath<M> {
    /// Base-denominated fee for trading `principal_amount` principal
    ///
    /// - [`PrincipalFlow::Buy`]: `buy_principal(fees) - buy_principal(feeless)`
    /// - [`PrincipalFlow::Sell`]: `sell_principal(feeless) - sell_principal(fees)`
    pub fn get_fee(
        reserves: &Reserves,
        flow: PrincipalFlow,
        principal_amount: BaseUnits,
        time_to_maturity: u64,
    ) -> Result<BigDecimal<M>> {
        let fee = match flow {
            PrincipalFlow::Buy => {
                let with_fees =
                    Self::buy_principal(reserves, principal_amount, time_to_maturity, FeeMode::Applied)?;
                let feeless =
                    Self::buy_principal(reserves, principal_amount, time_to_maturity, FeeMode::Feeless)?;
                with_fees - feeless
            }
            PrincipalFlow::Sell => {
                let with_fees = Self::sell_principal(
                    reserves,
                    principal_amount,
                    time_to_maturity,
                    FeeMode::Applied,
                )?;
                let feeless = Self::sell_principal(
                    reserves,
                    principal_amount,
                    time_to_maturity,
                    FeeMode::Feeless,
                )?;
                feeless - with_fees
            }
        };

        trace!(?flow, %principal_amount, fee = %fee, "fee evaluated");
        Ok(fee)
    }
}
