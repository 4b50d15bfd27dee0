//! YieldSpace trade pricing
//!
//! Each trade solves the invariant `Z^a + Y^a = Z'^a + Y'^a` for the reserve
//! the trader does not supply. With `Za = Z^a` and `Ya = Y^a`:
//!
//! | Trade | Trader supplies | Regime | Output |
//! |-------|-----------------|--------|--------|
//! | sell base | base `x` | g1 | `Y - (Za + Ya - (Z + x)^a)^(1/a)` |
//! | sell principal | principal `x` | g2 | `Z - (Za + Ya - (Y + x)^a)^(1/a)` |
//! | buy base | principal (pays) | g2 | `(Za + Ya - (Z - x)^a)^(1/a) - Y` |
//! | buy principal | base (pays) | g1 | `(Za + Ya - (Y - x)^a)^(1/a) - Z` |
//!
//! All amounts are raw base units (10^-18 tokens). Outputs are returned as
//! unrounded decimals; callers floor them with
//! [`BigDecimal::to_base_units`] when an integer amount is needed.

use crate::decimal::{mantissa::Mantissa, BigDecimal, PreciseMantissa, ReferenceMantissa};
use crate::errors::{Result, YieldMathError};
use crate::exponent::{CurveExponent, FeeRegime};
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace};
use yieldspace_types::{BaseUnits, Reserves};

/// Pool asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    /// Underlying base token
    Base,
    /// Principal (fixed-yield) token redeemable 1:1 for base at maturity
    Principal,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Base => write!(f, "base"),
            Asset::Principal => write!(f, "principal"),
        }
    }
}

/// The four trades the curve prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeKind {
    /// Exact base in, principal out
    SellBase,
    /// Exact principal in, base out
    SellPrincipal,
    /// Exact base out, principal in
    BuyBase,
    /// Exact principal out, base in
    BuyPrincipal,
}

impl TradeKind {
    pub const ALL: [TradeKind; 4] = [
        TradeKind::SellBase,
        TradeKind::SellPrincipal,
        TradeKind::BuyBase,
        TradeKind::BuyPrincipal,
    ];

    /// Fee regime, decided by the asset flowing into the pool
    pub fn regime(self) -> FeeRegime {
        match self.input_asset() {
            Asset::Base => FeeRegime::BaseIn,
            Asset::Principal => FeeRegime::PrincipalIn,
        }
    }

    /// Asset the trader pays into the pool
    pub fn input_asset(self) -> Asset {
        match self {
            TradeKind::SellBase | TradeKind::BuyPrincipal => Asset::Base,
            TradeKind::SellPrincipal | TradeKind::BuyBase => Asset::Principal,
        }
    }

    /// Asset the trader takes out of the pool
    pub fn output_asset(self) -> Asset {
        match self.input_asset() {
            Asset::Base => Asset::Principal,
            Asset::Principal => Asset::Base,
        }
    }

    /// Sells fix the amount paid in; buys fix the amount taken out
    pub fn is_sell(self) -> bool {
        matches!(self, TradeKind::SellBase | TradeKind::SellPrincipal)
    }

    /// Asset the `amount` argument is denominated in
    pub fn amount_asset(self) -> Asset {
        if self.is_sell() {
            self.input_asset()
        } else {
            self.output_asset()
        }
    }

    /// Asset the quoted result is denominated in
    pub fn quoted_asset(self) -> Asset {
        if self.is_sell() {
            self.output_asset()
        } else {
            self.input_asset()
        }
    }
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TradeKind::SellBase => "sell base",
            TradeKind::SellPrincipal => "sell principal",
            TradeKind::BuyBase => "buy base",
            TradeKind::BuyPrincipal => "buy principal",
        };
        f.write_str(name)
    }
}

/// Whether the fee multiplier is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FeeMode {
    /// Direction-dependent `g1` / `g2`
    #[default]
    Applied,
    /// `g = 1`, used to isolate the fee portion of a trade
    Feeless,
}

impl FeeMode {
    pub fn regime_for(self, kind: TradeKind) -> FeeRegime {
        match self {
            FeeMode::Applied => kind.regime(),
            FeeMode::Feeless => FeeRegime::Feeless,
        }
    }
}

/// YieldSpace curve math over a decimal backend
pub struct YieldMath<M: Mantissa = PreciseMantissa>(PhantomData<M>);

/// Curve math on the 72-digit primitive-types backend
pub type PreciseMath = YieldMath<PreciseMantissa>;

/// Curve math on the 70-digit ruint backend
pub type ReferenceMath = YieldMath<ReferenceMantissa>;

impl<M: Mantissa> YieldMath<M> {
    /// Principal received for selling exactly `base_in` base
    pub fn sell_base(
        reserves: &Reserves,
        base_in: BaseUnits,
        time_to_maturity: u64,
        fees: FeeMode,
    ) -> Result<BigDecimal<M>> {
        Self::quote(TradeKind::SellBase, reserves, base_in, time_to_maturity, fees)
    }

    /// Base received for selling exactly `principal_in` principal
    pub fn sell_principal(
        reserves: &Reserves,
        principal_in: BaseUnits,
        time_to_maturity: u64,
        fees: FeeMode,
    ) -> Result<BigDecimal<M>> {
        Self::quote(
            TradeKind::SellPrincipal,
            reserves,
            principal_in,
            time_to_maturity,
            fees,
        )
    }

    /// Principal required to buy exactly `base_out` base
    pub fn buy_base(
        reserves: &Reserves,
        base_out: BaseUnits,
        time_to_maturity: u64,
        fees: FeeMode,
    ) -> Result<BigDecimal<M>> {
        Self::quote(TradeKind::BuyBase, reserves, base_out, time_to_maturity, fees)
    }

    /// Base required to buy exactly `principal_out` principal
    pub fn buy_principal(
        reserves: &Reserves,
        principal_out: BaseUnits,
        time_to_maturity: u64,
        fees: FeeMode,
    ) -> Result<BigDecimal<M>> {
        Self::quote(
            TradeKind::BuyPrincipal,
            reserves,
            principal_out,
            time_to_maturity,
            fees,
        )
    }

    /// Price any trade kind
    ///
    /// # Errors
    /// - [`YieldMathError::Maturity`] when the exponent is not positive
    /// - [`YieldMathError::Domain`] when the trade cannot be filled
    /// - [`YieldMathError::Precision`] when a reserve exceeds the backend
    pub fn quote(
        kind: TradeKind,
        reserves: &Reserves,
        amount: BaseUnits,
        time_to_maturity: u64,
        fees: FeeMode,
    ) -> Result<BigDecimal<M>> {
        let exponent = CurveExponent::<M>::new(time_to_maturity, fees.regime_for(kind))?;

        if amount.is_zero() {
            return Ok(BigDecimal::zero());
        }

        let drained = match kind {
            TradeKind::BuyBase => Some(reserves.base),
            TradeKind::BuyPrincipal => Some(reserves.principal),
            _ => None,
        };
        if let Some(available) = drained {
            if amount >= available {
                debug!(%kind, %amount, %available, "trade would drain the pool");
                return Err(YieldMathError::insufficient_liquidity(format!(
                    "{} of {} requires more than the {} reserve of {}",
                    kind,
                    amount,
                    kind.amount_asset(),
                    available
                )));
            }
        }

        let base = BigDecimal::<M>::from_base_units(&reserves.base)?;
        let principal = BigDecimal::<M>::from_base_units(&reserves.principal)?;
        let amount = BigDecimal::<M>::from_base_units(&amount)?;

        let (moved_reserve, solved_reserve) = match kind {
            TradeKind::SellBase => (base + amount, principal),
            TradeKind::SellPrincipal => (principal + amount, base),
            TradeKind::BuyBase => (base - amount, principal),
            TradeKind::BuyPrincipal => (principal - amount, base),
        };

        let za = base.pow(exponent.a)?;
        let ya = principal.pow(exponent.a)?;
        let sum = za + ya - moved_reserve.pow(exponent.a)?;
        trace!(%kind, a = %exponent.a, za = %za, ya = %ya, sum = %sum, "curve terms");

        if sum.is_negative() {
            debug!(%kind, sum = %sum, "invariant sum is negative");
            return Err(YieldMathError::insufficient_liquidity(format!(
                "{} leaves a negative invariant sum",
                kind
            )));
        }

        let new_reserve = sum.pow(exponent.inv_a)?;
        let out = if kind.is_sell() {
            solved_reserve - new_reserve
        } else {
            new_reserve - solved_reserve
        };

        if out.is_negative() {
            debug!(%kind, out = %out, "trade output is negative");
            return Err(YieldMathError::insufficient_liquidity(format!(
                "{} produces a negative {} amount",
                kind,
                kind.quoted_asset()
            )));
        }

        trace!(%kind, out = %out, "trade priced");
        Ok(out)
    }
}
