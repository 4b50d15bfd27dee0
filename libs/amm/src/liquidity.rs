//! Liquidity share math
//!
//! Minting and burning keep the pool's base/principal ratio fixed: shares
//! are issued in proportion to the base contributed, and burned shares
//! release both reserves pro rata.

use crate::decimal::{mantissa::Mantissa, BigDecimal, PreciseMantissa, ReferenceMantissa};
use crate::errors::{Result, YieldMathError};
use std::marker::PhantomData;
use tracing::debug;
use yieldspace_types::{BaseUnits, Reserves};

/// Shares issued for a base deposit and the principal that must accompany it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintQuote<M: Mantissa> {
    pub tokens_minted: BigDecimal<M>,
    pub principal_required: BigDecimal<M>,
}

/// Reserves released by burning shares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnQuote<M: Mantissa> {
    pub base_out: BigDecimal<M>,
    pub principal_out: BigDecimal<M>,
}

/// A single-sided amount divided in the pool's current ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquiditySplit<M: Mantissa> {
    pub base_portion: BigDecimal<M>,
    pub principal_portion: BigDecimal<M>,
}

impl<M: Mantissa> MintQuote<M> {
    /// Floored `(tokens_minted, principal_required)`
    pub fn to_base_units(&self) -> Result<(BaseUnits, BaseUnits)> {
        Ok((
            self.tokens_minted.to_base_units()?,
            self.principal_required.to_base_units()?,
        ))
    }
}

impl<M: Mantissa> BurnQuote<M> {
    /// Floored `(base_out, principal_out)`
    pub fn to_base_units(&self) -> Result<(BaseUnits, BaseUnits)> {
        Ok((self.base_out.to_base_units()?, self.principal_out.to_base_units()?))
    }
}

impl<M: Mantissa> LiquiditySplit<M> {
    /// Floored `(base_portion, principal_portion)`
    pub fn to_base_units(&self) -> Result<(BaseUnits, BaseUnits)> {
        Ok((
            self.base_portion.to_base_units()?,
            self.principal_portion.to_base_units()?,
        ))
    }
}

/// Liquidity math over a decimal backend
pub struct LiquidityMath<M: Mantissa = PreciseMantissa>(PhantomData<M>);

pub type PreciseLiquidity = LiquidityMath<PreciseMantissa>;
pub type ReferenceLiquidity = LiquidityMath<ReferenceMantissa>;

impl<M: Mantissa> LiquidityMath<M> {
    /// `tokens = S * base_in / Z`, `principal = Y * tokens / S`
    ///
    /// The first deposit into an empty pool is priced by the caller; a zero
    /// supply or zero base reserve is a domain error here.
    pub fn mint(reserves: &Reserves, supply: BaseUnits, base_in: BaseUnits) -> Result<MintQuote<M>> {
        if supply.is_zero() {
            debug!(%base_in, "mint against a pool with no supply");
            return Err(YieldMathError::domain("cannot mint against zero liquidity supply"));
        }
        if reserves.base.is_zero() {
            return Err(YieldMathError::domain("cannot mint against a zero base reserve"));
        }

        let base = BigDecimal::<M>::from_base_units(&reserves.base)?;
        let principal = BigDecimal::<M>::from_base_units(&reserves.principal)?;
        let supply = BigDecimal::<M>::from_base_units(&supply)?;
        let base_in = BigDecimal::<M>::from_base_units(&base_in)?;

        let tokens_minted = (supply * base_in).checked_div(base)?;
        let principal_required = (principal * tokens_minted).checked_div(supply)?;

        Ok(MintQuote {
            tokens_minted,
            principal_required,
        })
    }

    /// `(tokens_in * Z / S, tokens_in * Y / S)`
    pub fn burn(reserves: &Reserves, supply: BaseUnits, tokens_in: BaseUnits) -> Result<BurnQuote<M>> {
        if supply.is_zero() {
            return Err(YieldMathError::domain("cannot burn against zero liquidity supply"));
        }
        if tokens_in > supply {
            debug!(%tokens_in, %supply, "burn exceeds supply");
            return Err(YieldMathError::domain(format!(
                "burning {} exceeds the liquidity supply of {}",
                tokens_in, supply
            )));
        }

        let supply = BigDecimal::<M>::from_base_units(&supply)?;
        let tokens_in = BigDecimal::<M>::from_base_units(&tokens_in)?;

        Ok(BurnQuote {
            base_out: (tokens_in * BigDecimal::from_base_units(&reserves.base)?)
                .checked_div(supply)?,
            principal_out: (tokens_in * BigDecimal::from_base_units(&reserves.principal)?)
                .checked_div(supply)?,
        })
    }

    /// `base = amount * Z / (Z + Y)`, `principal = amount - base`
    pub fn split_liquidity(reserves: &Reserves, amount: BaseUnits) -> Result<LiquiditySplit<M>> {
        if reserves.is_empty() {
            return Err(YieldMathError::domain("cannot split against empty reserves"));
        }

        let base = BigDecimal::<M>::from_base_units(&reserves.base)?;
        let principal = BigDecimal::<M>::from_base_units(&reserves.principal)?;
        let amount = BigDecimal::<M>::from_base_units(&amount)?;

        let base_portion = (amount * base).checked_div(base + principal)?;
        Ok(LiquiditySplit {
            base_portion,
            principal_portion: amount - base_portion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserves() -> Reserves {
        Reserves::new(
            BaseUnits::from_whole(1_450_000),
            BaseUnits::from_whole(1_023_400),
        )
    }

    fn supply() -> BaseUnits {
        BaseUnits::from_whole(1_023_400)
    }

    #[test]
    fn test_mint_vector() {
        let quote = PreciseLiquidity::mint(&reserves(), supply(), BaseUnits::from_whole(10_223)).unwrap();
        let (tokens, principal) = quote.to_base_units().unwrap();
        assert_eq!(tokens.to_string(), "7215322896551724137931");
        assert_eq!(principal.to_string(), "7215322896551724137931");
    }

    #[test]
    fn test_burn_returns_deposit() {
        let minted = PreciseLiquidity::mint(&reserves(), supply(), BaseUnits::from_whole(10_223))
            .unwrap()
            .tokens_minted
            .to_base_units()
            .unwrap();

        let burned = PreciseLiquidity::burn(&reserves(), supply(), minted).unwrap();
        let (base, principal) = burned.to_base_units().unwrap();
        // flooring the minted shares costs at most one base unit
        assert_eq!(base.to_string(), "10222999999999999999999");
        assert_eq!(principal.to_string(), "7215322896551724137931");
    }

    #[test]
    fn test_burn_entire_supply_drains_pool() {
        let burned = PreciseLiquidity::burn(&reserves(), supply(), supply()).unwrap();
        let (base, principal) = burned.to_base_units().unwrap();
        assert_eq!(base, reserves().base);
        assert_eq!(principal, reserves().principal);
    }

    #[test]
    fn test_split_vector() {
        let split = PreciseLiquidity::split_liquidity(&reserves(), BaseUnits::from_whole(5_000)).unwrap();
        let (base, principal) = split.to_base_units().unwrap();
        assert_eq!(base.to_string(), "2931187838602733079970");
        assert_eq!(principal.to_string(), "2068812161397266920029");
    }

    #[test]
    fn test_domain_errors() {
        let empty = Reserves::new(BaseUnits::ZERO, BaseUnits::ZERO);
        assert!(matches!(
            PreciseLiquidity::split_liquidity(&empty, BaseUnits::from_whole(1)),
            Err(YieldMathError::Domain(_))
        ));
        assert!(matches!(
            PreciseLiquidity::mint(&reserves(), BaseUnits::ZERO, BaseUnits::from_whole(1)),
            Err(YieldMathError::Domain(_))
        ));
        assert!(matches!(
            PreciseLiquidity::burn(&reserves(), BaseUnits::ZERO, BaseUnits::ZERO),
            Err(YieldMathError::Domain(_))
        ));
        assert!(matches!(
            PreciseLiquidity::burn(&reserves(), supply(), BaseUnits::from_whole(1_023_401)),
            Err(YieldMathError::Domain(_))
        ));

        let no_base = Reserves::new(BaseUnits::ZERO, BaseUnits::from_whole(10));
        assert!(matches!(
            PreciseLiquidity::mint(&no_base, supply(), BaseUnits::from_whole(1)),
            Err(YieldMathError::Domain(_))
        ));
    }

    #[test]
    fn test_backends_agree_on_mint() {
        let precise = PreciseLiquidity::mint(&reserves(), supply(), BaseUnits::from_whole(10_223))
            .unwrap()
            .to_base_units()
            .unwrap();
        let reference = ReferenceLiquidity::mint(&reserves(), supply(), BaseUnits::from_whole(10_223))
            .unwrap()
            .to_base_units()
            .unwrap();
        assert_eq!(precise, reference);
    }
}
