//! # YieldSpace AMM Library - Fixed-Yield Curve Mathematics Engine
//!
//! ## Purpose
//!
//! Pricing and liquidity math for a YieldSpace pool trading a base token
//! against its principal token, which redeems 1:1 for base at maturity. The
//! pool invariant is `Z^a + Y^a = const` with a time-decaying exponent
//! `a = 1 - g * t / (4 years)`, so the curve moves from near
//! constant-product far from maturity to constant-sum at maturity.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pool snapshots (reserves, supply, time to maturity)
//!   read by the caller from chain state
//! - **Output Destinations**: Trade routers, liquidity managers, the
//!   `yield-quote` CLI
//! - **Interchange**: 18-decimal fixed-point integers ([`BaseUnits`]), never
//!   binary floating point
//! - **Errors**: [`YieldMathError`] with domain, maturity and precision kinds
//!
//! ## Architecture Role
//!
//! Pure, synchronous and stateless. Every call takes an explicit snapshot
//! and returns a value; nothing is cached between calls and all types are
//! `Send + Sync`. Slippage margins, signing and submission belong to the
//! caller.
//!
//! See [`architecture_diagram()`] for visual representation of the data flow.
//!
//! ## Precision
//!
//! Fractional powers are evaluated by [`BigDecimal`], generic over a
//! [`Mantissa`] backend:
//!
//! - [`PreciseMath`]: 72 significant digits on `primitive-types`
//! - [`ReferenceMath`]: 70 significant digits on `ruint` (via alloy)
//!
//! Both floor every curve output to the same base-unit integer; the test
//! suite cross-checks them.
//!
//! ## Quick start
//!
//! ```
//! use yieldspace_amm::{FeeMode, PreciseMath};
//! use yieldspace_types::{BaseUnits, Reserves};
//!
//! let reserves = Reserves::new(
//!     BaseUnits::from_whole(1_000_000),
//!     BaseUnits::from_whole(1_100_000),
//! );
//! let principal_out = PreciseMath::sell_base(
//!     &reserves,
//!     BaseUnits::from_whole(1_000),
//!     10_000_000,
//!     FeeMode::Applied,
//! )?;
//! assert_eq!(
//!     principal_out.to_base_units()?.to_string(),
//!     "1007131057856965765958"
//! );
//! # Ok::<(), yieldspace_amm::YieldMathError>(())
//! ```

pub mod analytics;
pub mod decimal;
pub mod errors;
pub mod exponent;
pub mod fees;
pub mod liquidity;
pub mod pricing;

pub use analytics::{Analytics, AnalyticsConfig, AprBounds, SECONDS_PER_YEAR};
pub use decimal::mantissa::Mantissa;
pub use decimal::{
    BigDecimal, PreciseDecimal, PreciseMantissa, ReferenceDecimal, ReferenceMantissa,
};
pub use errors::{ErrorKind, Result, YieldMathError};
pub use exponent::{CurveExponent, FeeRegime, SECONDS_PER_4_YEARS};
pub use fees::PrincipalFlow;
pub use liquidity::{
    BurnQuote, LiquidityMath, LiquiditySplit, MintQuote, PreciseLiquidity, ReferenceLiquidity,
};
pub use pricing::{Asset, FeeMode, PreciseMath, ReferenceMath, TradeKind, YieldMath};

/// Common types for callers
pub use rust_decimal::Decimal;
pub use yieldspace_types::{BaseUnits, PoolSnapshot, Reserves};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selectable decimal backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// 72-digit `primitive-types` engine
    #[default]
    Precise,
    /// 70-digit `ruint` engine
    Reference,
}

impl Backend {
    pub fn digits(self) -> u32 {
        match self {
            Backend::Precise => <PreciseMantissa as Mantissa>::DIGITS,
            Backend::Reference => <ReferenceMantissa as Mantissa>::DIGITS,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Precise => write!(f, "precise"),
            Backend::Reference => write!(f, "reference"),
        }
    }
}

impl FromStr for Backend {
    type Err = YieldMathError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "precise" => Ok(Backend::Precise),
            "reference" => Ok(Backend::Reference),
            other => Err(YieldMathError::Domain(format!("unknown backend '{}'", other))),
        }
    }
}

/// Architecture diagram showing the pricing data flow
#[cfg_attr(doc, aquamarine::aquamarine)]
/// ```mermaid
/// graph LR
///     subgraph Input["📊 Caller Snapshot"]
///         RV[Reserves Z, Y]
///         SP[Liquidity Supply]
///         TM[Time to Maturity]
///     end
///
///     subgraph Engine["🧮 Curve Math"]
///         EX[Curve Exponent a]
///         PR[Trade Pricing]
///         FE[Fee Evaluator]
///         LQ[Mint / Burn / Split]
///     end
///
///     subgraph Decimal["🔢 Decimal Engine"]
///         PD[Precise 72 digits]
///         RD[Reference 70 digits]
///     end
///
///     subgraph Output["🎯 Caller Decisions"]
///         QT[Quotes]
///         AN[APR / Collateral]
///         SL[Slippage Limits]
///     end
///
///     TM --> EX
///     RV --> PR
///     EX --> PR
///     PR --> FE
///     RV --> LQ
///     SP --> LQ
///
///     PR --> PD
///     PR --> RD
///
///     PR --> QT
///     FE --> QT
///     LQ --> QT
///     QT --> SL
///     QT --> AN
///
///     style Input fill:#e1f5fe
///     style Engine fill:#fff3e0
///     style Decimal fill:#f3e5f5
///     style Output fill:#e8f5e9
/// ```
pub fn architecture_diagram() {
    // Rendered by aquamarine in rustdoc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("precise".parse::<Backend>().unwrap(), Backend::Precise);
        assert_eq!(" Reference ".parse::<Backend>().unwrap(), Backend::Reference);
        assert!("float".parse::<Backend>().is_err());
        assert_eq!(Backend::default(), Backend::Precise);
        assert_eq!(Backend::Reference.to_string(), "reference");
        assert_eq!(Backend::Precise.digits(), 72);
        assert_eq!(Backend::Reference.digits(), 70);
    }

    #[test]
    fn test_backend_serde() {
        let json = serde_json::to_string(&Backend::Reference).unwrap();
        assert_eq!(json, "\"reference\"");
        let parsed: Backend = serde_json::from_str("\"precise\"").unwrap();
        assert_eq!(parsed, Backend::Precise);
    }
}
