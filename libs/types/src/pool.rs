//! Immutable pool snapshots supplied by the chain-state reader
//!
//! The engine never caches or mutates reserves: callers read balances, supply
//! and maturity from the same block and hand a fresh snapshot to every call.

use crate::common::errors::FixedPointError;
use crate::common::fixed_point::BaseUnits;
use serde::{Deserialize, Serialize};

/// Pool balances of the base asset and the principal token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reserves {
    pub base: BaseUnits,
    pub principal: BaseUnits,
}

impl Reserves {
    pub fn new(base: BaseUnits, principal: BaseUnits) -> Self {
        Self { base, principal }
    }

    /// Combined holdings of both assets
    pub fn total(&self) -> Result<BaseUnits, FixedPointError> {
        self.base.checked_add(self.principal)
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_zero() && self.principal.is_zero()
    }
}

/// Reserves, liquidity supply and time-to-maturity read atomically from chain state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub reserves: Reserves,
    /// Outstanding liquidity tokens
    pub supply: BaseUnits,
    /// Seconds until the principal token matures
    pub time_to_maturity: u64,
}

impl PoolSnapshot {
    pub fn new(reserves: Reserves, supply: BaseUnits, time_to_maturity: u64) -> Self {
        Self {
            reserves,
            supply,
            time_to_maturity,
        }
    }

    /// Build a snapshot from an absolute maturity timestamp.
    ///
    /// A series at or past maturity gets `time_to_maturity = 0`.
    pub fn at(reserves: Reserves, supply: BaseUnits, maturity: u64, now: u64) -> Self {
        Self::new(reserves, supply, maturity.saturating_sub(now))
    }

    pub fn is_mature(&self) -> bool {
        self.time_to_maturity == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_maturity() {
        let reserves = Reserves::new(BaseUnits::from_whole(100), BaseUnits::from_whole(110));
        let snapshot = PoolSnapshot::at(reserves, BaseUnits::from_whole(100), 1_700_086_400, 1_700_000_000);
        assert_eq!(snapshot.time_to_maturity, 86_400);
        assert!(!snapshot.is_mature());

        let matured = PoolSnapshot::at(reserves, BaseUnits::from_whole(100), 1_600_000_000, 1_700_000_000);
        assert_eq!(matured.time_to_maturity, 0);
        assert!(matured.is_mature());
    }

    #[test]
    fn test_reserves_total() {
        let reserves = Reserves::new(BaseUnits::from_whole(2), BaseUnits::from_whole(3));
        assert_eq!(reserves.total().unwrap(), BaseUnits::from_whole(5));
        assert!(!reserves.is_empty());
        assert!(Reserves::new(BaseUnits::ZERO, BaseUnits::ZERO).is_empty());
    }
}
