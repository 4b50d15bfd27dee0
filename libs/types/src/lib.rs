//! # YieldSpace Types
//!
//! Value types shared between the YieldSpace math engine and its callers.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: token amounts are 18-decimal fixed-point integers
//! - **Immutable Snapshots**: reserves and supply are passed by value on every call
//! - **Clear Boundaries**: human-readable decimals are converted only at the edges
//!
//! ## Quick Start
//!
//! ```rust
//! use yieldspace_types::{BaseUnits, PoolSnapshot, Reserves};
//!
//! let reserves = Reserves::new(
//!     BaseUnits::from_decimal_str("1450000").unwrap(),
//!     BaseUnits::from_decimal_str("1023400").unwrap(),
//! );
//! let snapshot = PoolSnapshot::new(reserves, BaseUnits::from_whole(1_023_400), 86_400);
//! assert_eq!(snapshot.reserves.base.to_decimal_string(), "1450000");
//! ```

pub mod common;
pub mod pool;

pub use common::errors::FixedPointError;
pub use common::fixed_point::BaseUnits;
pub use pool::{PoolSnapshot, Reserves};

/// 256-bit integer backing [`BaseUnits`]
pub use primitive_types::U256;
