//! Error types for fixed-point base-unit parsing and arithmetic
//!
//! Base units cross every boundary of the engine as exact integers, so any
//! input that cannot be represented exactly is rejected instead of rounded.

use thiserror::Error;

/// Errors that can occur when building or combining [`BaseUnits`](super::fixed_point::BaseUnits)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixedPointError {
    /// Input is not a plain decimal number
    #[error("Invalid decimal string: '{input}' - expected numeric format")]
    InvalidDecimal { input: String },

    /// Value does not fit the 256-bit base-unit range
    #[error("Overflow: value '{input}' exceeds the 256-bit base-unit range")]
    Overflow { input: String },

    /// Base units are unsigned
    #[error("Negative value '{input}' cannot be represented in base units")]
    Negative { input: String },

    /// More fractional digits than the 18-decimal scale can hold
    #[error("Precision loss: '{input}' has more than {max_decimals} fractional digits")]
    PrecisionLoss { input: String, max_decimals: u32 },

    /// Checked arithmetic left the representable range
    #[error("Arithmetic {operation} out of range")]
    OutOfRange { operation: &'static str },
}
