//! Error types for curve pricing, liquidity and analytics math
//!
//! Three kinds of failure exist and callers route them differently:
//! a rejected input domain is recoverable and must not be retried with the
//! same arguments, a maturity failure means the pool should settle 1:1
//! outside the curve, and a precision failure is fatal for the call.

use thiserror::Error;
use tracing::error;

/// Errors raised by the YieldSpace math engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum YieldMathError {
    /// Inputs lie outside the function's domain (insufficient liquidity,
    /// division by zero, negative fractional-power base, ...)
    #[error("Domain error: {0}")]
    Domain(String),

    /// Time-decay exponent is not strictly positive
    #[error("Maturity error: {0}")]
    Maturity(String),

    /// The decimal engine cannot hold the value at its working precision
    #[error("Precision error: {0}")]
    Precision(String),
}

/// Discriminant of [`YieldMathError`] for callers that only branch on kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Domain,
    Maturity,
    Precision,
}

impl YieldMathError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            YieldMathError::Domain(_) => ErrorKind::Domain,
            YieldMathError::Maturity(_) => ErrorKind::Maturity,
            YieldMathError::Precision(_) => ErrorKind::Precision,
        }
    }

    /// True for domain errors caused by a trade larger than the pool can fill
    pub fn is_insufficient_liquidity(&self) -> bool {
        matches!(self, YieldMathError::Domain(msg) if msg.starts_with(INSUFFICIENT_LIQUIDITY))
    }

    pub(crate) fn domain(message: impl Into<String>) -> Self {
        YieldMathError::Domain(message.into())
    }

    pub(crate) fn insufficient_liquidity(context: impl AsRef<str>) -> Self {
        YieldMathError::Domain(format!("{}: {}", INSUFFICIENT_LIQUIDITY, context.as_ref()))
    }

    pub(crate) fn maturity(message: impl Into<String>) -> Self {
        YieldMathError::Maturity(message.into())
    }

    /// Precision failures are always logged at the point they are raised
    pub(crate) fn precision(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(reason = %message, "decimal engine precision failure");
        YieldMathError::Precision(message)
    }
}

const INSUFFICIENT_LIQUIDITY: &str = "insufficient liquidity";

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, YieldMathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(YieldMathError::domain("x").kind(), ErrorKind::Domain);
        assert_eq!(YieldMathError::maturity("x").kind(), ErrorKind::Maturity);
        assert_eq!(YieldMathError::precision("x").kind(), ErrorKind::Precision);
    }

    #[test]
    fn test_insufficient_liquidity_marker() {
        let err = YieldMathError::insufficient_liquidity("buy base exceeds reserves");
        assert!(err.is_insufficient_liquidity());
        assert_eq!(
            err.to_string(),
            "Domain error: insufficient liquidity: buy base exceeds reserves"
        );

        assert!(!YieldMathError::domain("division by zero").is_insufficient_liquidity());
    }
}
