//! Configuration defaults
//!
//! Values used when neither the config files nor the environment set them.

/// Config file read when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/yieldspace.toml";

/// Directory, relative to the base file, holding `<env>.toml` overrides
pub const ENVIRONMENTS_DIR: &str = "environments";

/// Prefix for environment variable overrides, e.g.
/// `YIELDSPACE_QUOTE__SLIPPAGE_TOLERANCE=0.01`
pub const ENV_PREFIX: &str = "YIELDSPACE";

/// Separates nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Log level when `RUST_LOG` is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Quote defaults
pub mod quote {
    use rust_decimal::Decimal;

    /// Half a percent of the quoted output
    pub fn slippage_tolerance() -> Decimal {
        Decimal::new(5, 3)
    }
}
