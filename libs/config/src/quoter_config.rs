//! Quoter Configuration Module
//!
//! Provides configuration loading for the YieldSpace quoting tools.
//! Supports loading from TOML files with environment-specific overrides
//! and `YIELDSPACE_*` environment variables on top.

use crate::defaults::{self, DEFAULT_CONFIG_PATH, ENVIRONMENTS_DIR, ENV_PREFIX, ENV_SEPARATOR};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use yieldspace_amm::{AnalyticsConfig, Backend};

/// Main quoter configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct QuoterConfig {
    /// Global settings
    pub global: GlobalConfig,

    /// Decimal engine selection
    pub engine: EngineConfig,

    /// APR bounds and collateral threshold
    pub analytics: AnalyticsConfig,

    /// Caller-side quoting policy
    pub quote: QuoteConfig,
}

/// Global configuration settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GlobalConfig {
    pub log_level: String,
    pub json_logs: bool,
}

/// Decimal engine settings
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub backend: Backend,
}

/// Quoting policy applied outside the curve math
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct QuoteConfig {
    /// Fraction of the quoted output given up as slippage margin
    pub slippage_tolerance: Decimal,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            slippage_tolerance: defaults::quote::slippage_tolerance(),
        }
    }
}

impl QuoterConfig {
    /// Load configuration from files with environment overrides
    ///
    /// Sources, lowest priority first: the base file, then
    /// `environments/<env>.toml` next to it, then `YIELDSPACE_*` variables.
    /// Without an explicit path a missing default file is not an error.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        Self::load_with_prefix(base_path, environment, ENV_PREFIX)
    }

    fn load_with_prefix(
        base_path: Option<&Path>,
        environment: Option<&str>,
        env_prefix: &str,
    ) -> Result<Self> {
        let (base, required) = match base_path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let mut builder = Config::builder().add_source(File::from(base.as_path()).required(required));

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = base
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(ENVIRONMENTS_DIR)
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (YIELDSPACE_ prefix)
        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let loaded: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        debug!(backend = %loaded.engine.backend, "configuration loaded");

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings the quoting tools cannot act on
    pub fn validate(&self) -> Result<()> {
        let bounds = &self.analytics.apr_bounds;
        if bounds.min_percent > bounds.max_percent {
            bail!(
                "analytics.apr_bounds: min_percent {} exceeds max_percent {}",
                bounds.min_percent,
                bounds.max_percent
            );
        }

        if self.analytics.liquidation_ratio <= Decimal::ZERO {
            bail!(
                "analytics.liquidation_ratio must be positive, got {}",
                self.analytics.liquidation_ratio
            );
        }

        let slippage = self.quote.slippage_tolerance;
        if slippage < Decimal::ZERO || slippage >= Decimal::ONE {
            bail!("quote.slippage_tolerance must be in [0, 1), got {}", slippage);
        }

        Ok(())
    }

    /// Render as TOML, e.g. to seed a new config file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Expand `~` and `$VARS` in a user-supplied path
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw).context("Failed to expand config path")?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Convenience function to load configuration with defaults
pub fn load_config(path: Option<&str>, environment: Option<&str>) -> Result<QuoterConfig> {
    let path = path.map(expand_path).transpose()?;
    QuoterConfig::load(path.as_deref(), environment)
}
