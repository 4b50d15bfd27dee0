//! # YieldSpace Configuration
//!
//! Layered configuration for the quoting tools built on `yieldspace-amm`.
//!
//! ## Features
//!
//! - **Engine Selection**: which decimal backend evaluates the curve
//! - **Analytics Tunables**: APR bounds and the liquidation ratio
//! - **Quote Policy**: caller-side slippage tolerance
//! - **Logging**: default level and JSON output
//!
//! ## Usage
//!
//! ```rust,no_run
//! use yieldspace_config::load_config;
//!
//! // config/yieldspace.toml, then config/environments/audit.toml,
//! // then YIELDSPACE_* variables
//! let config = load_config(None, Some("audit"))?;
//! println!("backend: {}", config.engine.backend);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod defaults;
pub mod quoter_config;

// Re-export commonly used types
pub use quoter_config::{
    expand_path, load_config, EngineConfig, GlobalConfig, QuoteConfig, QuoterConfig,
};
