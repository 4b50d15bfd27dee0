//! yield-quote: YieldSpace pool quoting tool
//!
//! Reads a pool snapshot from flags, evaluates the curve on the configured
//! decimal backend and prints the results. Amounts are nominal decimals
//! (`1.5` = 1.5 tokens) and are converted to 18-decimal base units before
//! touching the math.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{
    fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use yieldspace_amm::{Backend, PreciseMantissa, ReferenceMantissa, TradeKind};
use yieldspace_config::{defaults::DEFAULT_LOG_LEVEL, load_config, QuoterConfig};
use yieldspace_types::{BaseUnits, FixedPointError, Reserves};

mod quote;

#[derive(Parser, Debug)]
#[command(name = "yield-quote")]
#[command(author, version, about = "Quote trades and liquidity on a YieldSpace pool")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Environment override to apply (config/environments/<env>.toml)
    #[arg(short, long, global = true, env = "YIELDSPACE_ENV")]
    env: Option<String>,

    /// Decimal backend (precise, reference); overrides the config file
    #[arg(short, long, global = true)]
    backend: Option<Backend>,

    /// Log level when RUST_LOG is unset; overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price one of the four curve trades
    Trade {
        /// Trade to price
        #[arg(value_enum)]
        kind: TradeArg,
        #[command(flatten)]
        pool: PoolArgs,
        /// Trade size in the fixed leg's asset
        #[arg(long, value_parser = parse_nominal)]
        amount: BaseUnits,
        /// Seconds until the principal token matures
        #[arg(long)]
        maturity_in: u64,
    },
    /// Shares minted for a base deposit
    Mint {
        #[command(flatten)]
        pool: PoolArgs,
        /// Outstanding liquidity token supply
        #[arg(long, value_parser = parse_nominal)]
        supply: BaseUnits,
        /// Base deposited
        #[arg(long, value_parser = parse_nominal)]
        base_in: BaseUnits,
    },
    /// Reserves released by burning shares
    Burn {
        #[command(flatten)]
        pool: PoolArgs,
        /// Outstanding liquidity token supply
        #[arg(long, value_parser = parse_nominal)]
        supply: BaseUnits,
        /// Shares burned
        #[arg(long, value_parser = parse_nominal)]
        tokens: BaseUnits,
    },
    /// Divide an amount in the pool's base/principal ratio
    Split {
        #[command(flatten)]
        pool: PoolArgs,
        /// Amount to divide
        #[arg(long, value_parser = parse_nominal)]
        amount: BaseUnits,
    },
    /// Annualized yield of a fixed-rate position
    Apr {
        /// Amount paid now
        #[arg(long, value_parser = parse_nominal)]
        rate: BaseUnits,
        /// Amount received at maturity
        #[arg(long, value_parser = parse_nominal)]
        amount: BaseUnits,
        /// Seconds until maturity
        #[arg(long)]
        maturity_in: u64,
    },
    /// Collateralization ratio and remaining borrowing power
    Collateral {
        /// Collateral held
        #[arg(long, value_parser = parse_nominal)]
        amount: BaseUnits,
        /// Price of one collateral token in debt tokens
        #[arg(long, value_parser = parse_nominal)]
        price: BaseUnits,
        /// Outstanding debt
        #[arg(long, value_parser = parse_nominal)]
        debt: BaseUnits,
        /// Report the ratio as a percentage
        #[arg(long)]
        percent: bool,
        /// Override the configured liquidation ratio
        #[arg(long)]
        liquidation_ratio: Option<Decimal>,
    },
    /// Print the effective configuration as TOML
    ShowConfig,
}

/// Pool reserves shared by the curve commands
#[derive(Args, Debug, Clone)]
struct PoolArgs {
    /// Base reserve
    #[arg(long, value_parser = parse_nominal)]
    base: BaseUnits,
    /// Principal reserve (virtual, including the liquidity supply)
    #[arg(long, value_parser = parse_nominal)]
    principal: BaseUnits,
}

impl PoolArgs {
    fn reserves(&self) -> Reserves {
        Reserves::new(self.base, self.principal)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum TradeArg {
    SellBase,
    SellPrincipal,
    BuyBase,
    BuyPrincipal,
}

impl From<TradeArg> for TradeKind {
    fn from(arg: TradeArg) -> Self {
        match arg {
            TradeArg::SellBase => TradeKind::SellBase,
            TradeArg::SellPrincipal => TradeKind::SellPrincipal,
            TradeArg::BuyBase => TradeKind::BuyBase,
            TradeArg::BuyPrincipal => TradeKind::BuyPrincipal,
        }
    }
}

fn parse_nominal(s: &str) -> Result<BaseUnits, FixedPointError> {
    BaseUnits::from_decimal_str(s)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_with_bootstrap_logging(&cli, std::io::stderr)?;
    apply_overrides(&cli, &mut config);

    init_logging(&config);
    info!(
        backend = %config.engine.backend,
        digits = config.engine.backend.digits(),
        "yield-quote {}",
        env!("CARGO_PKG_VERSION")
    );

    match config.engine.backend {
        Backend::Precise => quote::execute::<PreciseMantissa>(&cli.command, &config),
        Backend::Reference => quote::execute::<ReferenceMantissa>(&cli.command, &config),
    }
}

/// Load configuration under a temporary subscriber
///
/// The real subscriber depends on the loaded settings, so the loader's own
/// messages go through a plain one filtered by `RUST_LOG` or `--log-level`.
fn load_with_bootstrap_logging<W>(cli: &Cli, writer: W) -> Result<QuoterConfig>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let level = cli.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .finish();

    tracing::subscriber::with_default(bootstrap, || {
        load_config(cli.config.as_deref(), cli.env.as_deref())
    })
}

/// Command-line flags win over files and environment
fn apply_overrides(cli: &Cli, config: &mut QuoterConfig) {
    if let Some(backend) = cli.backend {
        config.engine.backend = backend;
    }
    if let Some(level) = &cli.log_level {
        config.global.log_level = level.clone();
    }
    if cli.json_logs {
        config.global.json_logs = true;
    }
}

fn init_logging(config: &QuoterConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.global.log_level));

    // Logs go to stderr so quotes on stdout stay pipeable
    let registry = tracing_subscriber::registry().with(filter);
    if config.global.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
