//! Command execution over a chosen decimal backend

use crate::{Command, PoolArgs};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use rust_decimal::Decimal;
use tracing::debug;
use yieldspace_amm::{
    Analytics, Asset, BigDecimal, FeeMode, LiquidityMath, Mantissa, PrincipalFlow, TradeKind,
    YieldMath,
};
use yieldspace_config::QuoterConfig;
use yieldspace_types::{BaseUnits, U256};

pub fn execute<M: Mantissa>(command: &Command, config: &QuoterConfig) -> Result<()> {
    match command {
        Command::Trade {
            kind,
            pool,
            amount,
            maturity_in,
        } => trade::<M>((*kind).into(), pool, *amount, *maturity_in, config),

        Command::Mint {
            pool,
            supply,
            base_in,
        } => {
            let quote = LiquidityMath::<M>::mint(&pool.reserves(), *supply, *base_in)?;
            let (tokens, principal) = quote.to_base_units()?;
            header("mint");
            print_units("tokens minted", tokens);
            print_units("principal required", principal);
            Ok(())
        }

        Command::Burn {
            pool,
            supply,
            tokens,
        } => {
            let quote = LiquidityMath::<M>::burn(&pool.reserves(), *supply, *tokens)?;
            let (base, principal) = quote.to_base_units()?;
            header("burn");
            print_units("base out", base);
            print_units("principal out", principal);
            Ok(())
        }

        Command::Split { pool, amount } => {
            let split = LiquidityMath::<M>::split_liquidity(&pool.reserves(), *amount)?;
            let (base, principal) = split.to_base_units()?;
            header("split");
            print_units("base portion", base);
            print_units("principal portion", principal);
            Ok(())
        }

        Command::Apr {
            rate,
            amount,
            maturity_in,
        } => {
            let analytics = Analytics::<M>::new(config.analytics.clone());
            let from = chrono::Utc::now().timestamp().max(0) as u64;
            let maturity = from
                .checked_add(*maturity_in)
                .context("maturity overflows the clock")?;
            let maturity_date = i64::try_from(maturity)
                .ok()
                .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
                .context("maturity is not a representable date")?;

            header("apr");
            println!("  {:<20} {}", "maturity", maturity_date.to_rfc3339());
            match analytics.calculate_apr(*rate, *amount, maturity, Some(from))? {
                Some(apr) => println!("  {:<20} {}%", "apr", apr.round_dp(6)),
                None => println!(
                    "  {:<20} {}",
                    "apr",
                    "outside configured bounds".yellow()
                ),
            }
            Ok(())
        }

        Command::Collateral {
            amount,
            price,
            debt,
            percent,
            liquidation_ratio,
        } => {
            let analytics = Analytics::<M>::new(config.analytics.clone());
            let ratio = liquidation_ratio.unwrap_or(config.analytics.liquidation_ratio);

            header("collateral");
            match analytics.collateralization_ratio(*amount, *price, *debt, *percent)? {
                Some(value) => {
                    let suffix = if *percent { "%" } else { "" };
                    println!("  {:<20} {}{}", "ratio", value.round_dp(6), suffix);
                }
                None => println!("  {:<20} {}", "ratio", "no debt".dimmed()),
            }
            let power = analytics.borrowing_power_at(*amount, *price, *debt, ratio)?;
            println!("  {:<20} {}", "liquidation ratio", ratio);
            print_units("borrowing power", power.to_base_units()?);
            Ok(())
        }

        Command::ShowConfig => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn trade<M: Mantissa>(
    kind: TradeKind,
    pool: &PoolArgs,
    amount: BaseUnits,
    maturity_in: u64,
    config: &QuoterConfig,
) -> Result<()> {
    let reserves = pool.reserves();
    let out = YieldMath::<M>::quote(kind, &reserves, amount, maturity_in, FeeMode::Applied)?;
    let quoted = quoted_units(&out, kind.is_sell())?;
    debug!(%kind, %quoted, backend = M::NAME, "trade quoted");

    header(&kind.to_string());
    println!(
        "  {:<20} {} {}",
        "amount",
        amount.to_decimal_string(),
        kind.amount_asset()
    );
    if kind.is_sell() {
        print_units(&format!("{} out", kind.quoted_asset()), quoted);
    } else {
        print_units(&format!("{} in", kind.quoted_asset()), quoted);
    }

    if let Some(flow) = principal_flow(kind) {
        let fee = YieldMath::<M>::get_fee(&reserves, flow, amount, maturity_in)?;
        print_units("fee (base)", fee.to_base_units()?);
    }

    let slippage = config.quote.slippage_tolerance;
    let limit = slippage_limit(quoted, slippage, kind.is_sell())?;
    let label = if kind.is_sell() { "min out" } else { "max in" };
    println!(
        "  {:<20} {} ({} slippage)",
        label,
        limit.to_decimal_string().green(),
        slippage
    );
    Ok(())
}

/// Sells receive the floored output, buys pay the rounded-up input
fn quoted_units<M: Mantissa>(out: &BigDecimal<M>, is_sell: bool) -> Result<BaseUnits> {
    let units = if is_sell {
        out.to_base_units()?
    } else {
        out.to_base_units_ceil()?
    };
    Ok(units)
}

/// Fee direction for trades whose fixed leg is principal
fn principal_flow(kind: TradeKind) -> Option<PrincipalFlow> {
    match (kind.amount_asset(), kind.is_sell()) {
        (Asset::Principal, true) => Some(PrincipalFlow::Sell),
        (Asset::Principal, false) => Some(PrincipalFlow::Buy),
        (Asset::Base, _) => None,
    }
}

/// `quoted ∓ floor(quoted * slippage)`: a floor on what a sell receives, a
/// ceiling on what a buy pays
fn slippage_limit(quoted: BaseUnits, slippage: Decimal, is_sell: bool) -> Result<BaseUnits> {
    if slippage.is_sign_negative() || slippage >= Decimal::ONE {
        bail!("slippage tolerance {} outside [0, 1)", slippage);
    }

    let numerator = U256::from(slippage.mantissa().unsigned_abs());
    let denominator = U256::exp10(slippage.scale() as usize);
    let margin = quoted
        .raw()
        .checked_mul(numerator)
        .context("slippage margin overflows 256 bits")?
        / denominator;
    let margin = BaseUnits::from_raw(margin);

    let limit = if is_sell {
        quoted.checked_sub(margin)?
    } else {
        quoted.checked_add(margin)?
    };
    Ok(limit)
}

fn header(title: &str) {
    println!("{}", title.to_uppercase().bold());
}

fn print_units(label: &str, units: BaseUnits) {
    println!("  {:<20} {} ({})", label, units.to_decimal_string(), units);
}
