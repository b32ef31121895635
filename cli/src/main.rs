mod file_storage;
mod price;
mod runner;
mod supabase;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use file_storage::FileStorage;
use runner::CliSession;
use supabase::SupabaseLedger;
use tonmine_api::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let command = std::env::var("COMMAND").context("Missing COMMAND env var")?;
    match command.as_str() {
        "rate" => log_rate()?,
        "price" => log_price().await?,
        "earnings" => log_earnings().await?,
        "run" => run().await?,
        "sync" => sync().await?,
        "claim" => claim().await?,
        "deposit" => deposit().await?,
        "withdraw" => withdraw().await?,
        _ => anyhow::bail!("Invalid command: {}", command),
    };
    Ok(())
}

/// Current unix time in milliseconds.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

/// Computes a rate offline.
/// Usage: COMMAND=rate BALANCE=<ton> [DAYS=<n>] [REFERRALS=<n>]
fn log_rate() -> Result<(), anyhow::Error> {
    let config = config()?;
    let balance: f64 = env_required("BALANCE")?;
    let days: u64 = env_parse("DAYS")?.unwrap_or(0);
    let referrals: Option<u32> = env_parse("REFERRALS")?;
    let rate = earning_rate(balance, days, config.base_roi, referrals);

    println!("Rate");
    println!("  balance: {} TON", balance);
    println!("  base_roi: {}", config.base_roi);
    println!("  days_staked: {}", days);
    println!("  day_multiplier: {:.2}x", day_multiplier(days));
    if let Some(referrals) = referrals {
        println!(
            "  referral_multiplier: {:.2}x ({} referrals)",
            referral_multiplier(referrals),
            referrals
        );
    }
    println!("  active: {}", rate.is_active);
    println!("  daily: {:.6} TON", rate.daily);
    println!("  per_second: {:.10} TON", rate.per_second);
    Ok(())
}

/// Usage: COMMAND=price [CURRENCY=usd]
async fn log_price() -> Result<(), anyhow::Error> {
    let currency = std::env::var("CURRENCY").unwrap_or("usd".into());
    let price = price::fetch_ton_price(&reqwest::Client::new(), &currency).await?;
    println!("TON: {} {}", price, currency.to_uppercase());
    Ok(())
}

async fn log_earnings() -> Result<(), anyhow::Error> {
    let mut session = open_session(false).await?;
    let now = now_ms();
    runner::print_status(&session, now);

    let currency = std::env::var("CURRENCY").unwrap_or("usd".into());
    match price::fetch_ton_price(&reqwest::Client::new(), &currency).await {
        Ok(price) => {
            if let Some(state) = session.state() {
                println!(
                    "  value: {:.4} {}",
                    state.current_earnings * price,
                    currency.to_uppercase()
                );
            }
        }
        Err(err) => tracing::warn!("Price feed unavailable: {}", err),
    }

    session.teardown(now).await;
    Ok(())
}

/// Runs the accrual loop until ctrl-c.
/// Usage: COMMAND=run USER_ID=<id>
async fn run() -> Result<(), anyhow::Error> {
    let mut session = open_session(true).await?;
    runner::print_status(&session, now_ms());
    runner::run(&mut session).await
}

/// Reconciles local and server earnings once.
async fn sync() -> Result<(), anyhow::Error> {
    let mut session = open_session(false).await?;
    let now = now_ms();
    session.teardown(now).await;
    println!("Synced");
    runner::print_status(&session, now);
    Ok(())
}

async fn claim() -> Result<(), anyhow::Error> {
    let mut session = open_session(false).await?;
    let claimed = session.claim(now_ms()).await?;
    println!("Claimed {:.9} TON", claimed);
    Ok(())
}

/// Reports a confirmed wallet deposit.
/// Usage: COMMAND=deposit AMOUNT=<ton> WALLET_BALANCE=<ton> TX_HASH=<hash>
async fn deposit() -> Result<(), anyhow::Error> {
    let amount: f64 = env_required("AMOUNT")?;
    let wallet_balance: f64 = env_required("WALLET_BALANCE")?;
    let tx_hash = std::env::var("TX_HASH").context("Missing TX_HASH env var")?;

    // Reject bad input before touching the ledger.
    validate_deposit(amount, wallet_balance)?;

    let mut session = open_session(false).await?;
    let now = now_ms();
    session.deposit(amount, wallet_balance, &tx_hash, now).await?;
    println!("Deposited {} TON", amount);
    runner::print_status(&session, now);
    Ok(())
}

/// Usage: COMMAND=withdraw AMOUNT=<ton> ADDRESS=<ton address>
async fn withdraw() -> Result<(), anyhow::Error> {
    let amount: f64 = env_required("AMOUNT")?;
    let address = std::env::var("ADDRESS").context("Missing ADDRESS env var")?;

    let mut session = open_session(false).await?;
    let now = now_ms();
    session.withdraw(amount, &address, now).await?;
    println!("Withdrawal of {} TON to {} requested", amount, address);
    runner::print_status(&session, now);
    Ok(())
}

async fn open_session(onboarding: bool) -> Result<CliSession, anyhow::Error> {
    let user_id = UserId(env_required("USER_ID")?);
    let url = std::env::var("SUPABASE_URL").context("Missing SUPABASE_URL env var")?;
    let key = std::env::var("SUPABASE_KEY").context("Missing SUPABASE_KEY env var")?;
    let ledger = SupabaseLedger::new(&url, &key)?;

    let mut store = EarningsStore::new(open_storage()?, user_id);
    if onboarding && !store.has_seen_onboarding()? {
        println!("Welcome to TONMINE!");
        println!("Your staked TON earns every second. Earnings sync every minute");
        println!("and keep accruing while you are away.");
        println!();
        store.mark_onboarding_seen()?;
    }

    let mut session = EarningsSession::new(store, ledger, config()?);
    session.initialize(now_ms()).await?;
    Ok(session)
}

fn open_storage() -> Result<FileStorage, anyhow::Error> {
    let path = match std::env::var("STORAGE_PATH") {
        Ok(path) => PathBuf::from(path),
        Err(_) => FileStorage::default_path().context("No data directory, set STORAGE_PATH")?,
    };
    let storage = FileStorage::open(path)?;
    tracing::debug!("Using storage at {}", storage.path().display());
    Ok(storage)
}

fn config() -> Result<EarningsConfig, anyhow::Error> {
    let mut config = EarningsConfig::default();
    if let Some(base_roi) = env_parse("BASE_ROI")? {
        config.base_roi = base_roi;
    }
    if let Some(seconds) = env_parse::<i64>("SYNC_INTERVAL")? {
        config.sync_interval_ms = seconds * ONE_SECOND_MS;
    }
    if let Some(seconds) = env_parse::<i64>("CLAIM_COOLDOWN")? {
        config.claim_cooldown_ms = seconds * ONE_SECOND_MS;
    }
    Ok(config)
}

fn env_parse<T>(name: &str) -> Result<Option<T>, anyhow::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("Invalid {}", name))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

fn env_required<T>(name: &str) -> Result<T, anyhow::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_parse(name)?.with_context(|| format!("Missing {} env var", name))
}
