mod cli;
mod config;
mod dispatch;
mod error;
mod extract;
mod ledger;
mod monitor;
mod scanner;
mod sheets;
mod telegram;
#[cfg(test)]
mod testutil;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command};
use config::RelayConfig;
use dispatch::{LinkDispatcher, QuotaDispatcher};
use ledger::{QuotaColumns, QuotaLedger};
use monitor::{Monitor, ScanSummary};
use scanner::ColumnMap;
use sheets::{SheetsAuth, SheetsClient};
use telegram::TelegramClient;
use ui::WatchProgress;

const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RelayConfig::load(cli.config.as_deref())?;
    if let Some(interval) = cli.interval {
        config.poll_interval_seconds = interval;
    }
    config.validate()?;

    match cli.command {
        Command::Watch => watch(&config, cli.verbose).await,
        Command::Quota => quota(&config, cli.verbose).await,
        Command::Scan => scan(&config).await,
    }
}

/// Opens the work sheet: id from config (or resolved by name through Drive),
/// worksheet from config (or the first sheet). Any failure here is fatal;
/// the supervisor outside this process handles restarts.
async fn open_work_store(config: &RelayConfig, auth: &SheetsAuth) -> Result<SheetsClient> {
    println!(
        "✔ Sheets authenticated as {}",
        auth.service_account.client_email
    );
    let mut store = SheetsClient::new(auth.bearer_token.clone(), config.spreadsheet_id.clone());
    if config.spreadsheet_id.trim().is_empty() {
        store
            .resolve_by_name(&config.spreadsheet_name)
            .await
            .with_context(|| format!("resolving spreadsheet '{}'", config.spreadsheet_name))?;
    }
    store
        .resolve_worksheet(config.worksheet.as_deref())
        .await
        .context("resolving worksheet")?;
    Ok(store)
}

/// Opens the quota ledger sheet inside the same spreadsheet.
async fn open_quota_store(
    config: &RelayConfig,
    auth: &SheetsAuth,
    spreadsheet_id: &str,
) -> Result<SheetsClient> {
    let mut store = SheetsClient::new(auth.bearer_token.clone(), spreadsheet_id.to_string());
    store
        .resolve_worksheet(Some(&config.quota.worksheet))
        .await
        .with_context(|| format!("resolving quota worksheet '{}'", config.quota.worksheet))?;
    Ok(store)
}

fn telegram_from_env() -> Result<TelegramClient> {
    let token = std::env::var(TELEGRAM_TOKEN_ENV)
        .ok()
        .filter(|t| !t.is_empty())
        .with_context(|| format!("{TELEGRAM_TOKEN_ENV} not set"))?;
    Ok(TelegramClient::new(token))
}

fn print_banner(store: &SheetsClient, config: &RelayConfig) {
    println!(
        "Watching sheet '{}' column {} → status in {}",
        store.worksheet(),
        config.watch_column,
        config.status_column
    );
}

async fn watch(config: &RelayConfig, verbose: bool) -> Result<()> {
    let auth = SheetsAuth::from_env()?;
    let sender = telegram_from_env()?;
    let store = open_work_store(config, &auth).await?;
    let cols = ColumnMap::new(&config.watch_column, &config.status_column, None)?;

    print_banner(&store, config);
    let progress = WatchProgress::start("watching");

    let store = Arc::new(store);
    let dispatcher = LinkDispatcher::new(
        Arc::clone(&store),
        sender,
        config.downstream_target.clone(),
        cols.status,
        Duration::from_secs(config.send_timeout_seconds),
    );
    Monitor::new(
        store,
        dispatcher,
        cols,
        Duration::from_secs(config.poll_interval_seconds),
        Duration::from_secs(config.error_backoff_seconds),
        progress,
        verbose,
    )
    .run()
    .await;
    Ok(())
}

async fn quota(config: &RelayConfig, verbose: bool) -> Result<()> {
    let auth = SheetsAuth::from_env()?;
    let sender = telegram_from_env()?;
    let store = open_work_store(config, &auth).await?;
    let quota_store = open_quota_store(config, &auth, store.spreadsheet_id()).await?;
    let cols = ColumnMap::new(
        &config.watch_column,
        &config.status_column,
        Some(&config.email_column),
    )?;
    let quota_cols = QuotaColumns {
        submitter: scanner::parse_column(&config.quota.email_column)?,
        allowed: scanner::parse_column(&config.quota.allowed_column)?,
        used: scanner::parse_column(&config.quota.used_column)?,
    };

    print_banner(&store, config);
    let progress = WatchProgress::start("watching (quota mode)");

    let store = Arc::new(store);
    let ledger = QuotaLedger::new(quota_store, quota_cols);
    let dispatcher = QuotaDispatcher::new(
        Arc::clone(&store),
        ledger,
        sender,
        config.downstream_target.clone(),
        cols.status,
        Duration::from_secs(config.send_timeout_seconds),
        Duration::from_secs(config.send_delay_seconds),
    );
    Monitor::new(
        store,
        dispatcher,
        cols,
        Duration::from_secs(config.poll_interval_seconds),
        Duration::from_secs(config.error_backoff_seconds),
        progress,
        verbose,
    )
    .run()
    .await;
    Ok(())
}

async fn scan(config: &RelayConfig) -> Result<()> {
    let auth = SheetsAuth::from_env()?;
    let store = open_work_store(config, &auth).await?;
    let cols = ColumnMap::new(&config.watch_column, &config.status_column, None)?;

    let rows = scanner::scan(&store, &cols).await?;
    let summary = ScanSummary::from_rows(&rows);
    ui::print_scan_summary(store.worksheet(), &summary);
    Ok(())
}
