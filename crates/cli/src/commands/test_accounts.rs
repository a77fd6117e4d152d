// Path: crates/cli/src/commands/test_accounts.rs
//! The `test-accounts` subcommand: probes the configured source ledger for
//! reachability and recent tagged-transaction activity.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use certen_clients::source_ledger::{HttpSourceLedgerClient, SourceLedgerClient};

use crate::util::{load_config, ExitCode};

#[derive(Parser, Debug)]
pub struct TestAccountsArgs {
    /// Path to the validator's TOML config file.
    #[clap(long, default_value = "validator.toml")]
    pub config: PathBuf,
    /// How many blocks back from the tip to search for tagged transactions.
    #[clap(long, default_value = "100")]
    pub lookback: u64,
}

pub async fn run(args: TestAccountsArgs) -> Result<ExitCode> {
    let config = load_config(&args.config)?;
    let source = HttpSourceLedgerClient::new(config.endpoints.source_endpoint.clone());

    let latest = match source.get_latest_block().await {
        Ok(height) => height,
        Err(e) => {
            eprintln!("source ledger unreachable: {e}");
            return Ok(ExitCode::Runtime);
        }
    };
    println!("source ledger reachable, latest block: {latest}");

    let from = latest.saturating_sub(args.lookback);
    let tagged = source
        .search_tagged_transactions(from, latest)
        .await
        .context("searching tagged transactions")?;
    println!("tagged transactions in [{from}, {latest}]: {}", tagged.len());
    for tx in tagged.iter().take(10) {
        println!("  {} @ account {} (block {})", tx.tx_hash.to_hex(), tx.account_url, tx.block_height);
    }

    Ok(ExitCode::Success)
}
