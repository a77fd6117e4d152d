// Path: crates/cli/src/main.rs
//! Entry point for the `certen` validator binary.

use clap::{Parser, Subcommand};

use certen_cli::commands;
use certen_cli::commands::anchor::AnchorArgs;
use certen_cli::commands::config::ConfigCmdArgs;
use certen_cli::commands::run::RunArgs;
use certen_cli::commands::test_accounts::TestAccountsArgs;
use certen_cli::commands::verify::VerifyArgs;
use certen_cli::util::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "certen", about = "Cross-chain intent validator", version)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the long-lived validator process: discovery, proof building,
    /// batching, anchoring, confirmation tracking, attestation, write-back.
    Run(RunArgs),
    /// Probe the configured source ledger for reachability and recent
    /// tagged-transaction activity.
    TestAccounts(TestAccountsArgs),
    /// Verify a single transaction's chained and governance proofs.
    Verify(VerifyArgs),
    /// Force-close and anchor a batch loaded from a file.
    Anchor(AnchorArgs),
    /// Generate or inspect validator configuration.
    Config(ConfigCmdArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = certen_telemetry::init::init_tracing() {
        eprintln!("failed to initialize logging: {e}");
    }

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Run(args) => run_and_report(commands::run::run(args)).await,
        Commands::TestAccounts(args) => run_and_report(commands::test_accounts::run(args)).await,
        Commands::Verify(args) => run_and_report(commands::verify::run(args)).await,
        Commands::Anchor(args) => run_and_report(commands::anchor::run(args)).await,
        Commands::Config(args) => match commands::config::run(args) {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                eprintln!("{e:#}");
                ExitCode::Config
            }
        },
    };

    std::process::exit(exit_code as i32);
}

async fn run_and_report(result: impl std::future::Future<Output = anyhow::Result<ExitCode>>) -> ExitCode {
    match result.await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::Runtime
        }
    }
}
