// Path: crates/cli/src/commands/anchor.rs
//! The `anchor <batch-id>` subcommand: force-closes and submits a batch to
//! the target chain. Since the shipped repositories are in-memory only and
//! do not survive a process boundary, the batch to anchor is supplied as a
//! JSON file rather than looked up live by id.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use certen_clients::target_chain::JsonRpcTargetChainClient;
use certen_storage::{InMemoryAnchorRepository, InMemoryConfirmationRepository, InMemoryProofRepository};
use certen_types::batch::{merkle_root, Batch, BatchStatus};

use crate::pipeline::{now_nanos, AnchorSubmitter};
use crate::util::{load_config, ExitCode};

#[derive(Parser, Debug)]
pub struct AnchorArgs {
    /// The batch id to anchor, hex-encoded. Must match the `batch_id` field
    /// inside `--batch-file`.
    pub batch_id: String,
    /// Path to a JSON-serialized `Batch` (as produced by the batching
    /// pipeline) to force-close and anchor.
    #[clap(long)]
    pub batch_file: PathBuf,
    /// Path to the validator's TOML config file.
    #[clap(long, default_value = "validator.toml")]
    pub config: PathBuf,
}

pub async fn run(args: AnchorArgs) -> Result<ExitCode> {
    let config = load_config(&args.config)?;

    let raw = std::fs::read_to_string(&args.batch_file)
        .with_context(|| format!("reading batch file {}", args.batch_file.display()))?;
    let mut batch: Batch = serde_json::from_str(&raw).context("parsing batch file as JSON")?;

    if batch.batch_id.to_hex() != args.batch_id.trim_start_matches("0x") {
        bail!(
            "batch file batch_id {} does not match requested batch id {}",
            batch.batch_id.to_hex(),
            args.batch_id
        );
    }

    if batch.status != BatchStatus::Closed {
        let now = now_nanos();
        batch.merkle_root = merkle_root(&batch.leaf_hashes);
        batch.status = BatchStatus::Closed;
        batch.closed_at = Some(now);
    }

    let target = Arc::new(JsonRpcTargetChainClient::new(
        config.endpoints.target_endpoint.clone(),
        config.endpoints.contract_address.clone(),
    ));
    let anchor_repo = Arc::new(InMemoryAnchorRepository::default());
    let confirmation_repo = Arc::new(InMemoryConfirmationRepository::default());
    let proof_repo = Arc::new(InMemoryProofRepository::default());

    let submitter = AnchorSubmitter::new(
        target,
        anchor_repo,
        confirmation_repo,
        proof_repo,
        config.endpoints.contract_address.clone(),
    );

    match submitter.submit_batch(&batch).await {
        Ok(bundle_id) => {
            println!("anchored batch {} as bundle {}", batch.batch_id.to_hex(), bundle_id.to_hex());
            Ok(ExitCode::Success)
        }
        Err(e) => {
            eprintln!("anchoring failed: {e}");
            Ok(ExitCode::Runtime)
        }
    }
}
