// Path: crates/cli/src/commands/run.rs
//! The `run` subcommand: wires discovery, proof building, batching,
//! anchoring, confirmation tracking, attestation, and write-back into one
//! long-running validator process.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;

use certen_anchor::{ConfirmationTracker, EventWatcher};
use certen_attestation::{AttestationAggregator, ValidatorInfo};
use certen_batch::BatchCollector;
use certen_clients::consensus::HttpConsensusClient;
use certen_clients::peer_transport::HttpPeerValidatorTransport;
use certen_clients::source_ledger::HttpSourceLedgerClient;
use certen_clients::target_chain::JsonRpcTargetChainClient;
use certen_proof::ChainedProofBuilder;
use certen_storage::{
    InMemoryAnchorRepository, InMemoryAttestationRepository, InMemoryBatchRepository,
    InMemoryCheckpointRepository, InMemoryConfirmationRepository, InMemoryProofRepository,
    InMemoryStatusRepository,
};
use certen_types::attestation::AttestationDomain;
use certen_types::repository::{AnchorRepository, BatchRepository, ConfirmationRepository};
use certen_types::writeback::{ComprehensiveDataEntry, WriteBackStatus};
use certen_types::Result as CertenResult;
use certen_writeback::{WriteBackBuilder, WriteBackWatcher};

use crate::pipeline::{now_nanos, AnchorSubmitter, IntentDriver};
use crate::util::{load_config, parse_bls_public_key_hex, resolve_ed25519_key, ExitCode};

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the validator's TOML config file.
    #[clap(long, default_value = "validator.toml")]
    pub config: PathBuf,
    /// Chain name passed to the chained proof builder (proof scoping only;
    /// multi-chain target routing is not wired up here).
    #[clap(long, default_value = "bvn1")]
    pub chain_name: String,
}

pub async fn run(args: RunArgs) -> Result<ExitCode> {
    let config = load_config(&args.config)?;

    let source = Arc::new(HttpSourceLedgerClient::new(config.endpoints.source_endpoint.clone()));
    let target = Arc::new(JsonRpcTargetChainClient::new(
        config.endpoints.target_endpoint.clone(),
        config.endpoints.contract_address.clone(),
    ));
    let consensus = Arc::new(HttpConsensusClient::new(config.endpoints.consensus_endpoint.clone()));
    let peer_transport = Arc::new(HttpPeerValidatorTransport::new());

    let checkpoint_repo = Arc::new(InMemoryCheckpointRepository::default());
    let status_repo = Arc::new(InMemoryStatusRepository::default());
    let anchor_repo = Arc::new(InMemoryAnchorRepository::default());
    let confirmation_repo = Arc::new(InMemoryConfirmationRepository::default());
    let batch_repo = Arc::new(InMemoryBatchRepository::default());
    let proof_repo = Arc::new(InMemoryProofRepository::default());
    let attestation_repo = Arc::new(InMemoryAttestationRepository::default());

    let proof_builder = Arc::new(ChainedProofBuilder::new(
        source.clone(),
        consensus.clone(),
        args.chain_name.clone(),
        config.proof_mode,
    ));
    let max_batch_age_nanos = (config.batch.max_batch_age_secs as u128) * 1_000_000_000;
    let collector = Arc::new(BatchCollector::new(config.batch.max_batch_size, max_batch_age_nanos));

    let validator_address = config.endpoints.contract_address.clone();
    let anchor_submitter = Arc::new(AnchorSubmitter::new(
        target.clone(),
        anchor_repo.clone(),
        confirmation_repo.clone(),
        proof_repo.clone(),
        validator_address.clone(),
    ));

    let driver = Arc::new(IntentDriver {
        proof_builder: proof_builder.clone(),
        collector: collector.clone(),
        status: status_repo.clone(),
        anchor_submitter: anchor_submitter.clone(),
        chain_name: args.chain_name.clone(),
        chain_index: 0,
    });

    let worker = certen_discovery::DiscoveryWorker::new(
        source.clone(),
        checkpoint_repo.clone(),
        driver.clone(),
        config.discovery.clone(),
        Duration::from_secs(config.polling.block_poll_interval_secs),
    );

    let shutdown_token = CancellationToken::new();
    let (discovery_shutdown_tx, discovery_shutdown_rx) = tokio::sync::oneshot::channel();

    let batch_task = tokio::spawn(run_batch_closer(
        collector.clone(),
        anchor_submitter.clone(),
        batch_repo.clone(),
        shutdown_token.clone(),
    ));

    let confirmation_task = tokio::spawn(run_confirmation_tracker(
        target.clone(),
        confirmation_repo.clone(),
        proof_repo.clone(),
        attestation_repo.clone(),
        config.consensus.required_confirmations,
        Duration::from_secs(config.polling.confirmation_interval_secs),
        shutdown_token.clone(),
    ));

    let event_task = tokio::spawn(run_event_watcher(
        target.clone(),
        Duration::from_secs(config.polling.event_poll_interval_secs),
        shutdown_token.clone(),
    ));

    let validators: Vec<ValidatorInfo> = config
        .validators
        .iter()
        .map(|p| {
            let public_key = parse_bls_public_key_hex(&p.bls_public_key_hex)?;
            Ok::<_, anyhow::Error>(ValidatorInfo {
                validator_id: p.validator_id.clone(),
                peer_addr: p.peer_addr.clone(),
                public_key,
                voting_power: p.voting_power,
            })
        })
        .collect::<Result<_, _>>()
        .context("resolving configured peer validator public keys")?;

    let ed25519_key = resolve_ed25519_key(&config.endpoints.ed25519_key_ref)?;
    let writeback_principal = format!("{}/book/1", config.endpoints.contract_address);

    let finalize_task = tokio::spawn(run_finalization_loop(
        source.clone(),
        anchor_repo.clone(),
        confirmation_repo.clone(),
        batch_repo.clone(),
        attestation_repo.clone(),
        peer_transport,
        validators,
        ed25519_key,
        writeback_principal,
        Duration::from_secs(config.polling.confirmation_interval_secs),
        shutdown_token.clone(),
    ));

    tracing::info!(target = "certen_cli", config = %args.config.display(), "validator starting");

    tokio::select! {
        result = worker.run(discovery_shutdown_rx) => {
            if let Err(e) = result {
                tracing::error!(target = "certen_cli", error = %e, "discovery worker exited with error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(target = "certen_cli", "shutdown signal received");
        }
    }

    let _ = discovery_shutdown_tx.send(());
    shutdown_token.cancel();
    let _ = tokio::join!(batch_task, confirmation_task, event_task, finalize_task);

    Ok(ExitCode::Success)
}

/// Periodically closes cadence-ready batches and anchors them.
async fn run_batch_closer(
    collector: Arc<BatchCollector>,
    submitter: Arc<AnchorSubmitter<JsonRpcTargetChainClient>>,
    batch_repo: Arc<InMemoryBatchRepository>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(Duration::from_secs(5)) => {}
        }
        let now = now_nanos();
        for group_key in collector.ready_to_close(now) {
            let Some(batch) = collector.close(&group_key, now) else { continue };
            if let Err(e) = batch_repo.put(&batch).await {
                tracing::error!(target = "certen_cli", error = %e, "failed persisting closed batch");
                continue;
            }
            if let Err(e) = submitter.submit_batch(&batch).await {
                tracing::warn!(target = "certen_cli", group_key, error = %e, "batch anchor submission failed");
            }
        }
    }
}

/// Periodically ticks the confirmation tracker against the target chain.
async fn run_confirmation_tracker(
    target: Arc<JsonRpcTargetChainClient>,
    confirmation_repo: Arc<InMemoryConfirmationRepository>,
    proof_repo: Arc<InMemoryProofRepository>,
    attestation_repo: Arc<InMemoryAttestationRepository>,
    required_confirmations: u64,
    interval: Duration,
    cancel: CancellationToken,
) {
    let tracker = ConfirmationTracker::new(target, confirmation_repo, proof_repo, attestation_repo, required_confirmations);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
        if let Err(e) = tracker.tick().await {
            tracing::warn!(target = "certen_cli", error = %e, "confirmation tick failed");
        }
    }
}

/// Periodically polls the target chain's contract event log, advancing a
/// local window cursor. Findings are logged; downstream cross-referencing
/// against pending anchors is handled by the finalization loop instead.
async fn run_event_watcher(target: Arc<JsonRpcTargetChainClient>, interval: Duration, cancel: CancellationToken) {
    let watcher = EventWatcher::new(target.clone());
    let mut from_block = match target.block_number().await {
        Ok(b) => b,
        Err(_) => 0,
    };
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
        match watcher.poll_window(from_block).await {
            Ok(events) => {
                for (kind, event) in &events {
                    tracing::info!(target = "certen_cli", ?kind, block = event.block_number, tx_hash = %event.tx_hash, "contract event observed");
                }
                from_block += certen_anchor::events::EVENT_WINDOW_BLOCKS;
            }
            Err(e) => tracing::warn!(target = "certen_cli", error = %e, "event window poll failed"),
        }
    }
}

/// Watches for newly-finalized anchors, runs BLS attestation aggregation
/// over the anchor's bundle id, and submits the synthetic write-back
/// transaction that closes the proof cycle. Tracks which bundle ids have
/// already been written back in a local set, since there is no durable
/// cross-process store to check against.
#[allow(clippy::too_many_arguments)]
async fn run_finalization_loop(
    source: Arc<HttpSourceLedgerClient>,
    anchor_repo: Arc<InMemoryAnchorRepository>,
    confirmation_repo: Arc<InMemoryConfirmationRepository>,
    batch_repo: Arc<InMemoryBatchRepository>,
    attestation_repo: Arc<InMemoryAttestationRepository>,
    peer_transport: Arc<HttpPeerValidatorTransport>,
    validators: Vec<ValidatorInfo>,
    ed25519_key: certen_crypto::sign::eddsa::Ed25519KeyPair,
    principal: String,
    interval: Duration,
    cancel: CancellationToken,
) {
    let aggregator = AttestationAggregator::new(peer_transport, AttestationDomain::Attestation);
    let writeback_builder = WriteBackBuilder::new(ed25519_key, principal);
    let watcher = WriteBackWatcher::new(source.clone());
    let written_back = AsyncMutex::new(HashSet::new());

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }

        let anchors = match anchor_repo.list_unconfirmed().await {
            Ok(a) => a,
            Err(e) => {
                tracing::warn!(target = "certen_cli", error = %e, "listing anchors for finalization failed");
                continue;
            }
        };

        for anchor in anchors {
            let mut seen = written_back.lock().await;
            if seen.contains(&anchor.bundle_id) {
                continue;
            }

            let confirmation = match confirmation_repo.get(&anchor.bundle_id).await {
                Ok(Some(c)) if c.r#final => c,
                _ => continue,
            };

            if let Err(e) = finalize_one(
                &aggregator,
                &writeback_builder,
                &watcher,
                &source,
                batch_repo.as_ref(),
                attestation_repo.as_ref(),
                &anchor,
                &confirmation,
                &validators,
                cancel.clone(),
            )
            .await
            {
                tracing::warn!(target = "certen_cli", bundle_id = %anchor.bundle_id.to_hex(), error = %e, "attestation/write-back failed");
                continue;
            }
            seen.insert(anchor.bundle_id);
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn finalize_one(
    aggregator: &AttestationAggregator,
    writeback_builder: &WriteBackBuilder,
    watcher: &WriteBackWatcher,
    source: &HttpSourceLedgerClient,
    batch_repo: &dyn BatchRepository,
    attestation_repo: &dyn certen_types::repository::AttestationRepository,
    anchor: &certen_types::anchor::Anchor,
    confirmation: &certen_types::confirmation::ConfirmationRecord,
    validators: &[ValidatorInfo],
    cancel: CancellationToken,
) -> CertenResult<()> {
    let result_hash = certen_types::anchor::Anchor::expected_merkle_root(
        &anchor.operation_commitment,
        &anchor.cross_chain_commitment,
        &anchor.governance_root,
    );

    let bundle = aggregator
        .collect_and_aggregate(anchor.bundle_id, result_hash, validators)
        .await?;

    attestation_repo.put(&bundle).await?;
    if confirmation.r#final {
        attestation_repo.mark_final(&anchor.bundle_id).await?;
    }

    // The originating batch carries the source-ledger references this
    // entry needs to reconstruct without PostgreSQL access; fall back to
    // the anchor's own identifiers only if the batch has since been
    // pruned from the in-memory store.
    let origin = batch_repo.get(&anchor.batch_id).await?;
    let first_record = origin.as_ref().and_then(|b| b.records.first());

    let entry = ComprehensiveDataEntry {
        intent_id: first_record.map(|r| r.tx_hash).unwrap_or(anchor.bundle_id),
        source_transaction_hash: first_record.map(|r| r.accum_tx_hash).unwrap_or(result_hash),
        account_url: first_record.map(|r| r.account_url.clone()).unwrap_or_default(),
        partition: String::new(),
        organization_adi: String::new(),
        create_anchor_selector: [0u8; 4],
        create_anchor_address: anchor.validator_address.clone(),
        execute_proof_selector: [0u8; 4],
        execute_proof_address: anchor.validator_address.clone(),
        final_target_address: anchor.validator_address.clone(),
        final_target_value: 0,
        create_anchor_tx_hash: anchor.create_anchor_tx_hash,
        create_anchor_block: anchor.create_anchor_block,
        execute_proof_tx_hash: anchor.execute_proof_tx_hash,
        execute_proof_block: anchor.execute_proof_block,
        gas_used: anchor.gas_used,
        events_hash: certen_types::hash::Hash32::ZERO,
        verification_failed: false,
        state_root: certen_types::hash::Hash32::ZERO,
        receipts_root: certen_types::hash::Hash32::ZERO,
        transactions_root: certen_types::hash::Hash32::ZERO,
        governance_proof_reference: anchor.governance_root,
        bundle_id: anchor.bundle_id,
        operation_commitment: anchor.operation_commitment,
        cross_chain_commitment: anchor.cross_chain_commitment,
        governance_root: anchor.governance_root,
        result_hash,
        attestation_validator_count: bundle.aggregated.validator_count,
        attestation_threshold_met: bundle.aggregated.threshold_met,
        previous_result_hash: None,
        sequence_number: 1,
        confirmations_at_writeback: confirmation.confirmations,
        anchor_final: confirmation.r#final,
    };

    let attestation_proof_hash = {
        use sha2::{Digest, Sha256};
        certen_types::hash::Hash32(Sha256::digest(&bundle.aggregated.aggregate_signature).into())
    };

    let tx = writeback_builder.build(anchor.bundle_id, result_hash, attestation_proof_hash, entry)?;
    let signed_body = serde_json::to_vec(&tx).map_err(|e| certen_types::error::ProcessingError::Other(e.to_string()))?;
    let submitted_hash = source
        .submit_synthetic_transaction(&signed_body)
        .await
        .map_err(certen_types::error::ProcessingError::Transient)?;

    tracing::info!(target = "certen_cli", bundle_id = %anchor.bundle_id.to_hex(), tx_hash = %submitted_hash.to_hex(), "write-back submitted, awaiting settlement");

    match watcher.watch(submitted_hash, cancel).await {
        Ok(WriteBackStatus::Confirmed) => {
            tracing::info!(target = "certen_cli", bundle_id = %anchor.bundle_id.to_hex(), "write-back confirmed");
        }
        Ok(status) => {
            tracing::warn!(target = "certen_cli", bundle_id = %anchor.bundle_id.to_hex(), ?status, "write-back settled in a non-confirmed state");
        }
        Err(e) => {
            tracing::warn!(target = "certen_cli", bundle_id = %anchor.bundle_id.to_hex(), error = %e, "write-back settlement watch did not complete");
        }
    }
    Ok(())
}
