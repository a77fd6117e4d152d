// Path: crates/discovery/src/worker.rs
//! Per-block intent discovery: polls the source ledger for newly produced
//! blocks, searches each for tagged transactions, classifies their blobs,
//! and hands completed [`Intent`]s to a sink while advancing a persisted
//! checkpoint.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{FuturesOrdered, StreamExt};
use tokio::time::{sleep, Duration};

use certen_clients::source_ledger::SourceLedgerClient;
use certen_types::config::DiscoveryConfig;
use certen_types::error::{ErrorCode, ProcessingError};
use certen_types::intent::Intent;
use certen_types::repository::CheckpointRepository;
use certen_types::Result;

use crate::classify::classify_all;

/// Blocks to walk back from the chain head when no checkpoint exists yet.
const BOOTSTRAP_LOOKBACK: u64 = 5;

/// Where discovery starts when no checkpoint has been persisted yet: a
/// short walk back from the chain head, never below the configured floor.
fn bootstrap_start(latest: u64, min_start_height: u64) -> u64 {
    latest.saturating_sub(BOOTSTRAP_LOOKBACK).max(min_start_height)
}

/// Receives intents as discovery classifies and completes them.
#[async_trait]
pub trait IntentSink: Send + Sync {
    /// Accepts one newly discovered, non-empty intent.
    async fn accept(&self, intent: Intent) -> Result<()>;
}

/// Drives the per-block discovery loop.
pub struct DiscoveryWorker {
    source: Arc<dyn SourceLedgerClient>,
    checkpoint: Arc<dyn CheckpointRepository>,
    sink: Arc<dyn IntentSink>,
    config: DiscoveryConfig,
    poll_interval: Duration,
}

impl DiscoveryWorker {
    /// Builds a worker against the given source ledger, checkpoint store
    /// and intent sink.
    pub fn new(
        source: Arc<dyn SourceLedgerClient>,
        checkpoint: Arc<dyn CheckpointRepository>,
        sink: Arc<dyn IntentSink>,
        config: DiscoveryConfig,
        poll_interval: Duration,
    ) -> Self {
        Self { source, checkpoint, sink, config, poll_interval }
    }

    /// Runs the discovery loop until `shutdown` resolves. Never returns an
    /// error on a single block failure: a failing block is retried on the
    /// next poll tick rather than advancing the checkpoint past it.
    pub async fn run(&self, mut shutdown: tokio::sync::oneshot::Receiver<()>) -> Result<()> {
        loop {
            if shutdown.try_recv().is_ok() {
                return Ok(());
            }

            let latest = match self.source.get_latest_block().await {
                Ok(h) => h,
                Err(e) => {
                    tracing::warn!(target = "certen_discovery", error = %e, "latest-block fetch failed, backing off");
                    sleep(self.poll_interval).await;
                    continue;
                }
            };

            let start = match self.checkpoint.load_checkpoint().await? {
                Some(h) => h + 1,
                None => bootstrap_start(latest, self.config.min_start_height),
            };

            if latest < start {
                sleep(self.poll_interval).await;
                continue;
            }

            let end = latest.min(start + self.config.max_concurrent_blocks as u64 - 1);
            self.process_range(start, end).await?;
            sleep(self.poll_interval).await;
        }
    }

    /// Processes `[start, end]` with up to `worker_pool_size` blocks
    /// in flight at once, checkpointing only the highest block whose
    /// entire prefix has completed successfully (so a later failure never
    /// leaves a gap behind the checkpoint).
    async fn process_range(&self, start: u64, end: u64) -> Result<()> {
        let pool_size = self.config.worker_pool_size.max(1);
        let heights: Vec<u64> = (start..=end).collect();

        for chunk in heights.chunks(pool_size) {
            let mut futures = FuturesOrdered::new();
            for &height in chunk {
                futures.push_back(self.process_block(height));
            }

            let mut highest_ok = None;
            while let Some((height, result)) = futures.next().await {
                match result {
                    Ok(()) => highest_ok = Some(height),
                    Err(e) => {
                        tracing::warn!(target = "certen_discovery", height, error = %e, "block processing failed, stopping chunk");
                        break;
                    }
                }
            }
            if let Some(h) = highest_ok {
                self.checkpoint.save_checkpoint(h).await?;
            } else {
                break;
            }
        }
        Ok(())
    }

    async fn process_block(&self, height: u64) -> (u64, Result<()>) {
        let result = self.process_block_inner(height).await;
        (height, result)
    }

    async fn process_block_inner(&self, height: u64) -> Result<()> {
        let txs = self.source.search_tagged_transactions(height, height).await?;
        for tx in txs {
            let (intent, _receipt) = self
                .source
                .query_account_with_receipt(&tx.account_url, tx.tx_hash)
                .await?;
            if intent.all_blobs_empty() {
                tracing::debug!(target = "certen_discovery", tx_hash = %tx.tx_hash, "all blobs empty, skipping");
                continue;
            }
            // Re-classify defensively even though the ledger already tagged
            // roles, since blob ordering on the wire is not guaranteed.
            let candidates = vec![
                intent.intent_data.clone(),
                intent.cross_chain_data.clone(),
                intent.governance_data.clone(),
                intent.replay_data.clone(),
            ];
            let slots = classify_all(&candidates);
            if !slots.any_recognized() {
                let err = ProcessingError::NonCanonical;
                tracing::warn!(
                    target = "certen_discovery",
                    tx_hash = %tx.tx_hash,
                    code = err.code(),
                    "no recognized blobs, rejecting as non-canonical"
                );
                continue;
            }
            self.sink.accept(intent).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certen_clients::source_ledger::TaggedTransaction;
    use certen_types::error::TransientError;
    use certen_types::hash::Hash32;
    use certen_types::receipt::Receipt;
    use certen_types::status::IntentStatus;
    use parking_lot::Mutex;

    struct FakeSource {
        latest: u64,
        txs: Vec<TaggedTransaction>,
    }

    #[async_trait]
    impl SourceLedgerClient for FakeSource {
        async fn get_latest_block(&self) -> std::result::Result<u64, TransientError> {
            Ok(self.latest)
        }
        async fn search_tagged_transactions(
            &self,
            from_height: u64,
            _to_height: u64,
        ) -> std::result::Result<Vec<TaggedTransaction>, TransientError> {
            Ok(self.txs.iter().filter(|t| t.block_height == from_height).cloned().collect())
        }
        async fn query_account_with_receipt(
            &self,
            account_url: &str,
            tx_hash: Hash32,
        ) -> std::result::Result<(Intent, Receipt), TransientError> {
            Ok((
                Intent {
                    intent_id: None,
                    transaction_hash: tx_hash,
                    account_url: account_url.to_string(),
                    partition: "bvn1".into(),
                    organization_adi: "acc://org".into(),
                    intent_data: br#"{"kind":"transfer"}"#.to_vec(),
                    cross_chain_data: vec![],
                    governance_data: vec![],
                    replay_data: vec![],
                },
                Receipt { start: Hash32::ZERO, anchor: Hash32::ZERO, entries: vec![], local_block: 0 },
            ))
        }
        async fn submit_synthetic_transaction(&self, _signed_body: &[u8]) -> std::result::Result<Hash32, TransientError> {
            Ok(Hash32::ZERO)
        }
        async fn get_transaction_status(&self, _tx_hash: Hash32) -> std::result::Result<IntentStatus, TransientError> {
            Ok(IntentStatus::Completed)
        }
    }

    #[derive(Default)]
    struct MemCheckpoint {
        height: Mutex<Option<u64>>,
    }

    #[async_trait]
    impl CheckpointRepository for MemCheckpoint {
        async fn load_checkpoint(&self) -> Result<Option<u64>> {
            Ok(*self.height.lock())
        }
        async fn save_checkpoint(&self, height: u64) -> Result<()> {
            *self.height.lock() = Some(height);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        seen: Mutex<Vec<Intent>>,
    }

    #[async_trait]
    impl IntentSink for CollectingSink {
        async fn accept(&self, intent: Intent) -> Result<()> {
            self.seen.lock().push(intent);
            Ok(())
        }
    }

    #[tokio::test]
    async fn processes_one_range_and_advances_checkpoint() {
        let source = Arc::new(FakeSource {
            latest: 5,
            txs: vec![TaggedTransaction { tx_hash: Hash32::ZERO, account_url: "acc://a".into(), block_height: 3 }],
        });
        let checkpoint = Arc::new(MemCheckpoint::default());
        let sink = Arc::new(CollectingSink::default());
        let config = DiscoveryConfig { min_start_height: 3, max_concurrent_blocks: 3, worker_pool_size: 2 };

        let worker = DiscoveryWorker::new(source, checkpoint.clone(), sink.clone(), config, Duration::from_millis(1));
        worker.process_range(3, 5).await.unwrap();

        assert_eq!(checkpoint.load_checkpoint().await.unwrap(), Some(5));
        assert_eq!(sink.seen.lock().len(), 1);
    }

    #[test]
    fn bootstrap_start_walks_back_five_from_head() {
        assert_eq!(bootstrap_start(100, 1), 95);
    }

    #[test]
    fn bootstrap_start_never_drops_below_configured_floor() {
        assert_eq!(bootstrap_start(3, 10), 10);
    }

    #[tokio::test]
    async fn non_canonical_transaction_is_rejected_before_sink() {
        struct GarbageSource {
            latest: u64,
        }

        #[async_trait]
        impl SourceLedgerClient for GarbageSource {
            async fn get_latest_block(&self) -> std::result::Result<u64, TransientError> {
                Ok(self.latest)
            }
            async fn search_tagged_transactions(
                &self,
                from_height: u64,
                _to_height: u64,
            ) -> std::result::Result<Vec<TaggedTransaction>, TransientError> {
                if from_height == 3 {
                    Ok(vec![TaggedTransaction { tx_hash: Hash32::ZERO, account_url: "acc://a".into(), block_height: 3 }])
                } else {
                    Ok(vec![])
                }
            }
            async fn query_account_with_receipt(
                &self,
                account_url: &str,
                tx_hash: Hash32,
            ) -> std::result::Result<(Intent, Receipt), TransientError> {
                Ok((
                    Intent {
                        intent_id: None,
                        transaction_hash: tx_hash,
                        account_url: account_url.to_string(),
                        partition: "bvn1".into(),
                        organization_adi: "acc://org".into(),
                        intent_data: b"not json blobs".to_vec(),
                        cross_chain_data: vec![],
                        governance_data: vec![],
                        replay_data: vec![],
                    },
                    Receipt { start: Hash32::ZERO, anchor: Hash32::ZERO, entries: vec![], local_block: 0 },
                ))
            }
            async fn submit_synthetic_transaction(&self, _signed_body: &[u8]) -> std::result::Result<Hash32, TransientError> {
                Ok(Hash32::ZERO)
            }
            async fn get_transaction_status(&self, _tx_hash: Hash32) -> std::result::Result<IntentStatus, TransientError> {
                Ok(IntentStatus::Completed)
            }
        }

        let source = Arc::new(GarbageSource { latest: 5 });
        let checkpoint = Arc::new(MemCheckpoint::default());
        let sink = Arc::new(CollectingSink::default());
        let config = DiscoveryConfig { min_start_height: 3, max_concurrent_blocks: 3, worker_pool_size: 2 };

        let worker = DiscoveryWorker::new(source, checkpoint.clone(), sink.clone(), config, Duration::from_millis(1));
        worker.process_range(3, 5).await.unwrap();

        assert_eq!(sink.seen.lock().len(), 0);
    }
}
