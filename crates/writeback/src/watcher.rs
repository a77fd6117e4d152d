// Path: crates/writeback/src/watcher.rs
//! Polls the source ledger for a submitted write-back transaction's
//! delivery status until it settles or a deadline elapses.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use certen_clients::source_ledger::SourceLedgerClient;
use certen_types::error::{PolicyError, ProcessingError};
use certen_types::hash::Hash32;
use certen_types::status::IntentStatus;
use certen_types::writeback::WriteBackStatus;

/// Default tick interval for the write-back status watcher.
pub const WATCH_POLL_INTERVAL_SECS: u64 = 5;

/// Default deadline after which an unsettled write-back is treated as
/// expired rather than polled forever.
pub const WATCH_TIMEOUT_SECS: u64 = 120;

/// Polls `get_transaction_status` until the submitted write-back settles,
/// the cancellation token fires, or the timeout elapses.
pub struct WriteBackWatcher {
    source: Arc<dyn SourceLedgerClient>,
    poll_interval: Duration,
    timeout: Duration,
}

impl WriteBackWatcher {
    /// Builds a watcher with the spec's default poll interval and timeout.
    pub fn new(source: Arc<dyn SourceLedgerClient>) -> Self {
        Self {
            source,
            poll_interval: Duration::from_secs(WATCH_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(WATCH_TIMEOUT_SECS),
        }
    }

    /// Overrides the poll interval and timeout, for tests or deployments
    /// that diverge from the defaults.
    pub fn with_interval_and_timeout(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.timeout = timeout;
        self
    }

    /// Polls `tx_hash`'s status until it reaches a terminal state, the
    /// deadline elapses, or `cancel` is triggered.
    pub async fn watch(&self, tx_hash: Hash32, cancel: CancellationToken) -> Result<WriteBackStatus, ProcessingError> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            let status = self
                .source
                .get_transaction_status(tx_hash)
                .await
                .map_err(ProcessingError::Transient)?;

            if let Some(settled) = settled_status(status) {
                return Ok(settled);
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(ProcessingError::Policy(PolicyError::Expired(format!(
                    "write-back {} did not settle within {:?}",
                    tx_hash.to_hex(),
                    self.timeout
                ))));
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(ProcessingError::Policy(PolicyError::Expired(format!(
                        "write-back {} watch cancelled",
                        tx_hash.to_hex()
                    ))));
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

/// Maps the source ledger's generic delivery status to a terminal
/// [`WriteBackStatus`], or `None` while still pending.
fn settled_status(status: IntentStatus) -> Option<WriteBackStatus> {
    match status {
        IntentStatus::Completed => Some(WriteBackStatus::Confirmed),
        IntentStatus::Failed => Some(WriteBackStatus::Failed),
        IntentStatus::Pending | IntentStatus::InProgress => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use certen_clients::source_ledger::TaggedTransaction;
    use certen_types::error::TransientError;
    use certen_types::intent::Intent;
    use certen_types::receipt::Receipt;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakySource {
        pending_ticks: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl SourceLedgerClient for FlakySource {
        async fn get_latest_block(&self) -> Result<u64, TransientError> {
            Ok(0)
        }
        async fn search_tagged_transactions(
            &self,
            _from_height: u64,
            _to_height: u64,
        ) -> Result<Vec<TaggedTransaction>, TransientError> {
            Ok(vec![])
        }
        async fn query_account_with_receipt(
            &self,
            _account_url: &str,
            _tx_hash: Hash32,
        ) -> Result<(Intent, Receipt), TransientError> {
            unreachable!("not used by this test")
        }
        async fn query_chain_entry(&self, _chain_name: &str, _height: u64) -> Result<(Hash32, Receipt), TransientError> {
            unreachable!("not used by this test")
        }
        async fn submit_synthetic_transaction(&self, _signed_body: &[u8]) -> Result<Hash32, TransientError> {
            Ok(Hash32::ZERO)
        }
        async fn get_transaction_status(&self, _tx_hash: Hash32) -> Result<IntentStatus, TransientError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.pending_ticks {
                Ok(IntentStatus::InProgress)
            } else {
                Ok(IntentStatus::Completed)
            }
        }
    }

    #[tokio::test]
    async fn watch_polls_until_confirmed() {
        let source = Arc::new(FlakySource { pending_ticks: 2, calls: AtomicU32::new(0) });
        let watcher = WriteBackWatcher::new(source)
            .with_interval_and_timeout(Duration::from_millis(1), Duration::from_secs(5));
        let status = watcher.watch(Hash32::ZERO, CancellationToken::new()).await.unwrap();
        assert_eq!(status, WriteBackStatus::Confirmed);
    }

    #[tokio::test]
    async fn watch_times_out_when_never_settled() {
        let source = Arc::new(FlakySource { pending_ticks: u32::MAX, calls: AtomicU32::new(0) });
        let watcher = WriteBackWatcher::new(source)
            .with_interval_and_timeout(Duration::from_millis(1), Duration::from_millis(5));
        let result = watcher.watch(Hash32::ZERO, CancellationToken::new()).await;
        assert!(matches!(result, Err(ProcessingError::Policy(PolicyError::Expired(_)))));
    }
}
