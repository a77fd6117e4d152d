// Path: crates/batch/src/collector.rs
//! Accumulates transaction records into open batches, deduplicating by
//! leaf hash, and closes batches on a size/age cadence for the
//! `OnCadence` proof class. `OnDemand` records bypass batching entirely:
//! callers should route them straight to the anchor orchestrator as a
//! single-record batch.

use std::collections::HashMap;

use parking_lot::Mutex;

use certen_types::batch::{merkle_root, Batch, BatchStatus, TransactionRecord};
use certen_types::error::ProcessingError;
use certen_types::hash::Hash32;
use certen_types::intent::ProofClass;

/// Default maximum number of records an `OnCadence` batch accumulates
/// before it is eligible to close.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;
/// Default maximum age, in nanoseconds, before an `OnCadence` batch is
/// eligible to close regardless of size.
pub const DEFAULT_MAX_BATCH_AGE_NANOS: u128 = 300 * 1_000_000_000;

/// Collects cadence-routed records into batches keyed by an arbitrary
/// caller-chosen grouping key (e.g. `organization_adi`).
pub struct BatchCollector {
    open: Mutex<HashMap<String, Batch>>,
    max_batch_size: usize,
    max_batch_age_nanos: u128,
}

impl BatchCollector {
    /// Builds a collector with the given close thresholds.
    pub fn new(max_batch_size: usize, max_batch_age_nanos: u128) -> Self {
        Self {
            open: Mutex::new(HashMap::new()),
            max_batch_size,
            max_batch_age_nanos,
        }
    }

    /// Adds `record` to the open batch for `group_key`, opening a new one
    /// if none exists. Rejects a record whose `tx_hash` is already present
    /// in that batch.
    pub fn add(
        &self,
        group_key: &str,
        record: TransactionRecord,
        now_nanos: u128,
    ) -> Result<(), ProcessingError> {
        let mut open = self.open.lock();
        let batch = open
            .entry(group_key.to_string())
            .or_insert_with(|| Batch::new(Hash32::ZERO, ProofClass::OnCadence, now_nanos));

        if batch.contains_leaf(&record.tx_hash) {
            return Err(ProcessingError::DuplicateLeaf {
                leaf: record.tx_hash.to_hex(),
                group_key: group_key.to_string(),
            });
        }

        batch.leaf_hashes.push(record.tx_hash);
        batch.records.push(record);
        batch.sizes += 1;
        Ok(())
    }

    /// Returns the group keys whose open batch has crossed the size or
    /// age threshold and is eligible to close.
    pub fn ready_to_close(&self, now_nanos: u128) -> Vec<String> {
        let open = self.open.lock();
        open.iter()
            .filter(|(_, b)| {
                b.status == BatchStatus::Open
                    && (b.sizes >= self.max_batch_size
                        || now_nanos.saturating_sub(b.created_at) >= self.max_batch_age_nanos)
            })
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Closes the batch for `group_key`: transitions `Open` -> `Closing`,
    /// computes the merkle root, then transitions to `Closed`, and removes
    /// it from the open set, returning the finished batch.
    pub fn close(&self, group_key: &str, now_nanos: u128) -> Option<Batch> {
        let mut open = self.open.lock();
        let mut batch = open.remove(group_key)?;
        batch.status = BatchStatus::Closing;
        batch.merkle_root = merkle_root(&batch.leaf_hashes);
        batch.status = BatchStatus::Closed;
        batch.closed_at = Some(now_nanos);
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(tx_hash: Hash32) -> TransactionRecord {
        TransactionRecord {
            accum_tx_hash: tx_hash,
            account_url: "acc://a".into(),
            tx_hash,
            intent_type: "intent".into(),
            intent_data: vec![],
            chained_proof: None,
            gov_proof: None,
            gov_level: None,
        }
    }

    #[test]
    fn duplicate_leaf_is_rejected() {
        let collector = BatchCollector::new(DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_BATCH_AGE_NANOS);
        let leaf = Hash32([1u8; 32]);
        collector.add("org1", sample_record(leaf), 0).unwrap();
        assert!(collector.add("org1", sample_record(leaf), 0).is_err());
    }

    #[test]
    fn closes_when_size_threshold_crossed() {
        let collector = BatchCollector::new(2, DEFAULT_MAX_BATCH_AGE_NANOS);
        collector.add("org1", sample_record(Hash32([1u8; 32])), 0).unwrap();
        collector.add("org1", sample_record(Hash32([2u8; 32])), 0).unwrap();
        let ready = collector.ready_to_close(0);
        assert_eq!(ready, vec!["org1".to_string()]);

        let closed = collector.close("org1", 100).unwrap();
        assert_eq!(closed.status, BatchStatus::Closed);
        assert!(closed.merkle_root.is_some());
        assert_eq!(closed.closed_at, Some(100));
    }

    #[test]
    fn closes_when_age_threshold_crossed() {
        let collector = BatchCollector::new(DEFAULT_MAX_BATCH_SIZE, 10);
        collector.add("org1", sample_record(Hash32([1u8; 32])), 0).unwrap();
        assert!(collector.ready_to_close(5).is_empty());
        assert_eq!(collector.ready_to_close(11), vec!["org1".to_string()]);
    }
}
