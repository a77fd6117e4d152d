// Path: crates/storage/src/batch.rs
//! In-memory batch store.

use std::collections::HashMap;

use parking_lot::Mutex;

use certen_types::batch::{Batch, BatchStatus};
use certen_types::hash::Hash32;
use certen_types::repository::BatchRepository;
use certen_types::Result;

/// Stores batches keyed by `batch_id` behind a single lock, matching the
/// batch collector's own close-sequence locking discipline.
#[derive(Default)]
pub struct InMemoryBatchRepository {
    batches: Mutex<HashMap<Hash32, Batch>>,
}

#[async_trait::async_trait]
impl BatchRepository for InMemoryBatchRepository {
    async fn put(&self, batch: &Batch) -> Result<()> {
        self.batches.lock().insert(batch.batch_id, batch.clone());
        Ok(())
    }

    async fn get(&self, batch_id: &Hash32) -> Result<Option<Batch>> {
        Ok(self.batches.lock().get(batch_id).cloned())
    }

    async fn list_open(&self) -> Result<Vec<Batch>> {
        Ok(self
            .batches
            .lock()
            .values()
            .filter(|b| b.status != BatchStatus::Closed)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certen_types::batch::Batch;

    fn open_batch(id: Hash32) -> Batch {
        Batch {
            batch_id: id,
            proof_class: certen_types::intent::ProofClass::OnCadence,
            records: vec![],
            merkle_root: None,
            leaf_hashes: vec![],
            sizes: 0,
            created_at: 0,
            closed_at: None,
            status: BatchStatus::Open,
        }
    }

    #[tokio::test]
    async fn put_get_roundtrip() {
        let repo = InMemoryBatchRepository::default();
        let batch = open_batch(Hash32([1u8; 32]));
        repo.put(&batch).await.unwrap();
        let fetched = repo.get(&Hash32([1u8; 32])).await.unwrap().unwrap();
        assert_eq!(fetched.batch_id, batch.batch_id);
    }

    #[tokio::test]
    async fn list_open_excludes_closed() {
        let repo = InMemoryBatchRepository::default();
        let mut closed = open_batch(Hash32([2u8; 32]));
        closed.status = BatchStatus::Closed;
        repo.put(&open_batch(Hash32([1u8; 32]))).await.unwrap();
        repo.put(&closed).await.unwrap();

        let open = repo.list_open().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].batch_id, Hash32([1u8; 32]));
    }
}
