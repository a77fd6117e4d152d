// Path: crates/storage/src/confirmation.rs
//! In-memory confirmation-depth store.

use std::collections::HashMap;

use parking_lot::Mutex;

use certen_types::confirmation::ConfirmationRecord;
use certen_types::hash::Hash32;
use certen_types::repository::ConfirmationRepository;
use certen_types::Result;

/// Stores confirmation-depth records keyed by `anchor_id`.
#[derive(Default)]
pub struct InMemoryConfirmationRepository {
    records: Mutex<HashMap<Hash32, ConfirmationRecord>>,
}

#[async_trait::async_trait]
impl ConfirmationRepository for InMemoryConfirmationRepository {
    async fn put(&self, record: &ConfirmationRecord) -> Result<()> {
        self.records.lock().insert(record.anchor_id, record.clone());
        Ok(())
    }

    async fn get(&self, anchor_id: &Hash32) -> Result<Option<ConfirmationRecord>> {
        Ok(self.records.lock().get(anchor_id).cloned())
    }

    async fn list_unfinalized(&self) -> Result<Vec<ConfirmationRecord>> {
        Ok(self.records.lock().values().filter(|r| !r.r#final).cloned().collect())
    }
}
