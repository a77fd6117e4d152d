// Path: crates/storage/src/status.rs
//! In-memory two-phase intent status map.

use std::collections::HashMap;

use parking_lot::Mutex;

use certen_types::hash::Hash32;
use certen_types::repository::StatusRepository;
use certen_types::status::IntentStatus;
use certen_types::Result;

/// Tracks each intent's lifecycle state behind a single lock. Reads and
/// writes are both brief single-key operations, so a plain mutex is
/// sufficient; no reader ever blocks on another reader in practice since
/// lock hold time is effectively zero.
#[derive(Default)]
pub struct InMemoryStatusRepository {
    statuses: Mutex<HashMap<Hash32, IntentStatus>>,
}

#[async_trait::async_trait]
impl StatusRepository for InMemoryStatusRepository {
    async fn get(&self, intent_id: &Hash32) -> Result<Option<IntentStatus>> {
        Ok(self.statuses.lock().get(intent_id).copied())
    }

    async fn mark_in_progress(&self, intent_id: &Hash32) -> Result<bool> {
        let mut statuses = self.statuses.lock();
        let current = statuses.get(intent_id).copied().unwrap_or(IntentStatus::Pending);
        if !current.can_mark_in_progress() {
            return Ok(false);
        }
        statuses.insert(*intent_id, IntentStatus::InProgress);
        Ok(true)
    }

    async fn mark_completed(&self, intent_id: &Hash32) -> Result<()> {
        self.statuses.lock().insert(*intent_id, IntentStatus::Completed);
        Ok(())
    }

    async fn mark_failed(&self, intent_id: &Hash32) -> Result<()> {
        self.statuses.lock().insert(*intent_id, IntentStatus::Failed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unseen_intent_defaults_to_pending_and_can_start() {
        let repo = InMemoryStatusRepository::default();
        let id = Hash32::ZERO;
        assert_eq!(repo.get(&id).await.unwrap(), None);
        assert!(repo.mark_in_progress(&id).await.unwrap());
        assert_eq!(repo.get(&id).await.unwrap(), Some(IntentStatus::InProgress));
    }

    #[tokio::test]
    async fn completed_intent_rejects_reentry() {
        let repo = InMemoryStatusRepository::default();
        let id = Hash32::ZERO;
        repo.mark_in_progress(&id).await.unwrap();
        repo.mark_completed(&id).await.unwrap();
        assert!(!repo.mark_in_progress(&id).await.unwrap());
    }

    #[tokio::test]
    async fn failed_intent_permits_retry() {
        let repo = InMemoryStatusRepository::default();
        let id = Hash32::ZERO;
        repo.mark_in_progress(&id).await.unwrap();
        repo.mark_failed(&id).await.unwrap();
        assert!(repo.mark_in_progress(&id).await.unwrap());
    }
}
