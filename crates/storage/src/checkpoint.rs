// Path: crates/storage/src/checkpoint.rs
//! In-memory discovery checkpoint store.

use parking_lot::Mutex;

use certen_types::repository::CheckpointRepository;
use certen_types::Result;

/// Holds the single `last_processed_block` value in memory.
#[derive(Default)]
pub struct InMemoryCheckpointRepository {
    height: Mutex<Option<u64>>,
}

#[async_trait::async_trait]
impl CheckpointRepository for InMemoryCheckpointRepository {
    async fn load_checkpoint(&self) -> Result<Option<u64>> {
        Ok(*self.height.lock())
    }

    async fn save_checkpoint(&self, height: u64) -> Result<()> {
        let mut guard = self.height.lock();
        if let Some(current) = *guard {
            if height < current {
                tracing::warn!(current, height, "checkpoint save ignored: would move backward");
                return Ok(());
            }
        }
        *guard = Some(height);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty_and_saves_forward() {
        let repo = InMemoryCheckpointRepository::default();
        assert_eq!(repo.load_checkpoint().await.unwrap(), None);
        repo.save_checkpoint(10).await.unwrap();
        assert_eq!(repo.load_checkpoint().await.unwrap(), Some(10));
    }

    #[tokio::test]
    async fn ignores_backward_saves() {
        let repo = InMemoryCheckpointRepository::default();
        repo.save_checkpoint(10).await.unwrap();
        repo.save_checkpoint(5).await.unwrap();
        assert_eq!(repo.load_checkpoint().await.unwrap(), Some(10));
    }
}
