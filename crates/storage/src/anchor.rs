// Path: crates/storage/src/anchor.rs
//! In-memory anchor store.

use std::collections::HashMap;

use parking_lot::Mutex;

use certen_types::anchor::Anchor;
use certen_types::hash::Hash32;
use certen_types::repository::AnchorRepository;
use certen_types::Result;

/// Stores submitted anchors keyed by `bundle_id`. `put` never overwrites an
/// existing entry, matching the orchestrator's at-most-one-accepted-anchor
/// guarantee under bundle-id collision prevention.
#[derive(Default)]
pub struct InMemoryAnchorRepository {
    anchors: Mutex<HashMap<Hash32, Anchor>>,
}

#[async_trait::async_trait]
impl AnchorRepository for InMemoryAnchorRepository {
    async fn put(&self, anchor: &Anchor) -> Result<()> {
        let mut anchors = self.anchors.lock();
        if anchors.contains_key(&anchor.bundle_id) {
            return Err(certen_types::error::ProcessingError::Other(format!(
                "anchor already exists for bundle {}",
                anchor.bundle_id.to_hex()
            )));
        }
        anchors.insert(anchor.bundle_id, anchor.clone());
        Ok(())
    }

    async fn get(&self, bundle_id: &Hash32) -> Result<Option<Anchor>> {
        Ok(self.anchors.lock().get(bundle_id).cloned())
    }

    async fn exists_and_valid(&self, bundle_id: &Hash32) -> Result<bool> {
        Ok(self.anchors.lock().get(bundle_id).is_some_and(|a| a.valid))
    }

    async fn list_unconfirmed(&self) -> Result<Vec<Anchor>> {
        // Confirmation depth is tracked per `bundle_id` in the confirmation
        // repository, not here; every stored anchor is a candidate until
        // the caller cross-references `ConfirmationRepository::list_unfinalized`.
        Ok(self.anchors.lock().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(bundle_id: Hash32, valid: bool) -> Anchor {
        Anchor {
            bundle_id,
            operation_commitment: Hash32::ZERO,
            cross_chain_commitment: Hash32::ZERO,
            governance_root: Hash32::ZERO,
            accumulate_block_height: 1,
            timestamp: 0,
            validator_address: "validator-1".to_string(),
            valid,
            batch_id: Hash32::ZERO,
            create_anchor_tx_hash: Hash32::ZERO,
            create_anchor_block: 0,
            execute_proof_tx_hash: Hash32::ZERO,
            execute_proof_block: 0,
            gas_used: 0,
            gas_cost: 0,
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_bundle_id() {
        let repo = InMemoryAnchorRepository::default();
        repo.put(&sample(Hash32([1u8; 32]), true)).await.unwrap();
        assert!(repo.put(&sample(Hash32([1u8; 32]), true)).await.is_err());
    }

    #[tokio::test]
    async fn exists_and_valid_reflects_flag() {
        let repo = InMemoryAnchorRepository::default();
        repo.put(&sample(Hash32([1u8; 32]), false)).await.unwrap();
        assert!(!repo.exists_and_valid(&Hash32([1u8; 32])).await.unwrap());
    }
}
