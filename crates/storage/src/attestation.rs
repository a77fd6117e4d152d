// Path: crates/storage/src/attestation.rs
//! In-memory BLS attestation bundle store.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use certen_types::attestation::AttestationBundle;
use certen_types::hash::Hash32;
use certen_types::repository::AttestationRepository;
use certen_types::Result;

/// Stores attestation bundles keyed by `bundle_id`, with a separate
/// final-state set so `mark_final` can cascade from the confirmation
/// tracker.
#[derive(Default)]
pub struct InMemoryAttestationRepository {
    bundles: Mutex<HashMap<Hash32, AttestationBundle>>,
    finalized: Mutex<HashSet<Hash32>>,
}

#[async_trait::async_trait]
impl AttestationRepository for InMemoryAttestationRepository {
    async fn put(&self, bundle: &AttestationBundle) -> Result<()> {
        self.bundles.lock().insert(bundle.bundle_id, bundle.clone());
        Ok(())
    }

    async fn get(&self, bundle_id: &Hash32) -> Result<Option<AttestationBundle>> {
        Ok(self.bundles.lock().get(bundle_id).cloned())
    }

    async fn mark_final(&self, bundle_id: &Hash32) -> Result<()> {
        if self.bundles.lock().contains_key(bundle_id) {
            self.finalized.lock().insert(*bundle_id);
        }
        Ok(())
    }

    async fn is_final(&self, bundle_id: &Hash32) -> Result<bool> {
        Ok(self.finalized.lock().contains(bundle_id))
    }
}
