// Path: crates/types/src/repository.rs
//! Repository trait contracts. Persistence backends are out of scope; the
//! contracts components depend on are not.

use async_trait::async_trait;

use crate::anchor::{Anchor, CertenProof};
use crate::attestation::AttestationBundle;
use crate::batch::Batch;
use crate::confirmation::ConfirmationRecord;
use crate::hash::Hash32;
use crate::status::IntentStatus;
use crate::Result;

/// Persists and restores the discovery checkpoint (`last_processed_block`)
/// across restarts.
#[async_trait]
pub trait CheckpointRepository: Send + Sync {
    /// Loads the last persisted block height, if any.
    async fn load_checkpoint(&self) -> Result<Option<u64>>;
    /// Persists the given block height as the new checkpoint. Must only be
    /// called after the corresponding block's processing has succeeded.
    async fn save_checkpoint(&self, height: u64) -> Result<()>;
}

/// Owns the two-phase intent status map.
#[async_trait]
pub trait StatusRepository: Send + Sync {
    /// Reads the current status for an intent id, if known.
    async fn get(&self, intent_id: &Hash32) -> Result<Option<IntentStatus>>;
    /// Atomically transitions `intent_id` to `in_progress` iff its current
    /// state is `pending` or `failed`. Returns `false` (no transition) if
    /// the state was already `in_progress` or `completed`.
    async fn mark_in_progress(&self, intent_id: &Hash32) -> Result<bool>;
    /// Transitions `intent_id` to `completed`. Terminal; idempotent.
    async fn mark_completed(&self, intent_id: &Hash32) -> Result<()>;
    /// Transitions `intent_id` to `failed`, permitting a later retry.
    async fn mark_failed(&self, intent_id: &Hash32) -> Result<()>;
}

/// Persists batches in progress and awaiting anchoring.
#[async_trait]
pub trait BatchRepository: Send + Sync {
    /// Stores or overwrites a batch by its `batch_id`.
    async fn put(&self, batch: &Batch) -> Result<()>;
    /// Loads a batch by its `batch_id`, if present.
    async fn get(&self, batch_id: &Hash32) -> Result<Option<Batch>>;
    /// Lists all batches that have not yet reached `Closed` status.
    async fn list_open(&self) -> Result<Vec<Batch>>;
}

/// Persists on-chain anchors and supports bundle-id collision checks.
#[async_trait]
pub trait AnchorRepository: Send + Sync {
    /// Stores a new anchor. The orchestrator never overwrites an existing
    /// anchor, so implementations should treat a duplicate `bundle_id` as
    /// an error.
    async fn put(&self, anchor: &Anchor) -> Result<()>;
    /// Loads an anchor by `bundle_id`, if present.
    async fn get(&self, bundle_id: &Hash32) -> Result<Option<Anchor>>;
    /// True if an anchor with this `bundle_id` already exists and is valid.
    async fn exists_and_valid(&self, bundle_id: &Hash32) -> Result<bool>;
    /// Lists anchors that have not yet reached the required confirmation
    /// depth.
    async fn list_unconfirmed(&self) -> Result<Vec<Anchor>>;
}

/// Persists confirmation-depth tracking records.
#[async_trait]
pub trait ConfirmationRepository: Send + Sync {
    /// Stores or overwrites a confirmation record by `anchor_id`.
    async fn put(&self, record: &ConfirmationRecord) -> Result<()>;
    /// Loads a confirmation record by `anchor_id`, if present.
    async fn get(&self, anchor_id: &Hash32) -> Result<Option<ConfirmationRecord>>;
    /// Lists all records that have not yet reached `final`.
    async fn list_unfinalized(&self) -> Result<Vec<ConfirmationRecord>>;
}

/// Persists the comprehensive proof submitted alongside an anchor, linked
/// by `anchor_id`. Finalization cascades here from the confirmation
/// tracker: once an anchor's confirmation record goes final, its proof is
/// marked final too.
#[async_trait]
pub trait ProofRepository: Send + Sync {
    /// Stores the proof submitted for `anchor_id`.
    async fn put(&self, anchor_id: &Hash32, proof: &CertenProof) -> Result<()>;
    /// Loads the proof for `anchor_id`, if present.
    async fn get(&self, anchor_id: &Hash32) -> Result<Option<CertenProof>>;
    /// Marks the proof for `anchor_id` final. A no-op if no proof is
    /// stored for that anchor yet.
    async fn mark_final(&self, anchor_id: &Hash32) -> Result<()>;
    /// True once `mark_final` has been called for `anchor_id`.
    async fn is_final(&self, anchor_id: &Hash32) -> Result<bool>;
}

/// Persists BLS attestation bundles over external-chain results, linked by
/// `bundle_id`. Finalization cascades here the same way it does for
/// [`ProofRepository`].
#[async_trait]
pub trait AttestationRepository: Send + Sync {
    /// Stores or overwrites the attestation bundle for `bundle_id`.
    async fn put(&self, bundle: &AttestationBundle) -> Result<()>;
    /// Loads the attestation bundle for `bundle_id`, if present.
    async fn get(&self, bundle_id: &Hash32) -> Result<Option<AttestationBundle>>;
    /// Marks the attestation bundle for `bundle_id` final. A no-op if
    /// nothing has been aggregated for that bundle yet.
    async fn mark_final(&self, bundle_id: &Hash32) -> Result<()>;
    /// True once `mark_final` has been called for `bundle_id`.
    async fn is_final(&self, bundle_id: &Hash32) -> Result<bool>;
}
