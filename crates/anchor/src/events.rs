// Path: crates/anchor/src/events.rs
//! Polls the target chain for `CertenAnchor` contract events in
//! fixed-size windows and dispatches them by topic to typed handlers.

use certen_clients::target_chain::{ContractEvent, TargetChainClient};
use certen_types::error::TransientError;
use certen_types::hash::Hash32;

/// Width, in blocks, of each `eth_getLogs` polling window.
pub const EVENT_WINDOW_BLOCKS: u64 = 9;

/// Default polling interval, in seconds, for the event watcher.
pub const EVENT_POLL_INTERVAL_SECS: u64 = 15;

/// The recognized `CertenAnchor` contract event kinds, dispatched by
/// their keccak topic0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A new anchor was created.
    AnchorCreated,
    /// A comprehensive proof was executed against an anchor.
    ProofExecuted,
    /// Proof execution failed verification.
    ProofVerificationFailed,
    /// A governance action executed on-chain.
    GovernanceExecuted,
    /// A validator was registered.
    ValidatorRegistered,
    /// A validator was removed.
    ValidatorRemoved,
    /// The quorum threshold was updated.
    ThresholdUpdated,
}

/// Maps a topic0 hash to its [`EventKind`], if recognized. Topic hashes
/// are the keccak256 of each event's canonical Solidity signature.
pub fn classify_topic(topic0: Hash32, topics: &EventTopics) -> Option<EventKind> {
    if topic0 == topics.anchor_created {
        Some(EventKind::AnchorCreated)
    } else if topic0 == topics.proof_executed {
        Some(EventKind::ProofExecuted)
    } else if topic0 == topics.proof_verification_failed {
        Some(EventKind::ProofVerificationFailed)
    } else if topic0 == topics.governance_executed {
        Some(EventKind::GovernanceExecuted)
    } else if topic0 == topics.validator_registered {
        Some(EventKind::ValidatorRegistered)
    } else if topic0 == topics.validator_removed {
        Some(EventKind::ValidatorRemoved)
    } else if topic0 == topics.threshold_updated {
        Some(EventKind::ThresholdUpdated)
    } else {
        None
    }
}

/// Precomputed keccak256 topic0 hashes for each recognized event
/// signature, resolved once at startup from the deployed contract's ABI.
#[derive(Debug, Clone)]
pub struct EventTopics {
    /// Topic for `AnchorCreated`.
    pub anchor_created: Hash32,
    /// Topic for `ProofExecuted`.
    pub proof_executed: Hash32,
    /// Topic for `ProofVerificationFailed`.
    pub proof_verification_failed: Hash32,
    /// Topic for `GovernanceExecuted`.
    pub governance_executed: Hash32,
    /// Topic for `ValidatorRegistered`.
    pub validator_registered: Hash32,
    /// Topic for `ValidatorRemoved`.
    pub validator_removed: Hash32,
    /// Topic for `ThresholdUpdated`.
    pub threshold_updated: Hash32,
}

impl EventTopics {
    /// Derives each topic as `keccak256(signature)`.
    pub fn from_signatures() -> Self {
        use sha3::{Digest, Keccak256};
        let topic = |sig: &str| {
            let mut hasher = Keccak256::new();
            hasher.update(sig.as_bytes());
            Hash32(hasher.finalize().into())
        };
        Self {
            anchor_created: topic("AnchorCreated(bytes32,bytes32,uint64)"),
            proof_executed: topic("ProofExecuted(bytes32,bytes32)"),
            proof_verification_failed: topic("ProofVerificationFailed(bytes32,string)"),
            governance_executed: topic("GovernanceExecuted(bytes32,uint8)"),
            validator_registered: topic("ValidatorRegistered(address)"),
            validator_removed: topic("ValidatorRemoved(address)"),
            threshold_updated: topic("ThresholdUpdated(uint256,uint256)"),
        }
    }
}

/// Polls `[from_block, from_block + EVENT_WINDOW_BLOCKS - 1]` windows,
/// classifying each returned event and invoking `on_event`.
pub struct EventWatcher<C: TargetChainClient + ?Sized> {
    target: std::sync::Arc<C>,
    topics: EventTopics,
}

impl<C: TargetChainClient + ?Sized> EventWatcher<C> {
    /// Builds a watcher resolving topics from the contract's known event
    /// signatures.
    pub fn new(target: std::sync::Arc<C>) -> Self {
        Self { target, topics: EventTopics::from_signatures() }
    }

    /// Polls one window starting at `from_block`, returning the
    /// `(kind, event)` pairs for every recognized log, in order.
    pub async fn poll_window(&self, from_block: u64) -> Result<Vec<(EventKind, ContractEvent)>, TransientError> {
        let to_block = from_block + EVENT_WINDOW_BLOCKS - 1;
        let logs = self.target.filter_logs(from_block, to_block).await?;
        Ok(logs
            .into_iter()
            .filter_map(|ev| classify_topic(ev.topic0, &self.topics).map(|kind| (kind, ev)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_are_distinct() {
        let t = EventTopics::from_signatures();
        let all = [
            t.anchor_created,
            t.proof_executed,
            t.proof_verification_failed,
            t.governance_executed,
            t.validator_registered,
            t.validator_removed,
            t.threshold_updated,
        ];
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert_ne!(all[i], all[j]);
            }
        }
    }

    #[test]
    fn classify_topic_matches_anchor_created() {
        let topics = EventTopics::from_signatures();
        assert_eq!(classify_topic(topics.anchor_created, &topics), Some(EventKind::AnchorCreated));
    }

    #[test]
    fn classify_topic_returns_none_for_unknown() {
        let topics = EventTopics::from_signatures();
        assert_eq!(classify_topic(Hash32::ZERO, &topics), None);
    }
}
