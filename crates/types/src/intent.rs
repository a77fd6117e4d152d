// Path: crates/types/src/intent.rs
//! Discovered intents and their four canonical blobs.

use serde::{Deserialize, Serialize};

use crate::hash::Hash32;

/// A canonical JSON byte-string blob carried by an intent transaction.
pub type Blob = Vec<u8>;

/// A user request discovered on the source ledger, carrying four canonical
/// blobs (intent, cross-chain, governance, replay). At least one blob must
/// be non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    /// The stable operation id, populated once the four blobs are hashed.
    pub intent_id: Option<Hash32>,
    /// The transaction hash on the source ledger.
    pub transaction_hash: Hash32,
    /// The source-ledger account URL that carried the transaction.
    pub account_url: String,
    /// The partition the transaction was discovered on (e.g. `bvn1`, `dn`).
    pub partition: String,
    /// The organization's ADI (authority domain identifier).
    pub organization_adi: String,
    /// The canonical intent blob.
    pub intent_data: Blob,
    /// The canonical cross-chain blob.
    pub cross_chain_data: Blob,
    /// The canonical governance blob.
    pub governance_data: Blob,
    /// The canonical replay-protection blob.
    pub replay_data: Blob,
}

impl Intent {
    /// True if all four canonical blobs are empty, in which case discovery
    /// must reject the transaction as non-canonical.
    pub fn all_blobs_empty(&self) -> bool {
        self.intent_data.is_empty()
            && self.cross_chain_data.is_empty()
            && self.governance_data.is_empty()
            && self.replay_data.is_empty()
    }
}

/// The `proofClass` field extracted from an intent's cross-chain data,
/// determining whether it is routed to the immediate-anchor path or the
/// batched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProofClass {
    /// Immediate, individual anchor submission.
    OnDemand,
    /// Batched with other intents on a size/age/trigger cadence.
    OnCadence,
}

impl ProofClass {
    /// Parses a `proofClass` string, defaulting unknown values to `OnCadence`
    /// per the router's documented fallback behavior.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "on-demand" => Self::OnDemand,
            _ => Self::OnCadence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_all_empty_blobs() {
        let intent = Intent {
            intent_id: None,
            transaction_hash: Hash32::ZERO,
            account_url: "acc://foo.acme".into(),
            partition: "bvn1".into(),
            organization_adi: "acc://foo.acme".into(),
            intent_data: vec![],
            cross_chain_data: vec![],
            governance_data: vec![],
            replay_data: vec![],
        };
        assert!(intent.all_blobs_empty());
    }

    #[test]
    fn unknown_proof_class_defaults_to_cadence() {
        assert_eq!(ProofClass::parse_or_default("bogus"), ProofClass::OnCadence);
        assert_eq!(ProofClass::parse_or_default("on-demand"), ProofClass::OnDemand);
    }
}
