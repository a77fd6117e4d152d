// Path: crates/proof/src/governance.rs
//! Builds a governance proof up to the highest tier its inputs support:
//! G0 (inclusion/finality), G1 (+authority/threshold), G2 (+outcome
//! binding). Falls back to the stub wrapper when the transaction carries
//! no governance blob at all.

use certen_codec::canonical::canonicalize;
use certen_types::error::ProcessingError;
use certen_types::hash::Hash32;
use certen_types::proof::{G0Proof, G1Proof, G2Proof, GovernanceLevel, GovernanceProofWrapper, Layer1};
use certen_types::receipt::Receipt;

use sha2::{Digest, Sha256};

/// Authority/threshold data a caller has already resolved from the
/// key-page hierarchy, required to reach G1.
pub struct AuthorityContext {
    /// Merkle path from the signing key-page to the key-book root.
    pub key_page_path: Receipt,
    /// Derived authority address (`acc://.../book/page`).
    pub authority_address: String,
    /// Number of signatures actually observed on the transaction.
    pub provided_signatures: u32,
    /// Number of signatures the key-page's threshold requires.
    pub required_signatures: u32,
}

/// Builds governance proofs against the fields already present on an
/// L1 proof and whatever governance blob the intent carried.
pub struct GovernanceProofBuilder;

impl GovernanceProofBuilder {
    /// Builds G0: inclusion/finality of the transaction plus the key-book
    /// scope it was found under.
    pub fn build_g0(l1: &Layer1, tx_hash: Hash32, principal: &str) -> G0Proof {
        G0Proof {
            tx_hash,
            scope: l1.scope.clone(),
            chain: l1.chain_name.clone(),
            principal: principal.to_string(),
            g0_complete: l1.validate(),
        }
    }

    /// Builds G1 from a completed G0 plus authority context. Fails if G0
    /// did not complete.
    pub fn build_g1(g0: G0Proof, ctx: AuthorityContext) -> Result<G1Proof, ProcessingError> {
        if !g0.g0_complete {
            return Err(ProcessingError::Other("G0 incomplete, cannot build G1".into()));
        }
        Ok(G1Proof {
            g0,
            key_page_path: ctx.key_page_path,
            authority_address: ctx.authority_address,
            provided_signatures: ctx.provided_signatures,
            required_signatures: ctx.required_signatures,
        })
    }

    /// Builds G2 by binding the canonicalized outcome payload on top of a
    /// threshold-satisfying G1.
    pub fn build_g2(g1: G1Proof, outcome_payload: &[u8]) -> Result<G2Proof, ProcessingError> {
        if !g1.threshold_met() {
            return Err(ProcessingError::Other("G1 threshold not met, cannot build G2".into()));
        }
        let canon = canonicalize(outcome_payload)?;
        let mut hasher = Sha256::new();
        hasher.update(&canon);
        Ok(G2Proof {
            g1,
            outcome_binding: Hash32(hasher.finalize().into()),
        })
    }

    /// Wraps a completed proof at the given tier, serializing it as the
    /// opaque `raw_proof` bytes downstream consumers carry but do not
    /// interpret.
    pub fn wrap_g0(g0: G0Proof) -> GovernanceProofWrapper {
        let verified = g0.g0_complete;
        GovernanceProofWrapper {
            level: GovernanceLevel::G0,
            raw_proof: serde_json::to_vec(&g0).unwrap_or_default(),
            verified,
        }
    }

    /// Wraps a G1 proof.
    pub fn wrap_g1(g1: G1Proof) -> GovernanceProofWrapper {
        let verified = g1.g0.g0_complete && g1.threshold_met();
        GovernanceProofWrapper {
            level: GovernanceLevel::G1,
            raw_proof: serde_json::to_vec(&g1).unwrap_or_default(),
            verified,
        }
    }

    /// Wraps a G2 proof.
    pub fn wrap_g2(g2: G2Proof) -> GovernanceProofWrapper {
        let verified = g2.g1.g0.g0_complete && g2.g1.threshold_met();
        GovernanceProofWrapper {
            level: GovernanceLevel::G2,
            raw_proof: serde_json::to_vec(&g2).unwrap_or_default(),
            verified,
        }
    }

    /// The stub fallback used when no governance blob was present on the
    /// intent at all.
    pub fn fallback() -> GovernanceProofWrapper {
        GovernanceProofWrapper::fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certen_types::hash::Hash32;

    fn sample_l1() -> Layer1 {
        let receipt = Receipt { start: Hash32::ZERO, anchor: Hash32::ZERO, entries: vec![], local_block: 1 };
        Layer1 {
            scope: "acc://a".into(),
            chain_name: "main".into(),
            chain_index: 0,
            leaf: Hash32::ZERO,
            anchor: Hash32::ZERO,
            receipt,
            source_partition: "bvn1".into(),
            local_block: 1,
        }
    }

    #[test]
    fn g1_fails_when_g0_incomplete() {
        let mut g0 = GovernanceProofBuilder::build_g0(&sample_l1(), Hash32::ZERO, "acc://a");
        g0.g0_complete = false;
        let ctx = AuthorityContext {
            key_page_path: Receipt { start: Hash32::ZERO, anchor: Hash32::ZERO, entries: vec![], local_block: 1 },
            authority_address: "acc://a/book/1".into(),
            provided_signatures: 1,
            required_signatures: 1,
        };
        assert!(GovernanceProofBuilder::build_g1(g0, ctx).is_err());
    }

    #[test]
    fn g2_fails_when_threshold_not_met() {
        let g0 = GovernanceProofBuilder::build_g0(&sample_l1(), Hash32::ZERO, "acc://a");
        let ctx = AuthorityContext {
            key_page_path: Receipt { start: Hash32::ZERO, anchor: Hash32::ZERO, entries: vec![], local_block: 1 },
            authority_address: "acc://a/book/1".into(),
            provided_signatures: 1,
            required_signatures: 2,
        };
        let g1 = GovernanceProofBuilder::build_g1(g0, ctx).unwrap();
        assert!(GovernanceProofBuilder::build_g2(g1, b"{}").is_err());
    }

    #[test]
    fn full_tier_wraps_as_verified() {
        let g0 = GovernanceProofBuilder::build_g0(&sample_l1(), Hash32::ZERO, "acc://a");
        let ctx = AuthorityContext {
            key_page_path: Receipt { start: Hash32::ZERO, anchor: Hash32::ZERO, entries: vec![], local_block: 1 },
            authority_address: "acc://a/book/1".into(),
            provided_signatures: 2,
            required_signatures: 2,
        };
        let g1 = GovernanceProofBuilder::build_g1(g0, ctx).unwrap();
        let g2 = GovernanceProofBuilder::build_g2(g1, br#"{"outcome":"ok"}"#).unwrap();
        let wrapper = GovernanceProofBuilder::wrap_g2(g2);
        assert!(wrapper.verified);
        assert_eq!(wrapper.level, GovernanceLevel::G2);
    }
}
