// Path: crates/types/src/attestation.rs
//! BLS attestation bundles over execution results.

use serde::{Deserialize, Serialize};

use crate::hash::Hash32;

/// The domain separator tags a signed message is bound to. Signatures under
/// different domains must never be aggregated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttestationDomain {
    /// Domain for attestations over a batch/anchor result.
    Attestation,
    /// Domain for attestations over a write-back result.
    Result,
}

impl AttestationDomain {
    /// The literal domain tag string hashed into the message.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Attestation => "CERTEN_ATTESTATION_V1",
            Self::Result => "CERTEN_RESULT_V1",
        }
    }
}

/// The aggregated BLS signature set over a single result hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregated {
    /// Number of validators whose signatures are included.
    pub validator_count: u32,
    /// Total voting power that signed.
    pub signed_voting_power: u128,
    /// Total known voting power across the validator set.
    pub total_voting_power: u128,
    /// Whether `3*signed >= 2*total`.
    pub threshold_met: bool,
    /// The BLS-aggregated signature, compressed G1 point bytes.
    pub aggregate_signature: Vec<u8>,
}

impl Aggregated {
    /// Evaluates the 2/3 threshold rule directly from voting power.
    pub fn threshold_from_power(signed: u128, total: u128) -> bool {
        3u128.saturating_mul(signed) >= 2u128.saturating_mul(total)
    }
}

/// A completed attestation bundle for a single anchored/attested result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationBundle {
    /// The bundle this attestation covers.
    pub bundle_id: Hash32,
    /// The canonical execution result hash that was signed.
    pub result_hash: Hash32,
    /// The aggregated signature and threshold evaluation.
    pub aggregated: Aggregated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundary() {
        assert!(Aggregated::threshold_from_power(2, 3));
        assert!(!Aggregated::threshold_from_power(1, 3));
        assert!(Aggregated::threshold_from_power(3, 3));
    }

    #[test]
    fn domains_have_distinct_tags() {
        assert_ne!(
            AttestationDomain::Attestation.tag(),
            AttestationDomain::Result.tag()
        );
    }
}
