// Path: crates/batch/src/router.rs
//! Routes a classified intent to the immediate (`OnDemand`) or batched
//! (`OnCadence`) anchoring path based on its cross-chain blob's
//! `proofClass` field.

use certen_types::intent::ProofClass;

/// The routing decision for one intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Anchor immediately as a single-record batch.
    Immediate,
    /// Fold into the cadence-based batch for its grouping key.
    Batched,
}

/// Extracts the `proofClass` field from a cross-chain blob (if present)
/// and returns the routing decision. Intents with no cross-chain blob,
/// or whose blob is unparseable, fall back to `OnCadence` (batched) per
/// [`ProofClass::parse_or_default`].
pub fn route(cross_chain_data: &[u8]) -> Route {
    let proof_class = extract_proof_class(cross_chain_data);
    match proof_class {
        ProofClass::OnDemand => Route::Immediate,
        ProofClass::OnCadence => Route::Batched,
    }
}

fn extract_proof_class(cross_chain_data: &[u8]) -> ProofClass {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(cross_chain_data) else {
        return ProofClass::OnCadence;
    };
    let Some(s) = value.get("proofClass").and_then(|v| v.as_str()) else {
        return ProofClass::OnCadence;
    };
    ProofClass::parse_or_default(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_demand_routes_immediate() {
        let data = br#"{"legs":[],"proofClass":"on-demand"}"#;
        assert_eq!(route(data), Route::Immediate);
    }

    #[test]
    fn missing_blob_routes_batched() {
        assert_eq!(route(b""), Route::Batched);
    }

    #[test]
    fn unknown_class_routes_batched() {
        let data = br#"{"legs":[],"proofClass":"whatever"}"#;
        assert_eq!(route(data), Route::Batched);
    }
}
