// Path: crates/discovery/src/classify.rs
//! Classifies a tagged transaction's raw blobs into the four canonical
//! slots an [`Intent`](certen_types::intent::Intent) carries, by sniffing
//! the top-level JSON key each blob is expected to carry.

use certen_types::intent::Blob;

/// The raw, unclassified blobs attached to a discovered transaction,
/// keyed by the JSON field that identifies their role.
#[derive(Debug, Clone, Default)]
pub struct RawBlobs {
    /// Present when the blob carries a `"kind"` field: the intent body.
    pub intent: Option<Blob>,
    /// Present when the blob carries a `"legs"` field: the cross-chain body.
    pub cross_chain: Option<Blob>,
    /// Present when the blob carries an `"authorization"` field: governance.
    pub governance: Option<Blob>,
    /// Present when the blob carries a `"nonce"` field: replay protection.
    pub replay: Option<Blob>,
}

/// Classifies one candidate blob by its top-level JSON key, returning
/// which slot it belongs in. Unrecognized blobs are dropped; a
/// transaction classifies to all-empty slots if none of its blobs match.
pub fn classify_blob(raw: &[u8], slots: &mut RawBlobs) {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(raw) else {
        return;
    };
    let Some(obj) = value.as_object() else {
        return;
    };
    if obj.contains_key("kind") {
        slots.intent = Some(raw.to_vec());
    } else if obj.contains_key("legs") {
        slots.cross_chain = Some(raw.to_vec());
    } else if obj.contains_key("authorization") {
        slots.governance = Some(raw.to_vec());
    } else if obj.contains_key("nonce") {
        slots.replay = Some(raw.to_vec());
    }
}

/// Classifies every blob in `candidates` into their slots.
pub fn classify_all(candidates: &[Vec<u8>]) -> RawBlobs {
    let mut slots = RawBlobs::default();
    for raw in candidates {
        classify_blob(raw, &mut slots);
    }
    slots
}

impl RawBlobs {
    /// True if at least one blob classified into a recognized slot. A
    /// transaction whose blobs are all unrecognized is non-canonical: raw
    /// byte presence alone (see `Intent::all_blobs_empty`) isn't enough to
    /// accept it.
    pub fn any_recognized(&self) -> bool {
        self.intent.is_some() || self.cross_chain.is_some() || self.governance.is_some() || self.replay.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_recognized_shape() {
        let candidates = vec![
            br#"{"kind":"transfer"}"#.to_vec(),
            br#"{"legs":[]}"#.to_vec(),
            br#"{"authorization":{"signer":"x"}}"#.to_vec(),
            br#"{"nonce":1}"#.to_vec(),
        ];
        let slots = classify_all(&candidates);
        assert!(slots.intent.is_some());
        assert!(slots.cross_chain.is_some());
        assert!(slots.governance.is_some());
        assert!(slots.replay.is_some());
    }

    #[test]
    fn unrecognized_blob_is_dropped() {
        let candidates = vec![br#"{"unrelated":true}"#.to_vec()];
        let slots = classify_all(&candidates);
        assert!(slots.intent.is_none());
        assert!(slots.cross_chain.is_none());
        assert!(slots.governance.is_none());
        assert!(slots.replay.is_none());
        assert!(!slots.any_recognized());
    }

    #[test]
    fn any_recognized_true_with_single_matching_blob() {
        let candidates = vec![br#"{"kind":"transfer"}"#.to_vec()];
        assert!(classify_all(&candidates).any_recognized());
    }
}
