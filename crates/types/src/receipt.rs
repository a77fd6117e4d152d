// Path: crates/types/src/receipt.rs
//! The atomic merkle receipt and its fold/verify primitives.

use serde::{Deserialize, Serialize};

use crate::hash::Hash32;

/// One step in a receipt's fold path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptEntry {
    /// The sibling hash at this fold step.
    pub hash: Hash32,
    /// If true, the running hash is folded on the left: `sha256(h || entry.hash)`.
    /// If false, folded on the right: `sha256(entry.hash || h)`.
    pub right: bool,
}

/// A merkle inclusion proof: `start` folds through `entries` to `anchor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// The leaf value the receipt begins from.
    pub start: Hash32,
    /// The root value the fold must reach.
    pub anchor: Hash32,
    /// The ordered fold path.
    pub entries: Vec<ReceiptEntry>,
    /// The local block height this receipt was produced at.
    pub local_block: u64,
}

impl Receipt {
    /// Folds `start` through `entries`, returning the resulting 32-byte value.
    ///
    /// A receipt with no entries folds to `start` unchanged, so a
    /// single-leaf receipt is valid iff `start == anchor`.
    pub fn fold(&self) -> Hash32 {
        fold(self.start, &self.entries)
    }

    /// Validates that folding `start` through `entries` yields `anchor`.
    pub fn validate(&self) -> bool {
        self.fold() == self.anchor
    }
}

/// Folds `start` through `entries` using sha256, independent of any
/// particular `Receipt` instance.
pub fn fold(start: Hash32, entries: &[ReceiptEntry]) -> Hash32 {
    let mut h = *start.as_bytes();
    for entry in entries {
        let e = entry.hash.as_bytes();
        let digest = if entry.right {
            sha256_concat(&h, e)
        } else {
            sha256_concat(e, &h)
        };
        h = digest;
    }
    Hash32(h)
}

/// Validates the stitching invariant between two chained layers: `a.anchor`
/// must equal `b.start` at the byte level.
pub fn validate_stitching(a_anchor: Hash32, b_start: Hash32) -> bool {
    a_anchor == b_start
}

fn sha256_concat(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(byte: u8) -> Hash32 {
        Hash32([byte; 32])
    }

    #[test]
    fn single_leaf_receipt_is_valid_iff_start_equals_anchor() {
        let r = Receipt {
            start: h(7),
            anchor: h(7),
            entries: vec![],
            local_block: 1,
        };
        assert!(r.validate());

        let bad = Receipt {
            start: h(7),
            anchor: h(8),
            entries: vec![],
            local_block: 1,
        };
        assert!(!bad.validate());
    }

    #[test]
    fn flipping_right_breaks_the_fold() {
        let entries = vec![
            ReceiptEntry { hash: h(2), right: true },
            ReceiptEntry { hash: h(3), right: false },
        ];
        let start = h(1);
        let folded = fold(start, &entries);

        let mut flipped = entries.clone();
        flipped[0].right = false;
        let folded_flipped = fold(start, &flipped);

        assert_ne!(folded, folded_flipped);
    }

    #[test]
    fn stitching_requires_byte_equality() {
        let a = h(9);
        let mut b = h(9);
        assert!(validate_stitching(a, b));
        b.0[0] ^= 0x01;
        assert!(!validate_stitching(a, b));
    }
}
