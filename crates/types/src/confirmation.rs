// Path: crates/types/src/confirmation.rs
//! Confirmation-depth tracking for settled anchors.

use serde::{Deserialize, Serialize};

use crate::hash::Hash32;

/// The default confirmation depth required for finality.
pub const DEFAULT_REQUIRED_CONFIRMATIONS: u64 = 12;

/// Tracks confirmation depth for a single anchored batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationRecord {
    /// The anchor this record tracks.
    pub anchor_id: Hash32,
    /// The block number the anchor transaction landed in.
    pub block_number: u64,
    /// Confirmations observed so far: `latest - anchor_block + 1`.
    pub confirmations: u64,
    /// Set once `confirmations >= required`. Never reset afterward.
    pub r#final: bool,
    /// The block hash at `block_number`.
    pub block_hash: Hash32,
}

impl ConfirmationRecord {
    /// Recomputes `confirmations` from the latest observed chain head and
    /// sets `final` once the required depth is reached. `final` is
    /// monotonic: once true, subsequent calls leave it true.
    pub fn update(&mut self, latest_block: u64, required: u64) {
        self.confirmations = latest_block.saturating_sub(self.block_number) + 1;
        if self.confirmations >= required {
            self.r#final = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_flag_is_monotonic() {
        let mut record = ConfirmationRecord {
            anchor_id: Hash32::ZERO,
            block_number: 100,
            confirmations: 0,
            r#final: false,
            block_hash: Hash32::ZERO,
        };
        record.update(105, DEFAULT_REQUIRED_CONFIRMATIONS);
        assert!(!record.r#final);
        record.update(111, DEFAULT_REQUIRED_CONFIRMATIONS);
        assert!(record.r#final);
        record.update(105, DEFAULT_REQUIRED_CONFIRMATIONS);
        assert!(record.r#final, "final must never reset once set");
    }
}
