// Path: crates/types/src/status.rs
//! The two-phase intent status map.

use serde::{Deserialize, Serialize};

/// The lifecycle state of a discovered intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    /// Discovered, not yet claimed by a worker.
    Pending,
    /// Claimed by a worker; processing underway.
    InProgress,
    /// Terminal success state.
    Completed,
    /// Processing failed; may be retried via `mark_in_progress`.
    Failed,
}

impl IntentStatus {
    /// Whether `mark_in_progress` is permitted from this state.
    ///
    /// Mirrors the state machine: `pending` and `failed` may transition to
    /// `in_progress`; `in_progress` and `completed` may not (the entry
    /// function returns `false`, preventing duplicate concurrent
    /// processing).
    pub fn can_mark_in_progress(self) -> bool {
        matches!(self, Self::Pending | Self::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_and_failed_can_start_processing() {
        assert!(IntentStatus::Pending.can_mark_in_progress());
        assert!(IntentStatus::Failed.can_mark_in_progress());
        assert!(!IntentStatus::InProgress.can_mark_in_progress());
        assert!(!IntentStatus::Completed.can_mark_in_progress());
    }
}
