// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized static reference to the global `MetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns a static reference to the configured error metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured discovery metrics sink.
pub fn discovery_metrics() -> &'static dyn DiscoveryMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured batch metrics sink.
pub fn batch_metrics() -> &'static dyn BatchMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured anchor metrics sink.
pub fn anchor_metrics() -> &'static dyn AnchorMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured attestation metrics sink.
pub fn attestation_metrics() -> &'static dyn AttestationMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured write-back metrics sink.
pub fn writeback_metrics() -> &'static dyn WriteBackMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured client metrics sink.
pub fn client_metrics() -> &'static dyn ClientMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

// --- Trait Definitions ---

/// A sink for metrics related to block discovery and intent classification.
pub trait DiscoveryMetricsSink: Send + Sync + std::fmt::Debug {
    /// Sets the gauge for the last checkpointed block height.
    fn set_checkpoint_height(&self, height: u64);
    /// Increments the counter for blocks successfully processed.
    fn inc_blocks_processed(&self);
    /// Increments the counter for classified blobs, labeled by kind.
    fn inc_blobs_classified(&self, kind: &'static str);
    /// Observes the duration of one discovery poll tick.
    fn observe_poll_duration(&self, duration_secs: f64);
}
impl DiscoveryMetricsSink for NopSink {
    fn set_checkpoint_height(&self, _height: u64) {}
    fn inc_blocks_processed(&self) {}
    fn inc_blobs_classified(&self, _kind: &'static str) {}
    fn observe_poll_duration(&self, _duration_secs: f64) {}
}

/// A sink for metrics related to batch collection and closing.
pub trait BatchMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter for records added to open batches.
    fn inc_records_added(&self);
    /// Increments the counter for duplicate leaves rejected.
    fn inc_duplicate_leaves_rejected(&self);
    /// Increments the counter for batches closed, labeled by close reason.
    fn inc_batches_closed(&self, reason: &'static str);
    /// Sets the gauge for the current number of open batches.
    fn set_open_batch_count(&self, count: u64);
}
impl BatchMetricsSink for NopSink {
    fn inc_records_added(&self) {}
    fn inc_duplicate_leaves_rejected(&self) {}
    fn inc_batches_closed(&self, _reason: &'static str) {}
    fn set_open_batch_count(&self, _count: u64) {}
}

/// A sink for metrics related to anchor submission and confirmation.
pub trait AnchorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter for bundle-id collisions encountered.
    fn inc_bundle_id_collisions(&self);
    /// Increments the counter for anchors successfully created.
    fn inc_anchors_created(&self);
    /// Increments the counter for comprehensive proofs executed.
    fn inc_proofs_executed(&self);
    /// Increments the counter for proof verification failures observed on-chain.
    fn inc_proof_verification_failures(&self);
    /// Increments the counter for anchors reaching finality.
    fn inc_anchors_finalized(&self);
    /// Observes the duration of one confirmation-tracker tick.
    fn observe_confirmation_tick_duration(&self, duration_secs: f64);
}
impl AnchorMetricsSink for NopSink {
    fn inc_bundle_id_collisions(&self) {}
    fn inc_anchors_created(&self) {}
    fn inc_proofs_executed(&self) {}
    fn inc_proof_verification_failures(&self) {}
    fn inc_anchors_finalized(&self) {}
    fn observe_confirmation_tick_duration(&self, _duration_secs: f64) {}
}

/// A sink for metrics related to BLS attestation aggregation.
pub trait AttestationMetricsSink: Send + Sync + std::fmt::Debug {
    /// Observes the number of validators whose signatures entered an aggregate.
    fn observe_validator_count(&self, count: u32);
    /// Increments the counter for bundles that met the 2/3 threshold.
    fn inc_threshold_met(&self);
    /// Increments the counter for bundles that fell below the 2/3 threshold.
    fn inc_threshold_not_met(&self);
    /// Increments the counter for partial signatures rejected (malformed or unverifiable).
    fn inc_partial_signature_rejected(&self);
}
impl AttestationMetricsSink for NopSink {
    fn observe_validator_count(&self, _count: u32) {}
    fn inc_threshold_met(&self) {}
    fn inc_threshold_not_met(&self) {}
    fn inc_partial_signature_rejected(&self) {}
}

/// A sink for metrics related to synthetic write-back transactions.
pub trait WriteBackMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter for write-back transactions submitted.
    fn inc_submitted(&self);
    /// Increments the counter for write-back transactions confirmed.
    fn inc_confirmed(&self);
    /// Increments the counter for write-back transactions that failed or were rejected.
    fn inc_failed(&self);
    /// Observes the wall-clock time from submission to settlement or timeout.
    fn observe_watch_duration(&self, duration_secs: f64);
}
impl WriteBackMetricsSink for NopSink {
    fn inc_submitted(&self) {}
    fn inc_confirmed(&self) {}
    fn inc_failed(&self) {}
    fn observe_watch_duration(&self, _duration_secs: f64) {}
}

/// A sink for metrics related to outbound RPC clients (source ledger, target
/// chain, consensus, peer transport).
pub trait ClientMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a retried operation, labeled by endpoint.
    fn inc_retry_attempt(&self, endpoint: &str);
    /// Increments a counter for an operation whose retry budget was exhausted.
    fn inc_retry_exhausted(&self, endpoint: &str);
    /// Observes the latency of a completed RPC call, labeled by endpoint.
    fn observe_request_duration(&self, endpoint: &str, duration_secs: f64);
}
impl ClientMetricsSink for NopSink {
    fn inc_retry_attempt(&self, _endpoint: &str) {}
    fn inc_retry_exhausted(&self, _endpoint: &str) {}
    fn observe_request_duration(&self, _endpoint: &str, _duration_secs: f64) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and variant.
    fn inc_error(&self, kind: &'static str, variant: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _variant: &'static str) {}
}

/// A unified sink that implements all domain-specific traits, providing a single
/// point of implementation for metrics backends like Prometheus.
pub trait MetricsSink:
    DiscoveryMetricsSink
    + BatchMetricsSink
    + AnchorMetricsSink
    + AttestationMetricsSink
    + WriteBackMetricsSink
    + ClientMetricsSink
    + ErrorMetricsSink
{
}

// Blanket implementation to allow any type that implements all sub-traits
// to be used as a `MetricsSink`.
impl<T> MetricsSink for T where
    T: DiscoveryMetricsSink
        + BatchMetricsSink
        + AnchorMetricsSink
        + AttestationMetricsSink
        + WriteBackMetricsSink
        + ClientMetricsSink
        + ErrorMetricsSink
{
}
