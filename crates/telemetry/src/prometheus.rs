// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_gauge, register_histogram, register_histogram_vec,
    register_int_counter, register_int_counter_vec, Gauge, Histogram, HistogramVec, IntCounter,
    IntCounterVec,
};

// --- Metric Statics ---
// We use OnceCell to hold the metric collectors. They will be initialized
// exactly once by the `install` function.

static CHECKPOINT_HEIGHT: OnceCell<Gauge> = OnceCell::new();
static BLOCKS_PROCESSED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static BLOBS_CLASSIFIED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static DISCOVERY_POLL_DURATION_SECONDS: OnceCell<Histogram> = OnceCell::new();

static BATCH_RECORDS_ADDED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static BATCH_DUPLICATE_LEAVES_REJECTED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static BATCHES_CLOSED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static OPEN_BATCH_COUNT: OnceCell<Gauge> = OnceCell::new();

static BUNDLE_ID_COLLISIONS_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static ANCHORS_CREATED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static PROOFS_EXECUTED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static PROOF_VERIFICATION_FAILURES_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static ANCHORS_FINALIZED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static CONFIRMATION_TICK_DURATION_SECONDS: OnceCell<Histogram> = OnceCell::new();

static ATTESTATION_VALIDATOR_COUNT: OnceCell<Histogram> = OnceCell::new();
static ATTESTATION_THRESHOLD_MET_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static ATTESTATION_THRESHOLD_NOT_MET_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static ATTESTATION_PARTIAL_REJECTED_TOTAL: OnceCell<IntCounter> = OnceCell::new();

static WRITEBACK_SUBMITTED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static WRITEBACK_CONFIRMED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static WRITEBACK_FAILED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static WRITEBACK_WATCH_DURATION_SECONDS: OnceCell<Histogram> = OnceCell::new();

static CLIENT_RETRY_ATTEMPTS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static CLIENT_RETRY_EXHAUSTED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static CLIENT_REQUEST_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();

static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Helper macro to reduce boilerplate for getting a metric from OnceCell.
/// This will panic if `install()` has not been called, which is intentional
/// as it indicates a critical application setup error.
macro_rules! get_metric {
    ($metric:ident) => {
        $metric
            .get()
            .expect("Prometheus sink not initialized. Call telemetry::prometheus::install() first.")
    };
}

impl DiscoveryMetricsSink for PrometheusSink {
    fn set_checkpoint_height(&self, height: u64) {
        get_metric!(CHECKPOINT_HEIGHT).set(height as f64);
    }
    fn inc_blocks_processed(&self) {
        get_metric!(BLOCKS_PROCESSED_TOTAL).inc();
    }
    fn inc_blobs_classified(&self, kind: &'static str) {
        get_metric!(BLOBS_CLASSIFIED_TOTAL).with_label_values(&[kind]).inc();
    }
    fn observe_poll_duration(&self, duration_secs: f64) {
        get_metric!(DISCOVERY_POLL_DURATION_SECONDS).observe(duration_secs);
    }
}

impl BatchMetricsSink for PrometheusSink {
    fn inc_records_added(&self) {
        get_metric!(BATCH_RECORDS_ADDED_TOTAL).inc();
    }
    fn inc_duplicate_leaves_rejected(&self) {
        get_metric!(BATCH_DUPLICATE_LEAVES_REJECTED_TOTAL).inc();
    }
    fn inc_batches_closed(&self, reason: &'static str) {
        get_metric!(BATCHES_CLOSED_TOTAL).with_label_values(&[reason]).inc();
    }
    fn set_open_batch_count(&self, count: u64) {
        get_metric!(OPEN_BATCH_COUNT).set(count as f64);
    }
}

impl AnchorMetricsSink for PrometheusSink {
    fn inc_bundle_id_collisions(&self) {
        get_metric!(BUNDLE_ID_COLLISIONS_TOTAL).inc();
    }
    fn inc_anchors_created(&self) {
        get_metric!(ANCHORS_CREATED_TOTAL).inc();
    }
    fn inc_proofs_executed(&self) {
        get_metric!(PROOFS_EXECUTED_TOTAL).inc();
    }
    fn inc_proof_verification_failures(&self) {
        get_metric!(PROOF_VERIFICATION_FAILURES_TOTAL).inc();
    }
    fn inc_anchors_finalized(&self) {
        get_metric!(ANCHORS_FINALIZED_TOTAL).inc();
    }
    fn observe_confirmation_tick_duration(&self, duration_secs: f64) {
        get_metric!(CONFIRMATION_TICK_DURATION_SECONDS).observe(duration_secs);
    }
}

impl AttestationMetricsSink for PrometheusSink {
    fn observe_validator_count(&self, count: u32) {
        get_metric!(ATTESTATION_VALIDATOR_COUNT).observe(count as f64);
    }
    fn inc_threshold_met(&self) {
        get_metric!(ATTESTATION_THRESHOLD_MET_TOTAL).inc();
    }
    fn inc_threshold_not_met(&self) {
        get_metric!(ATTESTATION_THRESHOLD_NOT_MET_TOTAL).inc();
    }
    fn inc_partial_signature_rejected(&self) {
        get_metric!(ATTESTATION_PARTIAL_REJECTED_TOTAL).inc();
    }
}

impl WriteBackMetricsSink for PrometheusSink {
    fn inc_submitted(&self) {
        get_metric!(WRITEBACK_SUBMITTED_TOTAL).inc();
    }
    fn inc_confirmed(&self) {
        get_metric!(WRITEBACK_CONFIRMED_TOTAL).inc();
    }
    fn inc_failed(&self) {
        get_metric!(WRITEBACK_FAILED_TOTAL).inc();
    }
    fn observe_watch_duration(&self, duration_secs: f64) {
        get_metric!(WRITEBACK_WATCH_DURATION_SECONDS).observe(duration_secs);
    }
}

impl ClientMetricsSink for PrometheusSink {
    fn inc_retry_attempt(&self, endpoint: &str) {
        get_metric!(CLIENT_RETRY_ATTEMPTS_TOTAL).with_label_values(&[endpoint]).inc();
    }
    fn inc_retry_exhausted(&self, endpoint: &str) {
        get_metric!(CLIENT_RETRY_EXHAUSTED_TOTAL).with_label_values(&[endpoint]).inc();
    }
    fn observe_request_duration(&self, endpoint: &str, duration_secs: f64) {
        get_metric!(CLIENT_REQUEST_DURATION_SECONDS)
            .with_label_values(&[endpoint])
            .observe(duration_secs);
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        get_metric!(ERRORS_TOTAL).with_label_values(&[kind, variant]).inc();
    }
}

/// Initializes all Prometheus metrics collectors and returns a static reference to the sink.
/// This function must be called only once at application startup.
#[allow(clippy::expect_used)]
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    CHECKPOINT_HEIGHT
        .set(register_gauge!("certen_discovery_checkpoint_height", "Last checkpointed block height.")?)
        .expect("static already initialized");
    BLOCKS_PROCESSED_TOTAL
        .set(register_int_counter!(
            "certen_discovery_blocks_processed_total",
            "Total blocks successfully processed by discovery workers."
        )?)
        .expect("static already initialized");
    BLOBS_CLASSIFIED_TOTAL
        .set(register_int_counter_vec!(
            "certen_discovery_blobs_classified_total",
            "Total classified blobs, by kind.",
            &["kind"]
        )?)
        .expect("static already initialized");
    DISCOVERY_POLL_DURATION_SECONDS
        .set(register_histogram!(
            "certen_discovery_poll_duration_seconds",
            "Latency of one discovery poll tick.",
            exponential_buckets(0.005, 2.0, 15)?
        )?)
        .expect("static already initialized");

    BATCH_RECORDS_ADDED_TOTAL
        .set(register_int_counter!("certen_batch_records_added_total", "Total records added to open batches.")?)
        .expect("static already initialized");
    BATCH_DUPLICATE_LEAVES_REJECTED_TOTAL
        .set(register_int_counter!(
            "certen_batch_duplicate_leaves_rejected_total",
            "Total duplicate leaves rejected by the batch collector."
        )?)
        .expect("static already initialized");
    BATCHES_CLOSED_TOTAL
        .set(register_int_counter_vec!(
            "certen_batches_closed_total",
            "Total batches closed, by close reason.",
            &["reason"]
        )?)
        .expect("static already initialized");
    OPEN_BATCH_COUNT
        .set(register_gauge!("certen_open_batch_count", "Current number of open batches.")?)
        .expect("static already initialized");

    BUNDLE_ID_COLLISIONS_TOTAL
        .set(register_int_counter!(
            "certen_anchor_bundle_id_collisions_total",
            "Total bundle-id collisions encountered during resolution."
        )?)
        .expect("static already initialized");
    ANCHORS_CREATED_TOTAL
        .set(register_int_counter!("certen_anchors_created_total", "Total anchors successfully created.")?)
        .expect("static already initialized");
    PROOFS_EXECUTED_TOTAL
        .set(register_int_counter!(
            "certen_proofs_executed_total",
            "Total comprehensive proofs executed against the anchor contract."
        )?)
        .expect("static already initialized");
    PROOF_VERIFICATION_FAILURES_TOTAL
        .set(register_int_counter!(
            "certen_proof_verification_failures_total",
            "Total ProofVerificationFailed events observed."
        )?)
        .expect("static already initialized");
    ANCHORS_FINALIZED_TOTAL
        .set(register_int_counter!(
            "certen_anchors_finalized_total",
            "Total anchors that reached the required confirmation depth."
        )?)
        .expect("static already initialized");
    CONFIRMATION_TICK_DURATION_SECONDS
        .set(register_histogram!(
            "certen_confirmation_tick_duration_seconds",
            "Latency of one confirmation-tracker tick.",
            exponential_buckets(0.005, 2.0, 15)?
        )?)
        .expect("static already initialized");

    ATTESTATION_VALIDATOR_COUNT
        .set(register_histogram!(
            "certen_attestation_validator_count",
            "Number of validators whose signatures entered an aggregate.",
            vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0]
        )?)
        .expect("static already initialized");
    ATTESTATION_THRESHOLD_MET_TOTAL
        .set(register_int_counter!(
            "certen_attestation_threshold_met_total",
            "Total bundles whose aggregate met the 2/3 voting-power threshold."
        )?)
        .expect("static already initialized");
    ATTESTATION_THRESHOLD_NOT_MET_TOTAL
        .set(register_int_counter!(
            "certen_attestation_threshold_not_met_total",
            "Total bundles whose aggregate fell below the 2/3 voting-power threshold."
        )?)
        .expect("static already initialized");
    ATTESTATION_PARTIAL_REJECTED_TOTAL
        .set(register_int_counter!(
            "certen_attestation_partial_rejected_total",
            "Total partial signatures rejected as malformed or unverifiable."
        )?)
        .expect("static already initialized");

    WRITEBACK_SUBMITTED_TOTAL
        .set(register_int_counter!(
            "certen_writeback_submitted_total",
            "Total synthetic write-back transactions submitted."
        )?)
        .expect("static already initialized");
    WRITEBACK_CONFIRMED_TOTAL
        .set(register_int_counter!(
            "certen_writeback_confirmed_total",
            "Total synthetic write-back transactions confirmed."
        )?)
        .expect("static already initialized");
    WRITEBACK_FAILED_TOTAL
        .set(register_int_counter!(
            "certen_writeback_failed_total",
            "Total synthetic write-back transactions that failed, were rejected, or timed out."
        )?)
        .expect("static already initialized");
    WRITEBACK_WATCH_DURATION_SECONDS
        .set(register_histogram!(
            "certen_writeback_watch_duration_seconds",
            "Wall-clock time from submission to settlement or timeout.",
            exponential_buckets(0.5, 2.0, 12)?
        )?)
        .expect("static already initialized");

    CLIENT_RETRY_ATTEMPTS_TOTAL
        .set(register_int_counter_vec!(
            "certen_client_retry_attempts_total",
            "Total retry attempts issued against an external endpoint.",
            &["endpoint"]
        )?)
        .expect("static already initialized");
    CLIENT_RETRY_EXHAUSTED_TOTAL
        .set(register_int_counter_vec!(
            "certen_client_retry_exhausted_total",
            "Total operations whose retry budget was exhausted.",
            &["endpoint"]
        )?)
        .expect("static already initialized");
    CLIENT_REQUEST_DURATION_SECONDS
        .set(register_histogram_vec!(
            "certen_client_request_duration_seconds",
            "Latency of a completed external request.",
            &["endpoint"],
            exponential_buckets(0.01, 2.0, 15)?
        )?)
        .expect("static already initialized");

    ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "certen_errors_total",
            "Total number of errors, categorized by type and variant.",
            &["kind", "variant"]
        )?)
        .expect("static already initialized");

    static SINK: PrometheusSink = PrometheusSink;
    Ok(&SINK)
}
