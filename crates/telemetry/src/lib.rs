// Path: crates/telemetry/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Certen Validator Telemetry
//!
//! Observability infrastructure shared across the validator's components:
//! structured logging initialization, Prometheus metric collectors, and
//! abstract sinks that decouple instrumentation call sites from the
//! metrics backend.

/// The initialization routine for global structured logging.
pub mod init;
/// The concrete implementation of metrics sinks using the `prometheus` crate.
pub mod prometheus;
/// Abstract traits (`*MetricsSink`) that define the contract for metrics reporting.
pub mod sinks;
/// A simple RAII timer for measuring the duration of a scope.
pub mod time;

// Re-export the public helper functions for easy access to the global sinks.
pub use sinks::{
    anchor_metrics, attestation_metrics, batch_metrics, client_metrics, discovery_metrics,
    error_metrics, writeback_metrics,
};
