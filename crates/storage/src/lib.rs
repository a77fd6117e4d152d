// Path: crates/storage/src/lib.rs
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

//! # Certen Validator — In-Memory Repositories
//!
//! Reference implementations of the repository contracts declared in
//! `certen-types::repository`. A durable backend is out of scope; these
//! exist so the discovery, batching, anchoring, and confirmation
//! components have something to run against.

pub mod anchor;
pub mod attestation;
pub mod batch;
pub mod checkpoint;
pub mod confirmation;
pub mod proof;
pub mod status;

pub use anchor::InMemoryAnchorRepository;
pub use attestation::InMemoryAttestationRepository;
pub use batch::InMemoryBatchRepository;
pub use checkpoint::InMemoryCheckpointRepository;
pub use confirmation::InMemoryConfirmationRepository;
pub use proof::InMemoryProofRepository;
pub use status::InMemoryStatusRepository;
