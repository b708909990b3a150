//! Snapshot cache persistence layer.
//!
//! # Responsibility
//! - Persist one fetched accounting snapshot locally and serve it back
//!   through the accounting-service contract.
//! - Isolate SQLite query details from resolution and service logic.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod snapshot_repo;
