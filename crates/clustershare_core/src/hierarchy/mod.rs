//! Hierarchy resolution and aggregation over account snapshots.
//!
//! # Responsibility
//! - Derive trees, parent chains, and depth-bounded subtrees from flat
//!   parent-pointer records.
//! - Decorate resolved trees with advisory metrics and project fair-share
//!   views.
//!
//! # Invariants
//! - Resolution is pure over one [`crate::snapshot::AccountSnapshot`]; no
//!   I/O, no retries, no shared mutable state between calls.
//! - Structural errors abort a call; decoration problems never do.

pub mod aggregate;
pub mod fair_share;
pub mod resolver;
