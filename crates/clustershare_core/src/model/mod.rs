//! Domain model for cluster accounting records.
//!
//! # Responsibility
//! - Define the canonical flat record shapes fetched from the accounting
//!   service (accounts, associations).
//! - Define TRES quota/usage value types shared by aggregation views.
//!
//! # Invariants
//! - Every account is identified by a stable, validated `name`.
//! - An empty `parent_name` marks a hierarchy root.
//! - Deletion is represented by the `DELETED` flag, not record removal.

pub mod account;
pub mod association;
pub mod tres;
