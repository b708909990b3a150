//! Accounting-service collaborator seam.
//!
//! # Responsibility
//! - Define the fetch contract the core consumes (flat record lists plus
//!   single-account lookup).
//! - Provide a versioned registry for service implementations and an
//!   in-memory fixture implementation.
//!
//! # Invariants
//! - The core never talks to the remote side except through
//!   [`service_spi::AccountingService`].
//! - Transport, authentication, and retry policy live behind the trait,
//!   never in the core.

pub mod service_registry;
pub mod service_spi;
pub mod static_service;
