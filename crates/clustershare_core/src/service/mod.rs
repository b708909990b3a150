//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate accounting-service fetches into snapshot, hierarchy, and
//!   fair-share use-case APIs.
//! - Keep callers decoupled from transport and storage details.

pub mod account_service;
