//! Accounting service contract and shared error envelope.
//!
//! # Responsibility
//! - Define the operations the core consumes from a remote accounting
//!   service: fetch-all accounts, fetch associations, fetch one account.
//! - Keep the error surface small: the core only distinguishes "that
//!   account does not exist remotely" from "the backend failed".
//!
//! # Invariants
//! - Implementations own persistence and transport; the core performs no
//!   I/O of its own.
//! - Fetch failures are surfaced as-is and abort resolution before any
//!   tree is built; no retries happen behind this trait from the core side.

use crate::model::account::AccountRecord;
use crate::model::association::AssociationRecord;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Result type for accounting-service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by accounting-service implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The remote side has no account with this name.
    AccountNotFound(String),
    /// Backend-side failure (transport, storage, protocol).
    Backend {
        /// Id of the implementation that produced the error.
        service_id: String,
        /// Human-readable failure summary.
        message: String,
        /// Whether the caller may reasonably retry the whole operation.
        retryable: bool,
    },
}

impl ServiceError {
    /// Creates a backend error for one service implementation.
    pub fn backend(
        service_id: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self::Backend {
            service_id: service_id.into(),
            message: message.into(),
            retryable,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccountNotFound(name) => write!(f, "account not found: `{name}`"),
            Self::Backend {
                service_id,
                message,
                retryable,
            } => write!(
                f,
                "accounting service `{service_id}` failed (retryable={retryable}): {message}"
            ),
        }
    }
}

impl Error for ServiceError {}

/// Server-side filter for association fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationFilter {
    /// Restrict to one account name.
    pub account: Option<String>,
    /// Restrict to one user name.
    pub user: Option<String>,
}

impl AssociationFilter {
    /// Filter matching every association.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter matching one account's associations.
    pub fn for_account(account: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            user: None,
        }
    }

    /// Returns whether one record passes the filter.
    pub fn matches(&self, association: &AssociationRecord) -> bool {
        if let Some(account) = self.account.as_deref() {
            if association.account != account {
                return false;
            }
        }
        if let Some(user) = self.user.as_deref() {
            if association.user != user {
                return false;
            }
        }
        true
    }
}

/// Fetch contract the core consumes from the accounting service.
///
/// Implementations decide where records come from (HTTP transport, local
/// cache, in-memory fixture); the core only requires that one call yields
/// one consistent flat list.
pub trait AccountingService {
    /// Returns the stable id of this implementation (e.g. `"v0.0.43"`).
    fn service_id(&self) -> &str;

    /// Fetches all account records as one flat snapshot source.
    fn list_accounts(&self) -> ServiceResult<Vec<AccountRecord>>;

    /// Fetches association records matching the filter.
    fn list_associations(
        &self,
        filter: &AssociationFilter,
    ) -> ServiceResult<Vec<AssociationRecord>>;

    /// Fetches one account by name.
    ///
    /// # Errors
    /// - [`ServiceError::AccountNotFound`] when the remote side has no
    ///   account with this name.
    fn get_account(&self, name: &str) -> ServiceResult<AccountRecord>;
}

impl<T: AccountingService + ?Sized> AccountingService for Arc<T> {
    fn service_id(&self) -> &str {
        (**self).service_id()
    }

    fn list_accounts(&self) -> ServiceResult<Vec<AccountRecord>> {
        (**self).list_accounts()
    }

    fn list_associations(
        &self,
        filter: &AssociationFilter,
    ) -> ServiceResult<Vec<AssociationRecord>> {
        (**self).list_associations(filter)
    }

    fn get_account(&self, name: &str) -> ServiceResult<AccountRecord> {
        (**self).get_account(name)
    }
}
