//! In-memory accounting service backed by fixed record vectors.
//!
//! # Responsibility
//! - Serve caller-supplied accounts/associations through the
//!   [`AccountingService`] contract for tests and offline analysis.
//!
//! # Invariants
//! - Record order is preserved exactly as supplied, so snapshots built
//!   from this service have deterministic adjacency ordering.

use crate::model::account::AccountRecord;
use crate::model::association::AssociationRecord;
use crate::remote::service_spi::{
    AccountingService, AssociationFilter, ServiceError, ServiceResult,
};

/// Fixed-data implementation of [`AccountingService`].
#[derive(Debug, Clone)]
pub struct StaticAccountingService {
    service_id: String,
    accounts: Vec<AccountRecord>,
    associations: Vec<AssociationRecord>,
}

impl StaticAccountingService {
    /// Creates a service serving the given records verbatim.
    pub fn new(
        service_id: impl Into<String>,
        accounts: Vec<AccountRecord>,
        associations: Vec<AssociationRecord>,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            accounts,
            associations,
        }
    }
}

impl AccountingService for StaticAccountingService {
    fn service_id(&self) -> &str {
        &self.service_id
    }

    fn list_accounts(&self) -> ServiceResult<Vec<AccountRecord>> {
        Ok(self.accounts.clone())
    }

    fn list_associations(
        &self,
        filter: &AssociationFilter,
    ) -> ServiceResult<Vec<AssociationRecord>> {
        Ok(self
            .associations
            .iter()
            .filter(|association| filter.matches(association))
            .cloned()
            .collect())
    }

    fn get_account(&self, name: &str) -> ServiceResult<AccountRecord> {
        self.accounts
            .iter()
            .find(|account| account.name == name)
            .cloned()
            .ok_or_else(|| ServiceError::AccountNotFound(name.to_string()))
    }
}
