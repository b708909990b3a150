//! In-process registry of accounting-service implementations.
//!
//! # Responsibility
//! - Register service implementations under stable version ids.
//! - Select one active implementation and route fetch calls to it.
//!
//! # Invariants
//! - Version ids are lowercase alphanumerics plus `._-` and unique.
//! - Fetches through the registry fail cleanly when nothing is selected.

use crate::model::account::AccountRecord;
use crate::model::association::AssociationRecord;
use crate::remote::service_spi::{
    AccountingService, AssociationFilter, ServiceError, ServiceResult,
};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Registration/selection errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceRegistryError {
    /// Service id is empty or contains rejected characters.
    InvalidServiceId(String),
    /// Another implementation already uses this id.
    DuplicateServiceId(String),
    /// No implementation registered under this id.
    ServiceNotFound(String),
}

impl Display for ServiceRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidServiceId(value) => write!(f, "service id is invalid: `{value}`"),
            Self::DuplicateServiceId(value) => {
                write!(f, "service id already registered: `{value}`")
            }
            Self::ServiceNotFound(value) => write!(f, "service not found: `{value}`"),
        }
    }
}

impl Error for ServiceRegistryError {}

/// Runtime registry of [`AccountingService`] implementations.
///
/// The client-side analog of a versioned API adapter set: each remote API
/// version registers one implementation, and callers pin the version they
/// talk to by selecting it active.
#[derive(Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, Arc<dyn AccountingService>>,
    active_service_id: Option<String>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one service implementation under its own id.
    pub fn register(
        &mut self,
        service: Arc<dyn AccountingService>,
    ) -> Result<(), ServiceRegistryError> {
        let service_id = service.service_id().trim().to_string();
        if !is_valid_service_id(&service_id) {
            return Err(ServiceRegistryError::InvalidServiceId(service_id));
        }
        if self.services.contains_key(service_id.as_str()) {
            return Err(ServiceRegistryError::DuplicateServiceId(service_id));
        }

        self.services.insert(service_id, service);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Returns sorted service ids.
    pub fn service_ids(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    /// Selects one active service.
    pub fn select_active(&mut self, service_id: &str) -> Result<(), ServiceRegistryError> {
        let normalized = service_id.trim();
        if !self.services.contains_key(normalized) {
            return Err(ServiceRegistryError::ServiceNotFound(
                normalized.to_string(),
            ));
        }
        self.active_service_id = Some(normalized.to_string());
        Ok(())
    }

    /// Clears active service selection.
    pub fn clear_active(&mut self) {
        self.active_service_id = None;
    }

    /// Returns active service id.
    pub fn active_service_id(&self) -> Option<&str> {
        self.active_service_id.as_deref()
    }

    /// Returns one service by id.
    pub fn get(&self, service_id: &str) -> Option<Arc<dyn AccountingService>> {
        self.services.get(service_id.trim()).cloned()
    }

    /// Returns active service handle.
    pub fn active_service(&self) -> Option<Arc<dyn AccountingService>> {
        let id = self.active_service_id()?;
        self.get(id)
    }

    /// Fetches all accounts from the selected service.
    pub fn list_accounts_active(&self) -> ServiceResult<Vec<AccountRecord>> {
        self.require_active()?.list_accounts()
    }

    /// Fetches associations from the selected service.
    pub fn list_associations_active(
        &self,
        filter: &AssociationFilter,
    ) -> ServiceResult<Vec<AssociationRecord>> {
        self.require_active()?.list_associations(filter)
    }

    /// Fetches one account from the selected service.
    pub fn get_account_active(&self, name: &str) -> ServiceResult<AccountRecord> {
        self.require_active()?.get_account(name)
    }

    fn require_active(&self) -> ServiceResult<Arc<dyn AccountingService>> {
        match self.active_service() {
            Some(service) => Ok(service),
            None => Err(ServiceError::backend(
                "registry",
                "no active accounting service selected",
                false,
            )),
        }
    }
}

fn is_valid_service_id(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::{ServiceRegistry, ServiceRegistryError};
    use crate::model::account::AccountRecord;
    use crate::remote::service_spi::ServiceError;
    use crate::remote::static_service::StaticAccountingService;
    use std::sync::Arc;

    fn fixture_service(service_id: &str, account: &str) -> Arc<StaticAccountingService> {
        Arc::new(StaticAccountingService::new(
            service_id,
            vec![AccountRecord::new(account, "")],
            Vec::new(),
        ))
    }

    #[test]
    fn register_and_select_routes_calls_to_active_service() {
        let mut registry = ServiceRegistry::new();
        registry.register(fixture_service("v0.0.42", "alpha")).unwrap();
        registry.register(fixture_service("v0.0.43", "beta")).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.service_ids(), vec!["v0.0.42", "v0.0.43"]);

        registry.select_active("v0.0.43").unwrap();
        assert_eq!(registry.active_service_id(), Some("v0.0.43"));

        let accounts = registry.list_accounts_active().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].name, "beta");

        let account = registry.get_account_active("beta").unwrap();
        assert_eq!(account.name, "beta");

        let associations = registry
            .list_associations_active(&crate::remote::service_spi::AssociationFilter::all())
            .unwrap();
        assert!(associations.is_empty());
    }

    #[test]
    fn register_rejects_duplicate_and_invalid_ids() {
        let mut registry = ServiceRegistry::new();
        registry.register(fixture_service("v0.0.43", "alpha")).unwrap();

        let duplicate = registry
            .register(fixture_service("v0.0.43", "beta"))
            .unwrap_err();
        assert!(matches!(
            duplicate,
            ServiceRegistryError::DuplicateServiceId(id) if id == "v0.0.43"
        ));

        let invalid = registry
            .register(fixture_service("V0 43", "gamma"))
            .unwrap_err();
        assert!(matches!(invalid, ServiceRegistryError::InvalidServiceId(_)));
    }

    #[test]
    fn select_active_rejects_unknown_id() {
        let mut registry = ServiceRegistry::new();
        let err = registry.select_active("v9.9.9").unwrap_err();
        assert!(matches!(
            err,
            ServiceRegistryError::ServiceNotFound(id) if id == "v9.9.9"
        ));
    }

    #[test]
    fn fetch_without_selection_fails_cleanly() {
        let mut registry = ServiceRegistry::new();
        registry.register(fixture_service("v0.0.43", "alpha")).unwrap();

        let err = registry.list_accounts_active().unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Backend { service_id, retryable: false, .. } if service_id == "registry"
        ));

        registry.select_active("v0.0.43").unwrap();
        registry.clear_active();
        assert!(registry.active_service().is_none());
    }
}
