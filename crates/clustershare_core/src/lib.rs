//! Client-side accounting model for a cluster resource manager.
//! This crate derives account hierarchy, quota, usage, and fair-share
//! views from flat records fetched through the accounting-service seam.

pub mod db;
pub mod hierarchy;
pub mod logging;
pub mod model;
pub mod remote;
pub mod repo;
pub mod service;
pub mod snapshot;

pub use hierarchy::aggregate::{
    annotate_quota, annotate_usage, annotate_user_counts, group_by_account,
};
pub use hierarchy::fair_share::{
    project_fair_share, project_fair_share_with, total_shares, FairShareNode, FairShareTree,
    ShareConfig,
};
pub use hierarchy::resolver::{
    build_hierarchy, collect_descendants, resolve_parent_chain, resolve_parent_chain_detailed,
    ChainTermination, HierarchyError, HierarchyNode, HierarchyResult, ParentChain,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{AccountRecord, AccountValidationError, DELETED_FLAG};
pub use model::association::AssociationRecord;
pub use model::tres::{validate_tres, AccountQuota, AccountUsage, TresMap};
pub use remote::service_registry::{ServiceRegistry, ServiceRegistryError};
pub use remote::service_spi::{
    AccountingService, AssociationFilter, ServiceError, ServiceResult,
};
pub use remote::static_service::StaticAccountingService;
pub use repo::snapshot_repo::{CacheRepoError, SnapshotMeta, SqliteSnapshotRepository};
pub use service::account_service::{
    AccessCheck, AccountService, AccountServiceError, AccountServiceResult, ListAccountsQuery,
};
pub use snapshot::{AccountSnapshot, SnapshotError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
