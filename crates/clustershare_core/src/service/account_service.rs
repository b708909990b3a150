//! Account use-case service.
//!
//! # Responsibility
//! - Validate caller input above the accounting-service seam.
//! - Orchestrate fetch → snapshot → resolve → decorate flows.
//! - Provide filtered listing and user/access queries.
//!
//! # Invariants
//! - Every resolution call builds its own snapshot; nothing is shared or
//!   mutated across calls.
//! - A fetch failure aborts the call before any tree is built.
//! - Decoration runs after topology and can only default fields, never
//!   fail the call.

use crate::hierarchy::aggregate::{annotate_user_counts, group_by_account};
use crate::hierarchy::fair_share::{
    project_fair_share_with, total_shares, FairShareTree, ShareConfig,
};
use crate::hierarchy::resolver::{
    build_hierarchy, collect_descendants, resolve_parent_chain, HierarchyError, HierarchyNode,
};
use crate::model::account::AccountRecord;
use crate::model::association::AssociationRecord;
use crate::remote::service_spi::{AccountingService, AssociationFilter, ServiceError};
use crate::snapshot::{AccountSnapshot, SnapshotError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for account service operations.
pub type AccountServiceResult<T> = Result<T, AccountServiceError>;

/// Errors from account service operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountServiceError {
    /// Account name input is blank after trim.
    EmptyAccountName,
    /// User name input is blank after trim.
    EmptyUserName,
    /// Account is absent, remotely or in the working snapshot.
    AccountNotFound(String),
    /// Fetched snapshot contains two records with one name.
    DuplicateAccountName(String),
    /// Caller passed a negative depth limit.
    InvalidDepth(i64),
    /// Accounting-service failure.
    Service(ServiceError),
}

impl Display for AccountServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAccountName => write!(f, "account name must not be blank"),
            Self::EmptyUserName => write!(f, "user name must not be blank"),
            Self::AccountNotFound(name) => write!(f, "account not found: `{name}`"),
            Self::DuplicateAccountName(name) => {
                write!(f, "duplicate account name in snapshot: `{name}`")
            }
            Self::InvalidDepth(depth) => {
                write!(f, "depth must be non-negative (0 means unlimited), got {depth}")
            }
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccountServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ServiceError> for AccountServiceError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::AccountNotFound(name) => Self::AccountNotFound(name),
            other => Self::Service(other),
        }
    }
}

impl From<SnapshotError> for AccountServiceError {
    fn from(value: SnapshotError) -> Self {
        match value {
            SnapshotError::DuplicateAccountName(name) => Self::DuplicateAccountName(name),
        }
    }
}

impl From<HierarchyError> for AccountServiceError {
    fn from(value: HierarchyError) -> Self {
        match value {
            HierarchyError::AccountNotFound(name) => Self::AccountNotFound(name),
            HierarchyError::InvalidDepth(depth) => Self::InvalidDepth(depth),
        }
    }
}

/// Client-side filter options for account listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAccountsQuery {
    /// Keep only these account names.
    pub names: Vec<String>,
    /// Keep only these organizations.
    pub organizations: Vec<String>,
    /// Keep only accounts under these parents.
    pub parent_accounts: Vec<String>,
    /// Include accounts flagged `DELETED`.
    pub with_deleted: bool,
}

/// Result of a user-access check against one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCheck {
    /// Checked user name.
    pub user: String,
    /// Checked account name.
    pub account: String,
    /// Whether any user↔account association exists.
    pub has_access: bool,
    /// The first matching association, when access exists.
    pub association: Option<AssociationRecord>,
}

/// Account use-case facade over one accounting-service implementation.
pub struct AccountService<S: AccountingService> {
    service: S,
}

impl<S: AccountingService> AccountService<S> {
    /// Creates a service from an accounting-service implementation.
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Lists accounts with client-side filtering.
    pub fn list_accounts(
        &self,
        query: &ListAccountsQuery,
    ) -> AccountServiceResult<Vec<AccountRecord>> {
        let accounts = self.service.list_accounts()?;
        Ok(filter_accounts(accounts, query))
    }

    /// Gets one account by name.
    pub fn get_account(&self, name: &str) -> AccountServiceResult<AccountRecord> {
        let name = normalize_account_name(name)?;
        Ok(self.service.get_account(name)?)
    }

    /// Lists user-bearing associations for one account.
    ///
    /// Account-level association rows (empty user) are skipped.
    pub fn account_users(&self, name: &str) -> AccountServiceResult<Vec<AssociationRecord>> {
        let name = normalize_account_name(name)?;
        let associations = self
            .service
            .list_associations(&AssociationFilter::for_account(name))?;
        Ok(associations
            .into_iter()
            .filter(AssociationRecord::has_user)
            .collect())
    }

    /// Checks whether a user is associated with an account.
    pub fn validate_user_access(
        &self,
        user: &str,
        account: &str,
    ) -> AccountServiceResult<AccessCheck> {
        let account = normalize_account_name(account)?;
        let user = user.trim();
        if user.is_empty() {
            return Err(AccountServiceError::EmptyUserName);
        }

        let filter = AssociationFilter {
            account: Some(account.to_string()),
            user: Some(user.to_string()),
        };
        let mut matches = self.service.list_associations(&filter)?;
        let association = if matches.is_empty() {
            None
        } else {
            Some(matches.swap_remove(0))
        };

        Ok(AccessCheck {
            user: user.to_string(),
            account: account.to_string(),
            has_access: association.is_some(),
            association,
        })
    }

    /// Fetches all accounts into a call-scoped snapshot.
    pub fn load_snapshot(&self) -> AccountServiceResult<AccountSnapshot> {
        let accounts = self.service.list_accounts()?;
        Ok(AccountSnapshot::from_records(accounts)?)
    }

    /// Builds the account hierarchy rooted at `root`, with user counts.
    ///
    /// The root's remote existence is checked first, so a missing root
    /// surfaces the remote not-found case before any snapshot is fetched.
    /// User counts come from one bulk association fetch; quota/usage
    /// decoration stays caller-driven via
    /// [`crate::hierarchy::aggregate`].
    pub fn account_hierarchy(&self, root: &str) -> AccountServiceResult<HierarchyNode> {
        let root = normalize_account_name(root)?;
        self.service.get_account(root)?;

        let snapshot = self.load_snapshot()?;
        let mut node = build_hierarchy(root, &snapshot)?;

        let associations = self.service.list_associations(&AssociationFilter::all())?;
        let grouped = group_by_account(associations);
        annotate_user_counts(&mut node, &grouped);

        Ok(node)
    }

    /// Resolves the parent chain for one account, nearest parent first.
    pub fn parent_accounts(&self, name: &str) -> AccountServiceResult<Vec<AccountRecord>> {
        let name = normalize_account_name(name)?;
        let snapshot = self.load_snapshot()?;
        Ok(resolve_parent_chain(name, &snapshot)?)
    }

    /// Collects descendants of one account, bounded by `max_depth`.
    ///
    /// `max_depth == 0` means unlimited.
    pub fn child_accounts(
        &self,
        name: &str,
        max_depth: i64,
    ) -> AccountServiceResult<Vec<AccountRecord>> {
        let name = normalize_account_name(name)?;
        let snapshot = self.load_snapshot()?;
        Ok(collect_descendants(name, &snapshot, max_depth)?)
    }

    /// Builds the fair-share tree rooted at `root` with default shares.
    pub fn fair_share_hierarchy(&self, root: &str) -> AccountServiceResult<FairShareTree> {
        self.fair_share_hierarchy_with(root, &ShareConfig::default())
    }

    /// Builds the fair-share tree rooted at `root` with explicit shares.
    pub fn fair_share_hierarchy_with(
        &self,
        root: &str,
        config: &ShareConfig,
    ) -> AccountServiceResult<FairShareTree> {
        let hierarchy = self.account_hierarchy(root)?;
        let tree = project_fair_share_with(&hierarchy, config);
        let total = total_shares(&tree);
        Ok(FairShareTree {
            root_account: hierarchy.account.name,
            total_shares: total,
            tree,
        })
    }
}

fn normalize_account_name(value: &str) -> AccountServiceResult<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AccountServiceError::EmptyAccountName);
    }
    Ok(trimmed)
}

fn filter_accounts(accounts: Vec<AccountRecord>, query: &ListAccountsQuery) -> Vec<AccountRecord> {
    accounts
        .into_iter()
        .filter(|account| {
            if !query.names.is_empty() && !query.names.contains(&account.name) {
                return false;
            }
            if !query.organizations.is_empty()
                && !query.organizations.contains(&account.organization)
            {
                return false;
            }
            if !query.parent_accounts.is_empty()
                && !query.parent_accounts.contains(&account.parent_name)
            {
                return false;
            }
            if !query.with_deleted && account.is_deleted() {
                return false;
            }
            true
        })
        .collect()
}
