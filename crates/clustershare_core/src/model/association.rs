//! Association domain model.
//!
//! # Responsibility
//! - Define the user-to-account binding record fetched from the accounting
//!   service.
//!
//! # Invariants
//! - `account` is always set; `user` may be empty for account-level rows.
//! - Cluster/partition scoping is optional and opaque to the core.

use serde::{Deserialize, Serialize};

/// Flat user-to-account binding record.
///
/// Associations are many-to-many between users and accounts. Rows with an
/// empty `user` describe the account itself and never count toward user
/// totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationRecord {
    /// Bound user name. Empty for account-level association rows.
    pub user: String,
    /// Bound account name.
    pub account: String,
    /// Optional cluster scope.
    pub cluster: Option<String>,
    /// Optional partition scope.
    pub partition: Option<String>,
    /// Whether this is the user's default account binding.
    pub is_default: bool,
}

impl AssociationRecord {
    /// Creates a user-to-account binding without cluster/partition scope.
    pub fn new(user: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            account: account.into(),
            cluster: None,
            partition: None,
            is_default: false,
        }
    }

    /// Returns whether this row binds an actual user.
    pub fn has_user(&self) -> bool {
        !self.user.is_empty()
    }
}
