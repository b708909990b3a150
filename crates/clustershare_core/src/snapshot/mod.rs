//! Call-scoped account snapshot store.
//!
//! # Responsibility
//! - Hold one consistent flat snapshot of account records for the duration
//!   of a single resolution call.
//! - Provide O(1) name-keyed lookup and a precomputed parent-to-children
//!   adjacency map.
//!
//! # Invariants
//! - Duplicate account names fail the load; they are never collapsed,
//!   because silent last-write-wins would corrupt descendant counts.
//! - Child ordering follows snapshot insertion order, not lexicographic
//!   order; callers wanting sorted output sort records before loading.
//! - A snapshot issues zero accounting-service calls; population is the
//!   caller's responsibility.

use crate::model::account::AccountRecord;
use log::debug;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type for snapshot load operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Errors from snapshot construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Two records in the same snapshot share one account name.
    DuplicateAccountName(String),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateAccountName(name) => {
                write!(f, "duplicate account name in snapshot: `{name}`")
            }
        }
    }
}

impl Error for SnapshotError {}

/// Read-only flat snapshot of account records plus derived adjacency.
///
/// Built once per top-level resolution call and never mutated afterwards.
/// Concurrent resolution calls must each build their own snapshot; there is
/// no shared state between instances.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    snapshot_uuid: Uuid,
    accounts: HashMap<String, AccountRecord>,
    order: Vec<String>,
    children: HashMap<String, Vec<String>>,
}

impl AccountSnapshot {
    /// Builds a snapshot from flat records in one pass.
    ///
    /// Derives the `parent name -> child names` adjacency map at load time,
    /// so child lookups during traversal are O(1).
    ///
    /// # Errors
    /// - [`SnapshotError::DuplicateAccountName`] when two records share a
    ///   name. The load aborts before any hierarchy can be built on top.
    pub fn from_records(records: Vec<AccountRecord>) -> SnapshotResult<Self> {
        let snapshot_uuid = Uuid::new_v4();
        let mut accounts = HashMap::with_capacity(records.len());
        let mut order = Vec::with_capacity(records.len());
        let mut children: HashMap<String, Vec<String>> = HashMap::new();

        for record in records {
            if accounts.contains_key(record.name.as_str()) {
                return Err(SnapshotError::DuplicateAccountName(record.name));
            }

            if !record.parent_name.is_empty() {
                children
                    .entry(record.parent_name.clone())
                    .or_default()
                    .push(record.name.clone());
            }
            order.push(record.name.clone());
            accounts.insert(record.name.clone(), record);
        }

        debug!(
            "event=snapshot_load module=snapshot status=ok snapshot_uuid={} accounts={}",
            snapshot_uuid,
            order.len()
        );

        Ok(Self {
            snapshot_uuid,
            accounts,
            order,
            children,
        })
    }

    /// Returns the correlation id assigned at load time.
    ///
    /// Only used to tie log events of one resolution call together; it has
    /// no meaning on the remote side.
    pub fn snapshot_uuid(&self) -> Uuid {
        self.snapshot_uuid
    }

    /// Returns one record by account name.
    pub fn get(&self, name: &str) -> Option<&AccountRecord> {
        self.accounts.get(name)
    }

    /// Returns whether the snapshot contains the account name.
    pub fn contains(&self, name: &str) -> bool {
        self.accounts.contains_key(name)
    }

    /// Returns direct child account names in insertion order.
    ///
    /// Unknown parents yield an empty slice; leaves do too.
    pub fn children_of(&self, name: &str) -> &[String] {
        self.children
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the number of accounts in the snapshot.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns whether the snapshot holds no accounts.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates records in snapshot insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AccountRecord> {
        self.order
            .iter()
            .filter_map(|name| self.accounts.get(name.as_str()))
    }
}
