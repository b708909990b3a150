//! Tree, chain, and subtree resolution over one account snapshot.
//!
//! # Responsibility
//! - Build fully-owned hierarchy trees from the snapshot adjacency map.
//! - Walk parent chains upward with cycle and broken-reference guards.
//! - Collect depth-bounded descendant lists.
//!
//! # Invariants
//! - Output trees own their nodes exclusively; the adjacency map is a
//!   separate read-only lookup structure and never part of the tree.
//! - `level`/`path` are assigned top-down, `total_sub_accounts` bottom-up,
//!   and neither is mutated after construction completes.
//! - Parent-chain truncation on cycles or broken references is a
//!   completion, not a failure.

use crate::model::account::AccountRecord;
use crate::model::tres::{AccountQuota, AccountUsage};
use crate::snapshot::AccountSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for hierarchy resolution operations.
pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Structural errors from hierarchy resolution.
///
/// Any of these aborts the whole call; partial topology is never returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// Requested account name is absent from the snapshot.
    ///
    /// Distinct from the remote service's own not-found case: resolution
    /// assumes the caller already fetched the snapshot successfully.
    AccountNotFound(String),
    /// Caller passed a negative depth limit.
    InvalidDepth(i64),
}

impl Display for HierarchyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccountNotFound(name) => {
                write!(f, "account not found in snapshot: `{name}`")
            }
            Self::InvalidDepth(depth) => {
                write!(f, "depth must be non-negative (0 means unlimited), got {depth}")
            }
        }
    }
}

impl Error for HierarchyError {}

/// Fully-owned account hierarchy node.
///
/// `total_users`, `aggregate_quota`, and `aggregate_usage` are advisory
/// fields filled by the decoration pass in
/// [`crate::hierarchy::aggregate`]; they default to zero values here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// The account record this node wraps.
    pub account: AccountRecord,
    /// Depth below the queried root. Root = 0.
    pub level: u32,
    /// Ancestor names from the queried root down to this node, inclusive.
    pub path: Vec<String>,
    /// Child nodes in snapshot insertion order.
    pub children: Vec<HierarchyNode>,
    /// Count of all descendants (children plus their descendants).
    pub total_sub_accounts: usize,
    /// Distinct users bound to exactly this account. Advisory.
    pub total_users: usize,
    /// Per-account quota attached verbatim. Advisory.
    pub aggregate_quota: AccountQuota,
    /// Per-account usage attached verbatim. Advisory.
    pub aggregate_usage: AccountUsage,
}

/// How a parent-chain walk came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainTermination {
    /// An empty parent pointer was reached.
    RootReached,
    /// The next parent was already visited during this walk.
    CycleDetected,
    /// The next parent name is absent from the snapshot.
    MissingParent,
}

/// Parent chain plus the reason the walk stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentChain {
    /// Ancestors in nearest-parent-first order.
    pub parents: Vec<AccountRecord>,
    /// Why the walk terminated.
    pub termination: ChainTermination,
}

/// Builds the full hierarchy rooted at `root`.
///
/// Depth-first descent over the snapshot adjacency map. `level` and `path`
/// are assigned on the way down; `total_sub_accounts` accumulates as each
/// recursive call returns (`children.len()` plus every child's own total).
///
/// Assumes the adjacency map is acyclic, which holds for any snapshot whose
/// parent pointers form a forest. This call does not verify acyclicity
/// independently; only parent-chain walks carry a cycle guard. Known
/// asymmetry: a snapshot with cyclic parent pointers must not be fed to
/// this function.
///
/// # Errors
/// - [`HierarchyError::AccountNotFound`] when `root` is absent from the
///   snapshot (an empty root name is absent by construction).
pub fn build_hierarchy(root: &str, snapshot: &AccountSnapshot) -> HierarchyResult<HierarchyNode> {
    let record = snapshot
        .get(root)
        .ok_or_else(|| HierarchyError::AccountNotFound(root.to_string()))?;
    Ok(build_node(record, snapshot, 0, Vec::new()))
}

fn build_node(
    record: &AccountRecord,
    snapshot: &AccountSnapshot,
    level: u32,
    parent_path: Vec<String>,
) -> HierarchyNode {
    let mut path = parent_path;
    path.push(record.name.clone());

    let child_names = snapshot.children_of(record.name.as_str());
    let mut children = Vec::with_capacity(child_names.len());
    let mut total_sub_accounts = child_names.len();

    for child_name in child_names {
        // Adjacency entries are derived from records present in the
        // snapshot, so the lookup cannot miss.
        let Some(child_record) = snapshot.get(child_name) else {
            continue;
        };
        let child = build_node(child_record, snapshot, level + 1, path.clone());
        total_sub_accounts += child.total_sub_accounts;
        children.push(child);
    }

    HierarchyNode {
        account: record.clone(),
        level,
        path,
        children,
        total_sub_accounts,
        total_users: 0,
        aggregate_quota: AccountQuota::default(),
        aggregate_usage: AccountUsage::default(),
    }
}

/// Resolves the parent chain for `name`, nearest parent first.
///
/// The walk stops silently at the first empty parent pointer, the first
/// previously-visited name, or the first parent absent from the snapshot.
/// A malformed snapshot therefore yields a shorter chain, never a hang or
/// an error. Use [`resolve_parent_chain_detailed`] to observe why a walk
/// stopped.
///
/// # Errors
/// - [`HierarchyError::AccountNotFound`] when `name` itself is absent.
pub fn resolve_parent_chain(
    name: &str,
    snapshot: &AccountSnapshot,
) -> HierarchyResult<Vec<AccountRecord>> {
    resolve_parent_chain_detailed(name, snapshot).map(|chain| chain.parents)
}

/// Resolves the parent chain and reports the termination reason.
///
/// Same walk as [`resolve_parent_chain`]; the extra [`ChainTermination`]
/// flag distinguishes a completed root walk from cycle or broken-reference
/// truncation without changing the default silent contract.
pub fn resolve_parent_chain_detailed(
    name: &str,
    snapshot: &AccountSnapshot,
) -> HierarchyResult<ParentChain> {
    let start = snapshot
        .get(name)
        .ok_or_else(|| HierarchyError::AccountNotFound(name.to_string()))?;

    let mut visited = HashSet::new();
    visited.insert(start.name.as_str());

    let mut parents = Vec::new();
    let mut current = start;

    let termination = loop {
        let parent_name = current.parent_name.as_str();
        if parent_name.is_empty() {
            break ChainTermination::RootReached;
        }
        if visited.contains(parent_name) {
            break ChainTermination::CycleDetected;
        }
        let Some(parent) = snapshot.get(parent_name) else {
            break ChainTermination::MissingParent;
        };

        visited.insert(parent.name.as_str());
        parents.push(parent.clone());
        current = parent;
    };

    Ok(ParentChain {
        parents,
        termination,
    })
}

/// Collects descendants of `name` in pre-order, bounded by `max_depth`.
///
/// `max_depth == 0` means unlimited. Immediate children sit at depth 1; a
/// node is included while its depth does not exceed the limit, and the
/// traversal stops descending once the limit is reached instead of walking
/// excluded levels.
///
/// # Errors
/// - [`HierarchyError::InvalidDepth`] when `max_depth` is negative.
/// - [`HierarchyError::AccountNotFound`] when `name` is absent.
pub fn collect_descendants(
    name: &str,
    snapshot: &AccountSnapshot,
    max_depth: i64,
) -> HierarchyResult<Vec<AccountRecord>> {
    if max_depth < 0 {
        return Err(HierarchyError::InvalidDepth(max_depth));
    }
    if !snapshot.contains(name) {
        return Err(HierarchyError::AccountNotFound(name.to_string()));
    }

    let mut collected = Vec::new();
    collect_into(name, snapshot, max_depth, 1, &mut collected);
    Ok(collected)
}

fn collect_into(
    name: &str,
    snapshot: &AccountSnapshot,
    max_depth: i64,
    depth: i64,
    collected: &mut Vec<AccountRecord>,
) {
    for child_name in snapshot.children_of(name) {
        let Some(child) = snapshot.get(child_name) else {
            continue;
        };
        collected.push(child.clone());

        if max_depth == 0 || depth < max_depth {
            collect_into(child_name, snapshot, max_depth, depth + 1, collected);
        }
    }
}
