//! Best-effort decoration of resolved hierarchy trees.
//!
//! # Responsibility
//! - Fill advisory per-node metrics (user counts, quota, usage) from
//!   caller-supplied lookup maps.
//!
//! # Invariants
//! - Decoration mutates only advisory fields, never `children`, `level`,
//!   or `path`.
//! - A lookup miss leaves the field at its zero value and is logged; no
//!   decoration problem ever fails a hierarchy build.
//! - Per-node user counts are local to the node's own account; they are
//!   never rolled up across a subtree.

use crate::hierarchy::resolver::HierarchyNode;
use crate::model::association::AssociationRecord;
use crate::model::tres::{AccountQuota, AccountUsage};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Sets every node's `total_users` to its own distinct bound user count.
///
/// Counts users from associations of exactly that node's account; rows
/// without a user name are skipped. Descendant users are never included;
/// callers sum a subtree themselves when they want a rolled-up total.
pub fn annotate_user_counts(
    node: &mut HierarchyNode,
    associations_by_account: &HashMap<String, Vec<AssociationRecord>>,
) {
    node.total_users = match associations_by_account.get(node.account.name.as_str()) {
        Some(associations) => distinct_user_count(associations),
        None => {
            debug!(
                "event=decorate_miss module=hierarchy field=users account={}",
                node.account.name
            );
            0
        }
    };

    for child in &mut node.children {
        annotate_user_counts(child, associations_by_account);
    }
}

/// Attaches pre-fetched per-account quota records verbatim.
///
/// Nodes without a quota entry keep the default zero value.
pub fn annotate_quota(node: &mut HierarchyNode, quota_by_account: &HashMap<String, AccountQuota>) {
    match quota_by_account.get(node.account.name.as_str()) {
        Some(quota) => node.aggregate_quota = quota.clone(),
        None => debug!(
            "event=decorate_miss module=hierarchy field=quota account={}",
            node.account.name
        ),
    }

    for child in &mut node.children {
        annotate_quota(child, quota_by_account);
    }
}

/// Attaches pre-fetched per-account usage records verbatim.
///
/// Nodes without a usage entry keep the default zero value.
pub fn annotate_usage(node: &mut HierarchyNode, usage_by_account: &HashMap<String, AccountUsage>) {
    match usage_by_account.get(node.account.name.as_str()) {
        Some(usage) => node.aggregate_usage = usage.clone(),
        None => debug!(
            "event=decorate_miss module=hierarchy field=usage account={}",
            node.account.name
        ),
    }

    for child in &mut node.children {
        annotate_usage(child, usage_by_account);
    }
}

/// Groups flat association records by account name.
pub fn group_by_account(
    associations: Vec<AssociationRecord>,
) -> HashMap<String, Vec<AssociationRecord>> {
    let mut grouped: HashMap<String, Vec<AssociationRecord>> = HashMap::new();
    for association in associations {
        grouped
            .entry(association.account.clone())
            .or_default()
            .push(association);
    }
    grouped
}

fn distinct_user_count(associations: &[AssociationRecord]) -> usize {
    let mut users = HashSet::new();
    for association in associations {
        if association.has_user() {
            users.insert(association.user.as_str());
        }
    }
    users.len()
}
