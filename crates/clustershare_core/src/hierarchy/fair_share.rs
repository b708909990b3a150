//! Fair-share projection over resolved hierarchies.
//!
//! # Responsibility
//! - Map an account hierarchy plus optional per-node share inputs into a
//!   fair-share tree with share totals.
//!
//! # Invariants
//! - Projection is one-to-one structural: the fair-share tree is
//!   isomorphic to its source hierarchy.
//! - `raw_shares` defaults to 1 per node when no configuration is given.
//! - Sibling normalization is NOT performed here: `normalized_shares`
//!   stays at its default. True fair-share normalization is a
//!   configuration-driven scheduling policy, not topology projection.

use crate::hierarchy::resolver::HierarchyNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw share count assigned to nodes without explicit configuration.
pub const DEFAULT_RAW_SHARES: i64 = 1;

/// Fair-share view of one account hierarchy node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairShareNode {
    /// Account name.
    pub name: String,
    /// Parent account name. Empty for hierarchy roots.
    pub parent_name: String,
    /// Depth below the projected root. Root = 0.
    pub level: u32,
    /// Configured raw share count.
    pub raw_shares: i64,
    /// Placeholder until a normalization policy runs. Defaults to 1.0.
    pub normalized_shares: f64,
    /// Historical usage input. Defaults to 0.0.
    pub usage: f64,
    /// Decayed/weighted usage input. Defaults to 0.0.
    pub effective_usage: f64,
    /// Scheduling priority factor. Defaults to 1.0.
    pub fair_share_factor: f64,
    /// Child nodes, isomorphic to the source hierarchy.
    pub children: Vec<FairShareNode>,
}

/// Optional per-account raw share configuration.
///
/// Topology alone carries no share information, so projection falls back
/// to [`DEFAULT_RAW_SHARES`] for accounts without an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Fallback raw shares for unconfigured accounts.
    pub default_shares: i64,
    /// Explicit raw shares keyed by account name.
    pub shares_by_account: BTreeMap<String, i64>,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            default_shares: DEFAULT_RAW_SHARES,
            shares_by_account: BTreeMap::new(),
        }
    }
}

impl ShareConfig {
    /// Returns the raw shares configured for one account.
    pub fn shares_for(&self, account: &str) -> i64 {
        self.shares_by_account
            .get(account)
            .copied()
            .unwrap_or(self.default_shares)
    }
}

/// Fair-share tree envelope returned by service-level queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairShareTree {
    /// Account the projection was rooted at.
    pub root_account: String,
    /// Sum of `raw_shares` over every node in the tree.
    pub total_shares: i64,
    /// The projected tree.
    pub tree: FairShareNode,
}

/// Projects a hierarchy into a fair-share tree with default shares.
pub fn project_fair_share(root: &HierarchyNode) -> FairShareNode {
    project_fair_share_with(root, &ShareConfig::default())
}

/// Projects a hierarchy into a fair-share tree using explicit shares.
pub fn project_fair_share_with(root: &HierarchyNode, config: &ShareConfig) -> FairShareNode {
    FairShareNode {
        name: root.account.name.clone(),
        parent_name: root.account.parent_name.clone(),
        level: root.level,
        raw_shares: config.shares_for(root.account.name.as_str()),
        normalized_shares: 1.0,
        usage: 0.0,
        effective_usage: 0.0,
        fair_share_factor: 1.0,
        children: root
            .children
            .iter()
            .map(|child| project_fair_share_with(child, config))
            .collect(),
    }
}

/// Sums `raw_shares` over the whole tree, root included.
///
/// Defined recursively as `raw_shares + Σ total_shares(child)`; the sum
/// over zero children is 0, so leaves contribute exactly their own shares.
pub fn total_shares(node: &FairShareNode) -> i64 {
    node.raw_shares
        + node
            .children
            .iter()
            .map(total_shares)
            .sum::<i64>()
}
