use clustershare_core::{
    build_hierarchy, collect_descendants, resolve_parent_chain, resolve_parent_chain_detailed,
    AccountRecord, AccountSnapshot, ChainTermination, HierarchyError, SnapshotError,
};

fn record(name: &str, parent: &str) -> AccountRecord {
    AccountRecord::new(name, parent)
}

fn org_snapshot() -> AccountSnapshot {
    AccountSnapshot::from_records(vec![
        record("root", ""),
        record("eng", "root"),
        record("eng-ml", "eng"),
        record("eng-infra", "eng"),
    ])
    .unwrap()
}

#[test]
fn snapshot_exposes_records_and_distinct_correlation_ids() {
    let first = org_snapshot();
    let second = org_snapshot();

    assert_eq!(first.len(), 4);
    assert!(!first.is_empty());
    assert_ne!(first.snapshot_uuid(), second.snapshot_uuid());

    let names: Vec<_> = first.iter().map(|account| account.name.as_str()).collect();
    assert_eq!(names, vec!["root", "eng", "eng-ml", "eng-infra"]);
    assert!(first.contains("eng"));
    assert_eq!(first.children_of("eng"), ["eng-ml", "eng-infra"]);
}

#[test]
fn build_hierarchy_assigns_levels_paths_and_totals() {
    let snapshot = org_snapshot();
    let tree = build_hierarchy("root", &snapshot).unwrap();

    assert_eq!(tree.account.name, "root");
    assert_eq!(tree.level, 0);
    assert_eq!(tree.path, vec!["root"]);
    assert_eq!(tree.total_sub_accounts, 3);

    assert_eq!(tree.children.len(), 1);
    let eng = &tree.children[0];
    assert_eq!(eng.account.name, "eng");
    assert_eq!(eng.level, 1);
    assert_eq!(eng.path, vec!["root", "eng"]);
    assert_eq!(eng.total_sub_accounts, 2);

    let grandchildren: Vec<_> = eng
        .children
        .iter()
        .map(|node| (node.account.name.as_str(), node.level, node.total_sub_accounts))
        .collect();
    assert_eq!(grandchildren, vec![("eng-ml", 2, 0), ("eng-infra", 2, 0)]);
    assert_eq!(eng.children[0].path, vec!["root", "eng", "eng-ml"]);
}

#[test]
fn build_hierarchy_totals_are_order_independent() {
    let forward = org_snapshot();
    let reversed = AccountSnapshot::from_records(vec![
        record("eng-infra", "eng"),
        record("eng-ml", "eng"),
        record("eng", "root"),
        record("root", ""),
    ])
    .unwrap();

    let forward_tree = build_hierarchy("root", &forward).unwrap();
    let reversed_tree = build_hierarchy("root", &reversed).unwrap();
    assert_eq!(forward_tree.total_sub_accounts, 3);
    assert_eq!(
        forward_tree.total_sub_accounts,
        reversed_tree.total_sub_accounts
    );
}

#[test]
fn build_hierarchy_keeps_snapshot_insertion_order() {
    // "zeta" loads before "alpha"; children must not come back sorted.
    let snapshot = AccountSnapshot::from_records(vec![
        record("root", ""),
        record("zeta", "root"),
        record("alpha", "root"),
    ])
    .unwrap();

    let tree = build_hierarchy("root", &snapshot).unwrap();
    let children: Vec<_> = tree
        .children
        .iter()
        .map(|node| node.account.name.as_str())
        .collect();
    assert_eq!(children, vec!["zeta", "alpha"]);
}

#[test]
fn build_hierarchy_can_root_at_any_subtree() {
    let snapshot = org_snapshot();
    let eng = build_hierarchy("eng", &snapshot).unwrap();

    assert_eq!(eng.level, 0);
    assert_eq!(eng.path, vec!["eng"]);
    assert_eq!(eng.total_sub_accounts, 2);
}

#[test]
fn build_hierarchy_rejects_missing_root() {
    let snapshot = org_snapshot();
    let err = build_hierarchy("finance", &snapshot).unwrap_err();
    assert!(matches!(
        err,
        HierarchyError::AccountNotFound(name) if name == "finance"
    ));

    let empty = build_hierarchy("", &snapshot).unwrap_err();
    assert!(matches!(empty, HierarchyError::AccountNotFound(_)));
}

#[test]
fn snapshot_load_rejects_duplicate_names_before_any_build() {
    let err = AccountSnapshot::from_records(vec![
        record("root", ""),
        record("eng", "root"),
        record("eng", "root"),
    ])
    .unwrap_err();
    assert_eq!(err, SnapshotError::DuplicateAccountName("eng".to_string()));
}

#[test]
fn parent_chain_walks_nearest_parent_first_to_root() {
    let snapshot = org_snapshot();
    let chain = resolve_parent_chain("eng-ml", &snapshot).unwrap();
    let names: Vec<_> = chain.iter().map(|account| account.name.as_str()).collect();
    assert_eq!(names, vec!["eng", "root"]);

    let detailed = resolve_parent_chain_detailed("eng-ml", &snapshot).unwrap();
    assert_eq!(detailed.termination, ChainTermination::RootReached);
}

#[test]
fn parent_chain_of_root_is_empty() {
    let snapshot = org_snapshot();
    let chain = resolve_parent_chain("root", &snapshot).unwrap();
    assert!(chain.is_empty());
}

#[test]
fn parent_chain_rejects_unknown_start() {
    let snapshot = org_snapshot();
    let err = resolve_parent_chain("finance", &snapshot).unwrap_err();
    assert!(matches!(err, HierarchyError::AccountNotFound(_)));
}

#[test]
fn parent_chain_truncates_silently_on_two_node_cycle() {
    let snapshot =
        AccountSnapshot::from_records(vec![record("a", "b"), record("b", "a")]).unwrap();

    let chain = resolve_parent_chain("a", &snapshot).unwrap();
    let names: Vec<_> = chain.iter().map(|account| account.name.as_str()).collect();
    assert_eq!(names, vec!["b"]);

    let detailed = resolve_parent_chain_detailed("a", &snapshot).unwrap();
    assert_eq!(detailed.termination, ChainTermination::CycleDetected);
}

#[test]
fn parent_chain_is_bounded_by_store_size_on_longer_cycles() {
    let snapshot = AccountSnapshot::from_records(vec![
        record("a", "b"),
        record("b", "c"),
        record("c", "a"),
    ])
    .unwrap();

    let chain = resolve_parent_chain("a", &snapshot).unwrap();
    assert!(chain.len() <= snapshot.len());
    let names: Vec<_> = chain.iter().map(|account| account.name.as_str()).collect();
    assert_eq!(names, vec!["b", "c"]);
}

#[test]
fn parent_chain_truncates_silently_on_broken_reference() {
    let snapshot = AccountSnapshot::from_records(vec![
        record("leaf", "middle"),
        record("middle", "vanished"),
    ])
    .unwrap();

    let chain = resolve_parent_chain("leaf", &snapshot).unwrap();
    let names: Vec<_> = chain.iter().map(|account| account.name.as_str()).collect();
    assert_eq!(names, vec!["middle"]);

    let detailed = resolve_parent_chain_detailed("leaf", &snapshot).unwrap();
    assert_eq!(detailed.termination, ChainTermination::MissingParent);
}

#[test]
fn collect_descendants_depth_one_returns_direct_children_only() {
    let snapshot = org_snapshot();
    let direct = collect_descendants("root", &snapshot, 1).unwrap();
    let names: Vec<_> = direct.iter().map(|account| account.name.as_str()).collect();
    assert_eq!(names, vec!["eng"]);
}

#[test]
fn collect_descendants_zero_depth_means_unlimited() {
    let snapshot = org_snapshot();
    let unlimited = collect_descendants("root", &snapshot, 0).unwrap();
    let names: Vec<_> = unlimited
        .iter()
        .map(|account| account.name.as_str())
        .collect();
    assert_eq!(names, vec!["eng", "eng-ml", "eng-infra"]);

    // Any limit at or past the actual depth matches the unlimited walk.
    for depth in [2, 3, 10] {
        let bounded = collect_descendants("root", &snapshot, depth).unwrap();
        assert_eq!(bounded, unlimited, "depth {depth} should match unlimited");
    }
}

#[test]
fn collect_descendants_rejects_negative_depth() {
    let snapshot = org_snapshot();
    let err = collect_descendants("root", &snapshot, -1).unwrap_err();
    assert!(matches!(err, HierarchyError::InvalidDepth(-1)));
}

#[test]
fn collect_descendants_rejects_unknown_name() {
    let snapshot = org_snapshot();
    let err = collect_descendants("finance", &snapshot, 0).unwrap_err();
    assert!(matches!(
        err,
        HierarchyError::AccountNotFound(name) if name == "finance"
    ));
}

#[test]
fn collect_descendants_of_leaf_is_empty() {
    let snapshot = org_snapshot();
    let leaves = collect_descendants("eng-ml", &snapshot, 0).unwrap();
    assert!(leaves.is_empty());
}
