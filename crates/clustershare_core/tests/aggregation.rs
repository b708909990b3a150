use clustershare_core::{
    annotate_quota, annotate_usage, annotate_user_counts, build_hierarchy, group_by_account,
    AccountQuota, AccountRecord, AccountSnapshot, AccountUsage, AssociationRecord,
};
use std::collections::HashMap;

fn org_tree() -> clustershare_core::HierarchyNode {
    let snapshot = AccountSnapshot::from_records(vec![
        AccountRecord::new("root", ""),
        AccountRecord::new("eng", "root"),
        AccountRecord::new("eng-ml", "eng"),
    ])
    .unwrap();
    build_hierarchy("root", &snapshot).unwrap()
}

#[test]
fn user_counts_are_distinct_and_local_per_node() {
    let mut tree = org_tree();
    let grouped = group_by_account(vec![
        AssociationRecord::new("alice", "eng"),
        AssociationRecord::new("alice", "eng"),
        AssociationRecord::new("bob", "eng"),
        AssociationRecord::new("carol", "eng-ml"),
        // Account-level row: must not count as a user.
        AssociationRecord::new("", "eng"),
    ]);

    annotate_user_counts(&mut tree, &grouped);

    // No association rows for root at all; the miss defaults to zero and
    // child users never roll up.
    assert_eq!(tree.total_users, 0);
    let eng = &tree.children[0];
    assert_eq!(eng.total_users, 2);
    assert_eq!(eng.children[0].total_users, 1);
}

#[test]
fn quota_attaches_verbatim_and_misses_stay_default() {
    let mut tree = org_tree();

    let mut eng_quota = AccountQuota::default();
    eng_quota.grp_tres.insert("cpu".to_string(), 512);
    eng_quota.grp_tres_used.insert("cpu".to_string(), 128);

    let mut quota_by_account = HashMap::new();
    quota_by_account.insert("eng".to_string(), eng_quota.clone());

    annotate_quota(&mut tree, &quota_by_account);

    assert_eq!(tree.aggregate_quota, AccountQuota::default());
    assert_eq!(tree.children[0].aggregate_quota, eng_quota);
    assert_eq!(
        tree.children[0].children[0].aggregate_quota,
        AccountQuota::default()
    );
}

#[test]
fn usage_attaches_verbatim_and_misses_stay_default() {
    let mut tree = org_tree();

    let mut ml_usage = AccountUsage {
        account: "eng-ml".to_string(),
        user_count: 1,
        active_users: vec!["carol".to_string()],
        ..AccountUsage::default()
    };
    ml_usage.tres_usage.insert("cpu".to_string(), 40.5);

    let mut usage_by_account = HashMap::new();
    usage_by_account.insert("eng-ml".to_string(), ml_usage.clone());

    annotate_usage(&mut tree, &usage_by_account);

    assert_eq!(tree.aggregate_usage, AccountUsage::default());
    assert_eq!(tree.children[0].children[0].aggregate_usage, ml_usage);
}

#[test]
fn decoration_never_touches_structure() {
    let mut tree = org_tree();
    let before_paths: Vec<_> = vec![
        tree.path.clone(),
        tree.children[0].path.clone(),
        tree.children[0].children[0].path.clone(),
    ];

    annotate_user_counts(&mut tree, &HashMap::new());
    annotate_quota(&mut tree, &HashMap::new());
    annotate_usage(&mut tree, &HashMap::new());

    assert_eq!(tree.total_sub_accounts, 2);
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].children.len(), 1);
    assert_eq!(
        before_paths,
        vec![
            tree.path.clone(),
            tree.children[0].path.clone(),
            tree.children[0].children[0].path.clone(),
        ]
    );
}

#[test]
fn group_by_account_preserves_per_account_rows() {
    let grouped = group_by_account(vec![
        AssociationRecord::new("alice", "eng"),
        AssociationRecord::new("bob", "ops"),
        AssociationRecord::new("alice", "ops"),
    ]);

    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped["eng"].len(), 1);
    assert_eq!(grouped["ops"].len(), 2);
}
