use clustershare_core::{
    validate_tres, AccountRecord, AccountValidationError, AssociationRecord, TresMap,
    DELETED_FLAG,
};

#[test]
fn validate_accepts_well_formed_record() {
    let mut account = AccountRecord::new("eng-ml", "eng");
    account.description = "ML research".to_string();
    account.organization = "engineering".to_string();
    account.coordinators = vec!["alice".to_string(), "bob".to_string()];

    account.validate().unwrap();
}

#[test]
fn validate_rejects_blank_name() {
    let account = AccountRecord::new("", "");
    assert_eq!(
        account.validate().unwrap_err(),
        AccountValidationError::EmptyName
    );

    let whitespace = AccountRecord::new("   ", "");
    assert_eq!(
        whitespace.validate().unwrap_err(),
        AccountValidationError::EmptyName
    );
}

#[test]
fn validate_rejects_bad_charset() {
    for name in ["Eng", "eng team", "eng/ml", "-eng"] {
        let account = AccountRecord::new(name, "");
        assert!(
            matches!(
                account.validate().unwrap_err(),
                AccountValidationError::InvalidName(_)
            ),
            "expected `{name}` to be rejected"
        );
    }
}

#[test]
fn validate_rejects_self_parent() {
    let account = AccountRecord::new("eng", "eng");
    assert!(matches!(
        account.validate().unwrap_err(),
        AccountValidationError::SelfParent(name) if name == "eng"
    ));
}

#[test]
fn root_and_deleted_helpers_read_fields() {
    let root = AccountRecord::new("root", "");
    assert!(root.is_root());
    assert!(!root.is_deleted());

    let mut tombstone = AccountRecord::new("old-project", "root");
    tombstone.flags = vec!["FAIRSHARE".to_string(), DELETED_FLAG.to_string()];
    assert!(!tombstone.is_root());
    assert!(tombstone.is_deleted());
    assert!(tombstone.has_flag("FAIRSHARE"));
    assert!(!tombstone.has_flag("NOJOBS"));
}

#[test]
fn account_serde_round_trip_uses_parent_field_name() {
    let mut account = AccountRecord::new("eng", "root");
    account.organization = "engineering".to_string();
    account.coordinators = vec!["alice".to_string()];

    let json = serde_json::to_value(&account).unwrap();
    assert_eq!(json["parent"], "root");
    assert_eq!(json["name"], "eng");

    let decoded: AccountRecord = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, account);
}

#[test]
fn association_has_user_skips_account_level_rows() {
    let account_level = AssociationRecord::new("", "eng");
    assert!(!account_level.has_user());

    let mut bound = AssociationRecord::new("alice", "eng");
    bound.cluster = Some("main".to_string());
    bound.is_default = true;
    assert!(bound.has_user());
}

#[test]
fn quota_validation_covers_every_contained_map() {
    let mut quota = clustershare_core::AccountQuota::default();
    quota.grp_tres.insert("cpu".to_string(), 512);
    quota.max_tres_used.insert("mem".to_string(), 2048);
    quota.validate().unwrap();

    quota.max_tres_used.insert("mem".to_string(), -7);
    let err = quota.validate().unwrap_err();
    assert_eq!(err.resource, "mem");
}

#[test]
fn validate_tres_rejects_negative_amounts() {
    let mut tres = TresMap::new();
    tres.insert("cpu".to_string(), 64);
    tres.insert("mem".to_string(), 1024);
    validate_tres(&tres).unwrap();

    tres.insert("billing".to_string(), -1);
    let err = validate_tres(&tres).unwrap_err();
    assert_eq!(err.resource, "billing");
    assert_eq!(err.amount, -1);
}
