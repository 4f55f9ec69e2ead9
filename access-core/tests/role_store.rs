use access_core::models::{RoleInput, RoleUpdate};
use access_core::orm::testing::{setup_test_store, setup_test_store_with};
use access_core::{Error, NameMatching, RoleAssignments, RoleStore, UserDirectory};

#[test]
fn test_create_then_find_by_name_returns_same_role() {
    let roles = RoleStore::new(setup_test_store());

    let created = roles
        .create_role(RoleInput::new("Administrator").with_description("Full access"))
        .expect("role should be created");
    let found = roles.find_by_name("Administrator").expect("role should be found");

    assert_eq!(found, created);
    assert_eq!(found.role_description.as_deref(), Some("Full access"));
    assert!(found.is_active);
}

#[test]
fn test_duplicate_role_name_is_rejected() {
    let roles = RoleStore::new(setup_test_store());

    roles.create_role(RoleInput::new("Administrator")).expect("first create succeeds");
    let second = roles.create_role(RoleInput::new("Administrator"));

    match second {
        Err(Error::UniqueConstraintViolation { constraint, value }) => {
            assert_eq!(constraint, "uq_roles_name");
            assert_eq!(value, "Administrator");
        }
        other => panic!("expected UniqueConstraintViolation, got {:?}", other),
    }
    assert_eq!(roles.list_roles().unwrap().len(), 1);
}

#[test]
fn test_role_names_are_case_sensitive_by_default() {
    let roles = RoleStore::new(setup_test_store());

    roles.create_role(RoleInput::new("Administrator")).unwrap();
    roles.create_role(RoleInput::new("administrator")).expect("different case is a different name");

    assert!(matches!(roles.find_by_name("ADMINISTRATOR"), Err(Error::NotFound { .. })));
}

#[test]
fn test_case_insensitive_policy_rejects_case_variants() {
    let roles = RoleStore::new(setup_test_store_with(NameMatching::CaseInsensitive));

    let created = roles.create_role(RoleInput::new("Administrator")).unwrap();
    let clash = roles.create_role(RoleInput::new("administrator"));
    assert!(matches!(clash, Err(Error::UniqueConstraintViolation { .. })));

    assert_eq!(roles.find_by_name("ADMINISTRATOR").unwrap(), created);
}

#[test]
fn test_create_role_validation() {
    let roles = RoleStore::new(setup_test_store());

    assert!(matches!(roles.create_role(RoleInput::new("")), Err(Error::Validation(_))));
    assert!(matches!(
        roles.create_role(RoleInput::new("n".repeat(51))),
        Err(Error::Validation(_))
    ));
    roles
        .create_role(RoleInput::new("n".repeat(50)))
        .expect("a 50 character name is allowed");
}

#[test]
fn test_find_by_name_unknown() {
    let roles = RoleStore::new(setup_test_store());
    assert!(matches!(roles.find_by_name("ghost"), Err(Error::NotFound { entity: "role", .. })));
}

#[test]
fn test_deactivate_role_keeps_assignments() {
    let store = setup_test_store();
    let roles = RoleStore::new(store.clone());
    let users = UserDirectory::new(store.clone());
    let assignments = RoleAssignments::new(store);

    let role = roles.create_role(RoleInput::new("Operator")).unwrap();
    let alice = users.create_user("alice@example.com").unwrap();
    let bob = users.create_user("bob@example.com").unwrap();
    assignments.assign_role(alice.id, role.role_id).unwrap();
    assignments.assign_role(bob.id, role.role_id).unwrap();

    let deactivated = roles.deactivate_role(role.role_id).unwrap();
    assert!(!deactivated.is_active);
    assert_eq!(deactivated.role_id, role.role_id);
    assert!(deactivated.updated_at >= role.updated_at);

    // still there, still assigned
    assert_eq!(roles.get_role(role.role_id).unwrap(), deactivated);
    assert_eq!(roles.count_assignments(role.role_id).unwrap(), 2);
    assert!(assignments.user_has_role(alice.id, "Operator").unwrap());

    // but no new assignments
    let carol = users.create_user("carol@example.com").unwrap();
    assert!(matches!(
        assignments.assign_role(carol.id, role.role_id),
        Err(Error::Validation(_))
    ));

    let reactivated = roles.activate_role(role.role_id).unwrap();
    assert!(reactivated.is_active);
    assignments.assign_role(carol.id, role.role_id).unwrap();
}

#[test]
fn test_deactivate_unknown_role() {
    let roles = RoleStore::new(setup_test_store());
    assert!(matches!(roles.deactivate_role(404), Err(Error::NotFound { .. })));
}

#[test]
fn test_delete_unassigned_role() {
    let roles = RoleStore::new(setup_test_store());
    let role = roles.create_role(RoleInput::new("Temporary")).unwrap();

    roles.delete_role(role.role_id).unwrap();

    assert!(matches!(roles.get_role(role.role_id), Err(Error::NotFound { .. })));
    assert!(matches!(roles.delete_role(role.role_id), Err(Error::NotFound { .. })));
}

#[test]
fn test_update_role_is_full_record_replacement() {
    let roles = RoleStore::new(setup_test_store());
    let role = roles
        .create_role(RoleInput::new("Support").with_description("Tier 1"))
        .unwrap();

    let updated = roles
        .update_role(
            role.role_id,
            RoleUpdate { role_name: "Support Lead".to_string(), role_description: None, is_active: false },
        )
        .unwrap();

    assert_eq!(updated.role_id, role.role_id);
    assert_eq!(updated.role_name, "Support Lead");
    assert_eq!(updated.role_description, None);
    assert!(!updated.is_active);
    assert_eq!(updated.created_at, role.created_at);
    assert!(matches!(roles.find_by_name("Support"), Err(Error::NotFound { .. })));
}

#[test]
fn test_update_role_last_write_wins() {
    let roles = RoleStore::new(setup_test_store());
    let role = roles.create_role(RoleInput::new("Shared")).unwrap();

    let mut first = RoleUpdate::from(&role);
    first.role_description = Some("first writer".to_string());
    let mut second = RoleUpdate::from(&role);
    second.role_description = Some("second writer".to_string());

    roles.update_role(role.role_id, first).unwrap();
    roles.update_role(role.role_id, second).unwrap();

    let stored = roles.get_role(role.role_id).unwrap();
    assert_eq!(stored.role_description.as_deref(), Some("second writer"));
}
