//! The groups repository and member resolution.

use crate::helpers::*;

#[test]
fn add_members_and_resolve_round_trip() {
    let (dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();
    store.users().add("bob", None, false).unwrap();

    let mut admins = store.groups().add("admins", false).unwrap();
    admins.add_member("bob", false).unwrap();
    admins.add_member("alice", false).unwrap();

    let members: Vec<&String> = admins.member_names().iter().collect();
    assert_eq!(members, ["alice", "bob"]);

    // Members land sorted on disk no matter the insertion order.
    let doc = read_json(&dir.path().join("groups.json"));
    assert_eq!(
        doc["ssh-groups"]["admins"]["members"],
        serde_json::json!(["alice", "bob"])
    );

    let resolved: Vec<String> = admins
        .iter_members(false)
        .unwrap()
        .iter()
        .map(|u| u.name().to_string())
        .collect();
    assert_eq!(resolved, ["alice", "bob"]);
}

#[test]
fn member_must_reference_existing_user() {
    let (_dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();
    let mut admins = store.groups().add("admins", false).unwrap();

    let err = admins.add_member("ghost", false).unwrap_err();
    assert!(err.is_invalid_ref());

    // force does not bypass the referential check.
    let err = admins.add_member("ghost", true).unwrap_err();
    assert!(err.is_invalid_ref());
}

#[test]
fn duplicate_member_respects_force() {
    let (_dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();
    let mut admins = store.groups().add("admins", false).unwrap();
    admins.add_member("alice", false).unwrap();

    let err = admins.add_member("alice", false).unwrap_err();
    assert!(err.is_duplicate());

    admins.add_member("alice", true).unwrap();
    assert_eq!(admins.member_names().len(), 1);
}

#[test]
fn missing_member_removal_respects_force() {
    let (_dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();
    let mut admins = store.groups().add("admins", false).unwrap();
    admins.add_member("alice", false).unwrap();

    let err = admins.remove_member("ghost", false).unwrap_err();
    assert!(err.is_not_found());

    admins.remove_member("ghost", true).unwrap();
    assert_eq!(admins.member_names().len(), 1);
}

#[test]
fn removing_a_member_twice_fails_the_second_time() {
    let (_dir, store) = temp_store();
    store.users().add("a", None, false).unwrap();
    let mut team = store.groups().add("team", false).unwrap();
    team.add_member("a", false).unwrap();

    team.remove_member("a", false).unwrap();
    let err = team.remove_member("a", false).unwrap_err();
    assert!(err.is_not_found());
    assert!(store.groups().get("team").unwrap().member_names().is_empty());
}

#[test]
fn dangling_member_surfaces_at_resolution_only() {
    let (_dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();
    let mut admins = store.groups().add("admins", false).unwrap();
    admins.add_member("alice", false).unwrap();

    // Removing the user leaves the membership record untouched.
    store.users().remove("alice", false).unwrap();
    let admins = store.groups().get("admins").unwrap();
    assert!(admins.member_names().contains("alice"));

    let err = admins.iter_members(false).unwrap_err();
    assert!(err.is_invalid_ref());
    assert_eq!(
        err.to_string(),
        "Group 'admins' member 'alice' does not correspond to a valid user"
    );

    assert!(admins.iter_members(true).unwrap().is_empty());
}

#[test]
fn ensure_is_get_or_create() {
    let (_dir, store) = temp_store();

    store.groups().ensure("ops").unwrap();
    store.groups().ensure("ops").unwrap();

    assert_eq!(store.groups().names().unwrap(), ["ops"]);
}

#[test]
fn remove_returns_snapshot() {
    let (_dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();
    let mut admins = store.groups().add("admins", false).unwrap();
    admins.add_member("alice", false).unwrap();

    let removed = store.groups().remove("admins").unwrap();
    assert_eq!(removed.name(), "admins");
    assert!(removed.member_names().contains("alice"));
    assert!(!store.groups().contains("admins").unwrap());
}

#[test]
fn stale_handle_mutation_reports_missing_group() {
    let (_dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();
    let mut admins = store.groups().add("admins", false).unwrap();

    store.groups().remove("admins").unwrap();

    // The record vanished underneath the handle.
    let err = admins.add_member("alice", false).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn strict_policy_requires_existing_document() {
    let (_dir, store) = strict_store();

    let err = store.groups().add("admins", false).unwrap_err();
    assert!(err.is_missing_file());

    store.groups().ensure("admins").unwrap();
    assert!(store.groups().contains("admins").unwrap());
}
