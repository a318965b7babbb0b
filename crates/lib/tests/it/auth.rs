//! Authorization scopes, device users and grants.

use std::fs;

use authdir::auth::DeviceUser;

use crate::helpers::*;

#[test]
fn grant_and_resolve_round_trip() {
    let (dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();
    store.users().add("bob", None, false).unwrap();
    let mut admins = store.groups().add("admins", false).unwrap();
    admins.add_member("bob", false).unwrap();

    let scope = store.auth().always();
    let mut root = scope.add("root", false).unwrap();
    root.authorize_user("alice", false).unwrap();
    root.authorize_group("admins", false).unwrap();

    assert!(root.authorized_user_names().contains("alice"));
    assert!(root.authorized_group_names().contains("admins"));

    let users: Vec<String> = root
        .iter_authorized_users(false)
        .unwrap()
        .iter()
        .map(|u| u.name().to_string())
        .collect();
    assert_eq!(users, ["alice"]);
    let groups: Vec<String> = root
        .iter_authorized_groups(false)
        .unwrap()
        .iter()
        .map(|g| g.name().to_string())
        .collect();
    assert_eq!(groups, ["admins"]);

    let doc = read_json(&dir.path().join("authorized-always.json"));
    assert_eq!(
        doc["device-users"]["root"]["ssh-users"],
        serde_json::json!(["alice"])
    );
    assert_eq!(
        doc["device-users"]["root"]["ssh-groups"],
        serde_json::json!(["admins"])
    );
}

#[test]
fn grants_must_reference_existing_records() {
    let (_dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();

    let scope = store.auth().always();
    let mut root = scope.add("root", false).unwrap();

    let err = root.authorize_user("ghost", false).unwrap_err();
    assert!(err.is_invalid_ref());
    // force does not bypass the referential check.
    let err = root.authorize_user("ghost", true).unwrap_err();
    assert!(err.is_invalid_ref());

    let err = root.authorize_group("ghosts", false).unwrap_err();
    assert!(err.is_invalid_ref());
    assert_eq!(
        err.to_string(),
        "Failed to authorize group 'ghosts' to device user 'root': group does not exist"
    );
}

#[test]
fn duplicate_grants_and_missing_revocations_respect_force() {
    let (_dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();

    let scope = store.auth().always();
    let mut root = scope.add("root", false).unwrap();
    root.authorize_user("alice", false).unwrap();

    let err = root.authorize_user("alice", false).unwrap_err();
    assert!(err.is_duplicate());
    root.authorize_user("alice", true).unwrap();

    let err = root.deauthorize_user("bob", false).unwrap_err();
    assert!(err.is_not_found());
    root.deauthorize_user("bob", true).unwrap();

    root.deauthorize_user("alice", false).unwrap();
    assert!(root.authorized_user_names().is_empty());
}

#[test]
fn dangling_grant_surfaces_at_resolution_only() {
    let (_dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();

    let scope = store.auth().always();
    let mut root = scope.add("root", false).unwrap();
    root.authorize_user("alice", false).unwrap();

    store.users().remove("alice", false).unwrap();
    let root = scope.get("root").unwrap();
    assert!(root.authorized_user_names().contains("alice"));

    let err = root.iter_authorized_users(false).unwrap_err();
    assert!(err.is_invalid_ref());
    assert_eq!(
        err.to_string(),
        "Device user 'root' authorized user 'alice' does not correspond to a valid user"
    );

    assert!(root.iter_authorized_users(true).unwrap().is_empty());
}

#[test]
fn match_all_sentinel_round_trip() {
    let (dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();

    let scope = store.auth().always();
    scope.add("root", false).unwrap();
    assert!(scope.get_all().unwrap().is_none());

    let mut all = scope.ensure_all().unwrap();
    assert!(all.is_match_all());
    assert_eq!(all.name(), DeviceUser::MATCH_ALL_ID);
    assert_eq!(all.display_name(), "[ALL]");

    all.authorize_user("alice", false).unwrap();
    let all = scope.get_all().unwrap().unwrap();
    assert!(all.authorized_user_names().contains("alice"));

    // ensure_all on a present sentinel hands back that record, grants intact.
    let again = scope.ensure_all().unwrap();
    assert!(again.authorized_user_names().contains("alice"));
    assert_eq!(scope.names().unwrap(), ["root", ""]);

    let doc = read_json(&dir.path().join("authorized-always.json"));
    assert_eq!(doc["device-users"][""]["ssh-users"], serde_json::json!(["alice"]));
}

#[test]
fn get_all_propagates_missing_document() {
    let (_dir, store) = temp_store();

    let err = store.auth().always().get_all().unwrap_err();
    assert!(err.is_missing_file());
}

#[test]
fn scopes_enumerate_documents_on_disk() {
    let (dir, store) = temp_store();
    let auth = store.auth();

    assert!(auth.state_names().unwrap().is_empty());
    assert!(auth.scopes().unwrap().is_empty());

    auth.on("rescue").add("root", false).unwrap();
    auth.on("install").add("root", false).unwrap();
    auth.always().add("root", false).unwrap();
    // Non-matching entries in the states directory are ignored.
    write_file(&dir.path().join("authorized-on/README.md"), "notes");
    fs::create_dir(dir.path().join("authorized-on/stale.json")).unwrap();

    let states: Vec<String> = auth.state_names().unwrap().into_iter().collect();
    assert_eq!(states, ["install", "rescue"]);

    let scopes = auth.scopes().unwrap();
    let labels: Vec<&str> = scopes.iter().map(|s| s.label()).collect();
    assert_eq!(
        labels,
        [
            "authorized-always",
            "authorized-on-install",
            "authorized-on-rescue"
        ]
    );
    assert_eq!(scopes[0].state_name(), None);
    assert_eq!(scopes[0].display_state_name(), "[AUTH-ALWAYS]");
    assert_eq!(scopes[1].state_name(), Some("install"));
    assert_eq!(scopes[1].display_state_name(), "install");
}

#[test]
fn state_scopes_keep_isolated_documents() {
    let (_dir, store) = temp_store();
    let auth = store.auth();

    auth.on("install").add("installer", false).unwrap();
    auth.always().add("root", false).unwrap();

    assert_eq!(auth.on("install").names().unwrap(), ["installer"]);
    assert_eq!(auth.always().names().unwrap(), ["root"]);
    assert!(!auth.on("install").contains("root").unwrap());
}

#[test]
fn remove_returns_snapshot() {
    let (_dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();

    let scope = store.auth().always();
    let mut root = scope.add("root", false).unwrap();
    root.authorize_user("alice", false).unwrap();

    let removed = scope.remove("root").unwrap();
    assert_eq!(removed.name(), "root");
    assert!(removed.authorized_user_names().contains("alice"));
    assert!(!scope.contains("root").unwrap());
}

#[test]
fn strict_policy_requires_existing_document() {
    let (_dir, store) = strict_store();

    let err = store.auth().always().add("root", false).unwrap_err();
    assert!(err.is_missing_file());

    store.auth().always().ensure("root").unwrap();
    assert!(store.auth().always().contains("root").unwrap());
}
