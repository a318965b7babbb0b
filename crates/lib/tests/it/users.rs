//! The users repository and its document.

use authdir::pubkey::Pubkey;

use crate::helpers::*;

#[test]
fn add_and_get_round_trip() {
    let (dir, store) = temp_store();
    let users = store.users();

    users.add("alice", Some(&Pubkey::new(KEY_A)), false).unwrap();

    assert!(users.contains("alice").unwrap());
    let alice = users.get("alice").unwrap();
    assert_eq!(alice.name(), "alice");
    assert_eq!(alice.pubkey().unwrap().first_line(), KEY_A);
    assert!(dir.path().join("public-keys/alice.pub").exists());
}

#[test]
fn names_and_iter_keep_document_order() {
    let (_dir, store) = temp_store();
    let users = store.users();
    users.add("zoe", None, false).unwrap();
    users.add("al", None, false).unwrap();

    assert_eq!(users.names().unwrap(), ["zoe", "al"]);
    let iterated: Vec<String> = users
        .iter()
        .unwrap()
        .iter()
        .map(|u| u.name().to_string())
        .collect();
    assert_eq!(iterated, ["zoe", "al"]);
}

#[test]
fn duplicate_add_refused_then_tolerated() {
    let (_dir, store) = temp_store();
    let users = store.users();
    users.add("alice", None, false).unwrap();

    let err = users.add("alice", None, false).unwrap_err();
    assert!(err.is_duplicate());

    // Tolerated add still installs the key for the existing record.
    users
        .add("alice", Some(&Pubkey::new(KEY_B)), true)
        .unwrap();
    assert_eq!(
        users
            .get("alice")
            .unwrap()
            .pubkey_default()
            .unwrap()
            .first_line(),
        KEY_B
    );
}

#[test]
fn silent_create_builds_document_on_demand() {
    let (_dir, store) = temp_store();

    let err = store.users().names().unwrap_err();
    assert!(err.is_missing_file());

    store.users().add("alice", None, false).unwrap();
    assert_eq!(store.users().names().unwrap(), ["alice"]);
}

#[test]
fn strict_policy_requires_existing_document() {
    let (_dir, store) = strict_store();

    let err = store.users().add("alice", None, false).unwrap_err();
    assert!(err.is_missing_file());

    // exist_ok opts back into creation regardless of policy.
    store.users().add("alice", None, true).unwrap();
    assert!(store.users().contains("alice").unwrap());
}

#[test]
fn get_absent_user_reports_not_found() {
    let (_dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();

    let err = store.users().get("ghost").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "No such user: 'ghost'");
}

#[test]
fn malformed_document_reports_format_error() {
    let (dir, store) = temp_store();
    write_file(&dir.path().join("users.json"), r#"{"ssh-users": []}"#);

    let err = store.users().names().unwrap_err();
    assert!(err.is_format());
}

#[test]
fn remove_deletes_record_and_key_files() {
    let (dir, store) = temp_store();
    store
        .users()
        .add("alice", Some(&Pubkey::new(KEY_A)), false)
        .unwrap();
    let keyfile = dir.path().join("public-keys/alice.pub");
    assert!(keyfile.exists());

    let removed = store.users().remove("alice", true).unwrap();
    assert_eq!(removed.name(), "alice");
    assert!(!keyfile.exists());
    // The emptied key directory is swept too.
    assert!(!dir.path().join("public-keys").exists());
    assert!(!store.users().contains("alice").unwrap());
}

#[test]
fn remove_keeps_key_files_when_asked() {
    let (dir, store) = temp_store();
    store
        .users()
        .add("alice", Some(&Pubkey::new(KEY_A)), false)
        .unwrap();

    store.users().remove("alice", false).unwrap();
    assert!(dir.path().join("public-keys/alice.pub").exists());
}

#[test]
fn scalar_defaults_normalize_to_lists_on_rewrite() {
    let (dir, store) = temp_store();
    write_file(
        &dir.path().join("users.json"),
        r#"{
  "ssh-user-defaults": {"pubkey-file-template": "${ssh-user.name}.key"},
  "ssh-users": {}
}"#,
    );

    store.users().add("alice", None, false).unwrap();

    let doc = read_json(&dir.path().join("users.json"));
    assert_eq!(
        doc["ssh-user-defaults"]["pubkey-file-template"],
        serde_json::json!(["${ssh-user.name}.key"])
    );
}
