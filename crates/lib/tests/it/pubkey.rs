//! Layered key file resolution against a real store.

use authdir::pubkey::Pubkey;

use crate::helpers::*;

#[test]
fn builtin_lookup_selects_store_key() {
    let (dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();
    write_file(&dir.path().join("public-keys/alice.pub"), KEY_A);

    let alice = store.users().get("alice").unwrap();
    assert_eq!(
        alice.pubkeys().selected_filename().unwrap(),
        dir.path().join("public-keys/alice.pub")
    );
    assert_eq!(alice.pubkey().unwrap().first_line(), KEY_A);
}

#[test]
fn store_defaults_replace_builtin_layer() {
    let (dir, store) = temp_store();
    write_file(
        &dir.path().join("users.json"),
        r#"{
  "ssh-user-defaults": {"pubkey-file-search-path": ["./keys"]},
  "ssh-users": {"alice": {}}
}"#,
    );
    write_file(&dir.path().join("keys/alice.pub"), KEY_A);
    // A key at the built-in location must not shadow the override.
    write_file(&dir.path().join("public-keys/alice.pub"), KEY_B);

    let alice = store.users().get("alice").unwrap();
    assert_eq!(
        alice.pubkeys().selected_filename().unwrap(),
        dir.path().join("keys/alice.pub")
    );
    assert_eq!(alice.pubkey().unwrap().first_line(), KEY_A);
}

#[test]
fn user_search_path_replaces_store_defaults() {
    let (dir, store) = temp_store();
    write_file(
        &dir.path().join("users.json"),
        r#"{
  "ssh-user-defaults": {"pubkey-file-search-path": ["./keys"]},
  "ssh-users": {"alice": {"pubkey-file-search-path": ["./mine"]}}
}"#,
    );
    // Present only in the layer the user record replaced.
    write_file(&dir.path().join("keys/alice.pub"), KEY_A);

    let alice = store.users().get("alice").unwrap();
    let err = alice.pubkeys().selected().unwrap_err();
    assert!(err.is_not_found());
    let msg = err.to_string();
    assert!(msg.contains("/mine"));
    assert!(!msg.contains("/keys"));
}

#[test]
fn explicit_file_short_circuits_search() {
    let (dir, store) = temp_store();
    write_file(
        &dir.path().join("users.json"),
        r#"{"ssh-users": {"alice": {"pubkey-file": "./special/alice-key.pub"}}}"#,
    );
    write_file(&dir.path().join("public-keys/alice.pub"), KEY_A);

    let alice = store.users().get("alice").unwrap();
    // No readability probe on the pinned path.
    assert_eq!(
        alice.pubkeys().selected_filename().unwrap(),
        dir.path().join("special/alice-key.pub")
    );
    let err = alice.pubkeys().selected().unwrap_err();
    assert!(err.is_file_access());

    write_file(&dir.path().join("special/alice-key.pub"), KEY_B);
    assert_eq!(alice.pubkey().unwrap().first_line(), KEY_B);
}

#[test]
fn two_user_templates_make_default_unreachable() {
    let (dir, store) = temp_store();
    write_file(
        &dir.path().join("users.json"),
        r#"{"ssh-users": {"alice": {"pubkey-file-template": ["a.pub", "b.pub"]}}}"#,
    );

    let alice = store.users().get("alice").unwrap();
    let err = alice.pubkeys().default_filename().unwrap_err();
    assert!(err.is_unreachable());
    let msg = err.to_string();
    assert!(msg.contains("not reachable"));
    assert!(msg.contains("'a.pub', 'b.pub'"));
}

#[test]
fn single_user_template_steers_write_location() {
    let (dir, store) = temp_store();
    write_file(
        &dir.path().join("users.json"),
        r#"{"ssh-users": {"alice": {"pubkey-file-template": ["${ssh-user.name}.key"]}}}"#,
    );

    let alice = store.users().get("alice").unwrap();
    assert_eq!(
        alice.pubkeys().default_filename().unwrap(),
        dir.path().join("public-keys/alice.key")
    );

    alice.set_pubkey_default(&Pubkey::new(KEY_A)).unwrap();
    assert_eq!(alice.pubkey().unwrap().first_line(), KEY_A);
}

#[test]
fn store_default_template_steers_write_location() {
    let (dir, store) = temp_store();
    write_file(
        &dir.path().join("users.json"),
        r#"{
  "ssh-user-defaults": {"pubkey-file-template": ["${ssh-user.name}.key"]},
  "ssh-users": {"bob": {}}
}"#,
    );

    let bob = store.users().get("bob").unwrap();
    assert_eq!(
        bob.pubkeys().default_filename().unwrap(),
        dir.path().join("public-keys/bob.key")
    );

    bob.set_pubkey_default(&Pubkey::new(KEY_A)).unwrap();
    assert!(dir.path().join("public-keys/bob.key").exists());
    assert_eq!(bob.pubkey().unwrap().first_line(), KEY_A);
}

#[test]
fn set_default_then_selected_round_trip() {
    let (dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();

    let alice = store.users().get("alice").unwrap();
    alice.set_pubkey_default(&Pubkey::new(KEY_A)).unwrap();

    assert!(dir.path().join("public-keys/alice.pub").exists());
    assert_eq!(alice.pubkey().unwrap().first_line(), KEY_A);
    assert_eq!(alice.pubkey_default().unwrap().first_line(), KEY_A);
}

#[test]
fn all_keys_follow_candidate_order() {
    let (dir, store) = temp_store();
    write_file(
        &dir.path().join("users.json"),
        r#"{
  "ssh-user-defaults": {
    "pubkey-file-template": ["${ssh-user.name}.pub", "${ssh-user.name}.key"]
  },
  "ssh-users": {"alice": {}}
}"#,
    );
    write_file(&dir.path().join("public-keys/alice.pub"), KEY_A);
    write_file(&dir.path().join("public-keys/alice.key"), KEY_B);

    let pubkeys = store.users().get("alice").unwrap().pubkeys();
    assert_eq!(pubkeys.filenames().len(), 2);
    let lines: Vec<String> = pubkeys
        .all()
        .unwrap()
        .iter()
        .map(|k| k.first_line().to_string())
        .collect();
    assert_eq!(lines, [KEY_A, KEY_B]);
}
