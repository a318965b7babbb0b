//! Store root handle, document round-trips and format selection.

use std::fs;

use authdir::pubkey::Pubkey;

use crate::helpers::*;

#[test]
fn open_resolves_default_document_paths() {
    let (dir, store) = temp_store();

    assert_eq!(store.users().path(), dir.path().join("users.json"));
    assert_eq!(store.groups().path(), dir.path().join("groups.json"));
    assert_eq!(
        store.auth().always().path(),
        dir.path().join("authorized-always.json")
    );
    assert_eq!(
        store.auth().on("install").path(),
        dir.path().join("authorized-on/install.json")
    );
    assert_eq!(store.root(), dir.path());
}

#[test]
fn unknown_content_survives_rewrites() {
    let (dir, store) = temp_store();
    write_file(
        &dir.path().join("users.json"),
        r#"{
  "comment": "managed by hand",
  "ssh-users": {
    "alice": {"note": "first", "pubkey-file-template": "${ssh-user.name}.pub"}
  },
  "trailing": 7
}"#,
    );

    store.users().add("bob", None, false).unwrap();

    let doc = read_json(&dir.path().join("users.json"));
    let top: Vec<&String> = doc.as_object().unwrap().keys().collect();
    assert_eq!(top, ["comment", "ssh-users", "trailing"]);
    assert_eq!(doc["comment"], "managed by hand");
    assert_eq!(doc["trailing"], 7);
    assert_eq!(doc["ssh-users"]["alice"]["note"], "first");
    assert_eq!(
        doc["ssh-users"]["alice"]["pubkey-file-template"],
        serde_json::json!(["${ssh-user.name}.pub"])
    );

    let users: Vec<&String> = doc["ssh-users"].as_object().unwrap().keys().collect();
    assert_eq!(users, ["alice", "bob"]);
}

#[test]
fn mutation_pair_restores_identical_bytes() {
    let (dir, store) = temp_store();
    store.users().add("alice", None, false).unwrap();
    store.users().add("bob", None, false).unwrap();
    let mut group = store.groups().add("admins", false).unwrap();
    group.add_member("alice", false).unwrap();

    let groups_file = dir.path().join("groups.json");
    let before = fs::read_to_string(&groups_file).unwrap();

    group.add_member("bob", false).unwrap();
    group.remove_member("bob", false).unwrap();

    assert_eq!(fs::read_to_string(&groups_file).unwrap(), before);
}

#[test]
fn yaml_store_persists_yaml_documents() {
    let (dir, store) = yaml_store();
    store
        .users()
        .add("alice", Some(&Pubkey::new(KEY_A)), false)
        .unwrap();

    let users_file = dir.path().join("users.yaml");
    assert!(users_file.exists());
    assert!(!dir.path().join("users.json").exists());

    let doc: serde_yaml::Value =
        serde_yaml::from_str(&fs::read_to_string(&users_file).unwrap()).unwrap();
    assert!(doc["ssh-users"]["alice"].is_mapping());

    assert_eq!(store.users().names().unwrap(), ["alice"]);
    assert_eq!(
        store
            .users()
            .get("alice")
            .unwrap()
            .pubkey()
            .unwrap()
            .first_line(),
        KEY_A
    );
}

#[test]
fn yaml_scopes_scan_only_yaml_documents() {
    let (dir, store) = yaml_store();
    store.auth().on("install").add("root", false).unwrap();
    // Wrong extension for this store's format.
    write_file(
        &dir.path().join("authorized-on/stray.json"),
        r#"{"device-users": {}}"#,
    );

    let states: Vec<String> = store.auth().state_names().unwrap().into_iter().collect();
    assert_eq!(states, ["install"]);
}
