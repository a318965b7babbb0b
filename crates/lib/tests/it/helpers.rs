use std::fs;
use std::path::Path;

use authdir::AuthDir;
use authdir::content::FileFormat;
use authdir::layout::StoreLayout;
use authdir::policy::StorePolicy;
use tempfile::TempDir;

// ==========================
// STORE FACTORIES
// ==========================

/// Creates a disposable store rooted in a fresh temp directory, default
/// policy (JSON documents, silent creation on).
pub fn temp_store() -> (TempDir, AuthDir) {
    let dir = TempDir::new().unwrap();
    let store = AuthDir::open(dir.path());
    (dir, store)
}

/// Creates a store whose policy refuses to treat missing documents as
/// empty.
pub fn strict_store() -> (TempDir, AuthDir) {
    let dir = TempDir::new().unwrap();
    let policy = StorePolicy {
        silent_create_users: false,
        silent_create_groups: false,
        silent_create_auth: false,
        ..StorePolicy::default()
    };
    let store = AuthDir::with_policy(dir.path(), StoreLayout::default(), policy);
    (dir, store)
}

/// Creates a store persisting YAML documents instead of JSON.
pub fn yaml_store() -> (TempDir, AuthDir) {
    let dir = TempDir::new().unwrap();
    let policy = StorePolicy {
        file_format: FileFormat::Yaml,
        ..StorePolicy::default()
    };
    let store = AuthDir::with_policy(dir.path(), StoreLayout::default(), policy);
    (dir, store)
}

// ==========================
// FILE HELPERS
// ==========================

/// Writes `text` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, text: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

/// Parses a JSON document back from disk for on-disk assertions.
pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Structurally valid public key lines for seeding stores.
pub const KEY_A: &str =
    "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIIwmweUzf3hl23xfB2SGp9YAmKBcMzvGidgQIF9Nw9tN alice@example";
pub const KEY_B: &str =
    "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIDhN9YQr4mS0sJfFfcmXThPyAKeyQv51Zj9cLmWYo2pE bob@example";
