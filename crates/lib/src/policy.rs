//! Store-wide behavior knobs.

use std::path::PathBuf;

use crate::content::FileFormat;
use crate::pubkey::{PubkeyLookup, USER_NAME_TEMPLATE_VAR};

/// Built-in pubkey lookup defaults, the bottom layer of the lookup merge.
///
/// Also supplies the fallback write location when a user record does not
/// pin one down itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubkeyPolicy {
    /// File name template for key files.
    pub file_template: String,
    /// Directory holding key files, resolved against the store root when
    /// relative.
    pub search_dir: PathBuf,
}

impl Default for PubkeyPolicy {
    fn default() -> Self {
        Self {
            file_template: format!("{USER_NAME_TEMPLATE_VAR}.pub"),
            search_dir: PathBuf::from("./public-keys"),
        }
    }
}

impl PubkeyPolicy {
    /// The policy expressed as a fully-defined lookup layer.
    pub fn lookup(&self) -> PubkeyLookup {
        PubkeyLookup {
            templates: Some(vec![self.file_template.clone()]),
            search_path: Some(vec![self.search_dir.clone()]),
            file: None,
        }
    }
}

/// Behavior knobs shared by every repository of a store.
#[derive(Debug, Clone)]
pub struct StorePolicy {
    /// Encoding used for every document of the store.
    pub file_format: FileFormat,
    /// Whether a missing users document may be treated as empty by a
    /// create-flavored mutation.
    pub silent_create_users: bool,
    /// Same as `silent_create_users`, for the groups document.
    pub silent_create_groups: bool,
    /// Same as `silent_create_users`, for device users documents.
    pub silent_create_auth: bool,
    /// Built-in pubkey lookup defaults.
    pub pubkey: PubkeyPolicy,
}

impl Default for StorePolicy {
    /// The permissive default: JSON documents, silent creation everywhere.
    fn default() -> Self {
        Self {
            file_format: FileFormat::Json,
            silent_create_users: true,
            silent_create_groups: true,
            silent_create_auth: true,
            pubkey: PubkeyPolicy::default(),
        }
    }
}
