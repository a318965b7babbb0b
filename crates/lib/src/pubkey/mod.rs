//! Public key files and the lookup machinery locating them.
//!
//! Key text never lives inside store documents. User records carry a
//! [`PubkeyLookup`] describing where key files sit on disk, and a
//! [`PubkeysDb`] resolves the merged lookup into concrete paths.

use std::fs;
use std::path::Path;

mod db;
pub use db::PubkeysDb;

mod errors;
pub use errors::PubkeyError;
pub(crate) use errors::file_access_err;

mod lookup;
pub use lookup::{PubkeyLookup, USER_NAME_TEMPLATE_VAR};

use crate::content::write_atomic;

/// A public key, held as the verbatim text of its key file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pubkey {
    text: String,
}

impl Pubkey {
    /// Wrap raw key text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The full key text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The key line itself, without trailing newline or comment lines.
    pub fn first_line(&self) -> &str {
        self.text.lines().next().unwrap_or("")
    }

    /// Read a key file.
    ///
    /// # Errors
    /// `PubkeyError::FileAccess` when the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, PubkeyError> {
        let text = fs::read_to_string(path).map_err(|source| file_access_err(path, source))?;
        Ok(Self { text })
    }

    /// Write the key text to `path`, atomically, newline-terminated.
    ///
    /// # Errors
    /// `PubkeyError::FileAccess` when the file or its parent directory
    /// cannot be written.
    pub fn dump(&self, path: &Path, mk_parent_dirs: bool) -> Result<(), PubkeyError> {
        if mk_parent_dirs
            && let Some(parent) = path.parent()
        {
            fs::create_dir_all(parent).map_err(|source| file_access_err(parent, source))?;
        }

        let mut text = self.text.clone();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        write_atomic(path, text.as_bytes()).map_err(|source| file_access_err(path, source))
    }
}
