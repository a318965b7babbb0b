//! Key file operations scoped to one user.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::policy::PubkeyPolicy;
use crate::pubkey::{Pubkey, PubkeyError, PubkeysDb, file_access_err};

use super::types::{RawUser, RawUserDefaults};

/// Key files of one user, resolved through the merged lookup.
///
/// Cheap to build; every call probes the filesystem afresh.
#[derive(Debug, Clone)]
pub struct UserPubkeys {
    db: PubkeysDb,
}

impl UserPubkeys {
    pub(crate) fn new(
        root: &Path,
        raw: &RawUser,
        defaults: Option<&RawUserDefaults>,
        policy: &PubkeyPolicy,
    ) -> Self {
        let defaults_lookup = defaults.map(RawUserDefaults::lookup);
        Self {
            db: PubkeysDb::new(
                root,
                &raw.name,
                raw.lookup(),
                defaults_lookup.as_ref(),
                policy,
            ),
        }
    }

    /// Candidate key files that exist on disk right now.
    ///
    /// A record's exact `file` entry is not part of the candidate grid and
    /// never shows up here.
    pub fn filenames(&self) -> Vec<PathBuf> {
        self.db
            .candidate_filenames()
            .filter(|f| f.exists())
            .collect()
    }

    /// Path of the key a read would use. See [`PubkeysDb::selected_filename`].
    pub fn selected_filename(&self) -> Result<PathBuf, PubkeyError> {
        self.db.selected_filename()
    }

    /// Path a key write would use. See [`PubkeysDb::default_filename`].
    pub fn default_filename(&self) -> Result<PathBuf, PubkeyError> {
        self.db.default_filename()
    }

    /// Load the key a read would use.
    pub fn selected(&self) -> Result<Pubkey, PubkeyError> {
        Pubkey::load(&self.selected_filename()?)
    }

    /// Load the key at the write location.
    pub fn default(&self) -> Result<Pubkey, PubkeyError> {
        Pubkey::load(&self.default_filename()?)
    }

    /// Write `pubkey` to the write location, creating its directory.
    pub fn set_default(&self, pubkey: &Pubkey) -> Result<(), PubkeyError> {
        let filename = self.default_filename()?;
        pubkey.dump(&filename, true)
    }

    /// Load every existing candidate key file.
    pub fn all(&self) -> Result<Vec<Pubkey>, PubkeyError> {
        self.filenames().iter().map(|f| Pubkey::load(f)).collect()
    }

    /// Delete every existing candidate key file.
    ///
    /// Emptied key directories are cleaned up opportunistically; directories
    /// still holding other entries stay.
    pub fn remove_all(&self) -> Result<(), PubkeyError> {
        for filename in self.filenames() {
            fs::remove_file(&filename).map_err(|source| file_access_err(&filename, source))?;
            debug!(file = %filename.display(), "Pubkey file removed");

            if let Some(parent) = filename.parent() {
                let _ = fs::remove_dir(parent);
            }
        }
        Ok(())
    }
}
