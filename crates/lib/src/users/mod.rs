//! The users repository: user records and their key files.
//!
//! Every accessor loads the users document afresh; every mutation loads,
//! rewrites one record, and persists the whole document back.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::layout::StoreLayout;
use crate::policy::{PubkeyPolicy, StorePolicy};
use crate::pubkey::{Pubkey, PubkeyError};

mod errors;
pub use errors::UsersError;

mod types;
pub use types::{RawUser, RawUserDefaults, RawUsers};

mod file;
pub(crate) use file::UsersFile;

mod pubkeys;
pub use pubkeys::UserPubkeys;

/// Repository of user records backed by one users document.
#[derive(Debug, Clone)]
pub struct UsersRepo {
    root: PathBuf,
    file: UsersFile,
    policy: StorePolicy,
}

impl UsersRepo {
    pub(crate) fn new(root: &Path, layout: &StoreLayout, policy: &StorePolicy) -> Self {
        Self {
            root: root.to_path_buf(),
            file: UsersFile::new(root, layout, policy),
            policy: policy.clone(),
        }
    }

    /// Path of the backing users document.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// User ids in document order.
    ///
    /// # Errors
    /// `UsersError::FileAccess` or `UsersError::Format` when the document
    /// cannot be loaded.
    pub fn names(&self) -> Result<Vec<String>, UsersError> {
        let raw = self.file.load()?;
        Ok(raw.users.keys().cloned().collect())
    }

    /// User handles in document order.
    pub fn iter(&self) -> Result<Vec<User>, UsersError> {
        let raw = self.file.load()?;
        Ok(raw
            .users
            .into_values()
            .map(|user| self.mk_user(user, raw.defaults.clone()))
            .collect())
    }

    /// Whether a user id is present.
    pub fn contains(&self, username: impl AsRef<str>) -> Result<bool, UsersError> {
        let raw = self.file.load()?;
        Ok(raw.users.contains_key(username.as_ref()))
    }

    /// Fetch one user.
    ///
    /// # Errors
    /// `UsersError::NoSuchUser` when the id is absent.
    pub fn get(&self, username: impl AsRef<str>) -> Result<User, UsersError> {
        let username = username.as_ref();
        let raw = self.file.load()?;
        match raw.users.get(username) {
            Some(user) => Ok(self.mk_user(user.clone(), raw.defaults)),
            None => Err(UsersError::NoSuchUser {
                username: username.to_string(),
            }),
        }
    }

    /// Create a user record, optionally writing its key right away.
    ///
    /// A missing users document counts as empty when the store policy says
    /// so or when `exist_ok` is set. When `pubkey` is given it is written
    /// to the user's default key location even if the record already
    /// existed.
    ///
    /// # Errors
    /// `UsersError::AlreadyExists` on a duplicate id unless `exist_ok`.
    pub fn add(
        &self,
        username: impl AsRef<str>,
        pubkey: Option<&Pubkey>,
        exist_ok: bool,
    ) -> Result<User, UsersError> {
        let username = username.as_ref();
        let allow_missing = self.policy.silent_create_users || exist_ok;
        let mut raw = self.file.load_or_empty(allow_missing)?;

        if raw.users.contains_key(username) {
            if !exist_ok {
                return Err(UsersError::AlreadyExists {
                    username: username.to_string(),
                });
            }
            debug!(user = username, "Add of existing user tolerated");
        } else {
            raw.users
                .insert(username.to_string(), RawUser::new(username));
            self.file.dump(&raw)?;
            info!(user = username, "User added");
        }

        let user = self.get(username)?;
        if let Some(pubkey) = pubkey {
            user.set_pubkey_default(pubkey)?;
        }
        Ok(user)
    }

    /// Delete a user record, by default together with its key files.
    ///
    /// Returns a snapshot handle of the removed user.
    ///
    /// # Errors
    /// `UsersError::NoSuchUser` when the id is absent.
    pub fn remove(
        &self,
        username: impl AsRef<str>,
        with_pubkeys: bool,
    ) -> Result<User, UsersError> {
        let username = username.as_ref();
        let mut raw = self.file.load()?;

        let user = match raw.users.get(username) {
            Some(user) => self.mk_user(user.clone(), raw.defaults.clone()),
            None => {
                return Err(UsersError::NoSuchUser {
                    username: username.to_string(),
                });
            }
        };

        if with_pubkeys {
            user.pubkeys()
                .remove_all()
                .map_err(|source| user.pubkey_err(source))?;
        }

        raw.users.shift_remove(username);
        self.file.dump(&raw)?;
        info!(user = username, "User removed");
        Ok(user)
    }

    fn mk_user(&self, raw: RawUser, defaults: Option<RawUserDefaults>) -> User {
        User {
            root: self.root.clone(),
            raw,
            defaults,
            pubkey_policy: self.policy.pubkey.clone(),
        }
    }
}

/// Snapshot handle over one user record.
///
/// Key file accessors resolve against the state of the record at load
/// time; re-fetch the user after mutating the store.
#[derive(Debug, Clone)]
pub struct User {
    root: PathBuf,
    raw: RawUser,
    defaults: Option<RawUserDefaults>,
    pubkey_policy: PubkeyPolicy,
}

impl User {
    /// The user id.
    pub fn name(&self) -> &str {
        &self.raw.name
    }

    /// The record itself.
    pub fn raw(&self) -> &RawUser {
        &self.raw
    }

    /// Key file surface for this user.
    pub fn pubkeys(&self) -> UserPubkeys {
        UserPubkeys::new(
            &self.root,
            &self.raw,
            self.defaults.as_ref(),
            &self.pubkey_policy,
        )
    }

    /// Load the key a read of this user resolves to.
    ///
    /// # Errors
    /// `UsersError::Pubkey` wrapping the resolution or file error.
    pub fn pubkey(&self) -> Result<Pubkey, UsersError> {
        self.pubkeys()
            .selected()
            .map_err(|source| self.pubkey_err(source))
    }

    /// Load the key at this user's write location.
    pub fn pubkey_default(&self) -> Result<Pubkey, UsersError> {
        self.pubkeys()
            .default()
            .map_err(|source| self.pubkey_err(source))
    }

    /// Write `pubkey` to this user's write location.
    pub fn set_pubkey_default(&self, pubkey: &Pubkey) -> Result<(), UsersError> {
        self.pubkeys()
            .set_default(pubkey)
            .map_err(|source| self.pubkey_err(source))
    }

    fn pubkey_err(&self, source: PubkeyError) -> UsersError {
        UsersError::Pubkey {
            username: self.raw.name.clone(),
            source,
        }
    }
}
