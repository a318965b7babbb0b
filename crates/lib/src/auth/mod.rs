//! Authorization scopes: which users may log in as which device users.
//!
//! Grants live in one device users document per scope. The always scope
//! sits at the store root; each device state gets its own document inside
//! the states directory. A scope only exists on disk once something is
//! granted in it.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::groups::GroupsRepo;
use crate::layout::StoreLayout;
use crate::policy::StorePolicy;
use crate::users::UsersRepo;

mod errors;
pub use errors::AuthError;

mod types;
pub use types::{RawAuth, RawDeviceUser};

mod file;
pub(crate) use file::AuthFile;

mod device_users;
pub use device_users::{DeviceUser, DeviceUsersRepo};

/// Entry point to the authorization scopes of one store.
#[derive(Debug, Clone)]
pub struct AuthRepo {
    root: PathBuf,
    layout: StoreLayout,
    policy: StorePolicy,
}

impl AuthRepo {
    pub(crate) fn new(root: &Path, layout: &StoreLayout, policy: &StorePolicy) -> Self {
        Self {
            root: root.to_path_buf(),
            layout: layout.clone(),
            policy: policy.clone(),
        }
    }

    /// The scope whose grants hold regardless of device state.
    pub fn always(&self) -> DeviceUsersRepo {
        let filename = self
            .layout
            .auth_always_file(&self.root, self.policy.file_format);
        self.mk_scope(filename, self.layout.auth_always_stem.clone(), None)
    }

    /// The scope whose grants hold only while the device is in `state`.
    pub fn on(&self, state: impl AsRef<str>) -> DeviceUsersRepo {
        let state = state.as_ref();
        let filename = self
            .layout
            .auth_on_file(&self.root, state, self.policy.file_format);
        let label = format!("{}-{state}", self.layout.auth_on_dirname);
        self.mk_scope(filename, label, Some(state.to_string()))
    }

    /// Names of device states with a document on disk, sorted.
    ///
    /// A missing states directory counts as no states at all.
    pub fn state_names(&self) -> Result<BTreeSet<String>, AuthError> {
        let dir = self.layout.auth_on_dir(&self.root);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(AuthError::FileAccess { path: dir, source: e }),
        };

        let mut names = BTreeSet::new();
        for entry in entries {
            let path = entry
                .map_err(|e| AuthError::FileAccess {
                    path: dir.clone(),
                    source: e,
                })?
                .path();
            if path.is_dir() || !self.policy.file_format.matches(&path) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.insert(stem.to_string());
            }
        }
        Ok(names)
    }

    /// Every scope with a document on disk: the always scope first when
    /// present, then one scope per state in sorted order.
    pub fn scopes(&self) -> Result<Vec<DeviceUsersRepo>, AuthError> {
        let mut out = Vec::new();

        let always = self.always();
        if always.path().exists() {
            out.push(always);
        }
        for state in self.state_names()? {
            out.push(self.on(state));
        }
        Ok(out)
    }

    fn mk_scope(&self, filename: PathBuf, label: String, state: Option<String>) -> DeviceUsersRepo {
        DeviceUsersRepo::new(
            AuthFile::at(filename, self.policy.file_format),
            label,
            state,
            &self.policy,
            UsersRepo::new(&self.root, &self.layout, &self.policy),
            GroupsRepo::new(&self.root, &self.layout, &self.policy),
        )
    }
}
