//! The store root handle.

use std::path::{Path, PathBuf};

use crate::auth::AuthRepo;
use crate::groups::GroupsRepo;
use crate::layout::StoreLayout;
use crate::policy::StorePolicy;
use crate::users::UsersRepo;

/// Handle over one store directory.
///
/// Opening is lazy; nothing is read until a repository accessor is used.
/// Repositories are built per call and hold no shared state, so handles
/// stay coherent with concurrent edits of the underlying files.
#[derive(Debug, Clone)]
pub struct AuthDir {
    root: PathBuf,
    layout: StoreLayout,
    policy: StorePolicy,
}

impl AuthDir {
    /// Open a store with the default layout and policy.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::with_policy(root, StoreLayout::default(), StorePolicy::default())
    }

    /// Open a store with an explicit layout and policy.
    pub fn with_policy(root: impl Into<PathBuf>, layout: StoreLayout, policy: StorePolicy) -> Self {
        Self {
            root: root.into(),
            layout,
            policy,
        }
    }

    /// The store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The layout this store was opened with.
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// The policy this store was opened with.
    pub fn policy(&self) -> &StorePolicy {
        &self.policy
    }

    /// The users repository.
    pub fn users(&self) -> UsersRepo {
        UsersRepo::new(&self.root, &self.layout, &self.policy)
    }

    /// The groups repository.
    pub fn groups(&self) -> GroupsRepo {
        GroupsRepo::new(&self.root, &self.layout, &self.policy)
    }

    /// The authorization scopes.
    pub fn auth(&self) -> AuthRepo {
        AuthRepo::new(&self.root, &self.layout, &self.policy)
    }
}
