//! The groups repository: named sets of user ids.
//!
//! Stored member ids are not checked against the users document at rest.
//! Dangling ids only surface when members are resolved to users, or when a
//! new member is added.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::layout::StoreLayout;
use crate::policy::StorePolicy;
use crate::users::{User, UsersError, UsersRepo};

mod errors;
pub use errors::GroupsError;

mod types;
pub use types::{RawGroup, RawGroups};

mod file;
pub(crate) use file::GroupsFile;

/// Repository of group records backed by one groups document.
#[derive(Debug, Clone)]
pub struct GroupsRepo {
    file: GroupsFile,
    policy: StorePolicy,
    users: UsersRepo,
}

impl GroupsRepo {
    pub(crate) fn new(root: &Path, layout: &StoreLayout, policy: &StorePolicy) -> Self {
        Self {
            file: GroupsFile::new(root, layout, policy),
            policy: policy.clone(),
            users: UsersRepo::new(root, layout, policy),
        }
    }

    /// Path of the backing groups document.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Group ids in document order.
    pub fn names(&self) -> Result<Vec<String>, GroupsError> {
        let raw = self.file.load()?;
        Ok(raw.groups.keys().cloned().collect())
    }

    /// Group handles in document order.
    pub fn iter(&self) -> Result<Vec<Group>, GroupsError> {
        let raw = self.file.load()?;
        Ok(raw
            .groups
            .into_values()
            .map(|group| self.mk_group(group))
            .collect())
    }

    /// Whether a group id is present.
    pub fn contains(&self, name: impl AsRef<str>) -> Result<bool, GroupsError> {
        let raw = self.file.load()?;
        Ok(raw.groups.contains_key(name.as_ref()))
    }

    /// Fetch one group.
    ///
    /// # Errors
    /// `GroupsError::NoSuchGroup` when the id is absent.
    pub fn get(&self, name: impl AsRef<str>) -> Result<Group, GroupsError> {
        let name = name.as_ref();
        let raw = self.file.load()?;
        match raw.groups.get(name) {
            Some(group) => Ok(self.mk_group(group.clone())),
            None => Err(GroupsError::NoSuchGroup {
                name: name.to_string(),
            }),
        }
    }

    /// Create a group record.
    ///
    /// A missing groups document counts as empty when the store policy says
    /// so or when `exist_ok` is set.
    ///
    /// # Errors
    /// `GroupsError::AlreadyExists` on a duplicate id unless `exist_ok`.
    pub fn add(&self, name: impl AsRef<str>, exist_ok: bool) -> Result<Group, GroupsError> {
        let name = name.as_ref();
        let allow_missing = self.policy.silent_create_groups || exist_ok;
        let mut raw = self.file.load_or_empty(allow_missing)?;

        if raw.groups.contains_key(name) {
            if !exist_ok {
                return Err(GroupsError::AlreadyExists {
                    name: name.to_string(),
                });
            }
            debug!(group = name, "Add of existing group tolerated");
        } else {
            raw.groups.insert(name.to_string(), RawGroup::new(name));
            self.file.dump(&raw)?;
            info!(group = name, "Group added");
        }

        self.get(name)
    }

    /// Fetch a group, creating it first when absent.
    pub fn ensure(&self, name: impl AsRef<str>) -> Result<Group, GroupsError> {
        self.add(name, true)
    }

    /// Delete a group record. Returns a snapshot handle of the removed
    /// group.
    ///
    /// # Errors
    /// `GroupsError::NoSuchGroup` when the id is absent.
    pub fn remove(&self, name: impl AsRef<str>) -> Result<Group, GroupsError> {
        let name = name.as_ref();
        let mut raw = self.file.load()?;

        let group = match raw.groups.get(name) {
            Some(group) => self.mk_group(group.clone()),
            None => {
                return Err(GroupsError::NoSuchGroup {
                    name: name.to_string(),
                });
            }
        };

        raw.groups.shift_remove(name);
        self.file.dump(&raw)?;
        info!(group = name, "Group removed");
        Ok(group)
    }

    /// Write back a mutated record, returning its freshly reloaded form.
    fn update_raw(&self, group: RawGroup) -> Result<RawGroup, GroupsError> {
        let name = group.name.clone();
        let mut raw = self.file.load()?;

        if !raw.groups.contains_key(&name) {
            return Err(GroupsError::NoSuchGroup { name });
        }

        raw.groups.insert(name.clone(), group);
        self.file.dump(&raw)?;

        let mut raw = self.file.load()?;
        raw.groups
            .shift_remove(&name)
            .ok_or(GroupsError::NoSuchGroup { name })
    }

    fn mk_group(&self, raw: RawGroup) -> Group {
        Group {
            raw,
            repo: self.clone(),
        }
    }
}

/// Handle over one group record.
///
/// Mutations write through to the store immediately and refresh the
/// handle's view of the record.
#[derive(Debug, Clone)]
pub struct Group {
    raw: RawGroup,
    repo: GroupsRepo,
}

impl Group {
    /// The group id.
    pub fn name(&self) -> &str {
        &self.raw.name
    }

    /// The record itself.
    pub fn raw(&self) -> &RawGroup {
        &self.raw
    }

    /// Member ids, sorted.
    pub fn member_names(&self) -> &BTreeSet<String> {
        &self.raw.members
    }

    /// Resolve members to user handles.
    ///
    /// With `skip_invalid`, member ids without a user record are dropped
    /// from the result instead of failing the whole resolution.
    ///
    /// # Errors
    /// `GroupsError::InvalidMember` on a dangling member id unless
    /// `skip_invalid`.
    pub fn iter_members(&self, skip_invalid: bool) -> Result<Vec<User>, GroupsError> {
        let mut out = Vec::with_capacity(self.raw.members.len());
        for member in &self.raw.members {
            match self.repo.users.get(member) {
                Ok(user) => out.push(user),
                Err(UsersError::NoSuchUser { .. }) if skip_invalid => {
                    debug!(
                        group = %self.raw.name,
                        member = %member,
                        "Skipping member without a user record"
                    );
                }
                Err(UsersError::NoSuchUser { .. }) => {
                    return Err(GroupsError::InvalidMember {
                        group: self.raw.name.clone(),
                        member: member.clone(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(out)
    }

    /// Add a member id. The id must belong to an existing user.
    ///
    /// With `force`, adding an id that is already a member becomes a logged
    /// no-op. A dangling id is refused either way.
    ///
    /// # Errors
    /// `GroupsError::UnknownUser` when no user record backs the id,
    /// `GroupsError::AlreadyMember` on a duplicate unless `force`.
    pub fn add_member(&mut self, user_id: impl AsRef<str>, force: bool) -> Result<(), GroupsError> {
        let user_id = user_id.as_ref();

        if !self.repo.users.contains(user_id)? {
            return Err(GroupsError::UnknownUser {
                group: self.raw.name.clone(),
                member: user_id.to_string(),
            });
        }

        if self.raw.members.contains(user_id) {
            if force {
                debug!(group = %self.raw.name, member = user_id, "Member already present");
                return Ok(());
            }
            return Err(GroupsError::AlreadyMember {
                group: self.raw.name.clone(),
                member: user_id.to_string(),
            });
        }

        self.raw.members.insert(user_id.to_string());
        self.raw = self.repo.update_raw(self.raw.clone())?;
        info!(group = %self.raw.name, member = user_id, "Member added");
        Ok(())
    }

    /// Remove a member id.
    ///
    /// With `force`, removing an id that is not a member becomes a logged
    /// no-op.
    ///
    /// # Errors
    /// `GroupsError::NoSuchMember` when the id is not a member unless
    /// `force`.
    pub fn remove_member(
        &mut self,
        member_id: impl AsRef<str>,
        force: bool,
    ) -> Result<(), GroupsError> {
        let member_id = member_id.as_ref();

        if !self.raw.members.remove(member_id) {
            if force {
                debug!(group = %self.raw.name, member = member_id, "Member already absent");
                return Ok(());
            }
            return Err(GroupsError::NoSuchMember {
                group: self.raw.name.clone(),
                member: member_id.to_string(),
            });
        }

        self.raw = self.repo.update_raw(self.raw.clone())?;
        info!(group = %self.raw.name, member = member_id, "Member removed");
        Ok(())
    }
}
