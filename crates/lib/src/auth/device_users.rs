//! Device user records of one authorization scope.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info};

use crate::groups::{Group, GroupsError, GroupsRepo};
use crate::policy::StorePolicy;
use crate::users::{User, UsersError, UsersRepo};

use super::errors::AuthError;
use super::file::AuthFile;
use super::types::RawDeviceUser;

/// Repository of device user records backed by one device users document.
///
/// A store has one of these per authorization scope: the always scope plus
/// one per device state. Grants recorded here take effect always or only
/// while the device is in the scope's state.
#[derive(Debug, Clone)]
pub struct DeviceUsersRepo {
    file: AuthFile,
    label: String,
    state: Option<String>,
    policy: StorePolicy,
    users: UsersRepo,
    groups: GroupsRepo,
}

impl DeviceUsersRepo {
    pub(crate) fn new(
        file: AuthFile,
        label: String,
        state: Option<String>,
        policy: &StorePolicy,
        users: UsersRepo,
        groups: GroupsRepo,
    ) -> Self {
        Self {
            file,
            label,
            state,
            policy: policy.clone(),
            users,
            groups,
        }
    }

    /// Scope label, unique within the store.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The device state this scope is bound to, `None` for the always
    /// scope.
    pub fn state_name(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// The state name as shown to operators.
    pub fn display_state_name(&self) -> &str {
        self.state.as_deref().unwrap_or("[AUTH-ALWAYS]")
    }

    /// Path of the backing device users document.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Device user ids in document order.
    pub fn names(&self) -> Result<Vec<String>, AuthError> {
        let raw = self.file.load()?;
        Ok(raw.device_users.keys().cloned().collect())
    }

    /// Device user handles in document order.
    pub fn iter(&self) -> Result<Vec<DeviceUser>, AuthError> {
        let raw = self.file.load()?;
        Ok(raw
            .device_users
            .into_values()
            .map(|du| self.mk_du(du))
            .collect())
    }

    /// Whether a device user id is present.
    pub fn contains(&self, name: impl AsRef<str>) -> Result<bool, AuthError> {
        let raw = self.file.load()?;
        Ok(raw.device_users.contains_key(name.as_ref()))
    }

    /// Fetch one device user.
    ///
    /// # Errors
    /// `AuthError::NoSuchDeviceUser` when the id is absent.
    pub fn get(&self, name: impl AsRef<str>) -> Result<DeviceUser, AuthError> {
        let name = name.as_ref();
        let raw = self.file.load()?;
        match raw.device_users.get(name) {
            Some(du) => Ok(self.mk_du(du.clone())),
            None => Err(AuthError::NoSuchDeviceUser {
                name: name.to_string(),
            }),
        }
    }

    /// Fetch the match-all device user, `None` when it is not recorded.
    ///
    /// File trouble still surfaces as an error.
    pub fn get_all(&self) -> Result<Option<DeviceUser>, AuthError> {
        match self.get(DeviceUser::MATCH_ALL_ID) {
            Ok(du) => Ok(Some(du)),
            Err(AuthError::NoSuchDeviceUser { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create a device user record.
    ///
    /// A missing device users document counts as empty when the store
    /// policy says so or when `exist_ok` is set.
    ///
    /// # Errors
    /// `AuthError::AlreadyExists` on a duplicate id unless `exist_ok`.
    pub fn add(&self, name: impl AsRef<str>, exist_ok: bool) -> Result<DeviceUser, AuthError> {
        let name = name.as_ref();
        let allow_missing = self.policy.silent_create_auth || exist_ok;
        let mut raw = self.file.load_or_empty(allow_missing)?;

        if raw.device_users.contains_key(name) {
            if !exist_ok {
                return Err(AuthError::AlreadyExists {
                    name: name.to_string(),
                });
            }
            debug!(
                device_user = name,
                scope = %self.label,
                "Add of existing device user tolerated"
            );
        } else {
            raw.device_users
                .insert(name.to_string(), RawDeviceUser::new(name));
            self.file.dump(&raw)?;
            info!(device_user = name, scope = %self.label, "Device user added");
        }

        self.get(name)
    }

    /// Fetch a device user, creating it first when absent.
    pub fn ensure(&self, name: impl AsRef<str>) -> Result<DeviceUser, AuthError> {
        self.add(name, true)
    }

    /// Fetch the match-all device user, creating it first when absent.
    pub fn ensure_all(&self) -> Result<DeviceUser, AuthError> {
        self.add(DeviceUser::MATCH_ALL_ID, true)
    }

    /// Delete a device user record. Returns a snapshot handle of the
    /// removed record.
    ///
    /// # Errors
    /// `AuthError::NoSuchDeviceUser` when the id is absent.
    pub fn remove(&self, name: impl AsRef<str>) -> Result<DeviceUser, AuthError> {
        let name = name.as_ref();
        let mut raw = self.file.load()?;

        let du = match raw.device_users.get(name) {
            Some(du) => self.mk_du(du.clone()),
            None => {
                return Err(AuthError::NoSuchDeviceUser {
                    name: name.to_string(),
                });
            }
        };

        raw.device_users.shift_remove(name);
        self.file.dump(&raw)?;
        info!(device_user = name, scope = %self.label, "Device user removed");
        Ok(du)
    }

    /// Write back a mutated record, returning its freshly reloaded form.
    fn update_raw(&self, du: RawDeviceUser) -> Result<RawDeviceUser, AuthError> {
        let name = du.name.clone();
        let mut raw = self.file.load()?;

        if !raw.device_users.contains_key(&name) {
            return Err(AuthError::NoSuchDeviceUser { name });
        }

        raw.device_users.insert(name.clone(), du);
        self.file.dump(&raw)?;

        let mut raw = self.file.load()?;
        raw.device_users
            .shift_remove(&name)
            .ok_or(AuthError::NoSuchDeviceUser { name })
    }

    fn mk_du(&self, raw: RawDeviceUser) -> DeviceUser {
        DeviceUser {
            raw,
            repo: self.clone(),
        }
    }
}

/// Handle over one device user record.
///
/// Mutations write through to the store immediately and refresh the
/// handle's view of the record.
#[derive(Debug, Clone)]
pub struct DeviceUser {
    raw: RawDeviceUser,
    repo: DeviceUsersRepo,
}

impl DeviceUser {
    /// Record id standing for every device user at once.
    ///
    /// Grants on this record apply regardless of which device user the
    /// login targets.
    pub const MATCH_ALL_ID: &'static str = "";

    /// The device user id.
    pub fn name(&self) -> &str {
        &self.raw.name
    }

    /// The id as shown to operators, with the match-all sentinel spelled
    /// out.
    pub fn display_name(&self) -> &str {
        if self.is_match_all() {
            return "[ALL]";
        }
        &self.raw.name
    }

    /// Whether this is the match-all record.
    pub fn is_match_all(&self) -> bool {
        self.raw.name == Self::MATCH_ALL_ID
    }

    /// The record itself.
    pub fn raw(&self) -> &RawDeviceUser {
        &self.raw
    }

    /// The device state the containing scope is bound to.
    pub fn state_name(&self) -> Option<&str> {
        self.repo.state_name()
    }

    /// The state name as shown to operators.
    pub fn display_state_name(&self) -> &str {
        self.repo.display_state_name()
    }

    /// Ids of directly authorized users, sorted.
    pub fn authorized_user_names(&self) -> &BTreeSet<String> {
        &self.raw.users
    }

    /// Ids of authorized groups, sorted.
    pub fn authorized_group_names(&self) -> &BTreeSet<String> {
        &self.raw.groups
    }

    /// Resolve directly authorized users to user handles.
    ///
    /// With `skip_invalid`, grant ids without a user record are dropped
    /// from the result instead of failing the whole resolution.
    ///
    /// # Errors
    /// `AuthError::InvalidAuthorizedUser` on a dangling grant id unless
    /// `skip_invalid`.
    pub fn iter_authorized_users(&self, skip_invalid: bool) -> Result<Vec<User>, AuthError> {
        let mut out = Vec::with_capacity(self.raw.users.len());
        for name in &self.raw.users {
            match self.repo.users.get(name) {
                Ok(user) => out.push(user),
                Err(UsersError::NoSuchUser { .. }) if skip_invalid => {
                    debug!(
                        device_user = %self.display_name(),
                        user = %name,
                        "Skipping user grant without a user record"
                    );
                }
                Err(UsersError::NoSuchUser { .. }) => {
                    return Err(AuthError::InvalidAuthorizedUser {
                        device_user: self.display_name().to_string(),
                        user: name.clone(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(out)
    }

    /// Resolve authorized groups to group handles.
    ///
    /// With `skip_invalid`, grant ids without a group record are dropped
    /// from the result instead of failing the whole resolution.
    ///
    /// # Errors
    /// `AuthError::InvalidAuthorizedGroup` on a dangling grant id unless
    /// `skip_invalid`.
    pub fn iter_authorized_groups(&self, skip_invalid: bool) -> Result<Vec<Group>, AuthError> {
        let mut out = Vec::with_capacity(self.raw.groups.len());
        for name in &self.raw.groups {
            match self.repo.groups.get(name) {
                Ok(group) => out.push(group),
                Err(GroupsError::NoSuchGroup { .. }) if skip_invalid => {
                    debug!(
                        device_user = %self.display_name(),
                        group = %name,
                        "Skipping group grant without a group record"
                    );
                }
                Err(GroupsError::NoSuchGroup { .. }) => {
                    return Err(AuthError::InvalidAuthorizedGroup {
                        device_user: self.display_name().to_string(),
                        group: name.clone(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(out)
    }

    /// Grant login to a user id. The id must belong to an existing user.
    ///
    /// With `force`, granting an id that is already authorized becomes a
    /// logged no-op. A dangling id is refused either way.
    ///
    /// # Errors
    /// `AuthError::UnknownUser` when no user record backs the id,
    /// `AuthError::UserAlreadyAuthorized` on a duplicate unless `force`.
    pub fn authorize_user(
        &mut self,
        user_id: impl AsRef<str>,
        force: bool,
    ) -> Result<(), AuthError> {
        let user_id = user_id.as_ref();

        if !self.repo.users.contains(user_id)? {
            return Err(AuthError::UnknownUser {
                device_user: self.display_name().to_string(),
                user: user_id.to_string(),
            });
        }

        if self.raw.users.contains(user_id) {
            if force {
                debug!(
                    device_user = %self.display_name(),
                    user = user_id,
                    "User grant already present"
                );
                return Ok(());
            }
            return Err(AuthError::UserAlreadyAuthorized {
                device_user: self.display_name().to_string(),
                user: user_id.to_string(),
            });
        }

        self.raw.users.insert(user_id.to_string());
        self.raw = self.repo.update_raw(self.raw.clone())?;
        info!(device_user = %self.display_name(), user = user_id, "User authorized");
        Ok(())
    }

    /// Revoke a user grant.
    ///
    /// With `force`, revoking an id that is not granted becomes a logged
    /// no-op.
    ///
    /// # Errors
    /// `AuthError::UserNotAuthorized` when the id is not granted unless
    /// `force`.
    pub fn deauthorize_user(
        &mut self,
        user_id: impl AsRef<str>,
        force: bool,
    ) -> Result<(), AuthError> {
        let user_id = user_id.as_ref();

        if !self.raw.users.remove(user_id) {
            if force {
                debug!(
                    device_user = %self.display_name(),
                    user = user_id,
                    "User grant already absent"
                );
                return Ok(());
            }
            return Err(AuthError::UserNotAuthorized {
                device_user: self.display_name().to_string(),
                user: user_id.to_string(),
            });
        }

        self.raw = self.repo.update_raw(self.raw.clone())?;
        info!(device_user = %self.display_name(), user = user_id, "User deauthorized");
        Ok(())
    }

    /// Grant login to every member of a group id. The id must belong to an
    /// existing group.
    ///
    /// With `force`, granting an id that is already authorized becomes a
    /// logged no-op. A dangling id is refused either way.
    ///
    /// # Errors
    /// `AuthError::UnknownGroup` when no group record backs the id,
    /// `AuthError::GroupAlreadyAuthorized` on a duplicate unless `force`.
    pub fn authorize_group(
        &mut self,
        group_id: impl AsRef<str>,
        force: bool,
    ) -> Result<(), AuthError> {
        let group_id = group_id.as_ref();

        if !self.repo.groups.contains(group_id)? {
            return Err(AuthError::UnknownGroup {
                device_user: self.display_name().to_string(),
                group: group_id.to_string(),
            });
        }

        if self.raw.groups.contains(group_id) {
            if force {
                debug!(
                    device_user = %self.display_name(),
                    group = group_id,
                    "Group grant already present"
                );
                return Ok(());
            }
            return Err(AuthError::GroupAlreadyAuthorized {
                device_user: self.display_name().to_string(),
                group: group_id.to_string(),
            });
        }

        self.raw.groups.insert(group_id.to_string());
        self.raw = self.repo.update_raw(self.raw.clone())?;
        info!(device_user = %self.display_name(), group = group_id, "Group authorized");
        Ok(())
    }

    /// Revoke a group grant.
    ///
    /// With `force`, revoking an id that is not granted becomes a logged
    /// no-op.
    ///
    /// # Errors
    /// `AuthError::GroupNotAuthorized` when the id is not granted unless
    /// `force`.
    pub fn deauthorize_group(
        &mut self,
        group_id: impl AsRef<str>,
        force: bool,
    ) -> Result<(), AuthError> {
        let group_id = group_id.as_ref();

        if !self.raw.groups.remove(group_id) {
            if force {
                debug!(
                    device_user = %self.display_name(),
                    group = group_id,
                    "Group grant already absent"
                );
                return Ok(());
            }
            return Err(AuthError::GroupNotAuthorized {
                device_user: self.display_name().to_string(),
                group: group_id.to_string(),
            });
        }

        self.raw = self.repo.update_raw(self.raw.clone())?;
        info!(device_user = %self.display_name(), group = group_id, "Group deauthorized");
        Ok(())
    }
}
