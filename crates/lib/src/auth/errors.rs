//! Error types for the device user authorization repositories.

use std::path::PathBuf;

use thiserror::Error;

use crate::content::ContentError;
use crate::groups::GroupsError;
use crate::users::UsersError;

/// Errors raised by [`AuthRepo`](super::AuthRepo), [`DeviceUsersRepo`](super::DeviceUsersRepo)
/// and [`DeviceUser`](super::DeviceUser).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AuthError {
    /// Device users document could not be read or written
    #[error("Cannot access '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Device users document exists but does not parse as expected
    #[error("Malformed device users document '{}': {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// Lookup of a device user id that is not present
    #[error("No such device user: '{name}'")]
    NoSuchDeviceUser { name: String },

    /// Create of a device user id that is already present
    #[error("Failed to add device user '{name}': already exists")]
    AlreadyExists { name: String },

    /// Deauthorization of a user id that is not in the grant set
    #[error("No such user '{user}' authorized to device user '{device_user}'")]
    UserNotAuthorized { device_user: String, user: String },

    /// Deauthorization of a group id that is not in the grant set
    #[error("No such group '{group}' authorized to device user '{device_user}'")]
    GroupNotAuthorized { device_user: String, group: String },

    /// Authorization of a user id that is already in the grant set
    #[error("Failed to authorize user '{user}' to device user '{device_user}': already authorized")]
    UserAlreadyAuthorized { device_user: String, user: String },

    /// Authorization of a group id that is already in the grant set
    #[error(
        "Failed to authorize group '{group}' to device user '{device_user}': already authorized"
    )]
    GroupAlreadyAuthorized { device_user: String, group: String },

    /// Authorization of a user id with no user record behind it
    #[error("Failed to authorize user '{user}' to device user '{device_user}': user does not exist")]
    UnknownUser { device_user: String, user: String },

    /// Authorization of a group id with no group record behind it
    #[error(
        "Failed to authorize group '{group}' to device user '{device_user}': group does not exist"
    )]
    UnknownGroup { device_user: String, group: String },

    /// A stored user grant with no user record behind it, hit at resolution
    #[error("Device user '{device_user}' authorized user '{user}' does not correspond to a valid user")]
    InvalidAuthorizedUser { device_user: String, user: String },

    /// A stored group grant with no group record behind it, hit at resolution
    #[error(
        "Device user '{device_user}' authorized group '{group}' does not correspond to a valid group"
    )]
    InvalidAuthorizedGroup { device_user: String, group: String },

    /// Trouble in the underlying users repository
    #[error(transparent)]
    Users(#[from] UsersError),

    /// Trouble in the underlying groups repository
    #[error(transparent)]
    Groups(#[from] GroupsError),
}

impl AuthError {
    /// Check if this error is related to file access.
    pub fn is_file_access(&self) -> bool {
        match self {
            AuthError::FileAccess { .. } => true,
            AuthError::Users(source) => source.is_file_access(),
            AuthError::Groups(source) => source.is_file_access(),
            _ => false,
        }
    }

    /// Check if this error indicates the device users document does not exist.
    pub fn is_missing_file(&self) -> bool {
        match self {
            AuthError::FileAccess { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Check if this error is related to malformed content.
    pub fn is_format(&self) -> bool {
        matches!(self, AuthError::Format { .. })
    }

    /// Check if this error indicates a lookup of something absent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AuthError::NoSuchDeviceUser { .. }
                | AuthError::UserNotAuthorized { .. }
                | AuthError::GroupNotAuthorized { .. }
        )
    }

    /// Check if this error indicates a duplicate create.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            AuthError::AlreadyExists { .. }
                | AuthError::UserAlreadyAuthorized { .. }
                | AuthError::GroupAlreadyAuthorized { .. }
        )
    }

    /// Check if this error indicates a grant id without a record behind it.
    pub fn is_invalid_ref(&self) -> bool {
        matches!(
            self,
            AuthError::UnknownUser { .. }
                | AuthError::UnknownGroup { .. }
                | AuthError::InvalidAuthorizedUser { .. }
                | AuthError::InvalidAuthorizedGroup { .. }
        )
    }

    pub(crate) fn from_content(err: ContentError) -> AuthError {
        match err {
            ContentError::Access { path, source } => AuthError::FileAccess { path, source },
            ContentError::Format { path, reason } => AuthError::Format { path, reason },
        }
    }
}

impl From<AuthError> for crate::Error {
    fn from(err: AuthError) -> Self {
        crate::Error::Auth(err)
    }
}
