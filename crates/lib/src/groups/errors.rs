//! Error types for the groups repository.

use std::path::PathBuf;

use thiserror::Error;

use crate::content::ContentError;
use crate::users::UsersError;

/// Errors raised by [`GroupsRepo`](super::GroupsRepo) and [`Group`](super::Group).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GroupsError {
    /// Groups document could not be read or written
    #[error("Cannot access '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Groups document exists but does not parse as expected
    #[error("Malformed groups document '{}': {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// Lookup of a group id that is not present
    #[error("No such group: '{name}'")]
    NoSuchGroup { name: String },

    /// Removal of a member id that is not in the group
    #[error("No such member '{member}' in group '{group}'")]
    NoSuchMember { group: String, member: String },

    /// Create of a group id that is already present
    #[error("Failed to add group '{name}': already exists")]
    AlreadyExists { name: String },

    /// Adding a member id that is already in the group
    #[error("Failed to add user '{member}' to group '{group}': already a member")]
    AlreadyMember { group: String, member: String },

    /// Adding a member id with no user record behind it
    #[error("Failed to add user '{member}' to group '{group}': user does not exist")]
    UnknownUser { group: String, member: String },

    /// A stored member id with no user record behind it, hit at resolution
    #[error("Group '{group}' member '{member}' does not correspond to a valid user")]
    InvalidMember { group: String, member: String },

    /// Trouble in the underlying users repository
    #[error(transparent)]
    Users(#[from] UsersError),
}

impl GroupsError {
    /// Check if this error is related to file access.
    pub fn is_file_access(&self) -> bool {
        match self {
            GroupsError::FileAccess { .. } => true,
            GroupsError::Users(source) => source.is_file_access(),
            _ => false,
        }
    }

    /// Check if this error indicates the groups document does not exist.
    pub fn is_missing_file(&self) -> bool {
        match self {
            GroupsError::FileAccess { source, .. } => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }

    /// Check if this error is related to malformed content.
    pub fn is_format(&self) -> bool {
        matches!(self, GroupsError::Format { .. })
    }

    /// Check if this error indicates a lookup of something absent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GroupsError::NoSuchGroup { .. } | GroupsError::NoSuchMember { .. }
        )
    }

    /// Check if this error indicates a duplicate create.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            GroupsError::AlreadyExists { .. } | GroupsError::AlreadyMember { .. }
        )
    }

    /// Check if this error indicates a member id without a user record.
    pub fn is_invalid_ref(&self) -> bool {
        matches!(
            self,
            GroupsError::UnknownUser { .. } | GroupsError::InvalidMember { .. }
        )
    }

    pub(crate) fn from_content(err: ContentError) -> GroupsError {
        match err {
            ContentError::Access { path, source } => GroupsError::FileAccess { path, source },
            ContentError::Format { path, reason } => GroupsError::Format { path, reason },
        }
    }
}

impl From<GroupsError> for crate::Error {
    fn from(err: GroupsError) -> Self {
        crate::Error::Groups(err)
    }
}
