//! Error types for the users repository.

use std::path::PathBuf;

use thiserror::Error;

use crate::content::ContentError;
use crate::pubkey::PubkeyError;

/// Errors raised by [`UsersRepo`](super::UsersRepo) and [`User`](super::User).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum UsersError {
    /// Users document could not be read or written
    #[error("Cannot access '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Users document exists but does not parse as expected
    #[error("Malformed users document '{}': {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// Lookup of a user id that is not present
    #[error("No such user: '{username}'")]
    NoSuchUser { username: String },

    /// Create of a user id that is already present
    #[error("Failed to add user '{username}': already exists")]
    AlreadyExists { username: String },

    /// Key file trouble while acting on a user's pubkeys
    #[error("User '{username}': {source}")]
    Pubkey {
        username: String,
        #[source]
        source: PubkeyError,
    },
}

impl UsersError {
    /// Check if this error is related to file access.
    pub fn is_file_access(&self) -> bool {
        match self {
            UsersError::FileAccess { .. } => true,
            UsersError::Pubkey { source, .. } => source.is_file_access(),
            _ => false,
        }
    }

    /// Check if this error indicates the users document does not exist.
    pub fn is_missing_file(&self) -> bool {
        match self {
            UsersError::FileAccess { source, .. } => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }

    /// Check if this error is related to malformed content.
    pub fn is_format(&self) -> bool {
        matches!(self, UsersError::Format { .. })
    }

    /// Check if this error indicates a lookup of an absent user.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UsersError::NoSuchUser { .. })
    }

    /// Check if this error indicates a duplicate create.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, UsersError::AlreadyExists { .. })
    }

    /// Check if this error wraps a pubkey resolution or key file error.
    pub fn is_pubkey(&self) -> bool {
        matches!(self, UsersError::Pubkey { .. })
    }

    pub(crate) fn from_content(err: ContentError) -> UsersError {
        match err {
            ContentError::Access { path, source } => UsersError::FileAccess { path, source },
            ContentError::Format { path, reason } => UsersError::Format { path, reason },
        }
    }
}

impl From<UsersError> for crate::Error {
    fn from(err: UsersError) -> Self {
        crate::Error::Users(err)
    }
}
