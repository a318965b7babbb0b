//! Error types for ordered document persistence.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading or storing a document file.
///
/// Repositories never expose this type directly; they translate it into
/// their own error families while keeping the cause chain intact.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ContentError {
    /// File could not be read or written
    #[error("Cannot access '{}': {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exists but its content is not a well-formed document
    #[error("Malformed content in '{}': {reason}", path.display())]
    Format { path: PathBuf, reason: String },
}

impl ContentError {
    /// Check if this error is related to file access.
    pub fn is_access(&self) -> bool {
        matches!(self, ContentError::Access { .. })
    }

    /// Check if this error indicates the file does not exist.
    pub fn is_missing_file(&self) -> bool {
        match self {
            ContentError::Access { source, .. } => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }

    /// Check if this error is related to malformed content.
    pub fn is_format(&self) -> bool {
        matches!(self, ContentError::Format { .. })
    }

    /// Get the file path associated with this error.
    pub fn path(&self) -> &Path {
        match self {
            ContentError::Access { path, .. } | ContentError::Format { path, .. } => path,
        }
    }
}

impl From<ContentError> for crate::Error {
    fn from(err: ContentError) -> Self {
        crate::Error::Content(err)
    }
}
