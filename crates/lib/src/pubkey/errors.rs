//! Error types for pubkey lookup and key file access.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while resolving or accessing a user's key files.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PubkeyError {
    /// Key file could not be read or written
    #[error("Cannot access pubkey file '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No candidate location yielded a usable key file
    #[error(
        "Cannot locate any valid pubkey {qualifier} location: looked for basename \
         templates {{{templates}}} in search path {{{search_path}}} to no avail"
    )]
    NotFound {
        qualifier: &'static str,
        templates: String,
        search_path: String,
    },

    /// The canonical write location cannot be found back through the merged lookup
    #[error(
        "Default pubkey location '{location}' not reachable through search path \
         {{{search_path}}} using file template {{{templates}}}"
    )]
    Unreachable {
        location: String,
        templates: String,
        search_path: String,
    },
}

impl PubkeyError {
    /// Check if this error is related to key file access.
    pub fn is_file_access(&self) -> bool {
        matches!(self, PubkeyError::FileAccess { .. })
    }

    /// Check if this error indicates that no candidate file was found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PubkeyError::NotFound { .. })
    }

    /// Check if this error indicates an unreachable default location.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, PubkeyError::Unreachable { .. })
    }
}

pub(crate) fn quoted_list<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    items
        .into_iter()
        .map(|item| format!("'{item}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn quoted_path_list<'a, I>(paths: I) -> String
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    quoted_list(paths.into_iter().map(|p: &PathBuf| p.display()))
}

pub(crate) fn file_access_err(path: &Path, source: std::io::Error) -> PubkeyError {
    PubkeyError::FileAccess {
        path: path.to_path_buf(),
        source,
    }
}

impl From<PubkeyError> for crate::Error {
    fn from(err: PubkeyError) -> Self {
        crate::Error::Pubkey(err)
    }
}
