//!
//! Authdir: SSH access metadata kept in plain files.
//!
//! This library manages a directory of JSON or YAML documents describing
//! who may log in as which account on a device, and with which public key.
//! The documents stay hand-editable: unknown keys and key order survive
//! every rewrite, and nothing is cached between calls.
//!
//! ## Core Concepts
//!
//! * **Store root (`AuthDir`)**: handle over one store directory, giving access to the repositories below.
//! * **Users (`users::UsersRepo` / `users::User`)**: people allowed into the fleet, each with public key lookup settings.
//! * **Groups (`groups::GroupsRepo` / `groups::Group`)**: named sets of user ids, resolved lazily against the users document.
//! * **Authorization scopes (`auth::AuthRepo` / `auth::DeviceUsersRepo`)**: per device state (or always), which users and groups may log in as which device user.
//! * **Pubkey resolution (`pubkey::PubkeysDb`)**: layered lookup of a user's key file across built-in, store-wide and per-user settings.
//! * **Documents (`content`)**: ordered, format-agnostic persistence shared by every repository.

pub mod auth;
pub mod content;
pub mod groups;
pub mod layout;
pub mod policy;
pub mod pubkey;
pub mod users;

mod dir;

/// Re-export the store root handle for easier access.
pub use dir::AuthDir;

/// Result type used throughout the authdir library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the authdir library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Document persistence errors from the content module
    #[error(transparent)]
    Content(content::ContentError),

    /// Key file resolution errors from the pubkey module
    #[error(transparent)]
    Pubkey(pubkey::PubkeyError),

    /// Structured user repository errors from the users module
    #[error(transparent)]
    Users(users::UsersError),

    /// Structured group repository errors from the groups module
    #[error(transparent)]
    Groups(groups::GroupsError),

    /// Structured authorization errors from the auth module
    #[error(transparent)]
    Auth(auth::AuthError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Content(_) => "content",
            Error::Pubkey(_) => "pubkey",
            Error::Users(_) => "users",
            Error::Groups(_) => "groups",
            Error::Auth(_) => "auth",
        }
    }

    /// Check if this error is related to file access.
    pub fn is_file_access(&self) -> bool {
        match self {
            Error::Content(err) => err.is_access(),
            Error::Pubkey(err) => err.is_file_access(),
            Error::Users(err) => err.is_file_access(),
            Error::Groups(err) => err.is_file_access(),
            Error::Auth(err) => err.is_file_access(),
        }
    }

    /// Check if this error indicates a lookup of something absent.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Pubkey(err) => err.is_not_found(),
            Error::Users(err) => err.is_not_found(),
            Error::Groups(err) => err.is_not_found(),
            Error::Auth(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a duplicate create.
    pub fn is_duplicate(&self) -> bool {
        match self {
            Error::Users(err) => err.is_duplicate(),
            Error::Groups(err) => err.is_duplicate(),
            Error::Auth(err) => err.is_duplicate(),
            _ => false,
        }
    }

    /// Check if this error is related to malformed content.
    pub fn is_format(&self) -> bool {
        match self {
            Error::Content(err) => err.is_format(),
            Error::Users(err) => err.is_format(),
            Error::Groups(err) => err.is_format(),
            Error::Auth(err) => err.is_format(),
            _ => false,
        }
    }

    /// Check if this error indicates a reference to a record that does not
    /// exist.
    pub fn is_invalid_ref(&self) -> bool {
        match self {
            Error::Groups(err) => err.is_invalid_ref(),
            Error::Auth(err) => err.is_invalid_ref(),
            _ => false,
        }
    }

    /// Check if this error indicates an unreachable default key location.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Error::Pubkey(err) => err.is_unreachable(),
            _ => false,
        }
    }
}
