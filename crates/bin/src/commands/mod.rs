//! Command implementations for the authdir CLI.

use std::error::Error;
use std::path::PathBuf;

use authdir::AuthDir;

pub mod group;
pub mod info;
pub mod user;

mod select;

/// Context shared by every command: the store handle and the default
/// user id taken from `--user` or its environment variable.
#[derive(Debug)]
pub struct Context {
    pub dir: AuthDir,
    pub user_id: Option<String>,
}

impl Context {
    /// Resolve the store root against the current directory and wrap it
    /// together with the default user id.
    pub fn resolve(dir: Option<PathBuf>, user_id: Option<String>) -> Result<Self, Box<dyn Error>> {
        let cwd = std::env::current_dir()?;
        let root = match dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => cwd.join(dir),
            None => cwd,
        };

        if !root.is_dir() {
            return Err(format!("Store directory '{}' does not exist", root.display()).into());
        }

        Ok(Self {
            dir: AuthDir::open(root),
            user_id,
        })
    }

    /// The explicit user id when given, the default user otherwise.
    pub fn require_user<'a>(&'a self, arg: Option<&'a str>) -> Result<&'a str, Box<dyn Error>> {
        arg.or(self.user_id.as_deref())
            .ok_or_else(|| "No user id given; pass one or set --user".into())
    }
}
