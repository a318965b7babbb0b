//! On-disk layout of a store: document stems and directory names.

use std::path::{Path, PathBuf};

use crate::content::FileFormat;

/// Where each document class lives inside the store root.
///
/// Stems carry no extension; the active [`FileFormat`] supplies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    /// Stem of the users document.
    pub users_stem: String,
    /// Stem of the groups document.
    pub groups_stem: String,
    /// Stem of the always-authorized device users document.
    pub auth_always_stem: String,
    /// Directory holding one device users document per device state.
    pub auth_on_dirname: String,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            users_stem: "users".to_string(),
            groups_stem: "groups".to_string(),
            auth_always_stem: "authorized-always".to_string(),
            auth_on_dirname: "authorized-on".to_string(),
        }
    }
}

impl StoreLayout {
    pub fn users_file(&self, root: &Path, format: FileFormat) -> PathBuf {
        format.target_filename(root, &self.users_stem)
    }

    pub fn groups_file(&self, root: &Path, format: FileFormat) -> PathBuf {
        format.target_filename(root, &self.groups_stem)
    }

    pub fn auth_always_file(&self, root: &Path, format: FileFormat) -> PathBuf {
        format.target_filename(root, &self.auth_always_stem)
    }

    pub fn auth_on_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.auth_on_dirname)
    }

    pub fn auth_on_file(&self, root: &Path, state: &str, format: FileFormat) -> PathBuf {
        format.target_filename(&self.auth_on_dir(root), state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_files() {
        let layout = StoreLayout::default();
        let root = Path::new("/store");

        assert_eq!(
            layout.users_file(root, FileFormat::Json),
            Path::new("/store/users.json")
        );
        assert_eq!(
            layout.groups_file(root, FileFormat::Yaml),
            Path::new("/store/groups.yaml")
        );
        assert_eq!(
            layout.auth_always_file(root, FileFormat::Json),
            Path::new("/store/authorized-always.json")
        );
        assert_eq!(
            layout.auth_on_file(root, "install", FileFormat::Json),
            Path::new("/store/authorized-on/install.json")
        );
    }
}
