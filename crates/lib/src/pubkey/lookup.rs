//! Layered pubkey lookup info and its merge rules.

use std::path::{Path, PathBuf};

/// The single variable recognized inside pubkey file name templates.
pub const USER_NAME_TEMPLATE_VAR: &str = "${ssh-user.name}";

/// Where to look for a user's key files.
///
/// Three layers of this struct stack up: the built-in policy defaults, the
/// store-wide defaults from the users document, and the user record itself.
/// A layer that defines a field replaces that field wholesale; fields are
/// never merged elementwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PubkeyLookup {
    /// File name templates, tried in order inside each search directory.
    pub templates: Option<Vec<String>>,
    /// Directories to search, relative entries resolving against the store
    /// root.
    pub search_path: Option<Vec<PathBuf>>,
    /// Exact key file path, short-circuiting the search entirely.
    pub file: Option<PathBuf>,
}

impl PubkeyLookup {
    /// Replace every field that `over` defines.
    pub fn overlay(&mut self, over: &PubkeyLookup) {
        if let Some(templates) = &over.templates {
            self.templates = Some(templates.clone());
        }
        if let Some(search_path) = &over.search_path {
            self.search_path = Some(search_path.clone());
        }
        if let Some(file) = &over.file {
            self.file = Some(file.clone());
        }
    }

    /// Merge `layers` over `base`, rightmost layer winning per field.
    pub fn merged<'a>(
        base: PubkeyLookup,
        layers: impl IntoIterator<Item = &'a PubkeyLookup>,
    ) -> PubkeyLookup {
        let mut out = base;
        for layer in layers {
            out.overlay(layer);
        }
        out
    }
}

/// Expand template variables using the user's name.
///
/// # Panics
/// Any `${...}` left after expansion is a programming error, not data the
/// resolver can recover from.
pub(crate) fn expand_template(template: &str, username: &str) -> String {
    let expanded = template.replace(USER_NAME_TEMPLATE_VAR, username);
    assert!(
        !expanded.contains("${"),
        "unexpanded variable left in pubkey file template '{expanded}'"
    );
    expanded
}

/// Resolve a possibly-relative path against the store root.
pub(crate) fn canonicalize_path(path: &Path, root: &Path) -> PathBuf {
    // Path::join replaces the base entirely for absolute arguments.
    // Re-collecting drops redundant `.` components so that equal
    // locations compare equal.
    root.join(path).components().collect()
}
