//! Candidate resolution over a merged pubkey lookup.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::policy::PubkeyPolicy;

use super::errors::{PubkeyError, quoted_list, quoted_path_list};
use super::lookup::{PubkeyLookup, canonicalize_path, expand_template};

/// Resolves key file locations for one user against the merged lookup.
///
/// Holds the raw merged lookup (for reporting), the override layers on
/// their own (for the write view), and the canonical form: templates
/// expanded with the user's name, search path entries made absolute
/// against the store root.
#[derive(Debug, Clone)]
pub struct PubkeysDb {
    root: PathBuf,
    username: String,
    policy: PubkeyPolicy,
    overrides: PubkeyLookup,
    merged: PubkeyLookup,
    templates: Vec<String>,
    search_path: Vec<PathBuf>,
    file: Option<PathBuf>,
}

impl PubkeysDb {
    /// Merge the layers over the policy defaults and canonicalize.
    ///
    /// `defaults_layer` is the store-wide layer from the users document;
    /// `user_layer` comes from the user record itself and wins last.
    pub fn new(
        root: &Path,
        username: &str,
        user_layer: PubkeyLookup,
        defaults_layer: Option<&PubkeyLookup>,
        policy: &PubkeyPolicy,
    ) -> Self {
        let merged = PubkeyLookup::merged(
            policy.lookup(),
            defaults_layer.into_iter().chain(std::iter::once(&user_layer)),
        );
        // The same stack without the policy base. A field defined here
        // was pinned explicitly by some layer.
        let mut overrides = defaults_layer.cloned().unwrap_or_default();
        overrides.overlay(&user_layer);

        let templates = merged
            .templates
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|t| expand_template(t, username))
            .collect();
        let search_path = merged
            .search_path
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|sp| canonicalize_path(sp, root))
            .collect();
        let file = merged.file.as_deref().map(|f| canonicalize_path(f, root));

        Self {
            root: root.to_path_buf(),
            username: username.to_string(),
            policy: policy.clone(),
            overrides,
            merged,
            templates,
            search_path,
            file,
        }
    }

    /// Every location a key file may occupy: search path outer, templates
    /// inner. An explicit file entry is not part of the candidate grid.
    pub fn candidate_filenames(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.search_path.iter().flat_map(|dir| {
            self.templates
                .iter()
                .map(move |basename| dir.join(basename))
        })
    }

    /// The key file a read should use.
    ///
    /// An explicit file entry short-circuits; otherwise the first readable
    /// candidate wins.
    ///
    /// # Errors
    /// `PubkeyError::NotFound` when no candidate is readable.
    pub fn selected_filename(&self) -> Result<PathBuf, PubkeyError> {
        if let Some(file) = &self.file {
            return Ok(file.clone());
        }

        for filename in self.candidate_filenames() {
            if fs::File::open(&filename).is_ok() {
                debug!(user = %self.username, file = %filename.display(), "Pubkey selected");
                return Ok(filename);
            }
        }

        Err(PubkeyError::NotFound {
            qualifier: "readable",
            templates: quoted_list(&self.templates),
            search_path: quoted_path_list(&self.search_path),
        })
    }

    /// The canonical location a write should use.
    ///
    /// An explicit file entry short-circuits. Otherwise each field of the
    /// location comes from the override layers when they pin down exactly
    /// one entry, falling back to the policy default for that field, and
    /// the result must be discoverable back through the merged lookup.
    ///
    /// # Errors
    /// `PubkeyError::Unreachable` when the location a write would use could
    /// never be found again by [`Self::selected_filename`].
    pub fn default_filename(&self) -> Result<PathBuf, PubkeyError> {
        if let Some(file) = &self.file {
            return Ok(file.clone());
        }

        let mut template = self.policy.file_template.as_str();
        if let Some(templates) = &self.overrides.templates
            && templates.len() == 1
        {
            template = &templates[0];
        }

        let mut dir = self.policy.search_dir.as_path();
        if let Some(search_path) = &self.overrides.search_path
            && search_path.len() == 1
        {
            dir = &search_path[0];
        }

        let basename = expand_template(template, &self.username);
        let pk_dir = canonicalize_path(dir, &self.root);

        if !self.search_path.contains(&pk_dir) || !self.templates.contains(&basename) {
            return Err(PubkeyError::Unreachable {
                location: format!("{}/{template}", dir.display()),
                templates: quoted_list(self.merged.templates.as_deref().unwrap_or_default()),
                search_path: quoted_path_list(
                    self.merged.search_path.as_deref().unwrap_or_default(),
                ),
            });
        }

        Ok(pk_dir.join(basename))
    }
}
