//! Typed views over the users document.
//!
//! Records keep their untyped remainder in `plain` so that fields this
//! crate does not understand survive a read-modify-write cycle.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::content::Document;
use crate::pubkey::PubkeyLookup;

/// Store-wide pubkey lookup defaults, the middle layer of the lookup merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawUserDefaults {
    /// Untyped remainder of the record, carried through verbatim.
    pub plain: Document,
    pub templates: Option<Vec<String>>,
    pub search_path: Option<Vec<PathBuf>>,
}

impl RawUserDefaults {
    /// The defaults expressed as a lookup layer. Never pins an exact file.
    pub fn lookup(&self) -> PubkeyLookup {
        PubkeyLookup {
            templates: self.templates.clone(),
            search_path: self.search_path.clone(),
            file: None,
        }
    }
}

/// One user record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawUser {
    /// Untyped remainder of the record, carried through verbatim.
    pub plain: Document,
    pub name: String,
    pub templates: Option<Vec<String>>,
    pub search_path: Option<Vec<PathBuf>>,
    pub file: Option<PathBuf>,
}

impl RawUser {
    /// A freshly added user with no typed fields yet.
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The record's own lookup layer, the topmost of the merge.
    pub fn lookup(&self) -> PubkeyLookup {
        PubkeyLookup {
            templates: self.templates.clone(),
            search_path: self.search_path.clone(),
            file: self.file.clone(),
        }
    }
}

/// The whole users document, typed fields split out, record order kept.
#[derive(Debug, Clone, Default)]
pub struct RawUsers {
    /// Untyped remainder of the document root.
    pub plain: Document,
    pub defaults: Option<RawUserDefaults>,
    pub users: IndexMap<String, RawUser>,
}
