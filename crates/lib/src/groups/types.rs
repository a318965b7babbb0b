//! Typed views over the groups document.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::content::Document;

/// One group record. Members are kept as a set; duplicates in the stored
/// list are collapsed on parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGroup {
    /// Untyped remainder of the record, carried through verbatim.
    pub plain: Document,
    pub name: String,
    pub members: BTreeSet<String>,
}

impl RawGroup {
    /// A freshly added group with no members yet.
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// The whole groups document, typed fields split out, record order kept.
#[derive(Debug, Clone, Default)]
pub struct RawGroups {
    /// Untyped remainder of the document root.
    pub plain: Document,
    pub groups: IndexMap<String, RawGroup>,
}
