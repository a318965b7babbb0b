//! Typed views over a device users document.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::content::Document;

/// One device user record. Grants are kept as sets; duplicates in the
/// stored lists are collapsed on parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDeviceUser {
    /// Untyped remainder of the record, carried through verbatim.
    pub plain: Document,
    pub name: String,
    /// Ids of groups whose members may log in as this device user.
    pub groups: BTreeSet<String>,
    /// Ids of users who may log in as this device user.
    pub users: BTreeSet<String>,
}

impl RawDeviceUser {
    /// A freshly added device user with no grants yet.
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One whole device users document, typed fields split out, record order kept.
#[derive(Debug, Clone, Default)]
pub struct RawAuth {
    /// Untyped remainder of the document root.
    pub plain: Document,
    pub device_users: IndexMap<String, RawDeviceUser>,
}
