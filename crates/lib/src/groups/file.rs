//! Persistence of the groups document.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{info, warn};

use crate::content::{
    self, Document, FileFormat, duplicate_items, opt_map_field, opt_str_list_field,
    set_or_remove_key, value_type_name,
};
use crate::layout::StoreLayout;
use crate::policy::StorePolicy;

use super::errors::GroupsError;
use super::types::{RawGroup, RawGroups};

pub(crate) const KEY_GROUPS: &str = "ssh-groups";
const FIELD_MEMBERS: &str = "members";

fn parse_group(name: &str, plain: &Document) -> Result<RawGroup, String> {
    let members = opt_str_list_field(plain, FIELD_MEMBERS)?.unwrap_or_default();

    let dups = duplicate_items(&members);
    if !dups.is_empty() {
        warn!(
            "Group '{name}' contains duplicate members: {{{}}}",
            dups.join(", ")
        );
    }

    Ok(RawGroup {
        plain: plain.clone(),
        name: name.to_string(),
        members: members.into_iter().collect(),
    })
}

pub(crate) fn parse_groups(plain: &Document) -> Result<RawGroups, String> {
    let mut groups = IndexMap::new();
    if let Some(plain_groups) = opt_map_field(plain, KEY_GROUPS)? {
        for (name, value) in plain_groups {
            let Value::Object(group_plain) = value else {
                return Err(format!(
                    "'{KEY_GROUPS}' entry '{name}' not in expected type set {{object}} \
                     but instead was found to be of type '{}'",
                    value_type_name(value)
                ));
            };
            groups.insert(name.clone(), parse_group(name, group_plain)?);
        }
    }

    Ok(RawGroups {
        plain: plain.clone(),
        groups,
    })
}

fn dump_group(group: &RawGroup) -> Document {
    let mut out = group.plain.clone();

    // Sets serialize sorted; an empty members list is dropped entirely.
    let members: Vec<Value> = group
        .members
        .iter()
        .map(|m| Value::String(m.clone()))
        .collect();
    set_or_remove_key(
        &mut out,
        FIELD_MEMBERS,
        (!members.is_empty()).then_some(Value::Array(members)),
    );
    out
}

pub(crate) fn dump_groups(raw: &RawGroups) -> Document {
    let mut out = raw.plain.clone();

    let mut out_groups = Document::new();
    for (key, group) in &raw.groups {
        // Records are keyed by their in-record name.
        if key != &group.name {
            info!("Group '{key}' renamed to '{}'", group.name);
        }
        out_groups.insert(group.name.clone(), Value::Object(dump_group(group)));
    }

    // The groups container stays even when empty; it cues the document kind.
    out.insert(KEY_GROUPS.to_string(), Value::Object(out_groups));
    out
}

/// The groups document file of one store.
#[derive(Debug, Clone)]
pub(crate) struct GroupsFile {
    filename: PathBuf,
    format: FileFormat,
}

impl GroupsFile {
    pub(crate) fn new(root: &Path, layout: &StoreLayout, policy: &StorePolicy) -> Self {
        Self {
            filename: layout.groups_file(root, policy.file_format),
            format: policy.file_format,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.filename
    }

    pub(crate) fn load(&self) -> Result<RawGroups, GroupsError> {
        let plain = content::load_document(&self.filename, self.format)
            .map_err(GroupsError::from_content)?;
        parse_groups(&plain).map_err(|reason| self.format_err(reason))
    }

    /// Load, treating a missing file as an empty document when allowed.
    pub(crate) fn load_or_empty(&self, allow_missing: bool) -> Result<RawGroups, GroupsError> {
        match self.load() {
            Err(e) if allow_missing && e.is_missing_file() => Ok(RawGroups::default()),
            other => other,
        }
    }

    pub(crate) fn dump(&self, raw: &RawGroups) -> Result<(), GroupsError> {
        let plain = dump_groups(raw);
        content::dump_document(&plain, &self.filename, self.format, true)
            .map_err(GroupsError::from_content)
    }

    fn format_err(&self, reason: String) -> GroupsError {
        GroupsError::Format {
            path: self.filename.clone(),
            reason,
        }
    }
}
