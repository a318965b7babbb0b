//! Persistence of device users documents.
//!
//! Unlike users and groups, a store holds several of these documents, one
//! per authorization scope, so the file handle is built from a prepared
//! path rather than from the layout directly.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{info, warn};

use crate::content::{
    self, Document, FileFormat, duplicate_items, opt_map_field, opt_str_list_field,
    set_or_remove_key, value_type_name,
};

use super::errors::AuthError;
use super::types::{RawAuth, RawDeviceUser};

pub(crate) const KEY_DEVICE_USERS: &str = "device-users";
const FIELD_GROUPS: &str = "ssh-groups";
const FIELD_USERS: &str = "ssh-users";

fn parse_device_user(name: &str, plain: &Document) -> Result<RawDeviceUser, String> {
    let groups = opt_str_list_field(plain, FIELD_GROUPS)?.unwrap_or_default();
    let users = opt_str_list_field(plain, FIELD_USERS)?.unwrap_or_default();

    let dups = duplicate_items(&groups);
    if !dups.is_empty() {
        warn!(
            "Device user '{name}' contains duplicate groups: {{{}}}",
            dups.join(", ")
        );
    }
    let dups = duplicate_items(&users);
    if !dups.is_empty() {
        warn!(
            "Device user '{name}' contains duplicate users: {{{}}}",
            dups.join(", ")
        );
    }

    Ok(RawDeviceUser {
        plain: plain.clone(),
        name: name.to_string(),
        groups: groups.into_iter().collect(),
        users: users.into_iter().collect(),
    })
}

pub(crate) fn parse_auth(plain: &Document) -> Result<RawAuth, String> {
    let mut device_users = IndexMap::new();
    if let Some(plain_device_users) = opt_map_field(plain, KEY_DEVICE_USERS)? {
        for (name, value) in plain_device_users {
            let Value::Object(du_plain) = value else {
                return Err(format!(
                    "'{KEY_DEVICE_USERS}' entry '{name}' not in expected type set {{object}} \
                     but instead was found to be of type '{}'",
                    value_type_name(value)
                ));
            };
            device_users.insert(name.clone(), parse_device_user(name, du_plain)?);
        }
    }

    Ok(RawAuth {
        plain: plain.clone(),
        device_users,
    })
}

fn dump_device_user(du: &RawDeviceUser) -> Document {
    let mut out = du.plain.clone();

    // Sets serialize sorted; an empty grant list is dropped entirely.
    let groups: Vec<Value> = du.groups.iter().map(|g| Value::String(g.clone())).collect();
    set_or_remove_key(
        &mut out,
        FIELD_GROUPS,
        (!groups.is_empty()).then_some(Value::Array(groups)),
    );
    let users: Vec<Value> = du.users.iter().map(|u| Value::String(u.clone())).collect();
    set_or_remove_key(
        &mut out,
        FIELD_USERS,
        (!users.is_empty()).then_some(Value::Array(users)),
    );
    out
}

pub(crate) fn dump_auth(raw: &RawAuth) -> Document {
    let mut out = raw.plain.clone();

    let mut out_device_users = Document::new();
    for (key, du) in &raw.device_users {
        // Records are keyed by their in-record name.
        if key != &du.name {
            info!("Device user '{key}' renamed to '{}'", du.name);
        }
        out_device_users.insert(du.name.clone(), Value::Object(dump_device_user(du)));
    }

    // The device users container stays even when empty; it cues the
    // document kind.
    out.insert(KEY_DEVICE_USERS.to_string(), Value::Object(out_device_users));
    out
}

/// One device users document of one store.
#[derive(Debug, Clone)]
pub(crate) struct AuthFile {
    filename: PathBuf,
    format: FileFormat,
}

impl AuthFile {
    pub(crate) fn at(filename: PathBuf, format: FileFormat) -> Self {
        Self { filename, format }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.filename
    }

    pub(crate) fn load(&self) -> Result<RawAuth, AuthError> {
        let plain =
            content::load_document(&self.filename, self.format).map_err(AuthError::from_content)?;
        parse_auth(&plain).map_err(|reason| self.format_err(reason))
    }

    /// Load, treating a missing file as an empty document when allowed.
    pub(crate) fn load_or_empty(&self, allow_missing: bool) -> Result<RawAuth, AuthError> {
        match self.load() {
            Err(e) if allow_missing && e.is_missing_file() => Ok(RawAuth::default()),
            other => other,
        }
    }

    pub(crate) fn dump(&self, raw: &RawAuth) -> Result<(), AuthError> {
        let plain = dump_auth(raw);
        content::dump_document(&plain, &self.filename, self.format, true)
            .map_err(AuthError::from_content)
    }

    fn format_err(&self, reason: String) -> AuthError {
        AuthError::Format {
            path: self.filename.clone(),
            reason,
        }
    }
}
