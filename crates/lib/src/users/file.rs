//! Persistence of the users document.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::info;

use crate::content::{
    self, Document, FileFormat, opt_map_field, opt_str_field, opt_str_list_field,
    set_or_remove_key, value_type_name,
};
use crate::layout::StoreLayout;
use crate::policy::StorePolicy;

use super::errors::UsersError;
use super::types::{RawUser, RawUserDefaults, RawUsers};

pub(crate) const KEY_USERS: &str = "ssh-users";
pub(crate) const KEY_USER_DEFAULTS: &str = "ssh-user-defaults";
const FIELD_TEMPLATE: &str = "pubkey-file-template";
const FIELD_SEARCH_PATH: &str = "pubkey-file-search-path";
const FIELD_FILE: &str = "pubkey-file";

fn parse_defaults(plain: &Document) -> Result<RawUserDefaults, String> {
    let templates = opt_str_list_field(plain, FIELD_TEMPLATE)?;
    let search_path = opt_str_list_field(plain, FIELD_SEARCH_PATH)?
        .map(|sps| sps.into_iter().map(PathBuf::from).collect());

    Ok(RawUserDefaults {
        plain: plain.clone(),
        templates,
        search_path,
    })
}

fn parse_user(name: &str, plain: &Document) -> Result<RawUser, String> {
    let templates = opt_str_list_field(plain, FIELD_TEMPLATE)?;
    let search_path = opt_str_list_field(plain, FIELD_SEARCH_PATH)?
        .map(|sps| sps.into_iter().map(PathBuf::from).collect());
    let file = opt_str_field(plain, FIELD_FILE)?.map(PathBuf::from);

    Ok(RawUser {
        plain: plain.clone(),
        name: name.to_string(),
        templates,
        search_path,
        file,
    })
}

pub(crate) fn parse_users(plain: &Document) -> Result<RawUsers, String> {
    let defaults = match opt_map_field(plain, KEY_USER_DEFAULTS)? {
        Some(map) => Some(parse_defaults(map)?),
        None => None,
    };

    let mut users = IndexMap::new();
    if let Some(plain_users) = opt_map_field(plain, KEY_USERS)? {
        for (name, value) in plain_users {
            let Value::Object(user_plain) = value else {
                return Err(format!(
                    "'{KEY_USERS}' entry '{name}' not in expected type set {{object}} \
                     but instead was found to be of type '{}'",
                    value_type_name(value)
                ));
            };
            users.insert(name.clone(), parse_user(name, user_plain)?);
        }
    }

    Ok(RawUsers {
        plain: plain.clone(),
        defaults,
        users,
    })
}

fn string_list(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::String(s.clone())).collect())
}

fn path_list(paths: &[PathBuf]) -> Value {
    Value::Array(
        paths
            .iter()
            .map(|p| Value::String(p.display().to_string()))
            .collect(),
    )
}

fn dump_defaults(defaults: &RawUserDefaults) -> Document {
    let mut out = defaults.plain.clone();
    set_or_remove_key(
        &mut out,
        FIELD_TEMPLATE,
        defaults.templates.as_deref().map(string_list),
    );
    set_or_remove_key(
        &mut out,
        FIELD_SEARCH_PATH,
        defaults.search_path.as_deref().map(path_list),
    );
    out
}

fn dump_user(user: &RawUser) -> Document {
    let mut out = user.plain.clone();
    set_or_remove_key(
        &mut out,
        FIELD_FILE,
        user.file
            .as_deref()
            .map(|f| Value::String(f.display().to_string())),
    );
    set_or_remove_key(
        &mut out,
        FIELD_TEMPLATE,
        user.templates.as_deref().map(string_list),
    );
    set_or_remove_key(
        &mut out,
        FIELD_SEARCH_PATH,
        user.search_path.as_deref().map(path_list),
    );
    out
}

pub(crate) fn dump_users(raw: &RawUsers) -> Document {
    let mut out = raw.plain.clone();
    set_or_remove_key(
        &mut out,
        KEY_USER_DEFAULTS,
        raw.defaults
            .as_ref()
            .map(|d| Value::Object(dump_defaults(d))),
    );

    let mut out_users = Document::new();
    for (key, user) in &raw.users {
        // Records are keyed by their in-record name.
        if key != &user.name {
            info!("User '{key}' renamed to '{}'", user.name);
        }
        out_users.insert(user.name.clone(), Value::Object(dump_user(user)));
    }

    // The users container stays even when empty; it cues the document kind.
    out.insert(KEY_USERS.to_string(), Value::Object(out_users));
    out
}

/// The users document file of one store.
#[derive(Debug, Clone)]
pub(crate) struct UsersFile {
    filename: PathBuf,
    format: FileFormat,
}

impl UsersFile {
    pub(crate) fn new(root: &Path, layout: &StoreLayout, policy: &StorePolicy) -> Self {
        Self {
            filename: layout.users_file(root, policy.file_format),
            format: policy.file_format,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.filename
    }

    pub(crate) fn load(&self) -> Result<RawUsers, UsersError> {
        let plain =
            content::load_document(&self.filename, self.format).map_err(UsersError::from_content)?;
        parse_users(&plain).map_err(|reason| self.format_err(reason))
    }

    /// Load, treating a missing file as an empty document when allowed.
    /// Any other trouble, unreadable or malformed alike, still propagates.
    pub(crate) fn load_or_empty(&self, allow_missing: bool) -> Result<RawUsers, UsersError> {
        match self.load() {
            Err(e) if allow_missing && e.is_missing_file() => Ok(RawUsers::default()),
            other => other,
        }
    }

    pub(crate) fn dump(&self, raw: &RawUsers) -> Result<(), UsersError> {
        let plain = dump_users(raw);
        content::dump_document(&plain, &self.filename, self.format, true)
            .map_err(UsersError::from_content)
    }

    fn format_err(&self, reason: String) -> UsersError {
        UsersError::Format {
            path: self.filename.clone(),
            reason,
        }
    }
}
