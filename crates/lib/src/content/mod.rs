//! Ordered document persistence.
//!
//! Every file managed by this crate is a *document*: a string-keyed mapping
//! whose key order is part of the data. Documents load into
//! [`serde_json::Map`] (built with `preserve_order`) regardless of the
//! on-disk format, so a load → dump cycle leaves key order and unknown
//! fields untouched.

mod errors;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

pub use errors::ContentError;

/// An ordered string-keyed document, the unit of persistence.
pub type Document = serde_json::Map<String, Value>;

/// On-disk encoding for documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Pretty-printed JSON with 2-space indentation (the default).
    #[default]
    Json,
    /// YAML with document key order preserved.
    Yaml,
}

impl FileFormat {
    /// The file extension used by this format, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Json => "json",
            FileFormat::Yaml => "yaml",
        }
    }

    /// Build the document filename for a stem inside `dir`.
    pub fn target_filename(&self, dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{stem}.{}", self.extension()))
    }

    /// Check whether `path` carries this format's extension.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(self.extension())
    }
}

fn access_err(path: &Path, source: std::io::Error) -> ContentError {
    ContentError::Access {
        path: path.to_path_buf(),
        source,
    }
}

fn format_err(path: &Path, reason: impl Into<String>) -> ContentError {
    ContentError::Format {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Load a document from `path`, decoding per `format`.
///
/// # Errors
/// `ContentError::Access` when the file cannot be read, `ContentError::Format`
/// when it does not decode to a mapping at the root.
pub fn load_document(path: &Path, format: FileFormat) -> Result<Document, ContentError> {
    let text = fs::read_to_string(path).map_err(|source| access_err(path, source))?;

    let value: Value = match format {
        FileFormat::Json => serde_json::from_str(&text)
            .map_err(|e| format_err(path, format!("not a valid json file: {e}")))?,
        FileFormat::Yaml => serde_yaml::from_str(&text)
            .map_err(|e| format_err(path, format!("not a valid yaml file: {e}")))?,
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(format_err(
            path,
            format!(
                "document root not in expected type set {{object}} but instead was \
                 found to be of type '{}'",
                value_type_name(&other)
            ),
        )),
    }
}

/// Store a document to `path`, encoding per `format`.
///
/// The write goes through a sibling temporary file followed by a rename, so
/// a crash mid-write never leaves a truncated document behind. Parent
/// directories are created first when `mk_parent_dirs` is set.
pub fn dump_document(
    doc: &Document,
    path: &Path,
    format: FileFormat,
    mk_parent_dirs: bool,
) -> Result<(), ContentError> {
    if mk_parent_dirs
        && let Some(parent) = path.parent()
    {
        fs::create_dir_all(parent).map_err(|source| access_err(parent, source))?;
    }

    let mut text = match format {
        FileFormat::Json => serde_json::to_string_pretty(doc)
            .map_err(|e| format_err(path, format!("json encoding failed: {e}")))?,
        FileFormat::Yaml => serde_yaml::to_string(doc)
            .map_err(|e| format_err(path, format!("yaml encoding failed: {e}")))?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }

    write_atomic(path, text.as_bytes()).map_err(|source| access_err(path, source))
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&tmp, path)
}

/// JSON type name of a value, as used in type-mismatch messages.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn field_type_mismatch(field: &str, expected: &str, found: &Value) -> String {
    format!(
        "'{field}' field not in expected type set {{{expected}}} but instead was \
         found to be of type '{}'",
        value_type_name(found)
    )
}

/// Fetch an optional string field. Absent fields and explicit nulls are `None`.
pub(crate) fn opt_str_field(map: &Document, field: &str) -> Result<Option<String>, String> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(field_type_mismatch(field, "string", other)),
    }
}

/// Fetch an optional string-list field.
///
/// A bare string is promoted to a single-element list; every list element
/// must be a string.
pub(crate) fn opt_str_list_field(
    map: &Document,
    field: &str,
) -> Result<Option<Vec<String>>, String> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    other => {
                        return Err(format!(
                            "'{field}' list field at index {idx} not in expected type set \
                             {{string}} but instead was found to be of type '{}'",
                            value_type_name(other)
                        ));
                    }
                }
            }
            Ok(Some(out))
        }
        Some(other) => Err(field_type_mismatch(field, "string, array", other)),
    }
}

/// Fetch an optional mapping field. Absent fields and explicit nulls are `None`.
pub(crate) fn opt_map_field<'a>(
    map: &'a Document,
    field: &str,
) -> Result<Option<&'a Document>, String> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(inner)) => Ok(Some(inner)),
        Some(other) => Err(field_type_mismatch(field, "object", other)),
    }
}

/// Insert `key` when `value` is `Some`, otherwise drop any stale occurrence.
///
/// Insertion through an existing key keeps its document position; removal
/// shifts later keys up rather than swapping, so order stays intact.
pub(crate) fn set_or_remove_key(doc: &mut Document, key: &str, value: Option<Value>) {
    match value {
        Some(value) => {
            doc.insert(key.to_string(), value);
        }
        None => {
            doc.shift_remove(key);
        }
    }
}

/// Items occurring more than once, in first-occurrence order.
pub(crate) fn duplicate_items(items: &[String]) -> Vec<String> {
    let mut counts: indexmap::IndexMap<&str, usize> = indexmap::IndexMap::new();
    for item in items {
        *counts.entry(item.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(item, _)| item.to_string())
        .collect()
}
