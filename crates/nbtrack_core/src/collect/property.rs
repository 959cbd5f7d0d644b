//! Property collection over `#property` cells.
//!
//! # Responsibility
//! - Extract top-level assignment names from property cells.
//! - Resolve each name in the caller-supplied namespace.
//! - Surface which property values point at existing files.
//!
//! # Invariants
//! - A name missing from the namespace is a hard error, never skipped.
//! - Later property cells overwrite earlier bindings; first-seen order is
//!   preserved.
//! - Stringification is deterministic per value variant.

use crate::model::notebook::Notebook;
use crate::scan::tag::is_property;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

// Only zero-indented bindings count as properties; indented assignments
// belong to some nested scope.
static ASSIGN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([^=\s]+)\s*=").expect("valid assignment regex"));

/// Result type for property collection.
pub type PropertyResult<T> = Result<T, PropertyError>;

/// Error resolving property cell bindings.
#[derive(Debug)]
pub enum PropertyError {
    /// A property cell assigns a name the namespace does not define.
    Undefined { name: String },
}

impl Display for PropertyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined { name } => {
                write!(f, "property `{name}` is not defined in the namespace")
            }
        }
    }
}

impl Error for PropertyError {}

/// A property value captured from the caller's namespace.
///
/// The remote side only accepts text, so every variant carries an explicit
/// deterministic rendering via `Display`.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// A filesystem path; candidates for artifact upload when the file
    /// exists.
    FilePath(PathBuf),
    /// Any other serializable value, rendered as compact JSON.
    Json(serde_json::Value),
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::FilePath(path) => write!(f, "{}", path.display()),
            Self::Json(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<PathBuf> for PropertyValue {
    fn from(value: PathBuf) -> Self {
        Self::FilePath(value)
    }
}

/// Caller-supplied variable namespace.
///
/// The property mechanism never reaches into ambient state; callers pass
/// the bindings they want resolvable, explicitly.
pub type Namespace = HashMap<String, PropertyValue>;

/// Resolved properties in first-seen order.
pub type Properties = IndexMap<String, PropertyValue>;

/// Collects bindings from every `#property` cell in the notebook.
///
/// # Errors
/// - `PropertyError::Undefined` when an assigned name is absent from
///   `namespace`. The namespace contract is the caller's to satisfy.
pub fn collect_properties(
    notebook: &Notebook,
    namespace: &Namespace,
) -> PropertyResult<Properties> {
    let mut properties = Properties::new();

    for cell in notebook.code_cells() {
        if !is_property(&cell.source) {
            continue;
        }
        for name in assignment_names(&cell.source) {
            let value = namespace
                .get(name)
                .cloned()
                .ok_or_else(|| PropertyError::Undefined {
                    name: name.to_string(),
                })?;
            properties.insert(name.to_string(), value);
        }
    }

    Ok(properties)
}

/// Returns every property value that is a path to an existing file, as
/// strings, in map iteration order.
pub fn files_in_properties(properties: &Properties) -> Vec<String> {
    properties
        .values()
        .filter_map(|value| match value {
            PropertyValue::FilePath(path) if path.is_file() => {
                Some(path.display().to_string())
            }
            _ => None,
        })
        .collect()
}

/// All zero-indented assignment targets in a cell, in source order.
fn assignment_names(source: &str) -> impl Iterator<Item = &str> {
    ASSIGN_RE
        .captures_iter(source)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()))
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{assignment_names, files_in_properties, Properties, PropertyValue};
    use std::path::PathBuf;

    #[test]
    fn assignment_names_finds_all_top_level_bindings() {
        let source = "#property\nepochs = 10\nlr=0.1\n    indented = 2\nname = \"run\"";
        let names: Vec<&str> = assignment_names(source).collect();
        assert_eq!(names, vec!["epochs", "lr", "name"]);
    }

    #[test]
    fn marker_line_is_not_an_assignment() {
        let names: Vec<&str> = assignment_names("#property\nz = 5").collect();
        assert_eq!(names, vec!["z"]);
    }

    #[test]
    fn stringification_is_deterministic_per_variant() {
        assert_eq!(PropertyValue::Text("run-1".into()).to_string(), "run-1");
        assert_eq!(PropertyValue::Int(42).to_string(), "42");
        assert_eq!(PropertyValue::Float(0.5).to_string(), "0.5");
        assert_eq!(PropertyValue::Bool(true).to_string(), "true");
        assert_eq!(
            PropertyValue::FilePath(PathBuf::from("data/train.csv")).to_string(),
            "data/train.csv"
        );
        assert_eq!(
            PropertyValue::Json(serde_json::json!({"b": 1, "a": 2})).to_string(),
            r#"{"a":2,"b":1}"#
        );
    }

    #[test]
    fn files_in_properties_excludes_missing_paths() {
        let existing = tempfile::NamedTempFile::new().expect("temp file");
        let mut properties = Properties::new();
        properties.insert("epochs".into(), PropertyValue::Int(3));
        properties.insert(
            "dataset".into(),
            PropertyValue::FilePath(existing.path().to_path_buf()),
        );
        properties.insert(
            "missing".into(),
            PropertyValue::FilePath(PathBuf::from("/nonexistent/nbtrack/file.bin")),
        );

        let files = files_in_properties(&properties);
        assert_eq!(files, vec![existing.path().display().to_string()]);
    }
}
