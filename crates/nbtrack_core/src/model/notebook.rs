//! Notebook document model.
//!
//! # Responsibility
//! - Deserialize Jupyter ipynb JSON into an ordered cell sequence.
//! - Normalize the two on-disk source encodings (string vs line list).
//!
//! # Invariants
//! - `Notebook::cells` preserves document order.
//! - Only `CellKind::Code` cells participate in tag scanning.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Result type for notebook reading.
pub type NotebookResult<T> = Result<T, NotebookError>;

/// Error reading or decoding a notebook document.
#[derive(Debug)]
pub enum NotebookError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
}

impl Display for NotebookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read notebook `{}`: {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "invalid notebook JSON in `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for NotebookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

/// Discriminator for the three nbformat cell flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Code,
    Markdown,
    Raw,
}

/// One notebook cell with its source text joined into a single string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Serialized as `cell_type` to match nbformat naming.
    #[serde(rename = "cell_type")]
    pub kind: CellKind,
    /// Full cell body. nbformat may store this as a list of line strings;
    /// both encodings deserialize to the joined text.
    #[serde(deserialize_with = "joined_source", default)]
    pub source: String,
}

impl Cell {
    /// Creates a code cell from source text.
    pub fn code(source: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Code,
            source: source.into(),
        }
    }
}

/// Ordered cell sequence parsed from an ipynb document.
///
/// Only the fields this system reads are modeled; the rest of the nbformat
/// envelope (metadata, nbformat version) is ignored on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl Notebook {
    /// Iterates code cells in document order.
    pub fn code_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|cell| cell.kind == CellKind::Code)
    }
}

/// Reads and decodes a notebook document from disk.
///
/// # Errors
/// - `NotebookError::Io` when the file cannot be read.
/// - `NotebookError::Json` when the document is not valid ipynb JSON.
pub fn read_notebook(path: &Path) -> NotebookResult<Notebook> {
    let text = fs::read_to_string(path).map_err(|source| NotebookError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| NotebookError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn joined_source<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SourceRepr {
        Text(String),
        Lines(Vec<String>),
    }

    Ok(match SourceRepr::deserialize(deserializer)? {
        SourceRepr::Text(text) => text,
        SourceRepr::Lines(lines) => lines.concat(),
    })
}

#[cfg(test)]
mod tests {
    use super::{read_notebook, CellKind, Notebook, NotebookError};
    use std::io::Write;

    #[test]
    fn parses_source_given_as_line_list() {
        let doc = r##"{
            "cells": [
                {"cell_type": "code", "source": ["x = 1\n", "y = 2"]},
                {"cell_type": "markdown", "source": "# heading"}
            ],
            "nbformat": 4,
            "nbformat_minor": 5
        }"##;

        let notebook: Notebook = serde_json::from_str(doc).expect("valid notebook JSON");
        assert_eq!(notebook.cells.len(), 2);
        assert_eq!(notebook.cells[0].source, "x = 1\ny = 2");
        assert_eq!(notebook.cells[1].kind, CellKind::Markdown);
    }

    #[test]
    fn parses_source_given_as_plain_string() {
        let doc = r#"{"cells": [{"cell_type": "code", "source": "a = 3"}]}"#;
        let notebook: Notebook = serde_json::from_str(doc).expect("valid notebook JSON");
        assert_eq!(notebook.cells[0].source, "a = 3");
    }

    #[test]
    fn code_cells_skips_markdown_and_raw() {
        let doc = r#"{"cells": [
            {"cell_type": "markdown", "source": "intro"},
            {"cell_type": "code", "source": "b = 1"},
            {"cell_type": "raw", "source": "raw body"}
        ]}"#;
        let notebook: Notebook = serde_json::from_str(doc).expect("valid notebook JSON");
        let sources: Vec<&str> = notebook.code_cells().map(|c| c.source.as_str()).collect();
        assert_eq!(sources, vec!["b = 1"]);
    }

    #[test]
    fn read_notebook_reports_missing_file_as_io_error() {
        let missing = std::env::temp_dir().join("nbtrack-no-such-notebook.ipynb");
        let err = read_notebook(&missing).expect_err("missing file must fail");
        assert!(matches!(err, NotebookError::Io { .. }));
    }

    #[test]
    fn read_notebook_reports_bad_json_as_json_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json at all").expect("write temp file");
        let err = read_notebook(file.path()).expect_err("bad JSON must fail");
        assert!(matches!(err, NotebookError::Json { .. }));
    }
}
