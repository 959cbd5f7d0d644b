//! Code collection over tagged cells.
//!
//! # Responsibility
//! - Build the output-target to source-text map for one notebook.
//!
//! # Invariants
//! - The default target is always present, empty when nothing matched it.
//! - Concatenation order within a target matches cell order in the document.
//! - Marker lines are not part of the exported source.

use crate::model::notebook::Notebook;
use crate::scan::tag::{code_tag_span, code_target};
use indexmap::IndexMap;

/// Mapping from output file name to accumulated source text.
pub type CodeMap = IndexMap<String, String>;

/// Collects tagged code cells into an insertion-ordered code map.
///
/// Every code cell carrying a `#code` marker contributes its source (minus
/// the marker line) to the entry named by the marker, or to `default` for
/// the bare form. Cells without a marker are skipped.
pub fn collect_code(notebook: &Notebook, default: &str) -> CodeMap {
    let mut code_map = CodeMap::new();
    code_map.insert(default.to_string(), String::new());

    for cell in notebook.code_cells() {
        let Some(target) = code_target(&cell.source, default) else {
            continue;
        };
        let body = exported_body(&cell.source);
        code_map
            .entry(target)
            .or_insert_with(String::new)
            .push_str(&body);
    }

    code_map
}

/// Cell source with its classifying marker line removed.
fn exported_body(source: &str) -> String {
    match code_tag_span(source) {
        Some((start, end)) => {
            let mut body = String::with_capacity(source.len() - (end - start));
            body.push_str(&source[..start]);
            body.push_str(&source[end..]);
            body
        }
        None => source.to_string(),
    }
}
