//! Cell tag detection.
//!
//! # Responsibility
//! - Detect `#code`, `#code dotted.module`, and `#property` marker lines.
//! - Resolve the output target a tagged cell belongs to.
//!
//! # Invariants
//! - Matching is line-anchored, case-insensitive, and whitespace-tolerant.
//! - A marker line with trailing non-whitespace after the identifier never
//!   matches.
//! - When a cell carries several marker lines, only the first one counts.

use once_cell::sync::Lazy;
use regex::Regex;

// `(?im)`: case-insensitive, with `^`/`$` anchored per line.
static BARE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*#\s*code\s*$").expect("valid bare code tag regex"));
static MODULE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*#\s*code\s+(\S+)\s*$").expect("valid module code tag regex"));
static PROPERTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*#\s*property\s*$").expect("valid property tag regex"));

/// Resolves the output target of a cell, if it is tagged for code export.
///
/// A bare `#code` line maps to `default`. A `#code some.module` line maps to
/// the identifier after separator normalization. Untagged cells map to
/// `None`.
pub fn code_target(source: &str, default: &str) -> Option<String> {
    if BARE_CODE_RE.is_match(source) {
        return Some(default.to_string());
    }
    MODULE_CODE_RE
        .captures(source)
        .map(|caps| normalize_module_path(&caps[1]))
}

/// Returns the byte range of the marker line that classified this cell.
///
/// Used by the code collector to drop the marker from exported source.
/// Mirrors [`code_target`] precedence: the bare form wins over the module
/// form when both are present.
pub fn code_tag_span(source: &str) -> Option<(usize, usize)> {
    let m = BARE_CODE_RE
        .find(source)
        .or_else(|| MODULE_CODE_RE.find(source))?;
    // The match stops at end-of-line; swallow the newline itself so the
    // remaining lines join cleanly.
    let mut end = m.end();
    if source[end..].starts_with('\n') {
        end += 1;
    }
    Some((m.start(), end))
}

/// Returns whether the cell carries a `#property` marker line.
pub fn is_property(source: &str) -> bool {
    PROPERTY_RE.is_match(source)
}

/// Normalizes a dotted module identifier.
///
/// Dots are mapped to the OS path separator, then any path separators in
/// the result are folded back to dots. For a plain dotted path this is the
/// identity; identifiers written with `/` or `\` come out dotted.
fn normalize_module_path(raw: &str) -> String {
    let joined = raw
        .split('.')
        .collect::<Vec<_>>()
        .join(std::path::MAIN_SEPARATOR_STR);
    joined.replace(['\\', '/'], ".")
}
