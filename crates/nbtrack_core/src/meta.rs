//! Host environment metadata.
//!
//! # Responsibility
//! - Describe the machine a run executed on, as a fixed key set.
//!
//! # Invariants
//! - Exactly four keys, always present: `os`, `system`, `release`,
//!   `rust_version`.

use indexmap::IndexMap;
use sysinfo::System;

const UNKNOWN: &str = "unknown";

/// Returns descriptive metadata about the current host, computed fresh on
/// every call.
///
/// Platform queries that return nothing fall back to stable placeholders so
/// the key set never shrinks.
pub fn environment_metadata() -> IndexMap<String, String> {
    let mut data = IndexMap::new();
    data.insert("os".to_string(), std::env::consts::FAMILY.to_string());
    data.insert(
        "system".to_string(),
        System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
    );
    data.insert(
        "release".to_string(),
        System::kernel_version().unwrap_or_else(|| UNKNOWN.to_string()),
    );
    data.insert(
        "rust_version".to_string(),
        env!("CARGO_PKG_RUST_VERSION").to_string(),
    );
    data
}
