//! Domain model for notebook documents.
//!
//! # Responsibility
//! - Define the canonical cell/notebook shapes consumed by scanning and
//!   collection logic.
//! - Keep ipynb JSON quirks (source-as-lines) behind one parsing boundary.
//!
//! # Invariants
//! - Cell order always matches document order.
//! - Only code cells participate in tag scanning.

pub mod notebook;
