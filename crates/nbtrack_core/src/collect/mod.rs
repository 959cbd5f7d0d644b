//! Aggregation of tagged cells into code and property maps.
//!
//! # Responsibility
//! - Group `#code` cell source by output target.
//! - Resolve `#property` cell bindings against a caller-supplied namespace.
//!
//! # Invariants
//! - Both collectors are pure; file I/O belongs to the run orchestrator.
//! - Output maps preserve insertion order.

pub mod code;
pub mod property;
