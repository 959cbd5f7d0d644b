//! Tag scanning over cell source text.
//!
//! # Responsibility
//! - Classify cells by their `#code` / `#property` marker lines.
//! - Own every regex used against notebook source.

pub mod tag;
