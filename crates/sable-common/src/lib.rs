//! Common types and utilities for the Sable semantic core.
//!
//! This crate provides foundational types used across all sable crates:
//! - Source spans (`TextSpan`)
//! - Diagnostics (`Diagnostic`, `DiagnosticBag`, code/message tables)
//! - Centralized limits and thresholds

// Span - source location tracking (byte offsets)
pub mod span;
pub use span::TextSpan;

// Diagnostics - structured records consumed by the excluded reporting layer
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticCategory};

// Centralized limits and thresholds
pub mod limits;
