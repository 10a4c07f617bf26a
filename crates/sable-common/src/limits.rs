//! Centralized limits and thresholds for the semantic core.
//!
//! This module provides shared constants for recursion depths and
//! operation counts used throughout the codebase. Centralizing these
//! values prevents duplicate definitions with inconsistent values and
//! documents the rationale for each limit.

// =============================================================================
// Recursion Depth Limits
// =============================================================================
// These prevent stack overflow in deeply nested patterns or expressions.
// Exceeding a limit is reported as a diagnostic and the analysis for that
// construct is abandoned; it is never allowed to crash the process.

/// Maximum depth for pattern normalization and decision-DAG construction.
///
/// Pattern depth is user-controlled (`a and (b and (c and ...))`), so the
/// normalizer carries an explicit budget and degrades to a
/// "pattern too deep" diagnostic at this depth.
pub const MAX_PATTERN_DEPTH: usize = 400;

/// Maximum depth for expression binding recursion.
pub const MAX_EXPR_BIND_DEPTH: usize = 500;

/// Minimum remaining native stack, in bytes, below which deep recursive
/// walks bail out even before reaching their depth budget. Checked via
/// `stacker::remaining_stack()` at recursion entry points.
pub const MIN_REMAINING_STACK_BYTES: usize = 128 * 1024;

// =============================================================================
// Operation Count Limits
// =============================================================================

/// Maximum iterations for parent-pointer tree walks.
///
/// Parent chains are acyclic by construction; this guard turns a corrupted
/// arena into a clean bail-out instead of a hang.
pub const MAX_TREE_WALK_ITERATIONS: usize = 10_000;

/// Maximum number of binder layers a single chain may contain.
///
/// Chains grow one layer per enclosing scope; real code stays well under
/// a hundred. The guard bounds the damage of a factory bug.
pub const MAX_BINDER_CHAIN_LENGTH: usize = 1_000;
