//! Pattern matching semantics.
//!
//! `bind` turns syntax patterns into typed `BoundPattern` trees,
//! `normalize` rewrites them into conjunction/disjunction normal form,
//! `dag` compiles case lists into a shared decision DAG, and
//! `redundancy` reports disjuncts and switch cases that can never match.

mod bind;
mod dag;
mod normalize;
mod redundancy;

pub use bind::bind_pattern;
pub use redundancy::{check_cases, check_is_pattern};

use sable_common::TextSpan;

use crate::bound::BoundPattern;

/// One arm of a pattern switch, in source order.
pub struct PatternCase<'a> {
    pub pattern: &'a BoundPattern,
    pub has_guard: bool,
    pub span: TextSpan,
}
