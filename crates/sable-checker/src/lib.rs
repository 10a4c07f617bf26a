//! Semantic binding and analysis.
//!
//! The checker turns syntax into the bound tree: expression and
//! statement binding against a binder chain, invocation and constructor
//! resolution, conversion materialization with constant folding,
//! interpolated-string lowering, attribute binding to metadata
//! constants, pattern compilation with redundancy checking, and
//! ref-safety analysis over bound member bodies. Everything reports
//! into a per-run `CheckerContext` and always produces a best-effort
//! tree; error recovery is a property of every entry point, not a mode.

pub mod attributes;
pub mod bound;
pub mod calls;
pub mod context;
pub mod conversions;
pub mod expr;
pub mod interpolation;
pub mod patterns;
pub mod ref_safety;
pub mod stmt;

#[cfg(test)]
mod testing;

pub use attributes::bind_attribute;
pub use bound::{
    AttributeData, BoundAttribute, BoundExpr, BoundExprKind, BoundPattern, BoundPatternKind,
    BoundStatement, BoundStatementKind, TypedConstant,
};
pub use calls::{BoundArgument, bind_invocation};
pub use context::CheckerContext;
pub use conversions::{coerce, coerce_explicit, convert_method_group};
pub use expr::bind_expression;
pub use interpolation::bind_interpolated_string;
pub use patterns::{PatternCase, bind_pattern, check_cases, check_is_pattern};
pub use ref_safety::{SafeContext, analyze_member};
pub use stmt::bind_statement;
