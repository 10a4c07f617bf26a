//! Diagnostic types and message lookup for the semantic core.
//!
//! This core never formats human-readable output itself; it appends
//! structured `Diagnostic` records to a `DiagnosticBag` and leaves
//! rendering to the excluded reporting layer. Message templates live in
//! `data.rs` keyed by code.

use serde::Serialize;

use crate::span::TextSpan;

// Diagnostic codes, categories, and message templates
pub mod data;
pub use data::{DIAGNOSTIC_MESSAGES, diagnostic_codes};

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
///
/// `Hidden` diagnostics are produced but not surfaced by default; the
/// pattern-redundancy checker uses them for detections that do not meet
/// the warning-escalation heuristic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DiagnosticCategory {
    Hidden = 0,
    Message = 1,
    Suggestion = 2,
    Warning = 3,
    Error = 4,
}

/// A message template in the static diagnostic table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Related information for a diagnostic (e.g. "see also" locations).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub span: TextSpan,
    pub message_text: String,
}

/// One structured diagnostic record: (severity, code, location, message).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub span: TextSpan,
    pub message_text: String,
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Build a diagnostic from the static table, substituting `{0}`-style
    /// placeholders with `args`. The category comes from the table.
    pub fn new(code: u32, span: TextSpan, args: &[&str]) -> Diagnostic {
        let template = get_message_template(code).unwrap_or("unknown diagnostic");
        let category = get_message_category(code).unwrap_or(DiagnosticCategory::Error);
        Diagnostic {
            category,
            code,
            span,
            message_text: format_message(template, args),
            related_information: Vec::new(),
        }
    }

    /// Same as [`Diagnostic::new`] but with an explicit category override.
    /// Used where severity depends on context (redundant patterns).
    pub fn with_category(
        code: u32,
        span: TextSpan,
        args: &[&str],
        category: DiagnosticCategory,
    ) -> Diagnostic {
        let mut diagnostic = Diagnostic::new(code, span, args);
        diagnostic.category = category;
        diagnostic
    }

    pub fn with_related(mut self, span: TextSpan, message: impl Into<String>) -> Diagnostic {
        self.related_information.push(DiagnosticRelatedInformation {
            span,
            message_text: message.into(),
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

// =============================================================================
// Diagnostic Bag
// =============================================================================

/// Append-only multiset of diagnostics.
///
/// The bag never deduplicates; cascading-error suppression is the
/// producer's job (via `has_errors` flags on bound nodes), not the bag's.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> DiagnosticBag {
        DiagnosticBag::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Append a diagnostic built from the static table.
    pub fn report(&mut self, code: u32, span: TextSpan, args: &[&str]) {
        self.add(Diagnostic::new(code, span, args));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Move every diagnostic out of `other` into this bag, preserving order.
    pub fn add_range(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

// =============================================================================
// Message lookup
// =============================================================================

pub fn get_message_template(code: u32) -> Option<&'static str> {
    DIAGNOSTIC_MESSAGES
        .iter()
        .find(|m| m.code == code)
        .map(|m| m.message)
}

pub fn get_message_category(code: u32) -> Option<DiagnosticCategory> {
    DIAGNOSTIC_MESSAGES
        .iter()
        .find(|m| m.code == code)
        .map(|m| m.category)
}

/// Substitute `{0}`, `{1}`, ... placeholders in a message template.
pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bag_never_deduplicates() {
        let mut bag = DiagnosticBag::new();
        let span = TextSpan::new(0, 1);
        bag.report(diagnostic_codes::NOT_INVOCABLE, span, &["f"]);
        bag.report(diagnostic_codes::NOT_INVOCABLE, span, &["f"]);
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn format_message_substitutes_in_order() {
        assert_eq!(
            format_message("cannot convert '{0}' to '{1}'", &["int", "string"]),
            "cannot convert 'int' to 'string'"
        );
    }

    #[test]
    fn every_code_has_a_template() {
        for message in DIAGNOSTIC_MESSAGES {
            assert!(!message.message.is_empty(), "code {}", message.code);
        }
    }
}
