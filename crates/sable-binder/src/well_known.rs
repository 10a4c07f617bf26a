//! Well-known type and member lookups.
//!
//! The runtime surface the checker lowers against (string concatenation
//! helpers, the interpolation builder, the attribute base type) is
//! registered here at compilation setup. Any entry may be absent in a
//! reduced target; lookups return `Option` and callers degrade, usually
//! by picking a different lowering strategy or reporting
//! `MISSING_WELL_KNOWN_TYPE`.

use rustc_hash::{FxHashMap, FxHashSet};
use sable_common::TextSpan;
use sable_common::diagnostics::{DiagnosticBag, diagnostic_codes};
use sable_solver::types::TypeId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WellKnownMember {
    StringConcat2,
    StringConcat3,
    StringConcat4,
    /// Concatenates a sequence of strings without an intermediate array.
    /// Availability gates the direct-concatenation strategy past four
    /// parts.
    StringConcatMulti,
    StringFormat,
    HandlerAppendLiteral,
    HandlerAppendFormatted,
    HandlerToString,
}

#[derive(Debug, Default)]
pub struct WellKnownTypes {
    /// The interpolation builder type, when the target runtime has one.
    pub handler_type: Option<TypeId>,
    /// Base type all attribute types must derive from.
    pub attribute_base: Option<TypeId>,
    members: FxHashMap<WellKnownMember, u32>,
    /// Compilation-level condition symbols (for conditional members).
    defined_conditions: FxHashSet<String>,
}

impl WellKnownTypes {
    pub fn new() -> WellKnownTypes {
        WellKnownTypes::default()
    }

    pub fn register_member(&mut self, member: WellKnownMember, id: u32) {
        self.members.insert(member, id);
    }

    pub fn member(&self, member: WellKnownMember) -> Option<u32> {
        self.members.get(&member).copied()
    }

    pub fn has_concat_multi(&self) -> bool {
        self.members.contains_key(&WellKnownMember::StringConcatMulti)
    }

    pub fn define_condition(&mut self, name: impl Into<String>) {
        self.defined_conditions.insert(name.into());
    }

    pub fn is_condition_defined(&self, name: &str) -> bool {
        self.defined_conditions.contains(name)
    }

    /// Report a required-but-absent runtime type or member.
    pub fn report_missing(&self, diagnostics: &mut DiagnosticBag, name: &str, span: TextSpan) {
        diagnostics.report(diagnostic_codes::MISSING_WELL_KNOWN_TYPE, span, &[name]);
    }
}

impl WellKnownTypes {
    /// Convenience for tests and setup code: a surface with every string
    /// helper except the multi-concat primitive.
    pub fn minimal_string_surface() -> WellKnownTypes {
        let mut wk = WellKnownTypes::new();
        wk.register_member(WellKnownMember::StringConcat2, 1);
        wk.register_member(WellKnownMember::StringConcat3, 2);
        wk.register_member(WellKnownMember::StringConcat4, 3);
        wk.register_member(WellKnownMember::StringFormat, 4);
        wk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_members_degrade_to_none() {
        let wk = WellKnownTypes::minimal_string_surface();
        assert!(wk.member(WellKnownMember::StringConcat2).is_some());
        assert!(wk.member(WellKnownMember::StringConcatMulti).is_none());
        assert!(!wk.has_concat_multi());
    }

    #[test]
    fn condition_symbols() {
        let mut wk = WellKnownTypes::new();
        wk.define_condition("TRACE");
        assert!(wk.is_condition_defined("TRACE"));
        assert!(!wk.is_condition_defined("DEBUG"));
    }
}
