//! The checker context: every component entry point borrows one of these.
//!
//! The context is the explicit replacement for a global compilation
//! object: the syntax arena, symbol table, type table, well-known
//! surface, and binder factory are built once at compilation setup and
//! then shared read-only; the diagnostic bag is the only mutable piece
//! and is owned per analysis run.

use sable_binder::{BinderFactory, SymbolArena, WellKnownTypes};
use sable_common::TextSpan;
use sable_common::diagnostics::{Diagnostic, DiagnosticBag};
use sable_solver::types::TypeInterner;
use sable_syntax::NodeArena;

pub struct CheckerContext<'a> {
    pub arena: &'a NodeArena,
    pub symbols: &'a SymbolArena,
    pub types: &'a TypeInterner,
    pub well_known: &'a WellKnownTypes,
    pub factory: &'a BinderFactory<'a>,
    /// Compilation default for overflow checking, overridden per region
    /// by checked/unchecked binder flags.
    pub checked_default: bool,
    pub diagnostics: DiagnosticBag,
}

impl<'a> CheckerContext<'a> {
    pub fn new(
        arena: &'a NodeArena,
        symbols: &'a SymbolArena,
        types: &'a TypeInterner,
        well_known: &'a WellKnownTypes,
        factory: &'a BinderFactory<'a>,
    ) -> CheckerContext<'a> {
        CheckerContext {
            arena,
            symbols,
            types,
            well_known,
            factory,
            checked_default: false,
            diagnostics: DiagnosticBag::new(),
        }
    }

    pub fn report(&mut self, code: u32, span: TextSpan, args: &[&str]) {
        self.diagnostics.report(code, span, args);
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.add(diagnostic);
    }

    /// Whether arithmetic at a position with the given region state is
    /// overflow-checked.
    pub fn is_checked(&self, region: Option<bool>) -> bool {
        region.unwrap_or(self.checked_default)
    }

    pub fn into_diagnostics(self) -> DiagnosticBag {
        self.diagnostics
    }
}
