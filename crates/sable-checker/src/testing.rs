//! Shared fixtures for checker unit tests.

use sable_binder::{BinderFactory, SymbolArena, WellKnownTypes};
use sable_common::TextSpan;
use sable_solver::types::TypeInterner;
use sable_syntax::{NodeArena, NodeIndex, NodeList, TreeBuilder};

use crate::context::CheckerContext;

/// Mutable compilation ingredients handed to a test's customization
/// closure before everything is frozen.
pub(crate) struct TestSetup {
    pub builder: TreeBuilder,
    pub symbols: SymbolArena,
    pub types: TypeInterner,
    pub well_known: WellKnownTypes,
    /// Top-level members of the synthesized compilation unit.
    pub members: Vec<NodeIndex>,
}

pub(crate) struct TestCompilation {
    pub arena: &'static NodeArena,
    pub symbols: &'static SymbolArena,
    pub types: &'static TypeInterner,
    pub well_known: &'static WellKnownTypes,
    pub factory: &'static BinderFactory<'static>,
}

impl TestCompilation {
    pub fn new() -> TestCompilation {
        TestCompilation::build(|_| {})
    }

    /// Freeze a customized setup into shared read-only tables. The
    /// tables are leaked so the factory's borrows are `'static`; fine
    /// for a test process.
    pub fn build(customize: impl FnOnce(&mut TestSetup)) -> TestCompilation {
        let mut setup = TestSetup {
            builder: TreeBuilder::new(),
            symbols: SymbolArena::new(),
            types: TypeInterner::new(),
            well_known: WellKnownTypes::minimal_string_surface(),
            members: Vec::new(),
        };
        customize(&mut setup);
        let TestSetup {
            mut builder,
            symbols,
            types,
            well_known,
            members,
        } = setup;
        let unit = builder.compilation_unit(
            TextSpan::new(0, 1_000),
            NodeList::empty(),
            NodeList::empty(),
            NodeList::new(members),
        );
        let arena: &'static NodeArena = Box::leak(Box::new(builder.finish(unit)));
        let symbols: &'static SymbolArena = Box::leak(Box::new(symbols));
        let types: &'static TypeInterner = Box::leak(Box::new(types));
        let well_known: &'static WellKnownTypes = Box::leak(Box::new(well_known));
        let factory: &'static BinderFactory<'static> =
            Box::leak(Box::new(BinderFactory::new(arena, symbols)));
        TestCompilation {
            arena,
            symbols,
            types,
            well_known,
            factory,
        }
    }

    pub fn context(&self) -> CheckerContext<'static> {
        CheckerContext::new(
            self.arena,
            self.symbols,
            self.types,
            self.well_known,
            self.factory,
        )
    }
}
