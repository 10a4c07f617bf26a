//! Symbol storage.
//!
//! Symbols are produced by the declaration pass (or a metadata importer,
//! which is out of scope here) and consumed read-only by binding. The
//! arena follows the single-writer-at-construction, many-readers-after
//! lifecycle: `add` takes `&mut self` during setup, everything else is
//! shared access.

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use sable_common::TextSpan;
use sable_solver::overload::MethodSignature;
use sable_solver::types::TypeId;
use sable_syntax::NodeIndex;

/// Index of a symbol in the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const NONE: SymbolId = SymbolId(u32::MAX);
    /// The synthesized entry-point method for top-level statements. Lives
    /// in a dedicated slot so it can be created lazily after construction.
    pub const ENTRY_POINT: SymbolId = SymbolId(u32::MAX - 1);

    pub const fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }

    pub const fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }
}

/// Symbol attribute bits.
pub mod symbol_flags {
    pub const STATIC: u32 = 1 << 0;
    pub const ABSTRACT: u32 = 1 << 1;
    pub const VIRTUAL: u32 = 1 << 2;
    pub const SEALED: u32 = 1 << 3;
    /// Extension method (`this` receiver on the first parameter).
    pub const EXTENSION: u32 = 1 << 4;
    /// Defining part of a partial method.
    pub const PARTIAL_DEFINITION: u32 = 1 << 5;
    /// Implementation part of a partial method.
    pub const PARTIAL_IMPLEMENTATION: u32 = 1 << 6;
    /// Carries a condition name; calls are omitted when it is undefined.
    pub const CONDITIONAL: u32 = 1 << 7;
    pub const UNSAFE: u32 = 1 << 8;
    /// Local function (affects dynamic-dispatch rules at call sites).
    pub const LOCAL_FUNCTION: u32 = 1 << 9;
    /// Declared with `scoped`, pinning the ref-safety scope.
    pub const SCOPED: u32 = 1 << 10;
    /// Declared as a `ref` local or `ref`-returning member.
    pub const BY_REF: u32 = 1 << 11;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Namespace,
    NamedType,
    Method,
    Constructor,
    Property,
    Field,
    Parameter,
    Local,
    TypeParameter,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Accessibility {
    Private,
    Protected,
    Internal,
    ProtectedOrInternal,
    Public,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub flags: u32,
    pub parent: SymbolId,
    pub accessibility: Accessibility,
    /// Declared type for fields, properties, locals, and parameters;
    /// return type for methods; the type itself for named types.
    pub ty: TypeId,
    /// Present on methods, constructors, and delegate-shaped members.
    pub signature: Option<MethodSignature>,
    /// Condition name for conditional methods and attribute types.
    pub condition: Option<String>,
    /// Declaration span, used for lookup by span containment.
    pub span: TextSpan,
    pub node: NodeIndex,
    /// For a partial definition part, the matching implementation part.
    pub partial_implementation: Option<SymbolId>,
}

impl Symbol {
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    pub fn is_static(&self) -> bool {
        self.has_flag(symbol_flags::STATIC)
    }

    pub fn is_extension(&self) -> bool {
        self.has_flag(symbol_flags::EXTENSION)
    }

    pub fn is_method_like(&self) -> bool {
        matches!(self.kind, SymbolKind::Method | SymbolKind::Constructor)
    }
}

/// A builder-style constructor keeping call sites readable; most fields
/// default to absent.
impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, parent: SymbolId) -> Symbol {
        Symbol {
            name: name.into(),
            kind,
            flags: 0,
            parent,
            accessibility: Accessibility::Public,
            ty: TypeId::ERROR,
            signature: None,
            condition: None,
            span: TextSpan::new(0, 0),
            node: NodeIndex::NONE,
            partial_implementation: None,
        }
    }

    pub fn with_span(mut self, span: TextSpan) -> Symbol {
        self.span = span;
        self
    }

    pub fn with_node(mut self, node: NodeIndex) -> Symbol {
        self.node = node;
        self
    }

    pub fn with_type(mut self, ty: TypeId) -> Symbol {
        self.ty = ty;
        self
    }

    pub fn with_signature(mut self, signature: MethodSignature) -> Symbol {
        self.signature = Some(signature);
        self
    }

    pub fn with_flags(mut self, flags: u32) -> Symbol {
        self.flags |= flags;
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Symbol {
        self.accessibility = accessibility;
        self
    }
}

#[derive(Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
    children: FxHashMap<SymbolId, SmallVec<[SymbolId; 4]>>,
    by_node: FxHashMap<NodeIndex, SymbolId>,
    entry_point: OnceCell<Symbol>,
}

impl SymbolArena {
    pub fn new() -> SymbolArena {
        SymbolArena::default()
    }

    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        if symbol.parent.is_some() {
            self.children.entry(symbol.parent).or_default().push(id);
        }
        if symbol.node.is_some() {
            self.by_node.insert(symbol.node, id);
        }
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        if id == SymbolId::ENTRY_POINT {
            self.entry_point
                .get()
                .expect("entry point queried before synthesis")
        } else {
            &self.symbols[id.0 as usize]
        }
    }

    pub fn try_get(&self, id: SymbolId) -> Option<&Symbol> {
        if id == SymbolId::ENTRY_POINT {
            self.entry_point.get()
        } else {
            self.symbols.get(id.0 as usize)
        }
    }

    pub fn name_of(&self, id: SymbolId) -> &str {
        &self.get(id).name
    }

    pub fn members_of(&self, parent: SymbolId) -> &[SymbolId] {
        self.children
            .get(&parent)
            .map(|children| children.as_slice())
            .unwrap_or(&[])
    }

    pub fn find_members<'a>(
        &'a self,
        parent: SymbolId,
        name: &'a str,
    ) -> impl Iterator<Item = SymbolId> + 'a {
        self.members_of(parent)
            .iter()
            .copied()
            .filter(move |&id| self.get(id).name == name)
    }

    pub fn constructors_of(&self, parent: SymbolId) -> Vec<SymbolId> {
        self.members_of(parent)
            .iter()
            .copied()
            .filter(|&id| self.get(id).kind == SymbolKind::Constructor)
            .collect()
    }

    /// The symbol declared by a container node (namespace or type).
    pub fn declared_at(&self, node: NodeIndex) -> Option<SymbolId> {
        self.by_node.get(&node).copied()
    }

    /// The named-type symbol backing a type id, if any. Linear scan;
    /// symbol tables here are small and the checker caches nothing from
    /// this lookup.
    pub fn type_symbol(&self, ty: TypeId) -> Option<SymbolId> {
        self.symbols
            .iter()
            .position(|s| s.kind == SymbolKind::NamedType && s.ty == ty)
            .map(|i| SymbolId(i as u32))
    }

    /// Find the member of `container` named `name` whose declaration span
    /// contains `position`. For a partial method whose defining part does
    /// not contain the position, fall back to its implementation part.
    /// Absence is not an error; callers degrade to a wider scope.
    pub fn find_member_by_span(
        &self,
        container: SymbolId,
        name: &str,
        position: u32,
    ) -> Option<SymbolId> {
        for id in self.find_members(container, name) {
            let symbol = self.get(id);
            if symbol.span.contains(position) {
                return Some(id);
            }
            if let Some(implementation) = symbol.partial_implementation
                && self.get(implementation).span.contains(position)
            {
                return Some(implementation);
            }
        }
        None
    }

    /// Find the member of `container` whose declaration span contains
    /// `position`, regardless of name. Used for members the syntax does
    /// not name the way the symbol table does (constructors, operators,
    /// accessors).
    pub fn member_at_position(&self, container: SymbolId, position: u32) -> Option<SymbolId> {
        self.members_of(container)
            .iter()
            .copied()
            .find(|&id| self.get(id).span.contains(position))
    }

    /// Synthesize the entry-point method for top-level statements.
    /// Memoized: every call observes the same symbol, so identity-based
    /// comparisons hold across repeated top-level binds.
    pub fn ensure_entry_point(&self, unit: NodeIndex, span: TextSpan) -> SymbolId {
        self.entry_point.get_or_init(|| {
            Symbol::new("<entry>", SymbolKind::Method, SymbolId::NONE)
                .with_span(span)
                .with_node(unit)
                .with_flags(symbol_flags::STATIC)
        });
        SymbolId::ENTRY_POINT
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_lookup_by_span_prefers_containing_declaration() {
        let mut symbols = SymbolArena::new();
        let ty = symbols.add(Symbol::new("Widget", SymbolKind::NamedType, SymbolId::NONE));
        let a = symbols.add(
            Symbol::new("Render", SymbolKind::Method, ty).with_span(TextSpan::new(10, 50)),
        );
        let b = symbols.add(
            Symbol::new("Render", SymbolKind::Method, ty).with_span(TextSpan::new(60, 90)),
        );
        assert_eq!(symbols.find_member_by_span(ty, "Render", 20), Some(a));
        assert_eq!(symbols.find_member_by_span(ty, "Render", 75), Some(b));
        assert_eq!(symbols.find_member_by_span(ty, "Render", 55), None);
    }

    #[test]
    fn partial_method_falls_back_to_implementation_part() {
        let mut symbols = SymbolArena::new();
        let ty = symbols.add(Symbol::new("Widget", SymbolKind::NamedType, SymbolId::NONE));
        let implementation = symbols.add(
            Symbol::new("OnChanged", SymbolKind::Method, ty)
                .with_span(TextSpan::new(100, 160))
                .with_flags(symbol_flags::PARTIAL_IMPLEMENTATION),
        );
        let mut definition = Symbol::new("OnChanged", SymbolKind::Method, ty)
            .with_span(TextSpan::new(10, 40))
            .with_flags(symbol_flags::PARTIAL_DEFINITION);
        definition.partial_implementation = Some(implementation);
        let definition = symbols.add(definition);

        assert_eq!(
            symbols.find_member_by_span(ty, "OnChanged", 120),
            Some(implementation)
        );
        assert_eq!(
            symbols.find_member_by_span(ty, "OnChanged", 15),
            Some(definition)
        );
    }

    #[test]
    fn entry_point_is_memoized() {
        let symbols = SymbolArena::new();
        let unit = NodeIndex(0);
        let first = symbols.ensure_entry_point(unit, TextSpan::new(0, 100));
        let second = symbols.ensure_entry_point(unit, TextSpan::new(0, 999));
        assert_eq!(first, second);
        assert_eq!(symbols.get(first).name, "<entry>");
        assert_eq!(symbols.get(first).span, TextSpan::new(0, 100));
    }
}
