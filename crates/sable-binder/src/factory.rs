//! The binder factory: position-gated construction and memoization of
//! binder chains.
//!
//! Chains are built lazily, only for queried positions, by resolving the
//! parent node's binder and wrapping it with this node's contribution to
//! scope. Results are cached per `(node, usage)`; usage captures every
//! position distinction that changes the resulting chain, so the cache is
//! a pure function of its key.

use std::sync::Arc;

use dashmap::DashMap;
use sable_syntax::kinds::{is_namespace_declaration, is_type_declaration};
use sable_syntax::{NodeArena, NodeIndex, syntax_kind as k};

use crate::binder::{Binder, BinderFlags, BinderKind};
use crate::symbols::SymbolArena;
use sable_syntax::arena::modifiers;

/// Where inside a node the queried position falls. Part of the cache key:
/// the same node yields different chains for different usages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeUsage {
    Normal,
    /// Inside a member's body or expression body.
    MethodBody,
    /// Inside a method's type-parameter list.
    MethodTypeParameters,
    /// Inside a type's base list, where type parameters are visible but
    /// the body scope is not.
    NamedTypeBase,
    /// Inside a top-level statement of a compilation unit.
    TopLevelStatements,
    /// Inside an import directive, which sees only extern aliases.
    WithinImports,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinderCacheKey {
    pub node: NodeIndex,
    pub usage: NodeUsage,
}

pub struct BinderFactory<'a> {
    arena: &'a NodeArena,
    symbols: &'a SymbolArena,
    cache: DashMap<BinderCacheKey, Arc<Binder>>,
    root: Arc<Binder>,
}

impl<'a> BinderFactory<'a> {
    pub fn new(arena: &'a NodeArena, symbols: &'a SymbolArena) -> BinderFactory<'a> {
        BinderFactory::with_flags(arena, symbols, BinderFlags::empty())
    }

    pub fn with_flags(
        arena: &'a NodeArena,
        symbols: &'a SymbolArena,
        flags: BinderFlags,
    ) -> BinderFactory<'a> {
        BinderFactory {
            arena,
            symbols,
            cache: DashMap::new(),
            root: Binder::buck_stops(flags),
        }
    }

    pub fn symbols(&self) -> &'a SymbolArena {
        self.symbols
    }

    /// The binder for the innermost lexical scope visible at `position`,
    /// which must lie within `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not part of this factory's tree or `position`
    /// falls outside its full span. Both are caller contract violations,
    /// not recoverable conditions.
    pub fn get_binder(&self, node: NodeIndex, position: u32) -> Arc<Binder> {
        assert!(
            self.arena.contains(node),
            "node {node:?} does not belong to this syntax tree"
        );
        let full_span = self
            .arena
            .get(node)
            .map(|n| n.full_span)
            .unwrap_or_default();
        assert!(
            full_span.contains(position),
            "position {position} lies outside node {node:?} ({full_span:?})"
        );
        self.binder_for(node, position)
    }

    pub fn cached_chains(&self) -> usize {
        self.cache.len()
    }

    fn binder_for(&self, node: NodeIndex, position: u32) -> Arc<Binder> {
        let usage = self.usage_for(node, position);
        let key = BinderCacheKey { node, usage };
        if let Some(hit) = self.cache.get(&key) {
            return Arc::clone(hit.value());
        }
        tracing::trace!(?node, ?usage, "building binder chain");
        let binder = self.build(node, usage, position);
        // Under a race the first insert wins, keeping lookups
        // referentially interchangeable per key.
        let entry = self.cache.entry(key).or_insert(binder);
        Arc::clone(entry.value())
    }

    // =========================================================================
    // Usage classification
    // =========================================================================

    fn usage_for(&self, node: NodeIndex, position: u32) -> NodeUsage {
        let kind = self.arena.kind_of(node);
        match kind {
            k::COMPILATION_UNIT => {
                let Some(unit) = self.arena.get_compilation_unit(node) else {
                    return NodeUsage::Normal;
                };
                if self.any_contains(unit.externs.iter().chain(unit.usings.iter()), position) {
                    return NodeUsage::WithinImports;
                }
                let in_global = unit.members.iter().any(|m| {
                    self.arena.kind_of(m) == k::GLOBAL_STATEMENT && self.node_contains(m, position)
                });
                if in_global {
                    NodeUsage::TopLevelStatements
                } else {
                    NodeUsage::Normal
                }
            }
            _ if is_namespace_declaration(kind) => {
                let Some(ns) = self.arena.get_namespace(node) else {
                    return NodeUsage::Normal;
                };
                if self.any_contains(ns.externs.iter().chain(ns.usings.iter()), position) {
                    NodeUsage::WithinImports
                } else {
                    NodeUsage::Normal
                }
            }
            _ if is_type_declaration(kind) => {
                let Some(decl) = self.arena.get_type_decl(node) else {
                    return NodeUsage::Normal;
                };
                if decl.base_list.is_some() && self.node_contains(decl.base_list, position) {
                    NodeUsage::NamedTypeBase
                } else {
                    NodeUsage::Normal
                }
            }
            k::METHOD_DECLARATION => {
                let Some(method) = self.arena.get_method(node) else {
                    return NodeUsage::Normal;
                };
                if self.any_contains(method.type_parameters.iter(), position) {
                    NodeUsage::MethodTypeParameters
                } else if self.in_body(method.body, method.expression_body, position) {
                    NodeUsage::MethodBody
                } else {
                    NodeUsage::Normal
                }
            }
            k::CONSTRUCTOR_DECLARATION => {
                let body = self
                    .arena
                    .get_constructor(node)
                    .map(|c| c.body)
                    .unwrap_or(NodeIndex::NONE);
                if self.in_body(body, NodeIndex::NONE, position) {
                    NodeUsage::MethodBody
                } else {
                    NodeUsage::Normal
                }
            }
            k::OPERATOR_DECLARATION | k::CONVERSION_OPERATOR_DECLARATION => {
                let body = self
                    .arena
                    .get_operator(node)
                    .map(|o| o.body)
                    .unwrap_or(NodeIndex::NONE);
                if self.in_body(body, NodeIndex::NONE, position) {
                    NodeUsage::MethodBody
                } else {
                    NodeUsage::Normal
                }
            }
            k::ACCESSOR_DECLARATION => {
                let (body, expr) = self
                    .arena
                    .get_accessor(node)
                    .map(|a| (a.body, a.expression_body))
                    .unwrap_or((NodeIndex::NONE, NodeIndex::NONE));
                if self.in_body(body, expr, position) {
                    NodeUsage::MethodBody
                } else {
                    NodeUsage::Normal
                }
            }
            k::LOCAL_FUNCTION_STATEMENT => {
                let body = self
                    .arena
                    .get_local_function(node)
                    .map(|f| f.body)
                    .unwrap_or(NodeIndex::NONE);
                if self.in_body(body, NodeIndex::NONE, position) {
                    NodeUsage::MethodBody
                } else {
                    NodeUsage::Normal
                }
            }
            _ => NodeUsage::Normal,
        }
    }

    fn node_contains(&self, node: NodeIndex, position: u32) -> bool {
        node.is_some()
            && self
                .arena
                .get(node)
                .is_some_and(|n| n.full_span.contains(position))
    }

    fn any_contains(
        &self,
        nodes: impl Iterator<Item = NodeIndex>,
        position: u32,
    ) -> bool {
        let mut nodes = nodes;
        nodes.any(|n| self.node_contains(n, position))
    }

    fn in_body(&self, body: NodeIndex, expression_body: NodeIndex, position: u32) -> bool {
        self.node_contains(body, position) || self.node_contains(expression_body, position)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    fn build(&self, node: NodeIndex, usage: NodeUsage, position: u32) -> Arc<Binder> {
        let parent = self.arena.parent_of(node);
        let mut binder = if parent.is_none() {
            Arc::clone(&self.root)
        } else {
            self.binder_for(parent, position)
        };

        let kind = self.arena.kind_of(node);
        match kind {
            k::COMPILATION_UNIT => {
                if let Some(unit) = self.arena.get_compilation_unit(node) {
                    let usings = unit.usings.clone();
                    let has_externs = !unit.externs.is_empty();
                    if has_externs {
                        binder = binder.push(BinderKind::ExternAliases { node });
                    }
                    if usage == NodeUsage::WithinImports {
                        // An import directive resolves against extern
                        // aliases only, never against sibling imports.
                        return binder;
                    }
                    binder = self.push_import_layers(binder, node, &usings);
                    if usage == NodeUsage::TopLevelStatements {
                        let span = self.arena.get(node).map(|n| n.span).unwrap_or_default();
                        let symbol = self.symbols.ensure_entry_point(node, span);
                        binder = binder.push(BinderKind::EntryPoint { symbol });
                    }
                }
            }
            _ if is_namespace_declaration(kind) => {
                if let Some(ns) = self.arena.get_namespace(node) {
                    let usings = ns.usings.clone();
                    if !ns.externs.is_empty() {
                        binder = binder.push(BinderKind::ExternAliases { node });
                    }
                    if usage == NodeUsage::WithinImports {
                        return binder;
                    }
                    binder = self.push_import_layers(binder, node, &usings);
                }
                if let Some(symbol) = self.symbols.declared_at(node) {
                    binder = binder.push(BinderKind::Container { symbol });
                }
            }
            _ if is_type_declaration(kind) => {
                let decl_modifiers = self
                    .arena
                    .get_type_decl(node)
                    .map(|d| d.modifiers)
                    .unwrap_or(0);
                if let Some(symbol) = self.symbols.declared_at(node) {
                    binder = binder.push(BinderKind::TypeParameters { symbol });
                    // The base list sees type parameters but not members.
                    if usage != NodeUsage::NamedTypeBase {
                        binder = binder.push(BinderKind::Container { symbol });
                    }
                }
                if decl_modifiers & modifiers::UNSAFE != 0 {
                    binder = binder.push_flags(binder.flags | BinderFlags::UNSAFE_REGION);
                }
            }
            k::METHOD_DECLARATION => {
                let Some(method) = self.arena.get_method(node) else {
                    return binder;
                };
                let name = method.name.clone();
                let is_unsafe = method.modifiers & modifiers::UNSAFE != 0;
                let symbol = binder
                    .containing_container()
                    .and_then(|ty| self.symbols.find_member_by_span(ty, &name, position));
                match (usage, symbol) {
                    (NodeUsage::MethodBody, Some(symbol)) => {
                        binder = binder.push(BinderKind::Member {
                            symbol,
                            body: node,
                        });
                    }
                    (NodeUsage::MethodTypeParameters, Some(symbol)) => {
                        binder = binder.push(BinderKind::TypeParameters { symbol });
                    }
                    // Header positions and unresolved members degrade to
                    // the enclosing scope.
                    _ => {}
                }
                if is_unsafe {
                    binder = binder.push_flags(binder.flags | BinderFlags::UNSAFE_REGION);
                }
            }
            k::CONSTRUCTOR_DECLARATION
            | k::OPERATOR_DECLARATION
            | k::CONVERSION_OPERATOR_DECLARATION
            | k::ACCESSOR_DECLARATION => {
                if usage == NodeUsage::MethodBody {
                    let symbol = binder
                        .containing_container()
                        .and_then(|ty| self.symbols.member_at_position(ty, position));
                    if let Some(symbol) = symbol {
                        binder = binder.push(BinderKind::Member {
                            symbol,
                            body: node,
                        });
                    }
                }
            }
            k::LOCAL_FUNCTION_STATEMENT => {
                if usage == NodeUsage::MethodBody
                    && let Some(symbol) = self.symbols.declared_at(node)
                {
                    binder = binder.push(BinderKind::Member {
                        symbol,
                        body: node,
                    });
                }
            }
            k::BLOCK => {
                binder = binder.push(BinderKind::Block { node });
            }
            k::CHECKED_STATEMENT => {
                let flags =
                    (binder.flags - BinderFlags::UNCHECKED_REGION) | BinderFlags::CHECKED_REGION;
                binder = binder.push_flags(flags);
            }
            k::UNCHECKED_STATEMENT => {
                let flags =
                    (binder.flags - BinderFlags::CHECKED_REGION) | BinderFlags::UNCHECKED_REGION;
                binder = binder.push_flags(flags);
            }
            k::UNSAFE_STATEMENT => {
                binder = binder.push_flags(binder.flags | BinderFlags::UNSAFE_REGION);
            }
            k::ATTRIBUTE_ARGUMENT_LIST => {
                binder = binder.push_flags(binder.flags | BinderFlags::ATTRIBUTE_ARGUMENT);
            }
            k::DOC_CREF => {
                binder = binder.push_flags(binder.flags | BinderFlags::CREF);
            }
            k::IS_PATTERN_EXPRESSION | k::SWITCH_EXPRESSION | k::SWITCH_SECTION => {
                binder = binder.push(BinderKind::PatternVariables { node });
            }
            // Every other kind contributes nothing; the parent's binder
            // passes through unchanged.
            _ => {}
        }
        binder
    }

    /// Split import directives into an alias layer and a plain layer, so
    /// scopes that should see only one subset can stop at the right link.
    fn push_import_layers(
        &self,
        mut binder: Arc<Binder>,
        node: NodeIndex,
        usings: &sable_syntax::NodeList,
    ) -> Arc<Binder> {
        let mut has_alias = false;
        let mut has_plain = false;
        for using in usings.iter() {
            match self.arena.get_using_directive(using) {
                Some(directive) if directive.alias.is_some() => has_alias = true,
                Some(_) => has_plain = true,
                None => {}
            }
        }
        if has_alias {
            binder = binder.push(BinderKind::UsingAliases { node });
        }
        if has_plain {
            binder = binder.push(BinderKind::Imports { node });
        }
        binder
    }
}
