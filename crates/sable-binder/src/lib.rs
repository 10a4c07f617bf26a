//! Symbol storage and lexical-scope resolution.
//!
//! The binder crate owns the symbol arena, the well-known-type registry,
//! and the memoized binder factory that reconstructs the nested scope
//! chain for any (node, position) query. The checker consumes binder
//! chains to resolve names and carry context flags (unsafe, checked,
//! attribute-argument) into expression binding.

pub mod binder;
pub mod factory;
pub mod symbols;
pub mod well_known;

pub use binder::{Binder, BinderFlags, BinderKind};
pub use factory::{BinderCacheKey, BinderFactory, NodeUsage};
pub use symbols::{Accessibility, Symbol, SymbolArena, SymbolId, SymbolKind, symbol_flags};
pub use well_known::{WellKnownMember, WellKnownTypes};
