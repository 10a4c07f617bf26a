//! The binder chain.
//!
//! A `Binder` is one link in a strictly linear, immutable chain of nested
//! lexical scopes, innermost first and terminated by the buck-stops link.
//! Pushing a link never mutates the tail, so chains produced for
//! different positions share their common suffix. Flags are inherited on
//! push and overridden by pushing a link with modified flags.

use std::sync::Arc;

use bitflags::bitflags;
use sable_common::limits::MAX_BINDER_CHAIN_LENGTH;
use sable_syntax::NodeIndex;

use crate::symbols::SymbolId;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct BinderFlags: u32 {
        /// Inside an `unsafe` region (block or unsafe member).
        const UNSAFE_REGION = 1 << 0;
        /// Inside a `checked` region.
        const CHECKED_REGION = 1 << 1;
        /// Inside an `unchecked` region.
        const UNCHECKED_REGION = 1 << 2;
        /// Binding an attribute argument.
        const ATTRIBUTE_ARGUMENT = 1 << 3;
        /// Binding a documentation cross-reference.
        const CREF = 1 << 4;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BinderKind {
    /// Chain terminator.
    BuckStops,
    /// `extern alias` directives of a compilation unit or namespace.
    ExternAliases { node: NodeIndex },
    /// `using Alias = ...` directives.
    UsingAliases { node: NodeIndex },
    /// Plain `using` imports.
    Imports { node: NodeIndex },
    /// A namespace or type body scope.
    Container { symbol: SymbolId },
    /// Type parameters of a type or method, visible in base lists and
    /// constraint clauses where the body scope is not.
    TypeParameters { symbol: SymbolId },
    /// A member body; `symbol` is the containing member.
    Member { symbol: SymbolId, body: NodeIndex },
    /// The synthesized entry point over top-level statements.
    EntryPoint { symbol: SymbolId },
    Block { node: NodeIndex },
    /// Scope introduced by pattern-variable designations.
    PatternVariables { node: NodeIndex },
}

#[derive(Clone, Debug)]
pub struct Binder {
    pub kind: BinderKind,
    pub flags: BinderFlags,
    pub next: Option<Arc<Binder>>,
}

impl Binder {
    pub fn buck_stops(flags: BinderFlags) -> Arc<Binder> {
        Arc::new(Binder {
            kind: BinderKind::BuckStops,
            flags,
            next: None,
        })
    }

    /// Push a new innermost link, inheriting this link's flags.
    pub fn push(self: &Arc<Binder>, kind: BinderKind) -> Arc<Binder> {
        Arc::new(Binder {
            kind,
            flags: self.flags,
            next: Some(Arc::clone(self)),
        })
    }

    /// Push a link that only changes flags.
    pub fn push_flags(self: &Arc<Binder>, flags: BinderFlags) -> Arc<Binder> {
        Arc::new(Binder {
            kind: self.kind.clone(),
            flags,
            next: Some(Arc::clone(self)),
        })
    }

    pub fn iter(&self) -> BinderIter<'_> {
        BinderIter {
            current: Some(self),
            remaining: MAX_BINDER_CHAIN_LENGTH,
        }
    }

    /// The nearest enclosing member (method, constructor, property body,
    /// or the synthesized entry point), if any.
    pub fn containing_member_or_lambda(&self) -> Option<SymbolId> {
        self.iter().find_map(|binder| match binder.kind {
            BinderKind::Member { symbol, .. } | BinderKind::EntryPoint { symbol } => Some(symbol),
            _ => None,
        })
    }

    /// The nearest enclosing container (type or namespace) scope.
    pub fn containing_container(&self) -> Option<SymbolId> {
        self.iter().find_map(|binder| match binder.kind {
            BinderKind::Container { symbol } => Some(symbol),
            _ => None,
        })
    }

    pub fn in_unsafe_region(&self) -> bool {
        self.flags.contains(BinderFlags::UNSAFE_REGION)
    }

    /// Whether arithmetic here is overflow-checked. Neither flag set
    /// means the compilation default applies.
    pub fn checked_state(&self) -> Option<bool> {
        if self.flags.contains(BinderFlags::CHECKED_REGION) {
            Some(true)
        } else if self.flags.contains(BinderFlags::UNCHECKED_REGION) {
            Some(false)
        } else {
            None
        }
    }

    pub fn in_attribute_argument(&self) -> bool {
        self.flags.contains(BinderFlags::ATTRIBUTE_ARGUMENT)
    }

    pub fn in_cref(&self) -> bool {
        self.flags.contains(BinderFlags::CREF)
    }

    pub fn chain_length(&self) -> usize {
        self.iter().count()
    }
}

pub struct BinderIter<'a> {
    current: Option<&'a Binder>,
    remaining: usize,
}

impl<'a> Iterator for BinderIter<'a> {
    type Item = &'a Binder;

    fn next(&mut self) -> Option<&'a Binder> {
        // The length bound guards against a corrupted chain; a valid
        // chain always terminates at the buck-stops link first.
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let binder = self.current?;
        self.current = binder.next.as_deref();
        Some(binder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushed_chains_share_their_tail() {
        let root = Binder::buck_stops(BinderFlags::empty());
        let container = root.push(BinderKind::Container { symbol: SymbolId(0) });
        let a = container.push(BinderKind::Block { node: NodeIndex(1) });
        let b = container.push(BinderKind::Block { node: NodeIndex(2) });
        assert!(Arc::ptr_eq(a.next.as_ref().unwrap(), b.next.as_ref().unwrap()));
    }

    #[test]
    fn flags_are_inherited_and_overridable() {
        let root = Binder::buck_stops(BinderFlags::empty());
        let in_unsafe = root.push_flags(BinderFlags::UNSAFE_REGION);
        let block = in_unsafe.push(BinderKind::Block { node: NodeIndex(0) });
        assert!(block.in_unsafe_region());
        assert_eq!(block.checked_state(), None);
        let rechecked = block.push_flags(
            (block.flags - BinderFlags::UNCHECKED_REGION) | BinderFlags::CHECKED_REGION,
        );
        assert!(rechecked.in_unsafe_region());
        assert_eq!(rechecked.checked_state(), Some(true));
    }

    #[test]
    fn containing_member_skips_blocks() {
        let root = Binder::buck_stops(BinderFlags::empty());
        let member = root.push(BinderKind::Member {
            symbol: SymbolId(7),
            body: NodeIndex(3),
        });
        let inner = member
            .push(BinderKind::Block { node: NodeIndex(4) })
            .push(BinderKind::PatternVariables { node: NodeIndex(5) });
        assert_eq!(inner.containing_member_or_lambda(), Some(SymbolId(7)));
    }
}
