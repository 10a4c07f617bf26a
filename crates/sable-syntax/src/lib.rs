//! Arena-based syntax tree surface for the Sable semantic core.
//!
//! The semantic core never parses source text; it consumes an immutable,
//! position-addressed tree produced by the excluded front end. This crate
//! provides that surface:
//! - `NodeIndex`-addressed nodes with `u16` syntax kinds and spans
//! - Parent links in a parallel extended-info table
//! - Per-kind payloads behind typed `get_*` accessors
//! - A `TreeBuilder` used by the front end and by tests
//!
//! Nodes are immutable once the tree is built; node identity (the index)
//! is stable for the lifetime of the arena, which is what makes the
//! binder cache's identity-keyed memoization sound.

pub mod arena;
pub mod builder;
pub mod kinds;

pub use arena::{Node, NodeArena, NodeIndex, NodeList};
pub use builder::TreeBuilder;
pub use kinds::syntax_kind;
