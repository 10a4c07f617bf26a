//! Byte-offset source spans.
//!
//! Spans are half-open ranges `[start, end)` over the source text. Every
//! syntax node carries two: `span` (the significant token range) and
//! `full_span` (including attached trivia). Binder position gating works
//! on `full_span` containment; diagnostics use `span`.

use serde::Serialize;

/// A half-open byte range `[start, end)` in a source file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TextSpan {
    pub start: u32,
    pub end: u32,
}

impl TextSpan {
    pub const fn new(start: u32, end: u32) -> TextSpan {
        TextSpan { start, end }
    }

    /// The empty span at a position. Used for zero-width synthesized nodes.
    pub const fn empty(position: u32) -> TextSpan {
        TextSpan {
            start: position,
            end: position,
        }
    }

    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `position` lies within this span.
    ///
    /// An empty span contains its own position so that zero-width
    /// synthesized nodes still answer containment queries.
    pub const fn contains(&self, position: u32) -> bool {
        (self.start <= position && position < self.end)
            || (self.is_empty() && position == self.start)
    }

    /// Whether `other` lies entirely within this span.
    pub const fn contains_span(&self, other: TextSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The smallest span covering both `self` and `other`.
    pub fn union(&self, other: TextSpan) -> TextSpan {
        TextSpan {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}
