//! Source spans and spanned values.

use std::ops::Range;

/// A byte range in the original query string.
///
/// Spans are always absolute: slices of the query parsed in isolation (an
/// option value, a nested `$expand` option list) are lexed with an offset so
/// diagnostics point into the caller's input.
pub type Span = Range<usize>;

/// A value with an associated source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    /// The wrapped value.
    pub node: T,
    /// The span in source text where this value appears.
    pub span: Span,
}

impl<T> Spanned<T> {
    /// Creates a new spanned value.
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    /// Maps the inner value while preserving the span.
    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned {
            node: f(self.node),
            span: self.span,
        }
    }

    /// Extracts the inner value, discarding the span.
    pub fn into_inner(self) -> T {
        self.node
    }
}

impl<T> AsRef<T> for Spanned<T> {
    fn as_ref(&self) -> &T {
        &self.node
    }
}

/// Returns a span covering both `start` and `end`.
pub fn join_spans(start: &Span, end: &Span) -> Span {
    start.start.min(end.start)..start.end.max(end.end)
}
