//! Source location tracking.

use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// A span in the source text: a byte range plus the line it starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// 1-based line number of `start`.
    pub line: usize,
}

impl Span {
    /// Create a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    /// Get the length of this span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Extend this span to cover `other`, keeping the starting line.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let first = if other.start < self.start { other } else { self };
        Self {
            start: first.start,
            end: self.end.max(other.end),
            line: first.line,
        }
    }

    /// Get the source text for this span.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// The byte range of this span.
    #[must_use]
    pub const fn into_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

/// A value with an associated source span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spanned<T> {
    /// The value.
    pub value: T,
    /// The source span.
    pub span: Span,
}

impl<T> Spanned<T> {
    /// Create a new spanned value.
    #[must_use]
    pub const fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    /// Map the inner value.
    #[must_use]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Spanned<U> {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }

    /// Get a reference to the inner value.
    #[must_use]
    pub const fn inner(&self) -> &T {
        &self.value
    }

    /// Unwrap the spanned value, discarding the span.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_first_line() {
        let header = Span::new(10, 30, 2);
        let posting = Span::new(31, 50, 3);
        let merged = header.merge(&posting);
        assert_eq!(merged, Span::new(10, 50, 2));
        assert_eq!(posting.merge(&header), merged);
    }

    #[test]
    fn test_text() {
        let source = "P 2018/10/01 TDB162 12.50 CAD";
        let span = Span::new(2, 12, 1);
        assert_eq!(span.text(source), "2018/10/01");
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
    }
}
