//! Source location types for tracking positions in source files.
//!
//! This module provides [`SourceLocation`] for human-facing positions (used in
//! log messages) and [`Span`] for the byte ranges rewrite passes operate on.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A position within a source file.
///
/// # Field Conventions
///
/// - `line` is 1-indexed (first line is line 1)
/// - `column` is 1-indexed, counted in bytes
/// - `byte_offset` is the absolute byte position from the start of the file
///
/// # Examples
///
/// ```
/// use rn_core::SourceLocation;
///
/// let loc = SourceLocation::new(3, 7, 42);
/// assert_eq!(loc.to_string(), "3:7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Line number (1-indexed).
    pub line: u32,

    /// Column number (1-indexed byte column within the line).
    pub column: u32,

    /// Absolute byte offset from the start of the file.
    pub byte_offset: u32,
}

impl SourceLocation {
    /// Creates a new source location.
    #[inline]
    #[must_use]
    pub const fn new(line: u32, column: u32, byte_offset: u32) -> Self {
        Self {
            line,
            column,
            byte_offset,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open byte range `[start, end)` within a source text.
///
/// Spans are only meaningful against the exact text they were computed from;
/// every rewrite produces a new tree and therefore new spans.
///
/// # Examples
///
/// ```
/// use rn_core::Span;
///
/// let span = Span::new(4, 9);
/// assert_eq!(span.len(), 5);
/// assert!(span.contains(&Span::new(5, 7)));
/// assert_eq!(&"let router = x;"[span.range()], "route");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start byte.
    pub start: usize,
    /// Exclusive end byte.
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[inline]
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the span length in bytes.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` for a zero-width span (an insertion point).
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// Returns `true` if `other` lies entirely within this span.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns `true` if the two spans share at least one byte.
    ///
    /// Two zero-width spans at the same offset are considered overlapping,
    /// since their relative order would be ambiguous.
    #[inline]
    #[must_use]
    pub const fn overlaps(self, other: &Self) -> bool {
        if self.is_empty() && other.is_empty() {
            return self.start == other.start;
        }
        self.start < other.end && other.start < self.end
    }

    /// Returns the span as a `Range<usize>` for slicing.
    #[inline]
    #[must_use]
    pub const fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    #[inline]
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new(10, 5, 245);
        assert_eq!(loc.to_string(), "10:5");
    }

    #[test]
    fn test_span_overlaps() {
        assert!(Span::new(0, 5).overlaps(&Span::new(4, 8)));
        assert!(!Span::new(0, 4).overlaps(&Span::new(4, 8)));
        assert!(Span::new(3, 3).overlaps(&Span::new(3, 3)));
        assert!(!Span::new(3, 3).overlaps(&Span::new(4, 4)));
        // An insertion point strictly inside a replaced range overlaps it.
        assert!(Span::new(2, 6).overlaps(&Span::new(4, 4)));
    }

    #[test]
    fn test_span_from_range() {
        let span: Span = (2..7).into();
        assert_eq!(span, Span::new(2, 7));
        assert_eq!(span.range(), 2..7);
    }
}
