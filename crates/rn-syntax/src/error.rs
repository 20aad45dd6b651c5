//! Error types for the rn-syntax crate.
//!
//! This module provides the [`SyntaxError`] type for errors that can occur
//! while parsing script files and applying edits to them.

use rn_core::Span;

/// Errors that can occur in the syntax engine.
///
/// # Examples
///
/// ```
/// use rn_syntax::SyntaxError;
///
/// let err = SyntaxError::invalid(4, 12, "ERROR");
/// assert!(err.is_parse_failure());
/// assert_eq!(err.to_string(), "syntax error at 4:12 (ERROR)");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    /// Failed to set a grammar on the parser.
    #[error("failed to set {0} language")]
    LanguageInit(&'static str),

    /// Failed to compile a tree-sitter query.
    #[error("failed to compile query at offset {offset}: {kind:?}")]
    QueryCompile {
        /// The byte offset in the query string where the error occurred.
        offset: usize,
        /// The kind of query error.
        kind: tree_sitter::QueryError,
    },

    /// The parser returned no tree (cancelled or out of memory).
    #[error("failed to parse source code")]
    Parse,

    /// The text parsed, but the tree contains error or missing nodes.
    #[error("syntax error at {line}:{column} ({node})")]
    Invalid {
        /// 1-based line of the first error node.
        line: u32,
        /// 1-based column of the first error node.
        column: u32,
        /// Kind of the offending node.
        node: String,
    },

    /// The file's language has no parse dialect.
    #[error("no parse dialect for {0} files")]
    UnsupportedLanguage(&'static str),

    /// Two edits touch the same bytes.
    #[error("overlapping edits at {}..{} and {}..{}", first.start, first.end, second.start, second.end)]
    OverlappingEdits {
        /// The earlier edit.
        first: Span,
        /// The later edit.
        second: Span,
    },

    /// An edit lies outside the text or splits a character.
    #[error("edit {}..{} is out of bounds for text of {len} bytes", span.start, span.end)]
    EditOutOfBounds {
        /// The offending span.
        span: Span,
        /// Length of the text.
        len: usize,
    },

    /// Applying edits produced text that no longer parses.
    #[error("edits introduced a syntax error at {line}:{column}")]
    EditIntroducedErrors {
        /// 1-based line of the first error node in the new text.
        line: u32,
        /// 1-based column of the first error node in the new text.
        column: u32,
    },
}

impl SyntaxError {
    /// Creates a [`SyntaxError::Invalid`].
    #[must_use]
    pub fn invalid(line: u32, column: u32, node: impl Into<String>) -> Self {
        Self::Invalid {
            line,
            column,
            node: node.into(),
        }
    }

    /// Returns `true` if the input text itself does not parse.
    ///
    /// Such files are passed through unchanged by the pipeline.
    #[must_use]
    pub const fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Invalid { .. } | Self::Parse)
    }

    /// Returns the 1-based position of the error, when known.
    #[must_use]
    pub const fn position(&self) -> Option<(u32, u32)> {
        match self {
            Self::Invalid { line, column, .. } | Self::EditIntroducedErrors { line, column } => {
                Some((*line, *column))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display() {
        assert_eq!(SyntaxError::Parse.to_string(), "failed to parse source code");
    }

    #[test]
    fn test_overlap_display() {
        let err = SyntaxError::OverlappingEdits {
            first: Span::new(0, 4),
            second: Span::new(2, 6),
        };
        assert_eq!(err.to_string(), "overlapping edits at 0..4 and 2..6");
        assert!(!err.is_parse_failure());
    }

    #[test]
    fn test_position() {
        assert_eq!(SyntaxError::invalid(2, 3, "MISSING").position(), Some((2, 3)));
        assert_eq!(
            SyntaxError::EditIntroducedErrors { line: 1, column: 9 }.position(),
            Some((1, 9))
        );
        assert_eq!(SyntaxError::Parse.position(), None);
    }
}
