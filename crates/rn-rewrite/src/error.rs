//! Error types for the rn-rewrite crate.
//!
//! This module provides [`RewriteError`] for failures while classifying or
//! rewriting a single file.

use rn_syntax::SyntaxError;

/// Errors that can occur while rewriting one file.
///
/// # Error Recovery Strategy
///
/// Every variant is scoped to the file being rewritten. The orchestrator
/// logs the failure against that file, keeps the file's original text, and
/// moves on to the next file.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The file did not parse.
    #[error("parse failed: {0}")]
    Parse(#[source] SyntaxError),

    /// Import extraction or another read-only query failed.
    #[error("classification failed: {0}")]
    Classify(#[source] SyntaxError),

    /// A pass produced an edit batch the engine rejected.
    #[error("{pass} pass failed: {source}")]
    Pass {
        /// Name of the failing pass.
        pass: &'static str,
        /// The underlying engine error.
        #[source]
        source: SyntaxError,
    },
}

impl RewriteError {
    /// Creates a [`RewriteError::Pass`].
    #[must_use]
    pub const fn pass(pass: &'static str, source: SyntaxError) -> Self {
        Self::Pass { pass, source }
    }

    /// Returns the 1-based position of a parse failure, if any.
    #[must_use]
    pub const fn parse_position(&self) -> Option<(u32, u32)> {
        match self {
            Self::Parse(source) => source.position(),
            _ => None,
        }
    }

    /// Returns `true` if the input itself was unparseable.
    #[must_use]
    pub const fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        let err = RewriteError::Parse(SyntaxError::invalid(3, 7, "ERROR"));
        assert!(err.is_parse_failure());
        assert_eq!(err.parse_position(), Some((3, 7)));

        let err = RewriteError::pass("imports", SyntaxError::EditIntroducedErrors { line: 1, column: 1 });
        assert!(!err.is_parse_failure());
        assert_eq!(err.parse_position(), None);
        assert!(err.to_string().starts_with("imports pass failed"));
    }
}
