//! Error types for the rn-convert crate.
//!
//! This module provides [`ConvertError`] for failures while reading a
//! project from disk, transforming files, or extracting routes.

use camino::Utf8PathBuf;
use rn_core::ConversionError;
use rn_rewrite::RewriteError;

/// Errors that can occur while converting a project.
///
/// # Error Recovery Strategy
///
/// - **Walker errors** ([`ConvertError::Walk`], [`ConvertError::Config`]):
///   Fatal for the CLI - nothing was read
/// - **File read errors** ([`ConvertError::Read`]): Log warning, skip file
/// - **Rewrite errors** ([`ConvertError::Rewrite`]): Log error, keep the
///   original text, continue the run
/// - **Route errors** ([`ConvertError::Routes`]): Log error, fall back to a
///   routeless project
/// - **Internal errors** ([`ConvertError::Internal`]): The run ends `Failed`
///
/// # Examples
///
/// ```
/// use rn_convert::ConvertError;
///
/// let err = ConvertError::routes(Some("src/App.js".into()), "duplicate route '/about'");
/// assert!(err.is_recoverable());
/// assert!(err.to_string().contains("src/App.js"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Failed to walk a directory.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Failed to read a file.
    #[error("failed to read file {path}: {source}")]
    Read {
        /// The path of the file that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// Invalid walker or run configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A file could not be rewritten.
    #[error("{path}: {source}")]
    Rewrite {
        /// The file being rewritten.
        path: Utf8PathBuf,
        /// What went wrong.
        #[source]
        source: RewriteError,
    },

    /// The route table could not be extracted.
    #[error("route extraction failed{}: {reason}", path.as_ref().map(|p| format!(" in {p}")).unwrap_or_default())]
    Routes {
        /// The router configuration file, when one was found.
        path: Option<Utf8PathBuf>,
        /// Why extraction failed.
        reason: String,
    },

    /// An invariant of the pipeline was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Creates a new [`ConvertError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ConvertError::Config`] error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a new [`ConvertError::Rewrite`] error.
    #[inline]
    pub fn rewrite(path: impl Into<Utf8PathBuf>, source: RewriteError) -> Self {
        Self::Rewrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ConvertError::Routes`] error.
    #[inline]
    pub fn routes(path: Option<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self::Routes {
            path,
            reason: reason.into(),
        }
    }

    /// Creates a new [`ConvertError::Internal`] error.
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns `true` if the run can continue past this error.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Read { .. } | Self::Rewrite { .. } | Self::Routes { .. }
        )
    }

    /// Maps this error into the run-level taxonomy reported to callers.
    #[must_use]
    pub fn to_conversion_error(&self) -> ConversionError {
        match self {
            Self::Rewrite { path, source } if source.is_parse_failure() => {
                let (line, column) = source.parse_position().unwrap_or((1, 1));
                ConversionError::parse_failure(path.clone(), line, column, source.to_string())
            }
            Self::Routes { path, reason } => {
                ConversionError::route_extraction(path.clone(), reason.clone())
            }
            other => ConversionError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConvertError::config("root path does not exist: /nope");
        assert_eq!(
            err.to_string(),
            "invalid configuration: root path does not exist: /nope"
        );
        assert!(!err.is_recoverable());

        let err = ConvertError::routes(None, "no routes");
        assert_eq!(err.to_string(), "route extraction failed: no routes");
    }

    #[test]
    fn test_routes_map_to_extraction_failure() {
        let err = ConvertError::routes(Some("src/App.js".into()), "duplicate");
        assert!(matches!(
            err.to_conversion_error(),
            ConversionError::RouteExtractionFailure { .. }
        ));
    }

    #[test]
    fn test_internal_is_fatal() {
        let err = ConvertError::internal("worker pool");
        assert!(!err.is_recoverable());
        assert!(!err.to_conversion_error().is_recoverable());
    }
}
