//! Error types for the rn-core crate.
//!
//! [`ConfigError`] covers configuration loading. [`ConversionError`] is the
//! run-level taxonomy every stage maps its own failures into before they
//! become log entries.

use camino::Utf8PathBuf;

use crate::log::Severity;

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use rn_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::MissingDirectory(Utf8PathBuf::from("/some/path"));
/// assert!(error.to_string().contains("/some/path"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The provided path is invalid or malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path.
        path: Utf8PathBuf,
        /// Explanation of why the path is invalid.
        reason: String,
    },

    /// A required directory does not exist.
    #[error("missing required directory: {0}")]
    MissingDirectory(Utf8PathBuf),

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Run-level failure categories.
///
/// None of these escape a run as an `Err`: each is converted into a log entry
/// at the stage where it happens, with the severity [`severity`] returns.
///
/// [`severity`]: ConversionError::severity
///
/// # Examples
///
/// ```
/// use rn_core::{ConversionError, Severity};
///
/// let error = ConversionError::parse_failure("src/Broken.js", 3, 14, "unexpected token");
/// assert_eq!(error.severity(), Severity::Error);
/// assert!(error.is_recoverable());
/// assert!(error.to_string().contains("src/Broken.js:3:14"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConversionError {
    /// A file could not be parsed; it is passed through unchanged.
    #[error("{path}:{line}:{column}: parse failure: {message}")]
    ParseFailure {
        /// The file.
        path: Utf8PathBuf,
        /// 1-based line of the first error.
        line: u32,
        /// 1-based column of the first error.
        column: u32,
        /// What went wrong.
        message: String,
    },

    /// The route table could not be extracted; the project is treated as
    /// routeless.
    #[error("route extraction failed{}: {reason}", path.as_ref().map(|p| format!(" in {p}")).unwrap_or_default())]
    RouteExtractionFailure {
        /// The router configuration file, when one was found.
        path: Option<Utf8PathBuf>,
        /// What went wrong.
        reason: String,
    },

    /// The input held no files; a default project is emitted.
    #[error("input contained no files; emitting a default project")]
    EmptyInput,

    /// Validation found problems; the output is still returned.
    #[error("output validation reported {count} problem(s)")]
    ValidationFailure {
        /// Number of validation errors.
        count: usize,
    },

    /// An unexpected internal fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConversionError {
    /// Creates a [`ConversionError::ParseFailure`].
    #[must_use]
    pub fn parse_failure(
        path: impl Into<Utf8PathBuf>,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        Self::ParseFailure {
            path: path.into(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Creates a [`ConversionError::RouteExtractionFailure`].
    #[must_use]
    pub fn route_extraction(path: Option<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self::RouteExtractionFailure {
            path,
            reason: reason.into(),
        }
    }

    /// Creates a [`ConversionError::Internal`].
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the log severity this error is recorded with.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::EmptyInput | Self::ValidationFailure { .. } => Severity::Warning,
            Self::ParseFailure { .. } | Self::RouteExtractionFailure { .. } | Self::Internal(_) => {
                Severity::Error
            }
        }
    }

    /// Returns `true` if the run continues after this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    /// Returns the file this error is about, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::ParseFailure { path, .. } => Some(path),
            Self::RouteExtractionFailure { path, .. } => path.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::InvalidOption {
            option: "max_parallel_jobs".to_owned(),
            reason: "must be positive".to_owned(),
        };
        let msg = error.to_string();
        assert!(msg.contains("max_parallel_jobs"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_route_extraction_display() {
        let with_path =
            ConversionError::route_extraction(Some("src/App.js".into()), "duplicate route");
        assert_eq!(
            with_path.to_string(),
            "route extraction failed in src/App.js: duplicate route"
        );
        let without = ConversionError::route_extraction(None, "no config");
        assert_eq!(without.to_string(), "route extraction failed: no config");
    }

    #[test]
    fn test_severities() {
        assert_eq!(ConversionError::EmptyInput.severity(), Severity::Warning);
        assert_eq!(
            ConversionError::ValidationFailure { count: 2 }.severity(),
            Severity::Warning
        );
        assert_eq!(ConversionError::internal("boom").severity(), Severity::Error);
        assert!(!ConversionError::internal("boom").is_recoverable());
        assert!(ConversionError::EmptyInput.is_recoverable());
    }

    #[test]
    fn test_error_path() {
        let error = ConversionError::parse_failure("src/A.js", 1, 1, "x");
        assert_eq!(error.path().map(|p| p.as_str()), Some("src/A.js"));
        assert!(ConversionError::EmptyInput.path().is_none());
    }
}
