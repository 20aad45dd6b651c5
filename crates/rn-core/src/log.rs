//! The run-scoped conversion log.
//!
//! A [`ConversionLog`] is created (or cleared) at the start of each run and
//! handed by reference to every stage. Appends are serialized through a
//! mutex so per-file workers can log concurrently; every entry is also
//! emitted as a `tracing` event.

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Progress information.
    Info,
    /// Something needs manual review.
    Warning,
    /// A file or stage failed; the run continued.
    Error,
    /// A unit of work completed.
    Success,
}

impl Severity {
    /// Returns a lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

/// One entry of the conversion log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Entry severity.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// The input file the entry is about, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Utf8PathBuf>,
}

/// Log messages grouped by severity, as exposed on the conversion result.
///
/// Success entries are reported under `info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogBuckets {
    /// Error messages.
    pub errors: Vec<String>,
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Info and success messages.
    pub info: Vec<String>,
}

/// Append-only, ordered log for one conversion run.
///
/// # Examples
///
/// ```
/// use rn_core::{ConversionLog, Severity};
///
/// let log = ConversionLog::new();
/// log.info("analyzing 3 files");
/// log.file_error("src/Broken.js", "unexpected token at 2:5");
///
/// assert_eq!(log.len(), 2);
/// assert_eq!(log.count(Severity::Error), 1);
/// assert_eq!(log.errors_for("src/Broken.js").len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ConversionLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl ConversionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every entry. Called at the start of a run.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Appends an entry.
    pub fn push(&self, severity: Severity, message: impl Into<String>, path: Option<&Utf8Path>) {
        let message = message.into();
        let path = path.map(Utf8Path::to_path_buf);
        match severity {
            Severity::Error => {
                tracing::error!(path = ?path, "{message}");
            }
            Severity::Warning => {
                tracing::warn!(path = ?path, "{message}");
            }
            Severity::Info | Severity::Success => {
                tracing::info!(severity = severity.as_str(), path = ?path, "{message}");
            }
        }
        let entry = LogEntry {
            severity,
            message,
            timestamp: now_millis(),
            path,
        };
        self.entries.lock().push(entry);
    }

    /// Appends an info entry.
    pub fn info(&self, message: impl Into<String>) {
        self.push(Severity::Info, message, None);
    }

    /// Appends a warning entry.
    pub fn warning(&self, message: impl Into<String>) {
        self.push(Severity::Warning, message, None);
    }

    /// Appends an error entry.
    pub fn error(&self, message: impl Into<String>) {
        self.push(Severity::Error, message, None);
    }

    /// Appends a success entry.
    pub fn success(&self, message: impl Into<String>) {
        self.push(Severity::Success, message, None);
    }

    /// Appends a warning about a specific file. The message is prefixed
    /// with the path.
    pub fn file_warning(&self, path: impl AsRef<Utf8Path>, message: impl AsRef<str>) {
        let path = path.as_ref();
        self.push(
            Severity::Warning,
            format!("{path}: {}", message.as_ref()),
            Some(path),
        );
    }

    /// Appends an error about a specific file. The message is prefixed with
    /// the path.
    pub fn file_error(&self, path: impl AsRef<Utf8Path>, message: impl AsRef<str>) {
        let path = path.as_ref();
        self.push(
            Severity::Error,
            format!("{path}: {}", message.as_ref()),
            Some(path),
        );
    }

    /// Returns a snapshot of all entries in append order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns the number of entries with the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }

    /// Returns `true` if any warning or error was logged.
    #[must_use]
    pub fn has_problems(&self) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|e| matches!(e.severity, Severity::Warning | Severity::Error))
    }

    /// Returns the error entries attached to a path.
    #[must_use]
    pub fn errors_for(&self, path: impl AsRef<Utf8Path>) -> Vec<LogEntry> {
        let path = path.as_ref();
        self.entries
            .lock()
            .iter()
            .filter(|e| e.severity == Severity::Error && e.path.as_deref() == Some(path))
            .cloned()
            .collect()
    }

    /// Groups the messages by severity.
    #[must_use]
    pub fn buckets(&self) -> LogBuckets {
        let entries = self.entries.lock();
        let mut buckets = LogBuckets::default();
        for entry in entries.iter() {
            let bucket = match entry.severity {
                Severity::Error => &mut buckets.errors,
                Severity::Warning => &mut buckets.warnings,
                Severity::Info | Severity::Success => &mut buckets.info,
            };
            bucket.push(entry.message.clone());
        }
        buckets
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_order_and_clear() {
        let log = ConversionLog::new();
        log.info("first");
        log.warning("second");
        log.success("third");
        let messages: Vec<_> = log.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_buckets_fold_success_into_info() {
        let log = ConversionLog::new();
        log.info("a");
        log.success("b");
        log.warning("c");
        log.error("d");
        let buckets = log.buckets();
        assert_eq!(buckets.info, vec!["a", "b"]);
        assert_eq!(buckets.warnings, vec!["c"]);
        assert_eq!(buckets.errors, vec!["d"]);
    }

    #[test]
    fn test_file_entries_reference_path() {
        let log = ConversionLog::new();
        log.file_error("src/Bad.js", "parse failure");
        log.file_warning("src/Bad.js", "not an error");
        let errors = log.errors_for("src/Bad.js");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("src/Bad.js"));
        assert!(log.has_problems());
        assert!(log.errors_for("src/Other.js").is_empty());
    }

    #[test]
    fn test_concurrent_appends() {
        let log = ConversionLog::new();
        std::thread::scope(|scope| {
            for worker in 0..4 {
                let log = &log;
                scope.spawn(move || {
                    for i in 0..25 {
                        log.info(format!("worker {worker} item {i}"));
                    }
                });
            }
        });
        assert_eq!(log.len(), 100);
    }

    #[test]
    fn test_entry_timestamps() {
        let log = ConversionLog::new();
        log.info("stamped");
        assert!(log.entries()[0].timestamp > 0);
    }
}
