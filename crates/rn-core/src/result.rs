//! The value a conversion run returns.
//!
//! [`ConversionResult`] is produced for every run, including failed and
//! aborted ones. Its JSON shape uses camelCase keys; the output categories
//! are flattened to the top level.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::log::{LogBuckets, LogEntry};
use crate::output::{FileNode, OutputTree};
use crate::types::{ConversionState, RouteTable};

/// Summary counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStats {
    /// Number of input files after ingestion.
    pub total_files: usize,
    /// Number of script files whose text changed.
    pub converted_files: usize,
    /// Wall-clock duration of the run in milliseconds.
    pub conversion_time: u64,
    /// Rewrite actions applied across all files.
    pub rewrite_actions: usize,
    /// Script files kept as-is after a parse or rewrite failure.
    pub failed_files: usize,
}

/// Elapsed milliseconds per stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTimings {
    /// Path normalization.
    pub ingesting: u64,
    /// Project analysis.
    pub analyzing: u64,
    /// Rewrite passes.
    pub transforming: u64,
    /// Route placement and skeleton generation.
    pub route_placement: u64,
    /// Output validation.
    pub validating: u64,
}

impl StageTimings {
    /// Returns the sum of all stages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.ingesting + self.analyzing + self.transforming + self.route_placement + self.validating
    }
}

/// Outcome of output validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` when no errors were found.
    pub valid: bool,
    /// Structural problems.
    pub errors: Vec<String>,
    /// Non-blocking findings.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Builds a result from collected findings; `valid` follows `errors`.
    #[must_use]
    pub fn from_findings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Returns `true` if there is anything to report.
    #[must_use]
    pub fn has_findings(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }
}

/// What the project analyzer found, as reported to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    /// Whether the project uses the typed dialect.
    pub typed: bool,
    /// The file the route table was read from.
    pub router_config: Option<Utf8PathBuf>,
    /// Extracted routes.
    pub routes: RouteTable,
    /// Directory holding the sources (`src` or empty for the root).
    pub source_root: String,
    /// Recognized directories in use.
    pub conventions: Vec<String>,
    /// Dependencies with no role in the target framework.
    pub incompatible_dependencies: Vec<String>,
    /// The bootstrap script.
    pub entry_point: Option<Utf8PathBuf>,
    /// The component the bootstrap script renders.
    pub app_component: Option<Utf8PathBuf>,
}

/// Everything a conversion run returns.
///
/// # Examples
///
/// ```
/// use rn_core::{ConversionResult, ConversionState};
///
/// let result = ConversionResult::default();
/// assert_eq!(result.state, ConversionState::Idle);
/// let json = serde_json::to_value(&result).expect("serialize");
/// assert!(json.get("fileStructure").is_some());
/// assert!(json.get("pages").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// The output files.
    #[serde(flatten)]
    pub output: OutputTree,
    /// Nested view of the output paths.
    pub file_structure: FileNode,
    /// Log messages grouped by severity.
    pub logs: LogBuckets,
    /// Summary counters.
    pub stats: ConversionStats,
    /// Terminal state of the run.
    pub state: ConversionState,
    /// Whether the run was cancelled.
    pub aborted: bool,
    /// Output validation outcome.
    pub validation: ValidationResult,
    /// Per-stage elapsed time.
    pub timings: StageTimings,
    /// The full ordered log.
    pub entries: Vec<LogEntry>,
    /// Analyzer findings.
    pub analysis: AnalysisSummary,
}

impl ConversionResult {
    /// Returns `true` if the run reached `Completed` or
    /// `CompletedWithWarnings`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(
            self.state,
            ConversionState::Completed | ConversionState::CompletedWithWarnings
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputCategory;

    #[test]
    fn test_validation_from_findings() {
        let ok = ValidationResult::from_findings(vec![], vec!["note".to_owned()]);
        assert!(ok.valid);
        assert!(ok.has_findings());
        let bad = ValidationResult::from_findings(vec!["missing".to_owned()], vec![]);
        assert!(!bad.valid);
    }

    #[test]
    fn test_timings_total() {
        let timings = StageTimings {
            ingesting: 1,
            analyzing: 2,
            transforming: 3,
            route_placement: 4,
            validating: 5,
        };
        assert_eq!(timings.total(), 15);
    }

    #[test]
    fn test_result_json_keys() {
        let mut result = ConversionResult::default();
        result
            .output
            .insert(OutputCategory::Pages, "pages/index.js", "x");
        result.stats.total_files = 3;
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["pages"]["pages/index.js"], "x");
        assert_eq!(json["stats"]["totalFiles"], 3);
        assert!(json["stats"]["conversionTime"].is_u64());
        assert!(json["logs"]["errors"].is_array());

        let back: ConversionResult = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back.output.pages.len(), 1);
    }
}
