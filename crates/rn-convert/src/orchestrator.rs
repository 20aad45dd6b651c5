//! The conversion run.
//!
//! A [`Converter`] drives one run through its stages:
//!
//! ```text
//! Idle → Ingesting → Analyzing → Transforming → RoutePlacement → Validating
//!                                                                    │
//!                          Completed | CompletedWithWarnings | Failed ◄┘
//! ```
//!
//! # Concurrency
//!
//! Only the transforming stage is parallel. Scripts are rewritten on a
//! dedicated rayon pool bounded by `max_parallel_jobs`; each worker owns a
//! [`SyntaxEngine`] created through `map_init`. Workers share the
//! [`ConversionLog`] (mutex) and [`ConvertStats`] (atomics) and nothing else.
//!
//! # Failure containment
//!
//! [`Converter::convert`] never panics through its caller and never
//! returns an error: a fault inside one file keeps that file's original
//! text, and a fault outside the per-file work ends the run `Failed` with a
//! minimal project.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use camino::Utf8PathBuf;
use rayon::prelude::*;
use rn_core::{
    AnalysisSummary, ConversionError, ConversionLog, ConversionResult, ConversionSettings,
    ConversionState, ConvertConfig, Language, LogBuckets, OutputTree, SettingsInput, Severity,
    SourceFile, StageTimings, ValidationResult,
};
use rn_rewrite::rewrite_file;
use rn_syntax::SyntaxEngine;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::analyzer::{DocumentInfo, ProjectAnalysis, analyze};
use crate::api::{collect_endpoints, place_api_stubs};
use crate::error::ConvertError;
use crate::pages::{place_routeless_index, place_routes};
use crate::paths::normalize_input_path;
use crate::placement::{ConvertedFile, FileOutcome, Placement};
use crate::skeleton::{LayoutComponent, Skeleton, write_skeleton};
use crate::stats::ConvertStats;
use crate::validator::{Expectations, synthesize_missing, validate};

/// Converts React-Router projects.
///
/// # Examples
///
/// ```
/// use rn_convert::Converter;
/// use rn_core::{ConversionState, SettingsInput};
///
/// let converter = Converter::new(SettingsInput::default());
/// let result = converter.convert([(
///     "src/pages/Home.js",
///     "export default function Home() { return <h1>Home</h1>; }\n",
/// )]);
/// assert!(result.is_success());
/// assert!(result.output.contains("components/pages/Home.js"));
/// assert!(result.output.contains("pages/_app.js"));
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    input: SettingsInput,
    config: ConvertConfig,
    cancel: CancellationToken,
}

/// What `rr-next analyze` reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Analyzer findings.
    pub analysis: AnalysisSummary,
    /// Metadata read from the HTML shell.
    pub document: DocumentInfo,
    /// Language of every ingested file.
    pub languages: BTreeMap<Utf8PathBuf, Language>,
    /// Log messages grouped by severity.
    pub logs: LogBuckets,
}

impl Converter {
    /// Creates a converter with default configuration.
    #[must_use]
    pub fn new(input: SettingsInput) -> Self {
        Self {
            input,
            config: ConvertConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a converter from loaded configuration.
    #[must_use]
    pub fn from_config(config: ConvertConfig) -> Self {
        Self {
            input: config.settings_input(),
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `token` to cancel runs.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns the token that cancels this converter's runs.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Converts a project given as `(path, text)` pairs.
    pub fn convert<I, P, T>(&self, files: I) -> ConversionResult
    where
        I: IntoIterator<Item = (P, T)>,
        P: AsRef<str>,
        T: Into<String>,
    {
        let started = Instant::now();
        let raw: Vec<(String, String)> = files
            .into_iter()
            .map(|(path, text)| (path.as_ref().to_owned(), text.into()))
            .collect();

        let mut run = Run::new(self);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| run.execute(raw)));
        let finished = match outcome {
            Ok(Ok(finished)) => finished,
            Ok(Err(err)) => run.fail(&err.to_conversion_error()),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                run.fail(&ConversionError::internal(message))
            }
        };
        run.into_result(finished, elapsed_ms(started))
    }

    /// Ingests and analyzes a project without converting it.
    pub fn analyze<I, P, T>(&self, files: I) -> AnalysisReport
    where
        I: IntoIterator<Item = (P, T)>,
        P: AsRef<str>,
        T: Into<String>,
    {
        let log = ConversionLog::new();
        let raw = files
            .into_iter()
            .map(|(path, text)| (path.as_ref().to_owned(), text.into()))
            .collect();
        let sources = ingest(raw, &self.config, &log);
        let analysis = match SyntaxEngine::new() {
            Ok(mut engine) => analyze(&sources, &mut engine, &log),
            Err(err) => {
                log.error(format!("syntax engine unavailable: {err}"));
                ProjectAnalysis::default()
            }
        };
        AnalysisReport {
            analysis: analysis.summary(),
            document: analysis.document.clone(),
            languages: analysis.languages,
            logs: log.buckets(),
        }
    }
}

/// Converts a project with default configuration.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use rn_convert::convert_project;
/// use rn_core::{ConversionState, SettingsInput};
///
/// let result = convert_project(BTreeMap::<String, String>::new(), &SettingsInput::default());
/// assert_eq!(result.state, ConversionState::CompletedWithWarnings);
/// assert!(result.output.contains("pages/index.js"));
/// ```
pub fn convert_project<I, P, T>(files: I, input: &SettingsInput) -> ConversionResult
where
    I: IntoIterator<Item = (P, T)>,
    P: AsRef<str>,
    T: Into<String>,
{
    Converter::new(*input).convert(files)
}

/// How the run's stages ended.
struct Finished {
    output: OutputTree,
    state: ConversionState,
    aborted: bool,
    validation: ValidationResult,
}

/// State of one run.
struct Run<'a> {
    converter: &'a Converter,
    log: ConversionLog,
    stats: ConvertStats,
    state: ConversionState,
    timings: StageTimings,
    settings: ConversionSettings,
    analysis: AnalysisSummary,
}

impl<'a> Run<'a> {
    fn new(converter: &'a Converter) -> Self {
        Self {
            converter,
            log: ConversionLog::new(),
            stats: ConvertStats::new(),
            state: ConversionState::Idle,
            timings: StageTimings::default(),
            settings: ConversionSettings::resolve(
                &converter.input,
                false,
                converter.config.max_parallel_jobs,
            ),
            analysis: AnalysisSummary::default(),
        }
    }

    fn advance(&mut self, to: ConversionState) {
        tracing::debug!(from = %self.state, to = %to, "state transition");
        self.state = to;
    }

    fn cancelled(&self) -> bool {
        self.converter.cancel.is_cancelled()
    }

    fn execute(&mut self, raw: Vec<(String, String)>) -> Result<Finished, ConvertError> {
        self.advance(ConversionState::Ingesting);
        let stage = Instant::now();
        let sources = ingest(raw, &self.converter.config, &self.log);
        self.stats.set_total(sources.len());
        if sources.is_empty() {
            let error = ConversionError::EmptyInput;
            self.log.push(error.severity(), error.to_string(), None);
        }
        self.timings.ingesting = elapsed_ms(stage);

        self.advance(ConversionState::Analyzing);
        let stage = Instant::now();
        let mut engine = SyntaxEngine::new()
            .map_err(|e| ConvertError::internal(format!("syntax engine unavailable: {e}")))?;
        let analysis = analyze(&sources, &mut engine, &self.log);
        self.settings = ConversionSettings::resolve(
            &self.converter.input,
            analysis.typed,
            self.converter.config.max_parallel_jobs,
        );
        self.analysis = analysis.summary();
        self.timings.analyzing = elapsed_ms(stage);

        self.advance(ConversionState::Transforming);
        let stage = Instant::now();
        let converted = self.transform(&sources)?;
        self.timings.transforming = elapsed_ms(stage);

        self.advance(ConversionState::RoutePlacement);
        let stage = Instant::now();
        let placement = Placement::plan(&sources, &analysis, &self.settings);
        let mut output = OutputTree::default();
        let placed = placement.place_sources(&mut engine, &converted, &analysis, &mut output, &self.log);

        if self.cancelled() {
            self.timings.route_placement = elapsed_ms(stage);
            let snapshot = self.stats.snapshot();
            self.log.warning(format!(
                "conversion aborted; {} of {} script(s) were not processed",
                snapshot.skipped,
                snapshot.scripts + snapshot.failed + snapshot.skipped
            ));
            return Ok(Finished {
                output,
                state: ConversionState::CompletedWithWarnings,
                aborted: true,
                validation: ValidationResult::default(),
            });
        }

        let mut pages = place_routes(&analysis.routes, &placement, &self.settings, &mut output, &self.log);
        if analysis.routes.is_empty() {
            pages.extend(place_routeless_index(
                analysis.app_component(),
                &placement,
                &self.settings,
                &mut output,
            ));
        }

        let endpoints = collect_endpoints(
            converted
                .iter()
                .filter_map(|file| file.signals.as_ref())
                .flat_map(|signals| signals.api_calls.iter()),
        );
        let stubs = place_api_stubs(&endpoints, &self.settings, &mut output);
        if !stubs.is_empty() {
            self.log
                .info(format!("Generated {} API handler stub(s)", stubs.len()));
        }

        let layout = layout_component(&analysis, &converted, &placement);
        write_skeleton(
            &Skeleton {
                settings: &self.settings,
                analysis: &analysis,
                hoisted: &placed.hoisted,
                layout: layout.as_ref(),
            },
            &mut output,
            &self.log,
        );
        self.timings.route_placement = elapsed_ms(stage);

        self.advance(ConversionState::Validating);
        let stage = Instant::now();
        let mut checked = placed.changed_scripts;
        checked.extend(pages.iter().map(|p| p.path.clone()));
        checked.extend(stubs);
        let expectations = Expectations {
            routes: pages,
            checked_scripts: checked,
            use_directory_router: self.settings.use_directory_router,
        };
        let mut validation = validate(&output, &expectations, &mut engine);
        if !validation.valid {
            let added = synthesize_missing(&mut output, &self.settings);
            for path in &added {
                self.log.warning(format!("{path} was missing; wrote a default"));
            }
            if !added.is_empty() {
                validation = validate(&output, &expectations, &mut engine);
            }
        }
        if !validation.valid {
            let error = ConversionError::ValidationFailure {
                count: validation.errors.len(),
            };
            self.log.push(error.severity(), error.to_string(), None);
            for finding in &validation.errors {
                self.log.warning(format!("validation: {finding}"));
            }
        }
        for finding in &validation.warnings {
            self.log.warning(format!("validation: {finding}"));
        }
        self.timings.validating = elapsed_ms(stage);

        let snapshot = self.stats.snapshot();
        self.log.success(format!(
            "Converted {} of {} script file(s); {} output file(s)",
            snapshot.converted,
            snapshot.scripts + snapshot.failed,
            output.len()
        ));
        let state = if self.log.has_problems() || !validation.valid {
            ConversionState::CompletedWithWarnings
        } else {
            ConversionState::Completed
        };
        Ok(Finished {
            output,
            state,
            aborted: false,
            validation,
        })
    }

    /// Runs the rewrite passes over every script on a bounded pool.
    fn transform(&self, sources: &[SourceFile]) -> Result<Vec<ConvertedFile>, ConvertError> {
        let threads = self.settings.max_parallel_jobs.unwrap_or(0);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("rr-next-worker-{i}"))
            .build()
            .map_err(|e| ConvertError::internal(format!("failed to build worker pool: {e}")))?;

        let settings = self.settings;
        let log = &self.log;
        let stats = &self.stats;
        let cancel = &self.converter.cancel;
        let converted = pool.install(|| {
            sources
                .par_iter()
                .map_init(
                    || SyntaxEngine::new().ok(),
                    |engine, source| {
                        transform_file(engine, source, &settings, log, stats, cancel)
                    },
                )
                .collect::<Vec<_>>()
        });
        let snapshot = stats.snapshot();
        tracing::info!(
            scripts = snapshot.scripts,
            converted = snapshot.converted,
            failed = snapshot.failed,
            skipped = snapshot.skipped,
            "transformed scripts"
        );
        Ok(converted.into_iter().flatten().collect())
    }

    /// Ends the run after a fault outside the per-file work.
    fn fail(&mut self, error: &ConversionError) -> Finished {
        self.log.push(Severity::Error, error.to_string(), None);
        tracing::debug!(from = %self.state, to = %ConversionState::Failed, "state transition");
        self.state = ConversionState::Failed;
        Finished {
            output: minimal_project(&self.settings),
            state: ConversionState::Failed,
            aborted: false,
            validation: ValidationResult::default(),
        }
    }

    fn into_result(mut self, finished: Finished, elapsed: u64) -> ConversionResult {
        if self.state != finished.state {
            self.advance(finished.state);
        }
        ConversionResult {
            file_structure: finished.output.file_structure(),
            output: finished.output,
            logs: self.log.buckets(),
            stats: self.stats.snapshot().to_conversion_stats(elapsed),
            state: finished.state,
            aborted: finished.aborted,
            validation: finished.validation,
            timings: self.timings,
            entries: self.log.entries(),
            analysis: self.analysis,
        }
    }
}

/// Normalizes input paths and drops ignored and unusable entries.
fn ingest(raw: Vec<(String, String)>, config: &ConvertConfig, log: &ConversionLog) -> Vec<SourceFile> {
    let mut accepted: BTreeMap<String, String> = BTreeMap::new();
    for (path, text) in raw {
        let Some(normalized) = normalize_input_path(&path) else {
            log.warning(format!("ignored input path '{path}'"));
            continue;
        };
        if config.is_ignored(&normalized) {
            tracing::debug!(path = %normalized, "skipping ignored path");
            continue;
        }
        if accepted.insert(normalized.clone(), text).is_some() {
            log.warning(format!("{normalized}: given more than once; the last copy was kept"));
        }
    }
    tracing::debug!(files = accepted.len(), "ingested files");
    accepted
        .into_iter()
        .map(|(path, text)| SourceFile::new(path, text))
        .collect()
}

/// Rewrites one file, or returns `None` if the run was cancelled first.
fn transform_file(
    engine: &mut Option<SyntaxEngine>,
    source: &SourceFile,
    settings: &ConversionSettings,
    log: &ConversionLog,
    stats: &ConvertStats,
    cancel: &CancellationToken,
) -> Option<ConvertedFile> {
    if !source.language.is_script() {
        return Some(ConvertedFile::untouched(source.clone(), FileOutcome::Data));
    }
    if cancel.is_cancelled() {
        stats.increment_skipped();
        return None;
    }

    let Some(parser) = engine.as_mut() else {
        stats.increment_failed();
        log.file_error(&source.path, "syntax engine unavailable on this worker");
        return Some(ConvertedFile::untouched(source.clone(), FileOutcome::Failed));
    };
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rewrite_file(parser, source, settings)));
    let rewrite = match outcome {
        Ok(Ok(rewrite)) => rewrite,
        Ok(Err(err)) => {
            stats.increment_failed();
            let error = ConvertError::rewrite(source.path.clone(), err).to_conversion_error();
            log.push(error.severity(), error.to_string(), Some(source.path.as_path()));
            return Some(ConvertedFile::untouched(source.clone(), FileOutcome::Failed));
        }
        Err(payload) => {
            *engine = SyntaxEngine::new().ok();
            stats.increment_failed();
            log.file_error(
                &source.path,
                format!("internal fault while rewriting: {}", panic_message(payload.as_ref())),
            );
            return Some(ConvertedFile::untouched(source.clone(), FileOutcome::Failed));
        }
    };

    stats.increment_scripts();
    stats.add_flagged(rewrite.effects.flagged);
    for advisory in &rewrite.effects.advisories {
        log.file_warning(&source.path, advisory);
    }
    for note in &rewrite.effects.notes {
        log.push(Severity::Info, note.as_str(), Some(source.path.as_path()));
    }
    let outcome = if rewrite.changed() {
        stats.record_converted(rewrite.actions);
        FileOutcome::Rewritten
    } else {
        FileOutcome::Unchanged
    };
    Some(ConvertedFile {
        source: source.clone().with_language(rewrite.language),
        text: rewrite.text,
        outcome,
        signals: Some(rewrite.signals),
    })
}

/// The app component wraps every page when it held the routing
/// containers, which the rewrite turned into a layout.
fn layout_component(
    analysis: &ProjectAnalysis,
    converted: &[ConvertedFile],
    placement: &Placement,
) -> Option<LayoutComponent> {
    if analysis.routes.is_empty() {
        return None;
    }
    let app = analysis.app_component()?;
    let held_containers = converted
        .iter()
        .find(|file| file.source.path == app.path)
        .and_then(|file| file.signals.as_ref())
        .is_some_and(|signals| !signals.containers.is_empty());
    if !held_containers {
        return None;
    }
    Some(LayoutComponent {
        local: app.name.clone(),
        export: app.export.clone(),
        module: placement.destination(&app.path)?.to_path_buf(),
    })
}

/// The project a failed run returns.
fn minimal_project(settings: &ConversionSettings) -> OutputTree {
    let mut output = OutputTree::default();
    let analysis = ProjectAnalysis::default();
    write_skeleton(
        &Skeleton {
            settings,
            analysis: &analysis,
            hoisted: &[],
            layout: None,
        },
        &mut output,
        &ConversionLog::new(),
    );
    synthesize_missing(&mut output, settings);
    output
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}
