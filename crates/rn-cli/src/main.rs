//! CLI entry point for rr-next.
//!
//! This binary converts a React-Router single-page application on disk
//! into a Next.js project directory.
//!
//! # Usage
//!
//! ```bash
//! rr-next [OPTIONS] <COMMAND>
//!
//! # Convert into ./next-app
//! rr-next convert ./my-spa
//!
//! # Nested app/ router with typed output, into a chosen directory
//! rr-next convert ./my-spa --app-dir --typescript --out-dir ./my-next-app
//!
//! # Print what the analyzer found
//! rr-next analyze ./my-spa
//!
//! # Full JSON result without writing any files
//! rr-next report ./my-spa --output result.json
//! ```
//!
//! A `rr-next.json` file in the project root is loaded when `--config` is
//! not given; command-line flags override it.

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use rn_convert::placement::binary_destination;
use rn_convert::{Converter, ProjectFiles, ProjectWalker};
use rn_core::{Config, ConfigError, ConversionResult, ConversionState};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration file looked up in the project root.
const CONFIG_FILE_NAME: &str = "rr-next.json";

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Converts a React-Router single-page application into a Next.js project.
#[derive(Parser)]
#[command(name = "rr-next", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON).
    ///
    /// Defaults to `rr-next.json` in the project directory when present.
    #[arg(short, long, global = true, env = "RR_NEXT_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert a project and write the result to the output directory.
    Convert {
        /// Project directory to convert.
        project: Utf8PathBuf,

        #[command(flatten)]
        options: ConvertArgs,

        /// Directory the converted project is written to.
        #[arg(short, long, env = "RR_NEXT_OUT_DIR")]
        out_dir: Option<Utf8PathBuf>,

        /// Write into a non-empty output directory.
        #[arg(long)]
        overwrite: bool,
    },

    /// Analyze a project and print the findings as JSON.
    Analyze {
        /// Project directory to analyze.
        project: Utf8PathBuf,

        #[command(flatten)]
        options: ConvertArgs,
    },

    /// Convert a project and print the full result as JSON without
    /// writing the converted files.
    Report {
        /// Project directory to convert.
        project: Utf8PathBuf,

        #[command(flatten)]
        options: ConvertArgs,

        /// Output file (defaults to stdout).
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },
}

/// Conversion options shared by every subcommand.
#[derive(Args, Clone, Default)]
struct ConvertArgs {
    /// Emit the nested `app/` router instead of `pages/`.
    #[arg(long, env = "RR_NEXT_APP_DIR")]
    app_dir: bool,

    /// Emit typed (`.ts`/`.tsx`) generated files.
    #[arg(long, env = "RR_NEXT_TYPESCRIPT")]
    typescript: bool,

    /// Add example pages to a project without routes.
    #[arg(long)]
    include_examples: bool,

    /// Maximum number of worker threads.
    #[arg(short, long, env = "RR_NEXT_JOBS")]
    jobs: Option<usize>,
}

impl ConvertArgs {
    /// Applies flags on top of loaded configuration.
    ///
    /// Boolean flags only switch options on; a configuration file that
    /// enables one cannot be overridden off from the command line.
    fn apply(&self, config: &mut Config) {
        config.convert.app_dir |= self.app_dir;
        config.convert.typescript |= self.typescript;
        config.convert.include_examples |= self.include_examples;
        if self.jobs.is_some() {
            config.convert.max_parallel_jobs = self.jobs;
        }
    }
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
/// The directory walker's crates are filtered to `warn` level.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},ignore=warn,globset=warn"))
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    // Logs go to stderr so JSON on stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Loads the configuration for a project and applies command-line flags.
///
/// # Errors
///
/// Returns an error if the project directory is missing, the configuration
/// file cannot be read, or an option is invalid.
fn build_config(
    explicit: Option<&Utf8Path>,
    project: &Utf8Path,
    options: &ConvertArgs,
) -> color_eyre::Result<Config> {
    if !project.is_dir() {
        return Err(ConfigError::MissingDirectory(project.to_owned()).into());
    }

    let mut config = match explicit {
        Some(path) => {
            Config::load(path).wrap_err_with(|| format!("failed to load configuration {path}"))?
        }
        None => {
            let default = project.join(CONFIG_FILE_NAME);
            if default.is_file() {
                Config::load(&default)
                    .wrap_err_with(|| format!("failed to load configuration {default}"))?
            } else {
                Config::default()
            }
        }
    };

    options.apply(&mut config);
    config.convert.validate()?;
    Ok(config)
}

/// Reads a project directory, skipping the configured directories.
fn read_project(project: &Utf8Path, config: &Config) -> color_eyre::Result<ProjectFiles> {
    let walker = ProjectWalker::new(project)?.with_skip_dirs(&config.convert.ignore_dirs);
    let files = walker.read_project()?;
    info!(
        project = %project,
        text = files.files.len(),
        binary = files.binary.len(),
        "read project"
    );
    Ok(files)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Converts a project on a blocking worker, cancelling it on Ctrl-C.
///
/// # Errors
///
/// Returns an error if the conversion task panics outside the converter's
/// own recovery.
async fn convert_files(
    config: &Config,
    files: ProjectFiles,
    cancel: CancellationToken,
) -> color_eyre::Result<(ConversionResult, ProjectFiles)> {
    let converter = Converter::from_config(config.convert.clone()).with_cancellation(cancel.clone());

    let watcher = tokio::spawn(cancel_on_interrupt(cancel));
    let handle = tokio::task::spawn_blocking(move || {
        let result = converter.convert(files.files.iter().map(|(p, t)| (p.as_str(), t.as_str())));
        (result, files)
    });
    let outcome = handle.await;
    watcher.abort();

    outcome.map_err(|e| eyre!("conversion task failed: {e}"))
}

async fn cancel_on_interrupt(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupt received, cancelling conversion");
        token.cancel();
    }
}

/// Turns a finished run into the command's exit status.
fn check_outcome(result: &ConversionResult) -> color_eyre::Result<()> {
    if result.aborted {
        return Err(eyre!("conversion cancelled"));
    }
    if result.state == ConversionState::Failed {
        let reason = result
            .logs
            .errors
            .last()
            .map_or("unknown error", String::as_str);
        return Err(eyre!("conversion failed: {reason}"));
    }
    Ok(())
}

/// Runs `rr-next convert`.
///
/// # Errors
///
/// Returns an error if the project cannot be read, the run fails, or the
/// output cannot be written.
async fn run_convert(
    config: &Config,
    project: &Utf8Path,
    cancel: CancellationToken,
) -> color_eyre::Result<()> {
    info!(project = %project, out_dir = %config.output.out_dir, "converting project");

    ensure_writable(project, &config.output.out_dir, config.output.overwrite)?;
    let files = read_project(project, config)?;
    let (result, files) = convert_files(config, files, cancel).await?;
    check_outcome(&result)?;

    let written = write_output(&result, &files, project, &config.output.out_dir)?;
    info!(out_dir = %config.output.out_dir, files = written, "wrote converted project");

    let stdout = std::io::stdout();
    print_summary(&mut stdout.lock(), &result)?;
    Ok(())
}

/// Runs `rr-next analyze`.
///
/// # Errors
///
/// Returns an error if the project cannot be read or the report cannot be
/// written.
fn run_analyze(config: &Config, project: &Utf8Path) -> color_eyre::Result<()> {
    info!(project = %project, "analyzing project");

    let files = read_project(project, config)?;
    let converter = Converter::from_config(config.convert.clone());
    let report = converter.analyze(files.files.iter().map(|(p, t)| (p.as_str(), t.as_str())));

    let content = to_json(&report, config.output.pretty)?;
    emit(&content, None)
}

/// Runs `rr-next report`.
///
/// # Errors
///
/// Returns an error if the project cannot be read, the run fails, or the
/// report cannot be written.
async fn run_report(
    config: &Config,
    project: &Utf8Path,
    output: Option<&Utf8Path>,
    cancel: CancellationToken,
) -> color_eyre::Result<()> {
    info!(project = %project, "generating report");

    let files = read_project(project, config)?;
    let (result, _) = convert_files(config, files, cancel).await?;
    check_outcome(&result)?;

    let content = to_json(&result, config.output.pretty)?;
    emit(&content, output)
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Refuses to write into the project itself or into a non-empty directory
/// without `--overwrite`.
fn ensure_writable(project: &Utf8Path, out_dir: &Utf8Path, overwrite: bool) -> color_eyre::Result<()> {
    if !out_dir.exists() {
        return Ok(());
    }
    if !out_dir.is_dir() {
        return Err(eyre!("output path is not a directory: {out_dir}"));
    }
    if let (Ok(out), Ok(root)) = (out_dir.canonicalize_utf8(), project.canonicalize_utf8()) {
        if out == root {
            return Err(eyre!("output directory is the project directory: {out_dir}"));
        }
    }
    let non_empty = std::fs::read_dir(out_dir)
        .wrap_err_with(|| format!("failed to read output directory {out_dir}"))?
        .next()
        .is_some();
    if non_empty && !overwrite {
        return Err(eyre!(
            "output directory is not empty: {out_dir} (pass --overwrite to replace files)"
        ));
    }
    Ok(())
}

/// Writes the output tree and carries binary files over.
///
/// Returns the number of files written.
fn write_output(
    result: &ConversionResult,
    files: &ProjectFiles,
    project: &Utf8Path,
    out_dir: &Utf8Path,
) -> color_eyre::Result<usize> {
    let mut written = 0;

    for (_, path, text) in result.output.iter() {
        let destination = out_dir.join(path);
        create_parent(&destination)?;
        std::fs::write(&destination, text)
            .wrap_err_with(|| format!("failed to write {destination}"))?;
        written += 1;
    }

    for binary in &files.binary {
        let Some(relative) = binary_destination(binary.as_str(), &result.analysis.source_root)
        else {
            continue;
        };
        if result.output.contains(&relative) {
            continue;
        }
        let destination = out_dir.join(&relative);
        create_parent(&destination)?;
        std::fs::copy(project.join(binary), &destination)
            .wrap_err_with(|| format!("failed to copy {binary} to {destination}"))?;
        written += 1;
    }

    Ok(written)
}

fn create_parent(path: &Utf8Path) -> color_eyre::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create directory {parent}"))?;
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> color_eyre::Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.map_err(|e| eyre!("Failed to serialize JSON: {}", e))
}

/// Writes `content` to `output`, or to stdout if `None`.
fn emit(content: &str, output: Option<&Utf8Path>) -> color_eyre::Result<()> {
    if let Some(output_path) = output {
        std::fs::write(output_path, content)?;
        info!(path = %output_path, "Report written");
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{content}")?;
    }
    Ok(())
}

/// Prints a summary of a finished conversion.
fn print_summary(out: &mut impl Write, result: &ConversionResult) -> std::io::Result<()> {
    let stats = &result.stats;

    writeln!(out)?;
    writeln!(out, "Conversion Summary")?;
    writeln!(out, "==================")?;
    writeln!(out)?;
    writeln!(out, "State:            {}", result.state)?;
    writeln!(out, "Input files:      {}", stats.total_files)?;
    writeln!(out, "  Converted:      {}", stats.converted_files)?;
    writeln!(out, "  Failed:         {}", stats.failed_files)?;
    writeln!(out, "Rewrite actions:  {}", stats.rewrite_actions)?;
    writeln!(out, "Output files:     {}", result.output.len())?;
    writeln!(out, "Routes:           {}", result.analysis.routes.len())?;
    writeln!(out, "Time:             {} ms", stats.conversion_time)?;

    if !result.logs.errors.is_empty() {
        writeln!(out)?;
        writeln!(out, "Errors ({}):", result.logs.errors.len())?;
        for error in &result.logs.errors {
            writeln!(out, "  {error}")?;
        }
    }
    if !result.logs.warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "Warnings ({}):", result.logs.warnings.len())?;
        for warning in &result.logs.warnings {
            writeln!(out, "  {warning}")?;
        }
    }
    if !result.validation.valid {
        writeln!(out)?;
        writeln!(out, "Validation errors ({}):", result.validation.errors.len())?;
        for error in &result.validation.errors {
            writeln!(out, "  {error}")?;
        }
    }
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    let cancel = CancellationToken::new();
    let explicit = cli.config.as_deref();

    // 4. Route to appropriate command
    match &cli.command {
        Commands::Convert {
            project,
            options,
            out_dir,
            overwrite,
        } => {
            let mut config = build_config(explicit, project, options)?;
            if let Some(out_dir) = out_dir {
                config.output.out_dir.clone_from(out_dir);
            }
            config.output.overwrite |= *overwrite;
            run_convert(&config, project, cancel).await
        }
        Commands::Analyze { project, options } => {
            let config = build_config(explicit, project, options)?;
            run_analyze(&config, project)
        }
        Commands::Report {
            project,
            options,
            output,
        } => {
            let config = build_config(explicit, project, options)?;
            run_report(&config, project, output.as_deref(), cancel).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir")
    }

    fn write(root: &Utf8Path, path: &str, content: &[u8]) {
        let target = root.join(path);
        std::fs::create_dir_all(target.parent().expect("parent")).expect("mkdir");
        std::fs::write(target, content).expect("write");
    }

    fn sample_project() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        let root = utf8(&dir);
        write(
            &root,
            "src/App.js",
            b"import { BrowserRouter, Routes, Route } from 'react-router-dom';
import Home from './pages/Home';

export default function App() {
  return (
    <BrowserRouter>
      <Routes>
        <Route path=\"/\" element={<Home />} />
      </Routes>
    </BrowserRouter>
  );
}
",
        );
        write(
            &root,
            "src/index.js",
            b"import ReactDOM from 'react-dom/client';
import App from './App';

ReactDOM.createRoot(document.getElementById('root')).render(<App />);
",
        );
        write(
            &root,
            "src/pages/Home.js",
            b"export default function Home() {\n  return <h1>Home</h1>;\n}\n",
        );
        write(&root, "src/assets/logo.png", &[0x89, 0x50, 0x4e, 0x47, 0xff, 0xfe]);
        write(&root, "node_modules/react/index.js", b"module.exports = {};\n");
        dir
    }

    #[test]
    fn test_parse_convert_command() {
        let cli = Cli::try_parse_from([
            "rr-next",
            "convert",
            "./spa",
            "--app-dir",
            "--jobs",
            "2",
            "--out-dir",
            "out",
        ])
        .expect("parse");
        let Commands::Convert {
            project,
            options,
            out_dir,
            overwrite,
        } = cli.command
        else {
            unreachable!("parsed a convert command");
        };
        assert_eq!(project, "./spa");
        assert!(options.app_dir);
        assert!(!options.typescript);
        assert_eq!(options.jobs, Some(2));
        assert_eq!(out_dir.as_deref(), Some(Utf8Path::new("out")));
        assert!(!overwrite);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = sample_project();
        let root = utf8(&dir);
        write(
            &root,
            CONFIG_FILE_NAME,
            br#"{"convert": {"typescript": true, "max_parallel_jobs": 4}, "output": {"pretty": false}}"#,
        );

        let options = ConvertArgs {
            app_dir: true,
            jobs: Some(1),
            ..ConvertArgs::default()
        };
        let config = build_config(None, &root, &options).expect("config");
        assert!(config.convert.app_dir);
        assert!(config.convert.typescript);
        assert_eq!(config.convert.max_parallel_jobs, Some(1));
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let dir = sample_project();
        let options = ConvertArgs {
            jobs: Some(0),
            ..ConvertArgs::default()
        };
        assert!(build_config(None, &utf8(&dir), &options).is_err());
        assert!(build_config(None, Utf8Path::new("/no/such/project"), &ConvertArgs::default()).is_err());
    }

    #[test]
    fn test_refuses_non_empty_output() {
        let project = sample_project();
        let out = TempDir::new().expect("temp dir");
        let out_dir = utf8(&out);

        assert!(ensure_writable(&utf8(&project), &out_dir, false).is_ok());
        write(&out_dir, "keep.txt", b"mine");
        assert!(ensure_writable(&utf8(&project), &out_dir, false).is_err());
        assert!(ensure_writable(&utf8(&project), &out_dir, true).is_ok());
        assert!(ensure_writable(&utf8(&project), &utf8(&project), true).is_err());
    }

    #[tokio::test]
    async fn test_convert_writes_project() {
        let project = sample_project();
        let root = utf8(&project);
        let out = TempDir::new().expect("temp dir");

        let mut config = build_config(None, &root, &ConvertArgs::default()).expect("config");
        config.output.out_dir = utf8(&out).join("next-app");

        run_convert(&config, &root, CancellationToken::new())
            .await
            .expect("convert");

        let out_dir = &config.output.out_dir;
        assert!(out_dir.join("pages/index.js").is_file());
        assert!(out_dir.join("pages/_app.js").is_file());
        assert!(out_dir.join("package.json").is_file());
        assert!(out_dir.join("components/pages/Home.js").is_file());
        assert!(out_dir.join("components/assets/logo.png").is_file());
        assert!(!out_dir.join("node_modules").exists());

        let home = std::fs::read_to_string(out_dir.join("pages/index.js")).expect("read");
        assert!(home.contains("../components/pages/Home"));
    }

    #[tokio::test]
    async fn test_cancelled_run_writes_nothing() {
        let project = sample_project();
        let root = utf8(&project);
        let out = TempDir::new().expect("temp dir");

        let mut config = build_config(None, &root, &ConvertArgs::default()).expect("config");
        config.output.out_dir = utf8(&out).join("next-app");

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = run_convert(&config, &root, cancel).await.expect_err("cancelled");
        assert!(err.to_string().contains("cancelled"));
        assert!(!config.output.out_dir.exists());
    }

    #[tokio::test]
    async fn test_report_to_file() {
        let project = sample_project();
        let root = utf8(&project);
        let out = TempDir::new().expect("temp dir");
        let report = utf8(&out).join("result.json");

        let config = build_config(None, &root, &ConvertArgs::default()).expect("config");
        run_report(&config, &root, Some(&report), CancellationToken::new())
            .await
            .expect("report");

        let text = std::fs::read_to_string(&report).expect("read");
        let json: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert!(json["pages"]["pages/index.js"].is_string());
        assert_eq!(json["stats"]["totalFiles"], 3);
        assert!(!root.join("pages").exists());
    }

    #[test]
    fn test_summary_lists_problems() {
        let mut result = ConversionResult::default();
        result.logs.warnings.push("src/Home.js: check router usage".to_owned());
        let mut buffer = Vec::new();
        print_summary(&mut buffer, &result).expect("write");
        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.contains("Conversion Summary"));
        assert!(text.contains("Warnings (1):"));
        assert!(text.contains("src/Home.js: check router usage"));
    }
}
