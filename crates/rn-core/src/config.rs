//! Configuration structures for rr-next.
//!
//! - [`SettingsInput`] - the caller-facing options (`appDir`, `typescript`,
//!   `includeExamples`)
//! - [`ConversionSettings`] - the immutable snapshot a run works with,
//!   resolved from the input and the analyzer's findings
//! - [`ConvertConfig`] / [`OutputConfig`] / [`Config`] - the file-backed
//!   configuration the CLI loads
//!
//! All configuration types implement [`Default`] and deserialize with
//! missing fields filled from it.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Options as supplied by the caller.
///
/// # Examples
///
/// ```
/// use rn_core::SettingsInput;
///
/// let input: SettingsInput = serde_json::from_str(r#"{"appDir": true}"#).expect("parse");
/// assert!(input.app_dir);
/// assert!(!input.typescript);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsInput {
    /// Emit the nested `app/` convention instead of flat `pages/`.
    pub app_dir: bool,
    /// Request typed output file extensions.
    pub typescript: bool,
    /// Add example pages when the project is otherwise empty.
    pub include_examples: bool,
}

/// The settings snapshot one run uses.
///
/// Built once per run by [`ConversionSettings::resolve`]; never modified
/// afterwards.
///
/// # Examples
///
/// ```
/// use rn_core::{ConversionSettings, SettingsInput};
///
/// let input = SettingsInput { typescript: false, ..SettingsInput::default() };
/// let settings = ConversionSettings::resolve(&input, true, None);
/// assert!(settings.emit_typed_output);
/// assert_eq!(settings.page_extension(), "tsx");
/// assert_eq!(settings.router_module(), "next/router");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionSettings {
    /// Emit the nested `app/` convention.
    pub use_directory_router: bool,
    /// Emit typed file extensions for generated files.
    pub emit_typed_output: bool,
    /// Add example pages to an empty project.
    pub include_examples: bool,
    /// Upper bound on per-file worker threads; `None` uses all cores.
    pub max_parallel_jobs: Option<usize>,
}

impl ConversionSettings {
    /// Merges caller input with the analyzer's typed-dialect finding.
    ///
    /// A project that already uses the typed dialect always gets typed
    /// output, whatever the caller asked for.
    #[must_use]
    pub const fn resolve(
        input: &SettingsInput,
        typed_detected: bool,
        max_parallel_jobs: Option<usize>,
    ) -> Self {
        Self {
            use_directory_router: input.app_dir,
            emit_typed_output: input.typescript || typed_detected,
            include_examples: input.include_examples,
            max_parallel_jobs,
        }
    }

    /// Extension for generated files that contain markup.
    #[must_use]
    pub const fn page_extension(&self) -> &'static str {
        if self.emit_typed_output { "tsx" } else { "js" }
    }

    /// Extension for generated files without markup.
    #[must_use]
    pub const fn script_extension(&self) -> &'static str {
        if self.emit_typed_output { "ts" } else { "js" }
    }

    /// Module the router handle is imported from.
    #[must_use]
    pub const fn router_module(&self) -> &'static str {
        if self.use_directory_router {
            "next/navigation"
        } else {
            "next/router"
        }
    }

    /// Top-level directory for route files (`app` or `pages`).
    #[must_use]
    pub const fn routes_dir(&self) -> &'static str {
        if self.use_directory_router { "app" } else { "pages" }
    }
}

/// Conversion options loaded from a configuration file.
///
/// # Examples
///
/// ```
/// use rn_core::ConvertConfig;
///
/// let config = ConvertConfig::default();
/// assert!(!config.app_dir);
/// assert!(config.ignore_dirs.iter().any(|d| d == "node_modules"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Emit the nested `app/` convention.
    pub app_dir: bool,

    /// Request typed output.
    pub typescript: bool,

    /// Add example pages to an empty project.
    pub include_examples: bool,

    /// Maximum number of per-file worker threads.
    /// `None` means use all available CPU cores.
    pub max_parallel_jobs: Option<usize>,

    /// Directory names skipped during ingestion, at any depth.
    pub ignore_dirs: Vec<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            app_dir: false,
            typescript: false,
            include_examples: false,
            max_parallel_jobs: None,
            ignore_dirs: vec![
                "node_modules".to_owned(),
                "build".to_owned(),
                "dist".to_owned(),
                ".git".to_owned(),
                "coverage".to_owned(),
            ],
        }
    }
}

impl ConvertConfig {
    /// Returns the caller-facing options this configuration selects.
    #[must_use]
    pub const fn settings_input(&self) -> SettingsInput {
        SettingsInput {
            app_dir: self.app_dir,
            typescript: self.typescript,
            include_examples: self.include_examples,
        }
    }

    /// Returns `true` if a normalized path passes through an ignored
    /// directory.
    #[must_use]
    pub fn is_ignored(&self, path: &str) -> bool {
        let mut segments = path.split('/');
        segments.next_back();
        segments.any(|segment| self.ignore_dirs.iter().any(|d| d == segment))
    }

    /// Checks option values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parallel_jobs == Some(0) {
            return Err(ConfigError::InvalidOption {
                option: "max_parallel_jobs".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Where and how the CLI writes results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the converted project is written to.
    pub out_dir: Utf8PathBuf,

    /// Replace files in a non-empty output directory.
    pub overwrite: bool,

    /// Pretty-print JSON reports.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_dir: Utf8PathBuf::from("next-app"),
            overwrite: false,
            pretty: true,
        }
    }
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use rn_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{"convert": {"app_dir": true}}"#).expect("parse");
/// assert!(config.convert.app_dir);
/// assert_eq!(config.output.out_dir, "next-app");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Conversion options.
    pub convert: ConvertConfig,

    /// Output options.
    pub output: OutputConfig,
}

impl Config {
    /// Loads and validates a JSON configuration file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.convert.validate()?;
        tracing::debug!(path = %path, "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_forces_typed_output() {
        let input = SettingsInput::default();
        assert!(!ConversionSettings::resolve(&input, false, None).emit_typed_output);
        assert!(ConversionSettings::resolve(&input, true, None).emit_typed_output);

        let requested = SettingsInput {
            typescript: true,
            ..SettingsInput::default()
        };
        assert!(ConversionSettings::resolve(&requested, false, None).emit_typed_output);
    }

    #[test]
    fn test_directory_router_settings() {
        let input = SettingsInput {
            app_dir: true,
            ..SettingsInput::default()
        };
        let settings = ConversionSettings::resolve(&input, false, Some(2));
        assert_eq!(settings.router_module(), "next/navigation");
        assert_eq!(settings.routes_dir(), "app");
        assert_eq!(settings.page_extension(), "js");
        assert_eq!(settings.max_parallel_jobs, Some(2));
    }

    #[test]
    fn test_settings_input_camel_case() {
        let input: SettingsInput =
            serde_json::from_str(r#"{"includeExamples": true, "typescript": true}"#)
                .expect("parse");
        assert!(input.include_examples);
        assert!(input.typescript);
        assert!(!input.app_dir);
    }

    #[test]
    fn test_ignored_directories() {
        let config = ConvertConfig::default();
        assert!(config.is_ignored("node_modules/react/index.js"));
        assert!(config.is_ignored("packages/web/dist/bundle.js"));
        assert!(!config.is_ignored("src/build.js"));
        assert!(!config.is_ignored("src/App.js"));
    }

    #[test]
    fn test_validate_rejects_zero_jobs() {
        let config = ConvertConfig {
            max_parallel_jobs: Some(0),
            ..ConvertConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(ConvertConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("rn-core-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create dir");
        let path = dir.join("rr-next.json");
        std::fs::write(&path, r#"{"output": {"overwrite": true}}"#).expect("write");
        let path = Utf8PathBuf::from_path_buf(path).expect("utf-8 path");

        let config = Config::load(&path).expect("load");
        assert!(config.output.overwrite);
        assert!(!config.convert.app_dir);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let config: Config =
            serde_json::from_str(r#"{"convert": {"max_parallel_jobs": 4}}"#).expect("parse");
        assert_eq!(config.convert.max_parallel_jobs, Some(4));
        assert!(!config.convert.ignore_dirs.is_empty());
        assert!(config.output.pretty);
    }
}
