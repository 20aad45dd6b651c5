//! Core types, errors, and run-scoped logging for rr-next.
//!
//! This crate provides the foundational types shared by every stage of the
//! conversion pipeline:
//!
//! - Domain types ([`SourceFile`], [`ImportInfo`], [`RouteEntry`],
//!   [`FileSignals`], [`ConversionState`])
//! - The run-scoped [`ConversionLog`]
//! - The [`OutputTree`] and the [`ConversionResult`] a run returns
//! - Settings and file-backed configuration
//! - The run-level [`ConversionError`] taxonomy
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod log;
pub mod output;
pub mod result;
pub mod types;

pub use config::{Config, ConversionSettings, ConvertConfig, OutputConfig, SettingsInput};
pub use error::{ConfigError, ConversionError};
pub use log::{ConversionLog, LogBuckets, LogEntry, Severity};
pub use output::{FileNode, NodeKind, OutputCategory, OutputTree};
pub use result::{
    AnalysisSummary, ConversionResult, ConversionStats, StageTimings, ValidationResult,
};
pub use rustc_hash::{FxHashMap, FxHashSet};
pub use types::*;
