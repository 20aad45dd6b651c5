//! Domain types for rr-next.
//!
//! # Module Organization
//!
//! - [`file`] - Source files and language classification
//! - [`import`] - Import statements and their bindings
//! - [`location`] - Source positions and byte spans
//! - [`route`] - Route entries, path normalization and the route table
//! - [`signals`] - Per-file classification results
//! - [`state`] - Conversion run states
//!
//! All public types are re-exported at this module level and at the crate
//! root:
//!
//! ```
//! use rn_core::{ConversionState, FileSignals, RouteTable, SourceFile};
//! ```

mod file;
mod import;
mod location;
mod route;
mod signals;
mod state;

pub use file::{Language, SourceFile};
pub use import::{ImportBinding, ImportInfo, ImportKind};
pub use location::{SourceLocation, Span};
pub use route::{
    DuplicateRoute, NOT_FOUND_PATTERN, RenderMode, RouteEntry, RouteLayout, RouteSegment,
    RouteTable, join_route_paths, normalize_route_path,
};
pub use signals::{
    ApiCall, ConstructKind, ElementSignal, FileSignals, HookCall, HookKind, HttpMethod, NavImport,
};
pub use state::ConversionState;
