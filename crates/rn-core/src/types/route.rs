//! Route table types.
//!
//! A [`RouteEntry`] is one route declaration from the source project's router
//! configuration, with its path normalized to the file-system routing
//! convention. The [`RouteTable`] enforces uniqueness of normalized patterns:
//! inserting a duplicate is an error, never a silent drop.
//!
//! # Normalization
//!
//! | Source pattern   | Normalized           |
//! |------------------|----------------------|
//! | `/about/`        | `/about`             |
//! | `users/:id`      | `/users/[id]`        |
//! | `/files/*`       | `/files/[...slug]`   |
//! | `/blog/:slug?`   | `/blog/[[...slug]]`  |
//! | `*`              | `*` (not-found)      |
//!
//! ```
//! use rn_core::normalize_route_path;
//!
//! assert_eq!(normalize_route_path("/users/:id/"), "/users/[id]");
//! assert_eq!(normalize_route_path(""), "/");
//! ```

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::FxHashMap;

/// The pattern used for the not-found (catch-everything) route.
pub const NOT_FOUND_PATTERN: &str = "*";

/// How a route's page is rendered in the target framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// The page can be rendered without per-request data.
    #[default]
    Static,
    /// The page depends on a data loader or on dynamic segments.
    DataDriven,
}

/// One segment of a normalized route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteSegment {
    /// A literal segment (`about`).
    Static(String),
    /// A single dynamic segment (`[id]`).
    Dynamic(String),
    /// A required catch-all (`[...slug]`).
    CatchAll(String),
    /// An optional catch-all (`[[...slug]]`).
    OptionalCatchAll(String),
}

impl RouteSegment {
    /// Parses one normalized segment.
    #[must_use]
    pub fn parse(segment: &str) -> Self {
        if let Some(name) = segment
            .strip_prefix("[[...")
            .and_then(|s| s.strip_suffix("]]"))
        {
            return Self::OptionalCatchAll(name.to_owned());
        }
        if let Some(name) = segment.strip_prefix("[...").and_then(|s| s.strip_suffix(']')) {
            return Self::CatchAll(name.to_owned());
        }
        if let Some(name) = segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return Self::Dynamic(name.to_owned());
        }
        Self::Static(segment.to_owned())
    }

    /// Returns `true` for any parameterized segment.
    #[inline]
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        !matches!(self, Self::Static(_))
    }
}

/// A normalized route declaration.
///
/// # Examples
///
/// ```
/// use rn_core::{RenderMode, RouteEntry};
///
/// let entry = RouteEntry::new("/users/:id", Some("UserPage".to_owned()));
/// assert_eq!(entry.path, "/users/[id]");
/// assert_eq!(entry.mode, RenderMode::DataDriven);
/// assert!(!entry.is_not_found());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Normalized path pattern (unique within a table).
    pub path: String,

    /// The path exactly as declared in the source (after parent joining).
    pub raw_path: String,

    /// Local identifier of the backing component, if one was found.
    pub component: Option<String>,

    /// Project path of the module defining the component, when resolvable.
    pub component_path: Option<Utf8PathBuf>,

    /// The export the component is read from: `default` or a name.
    #[serde(default)]
    pub component_export: Option<String>,

    /// Normalized pattern of the enclosing route, for nested declarations.
    pub parent: Option<String>,

    /// Rendering mode flag.
    pub mode: RenderMode,

    /// Whether this was declared as an index route.
    pub index: bool,

    /// Layout routes enclosing this one, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layouts: Vec<RouteLayout>,
}

/// A route with nested routes whose component renders them in an outlet.
///
/// Layouts get no page of their own; every page below one renders inside
/// its component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLayout {
    /// Normalized path the layout is mounted on.
    pub path: String,

    /// Local identifier of the layout component.
    pub component: String,

    /// Project path of the module defining the component, when resolvable.
    pub component_path: Option<Utf8PathBuf>,

    /// The export the component is read from: `default` or a name.
    #[serde(default)]
    pub component_export: Option<String>,
}

impl RouteEntry {
    /// Creates an entry from a raw (already parent-joined) path.
    ///
    /// The rendering mode defaults to [`RenderMode::DataDriven`] when the
    /// path has dynamic segments and [`RenderMode::Static`] otherwise.
    #[must_use]
    pub fn new(raw_path: &str, component: Option<String>) -> Self {
        let path = normalize_route_path(raw_path);
        let mode = if path_has_dynamic_segments(&path) {
            RenderMode::DataDriven
        } else {
            RenderMode::Static
        };
        Self {
            path,
            raw_path: raw_path.to_owned(),
            component,
            component_path: None,
            component_export: None,
            parent: None,
            mode,
            index: false,
            layouts: Vec::new(),
        }
    }

    /// Returns `true` if this is the not-found route.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.path == NOT_FOUND_PATTERN
    }

    /// Returns the parsed segments of the normalized path.
    ///
    /// The root route and the not-found route have no segments.
    #[must_use]
    pub fn segments(&self) -> Vec<RouteSegment> {
        if self.is_not_found() {
            return Vec::new();
        }
        self.path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(RouteSegment::parse)
            .collect()
    }
}

/// Returns `true` if a normalized path contains a parameterized segment.
fn path_has_dynamic_segments(path: &str) -> bool {
    path.split('/').any(|s| s.starts_with('['))
}

/// Returns the file-system slot of a normalized pattern, ignoring
/// parameter names.
fn route_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| match RouteSegment::parse(segment) {
            RouteSegment::Static(s) => s,
            RouteSegment::Dynamic(_) => "[]".to_owned(),
            RouteSegment::CatchAll(_) => "[...]".to_owned(),
            RouteSegment::OptionalCatchAll(_) => "[[...]]".to_owned(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalizes a source route path to the target convention.
///
/// Leading slash added, duplicate and trailing slashes removed, `:param`
/// rewritten to `[param]` (with any `(regex)` constraint dropped), `*` to a
/// catch-all and a trailing `:param?` to an optional catch-all. A path that
/// is only `*` (or `/*`) is the not-found route.
#[must_use]
pub fn normalize_route_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "*" || trimmed == "/*" {
        return NOT_FOUND_PATTERN.to_owned();
    }

    let parts: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
    let last = parts.len().saturating_sub(1);
    let mut normalized = String::with_capacity(trimmed.len() + 1);

    for (i, part) in parts.iter().enumerate() {
        normalized.push('/');
        if *part == "*" {
            normalized.push_str("[...slug]");
        } else if let Some(param) = part.strip_prefix(':') {
            let optional = param.ends_with('?');
            let name = param.trim_end_matches('?');
            let name = name.split('(').next().unwrap_or(name);
            if optional && i == last {
                normalized.push_str("[[...");
                normalized.push_str(name);
                normalized.push_str("]]");
            } else {
                normalized.push('[');
                normalized.push_str(name);
                normalized.push(']');
            }
        } else {
            normalized.push_str(part);
        }
    }

    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Joins a child route path onto its parent.
///
/// Absolute child paths (starting with `/`) are kept as-is, matching the
/// source router's behavior for nested absolute routes.
///
/// ```
/// use rn_core::join_route_paths;
///
/// assert_eq!(join_route_paths("/dashboard", "settings"), "/dashboard/settings");
/// assert_eq!(join_route_paths("/", "about"), "/about");
/// assert_eq!(join_route_paths("/a", "/b"), "/b");
/// ```
#[must_use]
pub fn join_route_paths(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        return child.to_owned();
    }
    let parent = parent.trim_end_matches('/');
    if child.is_empty() {
        return if parent.is_empty() {
            "/".to_owned()
        } else {
            parent.to_owned()
        };
    }
    format!("{parent}/{child}")
}

/// A route pattern was declared more than once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate route pattern '{pattern}' (declared as '{first}' and '{second}')")]
pub struct DuplicateRoute {
    /// The normalized pattern.
    pub pattern: String,
    /// Raw path of the first declaration.
    pub first: String,
    /// Raw path of the conflicting declaration.
    pub second: String,
}

/// An ordered collection of routes with unique normalized patterns.
///
/// # Examples
///
/// ```
/// use rn_core::{RouteEntry, RouteTable};
///
/// let mut table = RouteTable::new();
/// table.insert(RouteEntry::new("/about", None))?;
/// assert!(table.insert(RouteEntry::new("/about/", None)).is_err());
/// assert_eq!(table.len(), 1);
/// # Ok::<(), rn_core::DuplicateRoute>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RouteEntry>", into = "Vec<RouteEntry>")]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    /// Route shape -> position in `entries`.
    index: FxHashMap<String, usize>,
}

impl From<Vec<RouteEntry>> for RouteTable {
    fn from(entries: Vec<RouteEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (route_shape(&e.path), i))
            .collect();
        Self { entries, index }
    }
}

impl From<RouteTable> for Vec<RouteEntry> {
    fn from(table: RouteTable) -> Self {
        table.entries
    }
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, rejecting duplicate normalized patterns.
    ///
    /// Two patterns that differ only in parameter names (`/u/[id]` and
    /// `/u/[userId]`) occupy the same file-system slot and are duplicates.
    pub fn insert(&mut self, entry: RouteEntry) -> Result<(), DuplicateRoute> {
        let shape = route_shape(&entry.path);
        if let Some(&existing) = self.index.get(&shape) {
            return Err(DuplicateRoute {
                pattern: entry.path,
                first: self.entries[existing].raw_path.clone(),
                second: entry.raw_path,
            });
        }
        self.index.insert(shape, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Returns the entry for a normalized pattern.
    #[must_use]
    pub fn get(&self, pattern: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.path == pattern)
    }

    /// Returns all entries in declaration order.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    /// Returns the number of routes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no routes were declared.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_route_path("/"), "/");
        assert_eq!(normalize_route_path("about"), "/about");
        assert_eq!(normalize_route_path("/about/"), "/about");
        assert_eq!(normalize_route_path("//a//b/"), "/a/b");
    }

    #[test]
    fn test_normalize_parameters() {
        assert_eq!(normalize_route_path("/users/:id"), "/users/[id]");
        assert_eq!(normalize_route_path("/users/:id(\\d+)"), "/users/[id]");
        assert_eq!(normalize_route_path("/blog/:slug?"), "/blog/[[...slug]]");
        assert_eq!(normalize_route_path("/:lang?/about"), "/[lang]/about");
        assert_eq!(normalize_route_path("/files/*"), "/files/[...slug]");
    }

    #[test]
    fn test_normalize_not_found() {
        assert_eq!(normalize_route_path("*"), NOT_FOUND_PATTERN);
        assert_eq!(normalize_route_path("/*"), NOT_FOUND_PATTERN);
        assert!(RouteEntry::new("*", None).is_not_found());
    }

    #[test]
    fn test_entry_segments() {
        let entry = RouteEntry::new("/docs/:section/*", None);
        assert_eq!(
            entry.segments(),
            vec![
                RouteSegment::Static("docs".to_owned()),
                RouteSegment::Dynamic("section".to_owned()),
                RouteSegment::CatchAll("slug".to_owned()),
            ]
        );
        assert!(RouteEntry::new("/", None).segments().is_empty());
    }

    #[test]
    fn test_render_mode_defaults() {
        assert_eq!(RouteEntry::new("/about", None).mode, RenderMode::Static);
        assert_eq!(RouteEntry::new("/p/:id", None).mode, RenderMode::DataDriven);
    }

    #[test]
    fn test_table_rejects_duplicates_after_normalization() {
        let mut table = RouteTable::new();
        table
            .insert(RouteEntry::new("/users/:id", None))
            .expect("first insert");
        let err = table
            .insert(RouteEntry::new("users/:id/", None))
            .expect_err("duplicate must be rejected");
        assert_eq!(err.pattern, "/users/[id]");
        assert_eq!(err.first, "/users/:id");

        // Different parameter names still occupy the same slot.
        let err = table
            .insert(RouteEntry::new("/users/:userId", None))
            .expect_err("same slot must be rejected");
        assert_eq!(err.pattern, "/users/[userId]");

        table
            .insert(RouteEntry::new("/users/:id/edit", None))
            .expect("distinct route");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_table_serde_rebuilds_index() {
        let mut table = RouteTable::new();
        table.insert(RouteEntry::new("/a", None)).expect("insert");
        let json = serde_json::to_string(&table).expect("serialize");
        let mut parsed: RouteTable = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, table);
        assert!(parsed.insert(RouteEntry::new("/a/", None)).is_err());
    }

    #[test]
    fn test_table_lookup() {
        let mut table = RouteTable::new();
        table
            .insert(RouteEntry::new("/", Some("Home".to_owned())))
            .expect("insert");
        let entry = table.get("/").expect("root route");
        assert_eq!(entry.component.as_deref(), Some("Home"));
        assert!(table.get("/missing").is_none());
    }
}
