//! Whole-project analysis.
//!
//! [`analyze`] looks at every ingested file once, before any rewriting, and
//! produces the [`ProjectAnalysis`] the later stages read:
//!
//! - whether the project uses the typed dialect
//! - the route table, extracted from the router configuration file
//! - the source root and the recognized directories in use
//! - the package manifest and its incompatible packages
//! - the SPA bootstrap file, its global stylesheets and the app component
//! - `<title>`, `lang` and description from the HTML shell
//!
//! # Router Configuration
//!
//! The configuration file is the script with the most route declarations
//! (route elements plus route factory calls bound to the navigation
//! library). Ties go to the first path in sorted order.
//!
//! # Examples
//!
//! ```
//! use rn_convert::analyzer::analyze;
//! use rn_core::{ConversionLog, SourceFile};
//! use rn_syntax::SyntaxEngine;
//!
//! let files = vec![
//!     SourceFile::new("src/App.tsx", "export default function App() { return <main />; }"),
//!     SourceFile::new("package.json", r#"{"dependencies": {"react-scripts": "5.0.1"}}"#),
//! ];
//! let mut engine = SyntaxEngine::new()?;
//! let analysis = analyze(&files, &mut engine, &ConversionLog::new());
//! assert!(analysis.typed);
//! assert_eq!(analysis.source_root, "src");
//! assert_eq!(analysis.incompatible_dependencies, vec!["react-scripts"]);
//! # Ok::<(), rn_syntax::SyntaxError>(())
//! ```

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use rn_core::{
    AnalysisSummary, ConversionError, ConversionLog, FxHashSet, ImportInfo, ImportKind, Language,
    RouteTable, Severity, SourceFile,
};
use rn_syntax::{Descendants, Node, SyntaxEngine, SyntaxTree, extract_imports, jsx};
use serde::Serialize;

use crate::manifest::PackageManifest;
use crate::paths::resolve_module;
use crate::routes::{RouteBindings, declaration_count, extract_routes, mentions_routes};
use crate::scope::{ComponentRef, ImportScope};

/// Directories whose presence the analysis reports.
pub const RECOGNIZED_DIRECTORIES: &[&str] = &[
    "src",
    "src/pages",
    "src/components",
    "src/views",
    "src/hooks",
    "src/api",
    "src/services",
    "src/styles",
    "src/assets",
    "public",
];

/// HTML shells read for document metadata, in preference order.
const DOCUMENT_SHELLS: &[&str] = &["public/index.html", "index.html"];

/// Modules whose import marks a bootstrap candidate.
const DOM_MODULES: &[&str] = &["react-dom", "react-dom/client"];

/// Calls that mount the app.
const MOUNT_CALLS: &[&str] = &["render", "hydrate", "hydrateRoot"];

/// A stylesheet imported for its side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum StylesheetRef {
    /// A project file.
    Project(Utf8PathBuf),
    /// A package specifier (`bootstrap/dist/css/bootstrap.min.css`).
    Package(String),
}

/// The SPA bootstrap file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryPoint {
    /// The file's path.
    pub path: Utf8PathBuf,
    /// Stylesheets it imports, in source order.
    pub stylesheets: Vec<StylesheetRef>,
    /// The component it mounts.
    pub app_component: Option<ComponentRef>,
}

/// Metadata read from the HTML shell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    /// `<title>` text.
    pub title: Option<String>,
    /// `<html lang>`.
    pub lang: Option<String>,
    /// `<meta name="description" content>`.
    pub description: Option<String>,
}

/// Everything the analyzer learned about a project.
#[derive(Debug, Clone, Default)]
pub struct ProjectAnalysis {
    /// The project uses the typed dialect.
    pub typed: bool,
    /// Language of every file, with markup promotion applied.
    pub languages: BTreeMap<Utf8PathBuf, Language>,
    /// The router configuration file.
    pub router_config: Option<Utf8PathBuf>,
    /// Extracted routes; empty when extraction failed.
    pub routes: RouteTable,
    /// Why route extraction failed, if it did.
    pub route_error: Option<ConversionError>,
    /// `src` when the project has one, else the empty string.
    pub source_root: String,
    /// Entries of [`RECOGNIZED_DIRECTORIES`] in use.
    pub conventions: Vec<String>,
    /// The parsed `package.json`.
    pub manifest: Option<PackageManifest>,
    /// Declared packages with no role after conversion.
    pub incompatible_dependencies: Vec<String>,
    /// The bootstrap file.
    pub entry: Option<EntryPoint>,
    /// HTML shell metadata.
    pub document: DocumentInfo,
}

impl ProjectAnalysis {
    /// Returns the component the bootstrap file mounts.
    #[must_use]
    pub fn app_component(&self) -> Option<&ComponentRef> {
        self.entry.as_ref().and_then(|e| e.app_component.as_ref())
    }

    /// Returns the analyzed language of a file.
    #[must_use]
    pub fn language_of(&self, path: &Utf8Path) -> Option<Language> {
        self.languages.get(path).copied()
    }

    /// Returns the serializable summary reported with a run.
    #[must_use]
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            typed: self.typed,
            router_config: self.router_config.clone(),
            routes: self.routes.clone(),
            source_root: self.source_root.clone(),
            conventions: self.conventions.clone(),
            incompatible_dependencies: self.incompatible_dependencies.clone(),
            entry_point: self.entry.as_ref().map(|e| e.path.clone()),
            app_component: self.app_component().map(|c| c.path.clone()),
        }
    }
}

/// The best router configuration candidate seen so far.
struct Candidate {
    path: Utf8PathBuf,
    tree: SyntaxTree,
    imports: Vec<ImportInfo>,
    declarations: usize,
}

/// Analyzes a project.
///
/// Files that do not parse are skipped here; the transforming stage
/// reports them.
pub fn analyze(files: &[SourceFile], engine: &mut SyntaxEngine, log: &ConversionLog) -> ProjectAnalysis {
    let known: FxHashSet<&str> = files.iter().map(|f| f.path.as_str()).collect();
    let exists = |p: &str| known.contains(p);

    let mut analysis = ProjectAnalysis {
        typed: files
            .iter()
            .any(|f| f.language.is_typed() || f.path == "tsconfig.json"),
        source_root: if files.iter().any(|f| f.path.starts_with("src/")) {
            "src".to_owned()
        } else {
            String::new()
        },
        conventions: RECOGNIZED_DIRECTORIES
            .iter()
            .filter(|dir| files.iter().any(|f| f.path.starts_with(dir)))
            .map(|dir| (*dir).to_owned())
            .collect(),
        ..ProjectAnalysis::default()
    };

    let mut config: Option<Candidate> = None;
    let mut unparseable_config: Option<Utf8PathBuf> = None;
    let mut entries: Vec<EntryPoint> = Vec::new();

    for file in files {
        if !file.language.is_script() {
            analysis.languages.insert(file.path.clone(), file.language);
            continue;
        }
        let tree = match engine.parse_file(file) {
            Ok(tree) => tree,
            Err(err) => {
                tracing::debug!(path = %file.path, error = %err, "skipping unparseable file");
                analysis.languages.insert(file.path.clone(), file.language);
                if unparseable_config.is_none() && mentions_routes(&file.text) {
                    unparseable_config = Some(file.path.clone());
                }
                continue;
            }
        };
        analysis
            .languages
            .insert(file.path.clone(), file.language.with_markup(tree.has_markup()));

        let imports: Vec<ImportInfo> = match extract_imports(&tree) {
            Ok(imports) => imports.into_vec(),
            Err(err) => {
                tracing::warn!(path = %file.path, error = %err, "import extraction failed");
                continue;
            }
        };

        if let Some(entry) = entry_point(&tree, &file.path, &imports, exists) {
            entries.push(entry);
        }

        let declarations = declaration_count(&tree, &RouteBindings::from_imports(&imports));
        if declarations > config.as_ref().map_or(0, |c| c.declarations) {
            config = Some(Candidate {
                path: file.path.clone(),
                tree,
                imports,
                declarations,
            });
        }
    }

    if let Some(candidate) = config {
        tracing::debug!(
            path = %candidate.path,
            declarations = candidate.declarations,
            "router configuration found"
        );
        match extract_routes(&candidate.tree, &candidate.path, &candidate.imports, exists) {
            Ok(routes) => {
                log.info(format!(
                    "Found {} route(s) in {}",
                    routes.len(),
                    candidate.path
                ));
                analysis.routes = routes;
            }
            Err(err) => {
                let error = err.to_conversion_error();
                log.push(error.severity(), error.to_string(), Some(candidate.path.as_path()));
                analysis.route_error = Some(error);
            }
        }
        analysis.router_config = Some(candidate.path);
    } else if let Some(path) = unparseable_config {
        // The parse failure itself is reported against the file later.
        let error = ConversionError::route_extraction(
            None,
            "the router configuration does not parse; treating the project as routeless",
        );
        log.push(Severity::Error, error.to_string(), None);
        analysis.route_error = Some(error);
        analysis.router_config = Some(path);
    }

    entries.sort_by_key(|e| (entry_rank(&e.path), e.path.clone()));
    analysis.entry = entries.into_iter().next();

    if let Some(file) = files.iter().find(|f| f.path == "package.json") {
        match PackageManifest::parse(&file.text) {
            Ok(manifest) => {
                analysis.incompatible_dependencies = manifest.incompatible();
                analysis.manifest = Some(manifest);
            }
            Err(err) => log.file_warning(&file.path, format!("malformed package manifest: {err}")),
        }
    }

    if let Some(shell) = DOCUMENT_SHELLS
        .iter()
        .find_map(|p| files.iter().find(|f| f.path == *p))
    {
        analysis.document = DocumentInfo::from_html(&shell.text);
    }

    tracing::info!(
        typed = analysis.typed,
        routes = analysis.routes.len(),
        source_root = %analysis.source_root,
        entry = ?analysis.entry.as_ref().map(|e| &e.path),
        "project analyzed"
    );
    analysis
}

/// Ranks bootstrap candidates: conventional names first.
fn entry_rank(path: &Utf8Path) -> u8 {
    match (path.parent().map(Utf8Path::as_str), path.file_stem()) {
        (Some("src"), Some("index")) => 0,
        (Some("src"), Some("main")) => 1,
        (Some(""), Some("index" | "main")) => 2,
        _ => 3,
    }
}

/// Reads a bootstrap file: one importing the DOM renderer and mounting.
fn entry_point(
    tree: &SyntaxTree,
    path: &Utf8Path,
    imports: &[ImportInfo],
    exists: impl Fn(&str) -> bool + Copy,
) -> Option<EntryPoint> {
    if !imports.iter().any(|i| DOM_MODULES.contains(&i.path.as_str())) {
        return None;
    }
    let mounts: Vec<Node<'_>> = tree
        .descendants()
        .filter(|n| is_mount_call(tree, *n))
        .collect();
    if mounts.is_empty() {
        return None;
    }

    let stylesheets = imports
        .iter()
        .filter(|i| i.kind == ImportKind::SideEffect)
        .filter(|i| Language::from_path(&i.path) == Language::Stylesheet)
        .filter_map(|i| {
            if i.is_relative() {
                resolve_module(path, &i.path, exists).map(|(p, _)| StylesheetRef::Project(p))
            } else {
                Some(StylesheetRef::Package(i.path.clone()))
            }
        })
        .collect();

    let scope = ImportScope::build(tree, path, imports, exists);
    let app_component = mounts.into_iter().find_map(|call| {
        Descendants::new(call)
            .filter(|n| jsx::is_element(*n))
            .filter_map(|n| jsx::element_name(tree, n))
            .find_map(|name| scope.get(name).cloned())
    });

    Some(EntryPoint {
        path: path.to_owned(),
        stylesheets,
        app_component,
    })
}

fn is_mount_call(tree: &SyntaxTree, node: Node<'_>) -> bool {
    if node.kind() != "call_expression" {
        return false;
    }
    let Some(function) = node.child_by_field_name("function") else {
        return false;
    };
    let name = match function.kind() {
        "member_expression" => function
            .child_by_field_name("property")
            .map(|p| tree.node_text(p)),
        "identifier" => Some(tree.node_text(function)),
        _ => None,
    };
    name.is_some_and(|n| MOUNT_CALLS.contains(&n))
}

impl DocumentInfo {
    /// Reads metadata from an HTML document.
    ///
    /// # Examples
    ///
    /// ```
    /// use rn_convert::analyzer::DocumentInfo;
    ///
    /// let info = DocumentInfo::from_html(
    ///     r#"<html lang="de"><head><title> Shop </title></head></html>"#,
    /// );
    /// assert_eq!(info.title.as_deref(), Some("Shop"));
    /// assert_eq!(info.lang.as_deref(), Some("de"));
    /// ```
    #[must_use]
    pub fn from_html(html: &str) -> Self {
        let lower = html.to_ascii_lowercase();
        let title = lower.find("<title").and_then(|start| {
            let open_end = start + lower[start..].find('>')? + 1;
            let close = open_end + lower[open_end..].find("</title>")?;
            let title = html[open_end..close].trim();
            (!title.is_empty() && !title.contains('%')).then(|| title.to_owned())
        });
        let lang = lower
            .find("<html")
            .and_then(|start| tag_at(html, &lower, start))
            .and_then(|tag| attribute(tag, "lang"));
        let description = find_tags(html, &lower, "<meta")
            .find(|tag| attribute(tag, "name").is_some_and(|n| n.eq_ignore_ascii_case("description")))
            .and_then(|tag| attribute(tag, "content"));

        Self {
            title,
            lang,
            description,
        }
    }
}

/// Returns the tag starting at `start`, up to and including `>`.
fn tag_at<'a>(html: &'a str, lower: &str, start: usize) -> Option<&'a str> {
    let end = start + lower[start..].find('>')?;
    Some(&html[start..=end])
}

fn find_tags<'a>(html: &'a str, lower: &'a str, open: &'a str) -> impl Iterator<Item = &'a str> {
    lower
        .match_indices(open)
        .filter_map(move |(start, _)| tag_at(html, lower, start))
}

/// Reads a quoted attribute from a tag.
fn attribute(tag: &str, name: &str) -> Option<String> {
    let lower = tag.to_ascii_lowercase();
    let mut from = 0;
    while let Some(found) = lower[from..].find(name) {
        let at = from + found;
        from = at + name.len();
        let preceded = lower[..at].ends_with(|c: char| c.is_ascii_whitespace());
        let rest = lower[from..].trim_start();
        if !preceded || !rest.starts_with('=') {
            continue;
        }
        let value_start = tag.len() - rest.len() + 1;
        let value = tag[value_start..].trim_start();
        let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let inner = &value[1..];
        let end = inner.find(quote)?;
        let value = inner[..end].trim();
        return (!value.is_empty() && !value.contains('%')).then(|| value.to_owned());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rn_core::RenderMode;

    fn run(files: &[(&str, &str)]) -> (ProjectAnalysis, ConversionLog) {
        let files: Vec<SourceFile> = files.iter().map(|(p, t)| SourceFile::new(*p, *t)).collect();
        let mut engine = SyntaxEngine::new().expect("engine");
        let log = ConversionLog::new();
        let analysis = analyze(&files, &mut engine, &log);
        (analysis, log)
    }

    const APP: &str = "import { BrowserRouter, Routes, Route } from 'react-router-dom';
import Home from './pages/Home';
import About from './pages/About';

export default function App() {
  return (
    <BrowserRouter>
      <Routes>
        <Route path=\"/\" element={<Home />} />
        <Route path=\"/about\" element={<About />} />
      </Routes>
    </BrowserRouter>
  );
}
";

    const INDEX: &str = "import React from 'react';
import ReactDOM from 'react-dom/client';
import 'bootstrap/dist/css/bootstrap.min.css';
import './index.css';
import App from './App';

const root = ReactDOM.createRoot(document.getElementById('root'));
root.render(
  <React.StrictMode>
    <App />
  </React.StrictMode>
);
";

    #[test]
    fn test_analyze_spa() {
        let (analysis, log) = run(&[
            ("src/App.js", APP),
            ("src/index.js", INDEX),
            ("src/index.css", "body { margin: 0; }"),
            ("src/pages/Home.js", "export default function Home() { return <h1>Home</h1>; }"),
            ("src/pages/About.js", "export default function About() { return <h1>About</h1>; }"),
            ("public/index.html", "<html lang=\"en\"><head><title>React App</title></head></html>"),
        ]);

        assert!(!analysis.typed);
        assert_eq!(analysis.source_root, "src");
        assert_eq!(analysis.conventions, vec!["src", "src/pages", "public"]);
        assert_eq!(analysis.router_config.as_deref(), Some(Utf8Path::new("src/App.js")));
        assert_eq!(analysis.routes.len(), 2);
        assert_eq!(
            analysis.language_of(Utf8Path::new("src/pages/Home.js")),
            Some(Language::Jsx)
        );

        let entry = analysis.entry.as_ref().expect("entry point");
        assert_eq!(entry.path, "src/index.js");
        assert_eq!(
            entry.stylesheets,
            vec![
                StylesheetRef::Package("bootstrap/dist/css/bootstrap.min.css".to_owned()),
                StylesheetRef::Project("src/index.css".into()),
            ]
        );
        assert_eq!(analysis.app_component().map(|c| c.path.as_str()), Some("src/App.js"));
        assert_eq!(analysis.document.title.as_deref(), Some("React App"));
        assert_eq!(log.count(Severity::Error), 0);

        let summary = analysis.summary();
        assert_eq!(summary.entry_point.as_deref(), Some(Utf8Path::new("src/index.js")));
        assert_eq!(summary.app_component.as_deref(), Some(Utf8Path::new("src/App.js")));
    }

    #[test]
    fn test_duplicate_routes_fall_back_to_routeless() {
        let (analysis, log) = run(&[(
            "App.jsx",
            "import { Routes, Route } from 'react-router-dom';
const A = () => null;
export const R = () => (
  <Routes>
    <Route path=\"/a\" element={<A />} />
    <Route path=\"/a/\" element={<A />} />
  </Routes>
);
",
        )]);
        assert!(analysis.routes.is_empty());
        assert!(matches!(
            analysis.route_error,
            Some(ConversionError::RouteExtractionFailure { .. })
        ));
        assert_eq!(log.count(Severity::Error), 1);
        assert_eq!(analysis.source_root, "");
    }

    #[test]
    fn test_config_with_most_declarations_wins() {
        let (analysis, _) = run(&[
            (
                "src/Admin.js",
                "import { Route } from 'react-router-dom';\nexport const a = <Route path=\"/admin\" />;\n",
            ),
            (
                "src/Routes.js",
                "import { Routes, Route } from 'react-router-dom';
import { loader } from './data';
export const r = (
  <Routes>
    <Route path=\"/\" element={<div />} />
    <Route path=\"/posts/:id\" loader={loader} element={<div />} />
  </Routes>
);
",
            ),
        ]);
        assert_eq!(analysis.router_config.as_deref(), Some(Utf8Path::new("src/Routes.js")));
        assert_eq!(
            analysis.routes.get("/posts/[id]").map(|r| r.mode),
            Some(RenderMode::DataDriven)
        );
    }

    #[test]
    fn test_unparseable_config_is_route_failure() {
        let (analysis, log) = run(&[(
            "src/App.js",
            "import { Routes, Route } from 'react-router-dom';\nexport default () => <Routes><Route path=\"/\" </Routes>;\n",
        )]);
        assert!(analysis.routes.is_empty());
        assert!(analysis.route_error.is_some());
        assert!(log.errors_for("src/App.js").is_empty());
        assert_eq!(log.count(Severity::Error), 1);
    }

    #[test]
    fn test_typed_by_tsconfig_and_manifest() {
        let (analysis, log) = run(&[
            ("tsconfig.json", "{}"),
            ("package.json", "{ not json"),
            ("index.js", "console.log(1);"),
        ]);
        assert!(analysis.typed);
        assert!(analysis.manifest.is_none());
        assert_eq!(log.count(Severity::Warning), 1);
        assert!(analysis.entry.is_none());
    }

    #[test]
    fn test_document_info() {
        let info = DocumentInfo::from_html(
            "<!DOCTYPE html>\n<html lang='fr'>\n<head>\n<meta charset=\"utf-8\" />\n\
             <meta name=\"description\" content=\"My store\" />\n\
             <title>%PUBLIC_URL% App</title>\n</head></html>",
        );
        assert_eq!(info.lang.as_deref(), Some("fr"));
        assert_eq!(info.description.as_deref(), Some("My store"));
        assert_eq!(info.title, None);
    }
}
