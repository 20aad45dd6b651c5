//! Where every input file lands in the converted project.
//!
//! [`Placement::plan`] decides a destination for each ingested file before
//! anything is written:
//!
//! | Source                                   | Destination                  |
//! |------------------------------------------|------------------------------|
//! | scripts under the source root            | `components/<sub-path>`      |
//! | global stylesheets                       | `styles/<sub-path>`          |
//! | CSS modules and other source files       | next to their components     |
//! | `public/*`                               | `public/*`                   |
//! | other root files                         | unchanged (config category)  |
//!
//! The bootstrap file, CRA helpers and build tooling of the replaced
//! toolchain are not carried over.
//!
//! [`Placement::place_sources`] then writes the files, retargeting the
//! relative imports of every relocated script. In the flat `pages/`
//! convention, global stylesheet imports are removed from components and
//! hoisted into the root wrapper.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use rn_core::{
    ConversionLog, ConversionSettings, FileSignals, FxHashSet, Language, OutputCategory,
    OutputTree, SourceFile, Span,
};
use rn_rewrite::passes::assets::USE_CLIENT;
use rn_syntax::{Node, SyntaxEngine, SyntaxError, SyntaxTree, TextEdit, has_child_kind};

use crate::analyzer::{ProjectAnalysis, StylesheetRef};
use crate::paths::{resolve_module, shaped_specifier, strip_root};

/// CRA helpers with no counterpart in the converted project.
const DROPPED_SCRIPTS: &[&str] = &[
    "reportWebVitals",
    "setupTests",
    "serviceWorker",
    "serviceWorkerRegistration",
    "react-app-env.d",
    "vite-env.d",
];

/// Root files that are regenerated or belong to the replaced toolchain.
const DROPPED_ROOT_FILES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "tsconfig.json",
    "tsconfig.node.json",
    "index.html",
    "config-overrides.js",
    ".eslintrc",
    ".eslintrc.js",
    ".eslintrc.json",
];

/// Tool configuration files of the replaced toolchain (`vite.config.ts`).
const DROPPED_CONFIG_STEMS: &[&str] = &["vite.config", "craco.config", "webpack.config"];

/// Line appended to a carried-over `.gitignore`.
const GITIGNORE_BUILD_DIR: &str = "/.next/";

/// How a script came out of the transforming stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// At least one rewrite was applied.
    Rewritten,
    /// Parsed, nothing to rewrite.
    Unchanged,
    /// Did not parse or could not be rewritten; the text is the input.
    Failed,
    /// Not a script.
    Data,
}

/// A file after the transforming stage.
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    /// The input file, with its analyzed language.
    pub source: SourceFile,
    /// The text to emit.
    pub text: String,
    /// What happened to it.
    pub outcome: FileOutcome,
    /// Classification of the input text, for scripts that parsed.
    pub signals: Option<FileSignals>,
}

impl ConvertedFile {
    /// Wraps a file the transforming stage left alone.
    #[must_use]
    pub fn untouched(source: SourceFile, outcome: FileOutcome) -> Self {
        Self {
            text: source.text.clone(),
            source,
            outcome,
            signals: None,
        }
    }
}

/// Where one input file goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Written to `path` in `category`.
    Emit {
        /// Output category.
        category: OutputCategory,
        /// Output path.
        path: Utf8PathBuf,
    },
    /// Not carried over.
    Drop(&'static str),
}

/// What [`Placement::place_sources`] reports back.
#[derive(Debug, Clone, Default)]
pub struct PlacedSources {
    /// Global stylesheets for the root wrapper, as output paths or package
    /// specifiers, in import order.
    pub hoisted: Vec<StylesheetRef>,
    /// Output paths of scripts whose text differs from the input.
    pub changed_scripts: Vec<String>,
}

/// The destination of every input file.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    targets: BTreeMap<Utf8PathBuf, Target>,
    directory_router: bool,
}

impl Placement {
    /// Plans destinations for the ingested files.
    #[must_use]
    pub fn plan(files: &[SourceFile], analysis: &ProjectAnalysis, settings: &ConversionSettings) -> Self {
        let entry = analysis.entry.as_ref().map(|e| e.path.as_path());
        let mut claimed: FxHashSet<Utf8PathBuf> = FxHashSet::default();
        let mut targets = BTreeMap::new();

        for file in files {
            let target = match drop_reason(file, entry) {
                Some(reason) => Target::Drop(reason),
                None => {
                    let (category, candidates) = destinations(file, &analysis.source_root);
                    let path = candidates
                        .iter()
                        .find(|c| !claimed.contains(*c))
                        .cloned()
                        .unwrap_or_else(|| file.path.clone());
                    claimed.insert(path.clone());
                    Target::Emit { category, path }
                }
            };
            targets.insert(file.path.clone(), target);
        }

        Self {
            targets,
            directory_router: settings.use_directory_router,
        }
    }

    /// Returns the plan for an input file.
    #[must_use]
    pub fn target(&self, source: &Utf8Path) -> Option<&Target> {
        self.targets.get(source)
    }

    /// Returns the output path of an input file that is carried over.
    #[must_use]
    pub fn destination(&self, source: &Utf8Path) -> Option<&Utf8Path> {
        match self.targets.get(source) {
            Some(Target::Emit { path, .. }) => Some(path),
            _ => None,
        }
    }

    fn is_global_stylesheet(&self, source: &Utf8Path) -> bool {
        matches!(
            self.targets.get(source),
            Some(Target::Emit { category: OutputCategory::Styles, .. })
        )
    }

    /// Writes every carried-over file into `output`.
    ///
    /// Scripts that parse have their relative imports retargeted; a script
    /// that failed earlier is written exactly as it was read.
    pub fn place_sources(
        &self,
        engine: &mut SyntaxEngine,
        files: &[ConvertedFile],
        analysis: &ProjectAnalysis,
        output: &mut OutputTree,
        log: &ConversionLog,
    ) -> PlacedSources {
        let mut placed = PlacedSources::default();
        let mut hoisted_sources: Vec<Utf8PathBuf> = Vec::new();

        if let Some(entry) = &analysis.entry {
            for stylesheet in &entry.stylesheets {
                match stylesheet {
                    StylesheetRef::Project(path) => hoisted_sources.push(path.clone()),
                    StylesheetRef::Package(_) => placed.hoisted.push(stylesheet.clone()),
                }
            }
        }

        for file in files {
            let source = &file.source;
            let (category, dest) = match self.targets.get(&source.path) {
                Some(Target::Emit { category, path }) => (*category, path),
                Some(Target::Drop(reason)) => {
                    log.info(format!("{}: not carried over ({reason})", source.path));
                    continue;
                }
                None => continue,
            };

            let mut text = file.text.clone();
            let relocatable = source.language.is_script() && file.outcome != FileOutcome::Failed;
            if relocatable {
                match self.relocate(engine, file, dest, log) {
                    Ok(relocated) => {
                        text = relocated.text;
                        hoisted_sources.extend(relocated.hoisted);
                    }
                    Err(err) => {
                        log.file_warning(&source.path, format!("imports were not retargeted: {err}"));
                    }
                }
            } else if source.path == ".gitignore" && !text.contains(GITIGNORE_BUILD_DIR) {
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(GITIGNORE_BUILD_DIR);
                text.push('\n');
            }

            if source.language.is_script() && text != source.text {
                placed.changed_scripts.push(dest.to_string());
            }
            output.insert(category, dest.as_str(), text);
        }

        let mut seen: FxHashSet<Utf8PathBuf> = FxHashSet::default();
        let project_styles: Vec<StylesheetRef> = hoisted_sources
            .into_iter()
            .filter_map(|source| self.destination(&source).map(Utf8Path::to_path_buf))
            .filter(|dest| seen.insert(dest.clone()))
            .map(StylesheetRef::Project)
            .collect();
        placed.hoisted.extend(project_styles);

        tracing::debug!(
            files = files.len(),
            hoisted = placed.hoisted.len(),
            changed = placed.changed_scripts.len(),
            "placed sources"
        );
        placed
    }

    /// Retargets the relative imports of a script for its new location.
    fn relocate(
        &self,
        engine: &mut SyntaxEngine,
        file: &ConvertedFile,
        dest: &Utf8Path,
        log: &ConversionLog,
    ) -> Result<Relocated, SyntaxError> {
        let source = file.source.with_text(file.text.as_str());
        let tree = engine.parse_file(&source)?;
        let from = source.path.as_path();
        let exists = |p: &str| self.targets.contains_key(Utf8Path::new(p));

        let mut edits = Vec::new();
        let mut hoisted = Vec::new();

        for node in tree.descendants() {
            let Some(specifier) = module_specifier(&tree, node) else {
                continue;
            };
            let Some(spec) = tree.string_value(specifier) else {
                continue;
            };
            let Some((target, resolution)) = resolve_module(from, spec, exists) else {
                continue;
            };

            let side_effect_only = node.kind() == "import_statement"
                && !has_child_kind(node, "import_clause");
            if !self.directory_router && side_effect_only && self.is_global_stylesheet(&target) {
                edits.push(TextEdit::delete(statement_with_newline(&tree, node)));
                hoisted.push(target);
                continue;
            }

            match self.targets.get(&target) {
                Some(Target::Emit { path, .. }) => {
                    let retargeted = shaped_specifier(dest, path, resolution);
                    if retargeted != spec {
                        let quote = tree.node_text(specifier).chars().next().unwrap_or('\'');
                        edits.push(TextEdit::replace(
                            SyntaxTree::span(specifier),
                            format!("{quote}{retargeted}{quote}"),
                        ));
                    }
                }
                Some(Target::Drop(reason)) => {
                    log.file_warning(
                        from,
                        format!("imports '{spec}', which is not carried over ({reason})"),
                    );
                }
                None => {}
            }
        }

        if self.directory_router && needs_client_directive(&tree, file.source.language) {
            edits.push(TextEdit::insert(0, USE_CLIENT));
        }

        let text = if edits.is_empty() {
            tree.text().to_owned()
        } else {
            engine.apply(&tree, edits)?.text().to_owned()
        };
        Ok(Relocated { text, hoisted })
    }
}

struct Relocated {
    text: String,
    hoisted: Vec<Utf8PathBuf>,
}

/// Returns the output path of a binary file read alongside the project,
/// or `None` if it is not carried over.
///
/// # Examples
///
/// ```
/// use rn_convert::placement::binary_destination;
///
/// assert_eq!(binary_destination("public/logo.png", "src").as_deref(), Some("public/logo.png"));
/// assert_eq!(binary_destination("src/assets/hero.jpg", "src").as_deref(), Some("components/assets/hero.jpg"));
/// assert_eq!(binary_destination("docs/shot.png", "src"), None);
/// ```
#[must_use]
pub fn binary_destination(path: &str, source_root: &str) -> Option<String> {
    if path.starts_with("public/") {
        return Some(path.to_owned());
    }
    let under_root = source_root.is_empty() || path.starts_with(&format!("{source_root}/"));
    under_root.then(|| component_path(strip_root(path, source_root)))
}

fn drop_reason(file: &SourceFile, entry: Option<&Utf8Path>) -> Option<&'static str> {
    let path = file.path.as_str();
    if entry == Some(file.path.as_path()) {
        return Some("the bootstrap file is replaced by the root layout");
    }
    if path == "public/index.html" {
        return Some("document metadata moved into the root layout");
    }
    if file.language.is_script() && DROPPED_SCRIPTS.contains(&file.file_stem()) {
        return Some("no counterpart under Next.js");
    }
    let top_level = !path.contains('/');
    if top_level
        && (DROPPED_ROOT_FILES.contains(&path)
            || DROPPED_CONFIG_STEMS.contains(&file.file_stem())
            || path.ends_with(".lock"))
    {
        return Some("replaced by generated configuration");
    }
    None
}

/// Returns the category and candidate output paths of a kept file, most
/// preferred first.
fn destinations(file: &SourceFile, source_root: &str) -> (OutputCategory, Vec<Utf8PathBuf>) {
    let path = file.path.as_str();
    if path.starts_with("public/") {
        return (OutputCategory::Public, vec![file.path.clone()]);
    }
    let under_root = source_root.is_empty() || path.starts_with(&format!("{source_root}/"));
    if !under_root {
        return (OutputCategory::Config, vec![file.path.clone()]);
    }

    let rel = strip_root(path, source_root);
    let is_code = file.language.is_script() || file.language == Language::Stylesheet;
    if source_root.is_empty() && !rel.contains('/') && !is_code {
        return (OutputCategory::Config, vec![file.path.clone()]);
    }

    if file.language == Language::Stylesheet && !is_css_module(path) {
        let short = rel.strip_prefix("styles/").unwrap_or(rel);
        return (
            OutputCategory::Styles,
            vec![
                format!("styles/{short}").into(),
                format!("styles/{rel}").into(),
            ],
        );
    }
    (
        OutputCategory::Components,
        vec![component_path(rel).into(), format!("components/{rel}").into()],
    )
}

fn component_path(rel: &str) -> String {
    if rel.starts_with("components/") {
        rel.to_owned()
    } else {
        format!("components/{rel}")
    }
}

/// Returns `true` for CSS modules (`Button.module.css`).
#[must_use]
pub fn is_css_module(path: &str) -> bool {
    Utf8Path::new(path)
        .file_name()
        .is_some_and(|name| name.contains(".module."))
}

/// Returns the string node naming the module a statement or call loads.
fn module_specifier<'t>(tree: &SyntaxTree, node: Node<'t>) -> Option<Node<'t>> {
    match node.kind() {
        "import_statement" | "export_statement" => node.child_by_field_name("source"),
        "call_expression" => {
            let function = node.child_by_field_name("function")?;
            let loads = function.kind() == "import"
                || (function.kind() == "identifier" && tree.node_text(function) == "require");
            if !loads {
                return None;
            }
            node.child_by_field_name("arguments")?
                .named_child(0)
                .filter(|a| a.kind() == "string")
        }
        _ => None,
    }
}

/// The span of a statement plus the line break after it.
fn statement_with_newline(tree: &SyntaxTree, node: Node<'_>) -> Span {
    let span = SyntaxTree::span(node);
    let text = tree.text();
    let end = if text[span.end..].starts_with("\r\n") {
        span.end + 2
    } else if text[span.end..].starts_with('\n') {
        span.end + 1
    } else {
        span.end
    };
    Span::new(span.start, end)
}

/// Markup files calling hooks must be client components under `app/`.
fn needs_client_directive(tree: &SyntaxTree, language: Language) -> bool {
    if !language.allows_markup() || !tree.has_markup() {
        return false;
    }
    let text = tree.text().trim_start();
    if text.starts_with("'use client'") || text.starts_with("\"use client\"") {
        return false;
    }
    tree.descendants().any(|node| {
        node.kind() == "call_expression"
            && node
                .child_by_field_name("function")
                .filter(|f| f.kind() == "identifier")
                .is_some_and(|f| is_hook_name(tree.node_text(f)))
    })
}

fn is_hook_name(name: &str) -> bool {
    name.strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}
