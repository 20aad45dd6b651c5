//! Structural checks of a converted project.
//!
//! [`validate`] never changes the tree; it reports what a framework build
//! would trip over. Errors are missing pieces; warnings are suspicious
//! but possibly intentional code. [`synthesize_missing`] fills the gaps
//! [`validate`] reports as errors where a safe default exists.

use camino::Utf8Path;
use rn_core::{
    ConversionSettings, FxHashSet, Language, OutputCategory, OutputTree, SourceFile, ValidationResult,
};
use rn_rewrite::table::is_navigation_module;
use rn_syntax::{SyntaxEngine, SyntaxTree, ancestor_of_kind, extract_imports};

use crate::manifest::PackageManifest;
use crate::pages::PlacedPage;
use crate::skeleton::DEFAULT_STYLESHEET;

const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

const STYLESHEET_EXTENSIONS: &[&str] = &["css", "scss", "sass"];

/// Names a converted file may reference only with a binding in scope.
const BOUND_NAMES: &[&str] = &[
    "useRouter",
    "useParams",
    "useSearchParams",
    "Link",
    "Head",
    "Image",
];

/// What the validator checks the output against.
#[derive(Debug, Clone, Default)]
pub struct Expectations {
    /// Route pages that must exist.
    pub routes: Vec<PlacedPage>,
    /// Output paths of generated or rewritten scripts that must re-parse.
    pub checked_scripts: Vec<String>,
    /// Expect the nested `app/` convention.
    pub use_directory_router: bool,
}

/// Validates an output tree.
pub fn validate(
    output: &OutputTree,
    expectations: &Expectations,
    engine: &mut SyntaxEngine,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if !has_root_wrapper(output, expectations.use_directory_router) {
        let wrapper = if expectations.use_directory_router {
            "app/layout"
        } else {
            "pages/_app"
        };
        errors.push(format!("missing root wrapper {wrapper}"));
    }
    if !has_global_stylesheet(output) {
        errors.push("missing global stylesheet".to_owned());
    }
    for required in ["next.config.js", "package.json"] {
        if !output.contains(required) {
            errors.push(format!("missing {required}"));
        }
    }
    for page in &expectations.routes {
        if !output.contains(&page.path) {
            errors.push(format!("route '{}' has no page ({})", page.route, page.path));
        }
    }

    for (_, path, text) in output.iter() {
        if !is_script(path) {
            continue;
        }
        let checked = expectations.checked_scripts.iter().any(|p| p == path);
        let source = SourceFile::new(path, text);
        let tree = match engine.parse_file(&source) {
            Ok(tree) => tree,
            Err(err) => {
                if checked {
                    errors.push(format!("{path}: does not parse after conversion: {err}"));
                }
                continue;
            }
        };
        check_bindings(path, &tree, &mut warnings);
    }

    tracing::debug!(
        errors = errors.len(),
        warnings = warnings.len(),
        "validated output"
    );
    ValidationResult::from_findings(errors, warnings)
}

/// Adds safe defaults for missing skeleton pieces and returns their paths.
///
/// Route pages and unparseable scripts have no safe default; those
/// findings stay.
pub fn synthesize_missing(output: &mut OutputTree, settings: &ConversionSettings) -> Vec<String> {
    let mut added = Vec::new();
    if !has_global_stylesheet(output) {
        output.insert(OutputCategory::Styles, DEFAULT_STYLESHEET, "body {\n  margin: 0;\n}\n");
        added.push(DEFAULT_STYLESHEET.to_owned());
    }
    if !has_root_wrapper(output, settings.use_directory_router) {
        let ext = settings.page_extension();
        let (path, text) = if settings.use_directory_router {
            (
                format!("app/layout.{ext}"),
                "import '../styles/globals.css';\n\nexport default function RootLayout({ children }) {\n  return (\n    <html lang=\"en\">\n      <body>{children}</body>\n    </html>\n  );\n}\n",
            )
        } else {
            (
                format!("pages/_app.{ext}"),
                "import '../styles/globals.css';\n\nexport default function MyApp({ Component, pageProps }) {\n  return <Component {...pageProps} />;\n}\n",
            )
        };
        output.insert(OutputCategory::Pages, path.as_str(), text);
        added.push(path);
    }
    if !output.contains("next.config.js") {
        output.insert(
            OutputCategory::Config,
            "next.config.js",
            "module.exports = { reactStrictMode: true };\n",
        );
        added.push("next.config.js".to_owned());
    }
    if !output.contains("package.json") {
        let manifest = PackageManifest::default().converted(settings);
        output.insert(OutputCategory::Config, "package.json", manifest.render());
        added.push("package.json".to_owned());
    }
    if !added.is_empty() {
        tracing::info!(files = ?added, "synthesized missing skeleton files");
    }
    added
}

fn has_root_wrapper(output: &OutputTree, directory_router: bool) -> bool {
    let stem = if directory_router { "app/layout" } else { "pages/_app" };
    SCRIPT_EXTENSIONS
        .iter()
        .any(|ext| output.contains(&format!("{stem}.{ext}")))
}

fn has_global_stylesheet(output: &OutputTree) -> bool {
    output.styles.keys().any(|path| {
        Utf8Path::new(path)
            .extension()
            .is_some_and(|ext| STYLESHEET_EXTENSIONS.contains(&ext))
    })
}

fn is_script(path: &str) -> bool {
    Language::from_path(path).is_script() && !path.ends_with(".d.ts")
}

fn check_bindings(path: &str, tree: &SyntaxTree, warnings: &mut Vec<String>) {
    let Ok(imports) = extract_imports(tree) else {
        return;
    };
    for import in &imports {
        if is_navigation_module(&import.path) {
            warnings.push(format!(
                "{path}:{}: still imports '{}'",
                import.location, import.path
            ));
        }
    }
    let referenced = references(tree);
    for name in BOUND_NAMES {
        if !referenced.contains(name)
            || imports.iter().any(|i| i.binds_local(name))
            || declares(tree, name)
        {
            continue;
        }
        warnings.push(format!("{path}: uses {name} without importing it"));
    }
}

/// Identifier references outside import statements: element tags, calls,
/// and plain values (`component={Link}`). `new Image()` is the DOM
/// constructor and does not count.
fn references(tree: &SyntaxTree) -> FxHashSet<&str> {
    tree.named_descendants()
        .filter(|node| {
            matches!(node.kind(), "identifier" | "shorthand_property_identifier")
                && ancestor_of_kind(*node, &["import_statement"]).is_none()
                && !node.parent().is_some_and(|parent| {
                    parent.kind() == "new_expression"
                        && parent.child_by_field_name("constructor") == Some(*node)
                })
        })
        .map(|node| tree.node_text(node))
        .collect()
}

fn declares(tree: &SyntaxTree, name: &str) -> bool {
    tree.named_descendants().any(|node| {
        matches!(
            node.kind(),
            "variable_declarator" | "function_declaration" | "class_declaration"
        ) && node
            .child_by_field_name("name")
            .is_some_and(|n| tree.node_text(n) == name)
    })
}
