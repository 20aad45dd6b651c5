//! Which project module a component name in a file refers to.
//!
//! Route declarations and bootstrap scripts name components by their local
//! binding (`element={<About />}`). [`ImportScope`] maps those locals back to
//! the project file and export that defines them, following relative
//! imports and `lazy(() => import('./About'))` declarations.

use camino::{Utf8Path, Utf8PathBuf};
use rn_core::{FxHashMap, ImportInfo};
use rn_syntax::{Descendants, Node, SyntaxTree, child_of_kind, has_child_kind};
use serde::{Deserialize, Serialize};

use crate::paths::resolve_module;

/// The export name of a module's default export.
pub const DEFAULT_EXPORT: &str = "default";

/// A component defined in a project module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    /// The name the component is used under.
    pub name: String,
    /// The module defining it.
    pub path: Utf8PathBuf,
    /// The export it is read from: [`DEFAULT_EXPORT`] or a name.
    pub export: String,
}

impl ComponentRef {
    /// Returns `true` if the component is its module's default export.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.export == DEFAULT_EXPORT
    }
}

/// Local names of a file resolved to project modules.
#[derive(Debug, Clone, Default)]
pub struct ImportScope {
    bindings: FxHashMap<String, ComponentRef>,
}

impl ImportScope {
    /// Builds the scope of the file at `from`.
    ///
    /// `exists` answers whether a project-relative path is an ingested file.
    pub fn build(
        tree: &SyntaxTree,
        from: &Utf8Path,
        imports: &[ImportInfo],
        exists: impl Fn(&str) -> bool + Copy,
    ) -> Self {
        let mut bindings = FxHashMap::default();

        for import in imports.iter().filter(|i| i.is_relative()) {
            let Some((path, _)) = resolve_module(from, &import.path, exists) else {
                continue;
            };
            for binding in import.bindings.iter().filter(|b| b.imported != "*") {
                bindings.insert(
                    binding.local.clone(),
                    ComponentRef {
                        name: binding.local.clone(),
                        path: path.clone(),
                        export: binding.imported.clone(),
                    },
                );
            }
        }

        for (name, specifier) in lazy_declarations(tree) {
            if let Some((path, _)) = resolve_module(from, &specifier, exists) {
                bindings.insert(
                    name.clone(),
                    ComponentRef {
                        name,
                        path,
                        export: DEFAULT_EXPORT.to_owned(),
                    },
                );
            }
        }

        Self { bindings }
    }

    /// Looks up a local name.
    #[must_use]
    pub fn get(&self, local: &str) -> Option<&ComponentRef> {
        self.bindings.get(local)
    }

    /// Returns `true` if `local` resolves to a project module.
    #[must_use]
    pub fn contains(&self, local: &str) -> bool {
        self.bindings.contains_key(local)
    }
}

/// Finds `const X = lazy(() => import('./X'))` declarations.
fn lazy_declarations(tree: &SyntaxTree) -> Vec<(String, String)> {
    let mut found = Vec::new();
    for declarator in tree
        .descendants()
        .filter(|n| n.kind() == "variable_declarator")
    {
        let (Some(name), Some(value)) = (
            declarator.child_by_field_name("name"),
            declarator.child_by_field_name("value"),
        ) else {
            continue;
        };
        if name.kind() != "identifier" || value.kind() != "call_expression" {
            continue;
        }
        let is_lazy = value
            .child_by_field_name("function")
            .is_some_and(|f| matches!(tree.node_text(f), "lazy" | "React.lazy"));
        if !is_lazy {
            continue;
        }
        if let Some(specifier) = dynamic_import_specifier(tree, value) {
            found.push((tree.node_text(name).to_owned(), specifier.to_owned()));
        }
    }
    found
}

/// Returns the specifier of the first `import('...')` call under `node`.
pub fn dynamic_import_specifier<'a>(tree: &'a SyntaxTree, node: Node<'_>) -> Option<&'a str> {
    Descendants::new(node)
        .filter(|n| n.kind() == "call_expression")
        .find(|call| {
            call.child_by_field_name("function")
                .is_some_and(|f| f.kind() == "import")
        })
        .and_then(|call| call.child_by_field_name("arguments"))
        .and_then(|arguments| arguments.named_child(0))
        .and_then(|argument| tree.string_value(argument))
}

/// Maps each exported local name of a file to the name it is exported as.
///
/// `export function Nav` maps `Nav` to `Nav`; `export default App` and
/// `export default function App` map `App` to [`DEFAULT_EXPORT`].
#[must_use]
pub fn exported_names(tree: &SyntaxTree) -> FxHashMap<String, String> {
    let mut exports = FxHashMap::default();
    let root = tree.root();
    let mut cursor = root.walk();

    for statement in root
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "export_statement")
    {
        let is_default = has_child_kind(statement, "default");
        let mut record = |local: &str, exported: &str| {
            let export = if is_default { DEFAULT_EXPORT } else { exported };
            exports.insert(local.to_owned(), export.to_owned());
        };

        if let Some(declaration) = statement.child_by_field_name("declaration") {
            for name in declared_names(tree, declaration) {
                record(name, name);
            }
        } else if let Some(value) = statement
            .child_by_field_name("value")
            .filter(|v| v.kind() == "identifier")
        {
            record(tree.node_text(value), DEFAULT_EXPORT);
        } else if let Some(clause) = child_of_kind(statement, "export_clause") {
            let mut inner = clause.walk();
            for specifier in clause.named_children(&mut inner) {
                let Some(name) = specifier.child_by_field_name("name") else {
                    continue;
                };
                let local = tree.node_text(name);
                let exported = specifier
                    .child_by_field_name("alias")
                    .map_or(local, |alias| tree.node_text(alias));
                record(local, exported);
            }
        }
    }
    exports
}

/// Returns the names a declaration introduces.
fn declared_names<'a>(tree: &'a SyntaxTree, declaration: Node<'_>) -> Vec<&'a str> {
    match declaration.kind() {
        "function_declaration" | "class_declaration" | "generator_function_declaration" => {
            declaration
                .child_by_field_name("name")
                .map(|n| vec![tree.node_text(n)])
                .unwrap_or_default()
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = declaration.walk();
            declaration
                .named_children(&mut cursor)
                .filter(|d| d.kind() == "variable_declarator")
                .filter_map(|d| d.child_by_field_name("name"))
                .filter(|n| n.kind() == "identifier")
                .map(|n| tree.node_text(n))
                .collect()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rn_syntax::{Dialect, SyntaxEngine, extract_imports};

    fn parse(text: &str) -> SyntaxTree {
        SyntaxEngine::new()
            .expect("engine")
            .parse(text, Dialect::Tsx)
            .expect("parse")
    }

    #[test]
    fn test_scope_resolves_imports_and_lazy() {
        let tree = parse(
            "import Home from './pages/Home';\n\
             import { About as AboutPage } from './pages/About';\n\
             import React, { lazy } from 'react';\n\
             const Users = lazy(() => import('./pages/Users'));\n",
        );
        let imports = extract_imports(&tree).expect("imports");
        let files = ["src/pages/Home.js", "src/pages/About.jsx", "src/pages/Users/index.js"];
        let scope = ImportScope::build(&tree, Utf8Path::new("src/App.js"), &imports, |p| {
            files.contains(&p)
        });

        let home = scope.get("Home").expect("home");
        assert_eq!(home.path, "src/pages/Home.js");
        assert!(home.is_default());

        let about = scope.get("AboutPage").expect("about");
        assert_eq!(about.export, "About");
        assert_eq!(about.path, "src/pages/About.jsx");

        let users = scope.get("Users").expect("users");
        assert_eq!(users.path, "src/pages/Users/index.js");
        assert!(!scope.contains("React"));
    }

    #[test]
    fn test_exported_names() {
        let tree = parse(
            "export function Nav() {}\n\
             export const A = 1, B = 2;\n\
             function App() {}\n\
             export default App;\n\
             const C = 3;\n\
             export { C as Renamed };\n",
        );
        let exports = exported_names(&tree);
        assert_eq!(exports.get("Nav").map(String::as_str), Some("Nav"));
        assert_eq!(exports.get("B").map(String::as_str), Some("B"));
        assert_eq!(exports.get("App").map(String::as_str), Some(DEFAULT_EXPORT));
        assert_eq!(exports.get("C").map(String::as_str), Some("Renamed"));
    }

    #[test]
    fn test_default_function_export() {
        let tree = parse("export default function Home() { return null; }\n");
        let exports = exported_names(&tree);
        assert_eq!(exports.get("Home").map(String::as_str), Some(DEFAULT_EXPORT));
    }
}
