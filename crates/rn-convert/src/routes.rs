//! Route table extraction.
//!
//! Routes are read from the router configuration file in two notations:
//!
//! - markup: `<Route path="/users" element={<Users />}>` with nested
//!   `<Route>` children, plus the older `component={X}` / `render` forms
//! - route objects passed to `createBrowserRouter([...])` and friends:
//!   `{ path, element, Component, children, index, loader, lazy }`
//!
//! Nested paths are joined onto their parent's; index routes take the
//! parent's path. A route whose children include an index route is a
//! layout and gets no entry of its own. Any route with both a component
//! and nested routes is recorded as a [`RouteLayout`] on every entry below
//! it. Paths are normalized by [`RouteEntry::new`], and the [`RouteTable`]
//! rejects duplicates.

use camino::Utf8Path;
use rn_core::{
    FxHashMap, FxHashSet, ImportInfo, RenderMode, RouteEntry, RouteLayout, RouteTable,
    join_route_paths, normalize_route_path,
};
use rn_rewrite::table;
use rn_syntax::{Descendants, Node, SyntaxTree, jsx};

use crate::error::ConvertError;
use crate::scope::{ComponentRef, ImportScope, dynamic_import_specifier, exported_names};

/// The markup element declaring a route.
const ROUTE_ELEMENT: &str = "Route";

/// Library exports taking an array of route objects as first argument.
const ROUTE_OBJECT_FACTORIES: &[&str] = &[
    "createBrowserRouter",
    "createHashRouter",
    "createMemoryRouter",
    "useRoutes",
];

/// Export of a lazily loaded route module holding its component.
const LAZY_ROUTE_EXPORT: &str = "Component";

/// Route-declaring names a file imports from the navigation library.
#[derive(Debug, Clone, Default)]
pub struct RouteBindings {
    elements: FxHashSet<String>,
    factories: FxHashSet<String>,
    library: FxHashSet<String>,
}

impl RouteBindings {
    /// Collects the bindings from a file's imports.
    #[must_use]
    pub fn from_imports(imports: &[ImportInfo]) -> Self {
        let mut bindings = Self::default();
        for import in imports
            .iter()
            .filter(|i| table::is_navigation_module(&i.path))
        {
            for binding in &import.bindings {
                bindings.library.insert(binding.local.clone());
                if binding.imported == ROUTE_ELEMENT {
                    bindings.elements.insert(binding.local.clone());
                } else if ROUTE_OBJECT_FACTORIES.contains(&binding.imported.as_str()) {
                    bindings.factories.insert(binding.local.clone());
                }
            }
        }
        bindings
    }

    /// Returns `true` if the file imports nothing that declares routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.factories.is_empty()
    }

    fn is_route_element(&self, tree: &SyntaxTree, node: Node<'_>) -> bool {
        jsx::is_element(node)
            && jsx::element_name(tree, node).is_some_and(|name| self.elements.contains(name))
    }

    fn is_factory_call(&self, tree: &SyntaxTree, node: Node<'_>) -> bool {
        node.kind() == "call_expression"
            && node
                .child_by_field_name("function")
                .is_some_and(|f| self.factories.contains(tree.node_text(f)))
    }
}

/// Counts route declarations: route elements plus route factory calls.
///
/// The analyzer picks the file with the highest count as the router
/// configuration.
#[must_use]
pub fn declaration_count(tree: &SyntaxTree, bindings: &RouteBindings) -> usize {
    if bindings.is_empty() {
        return 0;
    }
    tree.named_descendants()
        .filter(|n| bindings.is_route_element(tree, *n) || bindings.is_factory_call(tree, *n))
        .count()
}

/// Extracts the route table of the configuration file at `path`.
///
/// # Errors
///
/// Returns [`ConvertError::Routes`] if two routes normalize to the same
/// pattern.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use rn_convert::routes::extract_routes;
/// use rn_syntax::{Dialect, SyntaxEngine, extract_imports};
///
/// let mut engine = SyntaxEngine::new()?;
/// let tree = engine.parse(
///     "import { Routes, Route } from 'react-router-dom';\n\
///      import User from './User';\n\
///      export const App = () => <Routes><Route path=\"/users/:id\" element={<User />} /></Routes>;\n",
///     Dialect::Tsx,
/// )?;
/// let imports = extract_imports(&tree)?;
/// let table = extract_routes(&tree, Utf8Path::new("src/App.js"), &imports, |p| p == "src/User.js")?;
/// assert_eq!(table.entries()[0].path, "/users/[id]");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn extract_routes(
    tree: &SyntaxTree,
    path: &Utf8Path,
    imports: &[ImportInfo],
    exists: impl Fn(&str) -> bool + Copy,
) -> Result<RouteTable, ConvertError> {
    let bindings = RouteBindings::from_imports(imports);
    let mut extractor = Extractor {
        tree,
        path,
        bindings: &bindings,
        scope: ImportScope::build(tree, path, imports, exists),
        exports: exported_names(tree),
        exists,
        table: RouteTable::new(),
        layouts: Vec::new(),
    };

    for element in tree.named_descendants().filter(|n| {
        bindings.is_route_element(tree, *n) && !has_route_ancestor(tree, &bindings, *n)
    }) {
        extractor.element_route(element, "", None)?;
    }

    for call in tree
        .named_descendants()
        .filter(|n| bindings.is_factory_call(tree, *n))
    {
        let Some(argument) = call
            .child_by_field_name("arguments")
            .and_then(|a| a.named_child(0))
        else {
            continue;
        };
        if let Some(array) = route_array(tree, argument) {
            extractor.object_routes(array, "", None)?;
        }
    }

    tracing::debug!(path = %path, routes = extractor.table.len(), "extracted routes");
    Ok(extractor.table)
}

struct Extractor<'a, F> {
    tree: &'a SyntaxTree,
    path: &'a Utf8Path,
    bindings: &'a RouteBindings,
    scope: ImportScope,
    exports: FxHashMap<String, String>,
    exists: F,
    table: RouteTable,
    /// Layouts enclosing the declaration being read, outermost first.
    layouts: Vec<RouteLayout>,
}

/// What one declaration says, in either notation.
#[derive(Debug, Default)]
struct Declaration {
    path: Option<String>,
    index: bool,
    component: Option<String>,
    lazy: Option<ComponentRef>,
    data: bool,
    has_index_child: bool,
    has_children: bool,
}

impl<F: Fn(&str) -> bool + Copy> Extractor<'_, F> {
    fn element_route(
        &mut self,
        element: Node<'_>,
        parent_path: &str,
        parent: Option<&str>,
    ) -> Result<(), ConvertError> {
        let tree = self.tree;
        let children = self.route_children(element);
        let declaration = Declaration {
            path: jsx::find_attribute(tree, element, "path")
                .and_then(|a| attribute_string(tree, a))
                .map(str::to_owned),
            index: jsx::find_attribute(tree, element, "index")
                .is_some_and(|a| attribute_is_true(tree, a)),
            component: self.element_component(element),
            lazy: None,
            data: jsx::find_attribute(tree, element, "loader").is_some(),
            has_index_child: children.iter().any(|c| {
                jsx::find_attribute(tree, *c, "index").is_some_and(|a| attribute_is_true(tree, a))
            }),
            has_children: !children.is_empty(),
        };

        let (full, own) = self.register(&declaration, parent_path, parent)?;
        let layout = self.layout_of(&declaration, &full);
        self.nested(layout, |this| {
            for child in children {
                this.element_route(child, &full, own.as_deref().or(parent))?;
            }
            Ok(())
        })
    }

    fn object_routes(
        &mut self,
        array: Node<'_>,
        parent_path: &str,
        parent: Option<&str>,
    ) -> Result<(), ConvertError> {
        let tree = self.tree;
        let mut cursor = array.walk();
        let objects: Vec<Node<'_>> = array
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "object")
            .collect();

        for object in objects {
            let pairs = object_pairs(tree, object);
            let value = |key: &str| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
            let children = value("children").filter(|v| v.kind() == "array");

            let component = value("element")
                .and_then(|v| self.component_in(v))
                .or_else(|| {
                    value("Component")
                        .or_else(|| value("component"))
                        .map(|v| tree.node_text(v).to_owned())
                });
            let lazy = value("lazy")
                .and_then(|v| dynamic_import_specifier(tree, v))
                .and_then(|specifier| {
                    crate::paths::resolve_module(self.path, specifier, self.exists)
                })
                .map(|(path, _)| ComponentRef {
                    name: component_name_from_path(&path),
                    path,
                    export: LAZY_ROUTE_EXPORT.to_owned(),
                });

            let declaration = Declaration {
                path: value("path")
                    .and_then(|v| tree.string_value(v))
                    .map(str::to_owned),
                index: value("index").is_some_and(|v| tree.node_text(v) == "true"),
                component,
                data: value("loader").is_some() || lazy.is_some(),
                lazy,
                has_index_child: children.is_some_and(|c| array_has_index(tree, c)),
                has_children: children.is_some_and(|c| c.named_child_count() > 0),
            };

            let (full, own) = self.register(&declaration, parent_path, parent)?;
            if let Some(children) = children {
                let layout = self.layout_of(&declaration, &full);
                self.nested(layout, |this| {
                    this.object_routes(children, &full, own.as_deref().or(parent))
                })?;
            }
        }
        Ok(())
    }

    /// Inserts the entry a declaration describes, if it is a page.
    ///
    /// Returns the joined raw path children build on and the normalized
    /// path of the entry children report as their parent.
    fn register(
        &mut self,
        declaration: &Declaration,
        parent_path: &str,
        parent: Option<&str>,
    ) -> Result<(String, Option<String>), ConvertError> {
        let full = match (&declaration.path, declaration.index) {
            (Some(path), false) => join_route_paths(parent_path, path),
            _ => parent_path.to_owned(),
        };
        let full = if full.is_empty() { "/".to_owned() } else { full };

        let declares_path = declaration.path.is_some() || declaration.index;
        let is_layout = declaration.has_index_child
            || (declaration.has_children && declaration.component.is_none());
        let own = declaration
            .path
            .is_some()
            .then(|| normalize_route_path(&full));

        if !declares_path || is_layout {
            return Ok((full, own));
        }

        let mut entry = RouteEntry::new(&full, declaration.component.clone());
        entry.index = declaration.index;
        entry.parent = parent.map(str::to_owned);
        entry.layouts.clone_from(&self.layouts);
        if declaration.data {
            entry.mode = RenderMode::DataDriven;
        }

        if let Some(component) = self.resolve_declared(declaration) {
            if entry.component.is_none() {
                entry.component = Some(component.name.clone());
            }
            entry.component_path = Some(component.path);
            entry.component_export = Some(component.export);
        }

        self.table
            .insert(entry)
            .map_err(|dup| ConvertError::routes(Some(self.path.to_owned()), dup.to_string()))?;
        Ok((full, own))
    }

    /// The layout a declaration with nested routes gives them.
    fn layout_of(&self, declaration: &Declaration, full: &str) -> Option<RouteLayout> {
        if !declaration.has_children {
            return None;
        }
        let resolved = self.resolve_declared(declaration);
        let component = declaration
            .component
            .clone()
            .or_else(|| resolved.as_ref().map(|c| c.name.clone()))?;
        tracing::debug!(component = %component, path = %full, "layout route");
        Some(RouteLayout {
            path: normalize_route_path(full),
            component,
            component_path: resolved.as_ref().map(|c| c.path.clone()),
            component_export: resolved.map(|c| c.export),
        })
    }

    /// Reads the routes below a declaration with its layout in effect.
    fn nested(
        &mut self,
        layout: Option<RouteLayout>,
        read: impl FnOnce(&mut Self) -> Result<(), ConvertError>,
    ) -> Result<(), ConvertError> {
        let pushed = layout.is_some();
        self.layouts.extend(layout);
        let result = read(self);
        if pushed {
            self.layouts.pop();
        }
        result
    }

    fn resolve_declared(&self, declaration: &Declaration) -> Option<ComponentRef> {
        declaration
            .lazy
            .clone()
            .or_else(|| declaration.component.as_deref().and_then(|c| self.resolve(c)))
    }

    /// Resolves a component name to the module defining it.
    fn resolve(&self, name: &str) -> Option<ComponentRef> {
        if let Some(component) = self.scope.get(name) {
            return Some(component.clone());
        }
        self.exports.get(name).map(|export| ComponentRef {
            name: name.to_owned(),
            path: self.path.to_owned(),
            export: export.clone(),
        })
    }

    /// Reads the component a route element renders.
    fn element_component(&self, element: Node<'_>) -> Option<String> {
        let tree = self.tree;
        for name in ["element", "render"] {
            if let Some(component) = jsx::find_attribute(tree, element, name)
                .and_then(jsx::attribute_value)
                .and_then(|v| self.component_in(v))
            {
                return Some(component);
            }
        }
        for name in ["component", "Component"] {
            if let Some(expression) = jsx::find_attribute(tree, element, name)
                .and_then(jsx::attribute_value)
                .and_then(jsx::expression_of)
            {
                return Some(tree.node_text(expression).to_owned());
            }
        }

        // `<Route path="/about"><About /></Route>`
        let mut cursor = element.walk();
        let children: Vec<Node<'_>> = element
            .named_children(&mut cursor)
            .filter(|c| jsx::is_element(*c) && !self.bindings.is_route_element(tree, *c))
            .collect();
        children.into_iter().find_map(|c| self.component_in(c))
    }

    /// Returns the component rendered by the markup under `node`.
    ///
    /// Prefers a name that resolves to a project module, so
    /// `<RequireAuth><Dashboard /></RequireAuth>` reads as `Dashboard` when
    /// only that one is imported.
    fn component_in(&self, node: Node<'_>) -> Option<String> {
        let tree = self.tree;
        let names: Vec<&str> = Descendants::new(node)
            .filter(|n| jsx::is_element(*n))
            .filter_map(|n| jsx::element_name(tree, n))
            .filter(|name| name.starts_with(|c: char| c.is_ascii_uppercase()))
            .filter(|name| !self.bindings.library.contains(*name))
            .collect();
        names
            .iter()
            .find(|name| self.scope.contains(name) || self.exports.contains_key(**name))
            .or_else(|| names.first())
            .map(|name| (*name).to_owned())
    }

    /// Returns the route elements directly under `element`.
    fn route_children<'t>(&self, element: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = element.walk();
        element
            .named_children(&mut cursor)
            .filter(|c| self.bindings.is_route_element(self.tree, *c))
            .collect()
    }
}

fn has_route_ancestor(tree: &SyntaxTree, bindings: &RouteBindings, node: Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if bindings.is_route_element(tree, parent) {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// Reads a string attribute value (`path="/a"` or `path={'/a'}`).
fn attribute_string<'a>(tree: &'a SyntaxTree, attribute: Node<'_>) -> Option<&'a str> {
    let value = jsx::attribute_value(attribute)?;
    match value.kind() {
        "string" => tree.string_value(value),
        "jsx_expression" => jsx::expression_of(value).and_then(|e| tree.string_value(e)),
        _ => None,
    }
}

/// Returns `true` for a bare attribute or `{true}`.
fn attribute_is_true(tree: &SyntaxTree, attribute: Node<'_>) -> bool {
    match jsx::attribute_value(attribute) {
        None => true,
        Some(value) => jsx::expression_of(value).is_some_and(|e| tree.node_text(e) == "true"),
    }
}

/// Returns the route array an argument holds: the literal itself, or the
/// array a same-file `const routes = [...]` declares.
fn route_array<'t>(tree: &'t SyntaxTree, argument: Node<'t>) -> Option<Node<'t>> {
    match argument.kind() {
        "array" => Some(argument),
        "identifier" => {
            let name = tree.node_text(argument);
            tree.descendants()
                .filter(|n| n.kind() == "variable_declarator")
                .find(|d| {
                    d.child_by_field_name("name")
                        .is_some_and(|n| tree.node_text(n) == name)
                })
                .and_then(|d| d.child_by_field_name("value"))
                .filter(|v| v.kind() == "array")
        }
        _ => None,
    }
}

/// Returns the `key: value` pairs of an object literal.
fn object_pairs<'a, 't>(tree: &'a SyntaxTree, object: Node<'t>) -> Vec<(&'a str, Node<'t>)> {
    let mut cursor = object.walk();
    object
        .named_children(&mut cursor)
        .filter_map(|member| match member.kind() {
            "pair" => {
                let key = member.child_by_field_name("key")?;
                let value = member.child_by_field_name("value")?;
                let key = tree
                    .string_value(key)
                    .unwrap_or_else(|| tree.node_text(key));
                Some((key, value))
            }
            // `{ path, Component }`
            "shorthand_property_identifier" => Some((tree.node_text(member), member)),
            _ => None,
        })
        .collect()
}

fn array_has_index(tree: &SyntaxTree, array: Node<'_>) -> bool {
    let mut cursor = array.walk();
    array
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "object")
        .any(|object| {
            object_pairs(tree, object)
                .iter()
                .any(|(key, value)| *key == "index" && tree.node_text(*value) == "true")
        })
}

fn component_name_from_path(path: &Utf8Path) -> String {
    let stem = path.file_stem().unwrap_or("Route");
    if stem == "index" {
        path.parent()
            .and_then(Utf8Path::file_name)
            .unwrap_or("Route")
            .to_owned()
    } else {
        stem.to_owned()
    }
}

/// Returns `true` if `text` looks like it declares routes, for files that
/// do not parse.
#[must_use]
pub fn mentions_routes(text: &str) -> bool {
    table::NAVIGATION_MODULES.iter().any(|m| text.contains(m))
        && (text.contains("<Route") || ROUTE_OBJECT_FACTORIES.iter().any(|f| text.contains(f)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rn_core::NOT_FOUND_PATTERN;
    use rn_syntax::{Dialect, SyntaxEngine, extract_imports};

    const FILES: &[&str] = &[
        "src/pages/Home.js",
        "src/pages/About.js",
        "src/pages/Users.js",
        "src/pages/User.js",
        "src/pages/UserList.js",
        "src/pages/NotFound.js",
        "src/routes/Settings.js",
    ];

    fn extract(text: &str) -> Result<RouteTable, ConvertError> {
        let mut engine = SyntaxEngine::new().expect("engine");
        let tree = engine.parse(text, Dialect::Tsx).expect("parse");
        let imports = extract_imports(&tree).expect("imports");
        extract_routes(&tree, Utf8Path::new("src/App.js"), &imports, |p| {
            FILES.contains(&p)
        })
    }

    fn paths(table: &RouteTable) -> Vec<&str> {
        table.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_markup_routes() {
        let table = extract(
            "import { BrowserRouter, Routes, Route } from 'react-router-dom';
import Home from './pages/Home';
import About from './pages/About';
import NotFound from './pages/NotFound';

export default function App() {
  return (
    <BrowserRouter>
      <Routes>
        <Route path=\"/\" element={<Home />} />
        <Route path=\"/about/\" element={<About />} />
        <Route path=\"*\" element={<NotFound />} />
      </Routes>
    </BrowserRouter>
  );
}
",
        )
        .expect("routes");
        assert_eq!(paths(&table), vec!["/", "/about", NOT_FOUND_PATTERN]);
        let about = table.get("/about").expect("about");
        assert_eq!(about.component.as_deref(), Some("About"));
        assert_eq!(about.component_path.as_deref(), Some(Utf8Path::new("src/pages/About.js")));
        assert_eq!(about.component_export.as_deref(), Some("default"));
        assert!(about.layouts.is_empty());
    }

    #[test]
    fn test_nested_and_index_routes() {
        let table = extract(
            "import { Routes, Route } from 'react-router-dom';
import Users from './pages/Users';
import UserList from './pages/UserList';
import User from './pages/User';

export const AppRoutes = () => (
  <Routes>
    <Route path=\"users\" element={<Users />}>
      <Route index element={<UserList />} />
      <Route path=\":id\" element={<User />} />
    </Route>
  </Routes>
);
",
        )
        .expect("routes");
        assert_eq!(paths(&table), vec!["/users", "/users/[id]"]);
        let index = table.get("/users").expect("index route");
        assert!(index.index);
        assert_eq!(index.component.as_deref(), Some("UserList"));
        assert_eq!(index.parent.as_deref(), Some("/users"));
        let user = table.get("/users/[id]").expect("user");
        assert_eq!(user.mode, RenderMode::DataDriven);

        for entry in [index, user] {
            assert_eq!(entry.layouts.len(), 1);
            let layout = &entry.layouts[0];
            assert_eq!(layout.path, "/users");
            assert_eq!(layout.component, "Users");
            assert_eq!(layout.component_path.as_deref(), Some(Utf8Path::new("src/pages/Users.js")));
            assert_eq!(layout.component_export.as_deref(), Some("default"));
        }
    }

    #[test]
    fn test_nested_layouts_stack() {
        let table = extract(
            "import { Routes, Route } from 'react-router-dom';
import Home from './pages/Home';
import Users from './pages/Users';
import User from './pages/User';
import About from './pages/About';

export const AppRoutes = () => (
  <Routes>
    <Route path=\"/\" element={<Home />}>
      <Route path=\"users\" element={<Users />}>
        <Route path=\":id\" element={<User />} />
      </Route>
    </Route>
    <Route path=\"/about\" element={<About />} />
  </Routes>
);
",
        )
        .expect("routes");
        let user = table.get("/users/[id]").expect("user");
        let stack: Vec<&str> = user.layouts.iter().map(|l| l.component.as_str()).collect();
        assert_eq!(stack, vec!["Home", "Users"]);
        assert_eq!(table.get("/users").expect("users").layouts.len(), 1);
        assert!(table.get("/about").expect("about").layouts.is_empty());
    }

    #[test]
    fn test_legacy_switch_routes() {
        let table = extract(
            "import { Switch, Route } from 'react-router-dom';
import Home from './pages/Home';
import About from './pages/About';

export function Main() {
  return (
    <Switch>
      <Route exact path=\"/\" component={Home} />
      <Route path=\"/about\"><About /></Route>
    </Switch>
  );
}
",
        )
        .expect("routes");
        assert_eq!(paths(&table), vec!["/", "/about"]);
        assert_eq!(table.get("/").and_then(|e| e.component.as_deref()), Some("Home"));
        assert_eq!(table.get("/about").and_then(|e| e.component.as_deref()), Some("About"));
    }

    #[test]
    fn test_object_routes() {
        let table = extract(
            "import { createBrowserRouter } from 'react-router-dom';
import Home from './pages/Home';
import Users from './pages/Users';
import User from './pages/User';

const routes = [
  { path: '/', element: <Home /> },
  {
    path: '/users',
    Component: Users,
    loader: () => fetch('/api/users'),
    children: [{ path: ':id', element: <User /> }],
  },
  { path: '/settings', lazy: () => import('./routes/Settings') },
];

export const router = createBrowserRouter(routes);
",
        )
        .expect("routes");
        assert_eq!(paths(&table), vec!["/", "/users", "/users/[id]", "/settings"]);
        let users = table.get("/users").expect("users");
        assert_eq!(users.mode, RenderMode::DataDriven);
        assert_eq!(users.component_path.as_deref(), Some(Utf8Path::new("src/pages/Users.js")));
        assert!(users.layouts.is_empty());
        let user = table.get("/users/[id]").expect("user");
        assert_eq!(user.layouts[0].component, "Users");
        let settings = table.get("/settings").expect("settings");
        assert_eq!(settings.component_export.as_deref(), Some("Component"));
        assert_eq!(settings.component.as_deref(), Some("Settings"));
    }

    #[test]
    fn test_duplicate_routes_fail() {
        let err = extract(
            "import { Routes, Route } from 'react-router-dom';
import Home from './pages/Home';
export const R = () => (
  <Routes>
    <Route path=\"/home\" element={<Home />} />
    <Route path=\"/home/\" element={<Home />} />
  </Routes>
);
",
        )
        .expect_err("duplicate");
        assert!(matches!(err, ConvertError::Routes { .. }));
        assert!(err.to_string().contains("/home"));
    }

    #[test]
    fn test_local_component_resolves_to_config_file() {
        let table = extract(
            "import { Routes, Route } from 'react-router-dom';
export function Contact() { return null; }
export const R = () => <Routes><Route path=\"/contact\" element={<Contact />} /></Routes>;
",
        )
        .expect("routes");
        let contact = table.get("/contact").expect("contact");
        assert_eq!(contact.component_path.as_deref(), Some(Utf8Path::new("src/App.js")));
        assert_eq!(contact.component_export.as_deref(), Some("Contact"));
    }

    #[test]
    fn test_declaration_count() {
        let mut engine = SyntaxEngine::new().expect("engine");
        let tree = engine
            .parse(
                "import { Routes, Route } from 'react-router-dom';\nconst x = <Routes><Route path=\"/\" /><Route path=\"/a\" /></Routes>;\n",
                Dialect::Tsx,
            )
            .expect("parse");
        let imports = extract_imports(&tree).expect("imports");
        assert_eq!(declaration_count(&tree, &RouteBindings::from_imports(&imports)), 2);

        let plain = engine.parse("const x = <Route />;\n", Dialect::Tsx).expect("parse");
        assert_eq!(declaration_count(&plain, &RouteBindings::default()), 0);
    }

    #[test]
    fn test_mentions_routes() {
        assert!(mentions_routes("import { Route } from 'react-router-dom'; <Route path="));
        assert!(!mentions_routes("const Route = 1;"));
    }
}
