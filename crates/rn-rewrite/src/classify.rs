//! The pattern classifier.
//!
//! [`classify`] walks a syntax tree once and records every construct the
//! rewrite passes care about in a [`FileSignals`] value. Classification is
//! read-only and never fails on unusual code: constructs it cannot make
//! sense of are simply not recorded.
//!
//! Passes run one after another on re-parsed trees. After the import pass
//! has removed the library imports, later passes still need to know which
//! local names came from the library; [`classify_with`] takes those
//! [`KnownBindings`] from the first classification.

use rn_core::{
    ApiCall, ConstructKind, ElementSignal, FileSignals, FxHashMap, FxHashSet, HookCall,
    HttpMethod, ImportKind, NavImport, Span,
};
use rn_syntax::{Node, SyntaxTree, extract_imports, jsx};
use smallvec::SmallVec;

use crate::error::RewriteError;
use crate::table;

/// Path prefix that marks a request as bound for the project's own backend.
pub const API_PREFIX: &str = "/api";

/// HTTP client objects whose method calls are recognized (`axios.get`).
const HTTP_CLIENTS: &[&str] = &["axios"];

/// A library binding in effect for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The exported name (`NavLink`).
    pub imported: String,
    /// What the table says the export is.
    pub kind: ConstructKind,
}

/// Local names bound to recognized library exports.
#[derive(Debug, Clone, Default)]
pub struct KnownBindings {
    locals: FxHashMap<String, Binding>,
}

impl KnownBindings {
    /// Collects the bindings of classified library imports.
    #[must_use]
    pub fn from_imports(imports: &[NavImport]) -> Self {
        let locals = imports
            .iter()
            .map(|import| {
                (
                    import.binding.local.clone(),
                    Binding {
                        imported: import.binding.imported.clone(),
                        kind: import.kind,
                    },
                )
            })
            .collect();
        Self { locals }
    }

    /// Returns the binding of a local name.
    #[must_use]
    pub fn get(&self, local: &str) -> Option<&Binding> {
        self.locals.get(local)
    }

    /// Returns the construct kind of a local name.
    #[must_use]
    pub fn kind_of(&self, local: &str) -> Option<ConstructKind> {
        self.get(local).map(|b| b.kind)
    }

    /// Returns the local names bound to the given kind.
    pub fn locals_of(&self, kind: ConstructKind) -> impl Iterator<Item = &str> {
        self.locals
            .iter()
            .filter(move |(_, b)| b.kind == kind)
            .map(|(local, _)| local.as_str())
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locals.len()
    }

    /// Returns `true` if no names are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    fn extend(&mut self, other: Self) {
        self.locals.extend(other.locals);
    }
}

/// Classifies a tree from its own imports.
///
/// # Errors
///
/// Returns [`RewriteError::Classify`] if import extraction fails.
///
/// # Examples
///
/// ```
/// use rn_rewrite::classify;
/// use rn_syntax::{Dialect, SyntaxEngine};
///
/// let mut engine = SyntaxEngine::new()?;
/// let tree = engine.parse(
///     "import { useNavigate } from 'react-router-dom';\nconst navigate = useNavigate();\n",
///     Dialect::Tsx,
/// )?;
/// let signals = classify(&tree)?;
/// assert!(signals.uses_navigation_library());
/// assert_eq!(signals.navigators.as_slice(), ["navigate"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn classify(tree: &SyntaxTree) -> Result<FileSignals, RewriteError> {
    classify_with(tree, &KnownBindings::default())
}

/// Classifies a tree, treating `carried` names as library bindings in
/// addition to the tree's own library imports.
///
/// # Errors
///
/// Returns [`RewriteError::Classify`] if import extraction fails.
pub fn classify_with(
    tree: &SyntaxTree,
    carried: &KnownBindings,
) -> Result<FileSignals, RewriteError> {
    let imports = extract_imports(tree).map_err(RewriteError::Classify)?;

    let mut nav_imports: SmallVec<[NavImport; 4]> = SmallVec::new();
    for import in imports
        .iter()
        .filter(|i| i.kind != ImportKind::Dynamic && table::is_recognized_module(&i.path))
    {
        for binding in &import.bindings {
            let kind = if binding.is_default() || binding.imported == "*" {
                ConstructKind::Unknown
            } else {
                table::construct(&binding.imported)
            };
            nav_imports.push(NavImport {
                source: import.path.clone(),
                binding: binding.clone(),
                kind,
                statement: import.span,
            });
        }
    }

    let mut bindings = carried.clone();
    bindings.extend(KnownBindings::from_imports(&nav_imports));
    let image_bound = imports.iter().any(|i| i.binds_local("Image"));
    // Names bound by other modules (`useParams` from next/navigation).
    let foreign: FxHashSet<&str> = imports
        .iter()
        .filter(|i| !table::is_recognized_module(&i.path))
        .flat_map(|i| i.bindings.iter().map(|b| b.local.as_str()))
        .collect();

    let mut signals = FileSignals {
        nav_imports,
        has_markup: tree.has_markup(),
        ..FileSignals::default()
    };

    for node in tree.descendants() {
        match node.kind() {
            "call_expression" => classify_call(tree, node, &bindings, &foreign, &mut signals),
            "jsx_element" | "jsx_self_closing_element" => {
                classify_element(tree, node, &bindings, image_bound, &mut signals);
            }
            _ => {}
        }
    }

    for call in signals
        .hook_calls
        .iter()
        .filter(|c| c.imported && c.hook.is_navigator())
    {
        if let Some(name) = &call.binding {
            if !signals.navigators.contains(name) {
                signals.navigators.push(name.clone());
            }
        }
    }

    Ok(signals)
}

fn classify_call(
    tree: &SyntaxTree,
    call: Node<'_>,
    bindings: &KnownBindings,
    foreign: &FxHashSet<&str>,
    signals: &mut FileSignals,
) {
    let Some(function) = call.child_by_field_name("function") else {
        return;
    };

    match function.kind() {
        "identifier" => {
            let name = tree.node_text(function);
            match bindings.get(name) {
                Some(Binding {
                    kind: ConstructKind::Hook(hook),
                    ..
                }) => signals.hook_calls.push(hook_call(tree, call, name, *hook, true)),
                Some(Binding {
                    kind: ConstructKind::RouterFactory,
                    imported,
                }) => signals.router_factories.push(ElementSignal {
                    name: name.to_owned(),
                    imported: Some(imported.clone()),
                    span: SyntaxTree::span(call),
                    location: SyntaxTree::location(call),
                    flagged_attributes: SmallVec::new(),
                }),
                Some(_) => {}
                None => {
                    if let Some(hook) = table::hook(name).filter(|_| !foreign.contains(name)) {
                        signals.hook_calls.push(hook_call(tree, call, name, hook, false));
                    } else if name == "fetch" {
                        if let Some(api) = fetch_call(tree, call) {
                            signals.api_calls.push(api);
                        }
                    }
                }
            }
        }
        "member_expression" => {
            if let Some(api) = client_call(tree, call, function) {
                signals.api_calls.push(api);
            }
        }
        _ => {}
    }
}

fn hook_call(
    tree: &SyntaxTree,
    call: Node<'_>,
    callee: &str,
    hook: rn_core::HookKind,
    imported: bool,
) -> HookCall {
    let binding = call
        .parent()
        .filter(|p| p.kind() == "variable_declarator")
        .and_then(|declarator| declarator.child_by_field_name("name"))
        .filter(|name| name.kind() == "identifier")
        .map(|name| tree.node_text(name).to_owned());

    HookCall {
        callee: callee.to_owned(),
        hook,
        imported,
        binding,
        span: SyntaxTree::span(call),
        location: SyntaxTree::location(call),
    }
}

/// `fetch('/api/users', { method: 'POST' })`
fn fetch_call(tree: &SyntaxTree, call: Node<'_>) -> Option<ApiCall> {
    let arguments = call.child_by_field_name("arguments")?;
    let endpoint = endpoint_of(tree, arguments.named_child(0)?)?;
    let method = arguments
        .named_child(1)
        .filter(|options| options.kind() == "object")
        .and_then(|options| method_option(tree, options))
        .unwrap_or(HttpMethod::Get);
    Some(ApiCall {
        endpoint,
        method,
        location: SyntaxTree::location(call),
    })
}

/// `axios.post('/api/users', body)`
fn client_call(tree: &SyntaxTree, call: Node<'_>, function: Node<'_>) -> Option<ApiCall> {
    let object = function.child_by_field_name("object")?;
    if !HTTP_CLIENTS.contains(&tree.node_text(object)) {
        return None;
    }
    let property = function.child_by_field_name("property")?;
    let method = HttpMethod::parse(tree.node_text(property))?;
    let arguments = call.child_by_field_name("arguments")?;
    let endpoint = endpoint_of(tree, arguments.named_child(0)?)?;
    Some(ApiCall {
        endpoint,
        method,
        location: SyntaxTree::location(call),
    })
}

fn method_option(tree: &SyntaxTree, options: Node<'_>) -> Option<HttpMethod> {
    let mut cursor = options.walk();
    let pair = options.named_children(&mut cursor).find(|pair| {
        pair.kind() == "pair"
            && pair.child_by_field_name("key").is_some_and(|key| {
                let key_text = tree.string_value(key).unwrap_or_else(|| tree.node_text(key));
                key_text == "method"
            })
    })?;
    let value = pair.child_by_field_name("value")?;
    HttpMethod::parse(tree.string_value(value)?)
}

/// Reads a request URL into route notation, if it targets the backend.
///
/// Template substitutions become dynamic segments named after the
/// substituted identifier (`` `/api/users/${id}` `` is `/api/users/[id]`).
fn endpoint_of(tree: &SyntaxTree, argument: Node<'_>) -> Option<String> {
    let raw = match argument.kind() {
        "string" => tree.string_value(argument)?.to_owned(),
        "template_string" => template_path(tree, argument),
        _ => return None,
    };
    let path = raw
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    if path == API_PREFIX || path.starts_with("/api/") {
        Some(path.to_owned())
    } else {
        None
    }
}

fn template_path(tree: &SyntaxTree, template: Node<'_>) -> String {
    let text = tree.text();
    let inner = Span::new(template.start_byte() + 1, template.end_byte().saturating_sub(1));
    let mut path = String::new();
    let mut cursor = inner.start;
    let mut walk = template.walk();
    for substitution in template
        .named_children(&mut walk)
        .filter(|c| c.kind() == "template_substitution")
    {
        path.push_str(text.get(cursor..substitution.start_byte()).unwrap_or_default());
        path.push('[');
        path.push_str(&substitution_name(tree, substitution));
        path.push(']');
        cursor = substitution.end_byte();
    }
    path.push_str(text.get(cursor..inner.end).unwrap_or_default());
    path
}

fn substitution_name(tree: &SyntaxTree, substitution: Node<'_>) -> String {
    let Some(expression) = substitution.named_child(0) else {
        return "param".to_owned();
    };
    match expression.kind() {
        "identifier" => tree.node_text(expression).to_owned(),
        "member_expression" => expression
            .child_by_field_name("property")
            .map_or_else(|| "param".to_owned(), |p| tree.node_text(p).to_owned()),
        _ => "param".to_owned(),
    }
}

fn classify_element(
    tree: &SyntaxTree,
    element: Node<'_>,
    bindings: &KnownBindings,
    image_bound: bool,
    signals: &mut FileSignals,
) {
    let Some(name) = jsx::element_name(tree, element) else {
        return;
    };

    if let Some(binding) = bindings.get(name) {
        let imported = Some(binding.imported.as_str());
        match binding.kind {
            ConstructKind::Link => {
                let mut signal = element_signal(element, name, imported);
                signal.flagged_attributes = active_state_attributes(tree, element);
                signals.links.push(signal);
            }
            ConstructKind::Container => {
                signals.containers.push(element_signal(element, name, imported));
            }
            ConstructKind::Head => {
                signals.head_elements.push(element_signal(element, name, imported));
            }
            _ => {}
        }
        return;
    }

    if table::TITLE_ELEMENTS.contains(&name) {
        signals.head_elements.push(element_signal(element, name, None));
    } else if name == "img" {
        signals.images.push(element_signal(element, name, None));
    } else if name == "Image" && !image_bound {
        signals.unbound_images.push(element_signal(element, name, None));
    } else if name == "a" && is_internal_anchor(tree, element) {
        signals.internal_anchors.push(element_signal(element, name, None));
    }
}

fn element_signal(element: Node<'_>, name: &str, imported: Option<&str>) -> ElementSignal {
    ElementSignal {
        name: name.to_owned(),
        imported: imported.map(str::to_owned),
        span: SyntaxTree::span(element),
        location: SyntaxTree::location(element),
        flagged_attributes: SmallVec::new(),
    }
}

fn active_state_attributes(tree: &SyntaxTree, element: Node<'_>) -> SmallVec<[String; 2]> {
    let mut flagged = SmallVec::new();
    for attribute in jsx::attributes(element) {
        let Some(name) = jsx::attribute_name(attribute).map(|n| tree.node_text(n)) else {
            continue;
        };
        let callback = || {
            jsx::attribute_value(attribute)
                .and_then(jsx::expression_of)
                .is_some_and(|e| {
                    matches!(e.kind(), "arrow_function" | "function_expression" | "function")
                })
        };
        if table::ACTIVE_STATE_ATTRIBUTES.contains(&name)
            || (table::ACTIVE_STATE_CALLBACK_ATTRIBUTES.contains(&name) && callback())
        {
            flagged.push(name.to_owned());
        }
    }
    flagged
}

fn is_internal_anchor(tree: &SyntaxTree, element: Node<'_>) -> bool {
    jsx::find_attribute(tree, element, "href")
        .and_then(jsx::attribute_value)
        .and_then(|value| tree.string_value(value))
        .is_some_and(|href| href.starts_with('/') && !href.starts_with("//"))
}
