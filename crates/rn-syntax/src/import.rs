//! Import extraction from parsed script files.
//!
//! This module provides [`extract_imports`], which finds static imports,
//! dynamic `import()` calls, and `require()` calls and reads their bindings
//! into [`ImportInfo`] values.

use rn_core::{ImportBinding, ImportInfo, ImportKind};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, QueryCursor};

use crate::error::SyntaxError;
use crate::queries::{capture_index, import_query};
use crate::tree::{SyntaxTree, child_of_kind, has_child_kind};

/// Extracts all module references from a tree, in source order.
///
/// # Errors
///
/// Returns [`SyntaxError::QueryCompile`] if the import query fails to
/// compile.
///
/// # Examples
///
/// ```
/// use rn_core::ImportKind;
/// use rn_syntax::{Dialect, SyntaxEngine, extract_imports};
///
/// let mut engine = SyntaxEngine::new()?;
/// let tree = engine.parse(
///     "import { Link as RouterLink, useNavigate } from 'react-router-dom';",
///     Dialect::Tsx,
/// )?;
/// let imports = extract_imports(&tree)?;
/// assert_eq!(imports.len(), 1);
/// assert_eq!(imports[0].kind, ImportKind::Named);
/// assert_eq!(imports[0].bindings[0].local, "RouterLink");
/// # Ok::<(), rn_syntax::SyntaxError>(())
/// ```
pub fn extract_imports(tree: &SyntaxTree) -> Result<SmallVec<[ImportInfo; 8]>, SyntaxError> {
    let query = import_query(tree.dialect())?;
    let statement_idx = capture_index(query, "import.statement");
    let dynamic_idx = capture_index(query, "import.dynamic.source");
    let callee_idx = capture_index(query, "require.callee");
    let require_idx = capture_index(query, "require.source");

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root(), tree.text().as_bytes());
    let mut seen: FxHashSet<usize> = FxHashSet::default();
    let mut imports: SmallVec<[ImportInfo; 8]> = SmallVec::new();

    while let Some(match_) = matches.next() {
        let capture = |index: Option<u32>| {
            match_
                .captures
                .iter()
                .find(|c| Some(c.index) == index)
                .map(|c| c.node)
        };

        if let Some(statement) = capture(statement_idx) {
            if seen.insert(statement.id()) {
                if let Some(import) = static_import(tree, statement) {
                    imports.push(import);
                }
            }
        } else if let Some(source) = capture(dynamic_idx) {
            if let Some(import) = dynamic_import(tree, source) {
                imports.push(import);
            }
        } else if let (Some(callee), Some(source)) = (capture(callee_idx), capture(require_idx)) {
            if tree.node_text(callee) == "require" {
                if let Some(import) = require_import(tree, source) {
                    imports.push(import);
                }
            }
        }
    }

    imports.sort_by_key(|i| i.span.start);
    Ok(imports)
}

/// Reads an `import_statement` node.
fn static_import(tree: &SyntaxTree, statement: Node<'_>) -> Option<ImportInfo> {
    let source = statement.child_by_field_name("source")?;
    let path = tree.string_value(source)?.to_owned();
    let type_only = has_child_kind(statement, "type");

    let mut bindings: SmallVec<[ImportBinding; 4]> = SmallVec::new();
    let mut has_default = false;
    let mut has_namespace = false;

    if let Some(clause) = child_of_kind(statement, "import_clause") {
        let mut cursor = clause.walk();
        for part in clause.named_children(&mut cursor) {
            match part.kind() {
                "identifier" => {
                    has_default = true;
                    bindings.push(ImportBinding::new(
                        "default",
                        tree.node_text(part),
                        SyntaxTree::span(part),
                    ));
                }
                "namespace_import" => {
                    if let Some(name) = child_of_kind(part, "identifier") {
                        has_namespace = true;
                        bindings.push(ImportBinding::new(
                            "*",
                            tree.node_text(name),
                            SyntaxTree::span(part),
                        ));
                    }
                }
                "named_imports" => {
                    let mut inner = part.walk();
                    for specifier in part.named_children(&mut inner) {
                        if specifier.kind() != "import_specifier" {
                            continue;
                        }
                        let Some(name) = specifier.child_by_field_name("name") else {
                            continue;
                        };
                        let imported = tree.node_text(name);
                        let local = specifier
                            .child_by_field_name("alias")
                            .map_or(imported, |alias| tree.node_text(alias));
                        bindings.push(ImportBinding::new(
                            imported,
                            local,
                            SyntaxTree::span(specifier),
                        ));
                    }
                }
                _ => {}
            }
        }
    }

    let kind = if type_only {
        ImportKind::TypeOnly
    } else if has_namespace {
        ImportKind::Namespace
    } else if has_default {
        ImportKind::Default
    } else if bindings.is_empty() {
        ImportKind::SideEffect
    } else {
        ImportKind::Named
    };

    Some(ImportInfo {
        path,
        kind,
        bindings,
        location: SyntaxTree::location(statement),
        span: SyntaxTree::span(statement),
    })
}

/// Reads an `import('...')` call from its string argument.
fn dynamic_import(tree: &SyntaxTree, source: Node<'_>) -> Option<ImportInfo> {
    let call = source.parent()?.parent()?;
    Some(ImportInfo {
        path: tree.string_value(source)?.to_owned(),
        kind: ImportKind::Dynamic,
        bindings: SmallVec::new(),
        location: SyntaxTree::location(call),
        span: SyntaxTree::span(call),
    })
}

/// Reads a `require('...')` call and the declarator it initializes.
///
/// `const x = require('m')` binds `x` as the default export;
/// `const { a, b: c } = require('m')` binds `a` and `c` by name. The span
/// covers the whole declaration when it declares nothing else.
fn require_import(tree: &SyntaxTree, source: Node<'_>) -> Option<ImportInfo> {
    let call = source.parent()?.parent()?;
    let mut bindings: SmallVec<[ImportBinding; 4]> = SmallVec::new();
    let mut span_node = call;

    if let Some(declarator) = call
        .parent()
        .filter(|p| p.kind() == "variable_declarator")
    {
        if let Some(name) = declarator.child_by_field_name("name") {
            collect_pattern_bindings(tree, name, &mut bindings);
        }
        if let Some(declaration) = declarator.parent() {
            if declaration.named_child_count() == 1 {
                span_node = declaration;
            }
        }
    }

    Some(ImportInfo {
        path: tree.string_value(source)?.to_owned(),
        kind: ImportKind::Require,
        bindings,
        location: SyntaxTree::location(span_node),
        span: SyntaxTree::span(span_node),
    })
}

fn collect_pattern_bindings(
    tree: &SyntaxTree,
    pattern: Node<'_>,
    bindings: &mut SmallVec<[ImportBinding; 4]>,
) {
    match pattern.kind() {
        "identifier" => bindings.push(ImportBinding::new(
            "default",
            tree.node_text(pattern),
            SyntaxTree::span(pattern),
        )),
        "object_pattern" => {
            let mut cursor = pattern.walk();
            for property in pattern.named_children(&mut cursor) {
                match property.kind() {
                    "shorthand_property_identifier_pattern" => {
                        let name = tree.node_text(property);
                        bindings.push(ImportBinding::new(name, name, SyntaxTree::span(property)));
                    }
                    "pair_pattern" => {
                        let key = property.child_by_field_name("key");
                        let value = property.child_by_field_name("value");
                        if let (Some(key), Some(value)) = (key, value) {
                            bindings.push(ImportBinding::new(
                                tree.node_text(key),
                                tree.node_text(value),
                                SyntaxTree::span(property),
                            ));
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}
