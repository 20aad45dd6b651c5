//! Pass 1: navigation-library imports.
//!
//! Specifiers the table knows are removed; a statement left with no
//! specifiers is deleted together with its line. Specifiers the table does
//! not know stay behind in a reduced statement and are reported.
//!
//! Removing a hook records the need its calls are rewritten to. Removing
//! a link component records the link need, whether or not the file
//! renders the name as an element. A link imported under another name
//! that is used as a value (`component={NavLink}`) is renamed to the
//! replacement's binding.

use rn_core::{ConstructKind, FileSignals, NavImport, Span};
use rn_syntax::{Node, SyntaxTree, TextEdit};

use super::{EditSet, Effects, Need, PassContext, PassOutput, line_span};
use crate::error::RewriteError;

/// Runs the pass.
pub fn run(
    tree: &SyntaxTree,
    signals: &FileSignals,
    ctx: &PassContext<'_>,
) -> Result<PassOutput, RewriteError> {
    let mut edits = EditSet::default();
    let mut effects = Effects::default();

    for (statement, group) in by_statement(&signals.nav_imports) {
        let kept: Vec<&NavImport> = group
            .iter()
            .copied()
            .filter(|i| i.kind == ConstructKind::Unknown)
            .collect();
        for import in &kept {
            effects.advise(format!(
                "`{}` from {} has no file-system-routing equivalent; import kept for review",
                import.binding.imported, import.source
            ));
            effects.flagged += 1;
        }
        if kept.len() == group.len() {
            continue;
        }

        let text = tree.text().get(statement.range()).unwrap_or_default();
        let removed = if kept.is_empty() {
            edits.push(TextEdit::delete(line_span(tree, statement)))
        } else if let Some(reduced) = reduced_statement(text, &kept) {
            edits.push(TextEdit::replace(statement, reduced))
        } else {
            effects.advise(format!(
                "could not reduce the import of {}; left unchanged",
                group[0].source
            ));
            false
        };
        if !removed {
            continue;
        }
        for import in group.iter().filter(|i| i.kind != ConstructKind::Unknown) {
            record_removal(tree, import, ctx, &mut edits, &mut effects);
        }
    }

    Ok(PassOutput::from_parts(edits, effects))
}

/// Records what the file still depends on once `import` is gone.
fn record_removal(
    tree: &SyntaxTree,
    import: &NavImport,
    ctx: &PassContext<'_>,
    edits: &mut EditSet,
    effects: &mut Effects,
) {
    let local = import.binding.local.as_str();
    match import.kind {
        ConstructKind::Link => {
            effects.needs.insert(Need::LinkComponent);
            let target = Need::LinkComponent.binding();
            if local == target {
                return;
            }
            for node in value_references(tree, import) {
                let replacement = if node.kind() == "shorthand_property_identifier" {
                    format!("{local}: {target}")
                } else {
                    target.to_owned()
                };
                edits.push(TextEdit::replace(SyntaxTree::span(node), replacement));
            }
        }
        ConstructKind::Hook(kind) => {
            effects.needs.insert(Need::for_hook(kind, ctx.settings));
            if let Some(node) = value_references(tree, import).find(|n| !is_callee(*n)) {
                effects.advise(format!(
                    "{}: `{local}` is used other than as a call and its import was removed; review",
                    SyntaxTree::location(node)
                ));
                effects.flagged += 1;
            }
        }
        _ => {}
    }
}

/// References to an import's local name outside the import itself and
/// outside element tags (the element pass renames those).
fn value_references<'t>(tree: &'t SyntaxTree, import: &'t NavImport) -> impl Iterator<Item = Node<'t>> {
    let local = import.binding.local.as_str();
    tree.named_descendants().filter(move |node| {
        matches!(node.kind(), "identifier" | "shorthand_property_identifier")
            && tree.node_text(*node) == local
            && !import.statement.contains(&SyntaxTree::span(*node))
            && !is_tag_name(*node)
    })
}

fn is_tag_name(node: Node<'_>) -> bool {
    node.parent().is_some_and(|parent| {
        matches!(
            parent.kind(),
            "jsx_opening_element" | "jsx_closing_element" | "jsx_self_closing_element"
        )
    })
}

fn is_callee(node: Node<'_>) -> bool {
    node.parent().is_some_and(|parent| {
        parent.kind() == "call_expression" && parent.child_by_field_name("function") == Some(node)
    })
}

/// Groups imports by the statement they belong to, in source order.
fn by_statement<'a>(imports: &'a [NavImport]) -> Vec<(Span, Vec<&'a NavImport>)> {
    let mut groups: Vec<(Span, Vec<&NavImport>)> = Vec::new();
    for import in imports {
        match groups.iter_mut().find(|(span, _)| *span == import.statement) {
            Some((_, group)) => group.push(import),
            None => groups.push((import.statement, vec![import])),
        }
    }
    groups
}

/// Rebuilds an import statement with only the `kept` bindings.
///
/// Returns `None` for statement shapes that cannot be rebuilt safely (a
/// `require` call sharing its declaration with other declarators).
fn reduced_statement(original: &str, kept: &[&NavImport]) -> Option<String> {
    let source = &kept.first()?.source;
    let quote = if original.contains(&format!("\"{source}\"")) { '"' } else { '\'' };

    if original.starts_with("import") {
        let default = kept.iter().find(|i| i.binding.is_default());
        let namespace = kept.iter().find(|i| i.binding.imported == "*");
        let named: Vec<String> = kept
            .iter()
            .filter(|i| !i.binding.is_default() && i.binding.imported != "*")
            .map(|i| specifier(&i.binding.imported, &i.binding.local, " as "))
            .collect();

        let mut clause: Vec<String> = Vec::new();
        if let Some(default) = default {
            clause.push(default.binding.local.clone());
        }
        if let Some(namespace) = namespace {
            clause.push(format!("* as {}", namespace.binding.local));
        } else if !named.is_empty() {
            clause.push(format!("{{ {} }}", named.join(", ")));
        }
        let semicolon = if original.trim_end().ends_with(';') { ";" } else { "" };
        return Some(format!(
            "import {} from {quote}{source}{quote}{semicolon}",
            clause.join(", ")
        ));
    }

    let keyword = ["const", "let", "var"]
        .into_iter()
        .find(|k| original.starts_with(k))?;
    let named: Vec<String> = kept
        .iter()
        .map(|i| specifier(&i.binding.imported, &i.binding.local, ": "))
        .collect();
    Some(format!(
        "{keyword} {{ {} }} = require({quote}{source}{quote});",
        named.join(", ")
    ))
}

fn specifier(imported: &str, local: &str, separator: &str) -> String {
    if imported == local {
        imported.to_owned()
    } else {
        format!("{imported}{separator}{local}")
    }
}
