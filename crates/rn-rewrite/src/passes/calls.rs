//! Pass 2: hook calls and navigator calls.
//!
//! Imported hook calls become router-handle expressions, or the dedicated
//! parameter hooks in the app-directory convention. Calls through a
//! navigator (`navigate('/x')`, `history.push('/x')`) are rewritten to go
//! through the router handle with their arguments untouched. Router
//! factory calls are neutralized, since the routes they describe move to
//! the file system.

use rn_core::{FileSignals, FxHashMap, HookKind};
use rn_syntax::{Node, SyntaxTree, TextEdit};

use super::{EditSet, Effects, FUNCTION_KINDS, Need, PassContext, PassOutput, comment_before};
use crate::error::RewriteError;
use crate::table::{self, ROUTER_HANDLE};

/// Comment placed before the first rewritten navigator call of a file.
pub const ROUTER_ADVISORY: &str =
    "rr-next: navigation now goes through `router`; declare `const router = useRouter()` in this component";

/// Kinds whose children are statements.
const STATEMENT_PARENTS: &[&str] = &["statement_block", "program", "switch_case", "switch_default"];

/// Runs the pass.
pub fn run(
    tree: &SyntaxTree,
    signals: &FileSignals,
    ctx: &PassContext<'_>,
) -> Result<PassOutput, RewriteError> {
    let mut edits = EditSet::default();
    let mut effects = Effects::default();
    let directory_router = ctx.settings.use_directory_router;

    for call in &signals.hook_calls {
        if !call.imported {
            effects.advise(format!(
                "{}:{}: `{}()` is not imported from the navigation library; review manually",
                call.location.line, call.location.column, call.callee
            ));
            effects.flagged += 1;
            continue;
        }
        let replacement = table::hook_replacement(call.hook, directory_router);
        if !edits.push(TextEdit::replace(call.span, replacement)) {
            continue;
        }
        effects.needs.insert(Need::for_hook(call.hook, ctx.settings));
        if call.hook == HookKind::SearchParams {
            effects.advise(format!(
                "{}:{}: `{replacement}` is not a [params, setParams] pair; review its uses",
                call.location.line, call.location.column
            ));
            effects.flagged += 1;
        }
    }

    navigator_calls(tree, signals, &mut edits, &mut effects);

    for factory in &signals.router_factories {
        let nested = signals
            .router_factories
            .iter()
            .any(|other| other.span != factory.span && other.span.contains(&factory.span));
        if nested {
            continue;
        }
        if edits.push(TextEdit::replace(factory.span, "null")) {
            effects.note(format!(
                "{}:{}: `{}` call removed; its routes become files",
                factory.location.line, factory.location.column, factory.name
            ));
        }
    }

    Ok(PassOutput::from_parts(edits, effects))
}

fn navigator_calls(
    tree: &SyntaxTree,
    signals: &FileSignals,
    edits: &mut EditSet,
    effects: &mut Effects,
) {
    let navigators: FxHashMap<&str, HookKind> = signals
        .hook_calls
        .iter()
        .filter(|c| c.imported && c.hook.is_navigator())
        .filter_map(|c| c.binding.as_deref().map(|b| (b, c.hook)))
        .collect();
    if navigators.is_empty() {
        return;
    }

    let mut first: Option<Node<'_>> = None;
    for call in tree.descendants().filter(|n| n.kind() == "call_expression") {
        let Some(function) = call.child_by_field_name("function") else {
            continue;
        };
        let Some(replacement) = navigator_target(tree, function, &navigators) else {
            continue;
        };
        if edits.push(TextEdit::replace(SyntaxTree::span(function), replacement)) && first.is_none() {
            first = Some(call);
        }
    }

    if let Some(call) = first {
        let anchor = enclosing_statement(call);
        edits.push(comment_before(tree, anchor, ROUTER_ADVISORY));
        effects.advise(format!(
            "{}: navigation calls now use `{ROUTER_HANDLE}`; declare `const {ROUTER_HANDLE} = useRouter()` where they run",
            SyntaxTree::location(call)
        ));
        effects.needs.insert(Need::RouterHandle);
    }
}

/// Returns the router-handle callee replacing `function`, if it calls
/// through a navigator.
fn navigator_target(
    tree: &SyntaxTree,
    function: Node<'_>,
    navigators: &FxHashMap<&str, HookKind>,
) -> Option<String> {
    match function.kind() {
        "identifier" => (navigators.get(tree.node_text(function)) == Some(&HookKind::Navigate))
            .then(|| format!("{ROUTER_HANDLE}.push")),
        "member_expression" => {
            let object = function.child_by_field_name("object")?;
            let property = function.child_by_field_name("property")?;
            if navigators.get(tree.node_text(object)) != Some(&HookKind::History) {
                return None;
            }
            table::history_method(tree.node_text(property))
                .map(|method| format!("{ROUTER_HANDLE}.{method}"))
        }
        _ => None,
    }
}

/// Returns the statement containing `node`, or `node` itself when a
/// function boundary comes first (`onClick={() => navigate('/')}`).
fn enclosing_statement(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while let Some(parent) = current.parent() {
        if STATEMENT_PARENTS.contains(&parent.kind()) {
            return current;
        }
        if FUNCTION_KINDS.contains(&parent.kind()) {
            return node;
        }
        current = parent;
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{KnownBindings, classify, classify_with};
    use crate::passes::NeedSet;
    use rn_core::ConversionSettings;
    use rn_syntax::{Dialect, SyntaxEngine};

    /// Runs the pass on `text` as if the import pass had already removed
    /// the imports in `imports`.
    fn rewrite(imports: &str, text: &str) -> (String, Effects) {
        rewrite_with(ConversionSettings::default(), imports, text)
    }

    fn rewrite_with(settings: ConversionSettings, imports: &str, text: &str) -> (String, Effects) {
        let mut engine = SyntaxEngine::new().expect("engine");
        let original = engine
            .parse(format!("{imports}{text}"), Dialect::Tsx)
            .expect("parse");
        let bindings = KnownBindings::from_imports(&classify(&original).expect("classify").nav_imports);
        let tree = engine.parse(text, Dialect::Tsx).expect("parse");
        let signals = classify_with(&tree, &bindings).expect("classify");
        let ctx = PassContext {
            settings: &settings,
            bindings: &bindings,
            needs: NeedSet::default(),
        };
        let output = run(&tree, &signals, &ctx).expect("pass");
        let tree = engine.apply(&tree, output.edits).expect("apply");
        (tree.text().to_owned(), output.effects)
    }

    #[test]
    fn test_navigate_hook_and_call() {
        let (text, effects) = rewrite(
            "import { useNavigate } from 'react-router-dom';\n",
            "function Home() {\n  const navigate = useNavigate();\n  navigate('/home');\n  return null;\n}\n",
        );
        assert!(text.contains("const navigate = useRouter();"));
        assert!(text.contains("router.push('/home');"));
        assert!(!text.contains("navigate('/home')"));
        assert!(text.contains(&format!("/* {ROUTER_ADVISORY} */\n  router.push")));
        assert!(effects.needs.contains(Need::RouterHandle));
        assert_eq!(effects.advisories.len(), 1);
    }

    #[test]
    fn test_history_methods() {
        let (text, _) = rewrite(
            "import { useHistory } from 'react-router-dom';\n",
            "const Back = () => {\n  const history = useHistory();\n  return <button onClick={() => history.goBack()}>Back</button>;\n};\n",
        );
        assert!(text.contains("const history = useRouter();"));
        assert!(text.contains(&format!("() => /* {ROUTER_ADVISORY} */ router.back()")));
    }

    #[test]
    fn test_params_hook() {
        let (text, effects) = rewrite(
            "import { useParams as useRouteParams } from 'react-router-dom';\n",
            "function User() {\n  const { id } = useRouteParams();\n  return id;\n}\n",
        );
        assert!(text.contains("const { id } = useRouter().query;"));
        assert!(effects.advisories.is_empty());
    }

    #[test]
    fn test_params_hooks_in_directory_router() {
        let settings = ConversionSettings {
            use_directory_router: true,
            ..ConversionSettings::default()
        };
        let (text, effects) = rewrite_with(
            settings,
            "import { useParams, useSearchParams } from 'react-router-dom';\n",
            "function Post() {\n  const { slug } = useParams();\n  const [query] = useSearchParams();\n  return slug + query;\n}\n",
        );
        assert!(text.contains("const { slug } = useParams();"));
        assert!(text.contains("const [query] = useSearchParams();"));
        assert!(!text.contains("useRouter"));
        assert!(effects.needs.contains(Need::ParamsHook));
        assert!(effects.needs.contains(Need::SearchParamsHook));
        assert!(!effects.needs.contains(Need::RouterHandle));
        assert_eq!(effects.advisories.len(), 1);
        assert!(effects.advisories[0].contains("useSearchParams()"));
    }

    #[test]
    fn test_unimported_hook_is_only_flagged() {
        let source = "function A() {\n  const location = useLocation();\n  return location;\n}\n";
        let (text, effects) = rewrite("", source);
        assert_eq!(text, source);
        assert_eq!(effects.flagged, 1);
        assert!(effects.needs.is_empty());
    }

    #[test]
    fn test_router_factory() {
        let (text, _) = rewrite(
            "import { createBrowserRouter, createRoutesFromElements } from 'react-router-dom';\n",
            "const router = createBrowserRouter(createRoutesFromElements(null));\n",
        );
        assert_eq!(text, "const router = null;\n");
    }
}
