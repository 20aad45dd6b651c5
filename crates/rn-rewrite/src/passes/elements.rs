//! Pass 3: markup elements.
//!
//! - Links: renamed to `Link`, `to` becomes `href`, active-state attributes
//!   are flagged with a comment
//! - Head managers: `Helmet` becomes `Head`; bare `<title>` is wrapped
//! - Routing containers: provider-like containers are unwrapped, route
//!   outlets become the layout's `children`
//! - Raw `<img>`: flagged with a comment, never rewritten
//!
//! Plain anchors to in-app paths are only noted.

use rn_core::{ConstructKind, ElementSignal, FileSignals, FxHashMap, FxHashSet, Span};
use rn_syntax::{Node, SyntaxTree, TextEdit, ancestor_of_kind, jsx};

use super::{
    EditSet, Effects, FUNCTION_KINDS, Need, PassContext, PassOutput, comment_before,
    has_comment_before, line_span,
};
use crate::error::RewriteError;
use crate::table::{self, ContainerAction};

/// Comment placed before raw image elements.
pub const IMAGE_ADVISORY: &str =
    "rr-next: consider next/image here; it needs explicit width and height";

/// Prefix of the comment placed before links with active-state attributes.
pub const ACTIVE_STATE_ADVISORY: &str = "rr-next: next/link has no active state; review";

/// Runs the pass.
pub fn run(
    tree: &SyntaxTree,
    signals: &FileSignals,
    ctx: &PassContext<'_>,
) -> Result<PassOutput, RewriteError> {
    let nodes: FxHashMap<Span, Node<'_>> = tree
        .descendants()
        .filter(|n| jsx::is_element(*n))
        .map(|n| (SyntaxTree::span(n), n))
        .collect();

    let mut pass = ElementPass {
        tree,
        ctx,
        nodes,
        edits: EditSet::default(),
        effects: Effects::default(),
        replaced: Vec::new(),
        outlet_parents: FxHashSet::default(),
        rewritten_params: FxHashSet::default(),
    };

    pass.containers(&signals.containers);
    pass.links(&signals.links);
    pass.head_elements(&signals.head_elements);
    pass.images(&signals.images);

    if !signals.unbound_images.is_empty() {
        pass.effects.needs.insert(Need::ImageComponent);
    }
    if !signals.internal_anchors.is_empty() {
        pass.effects.note(format!(
            "{} plain anchor(s) point at in-app paths; next/link gives client-side navigation",
            signals.internal_anchors.len()
        ));
    }

    Ok(PassOutput::from_parts(pass.edits, pass.effects))
}

struct ElementPass<'t, 'c> {
    tree: &'t SyntaxTree,
    ctx: &'c PassContext<'c>,
    nodes: FxHashMap<Span, Node<'t>>,
    edits: EditSet,
    effects: Effects,
    /// Regions replaced wholesale; nothing inside them is edited.
    replaced: Vec<Span>,
    /// Parents that already received a `{children}` placeholder.
    outlet_parents: FxHashSet<usize>,
    /// Functions whose parameters already expose `children`.
    rewritten_params: FxHashSet<usize>,
}

impl<'t> ElementPass<'t, '_> {
    fn node(&self, signal: &ElementSignal) -> Option<Node<'t>> {
        if self.replaced.iter().any(|r| r.contains(&signal.span)) {
            return None;
        }
        self.nodes.get(&signal.span).copied()
    }

    fn rename(&mut self, element: Node<'t>, name: &str) {
        let tags = [jsx::opening_tag(element), jsx::closing_tag(element)];
        for tag in tags.into_iter().flatten() {
            if let Some(tag_name) = jsx::tag_name(tag) {
                self.edits
                    .push(TextEdit::replace(SyntaxTree::span(tag_name), name));
            }
        }
    }

    fn containers(&mut self, containers: &[ElementSignal]) {
        let mut ordered: Vec<&ElementSignal> = containers.iter().collect();
        ordered.sort_by_key(|c| (c.span.start, std::cmp::Reverse(c.span.end)));

        for signal in ordered {
            let Some(element) = self.node(signal) else {
                continue;
            };
            let exported = signal.imported.as_deref().unwrap_or(&signal.name);
            match table::container_action(exported) {
                ContainerAction::Unwrap => self.unwrap(element),
                ContainerAction::Children => self.outlet(element),
            }
        }
    }

    /// Drops a container's tags and keeps its children.
    fn unwrap(&mut self, element: Node<'t>) {
        let markup = jsx::is_markup_child(element);
        let open = jsx::opening_tag(element);
        let close = jsx::closing_tag(element);

        match (open, close) {
            (Some(open), Some(close)) if markup => {
                self.edits
                    .push(TextEdit::delete(line_span(self.tree, SyntaxTree::span(open))));
                self.edits
                    .push(TextEdit::delete(line_span(self.tree, SyntaxTree::span(close))));
            }
            (Some(open), Some(close)) => {
                self.edits.push(TextEdit::replace(SyntaxTree::span(open), "<>"));
                self.edits.push(TextEdit::replace(SyntaxTree::span(close), "</>"));
            }
            _ => {
                let span = SyntaxTree::span(element);
                let edit = if markup {
                    TextEdit::delete(line_span(self.tree, span))
                } else {
                    TextEdit::replace(span, "null")
                };
                if self.edits.push(edit) {
                    self.replaced.push(span);
                }
            }
        }
    }

    /// Replaces an outlet-like container with the layout's children.
    ///
    /// Only the first outlet among siblings renders the children; later
    /// ones are removed.
    fn outlet(&mut self, element: Node<'t>) {
        let span = SyntaxTree::span(element);
        let markup = jsx::is_markup_child(element);
        let first = element
            .parent()
            .is_none_or(|p| self.outlet_parents.insert(p.id()));

        let edit = if markup && !first {
            TextEdit::delete(line_span(self.tree, span))
        } else {
            let children = self.children_expression(element);
            if markup {
                TextEdit::replace(span, format!("{{{children}}}"))
            } else {
                TextEdit::replace(span, format!("<>{{{children}}}</>"))
            }
        };
        if self.edits.push(edit) {
            self.replaced.push(span);
        }
    }

    /// Returns the expression holding the enclosing component's children,
    /// exposing it through the parameter list where needed.
    fn children_expression(&mut self, element: Node<'t>) -> String {
        let Some(function) = ancestor_of_kind(element, FUNCTION_KINDS) else {
            self.effects.advise(format!(
                "{}: routing outlet outside a component; `children` must be provided by hand",
                SyntaxTree::location(element)
            ));
            return "children".to_owned();
        };

        if let Some(parameter) = function.child_by_field_name("parameter") {
            return format!("{}.children", self.tree.node_text(parameter));
        }
        let Some(parameters) = function.child_by_field_name("parameters") else {
            return "children".to_owned();
        };

        let first = parameters.named_child(0).map(|p| {
            if matches!(p.kind(), "required_parameter" | "optional_parameter") {
                p.child_by_field_name("pattern").unwrap_or(p)
            } else {
                p
            }
        });

        match first {
            None => {
                if self.rewritten_params.insert(function.id()) {
                    self.edits.push(TextEdit::replace(
                        SyntaxTree::span(parameters),
                        "({ children })",
                    ));
                }
                "children".to_owned()
            }
            Some(pattern) if pattern.kind() == "identifier" => {
                format!("{}.children", self.tree.node_text(pattern))
            }
            Some(pattern) if pattern.kind() == "object_pattern" => {
                if !binds_children(self.tree, pattern) && self.rewritten_params.insert(function.id())
                {
                    self.edits
                        .push(TextEdit::insert(pattern.start_byte() + 1, " children,"));
                }
                "children".to_owned()
            }
            Some(pattern) => {
                self.effects.advise(format!(
                    "{}: cannot add `children` to the parameters of this component",
                    SyntaxTree::location(pattern)
                ));
                "children".to_owned()
            }
        }
    }

    fn links(&mut self, links: &[ElementSignal]) {
        for signal in links {
            let Some(element) = self.node(signal) else {
                continue;
            };
            if signal.name != "Link" {
                self.rename(element, "Link");
            }
            if let Some(name) = jsx::find_attribute(self.tree, element, "to")
                .and_then(jsx::attribute_name)
            {
                self.edits
                    .push(TextEdit::replace(SyntaxTree::span(name), "href"));
            }
            if !signal.flagged_attributes.is_empty() {
                let text = format!(
                    "{ACTIVE_STATE_ADVISORY} {}",
                    signal.flagged_attributes.join(", ")
                );
                self.edits.push(comment_before(self.tree, element, &text));
                self.effects.flagged += signal.flagged_attributes.len();
                self.effects.advise(format!(
                    "{}: {} has active-state attributes ({}) with no next/link equivalent",
                    signal.location,
                    signal.imported.as_deref().unwrap_or(&signal.name),
                    signal.flagged_attributes.join(", ")
                ));
            }
            self.effects.needs.insert(Need::LinkComponent);
        }
    }

    fn head_elements(&mut self, heads: &[ElementSignal]) {
        for signal in heads {
            let Some(element) = self.node(signal) else {
                continue;
            };
            if signal.imported.is_some() {
                self.rename(element, "Head");
                self.effects.needs.insert(Need::HeadWrapper);
                continue;
            }
            if self.inside_head_or_graphic(element) {
                continue;
            }
            let span = SyntaxTree::span(element);
            if self.edits.push(TextEdit::insert(span.start, "<Head>")) {
                self.edits.push(TextEdit::insert(span.end, "</Head>"));
                self.effects.needs.insert(Need::HeadWrapper);
                if self.ctx.settings.use_directory_router {
                    self.effects.advise(format!(
                        "{}: the app directory prefers a `metadata` export over <Head>",
                        signal.location
                    ));
                }
            }
        }
    }

    /// Returns `true` for a `<title>` already inside a head wrapper or
    /// inside an inline graphic, where it means something else.
    fn inside_head_or_graphic(&self, element: Node<'t>) -> bool {
        let mut current = element.parent();
        while let Some(node) = current {
            if jsx::is_element(node) {
                if let Some(name) = jsx::element_name(self.tree, node) {
                    if name == "Head"
                        || name == "svg"
                        || self.ctx.bindings.kind_of(name) == Some(ConstructKind::Head)
                    {
                        return true;
                    }
                }
            }
            current = node.parent();
        }
        false
    }

    fn images(&mut self, images: &[ElementSignal]) {
        for signal in images {
            let Some(element) = self.node(signal) else {
                continue;
            };
            if has_comment_before(self.tree, element.start_byte(), IMAGE_ADVISORY) {
                continue;
            }
            if self
                .edits
                .push(comment_before(self.tree, element, IMAGE_ADVISORY))
            {
                self.effects.flagged += 1;
            }
        }
    }
}

fn binds_children(tree: &SyntaxTree, pattern: Node<'_>) -> bool {
    let mut cursor = pattern.walk();
    pattern.named_children(&mut cursor).any(|property| {
        let key = match property.kind() {
            "pair_pattern" => property.child_by_field_name("key"),
            "object_assignment_pattern" => property.child_by_field_name("left"),
            _ => Some(property),
        };
        key.is_some_and(|k| tree.node_text(k) == "children")
    })
}
