//! The parsed form of one script file.
//!
//! A [`SyntaxTree`] owns the text it was parsed from together with the
//! tree-sitter tree, so node byte ranges can always be resolved. Trees are
//! never shared across files; applying edits produces a new tree (see
//! [`SyntaxEngine::apply`](crate::SyntaxEngine::apply)).

use rn_core::{SourceLocation, Span};
use tree_sitter::{Node, Tree, TreeCursor};

use crate::engine::Dialect;

/// A parsed script file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) text: String,
    pub(crate) tree: Tree,
    pub(crate) dialect: Dialect,
}

impl SyntaxTree {
    /// Returns the source text the tree was parsed from.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the dialect the text was parsed with.
    #[inline]
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the root (`program`) node.
    #[inline]
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Returns the underlying tree-sitter tree.
    #[inline]
    #[must_use]
    pub const fn raw(&self) -> &Tree {
        &self.tree
    }

    /// Returns the text a node covers.
    ///
    /// Returns an empty string if the node's range does not fall on
    /// character boundaries of this tree's text.
    #[must_use]
    pub fn node_text(&self, node: Node<'_>) -> &str {
        self.text.get(node.byte_range()).unwrap_or_default()
    }

    /// Returns the contents of a string literal node without its quotes.
    ///
    /// Template literals without substitutions are accepted as well; any
    /// other node yields `None`.
    #[must_use]
    pub fn string_value(&self, node: Node<'_>) -> Option<&str> {
        match node.kind() {
            "string" => {
                let raw = self.node_text(node);
                raw.get(1..raw.len().checked_sub(1)?)
            }
            "template_string" if !has_child_kind(node, "template_substitution") => {
                let raw = self.node_text(node);
                raw.get(1..raw.len().checked_sub(1)?)
            }
            _ => None,
        }
    }

    /// Iterates every node of the tree in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(self.root())
    }

    /// Iterates the named nodes of the tree in document order.
    pub fn named_descendants(&self) -> impl Iterator<Item = Node<'_>> {
        self.descendants().filter(Node::is_named)
    }

    /// Returns `true` if the tree contains any markup node.
    #[must_use]
    pub fn has_markup(&self) -> bool {
        self.descendants().any(|n| n.kind().starts_with("jsx_"))
    }

    /// Returns the first error or missing node, if the tree has one.
    #[must_use]
    pub fn first_error(&self) -> Option<Node<'_>> {
        if !self.root().has_error() {
            return None;
        }
        self.descendants()
            .find(|n| n.is_error() || n.is_missing())
            .or(Some(self.root()))
    }

    /// Returns the byte span of a node.
    #[inline]
    #[must_use]
    pub fn span(node: Node<'_>) -> Span {
        Span::new(node.start_byte(), node.end_byte())
    }

    /// Returns the 1-based location of a node's start.
    #[must_use]
    pub fn location(node: Node<'_>) -> SourceLocation {
        let start = node.start_position();
        SourceLocation::new(
            to_u32(start.row) + 1,
            to_u32(start.column) + 1,
            to_u32(node.start_byte()),
        )
    }

    /// Returns the byte offset of the start of the line containing `offset`.
    #[must_use]
    pub fn line_start(&self, offset: usize) -> usize {
        self.text
            .get(..offset)
            .and_then(|before| before.rfind('\n'))
            .map_or(0, |i| i + 1)
    }

    /// Returns the leading whitespace of the line containing `offset`.
    #[must_use]
    pub fn indentation_at(&self, offset: usize) -> &str {
        let start = self.line_start(offset);
        let line = self.text.get(start..).unwrap_or_default();
        let width = line
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        line.get(..width).unwrap_or_default()
    }
}

/// Returns `true` if any direct child of `node` has the given kind.
#[must_use]
pub fn has_child_kind(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == kind)
}

/// Returns the first direct child of `node` with the given kind.
#[must_use]
pub fn child_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

/// Returns the nearest ancestor of `node` (excluding itself) with one of the
/// given kinds.
#[must_use]
pub fn ancestor_of_kind<'tree>(node: Node<'tree>, kinds: &[&str]) -> Option<Node<'tree>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if kinds.contains(&n.kind()) {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'tree> {
    cursor: TreeCursor<'tree>,
    root_id: usize,
    done: bool,
}

impl<'tree> Descendants<'tree> {
    /// Starts a walk rooted at `node` (the node itself is yielded first).
    #[must_use]
    pub fn new(node: Node<'tree>) -> Self {
        Self {
            cursor: node.walk(),
            root_id: node.id(),
            done: false,
        }
    }
}

impl<'tree> Iterator for Descendants<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Node<'tree>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if !self.cursor.goto_first_child() {
            loop {
                if self.cursor.node().id() == self.root_id {
                    self.done = true;
                    break;
                }
                if self.cursor.goto_next_sibling() {
                    break;
                }
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }
        Some(node)
    }
}

/// Source files are far below 4 GiB, so offsets fit in `u32`.
#[allow(clippy::cast_possible_truncation)]
const fn to_u32(value: usize) -> u32 {
    value as u32
}
