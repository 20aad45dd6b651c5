//! Helpers for reading markup nodes.
//!
//! Markup elements come in two shapes: `jsx_element` (opening tag,
//! children, closing tag) and `jsx_self_closing_element`. These helpers
//! hide the difference so callers can ask for an element's name, tags and
//! attributes uniformly.

use tree_sitter::Node;

use crate::tree::{SyntaxTree, child_of_kind};

/// Node kinds that are markup elements.
pub const ELEMENT_KINDS: &[&str] = &["jsx_element", "jsx_self_closing_element"];

/// Node kinds whose named children are markup children (text, elements,
/// `{expressions}`).
pub const CHILD_CONTAINER_KINDS: &[&str] = &["jsx_element", "jsx_fragment"];

/// Returns `true` if the node is a markup element.
#[inline]
#[must_use]
pub fn is_element(node: Node<'_>) -> bool {
    ELEMENT_KINDS.contains(&node.kind())
}

/// Returns the node holding an element's name and attributes.
///
/// For a self-closing element that is the element itself.
#[must_use]
pub fn opening_tag(element: Node<'_>) -> Option<Node<'_>> {
    match element.kind() {
        "jsx_self_closing_element" => Some(element),
        "jsx_element" => element
            .child_by_field_name("open_tag")
            .or_else(|| child_of_kind(element, "jsx_opening_element")),
        _ => None,
    }
}

/// Returns an element's closing tag, if it has one.
#[must_use]
pub fn closing_tag(element: Node<'_>) -> Option<Node<'_>> {
    if element.kind() != "jsx_element" {
        return None;
    }
    element
        .child_by_field_name("close_tag")
        .or_else(|| child_of_kind(element, "jsx_closing_element"))
}

/// Returns the name node of a tag (opening, closing or self-closing).
///
/// Fragments have no name.
#[must_use]
pub fn tag_name(tag: Node<'_>) -> Option<Node<'_>> {
    tag.child_by_field_name("name").or_else(|| {
        let mut cursor = tag.walk();
        tag.named_children(&mut cursor).find(|c| {
            matches!(
                c.kind(),
                "identifier" | "member_expression" | "jsx_namespace_name" | "nested_identifier"
            )
        })
    })
}

/// Returns an element's name as written (`Link`, `Nav.Item`, `img`).
#[must_use]
pub fn element_name<'a>(tree: &'a SyntaxTree, element: Node<'_>) -> Option<&'a str> {
    let tag = opening_tag(element)?;
    tag_name(tag).map(|name| tree.node_text(name))
}

/// Returns the attribute nodes of an element in source order.
#[must_use]
pub fn attributes(element: Node<'_>) -> Vec<Node<'_>> {
    let Some(tag) = opening_tag(element) else {
        return Vec::new();
    };
    let mut cursor = tag.walk();
    tag.named_children(&mut cursor)
        .filter(|c| c.kind() == "jsx_attribute")
        .collect()
}

/// Returns the name node of a `jsx_attribute`.
#[must_use]
pub fn attribute_name(attribute: Node<'_>) -> Option<Node<'_>> {
    attribute.named_child(0)
}

/// Returns the value node of a `jsx_attribute` (`"..."` or `{...}`), or
/// `None` for a bare boolean attribute.
#[must_use]
pub fn attribute_value(attribute: Node<'_>) -> Option<Node<'_>> {
    if attribute.named_child_count() < 2 {
        return None;
    }
    attribute.named_child(attribute.named_child_count() - 1)
}

/// Finds an attribute of `element` by name.
#[must_use]
pub fn find_attribute<'tree>(
    tree: &SyntaxTree,
    element: Node<'tree>,
    name: &str,
) -> Option<Node<'tree>> {
    attributes(element).into_iter().find(|attribute| {
        attribute_name(*attribute).is_some_and(|n| tree.node_text(n) == name)
    })
}

/// Returns the expression inside a `{...}` attribute value or child.
#[must_use]
pub fn expression_of(container: Node<'_>) -> Option<Node<'_>> {
    if container.kind() != "jsx_expression" {
        return None;
    }
    container.named_child(0)
}

/// Returns `true` if `node` sits directly among markup children, where a
/// comment must be written as `{/* ... */}`.
#[must_use]
pub fn is_markup_child(node: Node<'_>) -> bool {
    node.parent()
        .is_some_and(|p| CHILD_CONTAINER_KINDS.contains(&p.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dialect, SyntaxEngine};

    fn parse(text: &str) -> SyntaxTree {
        SyntaxEngine::new()
            .expect("engine")
            .parse(text, Dialect::Tsx)
            .expect("parse")
    }

    fn elements(tree: &SyntaxTree) -> Vec<Node<'_>> {
        tree.descendants().filter(|n| is_element(*n)).collect()
    }

    #[test]
    fn test_names_and_tags() {
        let tree = parse(r#"const a = <nav><Link to="/about">About</Link><img src="x.png" /></nav>;"#);
        let found = elements(&tree);
        let names: Vec<_> = found
            .iter()
            .filter_map(|e| element_name(&tree, *e))
            .collect();
        assert_eq!(names, vec!["nav", "Link", "img"]);

        let link = found[1];
        let close = closing_tag(link).expect("closing tag");
        assert_eq!(tree.node_text(close), "</Link>");
        assert!(closing_tag(found[2]).is_none());
        assert!(is_markup_child(link));
        assert!(!is_markup_child(found[0]));
    }

    #[test]
    fn test_attributes() {
        let tree = parse(
            r#"const a = <NavLink to="/x" exact activeClassName="on" className={({ isActive }) => isActive ? "a" : ""}>X</NavLink>;"#,
        );
        let element = elements(&tree)[0];
        let names: Vec<_> = attributes(element)
            .into_iter()
            .filter_map(attribute_name)
            .map(|n| tree.node_text(n))
            .collect();
        assert_eq!(names, vec!["to", "exact", "activeClassName", "className"]);

        let exact = find_attribute(&tree, element, "exact").expect("exact");
        assert!(attribute_value(exact).is_none());

        let class_name = find_attribute(&tree, element, "className").expect("className");
        let value = attribute_value(class_name).expect("value");
        assert_eq!(value.kind(), "jsx_expression");
        assert_eq!(
            expression_of(value).map(|e| e.kind()),
            Some("arrow_function")
        );

        let to = find_attribute(&tree, element, "to").expect("to");
        let value = attribute_value(to).expect("value");
        assert_eq!(tree.string_value(value), Some("/x"));
    }
}
