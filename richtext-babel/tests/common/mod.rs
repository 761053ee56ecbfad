//! Shared builders for the integration tests

use richtext_babel::{Element, Node, Text};

pub fn paragraph(text: &str) -> Node {
    Element::paragraph(vec![Text::new(text).into()]).into()
}

pub fn details(summary: &str, content: Vec<Node>) -> Node {
    Element::details(vec![Text::new(summary).into()], content).into()
}

/// The summary paragraph's text of a `details` node.
pub fn summary_text(node: &Node) -> String {
    node.as_element()
        .and_then(|element| element.children.first())
        .map(Node::text_content)
        .unwrap_or_default()
}
