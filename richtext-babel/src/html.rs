//! HTML fragment parsing and element-to-string conversion
//!
//! Raw `<details>` blocks found in user text are parsed with html5ever into an rcdom tree, walked,
//! and written back out as markup. The writer is deliberately lossless rather than canonical: the
//! text it emits is Markdown source, so text nodes are written as-is except where a character
//! would otherwise start a tag or an entity.

use crate::error::BabelError;
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Deepest element nesting the writer will follow.
const MAX_ELEMENT_DEPTH: usize = 512;

/// Elements that never have content and are always written self-closed.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Hook called for every element before it is written.
///
/// Returning `Ok(true)` means the hook wrote the element itself and the writer skips it.
pub type Visit<'a> = dyn FnMut(&Handle, &mut String) -> Result<bool, BabelError> + 'a;

/// A parsed HTML fragment.
///
/// rcdom empties a node's children when the node is dropped, even if other handles still point
/// at them. Handles from [`Fragment::nodes`] are only complete while the fragment is alive.
pub struct Fragment {
    /// Owns the tree the body handle points into
    _dom: RcDom,
    body: Handle,
}

impl Fragment {
    pub fn parse(source: &str) -> Result<Self, BabelError> {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(source);
        let body = find_element(&dom.document, "body")
            .ok_or_else(|| BabelError::ParseError("HTML fragment produced no body".to_string()))?;
        Ok(Self { _dom: dom, body })
    }

    /// Top-level nodes of the fragment, in document order.
    pub fn nodes(&self) -> Vec<Handle> {
        self.body.children.borrow().clone()
    }
}

/// Local name of an element node.
pub fn element_name(handle: &Handle) -> Option<&str> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Descendant text of a node with all markup dropped.
pub fn text_content(handle: &Handle) -> String {
    let mut out = String::new();
    collect_text(handle, &mut out);
    out
}

fn collect_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        _ => {
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}

/// Write a node back to markup.
pub fn to_markup(handle: &Handle) -> Result<String, BabelError> {
    let mut out = String::new();
    write_markup(handle, &mut out, &mut |_, _| Ok(false))?;
    Ok(out)
}

/// Write a node back to markup, letting `visit` take over any element.
///
/// Unrecognized tags round-trip by name with their attributes; an element without children is
/// self-closed.
pub fn write_markup(handle: &Handle, out: &mut String, visit: &mut Visit<'_>) -> Result<(), BabelError> {
    write_node(handle, out, visit, 0)
}

fn write_node(
    handle: &Handle,
    out: &mut String,
    visit: &mut Visit<'_>,
    depth: usize,
) -> Result<(), BabelError> {
    match &handle.data {
        NodeData::Text { contents } => push_text(out, &contents.borrow()),
        NodeData::Comment { contents } => {
            out.push_str("<!--");
            out.push_str(contents);
            out.push_str("-->");
        }
        NodeData::Element { name, attrs, .. } => {
            if depth >= MAX_ELEMENT_DEPTH {
                return Err(BabelError::TooDeep(MAX_ELEMENT_DEPTH));
            }
            if visit(handle, out)? {
                return Ok(());
            }

            let tag = name.local.as_ref();
            out.push('<');
            out.push_str(tag);
            for attr in attrs.borrow().iter() {
                out.push(' ');
                out.push_str(attr.name.local.as_ref());
                out.push_str("=\"");
                push_attribute_value(out, &attr.value);
                out.push('"');
            }

            let children = handle.children.borrow();
            if children.is_empty() || VOID_ELEMENTS.contains(&tag) {
                out.push_str(" />");
                return Ok(());
            }
            out.push('>');
            for child in children.iter() {
                write_node(child, out, visit, depth + 1)?;
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        // Doctypes and processing instructions have no place in a fragment
        _ => {
            for child in handle.children.borrow().iter() {
                write_node(child, out, visit, depth)?;
            }
        }
    }
    Ok(())
}

fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if element_name(handle) == Some(tag) {
        return Some(handle.clone());
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

/// Text is Markdown source: keep it verbatim unless a character would be read as markup.
fn push_text(out: &mut String, text: &str) {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match c {
            '<' if next.is_some_and(|n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?')) => {
                out.push_str("&lt;")
            }
            '&' if next.is_some_and(|n| n.is_ascii_alphanumeric() || n == '#') => {
                out.push_str("&amp;")
            }
            _ => out.push(c),
        }
    }
}

fn push_attribute_value(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(source: &str) -> String {
        let fragment = Fragment::parse(source).unwrap();
        fragment
            .nodes()
            .iter()
            .map(|node| to_markup(node).unwrap())
            .collect()
    }

    #[test]
    fn test_fragment_children_in_order() {
        let fragment = Fragment::parse("<details><summary>Hi</summary>Body</details>tail").unwrap();
        let nodes = fragment.nodes();
        assert_eq!(nodes.len(), 2);
        assert_eq!(element_name(&nodes[0]), Some("details"));
        assert_eq!(text_content(&nodes[1]), "tail");
    }

    #[test]
    fn test_nodes_keep_their_children() {
        let fragment = Fragment::parse("<details><summary>Hi</summary>Body</details>").unwrap();
        let nodes = fragment.nodes();
        assert_eq!(nodes[0].children.borrow().len(), 2);
        assert_eq!(text_content(&nodes[0]), "HiBody");
        assert_eq!(
            to_markup(&nodes[0]).unwrap(),
            "<details><summary>Hi</summary>Body</details>"
        );
    }

    #[test]
    fn test_text_content_ignores_tags() {
        let fragment = Fragment::parse("<summary>A <b>bold</b> <i>move</i></summary>").unwrap();
        assert_eq!(text_content(&fragment.nodes()[0]), "A bold move");
    }

    #[test]
    fn test_unknown_tags_round_trip() {
        assert_eq!(
            roundtrip(r#"<custom-tag data-x="1">text</custom-tag>"#),
            r#"<custom-tag data-x="1">text</custom-tag>"#
        );
    }

    #[test]
    fn test_childless_elements_self_close() {
        assert_eq!(roundtrip(r#"<img src="a.png">"#), r#"<img src="a.png" />"#);
        assert_eq!(roundtrip("<span></span>"), "<span />");
    }

    #[test]
    fn test_markdown_text_is_kept() {
        assert_eq!(roundtrip("**bold** a < b"), "**bold** a < b");
        assert_eq!(roundtrip("&lt;div&gt;"), "&lt;div>");
    }

    #[test]
    fn test_visit_can_replace_elements() {
        let fragment = Fragment::parse("<p>a<em>b</em></p>").unwrap();
        let nodes = fragment.nodes();
        let mut out = String::new();
        write_markup(&nodes[0], &mut out, &mut |handle, out| {
            if element_name(handle) == Some("em") {
                out.push_str("*b*");
                return Ok(true);
            }
            Ok(false)
        })
        .unwrap();
        assert_eq!(out, "<p>a*b*</p>");
    }

    #[test]
    fn test_runaway_depth_is_an_error() {
        let source = format!("{}x{}", "<span>".repeat(600), "</span>".repeat(600));
        let fragment = Fragment::parse(&source).unwrap();
        let nodes = fragment.nodes();
        assert_eq!(to_markup(&nodes[0]), Err(BabelError::TooDeep(MAX_ELEMENT_DEPTH)));
    }
}
