//! Import tests (raw text → document tree)
//!
//! Raw text goes through the normalizer first, so both HTML `<details>` and every stored
//! component encoding must come out as the same `details` node shape.

use crate::common::{details, paragraph, summary_text};
use richtext_babel::{import_markdown, Element, ElementKind, Node, Text};

#[test]
fn test_plain_markdown() {
    let nodes = import_markdown("Just a paragraph.\n");
    assert_eq!(nodes, vec![paragraph("Just a paragraph.")]);
}

#[test]
fn test_html_details() {
    let nodes = import_markdown("<details><summary>Hello</summary>World</details>");
    assert_eq!(nodes, vec![details("Hello", vec![paragraph("World")])]);
}

#[test]
fn test_component_with_attribute() {
    let nodes = import_markdown("<Details summary=\"Hello\">\n\nWorld\n\n</Details>\n");
    assert_eq!(nodes, vec![details("Hello", vec![paragraph("World")])]);
}

#[test]
fn test_surrounding_paragraphs() {
    let nodes = import_markdown("Before\n\n<details><summary>S</summary>C</details>\n\nAfter");
    assert_eq!(
        nodes,
        vec![
            paragraph("Before"),
            details("S", vec![paragraph("C")]),
            paragraph("After"),
        ]
    );
}

#[test]
fn test_nested_html_details() {
    let source = "<details><summary>Outer</summary><details><summary>Inner</summary>Deep</details></details>";
    let nodes = import_markdown(source);
    assert_eq!(
        nodes,
        vec![details(
            "Outer",
            vec![details("Inner", vec![paragraph("Deep")])]
        )]
    );
}

#[test]
fn test_legacy_single_child_is_content() {
    let nodes = import_markdown("<Details summary=\"X\">\n\nY\n\n</Details>");
    assert_eq!(nodes, vec![details("X", vec![paragraph("Y")])]);
}

#[test]
fn test_legacy_marker_child() {
    let nodes =
        import_markdown("<Details>\n\n<DetailsSummary>Title</DetailsSummary>\n\nBody\n\n</Details>");
    assert_eq!(nodes, vec![details("Title", vec![paragraph("Body")])]);
}

#[test]
fn test_marker_beats_attribute() {
    let nodes = import_markdown(
        "<Details summary=\"Stale\">\n\n<DetailsSummary>Fresh</DetailsSummary>\n\nBody\n\n</Details>",
    );
    assert_eq!(nodes, vec![details("Fresh", vec![paragraph("Body")])]);
}

#[test]
fn test_summary_keeps_bold_and_italic() {
    let nodes = import_markdown("<Details summary=\"**Bold** and *it*\">\n\nx\n\n</Details>");
    let summary = Element::paragraph(vec![
        Text::new("Bold").bold().into(),
        Text::new(" and ").into(),
        Text::new("it").italic().into(),
    ]);
    assert_eq!(
        nodes,
        vec![Node::from(Element::new(
            ElementKind::Details,
            vec![summary.into(), paragraph("x")]
        ))]
    );
}

#[test]
fn test_empty_summary() {
    let nodes = import_markdown("<details><summary></summary>Content</details>");
    assert_eq!(nodes, vec![details("", vec![paragraph("Content")])]);
}

#[test]
fn test_unclosed_block_keeps_its_text() {
    let nodes = import_markdown("<details><summary>Test</summary>Content");
    assert_eq!(nodes, vec![paragraph("Test"), paragraph("Content")]);
}

#[test]
fn test_html_summary_is_literal_text() {
    let nodes = import_markdown("<details><summary>2*3*4 and __init__</summary>x</details>");
    assert_eq!(nodes, vec![details("2*3*4 and __init__", vec![paragraph("x")])]);

    let nodes = import_markdown("<details><summary># [not](a link) `code`</summary>x</details>");
    assert_eq!(nodes, vec![details("# [not](a link) `code`", vec![paragraph("x")])]);
}

#[test]
fn test_unclosed_component_is_text() {
    let nodes = import_markdown("<Details summary=\"x\">\n\nno close\n");
    assert!(nodes.iter().all(|node| node
        .as_element()
        .map_or(true, |element| element.kind != ElementKind::Details)));
    assert!(nodes
        .iter()
        .any(|node| node.text_content().contains("no close")));
}

#[test]
fn test_component_inside_code_fence_is_code() {
    let nodes = import_markdown("```\n<Details summary=\"x\">\n</Details>\n```\n");
    assert_eq!(nodes.len(), 1);
    let code = nodes[0].as_element().unwrap();
    assert_eq!(code.kind, ElementKind::CodeBlock);
    assert!(code.text_content().contains("<Details summary=\"x\">"));
}

#[test]
fn test_hundred_sibling_blocks() {
    let source: String = (0..100)
        .map(|i| format!("<details><summary>S{i}</summary>B{i}</details>\n"))
        .collect();
    let nodes = import_markdown(&source);
    assert_eq!(nodes.len(), 100);
    for (i, node) in nodes.iter().enumerate() {
        assert_eq!(node, &details(&format!("S{i}"), vec![paragraph(&format!("B{i}"))]));
        assert_eq!(summary_text(node), format!("S{i}"));
    }
}
