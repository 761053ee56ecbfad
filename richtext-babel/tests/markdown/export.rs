//! Export tests (document tree → Markdown)
//!
//! Exported text must import back to the same tree, and must only ever use the attribute form
//! of the component.

use crate::common::{details, paragraph};
use richtext_babel::{
    export_html, export_markdown, import_markdown, Element, ElementKind, Node, Text,
};

fn round_trip(nodes: Vec<Node>) {
    let markdown = export_markdown(&nodes).expect("export should succeed");
    assert_eq!(import_markdown(&markdown), nodes, "exported:\n{markdown}");
}

#[test]
fn test_simple_details() {
    let nodes = vec![details("Hello", vec![paragraph("World")])];
    let markdown = export_markdown(&nodes).unwrap();
    assert!(markdown.starts_with("<Details summary=\"Hello\">"), "{markdown}");
    assert!(markdown.ends_with("</Details>"), "{markdown}");
    round_trip(nodes);
}

#[test]
fn test_summary_marks_round_trip() {
    let summary = vec![
        Text::new("Bold").bold().into(),
        Text::new(" and ").into(),
        Text::new("it").italic().into(),
    ];
    round_trip(vec![Element::details(summary, vec![paragraph("Body")]).into()]);
}

#[test]
fn test_nested_details_round_trip() {
    round_trip(vec![
        paragraph("Intro"),
        details(
            "Outer",
            vec![
                paragraph("Outer content"),
                details("Inner", vec![paragraph("Inner content")]),
            ],
        ),
        paragraph("Outro"),
    ]);
}

#[test]
fn test_block_content_round_trip() {
    let list = Element::new(
        ElementKind::BulletedList,
        vec![
            Element::new(ElementKind::ListItem, vec![paragraph("one")]).into(),
            Element::new(ElementKind::ListItem, vec![paragraph("two")]).into(),
        ],
    );
    round_trip(vec![details("List", vec![paragraph("Items:"), list.into()])]);
}

#[test]
fn test_details_in_block_quote_round_trip() {
    round_trip(vec![Element::new(
        ElementKind::Blockquote,
        vec![details("S", vec![paragraph("Body")])],
    )
    .into()]);
}

#[test]
fn test_details_in_list_item_round_trip() {
    let item = Element::new(
        ElementKind::ListItem,
        vec![paragraph("item"), details("S", vec![paragraph("Body")])],
    );
    round_trip(vec![
        Element::new(ElementKind::BulletedList, vec![item.into()]).into(),
        paragraph("After"),
    ]);
}

#[test]
fn test_empty_summary_round_trip() {
    let nodes = vec![Element::details(Vec::new(), vec![paragraph("Body")]).into()];
    let markdown = export_markdown(&nodes).unwrap();
    assert!(markdown.starts_with("<Details summary=\"\">"), "{markdown}");
    round_trip(nodes);
}

#[test]
fn test_summary_quotes_round_trip() {
    round_trip(vec![details("Say \"hi\" \\o/", vec![paragraph("x")])]);
}

#[test]
fn test_no_legacy_tags_in_output() {
    let nodes = vec![
        details("A", vec![paragraph("one")]),
        details("B", vec![details("C", vec![paragraph("two")])]),
    ];
    let markdown = export_markdown(&nodes).unwrap();
    assert!(!markdown.contains("DetailsSummary"), "{markdown}");
    assert!(!markdown.contains("<details"), "{markdown}");
    assert!(!markdown.contains("<summary"), "{markdown}");
}

#[test]
fn test_hundred_siblings_round_trip() {
    let nodes: Vec<Node> = (0..100)
        .map(|i| details(&format!("S{i}"), vec![paragraph(&format!("B{i}"))]))
        .collect();
    round_trip(nodes);
}

#[test]
fn test_export_html() {
    let nodes = vec![details("Title", vec![paragraph("Body")])];
    let html = export_html(&nodes).unwrap();
    assert_eq!(html, "<details><summary>Title</summary>\n\nBody\n\n</details>");
}

#[test]
fn test_export_html_nested() {
    let nodes = vec![details("Outer", vec![details("Inner", vec![paragraph("Deep")])])];
    let html = export_html(&nodes).unwrap();
    assert_eq!(
        html,
        "<details><summary>Outer</summary>\n\n<details><summary>Inner</summary>\n\nDeep\n\n</details>\n\n</details>"
    );
}
