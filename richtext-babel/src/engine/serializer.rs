//! Markdown serialization (document tree → comrak AST → Markdown)
//!
//! The tree is rebuilt as a comrak AST and formatted with `format_commonmark`, so escaping and
//! list/table layout are comrak's. Elements with a registered [`ComponentRule`] are rendered by the
//! rule and inserted as raw HTML blocks holding the component text.
//!
//! Text flags map to emphasis nodes where Markdown has syntax for them. Underline and colors have
//! none and are written as `<u>` and `<span style="…">` raw inline HTML, which the parser reads
//! back into the same flags.
//!
//! [`ComponentRule`]: super::ComponentRule

use super::MarkdownEngine;
use crate::doc::{Element, ElementKind, Node, Text};
use crate::error::BabelError;
use comrak::nodes::{
    Ast, AstNode, ListDelimType, ListType, NodeCode, NodeCodeBlock, NodeHeading, NodeHtmlBlock,
    NodeLink, NodeList, NodeTable, NodeValue, TableAlignment,
};
use comrak::{format_commonmark, Arena, ComrakOptions};
use std::cell::RefCell;

/// Serialize block nodes.
pub fn serialize_blocks(nodes: &[Node], engine: &MarkdownEngine) -> Result<String, BabelError> {
    let arena = Arena::new();
    let root = new_node(&arena, NodeValue::Document);
    append_blocks(&arena, root, nodes, engine)?;
    format(root, engine.comrak())
}

/// Serialize inline nodes as one paragraph. Line breaks become spaces.
pub fn serialize_inlines(nodes: &[Node], engine: &MarkdownEngine) -> Result<String, BabelError> {
    let arena = Arena::new();
    let root = new_node(&arena, NodeValue::Document);
    let paragraph = new_node(&arena, NodeValue::Paragraph);
    root.append(paragraph);
    for node in nodes {
        append_inline(&arena, paragraph, &single_line(node));
    }
    format(root, engine.comrak())
}

fn format<'a>(root: &'a AstNode<'a>, options: &ComrakOptions) -> Result<String, BabelError> {
    let mut output = Vec::new();
    format_commonmark(root, options, &mut output).map_err(|e| {
        BabelError::SerializationError(format!("Comrak serialization failed: {e}"))
    })?;
    String::from_utf8(output)
        .map_err(|e| BabelError::SerializationError(format!("UTF-8 conversion failed: {e}")))
}

fn new_node<'a>(arena: &'a Arena<AstNode<'a>>, value: NodeValue) -> &'a AstNode<'a> {
    arena.alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
}

fn single_line(node: &Node) -> Node {
    match node {
        Node::Text(text) => {
            let mut text = text.clone();
            text.text = text.text.replace(['\r', '\n'], " ");
            Node::Text(text)
        }
        Node::Element(element) => {
            let mut element = element.clone();
            element.children = element.children.iter().map(single_line).collect();
            Node::Element(element)
        }
    }
}

/// Append a sequence of siblings, gathering runs of inline nodes into paragraphs.
fn append_blocks<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    nodes: &[Node],
    engine: &MarkdownEngine,
) -> Result<(), BabelError> {
    let mut paragraph: Option<&'a AstNode<'a>> = None;
    for node in nodes {
        if node.is_inline() {
            let target = *paragraph.get_or_insert_with(|| {
                let created = new_node(arena, NodeValue::Paragraph);
                parent.append(created);
                created
            });
            append_inline(arena, target, node);
        } else {
            paragraph = None;
            if let Node::Element(element) = node {
                append_block(arena, parent, element, engine)?;
            }
        }
    }
    Ok(())
}

fn append_block<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    element: &Element,
    engine: &MarkdownEngine,
) -> Result<(), BabelError> {
    if let Some(rule) = engine.rule_for_element(&element.kind) {
        let component = rule.serialize(element, engine)?;
        let html = new_node(
            arena,
            NodeValue::HtmlBlock(NodeHtmlBlock {
                block_type: 0,
                literal: component.to_markdown(),
            }),
        );
        parent.append(html);
        return Ok(());
    }

    match &element.kind {
        ElementKind::Paragraph => {
            let paragraph = new_node(arena, NodeValue::Paragraph);
            parent.append(paragraph);
            append_inlines(arena, paragraph, &element.children);
        }
        ElementKind::Heading(level) => {
            let heading = new_node(
                arena,
                NodeValue::Heading(NodeHeading {
                    level: (*level).clamp(1, 6),
                    setext: false,
                }),
            );
            parent.append(heading);
            append_inlines(arena, heading, &element.children);
        }
        ElementKind::Blockquote => {
            let quote = new_node(arena, NodeValue::BlockQuote);
            parent.append(quote);
            append_blocks(arena, quote, &element.children, engine)?;
        }
        ElementKind::BulletedList | ElementKind::NumberedList => {
            append_list(arena, parent, element, engine)?;
        }
        ElementKind::CodeBlock | ElementKind::CodeLine => {
            let literal = code_literal(element);
            let code = new_node(
                arena,
                NodeValue::CodeBlock(NodeCodeBlock {
                    fenced: true,
                    fence_char: b'`',
                    fence_length: 3,
                    fence_offset: 0,
                    info: element.lang.clone().unwrap_or_default(),
                    literal,
                }),
            );
            parent.append(code);
        }
        ElementKind::HorizontalRule => parent.append(new_node(arena, NodeValue::ThematicBreak)),
        ElementKind::Table => append_table(arena, parent, element),
        ElementKind::Link | ElementKind::Image => {
            let paragraph = new_node(arena, NodeValue::Paragraph);
            parent.append(paragraph);
            append_inline(arena, paragraph, &Node::Element(element.clone()));
        }
        // Containers this crate has no syntax for keep their content
        _ => append_blocks(arena, parent, &element.children, engine)?,
    }
    Ok(())
}

fn append_list<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    element: &Element,
    engine: &MarkdownEngine,
) -> Result<(), BabelError> {
    let tight = element.children.iter().all(|item| match item {
        Node::Element(item) => item.children.iter().filter(|child| !child.is_inline()).count() <= 1,
        Node::Text(_) => true,
    });
    let list_data = NodeList {
        list_type: if element.kind == ElementKind::NumberedList {
            ListType::Ordered
        } else {
            ListType::Bullet
        },
        marker_offset: 0,
        padding: 0,
        start: 1,
        delimiter: ListDelimType::Period,
        bullet_char: b'-',
        tight,
    };

    let list = new_node(arena, NodeValue::List(list_data));
    parent.append(list);
    for child in &element.children {
        let item = new_node(arena, NodeValue::Item(list_data));
        list.append(item);
        match child {
            Node::Element(child) if child.kind == ElementKind::ListItem => {
                append_blocks(arena, item, &child.children, engine)?
            }
            other => append_blocks(arena, item, std::slice::from_ref(other), engine)?,
        }
    }
    Ok(())
}

fn code_literal(element: &Element) -> String {
    let lines: Vec<String> = if element.kind == ElementKind::CodeLine {
        vec![element.text_content()]
    } else {
        element.children.iter().map(Node::text_content).collect()
    };
    let mut literal = lines.join("\n");
    literal.push('\n');
    literal
}

fn append_table<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, element: &Element) {
    let rows: Vec<&Element> = element
        .children
        .iter()
        .filter_map(Node::as_element)
        .filter(|row| row.kind == ElementKind::TableRow)
        .collect();
    let num_columns = rows.iter().map(|row| row.children.len()).max().unwrap_or(0);
    if num_columns == 0 {
        return;
    }

    let table = new_node(
        arena,
        NodeValue::Table(NodeTable {
            alignments: vec![TableAlignment::None; num_columns],
            num_columns,
            num_rows: rows.len(),
            num_nonempty_cells: 0,
        }),
    );
    parent.append(table);

    for (index, row) in rows.iter().enumerate() {
        let row_node = new_node(arena, NodeValue::TableRow(index == 0));
        table.append(row_node);
        for column in 0..num_columns {
            let cell = new_node(arena, NodeValue::TableCell);
            row_node.append(cell);
            if let Some(content) = row.children.get(column) {
                for inline in cell_inlines(content) {
                    append_inline(arena, cell, &single_line(&inline));
                }
            }
        }
    }
}

/// Table cells hold a single line of inline content; block children are flattened into it.
fn cell_inlines(cell: &Node) -> Vec<Node> {
    let mut inlines = Vec::new();
    if let Node::Element(cell) = cell {
        for (index, child) in cell.children.iter().enumerate() {
            if index > 0 {
                inlines.push(Text::new(" ").into());
            }
            match child {
                Node::Element(block) if !child.is_inline() => {
                    inlines.extend(block.children.iter().cloned())
                }
                _ => inlines.push(child.clone()),
            }
        }
    }
    inlines
}

fn append_inlines<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, nodes: &[Node]) {
    for node in nodes {
        append_inline(arena, parent, node);
    }
}

fn append_inline<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, node: &Node) {
    match node {
        Node::Text(text) => append_text(arena, parent, text),
        Node::Element(element) => match element.kind {
            ElementKind::Link => {
                let link = new_node(
                    arena,
                    NodeValue::Link(NodeLink {
                        url: element.url.clone().unwrap_or_default(),
                        title: String::new(),
                    }),
                );
                parent.append(link);
                append_inlines(arena, link, &element.children);
            }
            ElementKind::Image => {
                let image = new_node(
                    arena,
                    NodeValue::Image(NodeLink {
                        url: element.url.clone().unwrap_or_default(),
                        title: String::new(),
                    }),
                );
                parent.append(image);
                if let Some(alt) = &element.alt {
                    image.append(new_node(arena, NodeValue::Text(alt.clone())));
                }
            }
            // Anything else inside a paragraph contributes its text
            _ => append_inlines(arena, parent, &element.children),
        },
    }
}

/// Append a text leaf, wrapping it in whatever its flags call for.
///
/// Emphasis cannot open or close next to whitespace, so leading and trailing whitespace is
/// written outside the wrappers.
fn append_text<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, text: &Text) {
    if text.text.is_empty() {
        return;
    }
    let core = text.text.trim();
    if core.is_empty() || !text.has_marks() {
        append_plain(arena, parent, &text.text);
        return;
    }

    let start = text.text.len() - text.text.trim_start().len();
    let leading = &text.text[..start];
    let trailing = &text.text[start + core.len()..];
    append_plain(arena, parent, leading);

    let mut closing = Vec::new();
    if text.color.is_some() || text.background_color.is_some() {
        parent.append(html_inline(arena, span_open(text)));
        closing.push("</span>");
    }
    if text.underline {
        parent.append(html_inline(arena, "<u>".to_string()));
        closing.push("</u>");
    }

    let mut target = parent;
    for (set, value) in [
        (text.bold, NodeValue::Strong),
        (text.italic, NodeValue::Emph),
        (text.strikethrough, NodeValue::Strikethrough),
    ] {
        if set {
            let wrapper = new_node(arena, value);
            target.append(wrapper);
            target = wrapper;
        }
    }

    if text.code {
        target.append(new_node(
            arena,
            NodeValue::Code(NodeCode {
                num_backticks: 1,
                literal: core.replace(['\r', '\n'], " "),
            }),
        ));
    } else {
        append_plain(arena, target, core);
    }

    for tag in closing.into_iter().rev() {
        parent.append(html_inline(arena, tag.to_string()));
    }
    append_plain(arena, parent, trailing);
}

/// Append unstyled text; newlines become hard line breaks.
fn append_plain<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, text: &str) {
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            parent.append(new_node(arena, NodeValue::LineBreak));
        }
        if !line.is_empty() {
            parent.append(new_node(arena, NodeValue::Text(line.to_string())));
        }
    }
}

fn html_inline<'a>(arena: &'a Arena<AstNode<'a>>, html: String) -> &'a AstNode<'a> {
    new_node(arena, NodeValue::HtmlInline(html))
}

fn span_open(text: &Text) -> String {
    let mut declarations = Vec::new();
    if let Some(color) = &text.color {
        declarations.push(format!("color: {}", sanitize_css(color)));
    }
    if let Some(background) = &text.background_color {
        declarations.push(format!("background-color: {}", sanitize_css(background)));
    }
    format!("<span style=\"{}\">", declarations.join("; "))
}

/// Colors come from the editor; keep them from breaking out of the attribute.
fn sanitize_css(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '"' | ';' | '<' | '>' | '\n' | '\r'))
        .collect()
}
