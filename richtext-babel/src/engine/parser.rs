//! Markdown parsing (comrak AST → document tree)
//!
//! Block mapping:
//!
//! | Markdown            | Tree                                         |
//! |---------------------|----------------------------------------------|
//! | Paragraph           | `p`                                          |
//! | Heading             | `h1` … `h6`                                  |
//! | Block quote         | `blockquote`                                 |
//! | List / item         | `ul` or `ol` / `li`                          |
//! | Code block          | `code_block` (`lang`) of `code_line`s        |
//! | Thematic break      | `hr`                                         |
//! | Table               | `table` / `tr` / `th` or `td` / `p`          |
//! | HTML block          | `p` holding the raw HTML as text             |
//!
//! Component tags inside a block quote or list item reach comrak as HTML blocks. Such a
//! container's content is written back out as Markdown and read again by the engine, so the
//! component is recognized at any container depth.
//!
//! Inline marks come from emphasis nodes (bold, italic, strikethrough, code) and from the raw
//! HTML the serializer writes for flags Markdown has no syntax for: `<u>` for underline and
//! `<span style="color: …; background-color: …">` for colors. Any other inline HTML stays text.

use crate::doc::nodes::{ensure_text_child, merge_adjacent_text};
use crate::doc::{Element, ElementKind, Node, Text};
use crate::engine::MarkdownEngine;
use crate::markup::{scan_tags, Syntax};
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{format_commonmark, parse_document, Arena, ComrakOptions};
use once_cell::sync::Lazy;
use regex::Regex;

static SPAN_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^<span\s+style\s*=\s*"([^"]*)"\s*>$"#).unwrap());

/// Marker comrak writes between two adjacent lists
const END_LIST_COMMENT: &str = "<!-- end list -->";

/// Parse Markdown into block nodes.
pub fn parse_blocks(source: &str, engine: &MarkdownEngine) -> Vec<Node> {
    let arena = Arena::new();
    let root = parse_document(&arena, source, engine.comrak());
    root.children()
        .flat_map(|node| convert_block(node, engine))
        .collect()
}

/// Parse a line of Markdown as inline content.
///
/// Text that does not parse as a single paragraph (`1. Intro`, `# Title`) is kept as plain text.
pub fn parse_inlines(source: &str, options: &ComrakOptions) -> Vec<Node> {
    if source.is_empty() {
        return Vec::new();
    }
    let arena = Arena::new();
    let root = parse_document(&arena, source, options);
    let mut blocks = root.children();
    match (blocks.next(), blocks.next()) {
        (Some(block), None) if matches!(block.data.borrow().value, NodeValue::Paragraph) => {
            convert_inlines(block)
        }
        _ => vec![Text::new(source).into()],
    }
}

fn convert_block<'a>(node: &'a AstNode<'a>, engine: &MarkdownEngine) -> Vec<Node> {
    let data = node.data.borrow();
    let element = match &data.value {
        NodeValue::Paragraph => Element::paragraph(convert_inlines(node)),
        NodeValue::Heading(heading) => Element::new(
            ElementKind::Heading(heading.level.clamp(1, 6)),
            ensure_text_child(convert_inlines(node)),
        ),
        NodeValue::BlockQuote => Element::new(ElementKind::Blockquote, convert_children(node, engine)),
        NodeValue::List(list) => {
            let kind = match list.list_type {
                ListType::Bullet => ElementKind::BulletedList,
                ListType::Ordered => ElementKind::NumberedList,
            };
            Element::new(kind, ensure_text_child(convert_children(node, engine)))
        }
        NodeValue::Item(_) => Element::new(ElementKind::ListItem, convert_children(node, engine)),
        NodeValue::CodeBlock(code) => {
            let literal = code.literal.strip_suffix('\n').unwrap_or(&code.literal);
            let lines = literal
                .split('\n')
                .map(|line| Element::new(ElementKind::CodeLine, vec![Text::new(line).into()]).into())
                .collect();
            let element = Element::new(ElementKind::CodeBlock, lines);
            match code.info.split_whitespace().next() {
                Some(lang) => element.with_lang(lang),
                None => element,
            }
        }
        NodeValue::ThematicBreak => {
            Element::new(ElementKind::HorizontalRule, vec![Text::empty().into()])
        }
        NodeValue::Table(_) => Element::new(ElementKind::Table, convert_children(node, engine)),
        NodeValue::TableRow(header) => {
            let cell_kind = if *header {
                ElementKind::TableHeader
            } else {
                ElementKind::TableCell
            };
            let cells = node
                .children()
                .map(|cell| {
                    let paragraph = Element::paragraph(convert_inlines(cell));
                    Element::new(cell_kind.clone(), vec![paragraph.into()]).into()
                })
                .collect();
            Element::new(ElementKind::TableRow, cells)
        }
        NodeValue::HtmlBlock(html) => {
            let literal = html.literal.trim_end();
            if literal.is_empty() || literal == END_LIST_COMMENT {
                return Vec::new();
            }
            Element::paragraph(vec![Text::new(literal).into()])
        }
        NodeValue::FrontMatter(_) => return Vec::new(),
        _ => {
            return node
                .children()
                .flat_map(|child| convert_block(child, engine))
                .collect()
        }
    };
    vec![element.into()]
}

/// Block children of a container; a container is never left without children.
fn convert_children<'a>(node: &'a AstNode<'a>, engine: &MarkdownEngine) -> Vec<Node> {
    let reread = node
        .children()
        .any(|child| opens_with_component_tag(child, engine))
        .then(|| container_markdown(node, engine))
        .flatten();
    let children: Vec<Node> = match reread {
        Some(markdown) => engine.deserialize(&markdown),
        None => node
            .children()
            .flat_map(|child| convert_block(child, engine))
            .collect(),
    };
    if children.is_empty() {
        vec![Element::empty_paragraph().into()]
    } else {
        children
    }
}

fn opens_with_component_tag<'a>(node: &'a AstNode<'a>, engine: &MarkdownEngine) -> bool {
    match &node.data.borrow().value {
        NodeValue::HtmlBlock(html) => {
            scan_tags(&html.literal, Syntax::Component, |name| engine.is_component(name))
                .first()
                .is_some_and(|tag| tag.start == 0)
        }
        _ => false,
    }
}

/// Content of a container as unprefixed Markdown, one block per child.
fn container_markdown<'a>(node: &'a AstNode<'a>, engine: &MarkdownEngine) -> Option<String> {
    let mut blocks = Vec::new();
    for child in node.children() {
        let mut out = Vec::new();
        format_commonmark(child, engine.comrak(), &mut out).ok()?;
        let text = String::from_utf8(out).ok()?;
        blocks.push(text.trim_end_matches('\n').to_string());
    }
    Some(blocks.join("\n\n"))
}

/// Styles opened by raw inline HTML and not yet closed.
enum HtmlStyle {
    Underline,
    Span {
        color: Option<String>,
        background_color: Option<String>,
    },
}

impl HtmlStyle {
    fn tag(&self) -> &'static str {
        match self {
            HtmlStyle::Underline => "u",
            HtmlStyle::Span { .. } => "span",
        }
    }

    fn apply(&self, marks: &mut Text) {
        match self {
            HtmlStyle::Underline => marks.underline = true,
            HtmlStyle::Span {
                color,
                background_color,
            } => {
                if color.is_some() {
                    marks.color = color.clone();
                }
                if background_color.is_some() {
                    marks.background_color = background_color.clone();
                }
            }
        }
    }
}

enum HtmlToken {
    Open(HtmlStyle),
    Close(&'static str),
}

fn read_html_token(raw: &str) -> Option<HtmlToken> {
    let raw = raw.trim();
    match raw {
        "<u>" => return Some(HtmlToken::Open(HtmlStyle::Underline)),
        "</u>" => return Some(HtmlToken::Close("u")),
        "</span>" => return Some(HtmlToken::Close("span")),
        _ => {}
    }

    let style = SPAN_OPEN.captures(raw)?.get(1)?.as_str();
    let mut color = None;
    let mut background_color = None;
    for declaration in style.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match property.trim() {
            "color" => color = Some(value.to_string()),
            "background-color" => background_color = Some(value.to_string()),
            _ => {}
        }
    }
    if color.is_none() && background_color.is_none() {
        return None;
    }
    Some(HtmlToken::Open(HtmlStyle::Span {
        color,
        background_color,
    }))
}

/// Inline children of a paragraph-like node, with adjacent equal-style leaves merged.
fn convert_inlines<'a>(node: &'a AstNode<'a>) -> Vec<Node> {
    let mut walker = InlineWalker::default();
    for child in node.children() {
        walker.walk(child, &Text::empty());
    }
    merge_adjacent_text(walker.out)
}

#[derive(Default)]
struct InlineWalker {
    out: Vec<Node>,
    html: Vec<HtmlStyle>,
}

impl InlineWalker {
    fn marks(&self, base: &Text) -> Text {
        let mut marks = base.clone();
        for style in &self.html {
            style.apply(&mut marks);
        }
        marks
    }

    fn leaf(&mut self, text: &str, base: &Text) {
        let mut leaf = self.marks(base);
        leaf.text = text.to_string();
        self.out.push(leaf.into());
    }

    fn walk_children<'a>(&mut self, node: &'a AstNode<'a>, base: &Text) {
        for child in node.children() {
            self.walk(child, base);
        }
    }

    fn walk<'a>(&mut self, node: &'a AstNode<'a>, base: &Text) {
        let data = node.data.borrow();
        match &data.value {
            NodeValue::Text(text) => self.leaf(text, base),
            NodeValue::SoftBreak | NodeValue::LineBreak => self.leaf("\n", base),
            NodeValue::Code(code) => self.leaf(&code.literal, &base.clone().code()),
            NodeValue::Strong => self.walk_children(node, &base.clone().bold()),
            NodeValue::Emph => self.walk_children(node, &base.clone().italic()),
            NodeValue::Strikethrough => self.walk_children(node, &base.clone().strikethrough()),
            NodeValue::Link(link) => {
                let mut inner = InlineWalker::default();
                let marks = self.marks(base);
                inner.walk_children(node, &marks);
                let children = ensure_text_child(merge_adjacent_text(inner.out));
                self.out
                    .push(Element::new(ElementKind::Link, children).with_url(&link.url).into());
            }
            NodeValue::Image(link) => {
                let alt = collect_text(node);
                let mut image = Element::new(ElementKind::Image, vec![Text::empty().into()])
                    .with_url(&link.url);
                if !alt.is_empty() {
                    image = image.with_alt(alt);
                }
                self.out.push(image.into());
            }
            NodeValue::HtmlInline(raw) => match read_html_token(raw) {
                Some(HtmlToken::Open(style)) => self.html.push(style),
                Some(HtmlToken::Close(tag)) => {
                    match self.html.iter().rposition(|style| style.tag() == tag) {
                        Some(index) => {
                            self.html.remove(index);
                        }
                        None => self.leaf(raw, base),
                    }
                }
                None => self.leaf(raw, base),
            },
            _ => self.walk_children(node, base),
        }
    }
}

fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(text) => out.push_str(text),
            NodeValue::Code(code) => out.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
            _ => out.push_str(&collect_text(child)),
        }
    }
    out
}
