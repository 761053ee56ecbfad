//! Core data structures for the document tree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A node of the document tree: either an element or a text leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(Text),
}

/// The `type` tag of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    Paragraph,
    /// `h1` through `h6`
    Heading(u8),
    Blockquote,
    CodeBlock,
    CodeLine,
    BulletedList,
    NumberedList,
    ListItem,
    Link,
    Image,
    HorizontalRule,
    Table,
    TableRow,
    TableHeader,
    TableCell,
    /// Collapsible disclosure: first child is the summary, the rest is content
    Details,
    /// Any type this crate has no rules for, kept verbatim
    Other(String),
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub children: Vec<Node>,
    /// Link target or image source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Code block language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Image alternative text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Attribute-era disclosure summary. Only read, never written by this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Attributes owned by other editor plugins
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A text leaf with its style flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(
        default,
        rename = "backgroundColor",
        skip_serializing_if = "Option::is_none"
    )]
    pub background_color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ElementKind {
    /// Paragraph-like elements hold inline content only.
    pub fn is_text_block(&self) -> bool {
        matches!(self, ElementKind::Paragraph | ElementKind::Heading(_))
    }

    /// Elements that live inside a paragraph rather than beside it.
    pub fn is_inline(&self) -> bool {
        matches!(self, ElementKind::Link | ElementKind::Image)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ElementKind::Paragraph => "p",
            ElementKind::Heading(level) => return write!(f, "h{level}"),
            ElementKind::Blockquote => "blockquote",
            ElementKind::CodeBlock => "code_block",
            ElementKind::CodeLine => "code_line",
            ElementKind::BulletedList => "ul",
            ElementKind::NumberedList => "ol",
            ElementKind::ListItem => "li",
            ElementKind::Link => "a",
            ElementKind::Image => "img",
            ElementKind::HorizontalRule => "hr",
            ElementKind::Table => "table",
            ElementKind::TableRow => "tr",
            ElementKind::TableHeader => "th",
            ElementKind::TableCell => "td",
            ElementKind::Details => "details",
            ElementKind::Other(tag) => tag,
        };
        f.write_str(tag)
    }
}

impl From<String> for ElementKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "p" => ElementKind::Paragraph,
            "blockquote" => ElementKind::Blockquote,
            "code_block" => ElementKind::CodeBlock,
            "code_line" => ElementKind::CodeLine,
            "ul" => ElementKind::BulletedList,
            "ol" => ElementKind::NumberedList,
            "li" => ElementKind::ListItem,
            "a" => ElementKind::Link,
            "img" => ElementKind::Image,
            "hr" => ElementKind::HorizontalRule,
            "table" => ElementKind::Table,
            "tr" => ElementKind::TableRow,
            "th" => ElementKind::TableHeader,
            "td" => ElementKind::TableCell,
            "details" => ElementKind::Details,
            _ => match heading_level(&tag) {
                Some(level) => ElementKind::Heading(level),
                None => ElementKind::Other(tag),
            },
        }
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.to_string()
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    tag.strip_prefix('h')
        .and_then(|level| level.parse::<u8>().ok())
        .filter(|level| (1..=6).contains(level))
}

impl Element {
    pub fn new(kind: ElementKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            children,
            url: None,
            lang: None,
            alt: None,
            summary: None,
            extra: Map::new(),
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::new(ElementKind::Paragraph, ensure_text_child(children))
    }

    /// A paragraph holding a single empty text leaf.
    pub fn empty_paragraph() -> Self {
        Self::paragraph(Vec::new())
    }

    /// A disclosure in the current format: summary paragraph first, then the content.
    pub fn details(summary: Vec<Node>, content: Vec<Node>) -> Self {
        let mut children = Vec::with_capacity(content.len() + 1);
        children.push(Element::paragraph(summary).into());
        if content.is_empty() {
            children.push(Element::empty_paragraph().into());
        } else {
            children.extend(content);
        }
        Self::new(ElementKind::Details, children)
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// Concatenated text of all descendant leaves.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn strikethrough(mut self) -> Self {
        self.strikethrough = true;
        self
    }

    pub fn code(mut self) -> Self {
        self.code = true;
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Whether both leaves carry the same style flags (text aside).
    pub fn same_marks(&self, other: &Text) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.strikethrough == other.strikethrough
            && self.code == other.code
            && self.color == other.color
            && self.background_color == other.background_color
            && self.extra == other.extra
    }

    /// Whether any style flag is set.
    pub fn has_marks(&self) -> bool {
        self.bold
            || self.italic
            || self.underline
            || self.strikethrough
            || self.code
            || self.color.is_some()
            || self.background_color.is_some()
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    /// Text leaves and inline elements.
    pub fn is_inline(&self) -> bool {
        match self {
            Node::Text(_) => true,
            Node::Element(element) => element.kind.is_inline(),
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

/// Merge adjacent text leaves that carry identical style flags.
pub fn merge_adjacent_text(nodes: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let (Some(Node::Text(previous)), Node::Text(current)) = (merged.last_mut(), &node) {
            if previous.same_marks(current) {
                previous.text.push_str(&current.text);
                continue;
            }
        }
        merged.push(node);
    }
    merged
}

/// Elements must have children on the wire; an empty list becomes one empty leaf.
pub fn ensure_text_child(children: Vec<Node>) -> Vec<Node> {
    if children.is_empty() {
        vec![Text::empty().into()]
    } else {
        children
    }
}
