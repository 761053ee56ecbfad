//! Component-aware flow scanner
//!
//! comrak has no notion of embedded components, so before Markdown is handed to it the text is
//! split into a [`Flow`] sequence: plain Markdown runs, and components (a named, attributed tag
//! pair whose children are again a flow). A component tag is recognized at the start of an
//! unindented line, and once a line has started with one, anywhere in the rest of that line.
//! Tags inside fenced code blocks are never components. Indented tags belong to indented code
//! or to a list item; the latter are picked up by the [`parser`](super::parser) instead.
//!
//! Tags are matched with a frame stack. A close pops back to the nearest open frame of the same
//! name; frames it skips over and frames still open at the end of input were never closed, and
//! are restored as the literal text they came from.

use crate::markup::attr::{self, parse_attributes};
use crate::markup::{scan_tags, Syntax, Tag, TagKind};

/// A piece of component-aware Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Markdown(String),
    Component(Component),
}

/// An embedded component call: `<Name attr="value">` … `</Name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Flow>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_children(mut self, children: Vec<Flow>) -> Self {
        self.children = children;
        self
    }

    /// Value of the first attribute called `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Render as blank-line framed component text.
    ///
    /// Block content of a component only parses as blocks when it is separated from the tags by
    /// blank lines, so every child is framed that way.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("<{}", self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&attr::escape(value));
            out.push('"');
        }
        out.push('>');

        for child in &self.children {
            let text = child.to_markdown();
            let text = text.trim_matches('\n');
            if !text.trim().is_empty() {
                out.push_str("\n\n");
                out.push_str(text);
            }
        }

        out.push_str("\n\n</");
        out.push_str(&self.name);
        out.push('>');
        out
    }
}

impl Flow {
    pub fn to_markdown(&self) -> String {
        match self {
            Flow::Markdown(text) => text.clone(),
            Flow::Component(component) => component.to_markdown(),
        }
    }

    /// Whitespace-only Markdown carries nothing.
    pub fn is_blank(&self) -> bool {
        matches!(self, Flow::Markdown(text) if text.trim().is_empty())
    }
}

/// Split `source` into a flow, treating tags whose name passes `is_component` as components.
///
/// Components nested deeper than `max_depth` are kept as literal text.
pub fn parse_flow(source: &str, is_component: impl Fn(&str) -> bool, max_depth: usize) -> Vec<Flow> {
    let mut scanner = FlowScanner::new(&is_component, max_depth);
    for line in source.split_inclusive('\n') {
        scanner.feed_line(line);
    }
    scanner.finish()
}

struct Frame {
    name: String,
    attributes: Vec<(String, String)>,
    /// Source text of the opening tag, for restoring an unclosed frame
    open_text: String,
    children: Vec<Flow>,
    buffer: String,
}

impl Frame {
    fn root() -> Self {
        Self {
            name: String::new(),
            attributes: Vec::new(),
            open_text: String::new(),
            children: Vec::new(),
            buffer: String::new(),
        }
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let text = std::mem::take(&mut self.buffer);
            push_markdown(&mut self.children, text);
        }
    }

    /// Everything this frame collected, with its opening tag turned back into text.
    fn into_literal(mut self) -> Vec<Flow> {
        self.flush();
        let mut flows = Vec::with_capacity(self.children.len() + 1);
        flows.push(Flow::Markdown(self.open_text));
        for child in self.children {
            push_flow(&mut flows, child);
        }
        flows
    }

    fn into_component(mut self) -> Component {
        self.flush();
        Component {
            name: self.name,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

struct FlowScanner<'a> {
    is_component: &'a dyn Fn(&str) -> bool,
    max_depth: usize,
    root: Frame,
    open: Vec<Frame>,
    /// Opening tags past the depth limit that were written out as text
    literal_opens: usize,
    fence: FenceTracker,
}

impl<'a> FlowScanner<'a> {
    fn new(is_component: &'a dyn Fn(&str) -> bool, max_depth: usize) -> Self {
        Self {
            is_component,
            max_depth,
            root: Frame::root(),
            open: Vec::new(),
            literal_opens: 0,
            fence: FenceTracker::default(),
        }
    }

    fn current(&mut self) -> &mut Frame {
        self.open.last_mut().unwrap_or(&mut self.root)
    }

    fn push_text(&mut self, text: &str) {
        self.current().buffer.push_str(text);
    }

    fn feed_line(&mut self, line: &str) {
        let was_in_fence = self.fence.in_fence();
        if self.fence.update(line) || was_in_fence {
            self.push_text(line);
            return;
        }

        let is_component = self.is_component;
        let tags = scan_tags(line, Syntax::Component, is_component);
        match tags.first() {
            Some(first) if first.start == 0 => {}
            _ => {
                self.push_text(line);
                return;
            }
        }

        let mut cursor = 0;
        for tag in &tags {
            self.push_text(&line[cursor..tag.start]);
            self.handle_tag(tag, &line[tag.start..tag.end]);
            cursor = tag.end;
        }
        self.push_text(&line[cursor..]);
    }

    fn handle_tag(&mut self, tag: &Tag<'_>, source: &str) {
        match tag.kind {
            TagKind::Open => {
                if self.literal_opens > 0 || self.open.len() >= self.max_depth {
                    self.literal_opens += 1;
                    self.push_text(source);
                    return;
                }
                self.current().flush();
                self.open.push(Frame {
                    name: tag.name.to_string(),
                    attributes: parse_attributes(tag.attributes).unwrap_or_default(),
                    open_text: source.to_string(),
                    children: Vec::new(),
                    buffer: String::new(),
                });
            }
            TagKind::SelfClosing => {
                let component = Component {
                    name: tag.name.to_string(),
                    attributes: parse_attributes(tag.attributes).unwrap_or_default(),
                    children: Vec::new(),
                };
                let frame = self.current();
                frame.flush();
                frame.children.push(Flow::Component(component));
            }
            TagKind::Close => {
                if self.literal_opens > 0 {
                    self.literal_opens -= 1;
                    self.push_text(source);
                    return;
                }
                let Some(index) = self.open.iter().rposition(|frame| frame.name == tag.name) else {
                    self.push_text(source);
                    return;
                };
                while self.open.len() > index + 1 {
                    self.restore_top();
                }
                if let Some(frame) = self.open.pop() {
                    let component = frame.into_component();
                    let parent = self.current();
                    parent.flush();
                    parent.children.push(Flow::Component(component));
                }
            }
        }
    }

    /// Pop the innermost open frame and give its content back to the parent as text.
    fn restore_top(&mut self) {
        if let Some(frame) = self.open.pop() {
            let flows = frame.into_literal();
            let parent = self.current();
            parent.flush();
            for flow in flows {
                push_flow(&mut parent.children, flow);
            }
        }
    }

    fn finish(mut self) -> Vec<Flow> {
        while !self.open.is_empty() {
            self.restore_top();
        }
        self.root.flush();
        self.root.children
    }
}

fn push_markdown(flows: &mut Vec<Flow>, text: String) {
    if let Some(Flow::Markdown(previous)) = flows.last_mut() {
        previous.push_str(&text);
    } else {
        flows.push(Flow::Markdown(text));
    }
}

fn push_flow(flows: &mut Vec<Flow>, flow: Flow) {
    match flow {
        Flow::Markdown(text) => push_markdown(flows, text),
        component => flows.push(component),
    }
}

/// Tracks whether the scanner is inside a fenced code block.
///
/// A closing fence uses the opening fence's character and is at least as long.
#[derive(Debug, Default)]
struct FenceTracker {
    fence_char: Option<char>,
    fence_len: usize,
}

impl FenceTracker {
    fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Feed one line; returns `true` if it opened or closed a fence.
    fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        match self.fence_char {
            Some(fence_char) => {
                if is_closing_fence(trimmed, fence_char, self.fence_len) {
                    self.fence_char = None;
                    self.fence_len = 0;
                    return true;
                }
                false
            }
            None => match detect_fence(trimmed) {
                Some((fence_char, len)) => {
                    self.fence_char = Some(fence_char);
                    self.fence_len = len;
                    true
                }
                None => false,
            },
        }
    }
}

fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

fn is_closing_fence(trimmed: &str, fence_char: char, min_len: usize) -> bool {
    let count = trimmed.chars().take_while(|&c| c == fence_char).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}
