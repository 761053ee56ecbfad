//! Markdown engine with embedded component rules
//!
//!     [`MarkdownEngine`] converts between Markdown text and the document tree. Ordinary Markdown is
//!     parsed and formatted by comrak; embedded components are handled by [`ComponentRule`]s
//!     registered by name, much like formats in a registry.
//!
//!     Deserialize: text → [`flow::parse_flow`] → Markdown runs go through comrak
//!     ([`parser`]), components go to the rule registered for their name.
//!
//!     Serialize: nodes → comrak AST ([`serializer`]) → `format_commonmark`. Elements whose kind has
//!     a rule are rendered by the rule as component text and placed in the AST as raw HTML blocks.
//!
//!     Component names that no rule claims are unwrapped: their children are kept, the tags are
//!     dropped. Legacy marker components (such as `DetailsSummary`) are claimed by their rule and
//!     only mean something inside that rule's component.

pub mod flow;
pub mod parser;
pub mod serializer;

use crate::doc::{Element, ElementKind, Node, Text};
use crate::error::BabelError;
use crate::DEFAULT_MAX_NESTING_DEPTH;
use comrak::ComrakOptions;
use flow::{Component, Flow};
use std::collections::HashMap;
use tracing::debug;

/// A rule converting one embedded component to and from a document tree element.
pub trait ComponentRule: Send + Sync {
    /// Component name in Markdown text (e.g., "Details")
    fn component_name(&self) -> &str;

    /// Element kind in the document tree (e.g., `details`)
    fn element_kind(&self) -> ElementKind;

    /// Auxiliary component names that only appear inside this rule's component
    fn marker_names(&self) -> &[&str] {
        &[]
    }

    /// Build a tree node from a parsed component. Must not fail: missing pieces take defaults.
    fn deserialize(&self, component: &Component, engine: &MarkdownEngine) -> Node;

    /// Build a component from a tree element.
    fn serialize(&self, element: &Element, engine: &MarkdownEngine) -> Result<Component, BabelError>;
}

/// Markdown dialect switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub table: bool,
    pub strikethrough: bool,
    pub autolink: bool,
    /// Components nested deeper than this are kept as text
    pub max_nesting_depth: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            table: true,
            strikethrough: true,
            autolink: true,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl EngineOptions {
    pub fn comrak_options(&self) -> ComrakOptions<'static> {
        let mut options = ComrakOptions::default();
        options.extension.table = self.table;
        options.extension.strikethrough = self.strikethrough;
        options.extension.autolink = self.autolink;
        // Component text and style spans travel as raw HTML
        options.render.unsafe_ = true;
        options
    }
}

pub struct MarkdownEngine {
    options: EngineOptions,
    comrak: ComrakOptions<'static>,
    rules: HashMap<String, Box<dyn ComponentRule>>,
}

impl MarkdownEngine {
    /// An engine without any component rules.
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            comrak: options.comrak_options(),
            rules: HashMap::new(),
        }
    }

    /// An engine with the built-in rules registered.
    pub fn with_defaults(options: EngineOptions) -> Self {
        let mut engine = Self::new(options);
        engine.register(crate::details::DetailsRule);
        engine
    }

    /// Register a rule. A rule with the same component name is replaced.
    pub fn register<R: ComponentRule + 'static>(&mut self, rule: R) {
        self.rules
            .insert(rule.component_name().to_string(), Box::new(rule));
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub(crate) fn comrak(&self) -> &ComrakOptions<'static> {
        &self.comrak
    }

    pub fn rule_for_component(&self, name: &str) -> Option<&dyn ComponentRule> {
        self.rules.get(name).map(|rule| rule.as_ref())
    }

    pub fn rule_for_element(&self, kind: &ElementKind) -> Option<&dyn ComponentRule> {
        self.rules
            .values()
            .find(|rule| &rule.element_kind() == kind)
            .map(|rule| rule.as_ref())
    }

    /// Whether a tag name is a component or marker some rule knows about.
    pub fn is_component(&self, name: &str) -> bool {
        self.rules.contains_key(name)
            || self
                .rules
                .values()
                .any(|rule| rule.marker_names().contains(&name))
    }

    /// Parse Markdown with embedded components into block nodes.
    pub fn deserialize(&self, markdown: &str) -> Vec<Node> {
        let flows = flow::parse_flow(
            markdown,
            |name| self.is_component(name),
            self.options.max_nesting_depth,
        );
        debug!(flows = flows.len(), "deserializing markdown");
        self.convert_flows(&flows)
    }

    /// Convert a flow to block nodes: the engine's standard child conversion.
    pub fn convert_flows(&self, flows: &[Flow]) -> Vec<Node> {
        let mut nodes = Vec::new();
        for item in flows {
            match item {
                Flow::Markdown(text) => {
                    if !text.trim().is_empty() {
                        nodes.extend(parser::parse_blocks(text, self));
                    }
                }
                Flow::Component(component) => match self.rule_for_component(&component.name) {
                    Some(rule) => nodes.push(rule.deserialize(component, self)),
                    None => nodes.extend(self.convert_flows(&component.children)),
                },
            }
        }
        nodes
    }

    /// Parse a single line of inline Markdown, such as a summary.
    ///
    /// Always returns at least one node.
    pub fn parse_inline(&self, text: &str) -> Vec<Node> {
        let inlines = parser::parse_inlines(text.trim(), &self.comrak);
        if inlines.is_empty() {
            vec![Text::empty().into()]
        } else {
            inlines
        }
    }

    /// Serialize block nodes to Markdown.
    pub fn serialize(&self, nodes: &[Node]) -> Result<String, BabelError> {
        let markdown = serializer::serialize_blocks(nodes, self)?;
        Ok(markdown.trim().to_string())
    }

    /// Serialize inline nodes to a single line of Markdown.
    pub fn serialize_inline(&self, nodes: &[Node]) -> Result<String, BabelError> {
        let markdown = serializer::serialize_inlines(nodes, self)?;
        Ok(markdown.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

impl Default for MarkdownEngine {
    fn default() -> Self {
        Self::with_defaults(EngineOptions::default())
    }
}
