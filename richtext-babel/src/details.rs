//! The disclosure block codec
//!
//!     [`DetailsRule`] converts between the `Details` component and the tree's `details` element,
//!     whose first child is the summary paragraph and whose remaining children are the content.
//!
//!     Stored content uses three encodings of the component, and all of them are read:
//!
//!         <Details>                           summary in a dedicated marker child
//!         <DetailsSummary>Title</DetailsSummary>
//!         …
//!
//!         <Details summary="Title">           summary in the attribute, every child is content
//!         …
//!
//!         <Details summary="Stale">           attribute and marker: the marker wins
//!         <DetailsSummary>Title</DetailsSummary>
//!         …
//!
//!     When the summary comes from the attribute, the children are content no matter how many
//!     there are. A single paragraph child is never promoted to the summary.
//!
//!     Only the attribute form is written. The attribute holds the summary as inline Markdown, so
//!     bold and italic in a summary survive the round trip.

use crate::doc::{Element, ElementKind, Node, Text};
use crate::engine::flow::{Component, Flow};
use crate::engine::{ComponentRule, MarkdownEngine};
use crate::error::BabelError;
use crate::markup::{DETAILS_COMPONENT, SUMMARY_MARKER};
use tracing::debug;

const SUMMARY_ATTRIBUTE: &str = "summary";

/// Rule for the collapsible disclosure block.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailsRule;

/// Where a component's summary comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SummarySource<'a> {
    /// No attribute; a marker child holds the summary
    DedicatedChild(&'a Component),
    /// Attribute and marker child; the marker wins
    AttributeWithMarker(&'a Component),
    /// Attribute or nothing; all children are content
    AttributeOnly(Option<&'a str>),
}

impl<'a> SummarySource<'a> {
    fn classify(component: &'a Component) -> Self {
        let attribute = component
            .attribute(SUMMARY_ATTRIBUTE)
            .filter(|summary| !summary.trim().is_empty());
        let marker = component.children.iter().find_map(|flow| match flow {
            Flow::Component(child) if child.name == SUMMARY_MARKER => Some(child),
            _ => None,
        });
        match (attribute, marker) {
            (None, Some(marker)) => SummarySource::DedicatedChild(marker),
            (Some(_), Some(marker)) => SummarySource::AttributeWithMarker(marker),
            (attribute, None) => SummarySource::AttributeOnly(attribute),
        }
    }

    fn marker(&self) -> Option<&'a Component> {
        match *self {
            SummarySource::DedicatedChild(marker) | SummarySource::AttributeWithMarker(marker) => {
                Some(marker)
            }
            SummarySource::AttributeOnly(_) => None,
        }
    }

    fn summary(&self, engine: &MarkdownEngine) -> Vec<Node> {
        match self.marker() {
            Some(marker) => {
                let text: String = marker.children.iter().map(Flow::to_markdown).collect();
                engine.parse_inline(&collapse_whitespace(&text))
            }
            None => match self {
                SummarySource::AttributeOnly(Some(summary)) => engine.parse_inline(summary),
                _ => vec![Text::empty().into()],
            },
        }
    }
}

impl ComponentRule for DetailsRule {
    fn component_name(&self) -> &str {
        DETAILS_COMPONENT
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Details
    }

    fn marker_names(&self) -> &[&str] {
        &[SUMMARY_MARKER]
    }

    fn deserialize(&self, component: &Component, engine: &MarkdownEngine) -> Node {
        let source = SummarySource::classify(component);
        debug!(?source, children = component.children.len(), "deserializing details");

        let summary = source.summary(engine);
        let marker = source.marker();
        let content_flows: Vec<Flow> = component
            .children
            .iter()
            .filter(|flow| match (flow, marker) {
                (Flow::Component(child), Some(marker)) => !std::ptr::eq(child, marker),
                _ => true,
            })
            .cloned()
            .collect();
        let content = engine.convert_flows(&content_flows);

        Element::details(summary, content).into()
    }

    fn serialize(&self, element: &Element, engine: &MarkdownEngine) -> Result<Component, BabelError> {
        let (summary, content) = split_summary(element);
        let summary = engine.serialize_inline(&summary)?;
        let body = engine.serialize(content)?;

        let component =
            Component::new(DETAILS_COMPONENT).with_attribute(SUMMARY_ATTRIBUTE, summary);
        if body.is_empty() {
            Ok(component)
        } else {
            Ok(component.with_children(vec![Flow::Markdown(body)]))
        }
    }
}

/// Split a `details` element into summary inlines and content blocks.
///
/// A tree node from the attribute era carries its summary in `summary` and keeps every child as
/// content. Otherwise the first child is the summary when it is paragraph-like or inline; a
/// first child that is some other block stays content and the summary is empty.
fn split_summary(element: &Element) -> (Vec<Node>, &[Node]) {
    if let Some(summary) = element.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        return (vec![Text::new(summary).into()], &element.children);
    }
    match element.children.split_first() {
        Some((Node::Element(first), rest)) if first.kind.is_text_block() => {
            (first.children.clone(), rest)
        }
        Some((first, rest)) if first.is_inline() => (vec![first.clone()], rest),
        _ => (Vec::new(), &element.children),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
