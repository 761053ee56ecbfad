//! Post-processor: embedded components back to literal `<details>` HTML
//!
//! The inverse of [`crate::normalize`] for the export path, for consumers that want plain HTML
//! disclosure tags rather than the component syntax. This is not a Markdown renderer: only the
//! `Details` component is rewritten, everything else is left exactly as it is.

use crate::markup::attr::parse_attributes;
use crate::markup::{balanced_blocks, read_tag, scan_tags, Block, Syntax, TagKind};
use crate::markup::{DETAILS_COMPONENT, SUMMARY_MARKER};
use crate::DEFAULT_MAX_NESTING_DEPTH;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Postprocessor {
    /// Components nested deeper than this are left as component text
    pub max_nesting_depth: usize,
}

impl Default for Postprocessor {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Rewrite `Details` components as HTML with the default options.
pub fn postprocess(text: &str) -> String {
    Postprocessor::default().process(text)
}

impl Postprocessor {
    pub fn new(max_nesting_depth: usize) -> Self {
        Self { max_nesting_depth }
    }

    /// Rewrite every balanced `Details` component as `<details><summary>…</summary>…</details>`.
    ///
    /// Unmatched opening tags pass through as literal text.
    pub fn process(&self, text: &str) -> String {
        let tags = scan_tags(text, Syntax::Component, |name| name == DETAILS_COMPONENT);
        if tags.is_empty() {
            return text.to_string();
        }

        let blocks = balanced_blocks(&tags, self.max_nesting_depth);
        debug!(blocks = blocks.len(), "post-processing details components");

        let mut out = text.to_string();
        for block in blocks.iter().rev() {
            out.replace_range(block.span.clone(), &self.render(text, block));
        }
        out
    }

    fn render(&self, text: &str, block: &Block<'_>) -> String {
        let attribute = parse_attributes(block.attributes)
            .and_then(|attributes| {
                attributes
                    .into_iter()
                    .find(|(name, _)| name == "summary")
                    .map(|(_, value)| value)
            })
            .unwrap_or_default();

        let inner = &text[block.inner.clone()];
        let (marker, rest) = split_summary_marker(inner);
        let summary = marker.unwrap_or(attribute);
        let content = self.process(rest);

        format!(
            "<details><summary>{}</summary>\n\n{}\n\n</details>",
            summary.trim(),
            content.trim()
        )
    }
}

/// Split a leading `<DetailsSummary>…</DetailsSummary>` marker off component content.
fn split_summary_marker(inner: &str) -> (Option<String>, &str) {
    let offset = inner.len() - inner.trim_start().len();
    let Some(open) = read_tag(inner, offset, Syntax::Component) else {
        return (None, inner);
    };
    if open.name != SUMMARY_MARKER {
        return (None, inner);
    }
    if open.kind == TagKind::SelfClosing {
        return (Some(String::new()), &inner[open.end..]);
    }

    let close = scan_tags(&inner[open.end..], Syntax::Component, |name| name == SUMMARY_MARKER)
        .into_iter()
        .find(|tag| tag.kind == TagKind::Close);
    match close {
        Some(close) => {
            let summary = &inner[open.end..open.end + close.start];
            let rest = &inner[open.end + close.end..];
            (Some(summary.trim().to_string()), rest)
        }
        None => (None, inner),
    }
}
