//! Text normalizer: raw HTML disclosure blocks to embedded components
//!
//!     Stored user text may contain literal `<details>`/`<summary>` HTML in any case, nested,
//!     unclosed, or without a summary. [`preprocess`] rewrites every well-formed top-level block
//!     into the component form the Markdown engine understands:
//!
//!         <details><summary>Hello</summary>World</details>
//!
//!     becomes
//!
//!         <Details summary="Hello">
//!
//!         World
//!
//!         </Details>
//!
//!     Blocks are located with the offset-stack matcher in [`crate::markup`], parsed with
//!     html5ever, and replaced back to front so earlier offsets stay valid. Whatever tags are left
//!     over afterwards belong to broken markup and are removed, leaving their text in place.
//!
//!     The capitalized `<Details` spelling is the component syntax, not HTML, so running the
//!     normalizer over its own output changes nothing.

use crate::error::BabelError;
use crate::html::{self, element_name};
use crate::markup::{attr, balanced_blocks, is_html_details, is_html_disclosure_tag, scan_tags};
use crate::markup::{Syntax, TagKind, DETAILS_COMPONENT};
use crate::DEFAULT_MAX_NESTING_DEPTH;
use markup5ever_rcdom::Handle;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Blocks nested deeper than this are treated as malformed and stripped to their text
    pub max_nesting_depth: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

/// Normalize raw user text with the default options.
pub fn preprocess(raw: &str) -> String {
    Normalizer::default().normalize(raw)
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// Rewrite raw HTML disclosure blocks as embedded components.
    ///
    /// Never fails: a block that cannot be converted keeps its original text.
    pub fn normalize(&self, raw: &str) -> String {
        let tags = scan_tags(raw, Syntax::Html, is_html_details);
        if tags.is_empty() {
            return raw.to_string();
        }

        let blocks = balanced_blocks(&tags, self.options.max_nesting_depth);
        debug!(tags = tags.len(), blocks = blocks.len(), "normalizing details blocks");

        let mut text = raw.to_string();
        for block in blocks.iter().rev() {
            let original = &raw[block.span.clone()];
            match self.convert_block(original) {
                Ok(replacement) => text.replace_range(block.span.clone(), &replacement),
                Err(err) => {
                    warn!(start = block.span.start, error = %err, "keeping details block as written")
                }
            }
        }

        let text = strip_stray_tags(text);
        EXCESS_NEWLINES
            .replace_all(&text, "\n\n")
            .trim()
            .to_string()
    }

    fn convert_block(&self, source: &str) -> Result<String, BabelError> {
        let fragment = html::Fragment::parse(source)?;
        let mut out = String::new();
        for node in &fragment.nodes() {
            html::write_markup(node, &mut out, &mut |handle, out| {
                self.visit_details(handle, out, 1)
            })?;
        }
        Ok(out)
    }

    fn visit_details(&self, handle: &Handle, out: &mut String, depth: usize) -> Result<bool, BabelError> {
        if element_name(handle) != Some("details") {
            return Ok(false);
        }
        out.push_str(&self.render_details(handle, depth)?);
        Ok(true)
    }

    fn render_details(&self, handle: &Handle, depth: usize) -> Result<String, BabelError> {
        if depth > self.options.max_nesting_depth {
            return Err(BabelError::TooDeep(self.options.max_nesting_depth));
        }

        let children = handle.children.borrow();
        let summary_index = children
            .iter()
            .position(|child| element_name(child) == Some("summary"));
        let summary = summary_index
            .map(|index| html::text_content(&children[index]))
            .unwrap_or_default();

        let mut content = String::new();
        for (index, child) in children.iter().enumerate() {
            if Some(index) == summary_index {
                continue;
            }
            html::write_markup(child, &mut content, &mut |handle, out| {
                self.visit_details(handle, out, depth + 1)
            })?;
        }

        Ok(format!(
            "\n\n<{DETAILS_COMPONENT} summary=\"{}\">\n\n{}\n\n</{DETAILS_COMPONENT}>\n\n",
            escape_summary(&summary),
            content.trim()
        ))
    }
}

/// Plain-text summary as a component attribute value.
///
/// The attribute is read back as inline Markdown, so characters that would start emphasis, code,
/// links or entities are backslash-escaped, as is a leading block marker. `<` is written as an
/// entity so the value can never contain something that scans as a tag.
fn escape_summary(summary: &str) -> String {
    attr::escape(&escape_markdown(summary.trim()))
}

fn escape_markdown(text: &str) -> String {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    let ordered_marker = (digits > 0).then_some(digits);

    let mut out = String::with_capacity(text.len());
    for (index, c) in text.char_indices() {
        match c {
            '<' => {
                out.push_str("&lt;");
                continue;
            }
            '\\' | '`' | '*' | '_' | '[' | ']' | '~' | '&' => out.push('\\'),
            '#' | '-' | '+' | '>' if index == 0 => out.push('\\'),
            '.' | ')' if Some(index) == ordered_marker => out.push('\\'),
            _ => {}
        }
        out.push(c);
    }
    out
}

/// Remove `details`/`summary` tags that did not belong to a balanced block.
///
/// A removed `</summary>` becomes a paragraph break so the summary text does not run into the
/// content. Removing a tag can join two fragments into a new one (`<<details>details>`), so this
/// repeats until a scan comes back empty.
fn strip_stray_tags(mut text: String) -> String {
    loop {
        let removals: Vec<_> = scan_tags(&text, Syntax::Html, is_html_disclosure_tag)
            .iter()
            .map(|tag| {
                let ends_summary =
                    tag.kind == TagKind::Close && tag.name.eq_ignore_ascii_case("summary");
                (tag.start..tag.end, if ends_summary { "\n\n" } else { "" })
            })
            .collect();
        if removals.is_empty() {
            return text;
        }
        debug!(count = removals.len(), "stripping stray disclosure tags");
        for (span, replacement) in removals.into_iter().rev() {
            text.replace_range(span, replacement);
        }
    }
}
