//! Tag-level text scanning shared by the normalizer, the post-processor and the engine.
//!
//! Disclosure blocks nest, and the same tag name appears at every level, so finding a block is a
//! bracket-matching problem: tags are tokenized left to right and matched with an explicit offset
//! stack ([`scan::balanced_blocks`]). No regex recursion is involved.

pub mod attr;
pub mod scan;

pub use scan::{balanced_blocks, read_tag, scan_tags, Block, Syntax, Tag, TagKind};

/// Component name of the disclosure block in Markdown text.
pub const DETAILS_COMPONENT: &str = "Details";

/// Legacy summary marker component, only ever read.
pub const SUMMARY_MARKER: &str = "DetailsSummary";

/// Whether `name` is an HTML `details` tag (any case) rather than the component spelling.
pub fn is_html_details(name: &str) -> bool {
    name.eq_ignore_ascii_case("details") && name != DETAILS_COMPONENT
}

/// Whether `name` is an HTML `details` or `summary` tag (any case).
pub fn is_html_disclosure_tag(name: &str) -> bool {
    is_html_details(name) || name.eq_ignore_ascii_case("summary")
}
