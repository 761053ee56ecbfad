//! Tag tokenizer and balanced-block matcher.

use std::ops::Range;
use tracing::warn;

/// Quoting rules for attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// HTML: backslashes are literal, `/>` does not close non-void elements
    Html,
    /// Embedded component: `\"` and `\\` are escapes inside quoted values, `/>` self-closes
    Component,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    SelfClosing,
}

/// One tag token found in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Byte offset of `<`
    pub start: usize,
    /// Byte offset just past `>`
    pub end: usize,
    pub kind: TagKind,
    pub name: &'a str,
    /// Raw attribute source between the name and the closing bracket
    pub attributes: &'a str,
}

/// A top-level balanced block: an open tag, its matching close, and everything between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    /// Span of the whole block, tags included
    pub span: Range<usize>,
    /// Span between the open and the close tag
    pub inner: Range<usize>,
    /// Raw attribute source of the opening tag
    pub attributes: &'a str,
}

/// Read a tag starting at `start`, which must point at `<`.
///
/// Returns `None` when the text at `start` is not a complete tag (no name, no closing bracket, or
/// an unterminated quoted value).
pub fn read_tag(text: &str, start: usize, syntax: Syntax) -> Option<Tag<'_>> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'<') {
        return None;
    }

    let mut i = start + 1;
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }

    let name_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    if i == name_start || !bytes[name_start].is_ascii_alphabetic() {
        return None;
    }
    let name = &text[name_start..i];

    match bytes.get(i) {
        Some(b'>') | Some(b'/') => {}
        Some(c) if c.is_ascii_whitespace() => {}
        _ => return None,
    }

    let attributes_start = i;
    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        let c = bytes[i];
        match quote {
            Some(_) if c == b'\\' && syntax == Syntax::Component => {
                i += 2;
                continue;
            }
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                b'"' | b'\'' => quote = Some(c),
                b'>' => {
                    let inner = text[attributes_start..i].trim();
                    let self_closing = inner.ends_with('/');
                    let kind = if closing {
                        TagKind::Close
                    } else if self_closing && syntax == Syntax::Component {
                        TagKind::SelfClosing
                    } else {
                        TagKind::Open
                    };
                    let attributes = inner.strip_suffix('/').unwrap_or(inner).trim_end();
                    return Some(Tag {
                        start,
                        end: i + 1,
                        kind,
                        name,
                        attributes,
                    });
                }
                _ => {}
            },
        }
        i += 1;
    }

    None
}

/// Tokenize every tag in `text` whose name passes `accept`, left to right.
pub fn scan_tags<'a>(text: &'a str, syntax: Syntax, accept: impl Fn(&str) -> bool) -> Vec<Tag<'a>> {
    let mut tags = Vec::new();
    let mut pos = 0;
    while let Some(offset) = text[pos..].find('<') {
        let start = pos + offset;
        match read_tag(text, start, syntax) {
            Some(tag) if accept(tag.name) => {
                pos = tag.end;
                tags.push(tag);
            }
            _ => pos = start + 1,
        }
    }
    tags
}

/// Match open and close tags with an offset stack and return the top-level blocks.
///
/// Only a close that empties the stack ends a block, so nested blocks stay inside their parent.
/// Stray closes are ignored and unclosed opens never form a block; both are left for the caller
/// to clean up. A block whose nesting exceeds `max_depth` is dropped as runaway input.
pub fn balanced_blocks<'a>(tags: &[Tag<'a>], max_depth: usize) -> Vec<Block<'a>> {
    let mut blocks = Vec::new();
    let mut stack: Vec<&Tag<'a>> = Vec::new();
    let mut runaway = false;

    for tag in tags {
        match tag.kind {
            TagKind::Open => {
                stack.push(tag);
                if stack.len() > max_depth {
                    runaway = true;
                }
            }
            TagKind::SelfClosing => {
                if stack.is_empty() {
                    blocks.push(Block {
                        span: tag.start..tag.end,
                        inner: tag.end..tag.end,
                        attributes: tag.attributes,
                    });
                }
            }
            TagKind::Close => {
                let Some(open) = stack.pop() else {
                    continue;
                };
                if !stack.is_empty() {
                    continue;
                }
                if runaway {
                    warn!(
                        start = open.start,
                        max_depth, "dropping block nested deeper than the limit"
                    );
                    runaway = false;
                    continue;
                }
                blocks.push(Block {
                    span: open.start..tag.end,
                    inner: open.end..tag.start,
                    attributes: open.attributes,
                });
            }
        }
    }

    blocks
}
