//! Document tree for the rich-text editor.
//!
//! The tree mirrors the editor's JSON value: a list of block nodes, each an element with a `type`
//! tag and `children`, bottoming out in text leaves that carry style flags. Types this crate does
//! not know (mentions, font plugins) are kept as [`ElementKind::Other`] together with their
//! attributes, so a tree survives a trip through this crate even when parts of it are opaque.

pub mod nodes;
pub mod wire;

pub use nodes::{Element, ElementKind, Node, Text};
pub use wire::{from_json, to_json};
