//! Markdown interoperability for the review editor's rich-text documents
//!
//!     This crate converts between the editor's document tree (the JSON value the comment and
//!     review editor operates on) and Markdown text. The only node type with bespoke handling is
//!     the collapsible disclosure block (`details`), which Markdown cannot express natively and
//!     which travels through text as an embedded component:
//!
//!         <Details summary="Spoilers">
//!
//!         The butler did it.
//!
//!         </Details>
//!
//!     Everything else (paragraphs, lists, code, tables, images) is handed to comrak.
//!
//!     This is a pure lib: no I/O, no global state besides compiled regexes. The `richtext` binary
//!     in richtext-cli is a thin shell host around it.
//!
//! Architecture
//!
//!     .
//!     ├── error.rs                # BabelError
//!     ├── doc                     # Document tree (Node / Element / Text) and its JSON wire form
//!     ├── markup                  # Tag tokenizer, balanced-block matching, attribute escaping
//!     ├── html.rs                 # html5ever fragment parsing and element-to-string
//!     ├── engine                  # MarkdownEngine: comrak + embedded component rules
//!     │   ├── flow.rs             # Component-aware flow scanner (Markdown runs + components)
//!     │   ├── parser.rs           # comrak AST → document tree
//!     │   └── serializer.rs       # document tree → comrak AST → Markdown
//!     ├── details.rs              # The disclosure codec (ComponentRule for `Details`)
//!     ├── normalize.rs            # preprocess: raw HTML <details> → embedded components
//!     └── postprocess.rs          # postprocess: embedded components → literal <details> HTML
//!
//! Pipelines
//!
//!     Import:  raw text → [`preprocess`] → [`MarkdownEngine::deserialize`] → document tree
//!     Export:  document tree → [`MarkdownEngine::serialize`] → Markdown → (optional) [`postprocess`]
//!
//!     Malformed input never errors on these paths: broken blocks are repaired or stripped to
//!     their text. The only fallible operations are JSON decoding of a stored tree and the
//!     formatter's writer.
//!
//! Legacy content
//!
//!     Stored user content spans three encodings of the disclosure block. All of them are read,
//!     only the current one is written. See [`details`] for the resolution rules.

pub mod details;
pub mod doc;
pub mod engine;
pub mod error;
pub mod html;
pub mod markup;
pub mod normalize;
pub mod postprocess;

pub use details::DetailsRule;
pub use doc::{Element, ElementKind, Node, Text};
pub use engine::{ComponentRule, EngineOptions, MarkdownEngine};
pub use error::BabelError;
pub use normalize::{preprocess, NormalizeOptions, Normalizer};
pub use postprocess::{postprocess, Postprocessor};

/// Nesting depth beyond which disclosure blocks are treated as malformed input.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 50;

/// Import raw user text into a document tree.
///
/// Runs the normalizer first, so legacy HTML `<details>` blocks come out as disclosure nodes.
pub fn import_markdown(raw: &str) -> Vec<Node> {
    MarkdownEngine::default().deserialize(&preprocess(raw))
}

/// Export a document tree to Markdown with embedded components.
pub fn export_markdown(nodes: &[Node]) -> Result<String, BabelError> {
    MarkdownEngine::default().serialize(nodes)
}

/// Export a document tree to Markdown with literal `<details>` HTML.
pub fn export_html(nodes: &[Node]) -> Result<String, BabelError> {
    export_markdown(nodes).map(|markdown| postprocess(&markdown))
}
