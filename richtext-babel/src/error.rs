//! Error types for conversion operations

use thiserror::Error;

/// Errors that can occur while converting documents
///
/// Malformed Markdown or HTML is not an error: the normalizer, the codec and the post-processor
/// repair or strip what they cannot read. These variants cover the remaining failure points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BabelError {
    /// Input could not be parsed at all
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Output could not be produced
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// A stored document tree did not match the wire format
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// Nesting exceeded the configured limit
    #[error("Nesting deeper than {0} levels")]
    TooDeep(usize),
}

impl From<serde_json::Error> for BabelError {
    fn from(err: serde_json::Error) -> Self {
        BabelError::InvalidDocument(err.to_string())
    }
}
