//! JSON wire form of the document tree.
//!
//! The editor stores its value as a JSON array of block nodes. A single node object is accepted
//! too and treated as a one-block document.

use super::nodes::Node;
use crate::error::BabelError;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum Value {
    Document(Vec<Node>),
    Single(Node),
}

/// Decode a stored document tree.
pub fn from_json(source: &str) -> Result<Vec<Node>, BabelError> {
    match serde_json::from_str::<Value>(source) {
        Ok(Value::Document(nodes)) => Ok(nodes),
        Ok(Value::Single(node)) => Ok(vec![node]),
        // Re-run the strict decoder so the error names the offending field
        Err(_) => Ok(serde_json::from_str::<Vec<Node>>(source)?),
    }
}

/// Encode a document tree as pretty-printed JSON.
pub fn to_json(nodes: &[Node]) -> Result<String, BabelError> {
    Ok(serde_json::to_string_pretty(nodes)?)
}
