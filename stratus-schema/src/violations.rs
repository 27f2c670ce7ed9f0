//! Field-path trees reporting every validation failure in a payload.

use serde::Serialize;
use std::collections::BTreeMap;

/// One step of a field path inside a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
    Key(&'static str),
    Index(usize),
}

/// Machine-readable tree of validation failures, mirroring the payload shape.
///
/// Empty collections are omitted from serialization, so a leaf serializes as
/// `{"errors": ["..."]}` and intermediate nodes carry only the branches that
/// actually failed. Array positions land under `items`, keyed by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViolationTree {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, ViolationTree>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub items: BTreeMap<usize, ViolationTree>,
}

impl ViolationTree {
    /// Records `message` at `path`, creating intermediate nodes as needed.
    pub fn push(&mut self, path: &[PathSegment], message: impl Into<String>) {
        let mut node = self;
        for segment in path {
            node = match segment {
                PathSegment::Key(key) => node.properties.entry((*key).to_string()).or_default(),
                PathSegment::Index(index) => node.items.entry(*index).or_default(),
            };
        }
        node.errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.properties.is_empty() && self.items.is_empty()
    }

    /// Subtree recorded beneath the top-level field `key`, if any.
    pub fn property(&self, key: &str) -> Option<&ViolationTree> {
        self.properties.get(key)
    }
}
