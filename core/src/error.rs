//! Error tree produced by validation.
//!
//! A validation failure is an ordinary value, not an exception: an ordered
//! tree mirroring the failing subset of the schema, with a leaf code or a
//! substituted message at each failing field and a sub-tree wherever a
//! nested schema failed. An empty tree denotes success.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Raw leaf code attached to a failing field.
///
/// The taxonomy is exhaustive: nested-schema mismatches surface as a
/// sub-tree, never as a leaf code. The `Display` form is the code's wire
/// string, which is also how leaves serialize.
///
/// # Examples
///
/// ```
/// use shapecheck_core::ErrorCode;
///
/// assert_eq!(ErrorCode::Missing.to_string(), "MISSING");
/// assert_eq!(ErrorCode::InvalidAt(2).to_string(), "INVALID:2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorCode {
    /// Required field absent from the record.
    #[error("MISSING")]
    Missing,
    /// Field present but failed a bare tag or predicate check.
    #[error("INVALID")]
    Invalid,
    /// Field present but failed the check at this zero-based list index.
    #[error("INVALID:{0}")]
    InvalidAt(usize),
}

/// One entry of an [`ErrorTree`].
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorNode {
    /// Raw leaf code.
    Code(ErrorCode),
    /// Caller-supplied message substituted for a raw error.
    Message(String),
    /// Errors of a nested-schema field.
    Tree(ErrorTree),
}

impl From<ErrorCode> for ErrorNode {
    fn from(code: ErrorCode) -> Self {
        ErrorNode::Code(code)
    }
}

impl From<ErrorTree> for ErrorNode {
    fn from(tree: ErrorTree) -> Self {
        ErrorNode::Tree(tree)
    }
}

impl ErrorNode {
    fn to_value(&self) -> Value {
        match self {
            ErrorNode::Code(code) => Value::String(code.to_string()),
            ErrorNode::Message(text) => Value::String(text.clone()),
            ErrorNode::Tree(tree) => tree.to_value(),
        }
    }
}

impl Serialize for ErrorNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ErrorNode::Code(code) => serializer.collect_str(code),
            ErrorNode::Message(text) => serializer.serialize_str(text),
            ErrorNode::Tree(tree) => tree.serialize(serializer),
        }
    }
}

/// Ordered mapping from field name to what went wrong there.
///
/// The tree's shape is always a subset of the schema's shape: only declared
/// fields that were actually checked (or found missing) appear. Entries keep
/// the schema's declaration order.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapecheck_core::{ErrorCode, ErrorTree};
///
/// let mut tree = ErrorTree::new();
/// tree.insert("name", ErrorCode::Missing);
/// assert_eq!(tree.to_value(), json!({ "name": "MISSING" }));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorTree {
    entries: Vec<(String, ErrorNode)>,
}

impl ErrorTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Attaches a node under a field name, replacing an earlier entry for
    /// the same field while keeping its position.
    pub fn insert(&mut self, field: impl Into<String>, node: impl Into<ErrorNode>) {
        let field = field.into();
        let node = node.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == field) {
            Some(slot) => slot.1 = node,
            None => self.entries.push((field, node)),
        }
    }

    /// Looks up the node recorded for a field.
    pub fn get(&self, field: &str) -> Option<&ErrorNode> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == field)
            .map(|(_, node)| node)
    }

    /// True when no field failed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of failing fields at this level.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ErrorNode)> {
        self.entries.iter().map(|(field, node)| (field.as_str(), node))
    }

    /// JSON form of the tree: leaf codes and messages as strings, nested
    /// trees as objects.
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (field, node) in &self.entries {
            map.insert(field.clone(), node.to_value());
        }
        Value::Object(map)
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl std::error::Error for ErrorTree {}

impl Serialize for ErrorTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, node) in &self.entries {
            map.serialize_entry(field, node)?;
        }
        map.end()
    }
}
