//! Message catalogs that rewrite raw error codes into human-readable text.
//!
//! An [`ErrorSchema`] mirrors the shape of the error trees a schema can
//! produce. [`apply_messages`] walks a raw tree alongside the catalog and
//! substitutes text wherever a mapping exists; every gap degrades to
//! pass-through of the raw code, so the rewrite always terminates with a
//! well-formed tree and never fabricates errors.
//!
//! Catalogs round-trip through the JSON object form, so they can live in
//! configuration files next to the code that owns the schema:
//!
//! ```
//! use shapecheck_core::ErrorSchema;
//!
//! let catalog: ErrorSchema = serde_json::from_str(r#"{
//!     "name": "Name is required",
//!     "age": { "MISSING": "Age is required", "INVALID": "Age must be a number" }
//! }"#).unwrap();
//! assert!(catalog.get("age").is_some());
//! ```

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::error::{ErrorCode, ErrorNode, ErrorTree};

/// Per-field message lookup for leaf codes.
///
/// Holds an optional message for each raw code kind plus indexed messages
/// for check-list positions. Lookup order for `INVALID:<i>` is the indexed
/// entry first, then the bare `invalid` entry, then pass-through of the raw
/// code.
///
/// # Examples
///
/// ```
/// use shapecheck_core::Matcher;
///
/// let matcher = Matcher::new()
///     .missing("Name is required")
///     .invalid("Name must be a string")
///     .at(2, "Name is too long");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Matcher {
    missing: Option<String>,
    invalid: Option<String>,
    at: Vec<(usize, String)>,
}

impl Matcher {
    /// Creates an empty matcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Message used when the field is absent.
    pub fn missing(mut self, text: impl Into<String>) -> Self {
        self.missing = Some(text.into());
        self
    }

    /// Message used when the field failed a bare check, and the fallback for
    /// list failures with no indexed entry.
    pub fn invalid(mut self, text: impl Into<String>) -> Self {
        self.invalid = Some(text.into());
        self
    }

    /// Message for the list check at `index` (zero-based).
    pub fn at(mut self, index: usize, text: impl Into<String>) -> Self {
        match self.at.iter_mut().find(|(existing, _)| *existing == index) {
            Some(slot) => slot.1 = text.into(),
            None => self.at.push((index, text.into())),
        }
        self
    }

    fn lookup(&self, code: ErrorCode) -> Option<&str> {
        match code {
            ErrorCode::Missing => self.missing.as_deref(),
            ErrorCode::Invalid => self.invalid.as_deref(),
            ErrorCode::InvalidAt(index) => self
                .at
                .iter()
                .find(|(existing, _)| *existing == index)
                .map(|(_, text)| text.as_str())
                .or(self.invalid.as_deref()),
        }
    }
}

/// What the catalog says about one field.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageSpec {
    /// Verbatim final message; overrides whatever the raw error was,
    /// including a whole sub-tree.
    Text(String),
    /// Per-code lookup for leaf errors.
    Matcher(Matcher),
    /// Catalog for the errors of a nested-schema field.
    Nested(ErrorSchema),
}

impl From<&str> for MessageSpec {
    fn from(text: &str) -> Self {
        MessageSpec::Text(text.to_string())
    }
}

impl From<String> for MessageSpec {
    fn from(text: String) -> Self {
        MessageSpec::Text(text)
    }
}

impl From<Matcher> for MessageSpec {
    fn from(matcher: Matcher) -> Self {
        MessageSpec::Matcher(matcher)
    }
}

impl From<ErrorSchema> for MessageSpec {
    fn from(catalog: ErrorSchema) -> Self {
        MessageSpec::Nested(catalog)
    }
}

/// Ordered mapping from field name to its message spec.
///
/// Fields absent from the catalog pass their raw codes through unchanged, so
/// a partially specified catalog yields a mix of human messages and machine
/// codes in the same tree.
///
/// # Examples
///
/// ```
/// use shapecheck_core::{ErrorSchema, Matcher};
///
/// let catalog = ErrorSchema::new()
///     .field("name", "Name is required")
///     .field("age", Matcher::new().missing("Age is required"))
///     .field("address", ErrorSchema::new().field("city", "City is required"));
/// assert_eq!(catalog.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorSchema {
    entries: Vec<(String, MessageSpec)>,
}

impl ErrorSchema {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Adds a message spec for a field.
    ///
    /// Declaring a name a second time replaces the earlier spec while
    /// keeping the field's original position.
    pub fn field(mut self, name: impl Into<String>, spec: impl Into<MessageSpec>) -> Self {
        let name = name.into();
        let spec = spec.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = spec,
            None => self.entries.push((name, spec)),
        }
        self
    }

    /// Looks up the spec for a field.
    pub fn get(&self, field: &str) -> Option<&MessageSpec> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == field)
            .map(|(_, spec)| spec)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MessageSpec)> {
        self.entries.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Returns the number of mapped fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no fields are mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rewrites raw codes in `errors` using `messages`.
///
/// The recursion is driven by the error tree: only fields present in the raw
/// tree appear in the output, and catalog entries without a raw counterpart
/// are never consulted.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapecheck_core::{apply_messages, ErrorCode, ErrorSchema, ErrorTree};
///
/// let mut errors = ErrorTree::new();
/// errors.insert("name", ErrorCode::Invalid);
/// errors.insert("age", ErrorCode::Missing);
///
/// let catalog = ErrorSchema::new().field("name", "Name must be a string");
/// let mapped = apply_messages(&errors, &catalog);
/// assert_eq!(mapped.to_value(), json!({
///     "name": "Name must be a string",
///     "age": "MISSING",
/// }));
/// ```
pub fn apply_messages(errors: &ErrorTree, messages: &ErrorSchema) -> ErrorTree {
    let mut mapped = ErrorTree::new();
    for (field, node) in errors.iter() {
        mapped.insert(field, map_node(node, messages.get(field)));
    }
    mapped
}

fn map_node(node: &ErrorNode, spec: Option<&MessageSpec>) -> ErrorNode {
    match (spec, node) {
        (None, node) => node.clone(),
        (Some(MessageSpec::Text(text)), _) => ErrorNode::Message(text.clone()),
        (Some(MessageSpec::Nested(sub)), ErrorNode::Tree(tree)) => {
            ErrorNode::Tree(apply_messages(tree, sub))
        }
        (Some(MessageSpec::Matcher(matcher)), ErrorNode::Code(code)) => {
            match matcher.lookup(*code) {
                Some(text) => ErrorNode::Message(text.to_string()),
                None => node.clone(),
            }
        }
        // Shapes the validator never pairs up for one field (a matcher
        // against a sub-tree, a nested catalog against a leaf).
        (Some(_), node) => node.clone(),
    }
}

impl Serialize for Matcher {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = usize::from(self.missing.is_some())
            + usize::from(self.invalid.is_some())
            + self.at.len();
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(text) = &self.missing {
            map.serialize_entry("MISSING", text)?;
        }
        if let Some(text) = &self.invalid {
            map.serialize_entry("INVALID", text)?;
        }
        for (index, text) in &self.at {
            map.serialize_entry(&index.to_string(), text)?;
        }
        map.end()
    }
}

impl Serialize for MessageSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MessageSpec::Text(text) => serializer.serialize_str(text),
            MessageSpec::Matcher(matcher) => matcher.serialize(serializer),
            MessageSpec::Nested(catalog) => catalog.serialize(serializer),
        }
    }
}

impl Serialize for ErrorSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, spec) in &self.entries {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ErrorSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        catalog_from_value(&value).map_err(de::Error::custom)
    }
}

fn catalog_from_value(value: &Value) -> Result<ErrorSchema, String> {
    let Some(object) = value.as_object() else {
        return Err("message catalog must be a JSON object".to_string());
    };
    let mut catalog = ErrorSchema::new();
    for (field, entry) in object {
        catalog = catalog.field(field, spec_from_value(field, entry)?);
    }
    Ok(catalog)
}

fn spec_from_value(field: &str, value: &Value) -> Result<MessageSpec, String> {
    match value {
        Value::String(text) => Ok(MessageSpec::Text(text.clone())),
        Value::Object(object) => {
            let matcher_keys = object.keys().filter(|key| is_matcher_key(key)).count();
            if matcher_keys == 0 {
                return catalog_from_value(value).map(MessageSpec::Nested);
            }
            if matcher_keys != object.len() {
                return Err(format!(
                    "field '{field}' mixes matcher keys with nested field names"
                ));
            }
            let mut matcher = Matcher::new();
            for (key, entry) in object {
                let Some(text) = entry.as_str() else {
                    return Err(format!("matcher entry '{field}.{key}' must be a string"));
                };
                matcher = match key.as_str() {
                    "MISSING" => matcher.missing(text),
                    "INVALID" => matcher.invalid(text),
                    index => {
                        let index = index.parse::<usize>().map_err(|_| {
                            format!("matcher entry '{field}.{key}' has a non-numeric index")
                        })?;
                        matcher.at(index, text)
                    }
                };
            }
            Ok(MessageSpec::Matcher(matcher))
        }
        other => Err(format!(
            "field '{field}' must map to a string or an object, got {other}"
        )),
    }
}

fn is_matcher_key(key: &str) -> bool {
    key == "MISSING" || key == "INVALID" || (!key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()))
}
