//! Schema type definitions for record-shape validation.
//!
//! This module defines the data model used to describe the expected shape of
//! a record: runtime type tags, user predicates, ordered check lists with an
//! optional marker, and nested schemas. A [`Schema`] is built once with
//! [`Schema::field`] and reused across validations.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Runtime type tag for a field value.
///
/// Six tags map directly onto JSON value kinds. `Undefined`, `Symbol`,
/// `BigInt`, and `Function` have no JSON representation and never match any
/// value, so a field checked against one of them always fails; they stay in
/// the enum so tag sets round-trip through serde and schemas ported from
/// dynamic-language definitions remain expressible.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapecheck_core::TypeTag;
///
/// assert!(TypeTag::String.matches(&json!("hello")));
/// assert!(!TypeTag::String.matches(&json!(42)));
/// assert!(!TypeTag::BigInt.matches(&json!(42)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// JSON string.
    String,
    /// JSON number (integer or float).
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON null.
    Null,
    /// No JSON counterpart; never matches.
    Undefined,
    /// No JSON counterpart; never matches.
    Symbol,
    /// No JSON counterpart; never matches.
    BigInt,
    /// No JSON counterpart; never matches.
    Function,
    /// JSON object.
    Object,
    /// JSON array.
    Array,
}

impl TypeTag {
    /// Classifies a JSON value into its tag.
    ///
    /// Every value has exactly one tag, so the four tags without a JSON
    /// counterpart are never returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use shapecheck_core::TypeTag;
    ///
    /// assert_eq!(TypeTag::classify(&json!([1, 2])), TypeTag::Array);
    /// assert_eq!(TypeTag::classify(&json!(null)), TypeTag::Null);
    /// ```
    pub fn classify(value: &Value) -> TypeTag {
        match value {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Number(_) => TypeTag::Number,
            Value::String(_) => TypeTag::String,
            Value::Array(_) => TypeTag::Array,
            Value::Object(_) => TypeTag::Object,
        }
    }

    /// Checks whether a value has this tag.
    pub fn matches(self, value: &Value) -> bool {
        Self::classify(value) == self
    }

    /// Returns the lowercase tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Null => "null",
            TypeTag::Undefined => "undefined",
            TypeTag::Symbol => "symbol",
            TypeTag::BigInt => "bigint",
            TypeTag::Function => "function",
            TypeTag::Object => "object",
            TypeTag::Array => "array",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-supplied check invoked with a snapshot of the field value and
/// mutable access to the whole record.
///
/// Returning `false` fails the field. The record may be freely mutated and
/// the mutation persists whether or not the check passes. The first argument
/// is a copy of the field taken just before the call; to change the field,
/// write through the record.
pub type Predicate = Arc<dyn Fn(&Value, &mut Value) -> bool + Send + Sync>;

/// One element of an ordered check list.
#[derive(Clone)]
pub enum Check {
    /// Marks the field as optional: absence is not an error. Has no effect
    /// once the field is present.
    Optional,
    /// The field's runtime tag must equal this.
    Tag(TypeTag),
    /// User predicate over the field value and the whole record.
    Predicate(Predicate),
}

impl Check {
    /// Wraps a closure as a list element.
    ///
    /// # Examples
    ///
    /// ```
    /// use shapecheck_core::{Check, FieldCheck, Schema, TypeTag};
    ///
    /// let schema = Schema::new().field("name", FieldCheck::list([
    ///     Check::from(TypeTag::String),
    ///     Check::predicate(|name, _| name.as_str().is_some_and(|n| n.len() >= 3)),
    /// ]));
    /// assert_eq!(schema.len(), 1);
    /// ```
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value, &mut Value) -> bool + Send + Sync + 'static,
    {
        Check::Predicate(Arc::new(f))
    }
}

impl From<TypeTag> for Check {
    fn from(tag: TypeTag) -> Self {
        Check::Tag(tag)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Optional => f.write_str("Optional"),
            Check::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            Check::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// What a single schema field expects.
///
/// Descriptors are a closed set resolved at construction time, not by
/// structural inspection of the input. Conversions exist from [`TypeTag`],
/// `Vec<Check>`, and [`Schema`], so [`Schema::field`] accepts any of them
/// directly; use [`FieldCheck::predicate`] for a bare closure.
#[derive(Clone)]
pub enum FieldCheck {
    /// The field's runtime tag must equal this.
    Tag(TypeTag),
    /// Single predicate; a `false` result fails the field.
    Predicate(Predicate),
    /// Ordered check list, evaluated left-to-right, first failure wins.
    List(Vec<Check>),
    /// Nested schema validated against the field's value.
    Nested(Schema),
}

impl FieldCheck {
    /// Wraps a closure as a single-predicate descriptor.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use shapecheck_core::{FieldCheck, Schema, Validator};
    ///
    /// let validator = Validator::new(
    ///     Schema::new().field("tags", FieldCheck::predicate(|tags, _| tags.is_array())),
    /// );
    /// assert!(validator.validate(&mut json!({ "tags": [] })).is_ok());
    /// ```
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value, &mut Value) -> bool + Send + Sync + 'static,
    {
        FieldCheck::Predicate(Arc::new(f))
    }

    /// Builds an ordered check list.
    pub fn list<I>(checks: I) -> Self
    where
        I: IntoIterator<Item = Check>,
    {
        FieldCheck::List(checks.into_iter().collect())
    }

    /// True for a check list containing the optional marker.
    pub(crate) fn is_optional(&self) -> bool {
        matches!(
            self,
            FieldCheck::List(checks) if checks.iter().any(|c| matches!(c, Check::Optional))
        )
    }
}

impl From<TypeTag> for FieldCheck {
    fn from(tag: TypeTag) -> Self {
        FieldCheck::Tag(tag)
    }
}

impl From<Vec<Check>> for FieldCheck {
    fn from(checks: Vec<Check>) -> Self {
        FieldCheck::List(checks)
    }
}

impl From<Schema> for FieldCheck {
    fn from(schema: Schema) -> Self {
        FieldCheck::Nested(schema)
    }
}

impl fmt::Debug for FieldCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldCheck::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            FieldCheck::Predicate(_) => f.write_str("Predicate(..)"),
            FieldCheck::List(checks) => f.debug_tuple("List").field(checks).finish(),
            FieldCheck::Nested(schema) => f.debug_tuple("Nested").field(schema).finish(),
        }
    }
}

/// Ordered mapping from field name to its check descriptor.
///
/// Field order is declaration order; validation walks fields in this order
/// and never reports fields the schema does not declare. Predicates are
/// reference-counted, so cloning a schema is cheap. Schemas are not
/// serializable: predicates are arbitrary closures.
///
/// # Examples
///
/// ```
/// use shapecheck_core::{Check, FieldCheck, Schema, TypeTag};
///
/// let schema = Schema::new()
///     .field("name", TypeTag::String)
///     .field("age", FieldCheck::list([
///         Check::Optional,
///         Check::from(TypeTag::Number),
///     ]))
///     .field("address", Schema::new().field("city", TypeTag::String));
///
/// assert_eq!(schema.len(), 3);
/// let names: Vec<_> = schema.iter().map(|(name, _)| name).collect();
/// assert_eq!(names, vec!["name", "age", "address"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldCheck)>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Appends a field with its check descriptor.
    ///
    /// Declaring a name a second time replaces the earlier descriptor while
    /// keeping the field's original position.
    pub fn field(mut self, name: impl Into<String>, check: impl Into<FieldCheck>) -> Self {
        let name = name.into();
        let check = check.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = check,
            None => self.fields.push((name, check)),
        }
        self
    }

    /// Iterates fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldCheck)> {
        self.fields.iter().map(|(name, check)| (name.as_str(), check))
    }

    /// Returns the number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
