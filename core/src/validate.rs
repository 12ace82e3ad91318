//! Record validation against a [`Schema`].
//!
//! Two passes over the schema shape, both plain recursions bounded only by
//! schema nesting: the walk in [`validate_record`] producing a raw
//! [`ErrorTree`], and, when a message catalog is configured on the
//! [`Validator`], the rewrite pass in
//! [`apply_messages`](crate::apply_messages).

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{ErrorCode, ErrorTree};
use crate::messages::{ErrorSchema, apply_messages};
use crate::types::{Check, FieldCheck, Schema, TypeTag};

/// Binds a schema and an optional message catalog into a reusable validate
/// function.
///
/// A validator is stateless: nothing persists between calls, and one
/// instance may be shared across threads. Construction cannot fail at
/// runtime; structurally invalid schemas are unrepresentable.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapecheck_core::{Schema, TypeTag, Validator};
///
/// let validator = Validator::new(
///     Schema::new()
///         .field("name", TypeTag::String)
///         .field("age", TypeTag::Number),
/// );
///
/// let mut record = json!({ "name": "Ada", "age": 36 });
/// assert!(validator.validate(&mut record).is_ok());
///
/// let mut record = json!({ "age": 36 });
/// let errors = validator.validate(&mut record).unwrap_err();
/// assert_eq!(errors.to_value(), json!({ "name": "MISSING" }));
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Schema,
    messages: Option<ErrorSchema>,
}

impl Validator {
    /// Creates a validator for a schema.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            messages: None,
        }
    }

    /// Adds a message catalog applied to every non-empty error tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use shapecheck_core::{ErrorSchema, Schema, TypeTag, Validator};
    ///
    /// let validator = Validator::new(Schema::new().field("name", TypeTag::String))
    ///     .with_messages(ErrorSchema::new().field("name", "Name is required"));
    ///
    /// let errors = validator.validate(&mut json!({})).unwrap_err();
    /// assert_eq!(errors.to_value(), json!({ "name": "Name is required" }));
    /// ```
    pub fn with_messages(mut self, messages: ErrorSchema) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Validates a record in place.
    ///
    /// On success the same `record` reference comes back in the `Ok` slot;
    /// the record is never cloned. On failure the error tree describes every
    /// failing field, with catalog messages substituted when one is
    /// configured. Predicate side effects persist in `record` in both
    /// outcomes.
    ///
    /// Field membership is only queryable on JSON objects; a record of any
    /// other kind is treated as having no fields, so every required field
    /// reports `MISSING`.
    pub fn validate<'a>(&self, record: &'a mut Value) -> Result<&'a mut Value, ErrorTree> {
        let errors = validate_record(record, &self.schema);
        debug!(
            fields = self.schema.len(),
            failed = errors.len(),
            "validation finished"
        );
        if errors.is_empty() {
            return Ok(record);
        }
        Err(match &self.messages {
            Some(messages) => apply_messages(&errors, messages),
            None => errors,
        })
    }
}

/// Walks `schema` against `record` and returns the raw error tree.
///
/// Fields are visited in declaration order, each at most once; record fields
/// the schema does not declare are ignored and never reported. An empty tree
/// means the record is valid.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapecheck_core::{Schema, TypeTag, validate_record};
///
/// let schema = Schema::new().field("age", TypeTag::Number);
/// let mut record = json!({ "age": "36", "extra": true });
/// let errors = validate_record(&mut record, &schema);
/// assert_eq!(errors.to_value(), json!({ "age": "INVALID" }));
/// ```
pub fn validate_record(record: &mut Value, schema: &Schema) -> ErrorTree {
    let mut errors = ErrorTree::new();

    for (name, check) in schema.iter() {
        let present = record
            .as_object()
            .is_some_and(|object| object.contains_key(name));

        if !present {
            if check.is_optional() {
                continue;
            }
            match check {
                FieldCheck::Nested(nested) => {
                    trace!(field = %name, "absent nested field");
                    errors.insert(name, missing_tree(nested));
                }
                _ => {
                    trace!(field = %name, "absent required field");
                    errors.insert(name, ErrorCode::Missing);
                }
            }
            continue;
        }

        match check {
            FieldCheck::Tag(tag) => {
                if !field_has_tag(record, name, *tag) {
                    trace!(field = %name, expected = %tag, "tag mismatch");
                    errors.insert(name, ErrorCode::Invalid);
                }
            }
            FieldCheck::Predicate(predicate) => {
                let value = snapshot(record, name);
                if !predicate(&value, record) {
                    trace!(field = %name, "predicate failed");
                    errors.insert(name, ErrorCode::Invalid);
                }
            }
            FieldCheck::List(checks) => {
                if let Some(code) = run_checks(record, name, checks) {
                    errors.insert(name, code);
                }
            }
            FieldCheck::Nested(nested) => {
                if let Some(child) = record.get_mut(name) {
                    let sub = validate_record(child, nested);
                    if !sub.is_empty() {
                        errors.insert(name, sub);
                    }
                }
            }
        }
    }

    errors
}

/// Runs an ordered check list against one field.
///
/// Left-to-right; the first failing element wins and later elements never
/// run, so a predicate after a failure is guaranteed not to fire. The field
/// is re-read before every element, making a rewrite by an earlier predicate
/// visible to the checks after it.
fn run_checks(record: &mut Value, name: &str, checks: &[Check]) -> Option<ErrorCode> {
    for (index, check) in checks.iter().enumerate() {
        match check {
            Check::Optional => {}
            Check::Tag(tag) => {
                if !field_has_tag(record, name, *tag) {
                    trace!(field = %name, index, expected = %tag, "list tag mismatch");
                    return Some(ErrorCode::InvalidAt(index));
                }
            }
            Check::Predicate(predicate) => {
                let value = snapshot(record, name);
                if !predicate(&value, record) {
                    trace!(field = %name, index, "list predicate failed");
                    return Some(ErrorCode::InvalidAt(index));
                }
            }
        }
    }
    None
}

/// Expands an absent nested-schema field into the sub-tree the caller sees:
/// `MISSING` at every leaf not guarded by the optional marker, recursing
/// through deeper nested schemas.
fn missing_tree(schema: &Schema) -> ErrorTree {
    let mut errors = ErrorTree::new();
    for (name, check) in schema.iter() {
        match check {
            FieldCheck::Nested(nested) => errors.insert(name, missing_tree(nested)),
            check if check.is_optional() => {}
            _ => errors.insert(name, ErrorCode::Missing),
        }
    }
    errors
}

fn field_has_tag(record: &Value, name: &str, tag: TypeTag) -> bool {
    record.get(name).is_some_and(|value| tag.matches(value))
}

// A field cannot be borrowed shared while the whole record is borrowed
// mutable, so predicates get a copy of the field taken just before the call.
fn snapshot(record: &Value, name: &str) -> Value {
    record.get(name).cloned().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    #[test]
    fn test_valid_record_passes() {
        let validator = Validator::new(
            Schema::new()
                .field("name", TypeTag::String)
                .field("age", TypeTag::Number),
        );
        let mut record = json!({ "name": "John", "age": 30 });
        let validated = validator.validate(&mut record).unwrap();
        assert_eq!(*validated, json!({ "name": "John", "age": 30 }));
    }

    #[test]
    fn test_missing_required_field() {
        let validator = Validator::new(
            Schema::new()
                .field("name", TypeTag::String)
                .field("age", TypeTag::Number),
        );
        let errors = validator.validate(&mut json!({ "age": 30 })).unwrap_err();
        assert_eq!(errors.to_value(), json!({ "name": "MISSING" }));
    }

    #[test]
    fn test_bare_tag_mismatch() {
        let validator = Validator::new(Schema::new().field("age", TypeTag::Number));
        let errors = validator.validate(&mut json!({ "age": "10" })).unwrap_err();
        assert_eq!(errors.to_value(), json!({ "age": "INVALID" }));
    }

    #[test]
    fn test_undeclared_fields_are_ignored() {
        let validator = Validator::new(Schema::new().field("name", TypeTag::String));
        let mut record = json!({ "name": "Ada", "extra": 1, "more": [] });
        assert!(validator.validate(&mut record).is_ok());
    }

    #[test]
    fn test_every_json_tag_accepts_its_kind() {
        let validator = Validator::new(
            Schema::new()
                .field("string", TypeTag::String)
                .field("number", TypeTag::Number)
                .field("boolean", TypeTag::Boolean)
                .field("null", TypeTag::Null)
                .field("object", TypeTag::Object)
                .field("array", TypeTag::Array),
        );
        let mut record = json!({
            "string": "s",
            "number": 1,
            "boolean": true,
            "null": null,
            "object": {},
            "array": [],
        });
        assert!(validator.validate(&mut record).is_ok());
    }

    #[test]
    fn test_every_json_tag_rejects_other_kinds() {
        let validator = Validator::new(
            Schema::new()
                .field("string", TypeTag::String)
                .field("number", TypeTag::Number)
                .field("boolean", TypeTag::Boolean)
                .field("null", TypeTag::Null)
                .field("object", TypeTag::Object)
                .field("array", TypeTag::Array),
        );
        let mut record = json!({
            "string": 1,
            "number": "1",
            "boolean": "true",
            "null": 0,
            "object": "object",
            "array": {},
        });
        let errors = validator.validate(&mut record).unwrap_err();
        assert_eq!(
            errors.to_value(),
            json!({
                "string": "INVALID",
                "number": "INVALID",
                "boolean": "INVALID",
                "null": "INVALID",
                "object": "INVALID",
                "array": "INVALID",
            })
        );
    }

    #[test]
    fn test_tags_without_json_counterpart_always_fail() {
        let validator = Validator::new(
            Schema::new()
                .field("undefined", TypeTag::Undefined)
                .field("symbol", TypeTag::Symbol)
                .field("bigint", TypeTag::BigInt)
                .field("function", TypeTag::Function),
        );
        let mut record = json!({
            "undefined": null,
            "symbol": "symbol",
            "bigint": 1,
            "function": {},
        });
        let errors = validator.validate(&mut record).unwrap_err();
        assert_eq!(
            errors.to_value(),
            json!({
                "undefined": "INVALID",
                "symbol": "INVALID",
                "bigint": "INVALID",
                "function": "INVALID",
            })
        );
    }

    #[test]
    fn test_absent_nested_schema_expands_to_full_subtree() {
        let validator = Validator::new(Schema::new().field(
            "nested",
            Schema::new()
                .field("name", TypeTag::String)
                .field("array", FieldCheck::predicate(|value, _| value.is_array())),
        ));
        let errors = validator.validate(&mut json!({})).unwrap_err();
        assert_eq!(
            errors.to_value(),
            json!({ "nested": { "name": "MISSING", "array": "MISSING" } })
        );
    }

    #[test]
    fn test_partial_nested_presence_reports_remaining_leaves() {
        let validator = Validator::new(Schema::new().field(
            "nested",
            Schema::new()
                .field("name", TypeTag::String)
                .field("array", FieldCheck::predicate(|value, _| value.is_array())),
        ));
        let errors = validator
            .validate(&mut json!({ "nested": { "name": "Dan" } }))
            .unwrap_err();
        assert_eq!(errors.to_value(), json!({ "nested": { "array": "MISSING" } }));
    }

    #[test]
    fn test_doubly_nested_missing_field() {
        let validator = Validator::new(Schema::new().field(
            "nested",
            Schema::new().field("nested", Schema::new().field("name", TypeTag::String)),
        ));

        let errors = validator.validate(&mut json!({})).unwrap_err();
        assert_eq!(
            errors.to_value(),
            json!({ "nested": { "nested": { "name": "MISSING" } } })
        );

        let errors = validator.validate(&mut json!({ "nested": {} })).unwrap_err();
        assert_eq!(
            errors.to_value(),
            json!({ "nested": { "nested": { "name": "MISSING" } } })
        );
    }

    #[test]
    fn test_list_checks_report_the_failing_index() {
        let validator = Validator::new(
            Schema::new()
                .field(
                    "name",
                    FieldCheck::list([
                        Check::from(TypeTag::String),
                        Check::predicate(|v, _| v.as_str().is_some_and(|s| s.len() >= 3)),
                        Check::predicate(|v, _| v.as_str().is_some_and(|s| s.len() <= 100)),
                    ]),
                )
                .field(
                    "age",
                    FieldCheck::list([
                        Check::from(TypeTag::Number),
                        Check::Optional,
                        Check::predicate(|v, _| v.as_i64().is_some_and(|n| n >= 18)),
                    ]),
                )
                .field(
                    "email",
                    FieldCheck::list([Check::Optional, Check::from(TypeTag::String)]),
                ),
        );

        let mut record = json!({ "name": "Dan", "age": 30 });
        assert!(validator.validate(&mut record).is_ok());

        let errors = validator
            .validate(&mut json!({ "name": "Dan", "age": 17 }))
            .unwrap_err();
        assert_eq!(errors.to_value(), json!({ "age": "INVALID:2" }));

        let mut record = json!({ "name": "Dan", "email": "foo@example.com" });
        assert!(validator.validate(&mut record).is_ok());

        let errors = validator.validate(&mut json!({ "name": "A" })).unwrap_err();
        assert_eq!(errors.to_value(), json!({ "name": "INVALID:1" }));

        let errors = validator.validate(&mut json!({})).unwrap_err();
        assert_eq!(errors.to_value(), json!({ "name": "MISSING" }));

        let errors = validator.validate(&mut json!({ "name": 100 })).unwrap_err();
        assert_eq!(errors.to_value(), json!({ "name": "INVALID:0" }));
    }

    #[test]
    fn test_failed_check_stops_the_list() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let validator = Validator::new(Schema::new().field(
            "name",
            FieldCheck::list([
                Check::from(TypeTag::String),
                Check::predicate(|_, _| false),
                Check::predicate(move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    true
                }),
            ]),
        ));

        let errors = validator.validate(&mut json!({ "name": "Dan" })).unwrap_err();
        assert_eq!(errors.to_value(), json!({ "name": "INVALID:1" }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_optional_suppresses_missing_but_not_invalid() {
        let validator = Validator::new(Schema::new().field(
            "email",
            FieldCheck::list([Check::Optional, Check::from(TypeTag::String)]),
        ));

        assert!(validator.validate(&mut json!({})).is_ok());

        let errors = validator.validate(&mut json!({ "email": 1 })).unwrap_err();
        assert_eq!(errors.to_value(), json!({ "email": "INVALID:1" }));
    }

    #[test]
    fn test_predicate_mutations_persist_on_failure() {
        let validator = Validator::new(Schema::new().field(
            "name",
            FieldCheck::predicate(|value, record| {
                let name = value.as_str().unwrap_or_default();
                record["name"] = json!(format!("{name}!"));
                record["foo"] = json!("bar");
                false
            }),
        ));

        let mut record = json!({ "name": "Dan" });
        let errors = validator.validate(&mut record).unwrap_err();
        assert_eq!(errors.to_value(), json!({ "name": "INVALID" }));
        assert_eq!(record, json!({ "name": "Dan!", "foo": "bar" }));
    }

    #[test]
    fn test_predicate_mutations_persist_on_success() {
        let validator = Validator::new(Schema::new().field(
            "name",
            FieldCheck::predicate(|value, record| {
                let name = value.as_str().unwrap_or_default();
                record["name"] = json!(format!("{name}!"));
                record["foo"] = json!("bar");
                true
            }),
        ));

        let mut record = json!({ "name": "Dan" });
        assert!(validator.validate(&mut record).is_ok());
        assert_eq!(record, json!({ "name": "Dan!", "foo": "bar" }));
    }

    #[test]
    fn test_predicate_reads_sibling_fields() {
        let validator = Validator::new(
            Schema::new()
                .field("min", TypeTag::Number)
                .field(
                    "max",
                    FieldCheck::predicate(|value, record| {
                        let min = record["min"].as_i64().unwrap_or(0);
                        value.as_i64().is_some_and(|max| max >= min)
                    }),
                ),
        );

        assert!(validator.validate(&mut json!({ "min": 1, "max": 2 })).is_ok());

        let errors = validator
            .validate(&mut json!({ "min": 5, "max": 2 }))
            .unwrap_err();
        assert_eq!(errors.to_value(), json!({ "max": "INVALID" }));
    }

    #[test]
    fn test_later_list_checks_see_earlier_rewrites() {
        let validator = Validator::new(Schema::new().field(
            "name",
            FieldCheck::list([
                Check::predicate(|_, record| {
                    record["name"] = json!("rewritten");
                    true
                }),
                Check::predicate(|value, _| value == &json!("rewritten")),
            ]),
        ));

        let mut record = json!({ "name": "original" });
        assert!(validator.validate(&mut record).is_ok());
        assert_eq!(record, json!({ "name": "rewritten" }));
    }

    #[test]
    fn test_non_object_record_reports_all_required_fields() {
        let validator = Validator::new(
            Schema::new()
                .field("name", TypeTag::String)
                .field(
                    "email",
                    FieldCheck::list([Check::Optional, Check::from(TypeTag::String)]),
                ),
        );

        let errors = validator.validate(&mut json!(42)).unwrap_err();
        assert_eq!(errors.to_value(), json!({ "name": "MISSING" }));
    }

    #[test]
    fn test_validation_is_idempotent_without_side_effects() {
        let validator = Validator::new(
            Schema::new()
                .field("name", TypeTag::String)
                .field("age", TypeTag::Number),
        );
        let mut record = json!({ "name": "Ada", "age": 36 });
        let first = validator.validate(&mut record).map(|v| v.clone());
        let second = validator.validate(&mut record).map(|v| v.clone());
        assert_eq!(first, second);
        assert_eq!(record, json!({ "name": "Ada", "age": 36 }));
    }

    #[test]
    fn test_absent_all_optional_nested_schema_still_rejects() {
        let validator = Validator::new(Schema::new().field(
            "nested",
            Schema::new().field(
                "name",
                FieldCheck::list([Check::Optional, Check::from(TypeTag::String)]),
            ),
        ));

        let errors = validator.validate(&mut json!({})).unwrap_err();
        assert_eq!(errors.to_value(), json!({ "nested": {} }));
    }

    #[test]
    fn test_nested_predicates_receive_the_nested_record() {
        let validator = Validator::new(Schema::new().field(
            "nested",
            Schema::new().field(
                "name",
                FieldCheck::predicate(|_, record| {
                    record["stamped"] = json!(true);
                    true
                }),
            ),
        ));

        let mut record = json!({ "nested": { "name": "Dan" }, "stamped": false });
        assert!(validator.validate(&mut record).is_ok());
        // The predicate's record is the nested object, not the root.
        assert_eq!(
            record,
            json!({ "nested": { "name": "Dan", "stamped": true }, "stamped": false })
        );
    }
}
