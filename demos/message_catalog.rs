//! Message catalog example.
//!
//! Loads an `ErrorSchema` from JSON text and shows the same validation
//! failure with raw codes and with human-readable messages. The catalog only
//! covers some fields; the rest pass their raw codes through.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p shapecheck-demos --example message_catalog
//! ```

use serde_json::json;
use shapecheck_core::{Check, ErrorSchema, FieldCheck, Schema, TypeTag, Validator};

const CATALOG: &str = r#"{
    "name": {
        "MISSING": "Name is required",
        "INVALID": "Name must be a string",
        "2": "Name must be at most 100 characters"
    },
    "age": "Age must be a number of at least 18",
    "address": {
        "city": "City is required"
    }
}"#;

fn signup_schema() -> Schema {
    Schema::new()
        .field(
            "name",
            FieldCheck::list([
                Check::from(TypeTag::String),
                Check::predicate(|v, _| v.as_str().is_some_and(|s| !s.is_empty())),
                Check::predicate(|v, _| v.as_str().is_some_and(|s| s.len() <= 100)),
            ]),
        )
        .field(
            "age",
            FieldCheck::list([
                Check::from(TypeTag::Number),
                Check::predicate(|v, _| v.as_i64().is_some_and(|n| n >= 18)),
            ]),
        )
        .field(
            "address",
            Schema::new()
                .field("city", TypeTag::String)
                .field("zip", FieldCheck::list([Check::Optional, Check::from(TypeTag::String)])),
        )
}

fn main() {
    let mut record = json!({
        "name": "A".repeat(101),
        "age": 17,
        "address": {},
    });

    let raw = Validator::new(signup_schema());
    if let Err(errors) = raw.validate(&mut record.clone()) {
        println!("raw codes:      {errors}");
    }

    let catalog: ErrorSchema = serde_json::from_str(CATALOG).unwrap();
    let friendly = Validator::new(signup_schema()).with_messages(catalog);
    if let Err(errors) = friendly.validate(&mut record) {
        println!("with messages:  {errors}");
    }
}
