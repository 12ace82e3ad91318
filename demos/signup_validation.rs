//! Signup form validation example.
//!
//! Demonstrates the four descriptor kinds on one schema: bare type tags,
//! predicates, ordered check lists with the optional marker, and a nested
//! schema, plus a predicate that rewrites the record during validation.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p shapecheck-demos --example signup_validation
//! ```

use serde_json::json;
use shapecheck_core::{Check, FieldCheck, Schema, TypeTag, Validator};

fn main() {
    let validator = Validator::new(
        Schema::new()
            .field(
                "username",
                FieldCheck::list([
                    Check::from(TypeTag::String),
                    // Normalizes while validating; the rewrite sticks even
                    // when a later check fails.
                    Check::predicate(|name, record| {
                        let trimmed = name.as_str().unwrap_or_default().trim().to_string();
                        record["username"] = json!(trimmed);
                        true
                    }),
                    Check::predicate(|name, _| name.as_str().is_some_and(|n| n.len() >= 3)),
                    Check::predicate(|name, _| name.as_str().is_some_and(|n| n.len() <= 32)),
                ]),
            )
            .field(
                "email",
                FieldCheck::list([
                    Check::from(TypeTag::String),
                    Check::predicate(|email, _| email.as_str().is_some_and(|e| e.contains('@'))),
                ]),
            )
            .field(
                "newsletter",
                FieldCheck::list([Check::Optional, Check::from(TypeTag::Boolean)]),
            )
            .field(
                "address",
                Schema::new()
                    .field("city", TypeTag::String)
                    .field("zip", TypeTag::String),
            ),
    );

    let mut good = json!({
        "username": "  ada  ",
        "email": "ada@example.com",
        "address": { "city": "London", "zip": "NW1" },
    });
    match validator.validate(&mut good) {
        Ok(record) => println!("accepted: {record}"),
        Err(errors) => println!("rejected: {errors}"),
    }

    let mut bad = json!({
        "username": "a",
        "email": "not-an-email",
        "newsletter": "yes",
    });
    match validator.validate(&mut bad) {
        Ok(record) => println!("accepted: {record}"),
        Err(errors) => {
            println!("rejected: {errors}");
            println!("pretty:\n{}", serde_json::to_string_pretty(&errors).unwrap());
        }
    }
    // `bad` keeps the trimmed username even though validation failed.
    println!("record after validation: {bad}");
}
