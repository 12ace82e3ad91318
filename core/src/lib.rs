//! Runtime data-shape validation for JSON records.
//!
//! This crate checks a [`serde_json::Value`] record against a declarative
//! [`Schema`] and produces either the validated record or an [`ErrorTree`]
//! describing every failing field:
//!
//! - [`Schema`] — ordered mapping from field name to a [`FieldCheck`]
//!   descriptor: a runtime [`TypeTag`], a predicate, an ordered check list
//!   (which may carry the [`Check::Optional`] marker), or a nested schema.
//! - [`Validator`] — binds a schema and an optional [`ErrorSchema`] message
//!   catalog into a stateless, re-callable validate function.
//! - [`ErrorTree`] — schema-shaped error output built from the raw codes
//!   `MISSING`, `INVALID`, and `INVALID:<i>`.
//! - [`apply_messages`] — rewrites raw codes into caller-supplied text,
//!   passing unmapped fields through unchanged.
//!
//! Validation is synchronous and runs to completion in one call. Predicates
//! receive mutable access to the record and may rewrite it; the caller
//! observes those rewrites whether validation passes or fails.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use shapecheck_core::*;
//!
//! let validator = Validator::new(
//!     Schema::new()
//!         .field("name", FieldCheck::list([
//!             Check::from(TypeTag::String),
//!             Check::predicate(|name, _| name.as_str().is_some_and(|n| n.len() >= 3)),
//!         ]))
//!         .field("address", Schema::new().field("city", TypeTag::String)),
//! );
//!
//! let mut record = json!({ "name": "Ada", "address": { "city": "London" } });
//! assert!(validator.validate(&mut record).is_ok());
//!
//! let mut record = json!({ "name": "A" });
//! let errors = validator.validate(&mut record).unwrap_err();
//! assert_eq!(errors.to_value(), json!({
//!     "name": "INVALID:1",
//!     "address": { "city": "MISSING" },
//! }));
//! ```

mod error;
mod messages;
mod types;
mod validate;

pub use error::{ErrorCode, ErrorNode, ErrorTree};
pub use messages::{ErrorSchema, Matcher, MessageSpec, apply_messages};
pub use types::{Check, FieldCheck, Predicate, Schema, TypeTag};
pub use validate::{Validator, validate_record};
