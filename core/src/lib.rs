//! Composable, chainable schema validation.
//!
//! A schema is an immutable, ordered list of constraints plus an optional
//! flag and an output transform. Chaining a constraint or modifier returns a
//! new schema of the same kind, so schemas can be built once and shared as
//! templates:
//!
//! - [`StringSchema`], [`NumberSchema`], [`BooleanSchema`] check statically
//!   typed scalars.
//! - [`ArraySchema`] and [`ObjectSchema`] check JSON values, recursing into
//!   item and field schemas and reporting failures in an [`Issues`] map
//!   keyed by index, field name, or [`ROOT`].
//!
//! Every schema exposes four entry points through the [`Schema`] trait:
//! [`validate`](Schema::validate) (first error), [`validate_all`](Schema::validate_all)
//! (every error), [`parse`](Schema::parse) (`Result`) and
//! [`safe_parse`](Schema::safe_parse) ([`SafeParse`]). The `_optional`
//! variants of the last two accept a missing value, and [`AnySchema`] offers
//! the same parse over untyped JSON.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use valchain_core::*;
//!
//! let user = object(
//!     Shape::new()
//!         .field("name", string().required().max(40))
//!         .field("email", string().required().email())
//!         .field("roles", array(string().min(1)).nonempty().unique()),
//! );
//!
//! let ok = json!({"name": "Ada", "email": "ada@example.com", "roles": ["admin"]});
//! assert!(user.safe_parse(&ok).is_success());
//!
//! let bad = json!({"name": " ", "email": "ada", "roles": ["admin", "admin"]});
//! assert_eq!(
//!     user.validate_all(Some(&bad)),
//!     vec![
//!         "name: Required",
//!         "email: Invalid email address",
//!         r#"roles: {"root":"Duplicate items at index 0 and 1"}"#,
//!     ]
//! );
//! ```

mod array;
mod boolean;
mod constraint;
mod error;
mod number;
mod object;
mod schema;
mod string;
mod value;

pub use array::{ArraySchema, NOT_AN_ARRAY};
pub use boolean::BooleanSchema;
pub use constraint::Constraint;
pub use error::{Issues, ROOT, SafeParse, ValidationError};
pub use number::NumberSchema;
pub use object::{NOT_AN_OBJECT, ObjectSchema, Shape};
pub use schema::{AnySchema, Core, INVALID, REQUIRED, Schema};
pub use string::StringSchema;
pub use value::{Blank, FromJson};

/// Creates an empty string schema.
pub fn string() -> StringSchema {
    StringSchema::new()
}

/// Creates an empty number schema.
pub fn number() -> NumberSchema {
    NumberSchema::new()
}

/// Creates an empty boolean schema.
pub fn boolean() -> BooleanSchema {
    BooleanSchema::new()
}

/// Creates an array schema whose elements are checked by `item`.
pub fn array(item: impl AnySchema + 'static) -> ArraySchema {
    ArraySchema::new(item)
}

/// Creates an object schema for `shape`.
pub fn object(shape: Shape) -> ObjectSchema {
    ObjectSchema::new(shape)
}
