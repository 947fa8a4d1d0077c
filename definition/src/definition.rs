//! Declarative schema definitions.
//!
//! A [`SchemaDefinition`] is the serializable form of a core schema: a kind,
//! an `optional` flag and an ordered list of checks. Compiling it replays the
//! checks, in order, as builder calls on the matching core schema.
//!
//! # Example YAML
//!
//! ```yaml
//! type: object
//! fields:
//!   - name: email
//!     schema:
//!       type: string
//!       checks:
//!         - rule: required
//!           message: Email is required
//!         - rule: email
//!   - name: tags
//!     schema:
//!       type: array
//!       optional: true
//!       items: { type: string, checks: [{ rule: min, value: 1 }] }
//!       checks:
//!         - rule: unique
//! ```

use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use valchain_core::{
    AnySchema, ArraySchema, BooleanSchema, NumberSchema, ObjectSchema, Schema, Shape,
    StringSchema, boolean, number, object, string,
};

use crate::error::{DefinitionError, Result};

/// Serializable description of a schema, tagged by `type`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use valchain_definition::SchemaDefinition;
///
/// let yaml = r#"
/// type: number
/// checks:
///   - rule: integer
///   - rule: min
///     value: 18
///     message: Adults only
/// "#;
/// let definition: SchemaDefinition = serde_yaml::from_str(yaml).unwrap();
/// let schema = definition.compile().unwrap();
///
/// assert_eq!(schema.check(Some(&json!(21))), None);
/// assert_eq!(schema.check(Some(&json!(12))), Some("Adults only".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaDefinition {
    String(StringDefinition),
    Number(NumberDefinition),
    Boolean(BooleanDefinition),
    Array(ArrayDefinition),
    Object(ObjectDefinition),
}

impl SchemaDefinition {
    /// Compiles the definition into a shareable schema.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidPattern`] if any nested `regex`
    /// check does not compile.
    pub fn compile(&self) -> Result<Arc<dyn AnySchema>> {
        Ok(match self {
            Self::String(definition) => definition.compile()?.into_any(),
            Self::Number(definition) => definition.compile().into_any(),
            Self::Boolean(definition) => definition.compile().into_any(),
            Self::Array(definition) => definition.compile()?.into_any(),
            Self::Object(definition) => definition.compile()?.into_any(),
        })
    }

    /// Whether absent values are accepted.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::String(definition) => definition.optional,
            Self::Number(definition) => definition.optional,
            Self::Boolean(definition) => definition.optional,
            Self::Array(definition) => definition.optional,
            Self::Object(definition) => definition.optional,
        }
    }

    /// The `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

fn relabel<S: Schema>(schema: S, message: Option<&str>) -> S {
    match message {
        Some(message) => schema.message(message),
        None => schema,
    }
}

fn finish<S: Schema>(schema: S, optional: bool) -> S {
    if optional { schema.optional() } else { schema }
}

// ---------------------------------------------------------------------------
// String
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringDefinition {
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub checks: Vec<StringCheck>,
}

/// A string rule, tagged by `rule`. Every rule accepts an optional
/// `message` overriding its default message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum StringCheck {
    Required { message: Option<String> },
    Min { value: usize, message: Option<String> },
    Max { value: usize, message: Option<String> },
    Length { value: usize, message: Option<String> },
    Regex { pattern: String, message: Option<String> },
    StartsWith { value: String, message: Option<String> },
    EndsWith { value: String, message: Option<String> },
    Includes { value: String, message: Option<String> },
    Email { message: Option<String> },
    Url { message: Option<String> },
}

impl StringCheck {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Required { message }
            | Self::Min { message, .. }
            | Self::Max { message, .. }
            | Self::Length { message, .. }
            | Self::Regex { message, .. }
            | Self::StartsWith { message, .. }
            | Self::EndsWith { message, .. }
            | Self::Includes { message, .. }
            | Self::Email { message }
            | Self::Url { message } => message.as_deref(),
        }
    }
}

impl StringDefinition {
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidPattern`] for a bad `regex` check.
    pub fn compile(&self) -> Result<StringSchema> {
        let mut schema = string();
        for check in &self.checks {
            schema = match check {
                StringCheck::Required { .. } => schema.required(),
                StringCheck::Min { value, .. } => schema.min(*value),
                StringCheck::Max { value, .. } => schema.max(*value),
                StringCheck::Length { value, .. } => schema.length(*value),
                StringCheck::Regex { pattern, .. } => schema.regex(compile_pattern(pattern)?),
                StringCheck::StartsWith { value, .. } => schema.starts_with(value.as_str()),
                StringCheck::EndsWith { value, .. } => schema.ends_with(value.as_str()),
                StringCheck::Includes { value, .. } => schema.includes(value.as_str()),
                StringCheck::Email { .. } => schema.email(),
                StringCheck::Url { .. } => schema.url(),
            };
            schema = relabel(schema, check.message());
        }
        Ok(finish(schema, self.optional))
    }
}

pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| DefinitionError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Number
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberDefinition {
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub checks: Vec<NumberCheck>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum NumberCheck {
    Required { message: Option<String> },
    Integer { message: Option<String> },
    Min { value: f64, message: Option<String> },
    Max { value: f64, message: Option<String> },
    Positive { message: Option<String> },
    Negative { message: Option<String> },
    Nonnegative { message: Option<String> },
    MultipleOf { value: f64, message: Option<String> },
    Finite { message: Option<String> },
}

impl NumberCheck {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Required { message }
            | Self::Integer { message }
            | Self::Min { message, .. }
            | Self::Max { message, .. }
            | Self::Positive { message }
            | Self::Negative { message }
            | Self::Nonnegative { message }
            | Self::MultipleOf { message, .. }
            | Self::Finite { message } => message.as_deref(),
        }
    }
}

impl NumberDefinition {
    pub fn compile(&self) -> NumberSchema {
        let mut schema = number();
        for check in &self.checks {
            schema = match check {
                NumberCheck::Required { .. } => schema.required(),
                NumberCheck::Integer { .. } => schema.integer(),
                NumberCheck::Min { value, .. } => schema.min(*value),
                NumberCheck::Max { value, .. } => schema.max(*value),
                NumberCheck::Positive { .. } => schema.positive(),
                NumberCheck::Negative { .. } => schema.negative(),
                NumberCheck::Nonnegative { .. } => schema.nonnegative(),
                NumberCheck::MultipleOf { value, .. } => schema.multiple_of(*value),
                NumberCheck::Finite { .. } => schema.finite(),
            };
            schema = relabel(schema, check.message());
        }
        finish(schema, self.optional)
    }
}

// ---------------------------------------------------------------------------
// Boolean
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanDefinition {
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub checks: Vec<BooleanCheck>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum BooleanCheck {
    Required { message: Option<String> },
    MustBeTrue { message: Option<String> },
    MustBeFalse { message: Option<String> },
}

impl BooleanCheck {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Required { message } | Self::MustBeTrue { message } | Self::MustBeFalse { message } => {
                message.as_deref()
            }
        }
    }
}

impl BooleanDefinition {
    pub fn compile(&self) -> BooleanSchema {
        let mut schema = boolean();
        for check in &self.checks {
            schema = match check {
                BooleanCheck::Required { .. } => schema.required(),
                BooleanCheck::MustBeTrue { .. } => schema.must_be_true(),
                BooleanCheck::MustBeFalse { .. } => schema.must_be_false(),
            };
            schema = relabel(schema, check.message());
        }
        finish(schema, self.optional)
    }
}

// ---------------------------------------------------------------------------
// Array
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayDefinition {
    pub items: Box<SchemaDefinition>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub checks: Vec<ArrayCheck>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ArrayCheck {
    Required { message: Option<String> },
    Min { value: usize, message: Option<String> },
    Max { value: usize, message: Option<String> },
    Length { value: usize, message: Option<String> },
    Nonempty { message: Option<String> },
    Unique { message: Option<String> },
}

impl ArrayCheck {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Required { message }
            | Self::Min { message, .. }
            | Self::Max { message, .. }
            | Self::Length { message, .. }
            | Self::Nonempty { message }
            | Self::Unique { message } => message.as_deref(),
        }
    }
}

impl ArrayDefinition {
    /// # Errors
    ///
    /// Propagates pattern errors from the item definition.
    pub fn compile(&self) -> Result<ArraySchema> {
        let mut schema = ArraySchema::from_shared(self.items.compile()?);
        for check in &self.checks {
            schema = match check {
                ArrayCheck::Required { .. } => schema.required(),
                ArrayCheck::Min { value, .. } => schema.min(*value),
                ArrayCheck::Max { value, .. } => schema.max(*value),
                ArrayCheck::Length { value, .. } => schema.length(*value),
                ArrayCheck::Nonempty { .. } => schema.nonempty(),
                ArrayCheck::Unique { .. } => schema.unique(),
            };
            schema = relabel(schema, check.message());
        }
        Ok(finish(schema, self.optional))
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// One declared field of an object definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub schema: SchemaDefinition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub checks: Vec<ObjectCheck>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ObjectCheck {
    Required { message: Option<String> },
    /// Reject keys that are not declared in `fields`.
    Strict { message: Option<String> },
}

impl ObjectCheck {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Required { message } | Self::Strict { message } => message.as_deref(),
        }
    }
}

impl ObjectDefinition {
    /// # Errors
    ///
    /// Propagates pattern errors from any field definition.
    pub fn compile(&self) -> Result<ObjectSchema> {
        let mut shape = Shape::new();
        for field in &self.fields {
            shape = shape.field_shared(field.name.as_str(), field.schema.compile()?);
        }
        let mut schema = object(shape);
        for check in &self.checks {
            schema = match check {
                ObjectCheck::Required { .. } => schema.required(),
                ObjectCheck::Strict { .. } => schema.strict(),
            };
            schema = relabel(schema, check.message());
        }
        Ok(finish(schema, self.optional))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn from_yaml(yaml: &str) -> SchemaDefinition {
        serde_yaml::from_str(yaml).expect("definition YAML must parse")
    }

    #[test]
    fn test_password_definition_matches_builder() {
        let definition = from_yaml(
            r#"
type: string
checks:
  - rule: min
    value: 8
  - rule: max
    value: 255
  - rule: regex
    pattern: "[A-Z]"
    message: A uppercase letter is required
  - rule: regex
    pattern: "[0-9]"
    message: A number is required
"#,
        );
        let schema = definition.compile().unwrap();

        assert_eq!(
            schema.check_all(Some(&json!("abc"))),
            vec![
                "Must be at least 8 characters",
                "A uppercase letter is required",
                "A number is required",
            ]
        );
        assert!(schema.check_all(Some(&json!("Abcdef12"))).is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let definition = from_yaml("type: string\nchecks:\n  - rule: regex\n    pattern: \"[\"\n");
        let err = definition.compile().err().expect("pattern must fail to compile");
        assert!(matches!(err, DefinitionError::InvalidPattern { ref pattern, .. } if pattern == "["));
    }

    #[test]
    fn test_object_definition_keeps_field_order() {
        let definition = from_yaml(
            r#"
type: object
checks:
  - rule: strict
fields:
  - name: b
    schema: { type: number, checks: [{ rule: positive }] }
  - name: a
    schema: { type: string, checks: [{ rule: required, message: A is required }] }
  - name: flags
    schema:
      type: array
      optional: true
      items: { type: boolean }
      checks: [{ rule: max, value: 1 }]
"#,
        );
        let schema = definition.compile().unwrap();

        assert_eq!(
            schema.check_all(Some(&json!({"b": -1, "flags": [true, "x"], "zzz": 1}))),
            vec![
                "b: Must be positive",
                "a: A is required",
                r#"flags: {"1":"Expected boolean","root":"Must have at most 1 items"}"#,
                "root: Unrecognized key: \"zzz\"",
            ]
        );
    }

    #[test]
    fn test_optional_flag_applies_last() {
        let definition = from_yaml("type: boolean\noptional: true\nchecks: [{ rule: required }, { rule: must_be_true }]\n");
        assert!(definition.is_optional());
        assert_eq!(definition.kind(), "boolean");

        let schema = definition.compile().unwrap();
        assert_eq!(schema.check(None), None);
        assert_eq!(schema.check(Some(&json!(false))), Some("Must be true".to_string()));
    }

    #[test]
    fn test_json_definition() {
        let definition: SchemaDefinition = serde_json::from_value(json!({
            "type": "array",
            "items": {"type": "number", "checks": [{"rule": "multiple_of", "value": 2}]},
            "checks": [{"rule": "unique", "message": "No repeats"}]
        }))
        .unwrap();
        let schema = definition.compile().unwrap();
        assert_eq!(
            schema.check_all(Some(&json!([2, 3, 2]))),
            vec!["1: Must be a multiple of 2", "root: No repeats"]
        );
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        let result: std::result::Result<SchemaDefinition, _> =
            serde_yaml::from_str("type: string\nchecks: [{ rule: shout }]\n");
        assert!(result.is_err());
    }
}
