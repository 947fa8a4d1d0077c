//! Object schemas: a [`Shape`] of named field schemas plus object-level
//! constraints such as `strict` and `refine`.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::constraint::Constraint;
use crate::error::{Issues, ROOT, ValidationError};
use crate::schema::{AnySchema, Core, Schema};
use crate::value::present;

/// Root message when the input is not a JSON object.
pub const NOT_AN_OBJECT: &str = "Must be an object";

/// Ordered mapping from field name to child schema.
///
/// Field order is declaration order; it decides the order of reported
/// issues. Declaring a name twice replaces the earlier schema in place.
///
/// # Examples
///
/// ```
/// use valchain_core::{Shape, number, string};
///
/// let shape = Shape::new()
///     .field("name", string().min(1))
///     .field("age", number().integer());
///
/// assert_eq!(shape.keys().collect::<Vec<_>>(), vec!["name", "age"]);
/// assert!(shape.get("age").is_some());
/// ```
#[derive(Clone, Default)]
pub struct Shape {
    fields: Vec<(String, Arc<dyn AnySchema>)>,
}

impl Shape {
    /// Creates an empty shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a field.
    pub fn field(self, name: impl Into<String>, schema: impl AnySchema + 'static) -> Self {
        self.field_shared(name, Arc::new(schema))
    }

    /// Adds (or replaces) a field whose schema is already shared.
    pub fn field_shared(mut self, name: impl Into<String>, schema: Arc<dyn AnySchema>) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = schema,
            None => self.fields.push((name, schema)),
        }
        self
    }

    /// The schema declared for `name`.
    pub fn get(&self, name: &str) -> Option<&dyn AnySchema> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, schema)| schema.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &dyn AnySchema)> {
        self.fields
            .iter()
            .map(|(name, schema)| (name.as_str(), schema.as_ref()))
    }
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

/// Schema for JSON objects described by a [`Shape`].
///
/// Every declared field is checked, independently of its siblings. Input
/// keys missing from the shape are ignored unless [`strict`](ObjectSchema::strict)
/// is used; declared fields missing from the input are passed to their
/// schema as absent.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use valchain_core::{Schema, Shape, number, object, string};
///
/// let schema = object(
///     Shape::new()
///         .field("a", string().min(3))
///         .field("b", number().positive()),
/// );
///
/// assert_eq!(
///     schema.validate_all(Some(&json!({"a": "x", "b": -1}))),
///     vec!["a: Must be at least 3 characters", "b: Must be positive"]
/// );
/// assert_eq!(schema.validate(Some(&json!({"a": "xyz", "b": 2, "extra": true}))), None);
/// ```
pub struct ObjectSchema<O = Value> {
    shape: Arc<Shape>,
    core: Core<Value, O>,
}

impl ObjectSchema {
    /// Creates an object schema for `shape`.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape: Arc::new(shape),
            core: Core::new(),
        }
    }
}

impl<O> Clone for ObjectSchema<O> {
    fn clone(&self) -> Self {
        Self {
            shape: Arc::clone(&self.shape),
            core: self.core.clone(),
        }
    }
}

impl<O> std::fmt::Debug for ObjectSchema<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("shape", &self.shape)
            .field("core", &self.core)
            .finish()
    }
}

impl<O: 'static> ObjectSchema<O> {
    /// The declared fields.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Declared field names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.shape.keys()
    }

    /// Rejects input keys that are not declared in the shape.
    pub fn strict(&self) -> Self {
        let shape = Arc::clone(&self.shape);
        self.with_constraint(Constraint::present(move |value: &Value| {
            let fields = value.as_object()?;
            fields
                .keys()
                .find(|key| !shape.contains(key))
                .map(|key| format!("Unrecognized key: \"{key}\""))
        }))
    }

    /// Sets the output produced by `parse`; validation is unaffected.
    pub fn transform<P, F>(&self, output: F) -> ObjectSchema<P>
    where
        P: 'static,
        F: Fn(Value) -> P + Send + Sync + 'static,
    {
        ObjectSchema {
            shape: Arc::clone(&self.shape),
            core: self.core.with_output(output),
        }
    }

    /// Runs the structural check, every declared field, then any
    /// object-level constraints.
    pub fn inspect(&self, value: Option<&Value>) -> Issues {
        let mut issues = Issues::new();
        let Some(value) = present(value) else {
            if !self.core.is_optional() {
                let message = self
                    .core
                    .first_error(None)
                    .unwrap_or_else(|| NOT_AN_OBJECT.to_string());
                issues.insert(ROOT, message);
            }
            return issues;
        };
        let Some(fields) = value.as_object() else {
            issues.insert(ROOT, NOT_AN_OBJECT);
            return issues;
        };

        for (name, schema) in self.shape.iter() {
            if let Some(message) = schema.check(fields.get(name)) {
                issues.insert(name, message);
            }
        }
        if let Some(message) = self.core.first_error(Some(value)) {
            issues.insert(ROOT, message);
        }

        trace!(fields = self.shape.len(), issues = issues.len(), "inspected object");
        issues
    }
}

impl<O: 'static> Schema for ObjectSchema<O> {
    type Value = Value;
    type Output = O;

    fn core(&self) -> &Core<Value, O> {
        &self.core
    }

    fn with_core(&self, core: Core<Value, O>) -> Self {
        Self {
            shape: Arc::clone(&self.shape),
            core,
        }
    }

    /// Returns the JSON rendering of the issue map, if any.
    fn validate(&self, value: Option<&Value>) -> Option<String> {
        let issues = self.inspect(value);
        (!issues.is_empty()).then(|| issues.to_json())
    }

    /// Returns `"key: message"` for every issue.
    fn validate_all(&self, value: Option<&Value>) -> Vec<String> {
        self.inspect(value).flatten()
    }

    fn failure(&self, value: Option<&Value>) -> Option<ValidationError> {
        let issues = self.inspect(value);
        (!issues.is_empty()).then_some(ValidationError::Structured(issues))
    }
}
