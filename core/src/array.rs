//! Array schemas: array-level constraints plus a shared item schema.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::trace;

use crate::constraint::Constraint;
use crate::error::{Issues, ROOT, ValidationError};
use crate::schema::{AnySchema, Core, Schema};
use crate::value::present;

/// Root message when the input is not a JSON array.
pub const NOT_AN_ARRAY: &str = "Must be an array";

/// Schema for JSON arrays whose elements are checked by an item schema.
///
/// Element failures are reported under the stringified index, failures of
/// the array-level constraints (`min`, `max`, `unique`, ...) under
/// [`ROOT`](crate::ROOT). Both kinds are collected in a single pass.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use valchain_core::{Schema, array, number};
///
/// let scores = array(number().nonnegative()).min(2).unique();
///
/// assert_eq!(scores.validate(Some(&json!([3, 4]))), None);
/// assert_eq!(
///     scores.validate_all(Some(&json!([-1]))),
///     vec!["0: Must be non-negative", "root: Must have at least 2 items"]
/// );
/// assert_eq!(
///     scores.validate(Some(&json!([1, 2, 2, 3]))),
///     Some(r#"{"root":"Duplicate items at index 1 and 2"}"#.to_string())
/// );
/// ```
pub struct ArraySchema<O = Value> {
    item: Arc<dyn AnySchema>,
    core: Core<Value, O>,
}

impl ArraySchema {
    /// Creates an array schema over `item` with no array-level constraints.
    pub fn new(item: impl AnySchema + 'static) -> Self {
        Self::from_shared(Arc::new(item))
    }

    /// Like [`new`](ArraySchema::new), for an already shared item schema.
    pub fn from_shared(item: Arc<dyn AnySchema>) -> Self {
        Self {
            item,
            core: Core::new(),
        }
    }
}

impl<O> Clone for ArraySchema<O> {
    fn clone(&self) -> Self {
        Self {
            item: Arc::clone(&self.item),
            core: self.core.clone(),
        }
    }
}

impl<O> std::fmt::Debug for ArraySchema<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArraySchema")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<O: 'static> ArraySchema<O> {
    /// The schema every element is checked against.
    pub fn item(&self) -> &dyn AnySchema {
        self.item.as_ref()
    }

    /// At least `count` items.
    pub fn min(&self, count: usize) -> Self {
        self.with_constraint(Constraint::present(move |value: &Value| {
            let items = value.as_array()?;
            (items.len() < count).then(|| format!("Must have at least {count} items"))
        }))
    }

    /// At most `count` items.
    pub fn max(&self, count: usize) -> Self {
        self.with_constraint(Constraint::present(move |value: &Value| {
            let items = value.as_array()?;
            (items.len() > count).then(|| format!("Must have at most {count} items"))
        }))
    }

    /// Exactly `count` items.
    pub fn length(&self, count: usize) -> Self {
        self.with_constraint(Constraint::present(move |value: &Value| {
            let items = value.as_array()?;
            (items.len() != count).then(|| format!("Must have exactly {count} items"))
        }))
    }

    /// At least one item. Unlike `required`, an absent array passes.
    pub fn nonempty(&self) -> Self {
        self.with_constraint(Constraint::predicate(
            |value: &Value| value.as_array().is_none_or(|items| !items.is_empty()),
            "Must not be empty",
        ))
    }

    /// No two elements may be equal by JSON value. Numbers compare by
    /// numeric value, so `1`, `1.0` and `1e0` are duplicates, as are `0` and
    /// `-0.0`. Arrays and objects compare element by element with the same
    /// rule.
    pub fn unique(&self) -> Self {
        self.unique_by(json_eq)
    }

    /// No two elements may be equal according to `eq`. Reports the first
    /// duplicate pair found scanning `i` ascending, then `j > i` ascending.
    pub fn unique_by<F>(&self, eq: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.with_constraint(Constraint::present(move |value: &Value| {
            let items = value.as_array()?;
            first_duplicate(items, &eq)
                .map(|(first, second)| format!("Duplicate items at index {first} and {second}"))
        }))
    }

    /// Sets the output produced by `parse`; validation is unaffected.
    pub fn transform<P, F>(&self, output: F) -> ArraySchema<P>
    where
        P: 'static,
        F: Fn(Value) -> P + Send + Sync + 'static,
    {
        ArraySchema {
            item: Arc::clone(&self.item),
            core: self.core.with_output(output),
        }
    }

    /// Runs the structural check, every element, then the array-level
    /// constraints.
    pub fn inspect(&self, value: Option<&Value>) -> Issues {
        let mut issues = Issues::new();
        let Some(value) = present(value) else {
            if !self.core.is_optional() {
                let message = self
                    .core
                    .first_error(None)
                    .unwrap_or_else(|| NOT_AN_ARRAY.to_string());
                issues.insert(ROOT, message);
            }
            return issues;
        };
        let Some(items) = value.as_array() else {
            issues.insert(ROOT, NOT_AN_ARRAY);
            return issues;
        };

        for (index, item) in items.iter().enumerate() {
            if let Some(message) = self.item.check(Some(item)) {
                issues.insert(index.to_string(), message);
            }
        }
        if let Some(message) = self.core.first_error(Some(value)) {
            issues.insert(ROOT, message);
        }

        trace!(items = items.len(), issues = issues.len(), "inspected array");
        issues
    }
}

impl<O: 'static> Schema for ArraySchema<O> {
    type Value = Value;
    type Output = O;

    fn core(&self) -> &Core<Value, O> {
        &self.core
    }

    fn with_core(&self, core: Core<Value, O>) -> Self {
        Self {
            item: Arc::clone(&self.item),
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

/// Equality by JSON value rather than by representation.
fn json_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => match (left.as_f64(), right.as_f64()) {
            (Some(left), Some(right)) => left == right,
            _ => left == right,
        },
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len() && left.iter().zip(right).all(|(l, r)| json_eq(l, r))
        }
        (Value::Object(left), Value::Object(right)) => same_entries(left, right),
        _ => left == right,
    }
}

fn same_entries(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, value)| right.get(key).is_some_and(|other| json_eq(value, other)))
}

fn first_duplicate<F>(items: &[Value], eq: F) -> Option<(usize, usize)>
where
    F: Fn(&Value, &Value) -> bool,
{
    (0..items.len()).find_map(|first| {
        (first + 1..items.len())
            .find(|&second| eq(&items[first], &items[second]))
            .map(|second| (first, second))
    })
}
