//! The base schema: constraint pipeline, chaining, and validation entry
//! points shared by every schema kind.
//!
//! Concrete kinds implement [`Schema::core`] and [`Schema::with_core`]; every
//! chaining call funnels through `with_core`, so each derived schema is a new
//! value of the same concrete kind and kind-specific methods stay available
//! after `required()`, `optional()` or `refine()`.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::constraint::Constraint;
use crate::error::{SafeParse, ValidationError};
use crate::value::{Blank, FromJson, present};

/// Default message of [`Schema::required`].
pub const REQUIRED: &str = "Required";

/// Default message of [`Schema::ensure`].
pub const INVALID: &str = "Invalid value";

/// State shared by all schema kinds: the ordered constraint list, the
/// optional flag, and the output transform applied by `parse`.
///
/// A `Core` is never mutated; every `with_*` method returns a new value that
/// shares the existing constraint closures.
pub struct Core<V: ?Sized + ToOwned + 'static, O> {
    constraints: Vec<Constraint<V>>,
    optional: bool,
    output: Arc<dyn Fn(V::Owned) -> O + Send + Sync>,
}

impl<V: ?Sized + ToOwned + 'static, O> Clone for Core<V, O> {
    fn clone(&self) -> Self {
        Self {
            constraints: self.constraints.clone(),
            optional: self.optional,
            output: Arc::clone(&self.output),
        }
    }
}

impl<V: ?Sized + ToOwned + 'static, O> std::fmt::Debug for Core<V, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("constraints", &self.constraints.len())
            .field("optional", &self.optional)
            .finish_non_exhaustive()
    }
}

impl<V: ?Sized + ToOwned + 'static> Core<V, V::Owned> {
    /// Empty constraint list, not optional, identity output.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            optional: false,
            output: Arc::new(|value: V::Owned| value),
        }
    }
}

impl<V: ?Sized + ToOwned + 'static> Default for Core<V, V::Owned> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: ?Sized + ToOwned + 'static, O> Core<V, O> {
    /// Constraints in declaration order.
    pub fn constraints(&self) -> &[Constraint<V>] {
        &self.constraints
    }

    /// Whether absent values skip every constraint.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns a copy with `constraint` appended.
    pub fn with_constraint(&self, constraint: Constraint<V>) -> Self {
        let mut derived = self.clone();
        derived.constraints.push(constraint);
        derived
    }

    /// Returns a copy with the optional flag set to `optional`.
    pub fn with_optional(&self, optional: bool) -> Self {
        let mut derived = self.clone();
        derived.optional = optional;
        derived
    }

    /// Returns a copy whose last constraint reports `message`. A core with no
    /// constraints is returned unchanged.
    pub fn with_last_message(&self, message: impl Into<String>) -> Self {
        let mut derived = self.clone();
        if let Some(last) = derived.constraints.last_mut() {
            *last = last.with_message(message);
        }
        derived
    }

    /// Returns a copy with the same constraints and a new output transform.
    pub fn with_output<P, F>(&self, output: F) -> Core<V, P>
    where
        F: Fn(V::Owned) -> P + Send + Sync + 'static,
    {
        Core {
            constraints: self.constraints.clone(),
            optional: self.optional,
            output: Arc::new(output),
        }
    }

    /// First failing constraint's message, in declaration order.
    pub fn first_error(&self, value: Option<&V>) -> Option<String> {
        self.constraints
            .iter()
            .find_map(|constraint| constraint.check(value))
    }

    /// Every failing constraint's message, in declaration order.
    pub fn all_errors(&self, value: Option<&V>) -> Vec<String> {
        self.constraints
            .iter()
            .filter_map(|constraint| constraint.check(value))
            .collect()
    }

    /// Applies the output transform.
    pub fn output(&self, value: V::Owned) -> O {
        (self.output)(value)
    }
}

/// A validation schema over values of type [`Schema::Value`].
///
/// Every method that adds behavior returns a new schema of the same concrete
/// kind; the receiver is never modified, so a schema can be shared as a
/// template across threads and validation calls.
///
/// # Examples
///
/// ```
/// use valchain_core::{Schema, number};
///
/// let age = number().integer().min(0.0);
/// let adult = age.min(18.0);
///
/// assert_eq!(age.validate(Some(&12.0)), None);
/// assert_eq!(adult.validate(Some(&12.0)), Some("Must be at least 18".to_string()));
/// assert_eq!(adult.validate(None), None);
/// assert_eq!(adult.required().validate(None), Some("Required".to_string()));
/// ```
pub trait Schema: Clone + Send + Sync + 'static {
    /// The value type constraints inspect.
    type Value: ?Sized + ToOwned + Blank + 'static;
    /// The type produced by `parse`.
    type Output;

    /// Borrows the shared constraint pipeline.
    fn core(&self) -> &Core<Self::Value, Self::Output>;

    /// Builds a sibling of the same concrete kind around `core`.
    fn with_core(&self, core: Core<Self::Value, Self::Output>) -> Self;

    /// Returns a new schema with `constraint` appended.
    fn with_constraint(&self, constraint: Constraint<Self::Value>) -> Self {
        self.with_core(self.core().with_constraint(constraint))
    }

    /// Rejects absent values, whitespace-only strings and empty arrays.
    fn required(&self) -> Self {
        self.with_constraint(Constraint::new(|value: Option<&Self::Value>| match value {
            Some(value) if !value.is_blank() => None,
            _ => Some(REQUIRED.to_string()),
        }))
    }

    /// Lets absent values pass without running any constraint. Present values
    /// are still checked against every constraint.
    fn optional(&self) -> Self {
        self.with_core(self.core().with_optional(true))
    }

    /// Adds a custom rule that fails with `message` when `predicate` returns
    /// `false` for a present value.
    fn refine<F>(&self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Self::Value) -> bool + Send + Sync + 'static,
    {
        self.with_constraint(Constraint::predicate(predicate, message))
    }

    /// [`refine`](Schema::refine) with the default message [`INVALID`].
    /// Chain [`message`](Schema::message) to relabel it.
    ///
    /// ```
    /// use valchain_core::{Schema, number};
    ///
    /// let even = number().ensure(|value| value % 2.0 == 0.0);
    /// assert_eq!(even.validate(Some(&3.0)), Some("Invalid value".to_string()));
    /// assert_eq!(
    ///     even.message("Must be even").validate(Some(&3.0)),
    ///     Some("Must be even".to_string())
    /// );
    /// ```
    fn ensure<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Self::Value) -> bool + Send + Sync + 'static,
    {
        self.refine(predicate, INVALID)
    }

    /// Replaces the message of the most recently added constraint.
    ///
    /// ```
    /// use valchain_core::{Schema, string};
    ///
    /// let name = string().required().message("Name is required").min(2);
    /// assert_eq!(name.validate(Some(" ")), Some("Name is required".to_string()));
    /// assert_eq!(name.validate(Some("a")), Some("Must be at least 2 characters".to_string()));
    /// ```
    fn message(&self, message: impl Into<String>) -> Self {
        self.with_core(self.core().with_last_message(message))
    }

    /// Whether absent values pass unchecked.
    fn is_optional(&self) -> bool {
        self.core().is_optional()
    }

    /// Returns the first failing constraint's message.
    fn validate(&self, value: Option<&Self::Value>) -> Option<String> {
        if value.is_none() && self.is_optional() {
            return None;
        }
        self.core().first_error(value)
    }

    /// Returns every failing constraint's message, in declaration order.
    fn validate_all(&self, value: Option<&Self::Value>) -> Vec<String> {
        if value.is_none() && self.is_optional() {
            return Vec::new();
        }
        self.core().all_errors(value)
    }

    /// The error `parse` reports for `value`, or `None` when it passes.
    /// Compound kinds report their issue map.
    fn failure(&self, value: Option<&Self::Value>) -> Option<ValidationError> {
        self.validate(value).map(ValidationError::Constraint)
    }

    /// Validates `value` and, if it passes, applies the output transform.
    fn safe_parse(&self, value: &Self::Value) -> SafeParse<Self::Output> {
        match self.failure(Some(value)) {
            Some(error) => SafeParse::Failure(error),
            None => SafeParse::Success(self.core().output(value.to_owned())),
        }
    }

    /// Like [`safe_parse`](Schema::safe_parse) for a value that may be
    /// missing. An absent value succeeds with `None` on an optional schema
    /// and fails with the first applicable error otherwise.
    ///
    /// ```
    /// use valchain_core::{Schema, string};
    ///
    /// let nickname = string().min(2).optional();
    /// assert_eq!(nickname.safe_parse_optional(None).data(), Some(&None));
    ///
    /// let name = string().required().min(2);
    /// assert_eq!(
    ///     name.safe_parse_optional(None).error().map(ToString::to_string),
    ///     Some("Required".to_string())
    /// );
    /// ```
    fn safe_parse_optional(
        &self,
        value: Option<&Self::Value>,
    ) -> SafeParse<Option<Self::Output>> {
        match value {
            Some(value) => self.safe_parse(value).map(Some),
            None => match self.failure(None) {
                Some(error) => SafeParse::Failure(error),
                None => SafeParse::Success(None),
            },
        }
    }

    /// Like [`safe_parse`](Schema::safe_parse), as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] describing the first failure.
    fn parse(&self, value: &Self::Value) -> Result<Self::Output, ValidationError> {
        self.safe_parse(value)
            .into_result()
            .inspect_err(|error| debug!(%error, "value rejected by schema"))
    }

    /// Like [`safe_parse_optional`](Schema::safe_parse_optional), as a
    /// `Result`.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] describing the first failure.
    fn parse_optional(
        &self,
        value: Option<&Self::Value>,
    ) -> Result<Option<Self::Output>, ValidationError> {
        self.safe_parse_optional(value)
            .into_result()
            .inspect_err(|error| debug!(%error, "value rejected by schema"))
    }

    /// Erases the concrete kind for use as a field or item schema.
    fn into_any(self) -> Arc<dyn AnySchema>
    where
        Self::Value: FromJson,
    {
        Arc::new(self)
    }
}

/// Object-safe view of a schema that validates untyped JSON.
///
/// Object and array schemas hold their children through this trait. JSON
/// `null` and missing values are both treated as absent.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use valchain_core::{AnySchema, Schema, string};
///
/// let name = string().min(2);
/// assert_eq!(name.check(Some(&json!("Al"))), None);
/// assert_eq!(name.check(Some(&json!(7))), Some("Expected string".to_string()));
/// assert_eq!(name.check(None), None);
///
/// let parsed = name.safe_parse_json(Some(&json!("Ada")));
/// assert_eq!(parsed.data(), Some(&json!("Ada")));
/// assert!(name.required().parse_json(None).is_err());
/// ```
pub trait AnySchema: Send + Sync {
    /// First error for `value`, like [`Schema::validate`].
    fn check(&self, value: Option<&Value>) -> Option<String>;

    /// Every error for `value`, like [`Schema::validate_all`].
    fn check_all(&self, value: Option<&Value>) -> Vec<String>;

    /// Parses untyped JSON, like [`Schema::safe_parse_optional`].
    ///
    /// On success the input is returned unchanged, with `null` standing in
    /// for an absent value. Output transforms are not applied: they produce
    /// typed values this boundary cannot represent.
    fn safe_parse_json(&self, value: Option<&Value>) -> SafeParse<Value>;

    /// Like [`safe_parse_json`](AnySchema::safe_parse_json), as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] describing the first failure.
    fn parse_json(&self, value: Option<&Value>) -> Result<Value, ValidationError> {
        self.safe_parse_json(value)
            .into_result()
            .inspect_err(|error| debug!(%error, "value rejected by schema"))
    }
}

impl<S> AnySchema for S
where
    S: Schema,
    S::Value: FromJson,
{
    fn check(&self, value: Option<&Value>) -> Option<String> {
        let Some(raw) = present(value) else {
            return self.validate(None);
        };
        match <S::Value as FromJson>::from_json(raw) {
            Some(typed) => self.validate(Some(&*typed)),
            None => Some(<S::Value as FromJson>::EXPECTED.to_string()),
        }
    }

    fn check_all(&self, value: Option<&Value>) -> Vec<String> {
        let Some(raw) = present(value) else {
            return self.validate_all(None);
        };
        match <S::Value as FromJson>::from_json(raw) {
            Some(typed) => self.validate_all(Some(&*typed)),
            None => vec![<S::Value as FromJson>::EXPECTED.to_string()],
        }
    }

    fn safe_parse_json(&self, value: Option<&Value>) -> SafeParse<Value> {
        let failure = match present(value) {
            None => self.failure(None),
            Some(raw) => match <S::Value as FromJson>::from_json(raw) {
                Some(typed) => self.failure(Some(&*typed)),
                None => Some(ValidationError::Constraint(
                    <S::Value as FromJson>::EXPECTED.to_string(),
                )),
            },
        };
        match failure {
            Some(error) => SafeParse::Failure(error),
            None => SafeParse::Success(value.cloned().unwrap_or(Value::Null)),
        }
    }
}
