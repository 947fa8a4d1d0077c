//! Validation error types.
//!
//! Scalar schemas fail with a single message. Compound schemas (arrays and
//! objects) fail with an [`Issues`] map keyed by field name, stringified
//! array index, or [`ROOT`] for failures of the compound value itself.

use serde::Serialize;
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Key under which compound schemas report errors about the value as a whole.
pub const ROOT: &str = "root";

/// Insertion-ordered map of issue key to message.
///
/// Arrays insert element failures in index order, objects insert field
/// failures in shape declaration order, and both append [`ROOT`] last, so
/// flattened output is reproducible.
///
/// # Examples
///
/// ```
/// use valchain_core::{Issues, ROOT};
///
/// let mut issues = Issues::new();
/// issues.insert("1", "Must be positive");
/// issues.insert(ROOT, "Must have at least 3 items");
///
/// assert_eq!(issues.get("1"), Some("Must be positive"));
/// assert_eq!(
///     issues.flatten(),
///     vec!["1: Must be positive", "root: Must have at least 3 items"]
/// );
/// assert_eq!(
///     issues.to_json(),
///     r#"{"1":"Must be positive","root":"Must have at least 3 items"}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Issues {
    entries: Vec<(String, String)>,
}

impl Issues {
    /// Creates an empty issue map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` under `key`, replacing an earlier message for the
    /// same key in place.
    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        let key = key.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = message,
            None => self.entries.push((key, message)),
        }
    }

    /// Returns the message recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, message)| message.as_str())
    }

    /// Returns `true` if a message is recorded under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns `true` when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates `(key, message)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, message)| (key.as_str(), message.as_str()))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Renders every entry as `"key: message"`.
    pub fn flatten(&self) -> Vec<String> {
        self.iter()
            .map(|(key, message)| format!("{key}: {message}"))
            .collect()
    }

    /// Compact JSON object rendering, keys in insertion order.
    pub fn to_json(&self) -> String {
        let body = self
            .iter()
            .map(|(key, message)| format!("{}:{}", Value::from(key), Value::from(message)))
            .collect::<Vec<_>>()
            .join(",");
        format!("{{{body}}}")
    }
}

impl std::fmt::Display for Issues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl Serialize for Issues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, message) in &self.entries {
            map.serialize_entry(key, message)?;
        }
        map.end()
    }
}

/// Error returned by [`Schema::parse`](crate::Schema::parse).
///
/// The `Display` impl yields the constraint message for scalar schemas and
/// the JSON rendering of the issue map for compound schemas.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(untagged)]
pub enum ValidationError {
    /// A scalar constraint failed.
    #[error("{0}")]
    Constraint(String),
    /// One or more children (or the root) of a compound value failed.
    #[error("{0}")]
    Structured(Issues),
}

impl ValidationError {
    /// Returns the failure as flat messages (`"key: message"` for compound
    /// failures).
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Constraint(message) => vec![message.clone()],
            Self::Structured(issues) => issues.flatten(),
        }
    }

    /// Returns the issue map for compound failures.
    pub fn issues(&self) -> Option<&Issues> {
        match self {
            Self::Constraint(_) => None,
            Self::Structured(issues) => Some(issues),
        }
    }
}

/// Outcome of [`Schema::safe_parse`](crate::Schema::safe_parse).
///
/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": ...}`.
///
/// # Examples
///
/// ```
/// use valchain_core::{Schema, number};
///
/// let outcome = number().positive().safe_parse(&-1.0);
/// assert!(!outcome.is_success());
/// assert_eq!(outcome.error().unwrap().to_string(), "Must be positive");
///
/// let outcome = number().positive().safe_parse(&3.0);
/// assert_eq!(outcome.data(), Some(&3.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SafeParse<O> {
    /// The value passed; carries the (possibly transformed) output.
    Success(O),
    /// The value failed validation.
    Failure(ValidationError),
}

impl<O> SafeParse<O> {
    /// Returns `true` for [`SafeParse::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the output of a successful parse.
    pub fn data(&self) -> Option<&O> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }

    /// Returns the error of a failed parse.
    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Maps the output of a successful parse.
    pub fn map<P>(self, f: impl FnOnce(O) -> P) -> SafeParse<P> {
        match self {
            Self::Success(data) => SafeParse::Success(f(data)),
            Self::Failure(error) => SafeParse::Failure(error),
        }
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<O, ValidationError> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure(error) => Err(error),
        }
    }
}

impl<O: Serialize> Serialize for SafeParse<O> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SafeParse", 2)?;
        match self {
            Self::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            Self::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}
