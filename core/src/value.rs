//! Value-kind traits shared by every schema.
//!
//! [`Blank`] decides what `required` treats as missing; [`FromJson`] is the
//! boundary where untyped JSON input is converted into the statically typed
//! value a scalar schema checks.

use std::borrow::Cow;

use serde_json::Value;

/// Values that `required` rejects even when present.
pub trait Blank {
    /// Returns `true` for values that count as "nothing entered".
    fn is_blank(&self) -> bool;
}

impl Blank for str {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Blank for f64 {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Blank for bool {
    fn is_blank(&self) -> bool {
        false
    }
}

/// `null`, whitespace-only strings and empty arrays are blank; empty objects
/// are not.
impl Blank for Value {
    fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(text) => text.is_blank(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// Conversion from an untyped JSON value into a schema's value type.
pub trait FromJson: ToOwned {
    /// Message reported when a present value has the wrong kind.
    const EXPECTED: &'static str;

    /// Borrows or copies the typed value out of `value`, or `None` when the
    /// kinds differ.
    fn from_json(value: &Value) -> Option<Cow<'_, Self>>;
}

impl FromJson for str {
    const EXPECTED: &'static str = "Expected string";

    fn from_json(value: &Value) -> Option<Cow<'_, Self>> {
        value.as_str().map(Cow::Borrowed)
    }
}

impl FromJson for f64 {
    const EXPECTED: &'static str = "Expected number";

    fn from_json(value: &Value) -> Option<Cow<'_, Self>> {
        value.as_f64().map(Cow::Owned)
    }
}

impl FromJson for bool {
    const EXPECTED: &'static str = "Expected boolean";

    fn from_json(value: &Value) -> Option<Cow<'_, Self>> {
        value.as_bool().map(Cow::Owned)
    }
}

/// Compound schemas perform their own structural check.
impl FromJson for Value {
    const EXPECTED: &'static str = "Expected value";

    fn from_json(value: &Value) -> Option<Cow<'_, Self>> {
        Some(Cow::Borrowed(value))
    }
}

/// Treats JSON `null` the same as a missing value.
pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_blank_values() {
        assert!("   ".is_blank());
        assert!(!" a ".is_blank());
        assert!(json!(null).is_blank());
        assert!(json!([]).is_blank());
        assert!(json!("\t").is_blank());
        assert!(!json!({}).is_blank());
        assert!(!json!(0).is_blank());
        assert!(!false.is_blank());
    }

    #[test]
    fn test_from_json_kinds() {
        assert_eq!(str::from_json(&json!("hi")).as_deref(), Some("hi"));
        assert_eq!(f64::from_json(&json!(3)).as_deref(), Some(&3.0));
        assert_eq!(bool::from_json(&json!(true)).as_deref(), Some(&true));
        assert!(str::from_json(&json!(3)).is_none());
        assert!(f64::from_json(&json!("3")).is_none());
        assert!(bool::from_json(&json!("true")).is_none());
    }

    #[test]
    fn test_present_drops_null() {
        assert!(present(Some(&json!(null))).is_none());
        assert!(present(None).is_none());
        assert_eq!(present(Some(&json!(1))), Some(&json!(1)));
    }
}
