//! String schemas and the built-in email and URL formats.

use std::sync::LazyLock;

use regex::Regex;

use crate::constraint::Constraint;
use crate::schema::{Core, Schema};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex must compile")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*://)?(?:localhost|(?:\d{1,3}\.){3}\d{1,3}|\[[0-9a-fA-F:.]+\]|(?:[\w-]+\.)+[a-zA-Z]{2,})(?::\d+)?(?:[/?#]\S*)?$",
    )
    .expect("static regex must compile")
});

/// Schema for string values. Lengths are counted in characters, not bytes.
///
/// # Examples
///
/// ```
/// use regex::Regex;
/// use valchain_core::{Schema, string};
///
/// let password = string()
///     .min(8)
///     .max(255)
///     .regex(Regex::new("[A-Z]").unwrap())
///     .message("A uppercase letter is required")
///     .regex(Regex::new("[0-9]").unwrap())
///     .message("A number is required");
///
/// assert_eq!(
///     password.validate_all(Some("abc")),
///     vec![
///         "Must be at least 8 characters",
///         "A uppercase letter is required",
///         "A number is required",
///     ]
/// );
/// assert!(password.validate_all(Some("Abcdef12")).is_empty());
/// ```
pub struct StringSchema<O = String> {
    core: Core<str, O>,
}

impl StringSchema {
    /// Creates a string schema with no constraints.
    pub fn new() -> Self {
        Self { core: Core::new() }
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Clone for StringSchema<O> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<O> std::fmt::Debug for StringSchema<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringSchema")
            .field("core", &self.core)
            .finish()
    }
}

impl<O: 'static> Schema for StringSchema<O> {
    type Value = str;
    type Output = O;

    fn core(&self) -> &Core<str, O> {
        &self.core
    }

    fn with_core(&self, core: Core<str, O>) -> Self {
        Self { core }
    }
}

impl<O: 'static> StringSchema<O> {
    /// At least `length` characters.
    pub fn min(&self, length: usize) -> Self {
        self.with_constraint(Constraint::present(move |value: &str| {
            (value.chars().count() < length)
                .then(|| format!("Must be at least {length} characters"))
        }))
    }

    /// At most `length` characters.
    pub fn max(&self, length: usize) -> Self {
        self.with_constraint(Constraint::present(move |value: &str| {
            (value.chars().count() > length)
                .then(|| format!("Must be at most {length} characters"))
        }))
    }

    /// Exactly `length` characters.
    pub fn length(&self, length: usize) -> Self {
        self.with_constraint(Constraint::present(move |value: &str| {
            (value.chars().count() != length)
                .then(|| format!("Must be exactly {length} characters"))
        }))
    }

    /// Must match `pattern` somewhere in the value (anchor it for a full match).
    pub fn regex(&self, pattern: Regex) -> Self {
        self.with_constraint(Constraint::predicate(
            move |value: &str| pattern.is_match(value),
            "Invalid format",
        ))
    }

    /// Begins with `prefix`.
    pub fn starts_with(&self, prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        let message = format!("Must start with \"{prefix}\"");
        self.with_constraint(Constraint::predicate(
            move |value: &str| value.starts_with(prefix.as_str()),
            message,
        ))
    }

    /// Ends with `suffix`.
    pub fn ends_with(&self, suffix: impl Into<String>) -> Self {
        let suffix: String = suffix.into();
        let message = format!("Must end with \"{suffix}\"");
        self.with_constraint(Constraint::predicate(
            move |value: &str| value.ends_with(suffix.as_str()),
            message,
        ))
    }

    /// Contains `needle` anywhere.
    pub fn includes(&self, needle: impl Into<String>) -> Self {
        let needle: String = needle.into();
        let message = format!("Must include \"{needle}\"");
        self.with_constraint(Constraint::predicate(
            move |value: &str| value.contains(needle.as_str()),
            message,
        ))
    }

    /// Simple `local@domain.tld` shape check.
    pub fn email(&self) -> Self {
        self.with_constraint(Constraint::predicate(
            |value: &str| EMAIL_RE.is_match(value),
            "Invalid email address",
        ))
    }

    /// Permissive URL check: optional scheme, a host, optional port and path.
    /// The host is `localhost`, a dotted domain, an IPv4 address, or a
    /// bracketed IPv6 address.
    pub fn url(&self) -> Self {
        self.with_constraint(Constraint::predicate(
            |value: &str| URL_RE.is_match(value),
            "Invalid URL",
        ))
    }

    /// Sets the output produced by `parse`; validation is unaffected.
    pub fn transform<P, F>(&self, output: F) -> StringSchema<P>
    where
        P: 'static,
        F: Fn(String) -> P + Send + Sync + 'static,
    {
        StringSchema {
            core: self.core.with_output(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::*;
    use crate::string;

    fn strong_password() -> StringSchema {
        string()
            .min(8)
            .max(255)
            .regex(Regex::new("[A-Z]").unwrap())
            .message("A uppercase letter is required")
            .regex(Regex::new("[0-9]").unwrap())
            .message("A number is required")
    }

    #[test]
    fn test_validate_short_circuits() {
        let schema = string()
            .min(8)
            .regex(Regex::new("[A-Z]").unwrap());

        assert_eq!(
            schema.validate(Some("a")),
            Some("Must be at least 8 characters".to_string())
        );
        assert_eq!(
            schema.validate_all(Some("a")),
            vec!["Must be at least 8 characters", "Invalid format"]
        );
    }

    #[test]
    fn test_password_scenario() {
        let schema = strong_password();
        assert_eq!(
            schema.validate_all(Some("abc")),
            vec![
                "Must be at least 8 characters",
                "A uppercase letter is required",
                "A number is required",
            ]
        );
        assert!(schema.validate_all(Some("Abcdef12")).is_empty());
    }

    #[test]
    fn test_validate_all_is_idempotent() {
        let schema = strong_password();
        assert_eq!(schema.validate_all(Some("abc")), schema.validate_all(Some("abc")));
    }

    #[test]
    fn test_length_bounds_count_characters() {
        let schema = string().min(3).max(3);
        assert_eq!(schema.validate(Some("héé")), None);
        assert!(schema.validate(Some("hé")).is_some());
        assert_eq!(
            string().length(2).validate(Some("abc")),
            Some("Must be exactly 2 characters".to_string())
        );
    }

    #[test]
    fn test_affix_checks() {
        let schema = string().starts_with("sk_").ends_with("_live").includes("key");

        assert_eq!(schema.validate(Some("sk_key_live")), None);
        assert_eq!(
            schema.validate_all(Some("pk_test")),
            vec![
                "Must start with \"sk_\"",
                "Must end with \"_live\"",
                "Must include \"key\"",
            ]
        );
    }

    #[test]
    fn test_email() {
        let schema = string().email();
        assert_eq!(schema.validate(Some("ada@example.com")), None);
        assert_eq!(
            schema.validate(Some("ada@example")),
            Some("Invalid email address".to_string())
        );
        assert!(schema.validate(Some("ada example@x.io")).is_some());
    }

    #[test]
    fn test_url() {
        let schema = string().url();
        for ok in [
            "https://example.com",
            "example.org/path?q=1",
            "http://sub.example.co.uk:8080/a/b#frag",
            "localhost:3000",
            "http://127.0.0.1:8080/x",
            "10.0.0.1",
            "https://[::1]:8443/health",
        ] {
            assert_eq!(schema.validate(Some(ok)), None, "{ok} should be accepted");
        }
        for bad in ["not a url", "http://", "example", "http://127.0.0/x", "http://[zz]/"] {
            assert_eq!(
                schema.validate(Some(bad)),
                Some("Invalid URL".to_string()),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_required_rejects_whitespace() {
        let schema = string().required();
        assert_eq!(schema.validate(Some("   ")), Some("Required".to_string()));
        assert_eq!(schema.validate(None), Some("Required".to_string()));
        assert_eq!(schema.validate(Some("x")), None);
    }

    #[test]
    fn test_absent_value_skips_kind_constraints() {
        assert_eq!(string().min(3).validate(None), None);
    }

    #[test]
    fn test_parse_round_trip_and_transform() {
        let schema = string().min(1);
        assert_eq!(schema.parse("hello"), Ok("hello".to_string()));

        let upper = schema.transform(|value| value.to_uppercase());
        assert_eq!(upper.parse("hello"), Ok("HELLO".to_string()));
        assert!(upper.safe_parse("").error().is_some());
    }

    #[test]
    fn test_transformed_schema_keeps_kind_methods() {
        let schema = string().transform(|value| value.len()).max(3);
        assert_eq!(schema.parse("abc"), Ok(3));
        assert!(schema.parse("abcd").is_err());
    }
}
