//! Constraint functions, the leaf building block of every schema.

use std::sync::Arc;

/// A single rule: a pure function from an optional value to an optional
/// error message.
///
/// Constraints are cheap to clone (the closure is shared) and never change
/// after construction. [`with_message`](Constraint::with_message) builds a
/// new constraint that reports a different message for the same rule.
///
/// # Examples
///
/// ```
/// use valchain_core::Constraint;
///
/// let short = Constraint::<str>::present(|value| {
///     (value.len() > 3).then(|| "Too long".to_string())
/// });
/// assert_eq!(short.check(Some("abcd")), Some("Too long".to_string()));
/// assert_eq!(short.check(Some("abc")), None);
/// assert_eq!(short.check(None), None);
///
/// let relabelled = short.with_message("Keep it short");
/// assert_eq!(relabelled.check(Some("abcd")), Some("Keep it short".to_string()));
/// ```
pub struct Constraint<V: ?Sized + 'static> {
    check: Arc<dyn Fn(Option<&V>) -> Option<String> + Send + Sync>,
    message: Option<Arc<str>>,
}

impl<V: ?Sized + 'static> Clone for Constraint<V> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
            message: self.message.clone(),
        }
    }
}

impl<V: ?Sized + 'static> std::fmt::Debug for Constraint<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constraint")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl<V: ?Sized + 'static> Constraint<V> {
    /// Wraps a check that also sees absent values.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(Option<&V>) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
            message: None,
        }
    }

    /// Wraps a check that only runs on present values; absent values pass.
    pub fn present<F>(check: F) -> Self
    where
        F: Fn(&V) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(move |value: Option<&V>| value.and_then(|value| check(value)))
    }

    /// Fails with `message` whenever `predicate` returns `false` for a
    /// present value.
    pub fn predicate<F>(predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        let message: String = message.into();
        Self::present(move |value| (!predicate(value)).then(|| message.clone()))
    }

    /// Returns a copy of this constraint that reports `message` on failure.
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            check: Arc::clone(&self.check),
            message: Some(Arc::from(message)),
        }
    }

    /// Runs the rule.
    pub fn check(&self, value: Option<&V>) -> Option<String> {
        let failure = (self.check)(value)?;
        Some(match &self.message {
            Some(message) => message.to_string(),
            None => failure,
        })
    }
}
