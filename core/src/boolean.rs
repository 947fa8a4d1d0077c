//! Boolean schemas.

use crate::constraint::Constraint;
use crate::schema::{Core, Schema};

/// Schema for boolean values.
///
/// # Examples
///
/// ```
/// use valchain_core::{Schema, boolean};
///
/// let terms = boolean().required().must_be_true().message("Accept the terms");
/// assert_eq!(terms.validate(Some(&true)), None);
/// assert_eq!(terms.validate(Some(&false)), Some("Accept the terms".to_string()));
/// assert_eq!(terms.validate(None), Some("Required".to_string()));
/// ```
pub struct BooleanSchema<O = bool> {
    core: Core<bool, O>,
}

impl BooleanSchema {
    /// Creates a boolean schema with no constraints.
    pub fn new() -> Self {
        Self { core: Core::new() }
    }
}

impl Default for BooleanSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Clone for BooleanSchema<O> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<O> std::fmt::Debug for BooleanSchema<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BooleanSchema")
            .field("core", &self.core)
            .finish()
    }
}

impl<O: 'static> Schema for BooleanSchema<O> {
    type Value = bool;
    type Output = O;

    fn core(&self) -> &Core<bool, O> {
        &self.core
    }

    fn with_core(&self, core: Core<bool, O>) -> Self {
        Self { core }
    }
}

impl<O: 'static> BooleanSchema<O> {
    /// Only `true` passes.
    pub fn must_be_true(&self) -> Self {
        self.with_constraint(Constraint::predicate(|value: &bool| *value, "Must be true"))
    }

    /// Only `false` passes.
    pub fn must_be_false(&self) -> Self {
        self.with_constraint(Constraint::predicate(|value: &bool| !*value, "Must be false"))
    }

    /// Sets the output produced by `parse`; validation is unaffected.
    pub fn transform<P, F>(&self, output: F) -> BooleanSchema<P>
    where
        P: 'static,
        F: Fn(bool) -> P + Send + Sync + 'static,
    {
        BooleanSchema {
            core: self.core.with_output(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean;

    #[test]
    fn test_exact_value_checks() {
        assert_eq!(boolean().must_be_true().validate(Some(&true)), None);
        assert_eq!(
            boolean().must_be_true().validate(Some(&false)),
            Some("Must be true".to_string())
        );
        assert_eq!(boolean().must_be_false().validate(Some(&false)), None);
        assert_eq!(
            boolean().must_be_false().validate(Some(&true)),
            Some("Must be false".to_string())
        );
    }

    #[test]
    fn test_required_accepts_false() {
        assert_eq!(boolean().required().validate(Some(&false)), None);
    }

    #[test]
    fn test_transform() {
        let label = boolean().transform(|flag| if flag { "yes" } else { "no" });
        assert_eq!(label.parse(&true), Ok("yes"));
        assert_eq!(label.parse(&false), Ok("no"));
    }
}
