//! Number schemas. Values are `f64`, as parsed from JSON.

use crate::constraint::Constraint;
use crate::schema::{Core, Schema};

/// Schema for numeric values, checked as `f64`. Bounds are inclusive.
///
/// # Examples
///
/// ```
/// use valchain_core::{Schema, number};
///
/// let exactly_five = number().min(5.0).max(5.0);
/// assert_eq!(exactly_five.validate(Some(&5.0)), None);
/// assert_eq!(exactly_five.validate(Some(&4.0)), Some("Must be at least 5".to_string()));
/// assert_eq!(exactly_five.validate(Some(&6.0)), Some("Must be at most 5".to_string()));
/// ```
pub struct NumberSchema<O = f64> {
    core: Core<f64, O>,
}

impl NumberSchema {
    /// Creates a number schema with no constraints.
    pub fn new() -> Self {
        Self { core: Core::new() }
    }
}

impl Default for NumberSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Clone for NumberSchema<O> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<O> std::fmt::Debug for NumberSchema<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumberSchema")
            .field("core", &self.core)
            .finish()
    }
}

impl<O: 'static> Schema for NumberSchema<O> {
    type Value = f64;
    type Output = O;

    fn core(&self) -> &Core<f64, O> {
        &self.core
    }

    fn with_core(&self, core: Core<f64, O>) -> Self {
        Self { core }
    }
}

impl<O: 'static> NumberSchema<O> {
    /// A finite value with no fractional part.
    pub fn integer(&self) -> Self {
        self.with_constraint(Constraint::predicate(
            |value: &f64| value.is_finite() && value.fract() == 0.0,
            "Must be an integer",
        ))
    }

    /// Greater than or equal to `bound`.
    pub fn min(&self, bound: f64) -> Self {
        self.with_constraint(Constraint::present(move |value: &f64| {
            (*value < bound).then(|| format!("Must be at least {bound}"))
        }))
    }

    /// Less than or equal to `bound`.
    pub fn max(&self, bound: f64) -> Self {
        self.with_constraint(Constraint::present(move |value: &f64| {
            (*value > bound).then(|| format!("Must be at most {bound}"))
        }))
    }

    /// Strictly greater than zero.
    pub fn positive(&self) -> Self {
        self.with_constraint(Constraint::predicate(|value: &f64| *value > 0.0, "Must be positive"))
    }

    /// Strictly less than zero.
    pub fn negative(&self) -> Self {
        self.with_constraint(Constraint::predicate(|value: &f64| *value < 0.0, "Must be negative"))
    }

    pub fn nonnegative(&self) -> Self {
        self.with_constraint(Constraint::predicate(
            |value: &f64| *value >= 0.0,
            "Must be non-negative",
        ))
    }

    /// An integral multiple of `step`, allowing for binary rounding, so
    /// `0.3` is a multiple of `0.1`. The sign of `step` is ignored. With a
    /// zero step only `0` passes; a non-finite step rejects every value.
    ///
    /// ```
    /// use valchain_core::{Schema, number};
    ///
    /// let cents = number().multiple_of(0.01);
    /// assert_eq!(cents.validate(Some(&19.99)), None);
    /// assert_eq!(cents.validate(Some(&0.005)), Some("Must be a multiple of 0.01".to_string()));
    /// ```
    pub fn multiple_of(&self, step: f64) -> Self {
        self.with_constraint(Constraint::present(move |value: &f64| {
            (!is_multiple(*value, step)).then(|| format!("Must be a multiple of {step}"))
        }))
    }

    /// Rejects infinities and NaN.
    pub fn finite(&self) -> Self {
        self.with_constraint(Constraint::predicate(|value: &f64| value.is_finite(), "Must be finite"))
    }

    /// Sets the output produced by `parse`; validation is unaffected.
    pub fn transform<P, F>(&self, output: F) -> NumberSchema<P>
    where
        P: 'static,
        F: Fn(f64) -> P + Send + Sync + 'static,
    {
        NumberSchema {
            core: self.core.with_output(output),
        }
    }
}

/// Relative tolerance of [`is_multiple`], far above `f64` rounding error.
const MULTIPLE_TOLERANCE: f64 = 1e-9;

fn is_multiple(value: f64, step: f64) -> bool {
    if !value.is_finite() || !step.is_finite() {
        return false;
    }
    if step == 0.0 {
        return value == 0.0;
    }
    let quotient = value / step;
    (quotient - quotient.round()).abs() <= MULTIPLE_TOLERANCE * quotient.abs().max(1.0)
}
