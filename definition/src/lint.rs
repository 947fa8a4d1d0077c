//! Structural linting of definition sets.
//!
//! Catches problems that deserialization accepts but that make a schema
//! useless or uncompilable: empty names, duplicate fields, bad patterns,
//! degenerate `multiple_of` steps and bound pairs no value can satisfy.
//!
//! # Examples
//!
//! ```
//! use valchain_definition::{DefinitionSet, LintError, validate_definition_set};
//!
//! let set: DefinitionSet = serde_yaml::from_str(r#"
//! version: "1"
//! schemas:
//!   age:
//!     type: number
//!     checks: [{ rule: min, value: 18 }, { rule: max, value: 10 }]
//! "#).unwrap();
//!
//! assert_eq!(
//!     validate_definition_set(&set),
//!     vec![LintError::ConflictingBounds { path: "age".into(), min: 18.0, max: 10.0 }]
//! );
//! ```

use std::collections::HashSet;

use crate::definition::{ArrayCheck, NumberCheck, SchemaDefinition, StringCheck, compile_pattern};
use crate::error::LintError;
use crate::loader::DefinitionSet;

/// Lints every schema of `set`.
///
/// An empty version stops the pass immediately; otherwise every problem in
/// every schema is reported, in schema-name order.
pub fn validate_definition_set(set: &DefinitionSet) -> Vec<LintError> {
    let mut errors = Vec::new();

    if set.version.trim().is_empty() {
        errors.push(LintError::EmptyVersion);
        return errors;
    }

    for (name, definition) in &set.schemas {
        if name.trim().is_empty() {
            errors.push(LintError::EmptySchemaName);
            continue;
        }
        errors.extend(validate_definition(name, definition));
    }

    errors
}

/// Lints a single definition rooted at `path`.
pub fn validate_definition(path: &str, definition: &SchemaDefinition) -> Vec<LintError> {
    let mut errors = Vec::new();
    lint_node(path, definition, &mut errors);
    errors
}

fn lint_node(path: &str, definition: &SchemaDefinition, errors: &mut Vec<LintError>) {
    match definition {
        SchemaDefinition::String(string) => {
            let mut bounds = Bounds::default();
            for check in &string.checks {
                match check {
                    StringCheck::Min { value, .. } => bounds.min(*value as f64),
                    StringCheck::Max { value, .. } => bounds.max(*value as f64),
                    StringCheck::Length { value, .. } => {
                        bounds.min(*value as f64);
                        bounds.max(*value as f64);
                    }
                    StringCheck::Regex { pattern, .. } => {
                        if let Err(err) = compile_pattern(pattern) {
                            errors.push(LintError::InvalidPattern {
                                path: path.to_string(),
                                reason: err.to_string(),
                            });
                        }
                    }
                    _ => {}
                }
            }
            bounds.report(path, errors);
        }
        SchemaDefinition::Number(number) => {
            let mut bounds = Bounds::default();
            for check in &number.checks {
                match check {
                    NumberCheck::Min { value, .. } => bounds.min(*value),
                    NumberCheck::Max { value, .. } => bounds.max(*value),
                    NumberCheck::MultipleOf { value, .. } if *value == 0.0 || !value.is_finite() => {
                        errors.push(LintError::InvalidStep {
                            path: path.to_string(),
                            step: *value,
                        });
                    }
                    _ => {}
                }
            }
            bounds.report(path, errors);
        }
        SchemaDefinition::Boolean(_) => {}
        SchemaDefinition::Array(array) => {
            let mut bounds = Bounds::default();
            for check in &array.checks {
                match check {
                    ArrayCheck::Min { value, .. } => bounds.min(*value as f64),
                    ArrayCheck::Max { value, .. } => bounds.max(*value as f64),
                    ArrayCheck::Length { value, .. } => {
                        bounds.min(*value as f64);
                        bounds.max(*value as f64);
                    }
                    _ => {}
                }
            }
            bounds.report(path, errors);
            lint_node(&format!("{path}[]"), &array.items, errors);
        }
        SchemaDefinition::Object(object) => {
            let mut seen: HashSet<&str> = HashSet::new();
            for field in &object.fields {
                if field.name.trim().is_empty() {
                    errors.push(LintError::EmptyFieldName(path.to_string()));
                    continue;
                }
                let field_path = format!("{path}.{}", field.name);
                if !seen.insert(field.name.as_str()) {
                    errors.push(LintError::DuplicateField(field_path));
                    continue;
                }
                lint_node(&field_path, &field.schema, errors);
            }
        }
    }
}

/// Tightest lower and upper bound declared on one node.
#[derive(Default)]
struct Bounds {
    min: Option<f64>,
    max: Option<f64>,
}

impl Bounds {
    fn min(&mut self, value: f64) {
        self.min = Some(self.min.map_or(value, |current| current.max(value)));
    }

    fn max(&mut self, value: f64) {
        self.max = Some(self.max.map_or(value, |current| current.min(value)));
    }

    fn report(&self, path: &str, errors: &mut Vec<LintError>) {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => errors.push(LintError::ConflictingBounds {
                path: path.to_string(),
                min,
                max,
            }),
            _ => {}
        }
    }
}
