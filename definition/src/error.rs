//! Error types for loading and compiling schema definitions.
//!
//! Provides a unified error type covering I/O, deserialization, pattern
//! compilation and registry lookups, plus [`LintError`] for structural
//! problems found by [`validate_definition_set`](crate::validate_definition_set).

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or compiling definitions.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A `regex` check carries a pattern that does not compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A definition file whose extension is not `.json`, `.yml` or `.yaml`.
    #[error("unsupported definition file: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Two definition files declare the same schema name.
    #[error("duplicate schema: {0}")]
    DuplicateSchema(String),

    /// A schema name was requested that no loaded file declares.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// Linting found structural problems.
    #[error("invalid definitions: {}", format_lint(.0))]
    Invalid(Vec<LintError>),
}

/// Structural problems in a [`DefinitionSet`](crate::DefinitionSet).
///
/// Paths are dotted from the schema name, with `[]` marking array items
/// (e.g. `order.lines[].sku`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LintError {
    /// Definition set version string is empty.
    #[error("definition version cannot be empty")]
    EmptyVersion,
    /// A schema is registered under an empty or whitespace-only name.
    #[error("schema name cannot be empty")]
    EmptySchemaName,
    /// An object field has an empty name.
    #[error("empty field name at: {0}")]
    EmptyFieldName(String),
    /// Two fields of the same object share a name.
    #[error("duplicate field: {0}")]
    DuplicateField(String),
    /// A `regex` check does not compile.
    #[error("invalid pattern at {path}: {reason}")]
    InvalidPattern { path: String, reason: String },
    /// A `min` bound exceeds a `max` bound, so no value can pass.
    #[error("conflicting bounds at {path}: min {min} > max {max}")]
    ConflictingBounds { path: String, min: f64, max: f64 },
    /// A `multiple_of` step is zero or not finite.
    #[error("invalid multiple_of step at {path}: {step}")]
    InvalidStep { path: String, step: f64 },
}

fn format_lint(errors: &[LintError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias for results with [`DefinitionError`].
pub type Result<T> = std::result::Result<T, DefinitionError>;
