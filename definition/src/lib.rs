//! Declarative schema definitions for `valchain`.
//!
//! This crate turns YAML or JSON documents describing schemas into compiled
//! [`valchain_core`] schemas, lints definition sets for structural problems,
//! and loads the run configuration used by the `valchain` binary.
//!
//! # Quick start
//!
//! ```no_run
//! use serde_json::json;
//! use valchain_definition::{CheckConfig, CheckMode, DefinitionSet};
//!
//! // Load every definition file of a directory and compile it
//! let registry = DefinitionSet::from_dir("schemas/").unwrap().compile().unwrap();
//! let user = registry.require("user").unwrap();
//!
//! let errors = CheckMode::All.run(&*user, Some(&json!({"email": "nope"})));
//! for error in errors {
//!     println!("{error}");
//! }
//!
//! // Run settings
//! let config = CheckConfig::load("valchain.yml").unwrap();
//! println!("checking with {} jobs", config.jobs);
//! ```

mod config;
mod definition;
mod error;
mod lint;
mod loader;

pub use config::{CheckConfig, CheckMode};
pub use definition::{
    ArrayCheck, ArrayDefinition, BooleanCheck, BooleanDefinition, FieldDefinition, NumberCheck,
    NumberDefinition, ObjectCheck, ObjectDefinition, SchemaDefinition, StringCheck,
    StringDefinition,
};
pub use error::{DefinitionError, LintError, Result};
pub use lint::{validate_definition, validate_definition_set};
pub use loader::{DefinitionFormat, DefinitionSet, SchemaRegistry};
