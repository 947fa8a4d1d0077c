//! Run configuration for document checks.
//!
//! Defines the YAML-serializable configuration that tells the checker which
//! definition files to load, whether to stop at the first error, and how many
//! documents to check in parallel.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1"
//! definitions:
//!   - schemas/users.yml
//!   - schemas/orders.json
//! mode: all
//! jobs: 8
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use valchain_core::AnySchema;

use crate::error::Result;

/// How many errors a check reports per document.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use valchain_core::{Schema, number};
/// use valchain_definition::CheckMode;
///
/// let schema = number().integer().positive();
/// let input = json!(-1.5);
/// assert_eq!(CheckMode::First.run(&schema, Some(&input)), vec!["Must be an integer"]);
/// assert_eq!(CheckMode::All.run(&schema, Some(&input)).len(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// Stop at the first failing constraint.
    #[default]
    First,
    /// Report every failing constraint.
    All,
}

impl CheckMode {
    /// Validates `value` with `schema` in this mode.
    pub fn run(self, schema: &dyn AnySchema, value: Option<&Value>) -> Vec<String> {
        match self {
            Self::First => schema.check(value).into_iter().collect(),
            Self::All => schema.check_all(value),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::All => "all",
        }
    }
}

fn default_jobs() -> usize {
    4
}

/// Top-level check configuration.
///
/// Loaded from a YAML file (typically `valchain.yml` next to the definition
/// files).
///
/// # Examples
///
/// ```no_run
/// use valchain_definition::CheckConfig;
///
/// let config = CheckConfig::load("valchain.yml").unwrap();
/// for path in config.definition_paths("valchain.yml") {
///     println!("definitions: {}", path.display());
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Configuration format version (e.g., `"1"`).
    pub version: String,
    /// Definition files to load, relative to the configuration file.
    #[serde(default)]
    pub definitions: Vec<PathBuf>,
    #[serde(default)]
    pub mode: CheckMode,
    /// Number of documents checked in parallel.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            definitions: Vec::new(),
            mode: CheckMode::default(),
            jobs: default_jobs(),
        }
    }
}

impl CheckConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DefinitionError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::DefinitionError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DefinitionError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::DefinitionError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Resolves `definitions` against the directory of `config_path`.
    /// Absolute entries are returned unchanged.
    pub fn definition_paths(&self, config_path: impl AsRef<Path>) -> Vec<PathBuf> {
        let base = config_path
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.definitions
            .iter()
            .map(|path| if path.is_absolute() { path.clone() } else { base.join(path) })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1"
definitions:
  - schemas/users.yml
  - /etc/valchain/shared.json
mode: all
jobs: 8
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: CheckConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1");
        assert_eq!(config.definitions.len(), 2);
        assert_eq!(config.mode, CheckMode::All);
        assert_eq!(config.jobs, 8);
    }

    #[test]
    fn test_deserialize_minimal_uses_defaults() {
        let config: CheckConfig = serde_yaml::from_str("version: \"1\"\n").unwrap();
        assert!(config.definitions.is_empty());
        assert_eq!(config.mode, CheckMode::First);
        assert_eq!(config.jobs, 4);
        assert_eq!(config, CheckConfig::default());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let result: std::result::Result<CheckConfig, _> =
            serde_yaml::from_str("version: \"1\"\nmode: some\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_definition_paths_are_relative_to_config() {
        let config: CheckConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        let paths = config.definition_paths("/srv/app/valchain.yml");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/srv/app/schemas/users.yml"),
                PathBuf::from("/etc/valchain/shared.json"),
            ]
        );
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("valchain.yml");

        let original: CheckConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = CheckConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
