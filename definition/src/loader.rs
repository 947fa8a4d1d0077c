//! Definition file loading and the compiled schema registry.
//!
//! Provides [`DefinitionSet`] for reading schema definitions from JSON or
//! YAML files and [`SchemaRegistry`] for name lookup of compiled schemas.
//!
//! # Loading patterns
//!
//! ```no_run
//! use valchain_definition::DefinitionSet;
//!
//! // A single file; the format follows the extension
//! let set = DefinitionSet::load("schemas/user.yml").unwrap();
//!
//! // Every .json / .yml / .yaml file of a directory, merged
//! let set = DefinitionSet::from_dir("schemas/").unwrap();
//!
//! let registry = set.compile().unwrap();
//! assert!(registry.get("user").is_some());
//! ```

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use valchain_core::AnySchema;

use crate::definition::SchemaDefinition;
use crate::error::{DefinitionError, Result};
use crate::lint::validate_definition_set;

/// Serialization format of a definition file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Json,
    Yaml,
}

impl DefinitionFormat {
    /// Detects the format of `path` from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yml" | "yaml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Named schema definitions sharing one format version.
///
/// # Example YAML
///
/// ```yaml
/// version: "1"
/// schemas:
///   tag:
///     type: string
///     checks: [{ rule: min, value: 1 }, { rule: max, value: 20 }]
///   post:
///     type: object
///     fields:
///       - name: title
///         schema: { type: string, checks: [{ rule: required }] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionSet {
    /// Definition format version (e.g., `"1"`).
    pub version: String,
    /// Definitions by schema name.
    #[serde(default)]
    pub schemas: BTreeMap<String, SchemaDefinition>,
}

impl DefinitionSet {
    /// Creates an empty set.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            schemas: BTreeMap::new(),
        }
    }

    /// Loads a set from a `.json`, `.yml` or `.yaml` file.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnsupportedFormat`] for other extensions,
    /// [`DefinitionError::IoError`] if the file cannot be read, or a
    /// JSON/YAML error if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = DefinitionFormat::from_path(path)
            .ok_or_else(|| DefinitionError::UnsupportedFormat(path.to_path_buf()))?;
        let reader = BufReader::new(std::fs::File::open(path)?);
        let set: Self = match format {
            DefinitionFormat::Json => serde_json::from_reader(reader)?,
            DefinitionFormat::Yaml => serde_yaml::from_reader(reader)?,
        };
        debug!(path = %path.display(), schemas = set.len(), "loaded definition file");
        Ok(set)
    }

    /// Loads and merges several files, in the order given.
    ///
    /// # Errors
    ///
    /// Propagates load errors and returns
    /// [`DefinitionError::DuplicateSchema`] when two files declare the same
    /// name.
    pub fn from_files<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Result<Self> {
        let mut merged: Option<Self> = None;
        for path in paths {
            let set = Self::load(path)?;
            match merged.as_mut() {
                Some(existing) => existing.merge(set)?,
                None => merged = Some(set),
            }
        }
        Ok(merged.unwrap_or_default())
    }

    /// Loads and merges every definition file of a directory.
    ///
    /// Files are visited in file-name order; files with other extensions are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::IoError`] if the directory cannot be read,
    /// plus any error of [`from_files`](Self::from_files).
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(path.as_ref())? {
            let file_path = entry?.path();
            if file_path.is_file() && DefinitionFormat::from_path(&file_path).is_some() {
                files.push(file_path);
            }
        }
        files.sort();
        Self::from_files(files)
    }

    /// Moves every schema of `other` into `self`. The first version seen
    /// wins.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::DuplicateSchema`] on the first name both
    /// sets declare; `self` keeps the schemas merged so far.
    pub fn merge(&mut self, other: Self) -> Result<()> {
        if self.version.trim().is_empty() {
            self.version = other.version;
        }
        for (name, definition) in other.schemas {
            if self.schemas.contains_key(&name) {
                return Err(DefinitionError::DuplicateSchema(name));
            }
            self.schemas.insert(name, definition);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SchemaDefinition> {
        self.schemas.get(name)
    }

    /// Schema names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Lints the set, then compiles every definition.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Invalid`] with every lint finding, or the
    /// first compile error.
    pub fn compile(&self) -> Result<SchemaRegistry> {
        let findings = validate_definition_set(self);
        if !findings.is_empty() {
            return Err(DefinitionError::Invalid(findings));
        }

        let mut registry = SchemaRegistry::new();
        for (name, definition) in &self.schemas {
            registry.insert(name.clone(), definition.compile()?);
        }
        info!(version = %self.version, schemas = registry.len(), "compiled definitions");
        Ok(registry)
    }
}

/// Compiled schemas by name.
///
/// Schemas are shared, so a looked-up schema can be handed to worker threads
/// while the registry stays in place.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use valchain_core::{Schema, string};
/// use valchain_definition::SchemaRegistry;
///
/// let mut registry = SchemaRegistry::new();
/// registry.insert("slug", string().required().regex(regex::Regex::new("^[a-z-]+$").unwrap()).into_any());
///
/// let slug = registry.get("slug").unwrap();
/// assert_eq!(slug.check(Some(&json!("hello-world"))), None);
/// assert_eq!(slug.check(Some(&json!("Hello"))), Some("Invalid format".to_string()));
/// assert!(registry.get("missing").is_none());
/// ```
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<dyn AnySchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `schema` under `name`, replacing any earlier entry.
    pub fn insert(&mut self, name: impl Into<String>, schema: Arc<dyn AnySchema>) {
        self.schemas.insert(name.into(), schema);
    }

    /// Looks up a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn AnySchema>> {
        self.schemas.get(name).cloned()
    }

    /// Like [`get`](Self::get), failing with
    /// [`DefinitionError::UnknownSchema`].
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnknownSchema`] if `name` is not registered.
    pub fn require(&self, name: &str) -> Result<Arc<dyn AnySchema>> {
        self.get(name)
            .ok_or_else(|| DefinitionError::UnknownSchema(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    const TAGS_YAML: &str = r#"
version: "1"
schemas:
  tag:
    type: string
    checks: [{ rule: min, value: 1 }, { rule: max, value: 5 }]
"#;

    const POST_JSON: &str = r#"{
  "version": "1",
  "schemas": {
    "post": {
      "type": "object",
      "fields": [
        {"name": "title", "schema": {"type": "string", "checks": [{"rule": "required"}]}}
      ]
    }
  }
}"#;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_by_extension() {
        let dir = TempDir::new().unwrap();
        let yaml = DefinitionSet::load(write(dir.path(), "tags.yaml", TAGS_YAML)).unwrap();
        let json = DefinitionSet::load(write(dir.path(), "post.json", POST_JSON)).unwrap();

        assert_eq!(yaml.names().collect::<Vec<_>>(), vec!["tag"]);
        assert_eq!(json.names().collect::<Vec<_>>(), vec!["post"]);
        assert_eq!(json.get("post").map(SchemaDefinition::kind), Some("object"));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "tags.toml", TAGS_YAML);
        assert!(matches!(
            DefinitionSet::load(&path),
            Err(DefinitionError::UnsupportedFormat(p)) if p == path
        ));
    }

    #[test]
    fn test_from_dir_merges_and_skips_other_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.yml", TAGS_YAML);
        write(dir.path(), "b.json", POST_JSON);
        write(dir.path(), "README.md", "# not a definition");

        let set = DefinitionSet::from_dir(dir.path()).unwrap();
        assert_eq!(set.version, "1");
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["post", "tag"]);
    }

    #[test]
    fn test_duplicate_schema_across_files() {
        let dir = TempDir::new().unwrap();
        let first = write(dir.path(), "a.yml", TAGS_YAML);
        let second = write(dir.path(), "b.yml", TAGS_YAML);

        let err = DefinitionSet::from_files([first, second]).unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateSchema(name) if name == "tag"));
    }

    #[test]
    fn test_compile_builds_registry() {
        let set: DefinitionSet = serde_yaml::from_str(TAGS_YAML).unwrap();
        let registry = set.compile().unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("tag"));
        let tag = registry.require("tag").unwrap();
        assert_eq!(
            tag.check(Some(&json!("toolong"))),
            Some("Must be at most 5 characters".to_string())
        );
        assert!(matches!(
            registry.require("nope"),
            Err(DefinitionError::UnknownSchema(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_compile_reports_lint_findings() {
        let set: DefinitionSet = serde_yaml::from_str(
            "version: \"1\"\nschemas:\n  n: { type: number, checks: [{ rule: min, value: 3 }, { rule: max, value: 1 }] }\n",
        )
        .unwrap();
        let err = set.compile().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid definitions: conflicting bounds at n: min 3 > max 1"
        );
    }
}
