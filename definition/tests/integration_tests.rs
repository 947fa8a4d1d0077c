use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use serde_json::json;
use tempfile::TempDir;
use valchain_core::AnySchema;
use valchain_definition::{
    CheckConfig, CheckMode, DefinitionError, DefinitionSet, LintError, SchemaDefinition,
    validate_definition_set,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const USERS_YAML: &str = r#"
version: "1"
schemas:
  user:
    type: object
    checks:
      - rule: strict
    fields:
      - name: name
        schema:
          type: string
          checks:
            - rule: required
              message: Name is required
            - rule: max
              value: 40
      - name: email
        schema:
          type: string
          checks: [{ rule: required }, { rule: email }]
      - name: age
        schema:
          type: number
          optional: true
          checks: [{ rule: integer }, { rule: min, value: 13 }]
      - name: roles
        schema:
          type: array
          items: { type: string, checks: [{ rule: starts_with, value: "role:" }] }
          checks: [{ rule: nonempty }, { rule: unique }]
"#;

const ORDERS_JSON: &str = r#"{
  "version": "1",
  "schemas": {
    "order": {
      "type": "object",
      "fields": [
        {"name": "id", "schema": {"type": "string", "checks": [{"rule": "required"}, {"rule": "length", "value": 8}]}},
        {"name": "paid", "schema": {"type": "boolean", "checks": [{"rule": "must_be_true", "message": "Unpaid"}]}},
        {"name": "total", "schema": {"type": "number", "checks": [{"rule": "nonnegative"}, {"rule": "multiple_of", "value": 0.5}]}}
      ]
    }
  }
}"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn fixture_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "users.yml", USERS_YAML);
    write(dir.path(), "orders.json", ORDERS_JSON);
    dir
}

// ---------------------------------------------------------------------------
// Loading and compiling
// ---------------------------------------------------------------------------

#[test]
fn test_directory_loading_and_compile() {
    let dir = fixture_dir();
    let set = DefinitionSet::from_dir(dir.path()).unwrap();
    assert_eq!(set.len(), 2);
    assert!(validate_definition_set(&set).is_empty());

    let registry = set.compile().unwrap();
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["order", "user"]);
}

#[test]
fn test_compiled_user_schema_reports_every_issue() {
    let registry = DefinitionSet::from_dir(fixture_dir().path())
        .unwrap()
        .compile()
        .unwrap();
    let user = registry.require("user").unwrap();

    let input = json!({
        "name": "  ",
        "email": "ada@example.com",
        "age": 12,
        "roles": ["role:admin", "admin", "role:admin"],
        "nickname": "ada",
    });
    assert_eq!(
        user.check_all(Some(&input)),
        vec![
            "name: Name is required",
            "age: Must be at least 13",
            r#"roles: {"1":"Must start with \"role:\"","root":"Duplicate items at index 0 and 2"}"#,
            "root: Unrecognized key: \"nickname\"",
        ]
    );

    let valid = json!({"name": "Ada", "email": "ada@example.com", "roles": ["role:admin"]});
    assert!(user.check_all(Some(&valid)).is_empty());
}

#[test]
fn test_compiled_order_schema_first_error() {
    let registry = DefinitionSet::load(write(
        TempDir::new().unwrap().path(),
        "orders.json",
        ORDERS_JSON,
    ))
    .unwrap()
    .compile()
    .unwrap();
    let order = registry.require("order").unwrap();

    let input = json!({"id": "ord_0001", "paid": false, "total": 10.25});
    assert_eq!(
        CheckMode::First.run(&*order, Some(&input)),
        vec![r#"{"paid":"Unpaid","total":"Must be a multiple of 0.5"}"#]
    );
    assert_eq!(
        CheckMode::All.run(&*order, Some(&input)),
        vec!["paid: Unpaid", "total: Must be a multiple of 0.5"]
    );
}

#[test]
fn test_compiled_numeric_checks_use_numeric_equality() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "prices.yml",
        r#"
version: "1"
schemas:
  prices:
    type: array
    items: { type: number, checks: [{ rule: multiple_of, value: 0.1 }] }
    checks: [{ rule: unique }]
"#,
    );
    let registry = DefinitionSet::load(&path).unwrap().compile().unwrap();
    let prices = registry.require("prices").unwrap();

    let distinct: serde_json::Value = serde_json::from_str("[0.3, 0.7, 1.1]").unwrap();
    assert!(prices.check_all(Some(&distinct)).is_empty());

    let repeated: serde_json::Value = serde_json::from_str("[1, 0.3, 1.0]").unwrap();
    assert_eq!(
        prices.check_all(Some(&repeated)),
        vec!["root: Duplicate items at index 0 and 2"]
    );
    assert_eq!(
        prices.check_all(Some(&json!([0.25]))),
        vec!["0: Must be a multiple of 0.1"]
    );
}

#[test]
fn test_registry_schema_parses_json() {
    let registry = DefinitionSet::from_dir(fixture_dir().path())
        .unwrap()
        .compile()
        .unwrap();
    let order = registry.require("order").unwrap();

    let input = json!({"id": "ord_0001", "paid": true, "total": 2.5});
    assert_eq!(order.parse_json(Some(&input)), Ok(input.clone()));

    let outcome = order.safe_parse_json(None);
    let issues = outcome.error().and_then(|error| error.issues()).unwrap();
    assert_eq!(issues.get("root"), Some("Must be an object"));

    let user = registry.require("user").unwrap();
    assert_eq!(
        serde_json::to_value(user.safe_parse_json(Some(&json!({"email": "a@b.co", "roles": ["role:x"]}))))
            .unwrap(),
        json!({"success": false, "error": {"name": "Name is required"}})
    );
}

#[test]
fn test_lint_failure_blocks_compile() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "bad.yaml",
        r#"
version: "1"
schemas:
  code:
    type: string
    checks: [{ rule: regex, pattern: "([a-z]" }]
"#,
    );
    let set = DefinitionSet::load(&path).unwrap();

    let findings = validate_definition_set(&set);
    assert_eq!(findings.len(), 1);
    assert!(matches!(&findings[0], LintError::InvalidPattern { path, .. } if path == "code"));
    assert!(matches!(set.compile(), Err(DefinitionError::Invalid(errors)) if errors == findings));
}

#[test]
fn test_bad_document_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "broken.json", r#"{"version": "1", "schemas": {"x": {"type": "date"}}}"#);
    assert!(matches!(DefinitionSet::load(&path), Err(DefinitionError::JsonError(_))));

    let path = write(dir.path(), "broken.yml", "version: [\n");
    assert!(matches!(DefinitionSet::load(&path), Err(DefinitionError::YamlError(_))));

    assert!(matches!(
        DefinitionSet::load(dir.path().join("missing.yml")),
        Err(DefinitionError::IoError(_))
    ));
}

#[test]
fn test_definition_serialization_roundtrip() {
    let set: DefinitionSet = serde_yaml::from_str(USERS_YAML).unwrap();
    let json = serde_json::to_string(&set).unwrap();
    let back: DefinitionSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, set);
    assert!(matches!(back.get("user"), Some(SchemaDefinition::Object(_))));
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_config_drives_loading() {
    let dir = fixture_dir();
    let config_path = dir.path().join("valchain.yml");
    let config = CheckConfig {
        definitions: vec!["users.yml".into(), "orders.json".into()],
        mode: CheckMode::All,
        ..CheckConfig::default()
    };
    config.save(&config_path).unwrap();

    let loaded = CheckConfig::load(&config_path).unwrap();
    let set = DefinitionSet::from_files(loaded.definition_paths(&config_path)).unwrap();
    assert_eq!(set.names().collect::<Vec<_>>(), vec!["order", "user"]);
    assert_eq!(loaded.mode, CheckMode::All);
}

// ---------------------------------------------------------------------------
// Sharing
// ---------------------------------------------------------------------------

#[test]
fn test_registry_schema_shared_across_threads() {
    let registry = DefinitionSet::from_dir(fixture_dir().path())
        .unwrap()
        .compile()
        .unwrap();
    let order: Arc<dyn AnySchema> = registry.require("order").unwrap();

    thread::scope(|scope| {
        for worker in 0..4 {
            let order = Arc::clone(&order);
            scope.spawn(move || {
                let total = f64::from(worker) * 0.5;
                let input = json!({"id": "ord_0001", "paid": true, "total": total});
                assert!(order.check_all(Some(&input)).is_empty());
            });
        }
    });
}
