// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn valid_instance_against_inline_schema_passes() {
    let dir = TempDir::new().unwrap();
    let artifact = write(dir.path(), "out.json", r#"{"ok": true}"#);
    let schema = json!({"type": "object", "properties": {"ok": {"type": "boolean"}}, "required": ["ok"]});
    let errors = validate(Some(&schema), None, dir.path(), &artifact).unwrap();
    assert!(errors.is_empty());
}

#[test]
fn type_mismatch_is_rejected_without_coercion() {
    let dir = TempDir::new().unwrap();
    let artifact = write(dir.path(), "out.json", r#"{"ok": "yes"}"#);
    let schema = json!({"type": "object", "properties": {"ok": {"type": "boolean"}}, "required": ["ok"]});
    let errors = validate(Some(&schema), None, dir.path(), &artifact).unwrap();
    assert!(!errors.is_empty());
}

#[test]
fn boundary_adjacent_violations_are_rejected() {
    let dir = TempDir::new().unwrap();
    let artifact = write(dir.path(), "out.json", r#"{"n": 101}"#);
    let schema = json!({"type": "object", "properties": {"n": {"type": "integer", "maximum": 100}}});
    let errors = validate(Some(&schema), None, dir.path(), &artifact).unwrap();
    assert!(!errors.is_empty());
}

#[test]
fn boundary_value_itself_passes() {
    let dir = TempDir::new().unwrap();
    let artifact = write(dir.path(), "out.json", r#"{"n": 100}"#);
    let schema = json!({"type": "object", "properties": {"n": {"type": "integer", "maximum": 100}}});
    let errors = validate(Some(&schema), None, dir.path(), &artifact).unwrap();
    assert!(errors.is_empty());
}

#[test]
fn malformed_json_with_trailing_comma_is_a_hard_reject() {
    let dir = TempDir::new().unwrap();
    let artifact = write(dir.path(), "out.json", r#"{"ok": true,}"#);
    let schema = json!({"type": "object"});
    let errors = validate(Some(&schema), None, dir.path(), &artifact).unwrap();
    assert!(!errors.is_empty());
}

#[test]
fn malformed_json_with_comments_is_a_hard_reject() {
    let dir = TempDir::new().unwrap();
    let artifact = write(dir.path(), "out.json", "// comment\n{\"ok\": true}");
    let schema = json!({"type": "object"});
    let errors = validate(Some(&schema), None, dir.path(), &artifact).unwrap();
    assert!(!errors.is_empty());
}

#[test]
fn schema_path_is_resolved_under_the_approved_directory() {
    let dir = TempDir::new().unwrap();
    let schema_dir = dir.path().join("schemas");
    std::fs::create_dir(&schema_dir).unwrap();
    write(&schema_dir, "step.schema.json", r#"{"type": "object"}"#);
    let artifact = write(dir.path(), "out.json", r#"{"ok": true}"#);

    let errors = validate(
        None,
        Some(Path::new("step.schema.json")),
        &schema_dir,
        &artifact,
    )
    .unwrap();
    assert!(errors.is_empty());
}

#[test]
fn schema_path_escaping_the_approved_directory_is_rejected() {
    let dir = TempDir::new().unwrap();
    let schema_dir = dir.path().join("schemas");
    std::fs::create_dir(&schema_dir).unwrap();
    let artifact = write(dir.path(), "out.json", r#"{"ok": true}"#);

    let err = validate(
        None,
        Some(Path::new("../secrets.json")),
        &schema_dir,
        &artifact,
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::SchemaPathEscape(_)));
}
