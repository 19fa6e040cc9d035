// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use std::collections::HashMap;
use tempfile::TempDir;
use wave_core::ArtifactName;

fn ctx(dir: &std::path::Path, artifact_name: &str, artifact_path: std::path::PathBuf) -> ValidationContext {
    let mut artifact_paths = HashMap::new();
    artifact_paths.insert(artifact_name.to_string(), artifact_path);
    ValidationContext {
        workspace_path: dir.to_path_buf(),
        schema_dir: dir.to_path_buf(),
        artifact_paths,
    }
}

#[tokio::test]
async fn passing_json_schema_contract_yields_pass() {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join("out.json");
    std::fs::write(&artifact, r#"{"ok": true}"#).unwrap();

    let kind = ContractKind::JsonSchema {
        schema: Some(json!({"type": "object", "required": ["ok"]})),
        schema_path: None,
        artifact: ArtifactName::new("out"),
    };
    let decision = validate(&kind, true, &ctx(dir.path(), "out", artifact), 1, 2).await;
    assert_eq!(decision, Decision::Pass);
}

#[tokio::test]
async fn failing_must_pass_contract_yields_fail_with_attempt_recorded() {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join("out.json");
    std::fs::write(&artifact, r#"{"ok": "nope"}"#).unwrap();

    let kind = ContractKind::JsonSchema {
        schema: Some(json!({"type": "object", "properties": {"ok": {"type": "boolean"}}})),
        schema_path: None,
        artifact: ArtifactName::new("out"),
    };
    let decision = validate(&kind, true, &ctx(dir.path(), "out", artifact), 1, 3).await;
    match decision {
        Decision::Fail(err) => {
            assert_eq!(err.contract_type, "json_schema");
            assert_eq!(err.attempt, 1);
            assert_eq!(err.max_retries, 3);
        }
        other => panic!("expected Fail, got {other:?}"),
    }
}

#[tokio::test]
async fn failing_non_must_pass_contract_yields_warn() {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join("out.json");
    std::fs::write(&artifact, r#"{"ok": "nope"}"#).unwrap();

    let kind = ContractKind::JsonSchema {
        schema: Some(json!({"type": "object", "properties": {"ok": {"type": "boolean"}}})),
        schema_path: None,
        artifact: ArtifactName::new("out"),
    };
    let decision = validate(&kind, false, &ctx(dir.path(), "out", artifact), 1, 3).await;
    assert!(matches!(decision, Decision::Warn(_)));
}

#[tokio::test]
async fn missing_artifact_is_a_failure_not_a_panic() {
    let dir = TempDir::new().unwrap();
    let kind = ContractKind::JsonSchema {
        schema: Some(json!({"type": "object"})),
        schema_path: None,
        artifact: ArtifactName::new("missing"),
    };
    let decision = validate(&kind, true, &ctx(dir.path(), "other", dir.path().join("x")), 1, 1).await;
    assert!(matches!(decision, Decision::Fail(_)));
}

#[tokio::test]
async fn test_suite_contract_dispatches_to_the_workspace_command() {
    let dir = TempDir::new().unwrap();
    let kind = ContractKind::TestSuite {
        command: "sh".to_string(),
        args: vec!["-c".to_string(), "exit 0".to_string()],
    };
    let decision = validate(&kind, true, &ctx(dir.path(), "x", dir.path().join("x")), 1, 1).await;
    assert_eq!(decision, Decision::Pass);
}

#[tokio::test]
async fn template_contract_reports_missing_sections_as_details() {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join("doc.md");
    std::fs::write(&artifact, "# Summary\n").unwrap();

    let kind = ContractKind::Template {
        artifact: ArtifactName::new("doc"),
        required_sections: vec!["Summary".to_string(), "Risks".to_string()],
    };
    let decision = validate(&kind, true, &ctx(dir.path(), "doc", artifact), 1, 1).await;
    match decision {
        Decision::Fail(err) => assert!(err.details.iter().any(|d| d.contains("Risks"))),
        other => panic!("expected Fail, got {other:?}"),
    }
}
