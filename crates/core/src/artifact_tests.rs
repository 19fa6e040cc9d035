// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn artifact(validation: ArtifactValidation) -> Artifact {
    Artifact {
        run_id: RunId::new("r1"),
        step_id: StepId::new("a"),
        name: ArtifactName::new("spec"),
        path: "/tmp/spec.json".into(),
        type_hint: Some("json".into()),
        size_bytes: 9,
        created_at: Utc.timestamp_opt(0, 0).unwrap(),
        validation,
    }
}

#[test]
fn default_validation_is_not_validated() {
    let json = r#"{"run_id":"r1","step_id":"a","name":"spec","path":"/tmp/spec.json","size_bytes":9,"created_at":"1970-01-01T00:00:00Z"}"#;
    let a: Artifact = serde_json::from_str(json).unwrap();
    assert_eq!(a.validation, ArtifactValidation::NotValidated);
}

#[test]
fn warned_validation_carries_details() {
    let a = artifact(ArtifactValidation::Warned {
        details: vec!["missing section: Summary".into()],
    });
    let json = serde_json::to_string(&a).unwrap();
    let back: Artifact = serde_json::from_str(&json).unwrap();
    assert_eq!(back, a);
}

#[test]
fn identity_is_name_step_run() {
    let a = artifact(ArtifactValidation::Passed);
    let b = artifact(ArtifactValidation::Passed);
    assert_eq!((a.run_id, a.step_id, a.name), (b.run_id, b.step_id, b.name));
}
