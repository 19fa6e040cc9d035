// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn missing_artifacts_message_lists_full_set() {
    let err = WaveError::MissingArtifacts(vec![
        MissingArtifactRef {
            artifact_name: ArtifactName::new("a1"),
            producer_step: StepId::new("x"),
        },
        MissingArtifactRef {
            artifact_name: ArtifactName::new("a2"),
            producer_step: StepId::new("y"),
        },
    ]);
    let msg = err.to_string();
    assert!(msg.contains("a1 from x"));
    assert!(msg.contains("a2 from y"));
}

#[test]
fn classification_maps_adapter_failure_through() {
    let err = WaveError::AdapterFailed(FailureClassification::RateLimit);
    assert_eq!(err.classification(), FailureClassification::RateLimit);
}

#[test]
fn classification_maps_contract_and_cancellation() {
    assert_eq!(
        WaveError::ContractFailed {
            message: "bad".into(),
            attempt: 2
        }
        .classification(),
        FailureClassification::ContractFailed
    );
    assert_eq!(WaveError::Cancelled.classification(), FailureClassification::Cancelled);
}
