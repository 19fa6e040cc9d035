// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy. Each downstream crate returns one of
//! these kinds (sometimes wrapped in a crate-local `thiserror` enum that
//! adds transport-specific variants) so the executor and the CLI can match
//! on a single vocabulary instead of re-deriving classifications ad hoc.

use crate::event::FailureClassification;
use crate::ids::{ArtifactName, StepId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single unsatisfied artifact-injection reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingArtifactRef {
    pub artifact_name: ArtifactName,
    pub producer_step: StepId,
}

impl std::fmt::Display for MissingArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} from {}", self.artifact_name, self.producer_step)
    }
}

/// Top-level error taxonomy surfaced to the executor and the CLI.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WaveError {
    #[error("cycle detected through step {0}")]
    CycleDetected(StepId),

    #[error("unknown persona: {0}")]
    UnknownPersona(String),

    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    #[error("missing tool on PATH: {0}")]
    MissingTool(String),

    #[error("skill install failed: {0}")]
    SkillInstallFailed(String),

    #[error(
        "missing artifacts: {}",
        .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    MissingArtifacts(Vec<MissingArtifactRef>),

    #[error("contract failed after {attempt} attempt(s): {message}")]
    ContractFailed { message: String, attempt: u32 },

    #[error("adapter failed: {0}")]
    AdapterFailed(FailureClassification),

    #[error("workspace unavailable: {0}")]
    WorkspaceUnavailable(String),

    #[error("security violation: {0}")]
    Security(String),

    #[error("run cancelled")]
    Cancelled,
}

impl WaveError {
    /// Map this error onto the failure classification recorded on events.
    pub fn classification(&self) -> FailureClassification {
        match self {
            WaveError::CycleDetected(_)
            | WaveError::UnknownPersona(_)
            | WaveError::UnknownSkill(_) => FailureClassification::GeneralError,
            WaveError::MissingTool(_) | WaveError::SkillInstallFailed(_) => {
                FailureClassification::Preflight
            }
            WaveError::MissingArtifacts(_) => FailureClassification::Injection,
            WaveError::ContractFailed { .. } => FailureClassification::ContractFailed,
            WaveError::AdapterFailed(kind) => *kind,
            WaveError::WorkspaceUnavailable(_) => FailureClassification::GeneralError,
            WaveError::Security(_) => FailureClassification::Security,
            WaveError::Cancelled => FailureClassification::Cancelled,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
