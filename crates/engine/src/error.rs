// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-local error taxonomy. Every variant maps onto a
//! [`wave_core::WaveError`] kind so the CLI matches on one vocabulary
//!.

use thiserror::Error;
use wave_core::{MissingArtifactRef, StepId, WaveError};

#[derive(Debug, Error)]
pub enum EngineError {
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

    #[error("missing artifacts: {0:?}")]
    MissingArtifacts(Vec<MissingArtifactRef>),

    #[error("contract failed after {attempt} attempt(s): {message}")]
    ContractFailed { message: String, attempt: u32 },

    #[error("adapter failed: {0}")]
    AdapterFailed(#[from] wave_adapters::AdapterError),

    #[error("workspace unavailable: {0}")]
    WorkspaceUnavailable(String),

    #[error("security violation: {0}")]
    Security(String),

    #[error("run cancelled")]
    Cancelled,

    #[error("storage error: {0}")]
    Storage(#[from] wave_storage::StateError),

    #[error("step {0} failed: {1}")]
    StepFailed(StepId, String),
}

impl EngineError {
    pub fn to_wave_error(&self) -> WaveError {
        match self {
            EngineError::CycleDetected(s) => WaveError::CycleDetected(s.clone()),
            EngineError::UnknownPersona(s) => WaveError::UnknownPersona(s.clone()),
            EngineError::UnknownSkill(s) => WaveError::UnknownSkill(s.clone()),
            EngineError::MissingTool(s) => WaveError::MissingTool(s.clone()),
            EngineError::SkillInstallFailed(s) => WaveError::SkillInstallFailed(s.clone()),
            EngineError::MissingArtifacts(v) => WaveError::MissingArtifacts(v.clone()),
            EngineError::ContractFailed { message, attempt } => WaveError::ContractFailed {
                message: message.clone(),
                attempt: *attempt,
            },
            EngineError::AdapterFailed(e) => WaveError::AdapterFailed(classify_adapter_error(e)),
            EngineError::WorkspaceUnavailable(s) => WaveError::WorkspaceUnavailable(s.clone()),
            EngineError::Security(s) => WaveError::Security(s.clone()),
            EngineError::Cancelled => WaveError::Cancelled,
            EngineError::Storage(e) => WaveError::WorkspaceUnavailable(e.to_string()),
            EngineError::StepFailed(_, msg) => WaveError::WorkspaceUnavailable(msg.clone()),
        }
    }
}

fn classify_adapter_error(e: &wave_adapters::AdapterError) -> wave_core::FailureClassification {
    use wave_adapters::AdapterError;
    use wave_core::FailureClassification;
    match e {
        AdapterError::Timeout(_) => FailureClassification::Timeout,
        AdapterError::Cancelled => FailureClassification::Cancelled,
        AdapterError::ContextExhaustion => FailureClassification::ContextExhaustion,
        AdapterError::RateLimit => FailureClassification::RateLimit,
        AdapterError::Spawn(_) | AdapterError::Signal(_) | AdapterError::Wait(_) | AdapterError::GeneralError(_) => {
            FailureClassification::GeneralError
        }
    }
}
