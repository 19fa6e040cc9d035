// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The append-only [`Event`] record: the unit of the run's audit log.

use crate::ids::{ArtifactName, EventId, PersonaName, RunId, StepId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Primary state carried by an [`Event`].
///
/// Matches the step state machine: `started` exactly once, `running` may
/// recur as heartbeats, `contract_validating` precedes `completed` only
/// when a contract is present, `retrying` is a distinct transient between
/// attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventState {
    Started,
    Running,
    Completed,
    Failed,
    Retrying,
    Preflight,
    StepProgress,
    EtaUpdated,
    ContractValidating,
    CompactionProgress,
    StreamActivity,
    Cancelled,
}

impl std::fmt::Display for EventState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventState::Started => "started",
            EventState::Running => "running",
            EventState::Completed => "completed",
            EventState::Failed => "failed",
            EventState::Retrying => "retrying",
            EventState::Preflight => "preflight",
            EventState::StepProgress => "step_progress",
            EventState::EtaUpdated => "eta_updated",
            EventState::ContractValidating => "contract_validating",
            EventState::CompactionProgress => "compaction_progress",
            EventState::StreamActivity => "stream_activity",
            EventState::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// Failure classification taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClassification {
    Timeout,
    ContextExhaustion,
    RateLimit,
    GeneralError,
    ContractFailed,
    Injection,
    Security,
    Preflight,
    Cancelled,
}

impl std::fmt::Display for FailureClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureClassification::Timeout => "timeout",
            FailureClassification::ContextExhaustion => "context_exhaustion",
            FailureClassification::RateLimit => "rate_limit",
            FailureClassification::GeneralError => "general_error",
            FailureClassification::ContractFailed => "contract_failed",
            FailureClassification::Injection => "injection",
            FailureClassification::Security => "security",
            FailureClassification::Preflight => "preflight",
            FailureClassification::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// A single labeled, paste-ready recovery suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryCommand {
    pub label: String,
    /// Shell-escaped so the user can paste it verbatim.
    pub command: String,
}

/// 2-4 actionable suggestions attached to a non-successful terminal event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryHint {
    pub suggestions: Vec<RecoveryCommand>,
}

/// Name and target of a tool invocation observed in adapter stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolActivity {
    pub name: String,
    #[serde(default)]
    pub target: Option<String>,
}

/// An append-only record in a run's event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub run_id: RunId,
    pub ts: DateTime<Utc>,
    #[serde(default)]
    pub step_id: Option<StepId>,
    pub state: EventState,
    #[serde(default)]
    pub persona: Option<PersonaName>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub tokens_used: Option<u64>,
    #[serde(default)]
    pub artifacts: Vec<ArtifactName>,
    #[serde(default)]
    pub failure_reason: Option<FailureClassification>,
    #[serde(default)]
    pub recovery_hints: Option<RecoveryHint>,
    #[serde(default)]
    pub tool_activity: Option<ToolActivity>,
    /// Attempt number; meaningful for `retrying` events.
    #[serde(default)]
    pub attempt: Option<u32>,
}

impl Event {
    pub fn is_run_scoped(&self) -> bool {
        self.step_id.is_none()
    }

    /// Whether this event represents a terminal state for its step.
    pub fn is_terminal_for_step(&self) -> bool {
        matches!(
            self.state,
            EventState::Completed | EventState::Failed | EventState::Cancelled
        )
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
