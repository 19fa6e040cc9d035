// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The [`Run`] entity: one execution of a [`crate::pipeline::Pipeline`].

use crate::ids::{PipelineName, RunId, StepId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`Run`]. Terminal states are immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    /// Terminal statuses are never transitioned out of.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// A single execution of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub run_id: RunId,
    pub pipeline_name: PipelineName,
    pub input: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_step: Option<StepId>,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Run {
    pub fn new(
        run_id: RunId,
        pipeline_name: PipelineName,
        input: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id,
            pipeline_name,
            input: input.into(),
            status: RunStatus::Pending,
            started_at,
            completed_at: None,
            cancelled_at: None,
            current_step: None,
            total_tokens: 0,
            error_message: None,
            tags: Vec::new(),
        }
    }
}

/// Derive a stable run id: `<pipeline_name>-<short content hash>`.
///
/// The suffix is content-addressed over the pipeline name, the literal
/// input, and the start time, so two runs of the same pipeline never
/// collide even when launched in the same millisecond.
pub fn derive_run_id(
    pipeline_name: &PipelineName,
    input: &str,
    started_at: DateTime<Utc>,
    nonce: u64,
) -> RunId {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(pipeline_name.as_str().as_bytes());
    hasher.update(input.as_bytes());
    hasher.update(started_at.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    hasher.update(nonce.to_le_bytes());
    let digest = hasher.finalize();
    let short = hex_prefix(&digest, 10);
    RunId::new(format!("{}-{}", pipeline_name.as_str(), short))
}

fn hex_prefix(bytes: &[u8], n: usize) -> String {
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    hex.chars().take(n).collect()
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
