// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transient progress snapshots used by dashboards and `status`.

use crate::ids::{PersonaName, RunId, StepId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-step progress snapshot, updated by the adapter stream parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepProgress {
    pub run_id: RunId,
    pub step_id: StepId,
    pub persona: PersonaName,
    pub state: crate::event::EventState,
    /// 0..100
    pub progress: u8,
    #[serde(default)]
    pub current_action: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub eta_ms: Option<u64>,
    #[serde(default)]
    pub tokens_used: u64,
}

/// Derived aggregate over all steps of a run, updated after each completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineProgress {
    pub run_id: RunId,
    pub total_steps: u32,
    pub completed_steps: u32,
    pub current_step_index: u32,
    /// 0..100
    pub overall_progress: u8,
    #[serde(default)]
    pub eta_ms: Option<u64>,
    pub updated_at: DateTime<Utc>,
}

impl PipelineProgress {
    pub fn new(run_id: RunId, total_steps: u32, updated_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            total_steps,
            completed_steps: 0,
            current_step_index: 0,
            overall_progress: 0,
            eta_ms: None,
            updated_at,
        }
    }

    /// Recompute `overall_progress` from `completed_steps`/`total_steps`.
    pub fn recompute(&mut self, now: DateTime<Utc>) {
        self.overall_progress = if self.total_steps == 0 {
            100
        } else {
            ((self.completed_steps as u64 * 100) / self.total_steps as u64) as u8
        };
        self.updated_at = now;
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
