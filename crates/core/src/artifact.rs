// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifacts: files produced by a step and durable across the run.

use crate::ids::{ArtifactName, RunId, StepId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Validation tag carried by an artifact whose producing step had a
/// non-`must_pass` contract. Such artifacts are still available to
/// downstream steps, tagged with the validation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactValidation {
    Passed,
    Warned { details: Vec<String> },
    NotValidated,
}

/// A file produced by a step, archived under a run/step-scoped directory.
///
/// `(name, step_id, run_id)` uniquely identifies an artifact; the archival
/// path is never overwritten by a later step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub run_id: RunId,
    pub step_id: StepId,
    pub name: ArtifactName,
    pub path: PathBuf,
    #[serde(default)]
    pub type_hint: Option<String>,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_validation")]
    pub validation: ArtifactValidation,
}

fn default_validation() -> ArtifactValidation {
    ArtifactValidation::NotValidated
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
