// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;
use wave_core::{ArtifactName, RunId, StepId};

use crate::{SnapshotError, WalError};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("artifact {name} already registered for step {step_id} in run {run_id}")]
    DuplicateArtifact {
        run_id: RunId,
        step_id: StepId,
        name: ArtifactName,
    },

    #[error("run {0} already has an open writer in this process")]
    WriterConflict(RunId),

    #[error("run {0} is already terminal, no further events may be appended")]
    RunTerminal(RunId),

    #[error("run {0} not found")]
    RunNotFound(RunId),
}
