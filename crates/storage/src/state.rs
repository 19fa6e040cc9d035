// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state derived by folding the WAL's [`Event`] stream into
//! its tables: `run`, `event`, `artifact`, `step_progress`,
//! `pipeline_progress`, `cancellation`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wave_core::{
    Artifact, ArtifactName, Cancellation, Event, EventState, PipelineProgress, Run, RunId,
    RunStatus, StepId, StepProgress,
};

/// A run's full event log plus its derived tables. Cheap to clone for a
/// read-only snapshot handle, since reader connections are unlimited.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializedState {
    runs: HashMap<RunId, Run>,
    events: HashMap<RunId, Vec<Event>>,
    artifacts: HashMap<RunId, Vec<Artifact>>,
    // Nested rather than keyed by `(RunId, StepId)`: serde_json map keys
    // must be strings, and a tuple key does not satisfy that.
    step_progress: HashMap<RunId, HashMap<StepId, StepProgress>>,
    pipeline_progress: HashMap<RunId, PipelineProgress>,
    cancellations: HashMap<RunId, Cancellation>,
}

impl MaterializedState {
    pub fn run(&self, run_id: &RunId) -> Option<&Run> {
        self.runs.get(run_id)
    }

    pub fn events_for_run(&self, run_id: &RunId) -> &[Event] {
        self.events.get(run_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn artifacts_for_run(&self, run_id: &RunId) -> &[Artifact] {
        self.artifacts
            .get(run_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn artifact(&self, run_id: &RunId, step_id: &StepId, name: &ArtifactName) -> Option<&Artifact> {
        self.artifacts
            .get(run_id)?
            .iter()
            .find(|a| &a.step_id == step_id && &a.name == name)
    }

    pub fn step_progress(&self, run_id: &RunId, step_id: &StepId) -> Option<&StepProgress> {
        self.step_progress.get(run_id)?.get(step_id)
    }

    pub fn pipeline_progress(&self, run_id: &RunId) -> Option<&PipelineProgress> {
        self.pipeline_progress.get(run_id)
    }

    pub fn cancellation(&self, run_id: &RunId) -> Option<&Cancellation> {
        self.cancellations.get(run_id)
    }

    pub fn all_runs(&self) -> impl Iterator<Item = &Run> {
        self.runs.values()
    }

    /// Insert or replace a run row. Only the executor that owns the run
    /// (via [`crate::StateStore::open_writer`]) should call this.
    pub fn put_run(&mut self, run: Run) {
        self.runs.insert(run.run_id.clone(), run);
    }

    pub fn put_pipeline_progress(&mut self, progress: PipelineProgress) {
        self.pipeline_progress.insert(progress.run_id.clone(), progress);
    }

    pub fn put_step_progress(&mut self, progress: StepProgress) {
        self.step_progress
            .entry(progress.run_id.clone())
            .or_default()
            .insert(progress.step_id.clone(), progress);
    }

    pub fn put_cancellation(&mut self, cancellation: Cancellation) {
        self.cancellations
            .insert(cancellation.run_id.clone(), cancellation);
    }

    /// Register an artifact. Rejects an `(run_id, step_id, name)` collision
    ///.
    pub fn put_artifact(&mut self, artifact: Artifact) -> Result<(), crate::StateError> {
        let bucket = self.artifacts.entry(artifact.run_id.clone()).or_default();
        if bucket
            .iter()
            .any(|a| a.step_id == artifact.step_id && a.name == artifact.name)
        {
            return Err(crate::StateError::DuplicateArtifact {
                run_id: artifact.run_id,
                step_id: artifact.step_id,
                name: artifact.name,
            });
        }
        bucket.push(artifact);
        Ok(())
    }

    /// Fold a single event into the derived tables. Appends it to the
    /// per-run event log unconditionally (the log is append-only); updates
    /// `run.current_step` and `step_progress.state` when the event carries
    /// step-scoped state.
    pub fn apply_event(&mut self, event: Event) {
        let run_id = event.run_id.clone();
        self.events.entry(run_id.clone()).or_default().push(event.clone());

        if let Some(step_id) = &event.step_id {
            if let Some(run) = self.runs.get_mut(&run_id) {
                run.current_step = Some(step_id.clone());
                if let Some(tokens) = event.tokens_used {
                    run.total_tokens += tokens;
                }
            }
            if let Some(progress) = self
                .step_progress
                .get_mut(&run_id)
                .and_then(|by_step| by_step.get_mut(step_id))
            {
                progress.state = event.state;
                progress.updated_at = event.ts;
                if let Some(tokens) = event.tokens_used {
                    progress.tokens_used += tokens;
                }
            }
        } else {
            self.apply_run_scoped(&run_id, &event);
        }
    }

    fn apply_run_scoped(&mut self, run_id: &RunId, event: &Event) {
        let Some(run) = self.runs.get_mut(run_id) else {
            return;
        };
        match event.state {
            EventState::Started | EventState::Running => {
                if run.status == RunStatus::Pending {
                    run.status = RunStatus::Running;
                }
            }
            EventState::Completed => {
                run.status = RunStatus::Completed;
                run.completed_at = Some(event.ts);
            }
            EventState::Failed => {
                run.status = RunStatus::Failed;
                run.completed_at = Some(event.ts);
                run.error_message = event.message.clone();
            }
            EventState::Cancelled => {
                run.status = RunStatus::Cancelled;
                run.cancelled_at = Some(event.ts);
            }
            _ => {}
        }
    }

    /// Remove WAL-derived history older than a checkpointed sequence is not
    /// modeled here (the WAL itself tracks sequence numbers); this method
    /// exists so snapshot+replay round-trips through an identical type.
    pub fn clone_for_snapshot(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
