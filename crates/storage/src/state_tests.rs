// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::DateTime;
use wave_core::{Artifact, ArtifactValidation, EventState, RunId, RunStatus, StepId};

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-07-29T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn event(run_id: &str, step_id: Option<&str>, state: EventState) -> Event {
    Event {
        id: 0,
        run_id: RunId::new(run_id),
        ts: now(),
        step_id: step_id.map(StepId::new),
        state,
        persona: None,
        message: None,
        duration_ms: None,
        tokens_used: None,
        artifacts: Vec::new(),
        failure_reason: None,
        recovery_hints: None,
        tool_activity: None,
        attempt: None,
    }
}

fn artifact(run_id: &str, step_id: &str, name: &str) -> Artifact {
    Artifact {
        run_id: RunId::new(run_id),
        step_id: StepId::new(step_id),
        name: name.into(),
        path: format!("/tmp/{name}").into(),
        type_hint: None,
        size_bytes: 0,
        created_at: now(),
        validation: ArtifactValidation::NotValidated,
    }
}

#[test]
fn run_scoped_completed_event_marks_run_terminal() {
    let mut state = MaterializedState::default();
    state.put_run(Run::new(RunId::new("run-1"), "demo".into(), "x", now()));

    state.apply_event(event("run-1", None, EventState::Completed));

    let run = state.run(&RunId::new("run-1")).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.completed_at.is_some());
}

#[test]
fn run_scoped_failed_event_records_error_message() {
    let mut state = MaterializedState::default();
    state.put_run(Run::new(RunId::new("run-1"), "demo".into(), "x", now()));

    let mut failure = event("run-1", None, EventState::Failed);
    failure.message = Some("boom".to_string());
    state.apply_event(failure);

    let run = state.run(&RunId::new("run-1")).unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.error_message.as_deref(), Some("boom"));
}

#[test]
fn step_scoped_event_updates_run_current_step_and_token_total() {
    let mut state = MaterializedState::default();
    state.put_run(Run::new(RunId::new("run-1"), "demo".into(), "x", now()));

    let mut started = event("run-1", Some("step-a"), EventState::Started);
    started.tokens_used = Some(120);
    state.apply_event(started);

    let run = state.run(&RunId::new("run-1")).unwrap();
    assert_eq!(run.current_step.as_ref().unwrap().as_str(), "step-a");
    assert_eq!(run.total_tokens, 120);
}

#[test]
fn events_for_run_preserves_append_order() {
    let mut state = MaterializedState::default();
    state.put_run(Run::new(RunId::new("run-1"), "demo".into(), "x", now()));

    state.apply_event(event("run-1", Some("step-a"), EventState::Started));
    state.apply_event(event("run-1", Some("step-a"), EventState::Completed));

    let events = state.events_for_run(&RunId::new("run-1"));
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].state, EventState::Started);
    assert_eq!(events[1].state, EventState::Completed);
}

#[test]
fn put_artifact_rejects_duplicate_step_and_name() {
    let mut state = MaterializedState::default();
    state.put_artifact(artifact("run-1", "step-a", "report.md")).unwrap();

    let err = state
        .put_artifact(artifact("run-1", "step-a", "report.md"))
        .unwrap_err();
    assert!(matches!(err, crate::StateError::DuplicateArtifact { .. }));
}

#[test]
fn put_artifact_allows_same_name_from_different_steps() {
    let mut state = MaterializedState::default();
    state.put_artifact(artifact("run-1", "step-a", "report.md")).unwrap();
    state.put_artifact(artifact("run-1", "step-b", "report.md")).unwrap();

    assert_eq!(state.artifacts_for_run(&RunId::new("run-1")).len(), 2);
}

#[test]
fn apply_event_for_unknown_run_does_not_panic() {
    let mut state = MaterializedState::default();
    state.apply_event(event("ghost-run", Some("step-a"), EventState::Started));
    assert_eq!(state.events_for_run(&RunId::new("ghost-run")).len(), 1);
    assert!(state.run(&RunId::new("ghost-run")).is_none());
}
