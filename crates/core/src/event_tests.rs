// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use yare::parameterized;

fn base(state: EventState) -> Event {
    Event {
        id: 1,
        run_id: RunId::new("r1"),
        ts: Utc.timestamp_opt(0, 0).unwrap(),
        step_id: Some(StepId::new("a")),
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

#[parameterized(
    completed = { EventState::Completed, true },
    failed = { EventState::Failed, true },
    cancelled = { EventState::Cancelled, true },
    running = { EventState::Running, false },
    retrying = { EventState::Retrying, false },
    step_progress = { EventState::StepProgress, false },
)]
fn terminal_classification(state: EventState, expect_terminal: bool) {
    assert_eq!(base(state).is_terminal_for_step(), expect_terminal);
}

#[test]
fn run_scoped_event_has_no_step_id() {
    let mut e = base(EventState::Preflight);
    e.step_id = None;
    assert!(e.is_run_scoped());
}

#[test]
fn event_serializes_round_trip_with_failure_and_recovery() {
    let mut e = base(EventState::Failed);
    e.failure_reason = Some(FailureClassification::Timeout);
    e.recovery_hints = Some(RecoveryHint {
        suggestions: vec![RecoveryCommand {
            label: "Resume".into(),
            command: "wave run demo --from-step a".into(),
        }],
    });
    let json = serde_json::to_string(&e).unwrap();
    let back: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(back, e);
}

#[test]
fn event_state_display_matches_wire_tag() {
    assert_eq!(EventState::ContractValidating.to_string(), "contract_validating");
    assert_eq!(FailureClassification::ContextExhaustion.to_string(), "context_exhaustion");
}
