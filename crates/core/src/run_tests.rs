// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

#[test]
fn new_run_starts_pending_with_no_terminal_timestamps() {
    let r = Run::new(RunId::new("r1"), PipelineName::new("demo"), "hello", at(0));
    assert_eq!(r.status, RunStatus::Pending);
    assert!(r.completed_at.is_none());
    assert!(r.cancelled_at.is_none());
    assert_eq!(r.total_tokens, 0);
}

#[test]
fn terminal_statuses_are_terminal() {
    assert!(RunStatus::Completed.is_terminal());
    assert!(RunStatus::Failed.is_terminal());
    assert!(RunStatus::Cancelled.is_terminal());
    assert!(!RunStatus::Pending.is_terminal());
    assert!(!RunStatus::Running.is_terminal());
}

#[test]
fn derived_run_ids_are_unique_per_nonce() {
    let name = PipelineName::new("demo");
    let a = derive_run_id(&name, "same input", at(1000), 0);
    let b = derive_run_id(&name, "same input", at(1000), 1);
    assert_ne!(a, b);
    assert!(a.as_str().starts_with("demo-"));
}

#[test]
fn derived_run_ids_are_deterministic() {
    let name = PipelineName::new("demo");
    let a = derive_run_id(&name, "same input", at(1000), 0);
    let b = derive_run_id(&name, "same input", at(1000), 0);
    assert_eq!(a, b);
}

#[test]
fn different_pipeline_names_yield_different_ids() {
    let a = derive_run_id(&PipelineName::new("a"), "x", at(1), 0);
    let b = derive_run_id(&PipelineName::new("b"), "x", at(1), 0);
    assert_ne!(a, b);
}
