// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::io::Write;
use tempfile::tempdir;
use wave_core::{EventState, RunId};

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-07-29T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn event(run_id: &str, offset_ms: i64) -> Event {
    Event {
        id: 0,
        run_id: RunId::new(run_id),
        ts: base_time() + Duration::milliseconds(offset_ms),
        step_id: None,
        state: EventState::Started,
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

#[test]
fn append_then_flush_assigns_monotonic_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wave.wal");
    let mut wal = Wal::open(&path, 0).unwrap();

    let seq1 = wal.append(&event("run-1", 1)).unwrap();
    let seq2 = wal.append(&event("run-1", 2)).unwrap();
    assert_eq!(seq1, 1);
    assert_eq!(seq2, 2);

    wal.flush().unwrap();
    assert!(!wal.needs_flush());
}

#[test]
fn reopen_recovers_write_seq_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wave.wal");

    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&event("run-1", 1)).unwrap();
        wal.append(&event("run-1", 2)).unwrap();
        wal.flush().unwrap();
    }

    let wal = Wal::open(&path, 0).unwrap();
    assert_eq!(wal.write_seq(), 2);
}

#[test]
fn next_unprocessed_yields_entries_in_order_then_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wave.wal");
    let mut wal = Wal::open(&path, 0).unwrap();

    wal.append(&event("run-1", 1)).unwrap();
    wal.append(&event("run-1", 2)).unwrap();

    let first = wal.next_unprocessed().unwrap().unwrap();
    assert_eq!(first.seq, 1);
    wal.mark_processed(first.seq);

    let second = wal.next_unprocessed().unwrap().unwrap();
    assert_eq!(second.seq, 2);
    wal.mark_processed(second.seq);

    assert!(wal.next_unprocessed().unwrap().is_none());
}

#[test]
fn truncate_before_drops_processed_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wave.wal");
    let mut wal = Wal::open(&path, 0).unwrap();

    for i in 1..=5 {
        wal.append(&event("run-1", i)).unwrap();
    }
    wal.flush().unwrap();
    wal.mark_processed(3);
    wal.truncate_before(4).unwrap();

    let remaining = wal.entries_after(0).unwrap();
    assert_eq!(remaining.len(), 2);
    assert_eq!(remaining[0].seq, 4);
    assert_eq!(remaining[1].seq, 5);
}

#[test]
fn entries_after_seq_excludes_earlier_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wave.wal");
    let mut wal = Wal::open(&path, 0).unwrap();

    for i in 1..=4 {
        wal.append(&event("run-1", i)).unwrap();
    }
    wal.flush().unwrap();

    let entries = wal.entries_after(2).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].seq, 3);
    assert_eq!(entries[1].seq, 4);
}

#[test]
fn corrupt_wal_rotates_to_bak_and_preserves_valid_prefix() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wave.wal");

    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&event("run-1", 1)).unwrap();
        wal.flush().unwrap();
    }

    let mut f = std::fs::OpenOptions::new()
        .append(true)
        .open(&path)
        .unwrap();
    f.write_all(b"not valid json\n").unwrap();
    drop(f);

    let wal = Wal::open(&path, 0).unwrap();
    assert_eq!(wal.write_seq(), 1);
    assert!(path.with_extension("bak").exists());
    assert!(fs::read_to_string(path.with_extension("bak"))
        .unwrap()
        .contains("not valid json"));
}

#[test]
fn needs_flush_is_false_for_empty_buffer() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wave.wal");
    let wal = Wal::open(&path, 0).unwrap();
    assert!(!wal.needs_flush());
}

#[test]
fn needs_flush_becomes_true_once_threshold_is_reached() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wave.wal");
    let mut wal = Wal::open(&path, 0).unwrap();

    for i in 1..=100 {
        wal.append(&event("run-1", i)).unwrap();
    }
    assert!(wal.needs_flush());
}
