// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn system_clock_epoch_ms_is_nonzero() {
    let clock = SystemClock;
    assert!(clock.epoch_ms() > 0);
}

#[test]
fn fake_clock_starts_at_given_instant() {
    let start = DateTime::from_timestamp(1_000, 0).unwrap();
    let clock = FakeClock::new(start);
    assert_eq!(clock.now(), start);
}

#[test]
fn fake_clock_advance_moves_forward_only() {
    let start = DateTime::from_timestamp(1_000, 0).unwrap();
    let clock = FakeClock::new(start);
    let after = clock.advance(Duration::from_secs(5));
    assert_eq!(after, start + chrono::Duration::seconds(5));
    assert_eq!(clock.now(), after);
}

#[test]
fn fake_clock_set_is_absolute() {
    let clock = FakeClock::default();
    let target = DateTime::from_timestamp(42, 0).unwrap();
    clock.set(target);
    assert_eq!(clock.now(), target);
}

#[test]
fn fake_clock_clone_shares_state() {
    let clock = FakeClock::default();
    let clone = clock.clone();
    clone.advance(Duration::from_secs(1));
    assert_eq!(clock.now(), clone.now());
}
