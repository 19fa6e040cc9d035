// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn cancellation_round_trips() {
    let c = Cancellation {
        run_id: RunId::new("r1"),
        requested_at: Utc.timestamp_opt(5, 0).unwrap(),
        force: true,
    };
    let json = serde_json::to_string(&c).unwrap();
    let back: Cancellation = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);
}
