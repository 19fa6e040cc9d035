// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A marker set by an external actor and polled by the executor.

use crate::ids::RunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted cancellation request for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    pub run_id: RunId,
    pub requested_at: DateTime<Utc>,
    /// Force skips the graceful-signal stage and kills process groups
    /// immediately.
    pub force: bool,
}

#[cfg(test)]
#[path = "cancellation_tests.rs"]
mod tests;
