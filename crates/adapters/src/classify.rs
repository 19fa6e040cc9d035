// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exit classification.
//!
//! A SIGKILL-by-us (our own timeout/cancellation path) is classified as
//! `timeout`/`cancelled` even though the exit code looks identical to a
//! SIGKILL-by-OS (e.g. an OOM killer), *provided* our termination path
//! recorded its cause before exit-code inspection runs. Absent that, a
//! SIGKILL-by-OS collapses into `general_error`, which may hide OOMs.

use wave_core::FailureClassification;

/// Why (if at all) the orchestrator itself terminated the subprocess.
/// Must be recorded by the caller *before* `classify` runs so the
/// classification is not derived from exit-code guesswork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminationCause {
    #[default]
    None,
    Timeout,
    Cancelled,
}

/// Classify a finished adapter run. `exit_code == 0` always clears the
/// failure reason regardless of stream content (successful completion
/// wins even if an earlier record looked alarming).
pub fn classify(
    exit_code: i32,
    subtype: Option<&str>,
    termination: TerminationCause,
) -> Option<FailureClassification> {
    if exit_code == 0 {
        return None;
    }
    match termination {
        TerminationCause::Timeout => return Some(FailureClassification::Timeout),
        TerminationCause::Cancelled => return Some(FailureClassification::Cancelled),
        TerminationCause::None => {}
    }
    match subtype {
        Some("context_exhaustion") | Some("context_overflow") => {
            Some(FailureClassification::ContextExhaustion)
        }
        Some("rate_limit") | Some("rate_limited") => Some(FailureClassification::RateLimit),
        _ => Some(FailureClassification::GeneralError),
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
