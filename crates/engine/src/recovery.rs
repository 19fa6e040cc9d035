// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery hint construction: on any non-successful
//! terminal event for a step, attach 2-4 paste-ready suggestions keyed on
//! the error classification. Every command string is shell-escaped.

use wave_core::{FailureClassification, RecoveryCommand, RecoveryHint, RunId, StepId};

/// Build the recovery hint block for a terminal failure.
pub fn build(run_id: &RunId, step_id: &StepId, classification: FailureClassification) -> RecoveryHint {
    let run = shell_escape(run_id.as_str());
    let step = shell_escape(step_id.as_str());

    let suggestions = match classification {
        FailureClassification::ContractFailed => vec![
            resume(&run, &step),
            resume_force(&run, &step),
            inspect(&step),
        ],
        FailureClassification::Security | FailureClassification::Injection => {
            vec![resume(&run, &step), inspect(&step)]
        }
        FailureClassification::Preflight => vec![
            RecoveryCommand {
                label: "Install missing skill".to_string(),
                command: format!("wave skill install --run {run} --step {step}"),
            },
            RecoveryCommand {
                label: "Install missing tool".to_string(),
                command: format!("wave tool install --run {run} --step {step}"),
            },
            inspect(&step),
        ],
        FailureClassification::Timeout
        | FailureClassification::ContextExhaustion
        | FailureClassification::RateLimit
        | FailureClassification::GeneralError
        | FailureClassification::Cancelled => vec![
            resume(&run, &step),
            inspect(&step),
            RecoveryCommand {
                label: "Re-run with debug output".to_string(),
                command: format!("wave run --from-step {step} --debug --resume {run}"),
            },
        ],
    };

    RecoveryHint { suggestions }
}

fn resume(run: &str, step: &str) -> RecoveryCommand {
    RecoveryCommand {
        label: "Resume from step".to_string(),
        command: format!("wave run --from-step {step} --resume {run}"),
    }
}

fn resume_force(run: &str, step: &str) -> RecoveryCommand {
    RecoveryCommand {
        label: "Resume and skip validation".to_string(),
        command: format!("wave run --from-step {step} --force --resume {run}"),
    }
}

fn inspect(step: &str) -> RecoveryCommand {
    RecoveryCommand {
        label: "Inspect workspace".to_string(),
        command: format!("wave status --step {step}"),
    }
}

/// Single-quote a token so it can be pasted verbatim into a POSIX shell.
fn shell_escape(token: &str) -> String {
    if token.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/')) {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', "'\\''"))
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
