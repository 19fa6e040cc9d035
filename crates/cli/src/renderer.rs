// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable stderr progress renderer. The structured NDJSON stream
//! always goes to stdout; this is the companion line-per-event sink a
//! human watches while a run executes.

use wave_core::{Event, EventState};
use wave_engine::ProgressRenderer;

/// Verbosity level controlling how much detail the renderer prints.
/// `--debug` supersedes `--verbose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Quiet,
    Verbose,
    Debug,
}

pub struct StderrRenderer {
    verbosity: Verbosity,
}

impl StderrRenderer {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

impl ProgressRenderer for StderrRenderer {
    fn render(&self, event: &Event) {
        let scope = event
            .step_id
            .as_ref()
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "run".to_string());

        let mut line = format!("[{}] {} {}", event.ts.format("%H:%M:%S%.3f"), scope, event.state);
        if let Some(persona) = &event.persona {
            line.push_str(&format!(" persona={persona}"));
        }
        if let Some(attempt) = event.attempt {
            line.push_str(&format!(" attempt={attempt}"));
        }
        if let Some(message) = &event.message {
            line.push_str(&format!(" - {message}"));
        }
        if matches!(event.state, EventState::Failed | EventState::Cancelled) {
            if let Some(classification) = event.failure_reason {
                line.push_str(&format!(" [{classification}]"));
            }
        }
        eprintln!("{line}");

        if self.verbosity != Verbosity::Quiet {
            if !event.artifacts.is_empty() {
                let names: Vec<&str> = event.artifacts.iter().map(|a| a.as_str()).collect();
                eprintln!("    artifacts: {}", names.join(", "));
            }
            if let Some(activity) = &event.tool_activity {
                let target = activity.target.as_deref().unwrap_or("-");
                eprintln!("    tool: {} -> {target}", activity.name);
            }
        }

        if self.verbosity == Verbosity::Debug {
            if let Some(hints) = &event.recovery_hints {
                for suggestion in &hints.suggestions {
                    eprintln!("    recovery: {} :: {}", suggestion.label, suggestion.command);
                }
            }
        }
    }
}
