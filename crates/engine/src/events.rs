// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event pipeline: fans out one [`Event`] to every
//! subscribed sink. `emit` is synchronous; a sink's failure is isolated
//! (logged, never propagated) so one broken subscriber cannot stall the
//! run. The state store is the source of truth — every other sink is a
//! best-effort derived copy.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use wave_core::{Artifact, Cancellation, Event, FailureClassification, PipelineProgress, RecoveryHint, StepProgress};
use wave_storage::{RunWriter, StateError};

/// Wire shape for the JSON-per-line stream sink: optional
/// fields are omitted rather than emitted as `null`.
#[derive(Serialize)]
struct WireEvent<'a> {
    timestamp: chrono::DateTime<chrono::Utc>,
    pipeline_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    step_id: Option<&'a str>,
    state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    persona: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    artifacts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_target: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_reason: Option<FailureClassification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recovery_hints: Option<&'a RecoveryHint>,
}

impl<'a> WireEvent<'a> {
    fn from_event(event: &'a Event) -> Self {
        Self {
            timestamp: event.ts,
            pipeline_id: event.run_id.as_str(),
            step_id: event.step_id.as_ref().map(|s| s.as_str()),
            state: event.state.to_string(),
            duration_ms: event.duration_ms,
            message: event.message.as_deref(),
            persona: event.persona.as_ref().map(|p| p.as_str()),
            artifacts: event.artifacts.iter().map(ToString::to_string).collect(),
            tokens_used: event.tokens_used,
            tool_name: event.tool_activity.as_ref().map(|t| t.name.as_str()),
            tool_target: event
                .tool_activity
                .as_ref()
                .and_then(|t| t.target.as_deref()),
            failure_reason: event.failure_reason,
            recovery_hints: event.recovery_hints.as_ref(),
        }
    }
}

/// A subscriber of rendered event text, e.g. a stderr progress line.
pub trait ProgressRenderer: Send + Sync {
    fn render(&self, event: &Event);
}

/// Fans a run's events out to the state store plus optional stream,
/// renderer, and broadcast sinks.
pub struct EventPipeline {
    writer: RunWriter,
    stream: Option<Mutex<Box<dyn Write + Send>>>,
    renderer: Option<Arc<dyn ProgressRenderer>>,
    broadcaster: Option<broadcast::Sender<Event>>,
}

impl EventPipeline {
    pub fn new(writer: RunWriter) -> Self {
        Self {
            writer,
            stream: None,
            renderer: None,
            broadcaster: None,
        }
    }

    pub fn with_stream(mut self, sink: Box<dyn Write + Send>) -> Self {
        self.stream = Some(Mutex::new(sink));
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ProgressRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Subscribe a new broadcast receiver (e.g. the `serve` HTTP surface).
    pub fn subscribe(&mut self) -> broadcast::Receiver<Event> {
        let sender = self
            .broadcaster
            .get_or_insert_with(|| broadcast::channel(1024).0);
        sender.subscribe()
    }

    /// Pass through to the underlying run writer's derived tables. These
    /// are not events themselves (no sink fan-out applies) but share the
    /// writer's single-writer-per-run exclusivity with `emit`.
    pub fn put_step_progress(&self, progress: StepProgress) {
        self.writer.put_step_progress(progress);
    }

    pub fn put_pipeline_progress(&self, progress: PipelineProgress) {
        self.writer.put_pipeline_progress(progress);
    }

    pub fn put_cancellation(&self, cancellation: Cancellation) {
        self.writer.put_cancellation(cancellation);
    }

    pub fn put_artifact(&self, artifact: Artifact) -> Result<(), StateError> {
        self.writer.put_artifact(artifact)
    }

    /// Persist the event, then best-effort forward it to every other sink.
    /// Each sink's failure is logged and does not block the others or the
    /// caller.
    pub fn emit(&self, event: Event) -> Result<u64, wave_storage::StateError> {
        let seq = self.writer.append_event(event.clone())?;

        if let Some(stream) = &self.stream {
            let wire = WireEvent::from_event(&event);
            match serde_json::to_string(&wire) {
                Ok(mut line) => {
                    line.push('\n');
                    if let Err(e) = stream.lock().write_all(line.as_bytes()) {
                        tracing::warn!(error = %e, "event stream sink write failed");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "failed to encode event for stream sink"),
            }
        }

        if let Some(renderer) = &self.renderer {
            renderer.render(&event);
        }

        if let Some(broadcaster) = &self.broadcaster {
            // `send` fails only when there are no receivers; that is not a
            // sink failure worth logging. A full subscriber buffer drops
            // the oldest entry rather than blocking the emitter.
            let _ = broadcaster.send(event);
        }

        Ok(seq)
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
