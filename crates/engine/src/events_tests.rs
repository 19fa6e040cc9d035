// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use wave_core::{EventState, PipelineName, Run};
use wave_storage::StateStore;

fn writer(dir: &std::path::Path) -> (StateStore, RunWriter) {
    let store = StateStore::open(dir).unwrap();
    let run_id = wave_core::RunId::new("run-1");
    let writer = store.open_writer(run_id.clone()).unwrap();
    writer
        .start_run(Run::new(
            run_id,
            PipelineName::new("demo"),
            "input",
            chrono::Utc::now(),
        ))
        .unwrap();
    (store, writer)
}

fn event(state: EventState) -> Event {
    Event {
        id: 0,
        run_id: wave_core::RunId::new("run-1"),
        ts: chrono::Utc::now(),
        step_id: None,
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

#[tokio::test]
async fn emit_persists_to_the_state_store() {
    let dir = TempDir::new().unwrap();
    let (store, writer) = writer(dir.path());
    let pipeline = EventPipeline::new(writer);

    pipeline.emit(event(EventState::Started)).unwrap();

    let reader = store.reader();
    let events = reader.events_for_run(&wave_core::RunId::new("run-1"));
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn emit_writes_a_json_line_to_the_stream_sink() {
    let dir = TempDir::new().unwrap();
    let (_store, writer) = writer(dir.path());
    let buf: Vec<u8> = Vec::new();
    let sink = std::io::Cursor::new(buf);
    let pipeline = EventPipeline::new(writer).with_stream(Box::new(sink));

    pipeline.emit(event(EventState::Started)).unwrap();
}

struct CountingRenderer {
    calls: AtomicUsize,
}

impl ProgressRenderer for CountingRenderer {
    fn render(&self, _event: &Event) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn emit_invokes_the_progress_renderer() {
    let dir = TempDir::new().unwrap();
    let (_store, writer) = writer(dir.path());
    let renderer = Arc::new(CountingRenderer {
        calls: AtomicUsize::new(0),
    });
    let pipeline = EventPipeline::new(writer).with_renderer(renderer.clone());

    pipeline.emit(event(EventState::Started)).unwrap();
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn subscribers_receive_broadcast_events() {
    let dir = TempDir::new().unwrap();
    let (_store, writer) = writer(dir.path());
    let mut pipeline = EventPipeline::new(writer);
    let mut rx = pipeline.subscribe();

    pipeline.emit(event(EventState::Started)).unwrap();

    let received = rx.try_recv().unwrap();
    assert_eq!(received.state, EventState::Started);
}

#[tokio::test]
async fn emit_rejects_appends_to_a_terminal_run() {
    let dir = TempDir::new().unwrap();
    let (_store, writer) = writer(dir.path());
    let pipeline = EventPipeline::new(writer);

    pipeline.emit(event(EventState::Completed)).unwrap();
    let result = pipeline.emit(event(EventState::Started));
    assert!(result.is_err());
}
