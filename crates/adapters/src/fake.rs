// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake adapter runner for deterministic engine tests (feature `test-support`).
//!
//! Records a call log plus programmable canned responses, keyed by
//! invocation order since the executor drives one adapter call per attempt.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use wave_core::Cancellation;

use crate::error::AdapterError;
use crate::runner::{AdapterConfig, AdapterResult, AdapterRunner};

/// One recorded invocation of [`FakeAdapterRunner::run`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub prompt: String,
}

struct FakeState {
    queued: VecDeque<Result<AdapterResult, AdapterError>>,
    default_result: AdapterResult,
    calls: Vec<RecordedCall>,
}

/// Programmable [`AdapterRunner`] that never spawns a real subprocess.
///
/// Queue responses with [`FakeAdapterRunner::push_result`] /
/// [`FakeAdapterRunner::push_error`]; once the queue is empty, `run` returns
/// a clone of the configured default (a successful, empty result unless
/// overridden with [`FakeAdapterRunner::set_default`]).
#[derive(Clone)]
pub struct FakeAdapterRunner {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeAdapterRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeAdapterRunner {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                queued: VecDeque::new(),
                default_result: AdapterResult {
                    exit_code: 0,
                    ..Default::default()
                },
                calls: Vec::new(),
            })),
        }
    }

    pub fn push_result(&self, result: AdapterResult) {
        self.inner.lock().queued.push_back(Ok(result));
    }

    pub fn push_error(&self, error: AdapterError) {
        self.inner.lock().queued.push_back(Err(error));
    }

    pub fn set_default(&self, result: AdapterResult) {
        self.inner.lock().default_result = result;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().calls.len()
    }
}

#[async_trait]
impl AdapterRunner for FakeAdapterRunner {
    async fn run(
        &self,
        cfg: AdapterConfig,
        _cancellation: &(dyn Fn() -> Option<Cancellation> + Send + Sync),
    ) -> Result<AdapterResult, AdapterError> {
        let mut state = self.inner.lock();
        state.calls.push(RecordedCall {
            program: cfg.program,
            args: cfg.args,
            prompt: cfg.prompt,
        });
        match state.queued.pop_front() {
            Some(outcome) => outcome,
            None => Ok(state.default_result.clone()),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
