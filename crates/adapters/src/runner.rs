// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The adapter runner contract: `Run(ctx, cfg) -> AdapterResult`.
//!
//! [`ProcessAdapterRunner`] is the production implementation, composing
//! [`crate::process`]'s process-group supervision, [`crate::stream`]'s
//! NDJSON parsing, and [`crate::classify`]'s exit classification. The
//! runner is reentrant: nothing here is global state, so many invocations
//! may run concurrently across independent tasks.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use wave_core::{Cancellation, FailureClassification};

use crate::classify::{classify, TerminationCause};
use crate::error::AdapterError;
use crate::process::{ProcessHandle, SpawnConfig, TERMINATION_GRACE};
use crate::stream::{AdapterRecord, StreamReader};

/// Everything the runner needs to launch and supervise one adapter
/// invocation.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Adapter identifier (which subprocess flavor to spawn); resolved to
    /// a program + base args by the caller (`wave-engine`'s adapter
    /// registry), so this runner only ever sees a ready-to-exec command.
    pub program: String,
    pub args: Vec<String>,
    pub workspace_path: PathBuf,
    pub prompt: String,
    pub env: Vec<(String, String)>,
    pub timeout: Duration,
    pub tool_allow: Vec<String>,
    pub tool_deny: Vec<String>,
    pub model: Option<String>,
    pub temperature: Option<String>,
}

/// Outcome of one adapter invocation.
#[derive(Debug, Clone, Default)]
pub struct AdapterResult {
    pub exit_code: i32,
    pub result_content: Option<String>,
    pub tokens_estimate: u64,
    pub produced_artifact_paths: Vec<String>,
    pub failure_reason: Option<FailureClassification>,
    pub subtype: Option<String>,
    /// Tool activity observed on stdout, in FIFO order, for the event
    /// pipeline to turn into `stream_activity` events.
    pub tool_activity: Vec<(String, Option<String>)>,
    /// Count of stdout lines that were not a recognized NDJSON record.
    pub discarded_lines: u64,
}

/// Supervises one adapter subprocess invocation. Implemented by
/// [`ProcessAdapterRunner`] in production and by a `FakeAdapterRunner`
/// (feature `test-support`) in tests.
#[async_trait]
pub trait AdapterRunner: Send + Sync {
    async fn run(
        &self,
        cfg: AdapterConfig,
        cancellation: &(dyn Fn() -> Option<Cancellation> + Send + Sync),
    ) -> Result<AdapterResult, AdapterError>;
}

/// Production adapter runner: spawns a real subprocess under a process
/// group and supervises it to completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessAdapterRunner;

#[async_trait]
impl AdapterRunner for ProcessAdapterRunner {
    async fn run(
        &self,
        cfg: AdapterConfig,
        cancellation: &(dyn Fn() -> Option<Cancellation> + Send + Sync),
    ) -> Result<AdapterResult, AdapterError> {
        crate::process::require_existing_dir(&cfg.workspace_path)?;

        let spawn_cfg = SpawnConfig {
            program: cfg.program.clone(),
            args: cfg.args.clone(),
            cwd: cfg.workspace_path.clone(),
            env: cfg.env.clone(),
        };

        let mut handle = ProcessHandle::spawn(&spawn_cfg)?;
        let stdout = handle
            .take_stdout()
            .ok_or_else(|| AdapterError::Spawn(std::io::Error::other("missing stdout pipe")))?;

        // Stdout is drained on its own task, independent of the process
        // handle, so waiting on the child (with its timeout/cancellation
        // polling below) never needs a second mutable borrow of `handle`.
        let drain_task = tokio::spawn(async move {
            let mut reader = StreamReader::new(stdout);
            let mut parsed = Vec::new();
            while let Ok(Some(record)) = reader.next_record().await {
                parsed.push(record);
            }
            (parsed, reader.discarded())
        });

        let mut termination = TerminationCause::None;
        let exit_code =
            wait_with_timeout_and_cancellation(&mut handle, cfg.timeout, cancellation, &mut termination)
                .await?;

        let (records, discarded_lines) = drain_task.await.unwrap_or_default();

        let mut tool_activity = Vec::new();
        let mut tokens_estimate = 0u64;
        let mut result_content = None;
        let mut subtype = None;
        let mut produced_artifact_paths = Vec::new();
        for record in records {
            match record {
                AdapterRecord::ToolUse { name, target } => {
                    tool_activity.push((name, target));
                }
                AdapterRecord::Progress { tokens_used, .. } => {
                    if let Some(t) = tokens_used {
                        tokens_estimate = tokens_estimate.max(t);
                    }
                }
                AdapterRecord::Result {
                    tokens_estimate: t,
                    subtype: st,
                    content,
                    artifacts,
                } => {
                    tokens_estimate = tokens_estimate.max(t);
                    subtype = st;
                    result_content = content;
                    produced_artifact_paths = artifacts;
                }
            }
        }

        let failure_reason = classify(exit_code, subtype.as_deref(), termination);
        Ok(AdapterResult {
            exit_code,
            result_content,
            tokens_estimate,
            produced_artifact_paths,
            failure_reason,
            subtype,
            tool_activity,
            discarded_lines,
        })
    }
}

/// Race the subprocess's exit against its deadline and a cancellation poll,
/// applying the graceful-then-forceful termination sequence when either
/// fires.
async fn wait_with_timeout_and_cancellation(
    handle: &mut ProcessHandle,
    timeout: Duration,
    cancellation: &(dyn Fn() -> Option<Cancellation> + Send + Sync),
    termination: &mut TerminationCause,
) -> Result<i32, AdapterError> {
    let poll_interval = Duration::from_millis(50).min(timeout);
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(_marker) = cancellation() {
            *termination = TerminationCause::Cancelled;
            return handle.terminate(TERMINATION_GRACE).await;
        }
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            *termination = TerminationCause::Timeout;
            return handle.terminate(TERMINATION_GRACE).await;
        }
        match tokio::time::timeout(remaining.min(poll_interval), handle.wait()).await {
            Ok(result) => return result,
            Err(_elapsed) => continue,
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
