// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-group subprocess supervision.
//!
//! Every adapter subprocess is spawned as the leader of its own process
//! group (`setpgid(0, 0)` at exec time, via [`CommandExt::process_group`])
//! so that a graceful-then-forceful termination signal reaches any
//! descendants the adapter itself forks, not just the direct child. This
//! crate has no `unsafe` blocks: `process_group` is a safe `std` API, and
//! signaling goes through `nix::sys::signal::killpg` rather than a raw
//! `pre_exec` closure.

use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::time::timeout;

use crate::error::AdapterError;

/// Parameters for spawning an adapter subprocess.
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: std::path::PathBuf,
    pub env: Vec<(String, String)>,
}

/// A running adapter subprocess and the process group it leads.
pub struct ProcessHandle {
    child: Child,
    pgid: Pid,
}

impl ProcessHandle {
    /// Spawn `cfg` as the leader of a new process group with piped
    /// stdout/stderr and a closed stdin.
    pub fn spawn(cfg: &SpawnConfig) -> Result<Self, AdapterError> {
        let mut command = Command::new(&cfg.program);
        command
            .args(&cfg.args)
            .current_dir(&cfg.cwd)
            .envs(cfg.env.iter().cloned())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);

        let child = command.spawn().map_err(AdapterError::Spawn)?;
        let pid = child
            .id()
            .ok_or_else(|| AdapterError::Spawn(std::io::Error::other("child has no pid")))?;
        Ok(Self {
            child,
            pgid: Pid::from_raw(pid as i32),
        })
    }

    /// Take the child's stdout pipe. May only be called once.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Take the child's stderr pipe. May only be called once.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Send a signal to the whole process group.
    pub fn signal(&self, sig: Signal) -> Result<(), AdapterError> {
        signal::killpg(self.pgid, sig).map_err(|e| AdapterError::Signal(e.into()))
    }

    /// Wait for the direct child to exit, returning its raw exit code.
    /// A process killed by a signal (no exit code) is reported as 128+signal,
    /// matching shell convention.
    pub async fn wait(&mut self) -> Result<i32, AdapterError> {
        let status = self.child.wait().await.map_err(AdapterError::Wait)?;
        Ok(exit_code_of(status))
    }

    /// Graceful-then-forceful termination: SIGTERM to the group, wait up to
    /// `grace`, then SIGKILL to the group if it hasn't exited.
    pub async fn terminate(&mut self, grace: Duration) -> Result<i32, AdapterError> {
        self.signal(Signal::SIGTERM)?;
        match timeout(grace, self.child.wait()).await {
            Ok(status) => Ok(exit_code_of(status.map_err(AdapterError::Wait)?)),
            Err(_) => {
                self.signal(Signal::SIGKILL)?;
                let status = self.child.wait().await.map_err(AdapterError::Wait)?;
                Ok(exit_code_of(status))
            }
        }
    }
}

fn exit_code_of(status: std::process::ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => 128 + unix_signal_number(status),
    }
}

#[cfg(unix)]
fn unix_signal_number(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().unwrap_or(0)
}

#[cfg(not(unix))]
fn unix_signal_number(_status: std::process::ExitStatus) -> i32 {
    0
}

/// Standard grace period between a graceful and a forceful termination
/// signal.
pub const TERMINATION_GRACE: Duration = Duration::from_secs(3);

/// Resolve the absolute working directory for a spawned adapter, rejecting
/// paths that don't exist yet (a provisioner bug, not a runtime condition).
pub fn require_existing_dir(path: &Path) -> Result<(), AdapterError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(AdapterError::Spawn(std::io::Error::other(format!(
            "workspace directory does not exist: {}",
            path.display()
        ))))
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
