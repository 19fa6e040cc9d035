// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace mode and status types shared between `wave-pipeline` (which
//! declares the configuration) and `wave-engine` (which provisions it).

use serde::{Deserialize, Serialize};

/// How a step's workspace is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceMode {
    /// A fresh directory under the run-scoped root.
    Ephemeral,
    /// A detached-HEAD worktree of the host repository.
    GitWorktree,
}

/// Lifecycle status of a provisioned workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceStatus {
    Preparing,
    Ready,
    Released,
    /// Released without artifact collection (forced termination path).
    Discarded,
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
