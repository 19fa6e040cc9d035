// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Contract validator error taxonomy.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("failed to read artifact at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema path {0} escapes the approved schema directory")]
    SchemaPathEscape(PathBuf),

    #[error("failed to compile json schema: {0}")]
    SchemaCompile(String),

    #[error("failed to spawn test suite command: {0}")]
    Spawn(#[source] std::io::Error),
}

/// The outcome of validating one step's output.
///
/// `message` is a one-line summary; `details` carries the full violation
/// list (schema errors, captured stdout/stderr, missing sections).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub contract_type: String,
    pub message: String,
    pub details: Vec<String>,
    pub retryable: bool,
    pub attempt: u32,
    pub max_retries: u32,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} contract failed: {}", self.contract_type, self.message)
    }
}

/// A validator's decision for one step's output. The validator itself is
/// side-effect-free: retry-or-fail is decided by the executor, never here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Pass,
    Fail(ValidationError),
    /// Non-`must_pass` contract failure: the step still completes.
    Warn(ValidationError),
}

impl Decision {
    pub fn is_pass(&self) -> bool {
        matches!(self, Decision::Pass)
    }
}
