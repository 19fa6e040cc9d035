// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `test_suite` validator kind: runs a configured command in
//! the step's workspace; exit 0 passes, non-zero fails with captured
//! stdout/stderr attached to the validation details.

use std::path::Path;

use crate::error::ContractError;

pub struct TestSuiteOutcome {
    pub passed: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

pub async fn run(
    command: &str,
    args: &[String],
    workspace_path: &Path,
) -> Result<TestSuiteOutcome, ContractError> {
    let output = tokio::process::Command::new(command)
        .args(args)
        .current_dir(workspace_path)
        .output()
        .await
        .map_err(ContractError::Spawn)?;

    Ok(TestSuiteOutcome {
        passed: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    })
}

#[cfg(test)]
#[path = "test_suite_tests.rs"]
mod tests;
