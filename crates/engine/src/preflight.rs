// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Preflight checks: before the first step runs, verify
//! every tool in `requires.tools` is on `PATH` and every skill in
//! `requires.skills` is installed (or installable via its declared
//! install+init commands). A missing tool, or a skill whose check still
//! fails after install, is fatal and short-circuits the run.

use std::path::Path;

use wave_pipeline::Skill;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreflightOutcome {
    /// The dependency was already present.
    Found,
    /// The dependency was absent and the declared install+init succeeded.
    Installed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightCheck {
    pub name: String,
    pub outcome: PreflightOutcome,
}

/// Verify a tool name resolves to an executable on `PATH`.
pub fn check_tool(name: &str) -> Result<PreflightCheck, EngineError> {
    if tool_on_path(name) {
        Ok(PreflightCheck {
            name: name.to_string(),
            outcome: PreflightOutcome::Found,
        })
    } else {
        Err(EngineError::MissingTool(name.to_string()))
    }
}

fn tool_on_path(name: &str) -> bool {
    let Some(path_var) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path_var).any(|dir| is_executable(&dir.join(name)))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Check (and, if absent, install) a skill, idempotently. Installation has
/// no concurrency guard: skill checks are idempotent by contract, so no
/// locking is performed.
pub async fn check_skill(name: &str, skill: &Skill, workdir: &Path) -> Result<PreflightCheck, EngineError> {
    if let Some(check) = &skill.check {
        if run_shell(check, workdir).await? {
            return Ok(PreflightCheck {
                name: name.to_string(),
                outcome: PreflightOutcome::Found,
            });
        }
    }

    if let Some(install) = &skill.install {
        run_shell(install, workdir).await?;
    }
    if let Some(init) = &skill.init {
        run_shell(init, workdir).await?;
    }

    if let Some(check) = &skill.check {
        if !run_shell(check, workdir).await? {
            return Err(EngineError::SkillInstallFailed(name.to_string()));
        }
    }

    Ok(PreflightCheck {
        name: name.to_string(),
        outcome: PreflightOutcome::Installed,
    })
}

async fn run_shell(command: &str, workdir: &Path) -> Result<bool, EngineError> {
    let status = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(workdir)
        .status()
        .await
        .map_err(|e| EngineError::SkillInstallFailed(format!("{command}: {e}")))?;
    Ok(status.success())
}

#[cfg(test)]
#[path = "preflight_tests.rs"]
mod tests;
