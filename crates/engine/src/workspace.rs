// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace provisioner: materializes an isolated
//! filesystem for each step and releases it at step end.
//!
//! Two modes: a fresh [`WorkspaceMode::Ephemeral`] directory per
//! `(run_id, step_id)`, or a shared [`WorkspaceMode::GitWorktree`] keyed by
//! a step's declared `workspace.ref`. Shared-worktree serialization is a
//! named semaphore of capacity 1 indexed by the ref, acquired
//! in [`WorkspaceProvisioner::prepare`] and released when the returned
//! [`WorkspaceHandle`] is dropped.
//!
//! Worktree removal shells out to `git worktree remove --force`; see
//! DESIGN.md for how worktree creation was added here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use wave_core::{Persona, RunId, StepDef, StepId, WorkspaceId, WorkspaceMode};

use crate::error::EngineError;

/// Name of the in-workspace file that carries a persona's tool
/// permissions for the adapter to read. Written fresh for every step
/// attempt, before the adapter is launched.
const PERMISSION_GUIDANCE_FILE: &str = ".wave-permissions.md";

/// Project a persona's allow/deny tool patterns into a guidance file at
/// the workspace root (spec.md §4.3: "projected ... into an in-workspace
/// guidance file that the adapter is expected to honor"). This is in
/// addition to, not instead of, the same patterns passed as CLI flags in
/// [`crate::adapter_registry::build_args`] — the executor's own
/// fail-secure deny enforcement does not depend on the adapter reading
/// this file at all.
pub async fn write_permission_guidance(workspace_path: &Path, persona: &Persona) -> Result<(), EngineError> {
    let mut body = String::from("# Tool permissions\n\nDeny rules win over allow rules on conflict.\n\n## Denied\n");
    if persona.permissions.deny.is_empty() {
        body.push_str("(none)\n");
    } else {
        for pattern in &persona.permissions.deny {
            body.push_str(&format!("- {pattern}\n"));
        }
    }
    body.push_str("\n## Allowed\n");
    if persona.permissions.allow.is_empty() {
        body.push_str("(all, subject to the denies above)\n");
    } else {
        for pattern in &persona.permissions.allow {
            body.push_str(&format!("- {pattern}\n"));
        }
    }

    tokio::fs::write(workspace_path.join(PERMISSION_GUIDANCE_FILE), body)
        .await
        .map_err(|e| EngineError::WorkspaceUnavailable(format!("{}: {e}", workspace_path.display())))
}

/// A prepared workspace. Dropping it releases any shared-worktree
/// serialization permit; the directory itself is only removed by
/// [`WorkspaceProvisioner::release`] (ephemeral) or
/// [`WorkspaceProvisioner::cleanup_run`] (git worktree, at run end).
pub struct WorkspaceHandle {
    pub id: WorkspaceId,
    pub run_id: RunId,
    pub step_id: StepId,
    pub path: PathBuf,
    pub mode: WorkspaceMode,
    readonly_snapshot: Vec<(PathBuf, MountSnapshot)>,
    _shared_permit: Option<OwnedSemaphorePermit>,
}

#[derive(Clone, Copy)]
struct MountSnapshot {
    len: u64,
    modified: Option<SystemTime>,
}

pub struct WorkspaceProvisioner {
    repo_root: PathBuf,
    workspace_root: PathBuf,
    base_ref: String,
    shared_semaphores: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl WorkspaceProvisioner {
    pub fn new(repo_root: PathBuf, workspace_root: PathBuf, base_ref: impl Into<String>) -> Self {
        Self {
            repo_root,
            workspace_root,
            base_ref: base_ref.into(),
            shared_semaphores: Mutex::new(HashMap::new()),
        }
    }

    /// Materialize a step's workspace. Blocks (cooperatively, via the
    /// shared semaphore) until a worktree shared by an earlier step is
    /// free, if `step.workspace.ref` is set.
    pub async fn prepare(
        &self,
        run_id: &RunId,
        step: &StepDef,
    ) -> Result<WorkspaceHandle, EngineError> {
        if let Some(shared_ref) = &step.workspace.shared_ref {
            self.prepare_git_worktree(run_id, step, shared_ref).await
        } else {
            self.prepare_ephemeral(run_id, step).await
        }
    }

    async fn prepare_ephemeral(
        &self,
        run_id: &RunId,
        step: &StepDef,
    ) -> Result<WorkspaceHandle, EngineError> {
        let path = self
            .workspace_root
            .join(run_id.as_str())
            .join(step.id.as_str());
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| EngineError::WorkspaceUnavailable(format!("{}: {e}", path.display())))?;

        let mut readonly_snapshot = Vec::new();
        for mount in &step.workspace.mounts {
            let source = normalize_under(&self.repo_root, &mount.source).map_err(|e| {
                EngineError::Security(format!("mount source escapes repository root: {e}"))
            })?;
            let dest_name = mount
                .dest
                .clone()
                .unwrap_or_else(|| PathBuf::from(source.file_name().unwrap_or_default()));
            let dest = normalize_under(&path, &dest_name).map_err(|e| {
                EngineError::Security(format!("mount destination escapes workspace root: {e}"))
            })?;

            match mount.mode {
                wave_core::MountMode::Readonly => {
                    copy_recursive(&source, &dest).await?;
                    mark_readonly(&dest).await?;
                    readonly_snapshot.extend(snapshot_tree(&dest).await);
                }
                wave_core::MountMode::Readwrite => {
                    if let Some(parent) = dest.parent() {
                        let _ = tokio::fs::create_dir_all(parent).await;
                    }
                    tokio::fs::symlink(&source, &dest).await.map_err(|e| {
                        EngineError::WorkspaceUnavailable(format!(
                            "failed to link mount {}: {e}",
                            dest.display()
                        ))
                    })?;
                }
            }
        }

        Ok(WorkspaceHandle {
            id: WorkspaceId::new(format!("{}-{}", run_id.as_str(), step.id.as_str())),
            run_id: run_id.clone(),
            step_id: step.id.clone(),
            path,
            mode: WorkspaceMode::Ephemeral,
            readonly_snapshot,
            _shared_permit: None,
        })
    }

    async fn prepare_git_worktree(
        &self,
        run_id: &RunId,
        step: &StepDef,
        shared_ref: &str,
    ) -> Result<WorkspaceHandle, EngineError> {
        let semaphore = {
            let mut map = self.shared_semaphores.lock();
            map.entry(format!("{}/{}", run_id.as_str(), shared_ref))
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };
        let permit = semaphore
            .acquire_owned()
            .await
            .map_err(|_| EngineError::WorkspaceUnavailable("shared workspace semaphore closed".into()))?;

        let path = self
            .workspace_root
            .join(run_id.as_str())
            .join("_shared")
            .join(sanitize_ref(shared_ref));

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    EngineError::WorkspaceUnavailable(format!("{}: {e}", parent.display()))
                })?;
            }
            let output = tokio::process::Command::new("git")
                .arg("worktree")
                .arg("add")
                .arg("--detach")
                .arg(&path)
                .arg(&self.base_ref)
                .current_dir(&self.repo_root)
                .output()
                .await
                .map_err(|e| EngineError::WorkspaceUnavailable(format!("git worktree add: {e}")))?;
            if !output.status.success() {
                return Err(EngineError::WorkspaceUnavailable(format!(
                    "git worktree add failed: {}",
                    String::from_utf8_lossy(&output.stderr)
                )));
            }
        }

        Ok(WorkspaceHandle {
            id: WorkspaceId::new(format!("{}-{}", run_id.as_str(), shared_ref)),
            run_id: run_id.clone(),
            step_id: step.id.clone(),
            path,
            mode: WorkspaceMode::GitWorktree,
            readonly_snapshot: Vec::new(),
            _shared_permit: Some(permit),
        })
    }

    /// Release a step's workspace. For [`WorkspaceMode::Ephemeral`], the
    /// directory is removed unconditionally (declared artifacts must
    /// already have been archived by [`crate::artifacts::ArtifactStore`]
    /// before this is called on a clean exit). Git worktrees outlive the
    /// step — they are removed by [`Self::cleanup_run`] instead, since a
    /// later step may still reuse the same `ref`.
    ///
    /// Returns `Err(EngineError::Security(..))` if a readonly mount was
    /// written to during the step, without suppressing the cleanup itself.
    pub async fn release(&self, handle: WorkspaceHandle) -> Result<(), EngineError> {
        let violation = self.check_readonly_violations(&handle).await;

        if handle.mode == WorkspaceMode::Ephemeral && handle.path.exists() {
            let _ = tokio::fs::remove_dir_all(&handle.path).await;
        }

        violation
    }

    async fn check_readonly_violations(&self, handle: &WorkspaceHandle) -> Result<(), EngineError> {
        for (path, before) in &handle.readonly_snapshot {
            let Ok(meta) = tokio::fs::metadata(path).await else {
                return Err(EngineError::Security(format!(
                    "readonly mount entry removed: {}",
                    path.display()
                )));
            };
            let after = MountSnapshot {
                len: meta.len(),
                modified: meta.modified().ok(),
            };
            if after.len != before.len || after.modified != before.modified {
                return Err(EngineError::Security(format!(
                    "readonly mount was written to: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Remove every git worktree provisioned for `run_id`. Best-effort.
    pub async fn cleanup_run(&self, run_id: &RunId) {
        let shared_root = self.workspace_root.join(run_id.as_str()).join("_shared");
        if !tokio::fs::try_exists(&shared_root).await.unwrap_or(false) {
            return;
        }
        let _ = tokio::process::Command::new("git")
            .arg("worktree")
            .arg("remove")
            .arg("--force")
            .arg(&shared_root)
            .current_dir(&self.repo_root)
            .output()
            .await;
        let _ = tokio::fs::remove_dir_all(&shared_root).await;
        self.shared_semaphores
            .lock()
            .retain(|k, _| !k.starts_with(&format!("{}/", run_id.as_str())));
    }
}

async fn copy_recursive(source: &Path, dest: &Path) -> Result<(), EngineError> {
    let meta = tokio::fs::metadata(source).await.map_err(|e| {
        EngineError::WorkspaceUnavailable(format!("mount source {}: {e}", source.display()))
    })?;
    if meta.is_dir() {
        tokio::fs::create_dir_all(dest).await.map_err(|e| {
            EngineError::WorkspaceUnavailable(format!("{}: {e}", dest.display()))
        })?;
        let mut entries = tokio::fs::read_dir(source).await.map_err(|e| {
            EngineError::WorkspaceUnavailable(format!("{}: {e}", source.display()))
        })?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            EngineError::WorkspaceUnavailable(format!("reading {}: {e}", source.display()))
        })? {
            let child_dest = dest.join(entry.file_name());
            Box::pin(copy_recursive(&entry.path(), &child_dest)).await?;
        }
    } else {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        tokio::fs::copy(source, dest).await.map_err(|e| {
            EngineError::WorkspaceUnavailable(format!(
                "copying {} to {}: {e}",
                source.display(),
                dest.display()
            ))
        })?;
    }
    Ok(())
}

async fn mark_readonly(root: &Path) -> Result<(), EngineError> {
    let meta = tokio::fs::metadata(root)
        .await
        .map_err(|e| EngineError::WorkspaceUnavailable(e.to_string()))?;
    if meta.is_dir() {
        let mut entries = tokio::fs::read_dir(root)
            .await
            .map_err(|e| EngineError::WorkspaceUnavailable(e.to_string()))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| EngineError::WorkspaceUnavailable(e.to_string()))?
        {
            Box::pin(mark_readonly(&entry.path())).await?;
        }
    } else {
        let mut perms = meta.permissions();
        perms.set_readonly(true);
        tokio::fs::set_permissions(root, perms)
            .await
            .map_err(|e| EngineError::WorkspaceUnavailable(e.to_string()))?;
    }
    Ok(())
}

async fn snapshot_tree(root: &Path) -> Vec<(PathBuf, MountSnapshot)> {
    let mut out = Vec::new();
    let Ok(meta) = tokio::fs::metadata(root).await else {
        return out;
    };
    if meta.is_dir() {
        if let Ok(mut entries) = tokio::fs::read_dir(root).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                out.extend(Box::pin(snapshot_tree(&entry.path())).await);
            }
        }
    } else {
        out.push((
            root.to_path_buf(),
            MountSnapshot {
                len: meta.len(),
                modified: meta.modified().ok(),
            },
        ));
    }
    out
}

fn sanitize_ref(shared_ref: &str) -> String {
    shared_ref
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Join `candidate` onto `root` and reject the result if, after lexical
/// normalization, it escapes `root`: mount sources that escape the
/// repository root after normalization are rejected outright.
fn normalize_under(root: &Path, candidate: &Path) -> Result<PathBuf, String> {
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };
    let normalized = lexical_normalize(&joined);
    let root_normalized = lexical_normalize(root);
    if normalized.starts_with(&root_normalized) {
        Ok(normalized)
    } else {
        Err(format!("{} escapes {}", candidate.display(), root.display()))
    }
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
