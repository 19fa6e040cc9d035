// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact store & injector: registers the outputs of each
//! step and re-presents chosen outputs to downstream steps.
//!
//! Archival path: `<artifacts_root>/<run_id>/<step_id>/<name>`. Registration
//! copies the workspace file there via rename-within-filesystem where
//! possible, falling back to copy+remove across filesystems; injection
//! copies out of the archive and never links or writes back into it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use wave_core::{Artifact, ArtifactName, ArtifactValidation, MissingArtifactRef, OutputArtifactDecl, RunId, StepId};

use crate::error::EngineError;

#[derive(Clone)]
pub struct ArtifactStore {
    artifacts_root: PathBuf,
}

impl ArtifactStore {
    pub fn new(artifacts_root: PathBuf) -> Self {
        Self { artifacts_root }
    }

    /// Register every declared output of a completed step. Verifies each
    /// file exists in the workspace, then moves it to its archival path.
    /// Overwrites are rejected: `(name, step, run)` cannot be registered
    /// twice.
    pub async fn register_artifacts(
        &self,
        run_id: &RunId,
        step_id: &StepId,
        workspace_path: &Path,
        declared: &[OutputArtifactDecl],
        validation: ArtifactValidation,
        now: DateTime<Utc>,
    ) -> Result<Vec<Artifact>, EngineError> {
        let step_archive = self
            .artifacts_root
            .join(run_id.as_str())
            .join(step_id.as_str());
        tokio::fs::create_dir_all(&step_archive)
            .await
            .map_err(|e| EngineError::WorkspaceUnavailable(e.to_string()))?;

        let mut registered = Vec::with_capacity(declared.len());
        for decl in declared {
            let source = workspace_path.join(&decl.path);
            let meta = tokio::fs::metadata(&source).await.map_err(|_| {
                EngineError::StepFailed(
                    step_id.clone(),
                    format!("declared output artifact not found: {}", decl.path.display()),
                )
            })?;

            let archive_path = step_archive.join(decl.name.as_str());
            if tokio::fs::try_exists(&archive_path).await.unwrap_or(false) {
                return Err(EngineError::StepFailed(
                    step_id.clone(),
                    format!("artifact already registered: {}", decl.name),
                ));
            }

            move_atomic(&source, &archive_path).await?;

            registered.push(Artifact {
                run_id: run_id.clone(),
                step_id: step_id.clone(),
                name: decl.name.clone(),
                path: archive_path,
                type_hint: decl.type_hint.clone(),
                size_bytes: meta.len(),
                created_at: now,
                validation: validation.clone(),
            });
        }
        Ok(registered)
    }

    /// Copy every injected artifact reference into the step's workspace
    /// under its local alias. If any reference is unsatisfied, no copy is
    /// performed at all and the full list of misses is returned.
    pub async fn inject(
        &self,
        workspace_path: &Path,
        refs: &[(StepId, ArtifactName, PathBuf)],
        lookup: &HashMap<(StepId, ArtifactName), PathBuf>,
    ) -> Result<Vec<(String, PathBuf)>, EngineError> {
        let mut missing = Vec::new();
        for (producer, name, _) in refs {
            if !lookup.contains_key(&(producer.clone(), name.clone())) {
                missing.push(MissingArtifactRef {
                    artifact_name: name.clone(),
                    producer_step: producer.clone(),
                });
            }
        }
        if !missing.is_empty() {
            return Err(EngineError::MissingArtifacts(missing));
        }

        let mut injected = Vec::with_capacity(refs.len());
        for (producer, name, local_alias) in refs {
            let archived = &lookup[&(producer.clone(), name.clone())];
            let dest = workspace_path.join(local_alias);
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| EngineError::WorkspaceUnavailable(e.to_string()))?;
            }
            tokio::fs::copy(archived, &dest)
                .await
                .map_err(|e| EngineError::WorkspaceUnavailable(e.to_string()))?;
            injected.push((local_alias.display().to_string(), dest));
        }
        Ok(injected)
    }
}

async fn move_atomic(source: &Path, dest: &Path) -> Result<(), EngineError> {
    match tokio::fs::rename(source, dest).await {
        Ok(()) => Ok(()),
        Err(_) => {
            // Cross-filesystem rename fails; fall back to copy+remove.
            tokio::fs::copy(source, dest)
                .await
                .map_err(|e| EngineError::WorkspaceUnavailable(e.to_string()))?;
            let _ = tokio::fs::remove_file(source).await;
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
