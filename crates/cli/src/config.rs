// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manifest/pipeline file discovery and loading glue.
//!
//! `wave-pipeline` owns parsing the document bodies; this module only
//! locates the files on disk and resolves a persona's `system_prompt_file`
//! into the in-memory `Persona` the engine needs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wave_core::{PersonaName, Persona, Pipeline};
use wave_pipeline::{parse_pipeline, Manifest, Skill};

/// Default manifest path, relative to the repo root.
pub const DEFAULT_MANIFEST: &str = "wave.yaml";

/// `.wave/` state directory, relative to the repo root.
pub fn state_dir(repo_root: &Path) -> PathBuf {
    repo_root.join(".wave")
}

pub struct LoadedManifest {
    pub manifest: Manifest,
    pub personas: HashMap<PersonaName, Persona>,
    pub skills: HashMap<String, Skill>,
}

/// Load and parse the manifest at `path` (relative to `repo_root` if not
/// absolute), reading each persona's `system_prompt_file` relative to the
/// manifest's own directory.
pub fn load_manifest(repo_root: &Path, path: &Path) -> Result<LoadedManifest> {
    let manifest_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    };
    let text = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read manifest {}", manifest_path.display()))?;
    let manifest = Manifest::from_yaml(&text)
        .with_context(|| format!("failed to parse manifest {}", manifest_path.display()))?;

    let manifest_dir = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| repo_root.to_path_buf());

    let mut personas = HashMap::with_capacity(manifest.personas.len());
    for (name, spec) in &manifest.personas {
        let prompt_path = manifest_dir.join(&spec.system_prompt_file);
        let system_prompt = std::fs::read_to_string(&prompt_path).with_context(|| {
            format!(
                "failed to read system prompt file {} for persona '{name}'",
                prompt_path.display()
            )
        })?;
        let persona = manifest
            .persona(name, system_prompt)
            .expect("persona just looked up from its own manifest entry");
        personas.insert(PersonaName::new(name), persona);
    }

    let skills = manifest.skills.clone().into_iter().collect();

    Ok(LoadedManifest {
        manifest,
        personas,
        skills,
    })
}

/// Load and parse a pipeline document, validating it against an already
/// loaded manifest (persona/skill existence, cycle detection).
pub fn load_pipeline(path: &Path, manifest: &Manifest) -> Result<Pipeline> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read pipeline {}", path.display()))?;
    let pipeline = parse_pipeline(&path.display().to_string(), &text, manifest)?;
    Ok(pipeline)
}

/// Concurrency to run the pipeline's worker pool at: the manifest's
/// declared concurrency, clamped to 1 if any step shares a worktree
/// workspace: clamped to 1 if the pipeline declares shared workspaces that
/// require serialization.
pub fn effective_concurrency(manifest: &Manifest, pipeline: &Pipeline) -> usize {
    let declares_shared_workspace = pipeline
        .steps
        .iter()
        .any(|s| s.workspace.shared_ref.is_some());
    if declares_shared_workspace {
        1
    } else {
        manifest.runtime.concurrency.max(1)
    }
}
