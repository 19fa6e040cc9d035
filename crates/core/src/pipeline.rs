// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable pipeline, step, and persona definitions.
//!
//! Everything in this module is read-only reference data for the duration
//! of a [`crate::run::Run`] — it is loaded once by `wave-pipeline` and never
//! mutated by the executor.

use crate::ids::{ArtifactName, PersonaName, PipelineName, StepId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where a pipeline's literal input comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Cli,
    Prompt,
}

/// `requires` block: external tools/skills a pipeline depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
}

/// An immutable pipeline definition: an ordered DAG of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: PipelineName,
    #[serde(default)]
    pub description: Option<String>,
    pub input_source: InputSource,
    #[serde(default)]
    pub requires: Requirements,
    pub steps: Vec<StepDef>,
}

impl Pipeline {
    /// Look up a step by id.
    pub fn step(&self, id: &StepId) -> Option<&StepDef> {
        self.steps.iter().find(|s| &s.id == id)
    }
}

/// Workspace mount mode for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountMode {
    Readonly,
    Readwrite,
}

/// A single directory mounted into a step's workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    pub source: PathBuf,
    #[serde(default)]
    pub dest: Option<PathBuf>,
    pub mode: MountMode,
}

/// Workspace configuration for a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub mounts: Vec<Mount>,
    /// Shared worktree identifier; steps declaring the same `ref` serialize
    /// against one another regardless of configured concurrency.
    #[serde(rename = "ref", default)]
    pub shared_ref: Option<String>,
}

/// A single `{step_id, artifact_name, local_alias}` injection reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub step_id: StepId,
    pub artifact_name: ArtifactName,
    pub local_alias: PathBuf,
}

/// Memory/injection strategy for a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub strategy: MemoryStrategy,
    #[serde(default)]
    pub inject_artifacts: Vec<ArtifactRef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStrategy {
    #[default]
    None,
    Full,
    Summarized,
}

/// A declared output of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifactDecl {
    pub name: ArtifactName,
    pub path: PathBuf,
    #[serde(default)]
    pub type_hint: Option<String>,
}

/// The `exec` block of a step. Only `prompt` is supported by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Exec {
    Prompt { source: PromptSource },
}

/// A step's prompt, either inline text or a path to a template file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptSource {
    Inline(String),
    File { file: PathBuf },
}

/// Contract validator kind attached to a step's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContractKind {
    JsonSchema {
        /// Inline schema text, or `schema_path` pointing under the approved
        /// schema directory.
        #[serde(default)]
        schema: Option<serde_json::Value>,
        #[serde(default)]
        schema_path: Option<PathBuf>,
        /// Which declared output artifact this validates.
        artifact: ArtifactName,
    },
    TestSuite {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
    Template {
        artifact: ArtifactName,
        required_sections: Vec<String>,
    },
}

/// A contract attached to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    #[serde(flatten)]
    pub kind: ContractKind,
    #[serde(default = "default_must_pass")]
    pub must_pass: bool,
}

fn default_must_pass() -> bool {
    true
}

/// A single node in the pipeline DAG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDef {
    pub id: StepId,
    pub persona: PersonaName,
    #[serde(default)]
    pub dependencies: Vec<StepId>,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    pub exec: Exec,
    #[serde(default)]
    pub output_artifacts: Vec<OutputArtifactDecl>,
    #[serde(default)]
    pub contract: Option<Contract>,
    #[serde(default, with = "humantime_opt")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub max_retries: u32,
}

/// A permission set: deny rules win over allow rules on conflict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
}

impl Permissions {
    /// Whether `tool` is permitted: deny rules win over allow rules.
    pub fn is_allowed(&self, tool: &str) -> bool {
        if self.deny.iter().any(|p| glob_match(p, tool)) {
            return false;
        }
        self.allow.is_empty() || self.allow.iter().any(|p| glob_match(p, tool))
    }
}

fn glob_match(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return value.starts_with(prefix);
    }
    pattern == value
}

/// A named agent profile: adapter identity, model hints, prompt, permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: PersonaName,
    pub adapter: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<String>,
    pub system_prompt: String,
    #[serde(default)]
    pub permissions: Permissions,
}

/// Minimal duration scanner for step timeouts: `"500ms"`, `"30s"`, `"5m"`,
/// `"1h"`, or a bare integer read as milliseconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split_at = raw.find(|c: char| !c.is_ascii_digit())?;
    let (digits, suffix) = raw.split_at(split_at);
    let n: u64 = digits.parse().ok()?;
    match suffix {
        "ms" => Some(Duration::from_millis(n)),
        "s" => Some(Duration::from_secs(n)),
        "m" => Some(Duration::from_secs(n * 60)),
        "h" => Some(Duration::from_secs(n * 3600)),
        "" if digits.is_empty() => None,
        _ => None,
    }
}

mod humantime_opt {
    use super::parse_duration;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(v: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(d) => s.serialize_some(&format!("{}ms", d.as_millis())),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let raw: Option<RawDuration> = Option::deserialize(d)?;
        raw.map(|r| match r {
            RawDuration::Millis(ms) => Ok(Duration::from_millis(ms)),
            RawDuration::Text(s) => parse_duration(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid duration: {s}"))),
        })
        .transpose()
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Millis(u64),
        Text(String),
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
