// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level manifest: personas, skills, runtime settings.
//! Loading this file from disk is the CLI's job; this module only owns
//! the shape and `serde_yaml` parsing of the document's content.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use wave_core::Persona;

/// A skill's install/check/init commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub check: Option<String>,
    #[serde(default)]
    pub install: Option<String>,
    #[serde(default)]
    pub init: Option<String>,
    #[serde(default)]
    pub commands_glob: Option<String>,
}

/// Runtime settings shared by every run driven from this manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default, with = "duration_opt")]
    pub default_step_timeout: Option<Duration>,
}

mod duration_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;
    use wave_core::pipeline::parse_duration;

    pub fn serialize<S: Serializer>(v: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(d) => s.serialize_some(&format!("{}ms", d.as_millis())),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| {
            parse_duration(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid duration: {s}")))
        })
        .transpose()
    }
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from(".wave/workspaces")
}

fn default_concurrency() -> usize {
    4
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            workspace_root: default_workspace_root(),
            concurrency: default_concurrency(),
            default_step_timeout: None,
        }
    }
}

/// The manifest document: personas + skills + runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub personas: IndexMap<String, PersonaSpec>,
    #[serde(default)]
    pub skills: IndexMap<String, Skill>,
    #[serde(default)]
    pub runtime: RuntimeSettings,
}

/// On-disk persona shape; `name` is filled from the map key at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaSpec {
    pub adapter: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<String>,
    pub system_prompt_file: PathBuf,
    #[serde(default)]
    pub permissions: wave_core::Permissions,
}

impl Manifest {
    /// Parse a manifest document. `system_prompt_file` contents are
    /// resolved by the caller (`wave-cli`) since reading the prompt body
    /// is a filesystem concern the manifest loader does not own.
    pub fn from_yaml(text: &str) -> Result<Self, crate::LoadError> {
        serde_yaml::from_str(text).map_err(|source| crate::LoadError::Yaml {
            path: "<manifest>".into(),
            source,
        })
    }

    /// Resolve a persona by name, given its system prompt text (read from
    /// `system_prompt_file` by the caller).
    pub fn persona(&self, name: &str, system_prompt: String) -> Option<Persona> {
        let spec = self.personas.get(name)?;
        Some(Persona {
            name: wave_core::PersonaName::new(name),
            adapter: spec.adapter.clone(),
            model: spec.model.clone(),
            temperature: spec.temperature.clone(),
            system_prompt,
            permissions: spec.permissions.clone(),
        })
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
