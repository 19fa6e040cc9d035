// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing of the `kind: WavePipeline` YAML document into
//! [`wave_core::Pipeline`], plus load-time validation: unknown persona
//! references, duplicate step ids, and unsatisfiable dependency/injection
//! references by name (cycle detection lives in [`crate::dag`]).

use crate::manifest::Manifest;
use crate::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use wave_core::{InputSource, Pipeline, Requirements, StepDef};

/// On-disk document shape: `kind` + `metadata` + the pipeline body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PipelineDocument {
    kind: String,
    metadata: Metadata,
    input: InputBlock,
    #[serde(default)]
    requires: Requirements,
    steps: Vec<StepDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Metadata {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InputBlock {
    source: InputSource,
}

/// Parse a pipeline document and validate it against a loaded manifest
/// (persona existence, requires.skills/tools existence). Cycle detection
/// and implicit-edge derivation happen separately in [`crate::dag::build`]
/// so scheduling never re-derives edges mid-run.
pub fn parse_pipeline(path: &str, text: &str, manifest: &Manifest) -> Result<Pipeline, LoadError> {
    let doc: PipelineDocument = serde_yaml::from_str(text).map_err(|source| LoadError::Yaml {
        path: path.to_string(),
        source,
    })?;

    if doc.kind != "WavePipeline" {
        return Err(LoadError::WrongKind {
            path: path.to_string(),
            found: doc.kind,
        });
    }

    let mut seen = HashSet::new();
    for step in &doc.steps {
        if !seen.insert(step.id.clone()) {
            return Err(LoadError::DuplicateStep(step.id.clone()));
        }
        if !manifest.personas.contains_key(step.persona.as_str()) {
            return Err(LoadError::UnknownPersona(
                step.id.clone(),
                step.persona.as_str().to_string(),
            ));
        }
        for dep in &step.dependencies {
            if !doc.steps.iter().any(|s| &s.id == dep) {
                return Err(LoadError::UnknownDependency {
                    step: step.id.clone(),
                    dependency: dep.clone(),
                });
            }
        }
        for inject in &step.memory.inject_artifacts {
            if !doc.steps.iter().any(|s| s.id == inject.step_id) {
                return Err(LoadError::UnknownInjectionSource {
                    step: step.id.clone(),
                    artifact: inject.artifact_name.as_str().to_string(),
                    producer: inject.step_id.clone(),
                });
            }
        }
    }

    for skill in &doc.requires.skills {
        if !manifest.skills.contains_key(skill) {
            return Err(LoadError::UnknownSkill(skill.clone()));
        }
    }

    let pipeline = Pipeline {
        name: wave_core::PipelineName::new(doc.metadata.name),
        description: doc.metadata.description,
        input_source: doc.input.source,
        requires: doc.requires,
        steps: doc.steps,
    };

    crate::dag::build(&pipeline)?;

    Ok(pipeline)
}

#[cfg(test)]
#[path = "load_tests.rs"]
mod tests;
