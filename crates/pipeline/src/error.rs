// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Load-time error taxonomy.

use thiserror::Error;
use wave_core::StepId;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{path}: expected kind WavePipeline, found {found}")]
    WrongKind { path: String, found: String },

    #[error("cycle detected through step {0}")]
    CycleDetected(StepId),

    #[error("step {step} depends on unknown step {dependency}")]
    UnknownDependency { step: StepId, dependency: StepId },

    #[error("step {0} references unknown persona {1}")]
    UnknownPersona(StepId, String),

    #[error("duplicate step id {0}")]
    DuplicateStep(StepId),

    #[error("step {step} injects artifact {artifact} from unknown step {producer}")]
    UnknownInjectionSource {
        step: StepId,
        artifact: String,
        producer: StepId,
    },

    #[error("manifest references unknown skill {0} in pipeline requires block")]
    UnknownSkill(String),

    #[error("manifest references unknown tool {0} in pipeline requires block")]
    UnknownTool(String),
}
