// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders shared by downstream crates' test suites. Gated behind the
//! `test-support` feature so they never leak into a release build.

use crate::ids::{PersonaName, PipelineName, StepId};
use crate::pipeline::{
    Exec, InputSource, Persona, Pipeline, PromptSource, Requirements, StepDef, WorkspaceConfig,
};

/// Build a minimal single-step pipeline with an inline prompt and no
/// contract, dependencies, or injected artifacts.
pub fn trivial_pipeline(name: &str, step_id: &str, persona: &str) -> Pipeline {
    Pipeline {
        name: PipelineName::new(name),
        description: None,
        input_source: InputSource::Cli,
        requires: Requirements::default(),
        steps: vec![trivial_step(step_id, persona)],
    }
}

/// Build a minimal step definition: no dependencies, contract, timeout, or
/// retry budget, an inline empty prompt.
pub fn trivial_step(step_id: &str, persona: &str) -> StepDef {
    StepDef {
        id: StepId::new(step_id),
        persona: PersonaName::new(persona),
        dependencies: Vec::new(),
        memory: Default::default(),
        workspace: WorkspaceConfig::default(),
        exec: Exec::Prompt {
            source: PromptSource::Inline(String::new()),
        },
        output_artifacts: Vec::new(),
        contract: None,
        timeout: None,
        max_retries: 0,
    }
}

/// Build a minimal persona with no model/temperature hints and a
/// permissive permission set.
pub fn trivial_persona(name: &str, adapter: &str) -> Persona {
    Persona {
        name: PersonaName::new(name),
        adapter: adapter.to_string(),
        model: None,
        temperature: None,
        system_prompt: String::new(),
        permissions: Default::default(),
    }
}
