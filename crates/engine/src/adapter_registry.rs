// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps a [`wave_core::Persona`]'s adapter identifier to a concrete
//! subprocess argv. The executor delegates to an opaque subprocess
//! adapter — reasoning itself happens entirely out-of-process; this
//! module only names the built-in set of adapter flavors.
//!
//! A fixed set of flags is derived from persona hints (model, permissions),
//! and the composed prompt is passed as a single argument rather than over
//! stdin, so the adapter's stdout stays pure NDJSON.

use wave_core::Persona;

/// Subprocess flavor for a given `persona.adapter` identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterBinding {
    pub program: String,
    pub base_args: Vec<String>,
}

/// Resolve `adapter` to its binding. Unknown identifiers fall back to
/// treating the identifier itself as the program name with no base args,
/// so a manifest can reference an adapter CLI the registry doesn't name
/// explicitly.
pub fn resolve(adapter: &str) -> AdapterBinding {
    match adapter {
        "claude" | "claude-code" => AdapterBinding {
            program: "claude".to_string(),
            base_args: vec![
                "--output-format".to_string(),
                "stream-json".to_string(),
                "--print".to_string(),
            ],
        },
        "codex" => AdapterBinding {
            program: "codex".to_string(),
            base_args: vec!["exec".to_string(), "--json".to_string()],
        },
        other => AdapterBinding {
            program: other.to_string(),
            base_args: Vec::new(),
        },
    }
}

/// Build the full argv for one invocation: the adapter's base args plus
/// persona hints (model, permission patterns) and the composed prompt.
/// Denied tools always win over allowed tools on conflict.
pub fn build_args(binding: &AdapterBinding, persona: &Persona, prompt: &str) -> Vec<String> {
    let mut args = binding.base_args.clone();

    if let Some(model) = &persona.model {
        args.push("--model".to_string());
        args.push(model.clone());
    }
    for allow in &persona.permissions.allow {
        args.push("--allowed-tools".to_string());
        args.push(allow.clone());
    }
    for deny in &persona.permissions.deny {
        args.push("--disallowed-tools".to_string());
        args.push(deny.clone());
    }
    if !persona.system_prompt.is_empty() {
        args.push("--append-system-prompt".to_string());
        args.push(persona.system_prompt.clone());
    }

    args.push(prompt.to_string());
    args
}

#[cfg(test)]
#[path = "adapter_registry_tests.rs"]
mod tests;
