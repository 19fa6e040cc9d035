// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use wave_core::{Permissions, PersonaName};

fn persona(model: Option<&str>, allow: Vec<&str>, deny: Vec<&str>) -> Persona {
    Persona {
        name: PersonaName::new("reviewer"),
        adapter: "claude".to_string(),
        model: model.map(|m| m.to_string()),
        temperature: None,
        system_prompt: String::new(),
        permissions: Permissions {
            allow: allow.into_iter().map(String::from).collect(),
            deny: deny.into_iter().map(String::from).collect(),
        },
    }
}

#[test]
fn claude_aliases_resolve_to_the_same_binding() {
    assert_eq!(resolve("claude"), resolve("claude-code"));
    assert_eq!(resolve("claude").program, "claude");
}

#[test]
fn unknown_adapter_falls_back_to_identifier_as_program() {
    let binding = resolve("my-custom-adapter");
    assert_eq!(binding.program, "my-custom-adapter");
    assert!(binding.base_args.is_empty());
}

#[test]
fn build_args_includes_model_and_permission_flags_and_trailing_prompt() {
    let binding = resolve("claude");
    let p = persona(Some("opus"), vec!["Bash(*)"], vec!["Bash(rm *)"]);
    let args = build_args(&binding, &p, "do the thing");

    assert!(args.contains(&"--model".to_string()));
    assert!(args.contains(&"opus".to_string()));
    assert!(args.contains(&"--allowed-tools".to_string()));
    assert!(args.contains(&"Bash(*)".to_string()));
    assert!(args.contains(&"--disallowed-tools".to_string()));
    assert!(args.contains(&"Bash(rm *)".to_string()));
    assert_eq!(args.last(), Some(&"do the thing".to_string()));
}

#[test]
fn build_args_omits_model_flag_when_absent() {
    let binding = resolve("codex");
    let p = persona(None, vec![], vec![]);
    let args = build_args(&binding, &p, "prompt");
    assert!(!args.contains(&"--model".to_string()));
}
