// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn substitutes_known_placeholders() {
    let mut values = Values::new();
    values.insert("input", "do the thing".to_string());
    values.insert("artifacts.spec", "spec.json".to_string());
    let out = render("Input: {{input}}\nSpec: {{ artifacts.spec }}", &values);
    assert_eq!(out, "Input: do the thing\nSpec: spec.json");
}

#[test]
fn leaves_unknown_placeholders_verbatim() {
    let values = Values::new();
    let out = render("missing: {{nope}}", &values);
    assert_eq!(out, "missing: {{nope}}");
}

#[test]
fn unclosed_placeholder_is_left_as_is() {
    let values = Values::new();
    let out = render("broken: {{input", &values);
    assert_eq!(out, "broken: {{input");
}

#[test]
fn preserves_non_ascii_text_around_placeholders() {
    let mut values = Values::new();
    values.insert("input", "42".to_string());
    let out = render("café {{input}} 日本語", &values);
    assert_eq!(out, "café 42 日本語");
}

#[test]
fn referenced_paths_deduplicates_and_preserves_order() {
    let paths = referenced_paths("{{input}} then {{artifacts.a}} then {{input}}");
    assert_eq!(paths, vec!["input".to_string(), "artifacts.a".to_string()]);
}

#[test]
fn reference_block_lists_each_alias() {
    let block = artifact_reference_block(&[
        ("spec".to_string(), Path::new("spec.json")),
        ("notes".to_string(), Path::new("sub/notes.md")),
    ]);
    assert!(block.contains("- spec: spec.json"));
    assert!(block.contains("- notes: sub/notes.md"));
}

#[test]
fn empty_alias_list_yields_empty_block() {
    assert_eq!(artifact_reference_block(&[]), "");
}
