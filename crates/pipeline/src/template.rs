// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt placeholder substitution. A step's prompt template may reference
//! the run's literal input (`{{input}}`) and injected artifact local
//! aliases (`{{artifacts.<alias>}}`); this module resolves both plus the
//! structured reference block the artifact injector appends so the adapter
//! can locate injected files.
//!
//! Hand-rolled rather than `regex`-backed: the accepted placeholder grammar
//! is narrow (`{{` ... `}}` with a dotted path of identifier segments) and
//! a small manual scanner avoids pulling in a dependency for it.

use std::collections::BTreeMap;
use std::path::Path;

/// A resolved placeholder value, keyed by its dotted path
/// (`"input"`, `"artifacts.spec"`, ...).
pub type Values<'a> = BTreeMap<&'a str, String>;

/// Substitute every `{{path}}` occurrence in `template` with its resolved
/// value. Unknown placeholders are left verbatim so a malformed reference
/// is visible in the composed prompt rather than silently dropped.
pub fn render(template: &str, values: &Values<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let (before, after_open) = rest.split_at(start);
        out.push_str(before);
        let after_open = &after_open[2..];
        match after_open.find("}}") {
            Some(end) => {
                let path = after_open[..end].trim();
                match values.get(path) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(&after_open[..end]);
                        out.push_str("}}");
                    }
                }
                rest = &after_open[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after_open;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Scan a template for `{{path}}` placeholders, returning each distinct
/// dotted path referenced (in first-seen order).
pub fn referenced_paths(template: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let path = after[..end].trim().to_string();
        if !paths.contains(&path) {
            paths.push(path);
        }
        rest = &after[end + 2..];
    }
    paths
}

/// Build the `{{artifacts.<alias>}}` value map plus a structured reference
/// block (a fenced list of alias → path) appended to the composed prompt so
/// the adapter can locate injected files without re-deriving paths.
pub fn artifact_reference_block(aliases: &[(String, &Path)]) -> String {
    if aliases.is_empty() {
        return String::new();
    }
    let mut block = String::from("\n\n## Injected artifacts\n");
    for (alias, path) in aliases {
        block.push_str(&format!("- {alias}: {}\n", path.display()));
    }
    block
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
