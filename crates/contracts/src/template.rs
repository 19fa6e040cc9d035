// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `template` validator kind: lightweight structural checks
//! on markdown/text artifacts — each `required_sections` entry must appear
//! as a markdown heading (a line of one or more `#` followed by the
//! section text, case-insensitive).

use std::path::Path;

use crate::error::ContractError;

/// Returns the subset of `required_sections` that could not be found as a
/// heading in the artifact. Empty means every required section is present.
pub fn validate(artifact_path: &Path, required_sections: &[String]) -> Result<Vec<String>, ContractError> {
    let text = std::fs::read_to_string(artifact_path).map_err(|source| ContractError::Io {
        path: artifact_path.to_path_buf(),
        source,
    })?;

    let headings: Vec<String> = text
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            let stripped = trimmed.trim_start_matches('#');
            if stripped.len() == trimmed.len() {
                return None; // no leading '#'
            }
            Some(stripped.trim().to_lowercase())
        })
        .collect();

    let missing: Vec<String> = required_sections
        .iter()
        .filter(|section| !headings.iter().any(|h| h == &section.to_lowercase()))
        .map(|s| format!("missing required section: {s}"))
        .collect();

    Ok(missing)
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
