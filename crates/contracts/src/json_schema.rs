// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `json_schema` validator kind.
//!
//! Schema resolution: inline `schema` text wins if present; otherwise
//! `schema_path` is resolved against the approved schema directory and
//! rejected if normalization walks it outside that root. `jsonschema`
//! itself rejects type coercion and honors each draft's `additionalProperties`
//! default, so this module only adds the path-escape check and strict
//! (comment/trailing-comma-free) JSON parsing of the artifact under test.

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::ContractError;

/// Validate `artifact_path`'s JSON content against a schema given either
/// inline or by path. Returns the list of violation messages (empty means
/// valid). Type coercion is rejected, each draft's `additionalProperties`
/// default is honored, and boundary constraints reject their
/// boundary-adjacent violations.
pub fn validate(
    schema: Option<&Value>,
    schema_path: Option<&Path>,
    schema_dir: &Path,
    artifact_path: &Path,
) -> Result<Vec<String>, ContractError> {
    let resolved_schema = resolve_schema(schema, schema_path, schema_dir)?;

    let instance_text = std::fs::read_to_string(artifact_path).map_err(|source| ContractError::Io {
        path: artifact_path.to_path_buf(),
        source,
    })?;

    // serde_json is strict JSON: comments and trailing commas are parse
    // errors, satisfying "malformed JSON is a hard reject" without any
    // extra lenience layered on top.
    let instance: Value = match serde_json::from_str(&instance_text) {
        Ok(v) => v,
        Err(e) => return Ok(vec![format!("artifact is not valid JSON: {e}")]),
    };

    let validator = jsonschema::validator_for(&resolved_schema)
        .map_err(|e| ContractError::SchemaCompile(e.to_string()))?;

    let errors: Vec<String> = validator
        .iter_errors(&instance)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    Ok(errors)
}

fn resolve_schema(
    schema: Option<&Value>,
    schema_path: Option<&Path>,
    schema_dir: &Path,
) -> Result<Value, ContractError> {
    if let Some(inline) = schema {
        return Ok(inline.clone());
    }
    let path = schema_path.ok_or_else(|| {
        ContractError::SchemaCompile("contract declares neither schema nor schema_path".into())
    })?;

    let normalized = normalize_under(schema_dir, path)?;
    let text = std::fs::read_to_string(&normalized).map_err(|source| ContractError::Io {
        path: normalized.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|e| ContractError::SchemaCompile(e.to_string()))
}

/// Join `path` onto `root` and reject the result if, after lexical
/// normalization, it escapes `root`.
fn normalize_under(root: &Path, path: &Path) -> Result<PathBuf, ContractError> {
    let joined = if path.is_absolute() { path.to_path_buf() } else { root.join(path) };
    let normalized = lexical_normalize(&joined);
    let root_normalized = lexical_normalize(root);
    if normalized.starts_with(&root_normalized) {
        Ok(normalized)
    } else {
        Err(ContractError::SchemaPathEscape(path.to_path_buf()))
    }
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
#[path = "json_schema_tests.rs"]
mod tests;
