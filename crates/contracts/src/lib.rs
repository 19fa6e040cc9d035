// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wave-contracts: the per-step output validator. Three
//! validator kinds — `json_schema`, `test_suite`, `template` — each
//! side-effect-free, returning a [`Decision`] the executor uses to decide
//! retry-or-fail. Retry policy itself lives in `wave-engine`, not here.

mod error;
mod json_schema;
mod template;
mod test_suite;

pub use error::{ContractError, Decision, ValidationError};

use std::path::{Path, PathBuf};
use wave_core::ContractKind;

/// Everything [`validate`] needs beyond the `Contract` itself: where the
/// artifact under test lives on disk, the step's workspace (for
/// `test_suite`), and the approved schema directory (for `json_schema`'s
/// `schema_path` resolution).
#[derive(Debug, Clone)]
pub struct ValidationContext {
    pub workspace_path: PathBuf,
    pub schema_dir: PathBuf,
    /// Resolves a declared output artifact's logical name to its on-disk
    /// path. Populated by the caller (`wave-engine`) from the step's
    /// `output_artifacts` declarations.
    pub artifact_paths: std::collections::HashMap<String, PathBuf>,
}

impl ValidationContext {
    fn artifact_path(&self, name: &str) -> Option<&Path> {
        self.artifact_paths.get(name).map(PathBuf::as_path)
    }
}

/// Validate a step's output against `kind`, producing a [`Decision`].
/// `must_pass` governs whether a failure becomes [`Decision::Fail`] (the
/// step retries/fails) or [`Decision::Warn`] (the step still completes,
/// tagged).
pub async fn validate(
    kind: &ContractKind,
    must_pass: bool,
    ctx: &ValidationContext,
    attempt: u32,
    max_retries: u32,
) -> Decision {
    let (contract_type, violations_or_err): (&str, Result<Vec<String>, ContractError>) = match kind {
        ContractKind::JsonSchema {
            schema,
            schema_path,
            artifact,
        } => {
            let result = match ctx.artifact_path(artifact.as_str()) {
                Some(path) => json_schema::validate(
                    schema.as_ref(),
                    schema_path.as_deref(),
                    &ctx.schema_dir,
                    path,
                ),
                None => Ok(vec![format!("artifact {artifact} was not produced")]),
            };
            ("json_schema", result)
        }
        ContractKind::TestSuite { command, args } => {
            let outcome = test_suite::run(command, args, &ctx.workspace_path).await;
            let result = outcome.map(|o| {
                if o.passed {
                    Vec::new()
                } else {
                    vec![
                        format!("exit code: {}", o.exit_code.map_or("signal".into(), |c| c.to_string())),
                        format!("stdout: {}", o.stdout),
                        format!("stderr: {}", o.stderr),
                    ]
                }
            });
            ("test_suite", result)
        }
        ContractKind::Template {
            artifact,
            required_sections,
        } => {
            let result = match ctx.artifact_path(artifact.as_str()) {
                Some(path) => template::validate(path, required_sections),
                None => Ok(vec![format!("artifact {artifact} was not produced")]),
            };
            ("template", result)
        }
    };

    let violations = match violations_or_err {
        Ok(v) => v,
        Err(e) => {
            let retryable = !matches!(e, ContractError::SchemaPathEscape(_));
            return finalize(
                ValidationError {
                    contract_type: contract_type.to_string(),
                    message: e.to_string(),
                    details: Vec::new(),
                    retryable,
                    attempt,
                    max_retries,
                },
                must_pass,
            );
        }
    };

    if violations.is_empty() {
        return Decision::Pass;
    }

    finalize(
        ValidationError {
            contract_type: contract_type.to_string(),
            message: format!("{} validation violation(s)", violations.len()),
            details: violations,
            retryable: true,
            attempt,
            max_retries,
        },
        must_pass,
    )
}

fn finalize(err: ValidationError, must_pass: bool) -> Decision {
    if must_pass {
        Decision::Fail(err)
    } else {
        Decision::Warn(err)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
