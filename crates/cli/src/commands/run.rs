// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wave run`: execute a pipeline from scratch, or resume a
//! prior run from a given step.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use wave_core::{derive_run_id, Clock, RunId, RunStatus, SystemClock};
use wave_engine::{ArtifactStore, EventSinks, Executor, WorkspaceProvisioner};
use wave_storage::StateStore;

use crate::config::{self, DEFAULT_MANIFEST};
use crate::renderer::{StderrRenderer, Verbosity};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the pipeline definition (`kind: WavePipeline` YAML document).
    pub pipeline: PathBuf,

    /// Literal run input (required when the pipeline's `input.source` is
    /// `cli`).
    #[arg(long)]
    pub input: Option<String>,

    /// Path to the manifest (personas, skills, runtime settings).
    #[arg(long, default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Resume from this step id rather than running from scratch. Requires
    /// `--resume <run_id>` to name the source run whose prior artifacts
    /// are carried forward.
    #[arg(long, value_name = "STEP_ID")]
    pub from_step: Option<String>,

    /// Source run id to resume from (used with `--from-step`).
    #[arg(long, value_name = "RUN_ID")]
    pub resume: Option<String>,

    /// Skip contract validation for the resumed step's first attempt.
    #[arg(long)]
    pub force: bool,

    /// Add workspace paths, injected artifact lists, and tool activity to
    /// the stderr progress stream.
    #[arg(long)]
    pub verbose: bool,

    /// Superset of `--verbose`: also prints recovery hints as they are
    /// attached to failure events.
    #[arg(long)]
    pub debug: bool,
}

pub async fn handle(args: RunArgs, repo_root: &std::path::Path) -> Result<()> {
    let loaded = config::load_manifest(repo_root, &args.manifest)?;
    let pipeline = config::load_pipeline(&args.pipeline, &loaded.manifest)?;

    let input = match (pipeline.input_source, &args.input) {
        (wave_core::InputSource::Cli, Some(s)) => s.clone(),
        (wave_core::InputSource::Cli, None) => {
            bail!("pipeline '{}' requires --input", pipeline.name)
        }
        (wave_core::InputSource::Prompt, Some(s)) => s.clone(),
        (wave_core::InputSource::Prompt, None) => String::new(),
    };

    let state_dir = config::state_dir(repo_root);
    std::fs::create_dir_all(&state_dir).context("creating .wave state directory")?;
    let state = StateStore::open(&state_dir)?;

    let workspace_root = repo_root.join(&loaded.manifest.runtime.workspace_root);
    let artifacts_root = state_dir.join("artifacts");
    let schema_dir = state_dir.join("schemas");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let provisioner = WorkspaceProvisioner::new(repo_root.to_path_buf(), workspace_root, "HEAD");
    let artifacts = ArtifactStore::new(artifacts_root);
    let adapter_runner = Arc::new(wave_adapters::ProcessAdapterRunner);
    let concurrency = config::effective_concurrency(&loaded.manifest, &pipeline);

    let executor = Executor::new(
        repo_root.to_path_buf(),
        provisioner,
        artifacts,
        adapter_runner,
        state.clone(),
        clock,
        schema_dir,
        concurrency,
        loaded.manifest.runtime.default_step_timeout,
    );

    let verbosity = if args.debug {
        Verbosity::Debug
    } else if args.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Quiet
    };
    let sinks = EventSinks {
        stream: Some(Box::new(std::io::stdout())),
        renderer: Some(Arc::new(StderrRenderer::new(verbosity))),
    };

    let run_id = derive_run_id(&pipeline.name, &input, chrono::Utc::now(), rand_nonce());

    let outcome = match (&args.from_step, &args.resume) {
        (Some(step), Some(source_run)) => {
            executor
                .resume_from(
                    &pipeline,
                    &loaded.personas,
                    &loaded.skills,
                    &RunId::new(source_run.clone()),
                    run_id,
                    input,
                    &wave_core::StepId::new(step.clone()),
                    args.force,
                    sinks,
                )
                .await?
        }
        (Some(_), None) => bail!("--from-step requires --resume <run_id>"),
        (None, _) => {
            executor
                .run(&pipeline, &loaded.personas, &loaded.skills, run_id, input, sinks)
                .await?
        }
    };

    // The WAL group-commits on a timer; without this, a short-lived `wave
    // run` process could exit before its last few events hit disk, and a
    // concurrent `wave status`/`wave serve` reading the same directory
    // would see a stale run. `checkpoint` is `StateStore`'s documented
    // graceful-shutdown flush.
    state.checkpoint(chrono::Utc::now())?;

    match outcome.status {
        RunStatus::Completed => {
            println!("run {} completed", outcome.run_id);
            Ok(())
        }
        RunStatus::Cancelled => {
            bail!("run {} cancelled", outcome.run_id)
        }
        _ => {
            let step = state
                .reader()
                .run(&outcome.run_id)
                .and_then(|r| r.current_step)
                .map(|s| s.to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            let message = outcome.error.unwrap_or_else(|| "run failed".to_string());
            bail!("run {} failed at step {step}: {message}", outcome.run_id)
        }
    }
}

/// A nonce distinguishing two runs of the same pipeline with the same
/// input started within the same nanosecond.
fn rand_nonce() -> u64 {
    uuid::Uuid::new_v4().as_u128() as u64
}
