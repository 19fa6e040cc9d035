// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wave status`: prints a run record and its latest progress.

use clap::Args;

use anyhow::{bail, Result};
use serde::Serialize;
use wave_core::RunId;
use wave_storage::StateStore;

use crate::config;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Run id to inspect.
    pub run_id: String,

    /// Print the run record and progress as a single JSON object.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusView {
    run: wave_core::Run,
    pipeline_progress: Option<wave_core::PipelineProgress>,
    cancellation: Option<wave_core::Cancellation>,
    event_count: usize,
}

pub fn handle(args: StatusArgs, repo_root: &std::path::Path) -> Result<()> {
    let state = StateStore::open(&config::state_dir(repo_root))?;
    let reader = state.reader();
    let run_id = RunId::new(args.run_id.clone());

    let Some(run) = reader.run(&run_id) else {
        bail!("run {run_id} not found");
    };
    let progress = reader.pipeline_progress(&run_id);
    let cancellation = reader.cancellation(&run_id);
    let event_count = reader.events_for_run(&run_id).len();

    if args.json {
        let view = StatusView {
            run,
            pipeline_progress: progress,
            cancellation,
            event_count,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("run:           {}", run.run_id);
    println!("pipeline:      {}", run.pipeline_name);
    println!("status:        {}", run.status);
    println!("started:       {}", run.started_at);
    if let Some(completed) = run.completed_at {
        println!("completed:     {completed}");
    }
    if let Some(step) = &run.current_step {
        println!("current step:  {step}");
    }
    println!("tokens used:   {}", run.total_tokens);
    println!("events:        {event_count}");
    if let Some(progress) = progress {
        println!(
            "progress:      {}/{} steps ({}%)",
            progress.completed_steps, progress.total_steps, progress.overall_progress
        );
    }
    if let Some(error) = &run.error_message {
        println!("error:         {error}");
    }
    if let Some(cancellation) = cancellation {
        println!(
            "cancellation:  requested {} (force={})",
            cancellation.requested_at, cancellation.force
        );
    }
    if !run.tags.is_empty() {
        println!("tags:          {}", run.tags.join(", "));
    }

    Ok(())
}
