// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wave cancel`: writes a cancellation marker for a run.
//!
//! Cancellation is cooperative and, per `wave-engine`'s design (see
//! DESIGN.md), polled from the in-process `Executor` that owns the run —
//! there is no cross-host or cross-process coordination. Invoked from a
//! second CLI process, this command can only persist the marker to the
//! run's history for audit/resume purposes; it takes effect immediately
//! when invoked
//! against an `Executor` in the same process (e.g. via `serve`'s embedding
//! or a future library caller), and is otherwise observed the next time
//! the run's state is inspected with `wave status`.

use clap::Args;

use anyhow::{bail, Result};
use wave_core::{Cancellation, RunId};
use wave_storage::StateStore;

use crate::config;

#[derive(Args, Debug)]
pub struct CancelArgs {
    /// Run id to cancel.
    pub run_id: String,

    /// Skip the graceful-signal stage and kill process groups immediately.
    #[arg(long)]
    pub force: bool,
}

pub fn handle(args: CancelArgs, repo_root: &std::path::Path) -> Result<()> {
    let state = StateStore::open(&config::state_dir(repo_root))?;
    let run_id = RunId::new(args.run_id.clone());
    let reader = state.reader();

    let Some(run) = reader.run(&run_id) else {
        bail!("run {run_id} not found");
    };

    if run.status.is_terminal() {
        println!("run {run_id} is already {}", run.status);
        return Ok(());
    }

    let writer = state.open_writer(run_id.clone())?;
    writer.put_cancellation(Cancellation {
        run_id: run_id.clone(),
        requested_at: chrono::Utc::now(),
        force: args.force,
    });
    writer.flush()?;

    println!("cancellation requested for run {run_id}");
    Ok(())
}
