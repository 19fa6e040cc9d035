// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! wave - the Wave pipeline executor CLI

mod commands;
mod config;
mod renderer;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use wave_core::LogLevel;

#[derive(Parser)]
#[command(
    name = "wave",
    version,
    about = "Run and inspect specification-driven AI pipelines"
)]
struct Cli {
    /// Run from this directory instead of the current one.
    #[arg(short = 'C', long = "directory", global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a pipeline, or resume one from a given step.
    Run(commands::run::RunArgs),
    /// Request cancellation of a running pipeline.
    Cancel(commands::cancel::CancelArgs),
    /// Print a run's record and latest progress.
    Status(commands::status::StatusArgs),
    /// Serve a read-only HTTP query surface over runs and events.
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", format_error(&e));
        std::process::exit(1);
    }
}

/// Format an anyhow error, deduplicating the chain when the top-level
/// message already restates every cause (common with `thiserror`'s
/// `#[error("... {0}")]` plus `#[from]`).
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = match &cli.command {
        Commands::Run(args) if args.debug => LogLevel::Debug,
        Commands::Run(args) if args.verbose => LogLevel::Info,
        _ => LogLevel::Warn,
    };
    wave_core::logging::init(level);

    let repo_root = match &cli.directory {
        Some(dir) => std::fs::canonicalize(dir)
            .map_err(|e| anyhow::anyhow!("cannot change to directory '{}': {}", dir.display(), e))?,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Run(args) => commands::run::handle(args, &repo_root).await,
        Commands::Cancel(args) => commands::cancel::handle(args, &repo_root),
        Commands::Status(args) => commands::status::handle(args, &repo_root),
        Commands::Serve(args) => commands::serve::handle(args, &repo_root).await,
    }
}
