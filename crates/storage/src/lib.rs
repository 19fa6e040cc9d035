// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable state for Wave runs: a JSONL WAL, a folded [`MaterializedState`],
//! and periodic snapshotting for crash recovery.
//!
//! [`StateStore`] is the single entry point. It owns one WAL file and one
//! in-memory [`MaterializedState`] shared by every run. Mutations for a
//! given run must go through a [`RunWriter`], obtained via
//! [`StateStore::open_writer`]; only one writer per run id may be open in
//! this process at a time. Reads go through [`StateReader`], which is cheap
//! to clone and never blocks on a writer.

mod error;
mod snapshot;
mod state;
mod wal;

pub use error::StateError;
pub use snapshot::{Snapshot, SnapshotError};
pub use state::MaterializedState;
pub use wal::{Wal, WalEntry, WalError};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wave_core::{Artifact, Cancellation, Event, PipelineProgress, Run, RunId, StepProgress};

/// Number of flushed WAL entries between automatic snapshots.
const SNAPSHOT_INTERVAL: u64 = 500;

struct Shared {
    wal: Wal,
    state: MaterializedState,
    snapshot_path: PathBuf,
    last_snapshot_seq: u64,
    writers: HashSet<RunId>,
}

/// Durable, shared store for run state. Clone is cheap (wraps an `Arc`).
#[derive(Clone)]
pub struct StateStore {
    shared: Arc<Mutex<Shared>>,
}

impl StateStore {
    /// Open (or create) a store rooted at `dir`, containing `wave.wal` and
    /// `wave.snapshot`. Replays the snapshot (if present and valid) plus any
    /// WAL entries written after it.
    pub fn open(dir: &Path) -> Result<Self, StateError> {
        let snapshot_path = dir.join("wave.snapshot");
        let wal_path = dir.join("wave.wal");

        let snapshot = Snapshot::load(&snapshot_path)?;
        let (mut state, processed_seq) = match snapshot {
            Some(snap) => (snap.state, snap.seq),
            None => (MaterializedState::default(), 0),
        };

        let wal = Wal::open(&wal_path, processed_seq)?;
        for entry in wal.entries_after(processed_seq)? {
            state.apply_event(entry.event);
        }

        Ok(Self {
            shared: Arc::new(Mutex::new(Shared {
                wal,
                state,
                snapshot_path,
                last_snapshot_seq: processed_seq,
                writers: HashSet::new(),
            })),
        })
    }

    /// Acquire exclusive write access to `run_id`. Fails if another
    /// in-process handle already holds it: a single writer connection
    /// serializes all mutations for a given run.
    pub fn open_writer(&self, run_id: RunId) -> Result<RunWriter, StateError> {
        let mut shared = self.shared.lock();
        if !shared.writers.insert(run_id.clone()) {
            return Err(StateError::WriterConflict(run_id));
        }
        Ok(RunWriter {
            store: self.clone(),
            run_id,
        })
    }

    /// A cheap, read-only handle. Readers never contend with writers beyond
    /// the short critical section of a single table lookup.
    pub fn reader(&self) -> StateReader {
        StateReader {
            shared: self.shared.clone(),
        }
    }

    /// Take a snapshot now and truncate the WAL before the checkpointed
    /// sequence, regardless of [`SNAPSHOT_INTERVAL`]. Intended for graceful
    /// shutdown.
    pub fn checkpoint(&self, now: DateTime<Utc>) -> Result<(), StateError> {
        let mut shared = self.shared.lock();
        Self::checkpoint_locked(&mut shared, now)
    }

    fn checkpoint_locked(shared: &mut Shared, now: DateTime<Utc>) -> Result<(), StateError> {
        shared.wal.flush()?;
        let seq = shared.wal.write_seq();
        let snapshot = Snapshot::new(seq, shared.state.clone_for_snapshot(), now);
        snapshot.save(&shared.snapshot_path)?;
        shared.wal.truncate_before(seq)?;
        shared.last_snapshot_seq = seq;
        Ok(())
    }
}

/// Exclusive write handle for one run's mutations.
///
/// Dropping the handle releases the writer slot, allowing another
/// `open_writer` call for the same run id to succeed.
pub struct RunWriter {
    store: StateStore,
    run_id: RunId,
}

impl RunWriter {
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Create the run row. Must happen before any event is appended for it.
    pub fn start_run(&self, run: Run) -> Result<(), StateError> {
        let mut shared = self.store.shared.lock();
        shared.state.put_run(run);
        Ok(())
    }

    /// Append an event, durably. Rejects appends to an already-terminal run
    /// except the event that
    /// itself records cancellation cleanup.
    pub fn append_event(&self, event: Event) -> Result<u64, StateError> {
        let mut shared = self.store.shared.lock();

        if let Some(run) = shared.state.run(&self.run_id) {
            if run.status.is_terminal() {
                return Err(StateError::RunTerminal(self.run_id.clone()));
            }
        } else {
            return Err(StateError::RunNotFound(self.run_id.clone()));
        }

        let seq = shared.wal.append(&event)?;
        if shared.wal.needs_flush() {
            shared.wal.flush()?;
        }
        shared.state.apply_event(event);
        shared.wal.mark_processed(seq);

        if seq.saturating_sub(shared.last_snapshot_seq) >= SNAPSHOT_INTERVAL {
            let now = shared
                .state
                .run(&self.run_id)
                .and_then(|r| r.completed_at)
                .unwrap_or_else(Utc::now);
            StateStore::checkpoint_locked(&mut shared, now)?;
        }

        Ok(seq)
    }

    pub fn put_artifact(&self, artifact: Artifact) -> Result<(), StateError> {
        let mut shared = self.store.shared.lock();
        shared.state.put_artifact(artifact)
    }

    pub fn put_step_progress(&self, progress: StepProgress) {
        self.store.shared.lock().state.put_step_progress(progress);
    }

    pub fn put_pipeline_progress(&self, progress: PipelineProgress) {
        self.store
            .shared
            .lock()
            .state
            .put_pipeline_progress(progress);
    }

    pub fn put_cancellation(&self, cancellation: Cancellation) {
        self.store
            .shared
            .lock()
            .state
            .put_cancellation(cancellation);
    }

    /// Force-flush the WAL without waiting for the group-commit interval.
    pub fn flush(&self) -> Result<(), StateError> {
        Ok(self.store.shared.lock().wal.flush()?)
    }
}

impl Drop for RunWriter {
    fn drop(&mut self) {
        self.store.shared.lock().writers.remove(&self.run_id);
    }
}

/// Read-only, cloneable handle over the shared materialized state.
#[derive(Clone)]
pub struct StateReader {
    shared: Arc<Mutex<Shared>>,
}

impl StateReader {
    pub fn run(&self, run_id: &RunId) -> Option<Run> {
        self.shared.lock().state.run(run_id).cloned()
    }

    pub fn all_runs(&self) -> Vec<Run> {
        self.shared.lock().state.all_runs().cloned().collect()
    }

    pub fn events_for_run(&self, run_id: &RunId) -> Vec<Event> {
        self.shared.lock().state.events_for_run(run_id).to_vec()
    }

    pub fn artifacts_for_run(&self, run_id: &RunId) -> Vec<Artifact> {
        self.shared
            .lock()
            .state
            .artifacts_for_run(run_id)
            .to_vec()
    }

    pub fn step_progress(
        &self,
        run_id: &RunId,
        step_id: &wave_core::StepId,
    ) -> Option<StepProgress> {
        self.shared.lock().state.step_progress(run_id, step_id).cloned()
    }

    pub fn pipeline_progress(&self, run_id: &RunId) -> Option<PipelineProgress> {
        self.shared
            .lock()
            .state
            .pipeline_progress(run_id)
            .cloned()
    }

    pub fn cancellation(&self, run_id: &RunId) -> Option<Cancellation> {
        self.shared.lock().state.cancellation(run_id).cloned()
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
