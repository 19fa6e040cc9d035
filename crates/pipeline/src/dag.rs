// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DAG construction: implicit edges from artifact injection are unioned
//! with explicit `dependencies[]` into a single edge set computed once at
//! load time and never re-derived during scheduling, so artifact
//! readiness can't disagree with topological order.

use crate::LoadError;
use std::collections::{HashMap, HashSet};
use wave_core::{Pipeline, StepId};

/// The resolved edge set and a deterministic topological order for a
/// pipeline, computed once at load time.
#[derive(Debug, Clone)]
pub struct Dag {
    /// `edges[step] = [predecessors...]`, explicit deps unioned with
    /// implicit edges derived from `memory.inject_artifacts`.
    pub predecessors: HashMap<StepId, Vec<StepId>>,
    /// Steps in declaration order, a valid topological order.
    pub order: Vec<StepId>,
}

impl Dag {
    pub fn predecessors_of<'a>(&'a self, step: &StepId) -> &'a [StepId] {
        self.predecessors
            .get(step)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Build the DAG for a pipeline, unioning explicit and implicit edges and
/// rejecting cycles. Cycle errors name one step on the cycle.
pub fn build(pipeline: &Pipeline) -> Result<Dag, LoadError> {
    let mut predecessors: HashMap<StepId, Vec<StepId>> = HashMap::new();

    for step in &pipeline.steps {
        let mut preds: Vec<StepId> = step.dependencies.clone();
        for inject in &step.memory.inject_artifacts {
            if !preds.contains(&inject.step_id) {
                preds.push(inject.step_id.clone());
            }
        }
        predecessors.insert(step.id.clone(), preds);
    }

    let order = topological_order(pipeline, &predecessors)?;

    Ok(Dag {
        predecessors,
        order,
    })
}

/// Kahn's algorithm over declaration order, so ties are broken
/// deterministically — the order steps appear in the document is the
/// order they run in when concurrency is 1.
fn topological_order(
    pipeline: &Pipeline,
    predecessors: &HashMap<StepId, Vec<StepId>>,
) -> Result<Vec<StepId>, LoadError> {
    let declared: Vec<StepId> = pipeline.steps.iter().map(|s| s.id.clone()).collect();
    let mut remaining: HashSet<StepId> = declared.iter().cloned().collect();
    let mut done: HashSet<StepId> = HashSet::new();
    let mut order = Vec::with_capacity(declared.len());

    while !remaining.is_empty() {
        let ready: Vec<StepId> = declared
            .iter()
            .filter(|id| remaining.contains(*id))
            .filter(|id| {
                predecessors
                    .get(*id)
                    .map(|preds| preds.iter().all(|p| done.contains(p)))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();

        if ready.is_empty() {
            // Every remaining step is blocked on another remaining step:
            // a cycle runs through this set. Name the first in declaration
            // order for a stable error message.
            let cycle_member = declared
                .iter()
                .find(|id| remaining.contains(*id))
                .cloned()
                .unwrap_or_else(|| StepId::new("<unknown>"));
            return Err(LoadError::CycleDetected(cycle_member));
        }

        for id in &ready {
            remaining.remove(id);
            done.insert(id.clone());
            order.push(id.clone());
        }
    }

    Ok(order)
}

#[cfg(test)]
#[path = "dag_tests.rs"]
mod tests;
