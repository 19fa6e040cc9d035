// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The DAG driver: schedules a pipeline's steps over a
//! bounded worker pool, drives each through its per-step state machine
//! (workspace prepare → inject → run adapter → validate → register
//! artifacts → release), and folds the result back into the shared
//! readiness set so downstream steps unblock as soon as their producers
//! finish — not in any fixed batch order.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use wave_adapters::{AdapterConfig, AdapterRunner};
use wave_contracts::{Decision, ValidationContext};
use wave_core::{
    Artifact, ArtifactName, ArtifactValidation, Cancellation, Clock, Event, EventState,
    FailureClassification, Persona, PersonaName, Pipeline, Run, RunId, RunStatus, StepDef, StepId,
    StepProgress, ToolActivity,
};
use wave_pipeline::{build_dag, Dag, Skill};
use wave_storage::StateStore;

use crate::adapter_registry;
use crate::artifacts::ArtifactStore;
use crate::error::EngineError;
use crate::events::{EventPipeline, ProgressRenderer};
use crate::preflight;
use crate::recovery;
use crate::workspace::{write_permission_guidance, WorkspaceHandle, WorkspaceProvisioner};

/// Default step timeout when neither the step nor the manifest's
/// `runtime.default_step_timeout` names one.
const FALLBACK_STEP_TIMEOUT: Duration = Duration::from_secs(600);

/// Optional extra event sinks wired in before a run starts. The state
/// store is always the primary sink; these are additive.
#[derive(Default)]
pub struct EventSinks {
    pub stream: Option<Box<dyn std::io::Write + Send>>,
    pub renderer: Option<Arc<dyn ProgressRenderer>>,
}

/// The terminal outcome of one call to [`Executor::run`] or
/// [`Executor::resume_from`].
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: RunId,
    pub status: RunStatus,
    pub error: Option<String>,
}

/// Pieces a spawned step task needs that do not change across the run.
/// Split out of [`Executor`] so dispatching a step doesn't require the
/// executor itself to be wrapped in an `Arc`.
struct StepRuntime {
    repo_root: PathBuf,
    workspaces: Arc<WorkspaceProvisioner>,
    artifacts: ArtifactStore,
    adapter_runner: Arc<dyn AdapterRunner>,
    clock: Arc<dyn Clock>,
    schema_dir: PathBuf,
    default_step_timeout: Duration,
    cancellations: Arc<Mutex<HashMap<RunId, Cancellation>>>,
}

/// Drives pipeline runs to completion: the DAG scheduler, worker pool,
/// and per-step retry/contract/artifact machinery.
pub struct Executor {
    runtime: Arc<StepRuntime>,
    state: StateStore,
    concurrency: usize,
}

impl Executor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repo_root: PathBuf,
        workspaces: WorkspaceProvisioner,
        artifacts: ArtifactStore,
        adapter_runner: Arc<dyn AdapterRunner>,
        state: StateStore,
        clock: Arc<dyn Clock>,
        schema_dir: PathBuf,
        concurrency: usize,
        default_step_timeout: Option<Duration>,
    ) -> Self {
        Self {
            runtime: Arc::new(StepRuntime {
                repo_root,
                workspaces: Arc::new(workspaces),
                artifacts,
                adapter_runner,
                clock,
                schema_dir,
                default_step_timeout: default_step_timeout.unwrap_or(FALLBACK_STEP_TIMEOUT),
                cancellations: Arc::new(Mutex::new(HashMap::new())),
            }),
            state,
            concurrency: concurrency.max(1),
        }
    }

    /// Mark a run cancelled in this process. Purely in-memory: there is no
    /// cross-process cancellation channel in this embedded, single-writer
    /// storage model (see DESIGN.md). A step's adapter invocation polls
    /// this on every scheduling tick and during its wait loop.
    pub fn request_cancellation(&self, run_id: &RunId, force: bool) {
        let requested_at = self.runtime.clock.now();
        self.runtime.cancellations.lock().insert(
            run_id.clone(),
            Cancellation {
                run_id: run_id.clone(),
                requested_at,
                force,
            },
        );
    }

    fn cancellation_for(&self, run_id: &RunId) -> Option<Cancellation> {
        self.runtime.cancellations.lock().get(run_id).cloned()
    }

    /// Run a pipeline from scratch.
    pub async fn run(
        &self,
        pipeline: &Pipeline,
        personas: &HashMap<PersonaName, Persona>,
        skills: &HashMap<String, Skill>,
        run_id: RunId,
        input: String,
        sinks: EventSinks,
    ) -> Result<RunOutcome, EngineError> {
        self.execute(
            pipeline,
            personas,
            skills,
            run_id,
            input,
            Vec::new(),
            HashSet::new(),
            HashMap::new(),
            None,
            sinks,
        )
        .await
    }

    /// Resume a pipeline from a given step, seeding already-completed
    /// predecessor state from a prior run's archive.
    ///
    /// A terminal run's status is immutable — once failed, a run never
    /// transitions out of it — so resuming produces a *new* run id
    /// rather than reopening `source_run_id`. `force` skips contract
    /// validation for every attempt of `from_step` (not just its first).
    #[allow(clippy::too_many_arguments)]
    pub async fn resume_from(
        &self,
        pipeline: &Pipeline,
        personas: &HashMap<PersonaName, Persona>,
        skills: &HashMap<String, Skill>,
        source_run_id: &RunId,
        new_run_id: RunId,
        input: String,
        from_step: &StepId,
        force: bool,
        sinks: EventSinks,
    ) -> Result<RunOutcome, EngineError> {
        let dag = build_dag(pipeline).map_err(map_load_error)?;
        let completed_seed = transitive_predecessors(&dag, from_step);

        let reader = self.state.reader();
        let mut artifact_seed = HashMap::new();
        for artifact in reader.artifacts_for_run(source_run_id) {
            if completed_seed.contains(&artifact.step_id) {
                artifact_seed.insert((artifact.step_id.clone(), artifact.name.clone()), artifact.path.clone());
            }
        }

        let tags = vec![
            format!("resumed-from:{source_run_id}"),
            format!("resume-step:{from_step}"),
        ];
        let force_step = if force { Some(from_step.clone()) } else { None };

        self.execute(
            pipeline,
            personas,
            skills,
            new_run_id,
            input,
            tags,
            completed_seed,
            artifact_seed,
            force_step,
            sinks,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute(
        &self,
        pipeline: &Pipeline,
        personas: &HashMap<PersonaName, Persona>,
        skills: &HashMap<String, Skill>,
        run_id: RunId,
        input: String,
        tags: Vec<String>,
        mut completed: HashSet<StepId>,
        artifact_seed: HashMap<(StepId, ArtifactName), PathBuf>,
        force_skip_validation_for: Option<StepId>,
        sinks: EventSinks,
    ) -> Result<RunOutcome, EngineError> {
        let dag = build_dag(pipeline).map_err(map_load_error)?;
        let total_steps = pipeline.steps.len();
        let now = self.runtime.clock.now();

        let writer = self.state.open_writer(run_id.clone())?;
        let mut run = Run::new(run_id.clone(), pipeline.name.clone(), input.clone(), now);
        run.tags = tags;
        writer.start_run(run)?;
        writer.put_pipeline_progress(wave_core::PipelineProgress::new(
            run_id.clone(),
            total_steps as u32,
            now,
        ));

        let mut events = EventPipeline::new(writer);
        if let Some(stream) = sinks.stream {
            events = events.with_stream(stream);
        }
        if let Some(renderer) = sinks.renderer {
            events = events.with_renderer(renderer);
        }
        let events = Arc::new(events);

        events.emit(self.run_event(&run_id, EventState::Started, None))?;

        if let Err(e) = self.run_preflight(pipeline, skills, &run_id, &events).await {
            return self.finish_failed(&run_id, &events, e).await;
        }

        let shared_lookup = Arc::new(Mutex::new(artifact_seed));
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut dispatched: HashSet<StepId> = completed.clone();
        let mut join_set: JoinSet<(StepId, Result<StepSuccess, EngineError>)> = JoinSet::new();
        let mut run_failed = false;
        let mut run_error: Option<EngineError> = None;
        let mut completed_count = completed.len() as u32;

        loop {
            if !run_failed {
                let ready: Vec<StepId> = dag
                    .order
                    .iter()
                    .filter(|id| !dispatched.contains(*id))
                    .filter(|id| dag.predecessors_of(id).iter().all(|p| completed.contains(p)))
                    .cloned()
                    .collect();

                for step_id in ready {
                    let permit = match Arc::clone(&semaphore).try_acquire_owned() {
                        Ok(p) => p,
                        Err(_) => break,
                    };
                    dispatched.insert(step_id.clone());

                    let Some(step) = pipeline.step(&step_id).cloned() else {
                        run_failed = true;
                        run_error = Some(EngineError::StepFailed(step_id, "step vanished from pipeline".into()));
                        break;
                    };
                    let Some(persona) = personas.get(&step.persona).cloned() else {
                        run_failed = true;
                        run_error = Some(EngineError::UnknownPersona(step.persona.to_string()));
                        break;
                    };

                    let force_skip = force_skip_validation_for.as_ref() == Some(&step_id);
                    let snapshot = shared_lookup.lock().clone();
                    let runtime = Arc::clone(&self.runtime);
                    let events_clone = Arc::clone(&events);
                    let run_id_clone = run_id.clone();
                    let input_clone = input.clone();

                    join_set.spawn(async move {
                        let _permit = permit;
                        let id = step.id.clone();
                        let result = dispatch_step(
                            runtime,
                            events_clone,
                            run_id_clone,
                            step,
                            persona,
                            input_clone,
                            snapshot,
                            force_skip,
                        )
                        .await;
                        (id, result)
                    });
                }
            }

            if join_set.is_empty() {
                break;
            }

            match join_set.join_next().await {
                Some(Ok((step_id, Ok(success)))) => {
                    let _ = step_id;
                    completed.insert(success.step_id.clone());
                    completed_count += 1;
                    {
                        let mut lookup = shared_lookup.lock();
                        for (producer, name, path) in success.produced {
                            lookup.insert((producer, name), path);
                        }
                    }
                    let mut progress = wave_core::PipelineProgress::new(run_id.clone(), total_steps as u32, self.runtime.clock.now());
                    progress.completed_steps = completed_count;
                    progress.current_step_index = completed_count;
                    progress.recompute(self.runtime.clock.now());
                    events.put_pipeline_progress(progress);
                }
                Some(Ok((_, Err(e)))) => {
                    run_failed = true;
                    self.request_cancellation(&run_id, false);
                    if run_error.is_none() {
                        run_error = Some(e);
                    }
                }
                Some(Err(join_err)) => {
                    run_failed = true;
                    self.request_cancellation(&run_id, false);
                    if run_error.is_none() {
                        run_error = Some(EngineError::WorkspaceUnavailable(format!("step task panicked: {join_err}")));
                    }
                }
                None => break,
            }
        }

        self.runtime.workspaces.cleanup_run(&run_id).await;

        if let Some(cancellation) = self.cancellation_for(&run_id) {
            if run_failed && matches!(&run_error, Some(EngineError::Cancelled)) {
                events.put_cancellation(cancellation);
                events.emit(self.run_event(&run_id, EventState::Cancelled, Some("run cancelled".to_string())))?;
                return Ok(RunOutcome {
                    run_id,
                    status: RunStatus::Cancelled,
                    error: None,
                });
            }
        }

        if run_failed {
            let message = run_error.as_ref().map(ToString::to_string);
            let classification = run_error
                .as_ref()
                .map(|e| e.to_wave_error().classification())
                .unwrap_or(FailureClassification::GeneralError);
            let mut ev = self.run_event(&run_id, EventState::Failed, message.clone());
            ev.failure_reason = Some(classification);
            events.emit(ev)?;
            return Ok(RunOutcome {
                run_id,
                status: RunStatus::Failed,
                error: message,
            });
        }

        if completed.len() < total_steps {
            let message = "scheduling deadlock: not every step became ready".to_string();
            events.emit(self.run_event(&run_id, EventState::Failed, Some(message.clone())))?;
            return Ok(RunOutcome {
                run_id,
                status: RunStatus::Failed,
                error: Some(message),
            });
        }

        events.emit(self.run_event(&run_id, EventState::Completed, None))?;
        Ok(RunOutcome {
            run_id,
            status: RunStatus::Completed,
            error: None,
        })
    }

    async fn run_preflight(
        &self,
        pipeline: &Pipeline,
        skills: &HashMap<String, Skill>,
        run_id: &RunId,
        events: &EventPipeline,
    ) -> Result<(), EngineError> {
        for tool in &pipeline.requires.tools {
            preflight::check_tool(tool)?;
            events.emit(self.run_event(
                run_id,
                EventState::Preflight,
                Some(format!("tool '{tool}' found")),
            ))?;
        }
        for skill_name in &pipeline.requires.skills {
            let skill = skills
                .get(skill_name)
                .ok_or_else(|| EngineError::UnknownSkill(skill_name.clone()))?;
            let check = preflight::check_skill(skill_name, skill, &self.runtime.repo_root).await?;
            events.emit(self.run_event(
                run_id,
                EventState::Preflight,
                Some(format!("skill '{skill_name}': {:?}", check.outcome)),
            ))?;
        }
        Ok(())
    }

    async fn finish_failed(
        &self,
        run_id: &RunId,
        events: &EventPipeline,
        error: EngineError,
    ) -> Result<RunOutcome, EngineError> {
        let classification = error.to_wave_error().classification();
        let hint = recovery::build(run_id, &StepId::new("preflight"), classification);
        let mut ev = self.run_event(run_id, EventState::Failed, Some(error.to_string()));
        ev.failure_reason = Some(classification);
        ev.recovery_hints = Some(hint);
        events.emit(ev)?;
        Ok(RunOutcome {
            run_id: run_id.clone(),
            status: RunStatus::Failed,
            error: Some(error.to_string()),
        })
    }

    fn run_event(&self, run_id: &RunId, state: EventState, message: Option<String>) -> Event {
        Event {
            id: 0,
            run_id: run_id.clone(),
            ts: self.runtime.clock.now(),
            step_id: None,
            state,
            persona: None,
            message,
            duration_ms: None,
            tokens_used: None,
            artifacts: Vec::new(),
            failure_reason: None,
            recovery_hints: None,
            tool_activity: None,
            attempt: None,
        }
    }
}

struct StepSuccess {
    step_id: StepId,
    produced: Vec<(StepId, ArtifactName, PathBuf)>,
}

fn map_load_error(e: wave_pipeline::LoadError) -> EngineError {
    // The pipeline was already validated when it was loaded; a `LoadError`
    // surfacing here during a resume re-check is an operator error
    // (pipeline file changed between runs), not a step-level failure.
    match e {
        wave_pipeline::LoadError::CycleDetected(s) => EngineError::CycleDetected(s),
        other => EngineError::WorkspaceUnavailable(other.to_string()),
    }
}

fn transitive_predecessors(dag: &Dag, step: &StepId) -> HashSet<StepId> {
    let mut seen = HashSet::new();
    let mut stack: Vec<StepId> = dag.predecessors_of(step).to_vec();
    while let Some(s) = stack.pop() {
        if seen.insert(s.clone()) {
            stack.extend(dag.predecessors_of(&s).iter().cloned());
        }
    }
    seen
}

fn step_event(
    run_id: &RunId,
    clock: &Arc<dyn Clock>,
    step_id: &StepId,
    state: EventState,
    persona: Option<PersonaName>,
    message: Option<String>,
) -> Event {
    Event {
        id: 0,
        run_id: run_id.clone(),
        ts: clock.now(),
        step_id: Some(step_id.clone()),
        state,
        persona,
        message,
        duration_ms: None,
        tokens_used: None,
        artifacts: Vec::new(),
        failure_reason: None,
        recovery_hints: None,
        tool_activity: None,
        attempt: None,
    }
}

/// One step's full lifecycle: prepare its workspace, run it to completion
/// (including retries), and release the workspace regardless of outcome.
async fn dispatch_step(
    runtime: Arc<StepRuntime>,
    events: Arc<EventPipeline>,
    run_id: RunId,
    step: StepDef,
    persona: Persona,
    input: String,
    artifact_lookup: HashMap<(StepId, ArtifactName), PathBuf>,
    force_skip_validation: bool,
) -> Result<StepSuccess, EngineError> {
    let started_at = runtime.clock.now();
    events.emit(step_event(
        &run_id,
        &runtime.clock,
        &step.id,
        EventState::Started,
        Some(persona.name.clone()),
        None,
    ))?;
    events.put_step_progress(StepProgress {
        run_id: run_id.clone(),
        step_id: step.id.clone(),
        persona: persona.name.clone(),
        state: EventState::Started,
        progress: 0,
        current_action: None,
        started_at: Some(started_at),
        updated_at: started_at,
        eta_ms: None,
        tokens_used: 0,
    });

    let workspace = runtime.workspaces.prepare(&run_id, &step).await?;

    let refs: Vec<(StepId, ArtifactName, PathBuf)> = step
        .memory
        .inject_artifacts
        .iter()
        .map(|r| (r.step_id.clone(), r.artifact_name.clone(), r.local_alias.clone()))
        .collect();

    let outcome = run_attempts(
        &runtime,
        &events,
        &run_id,
        &step,
        &persona,
        &input,
        &workspace,
        &refs,
        &artifact_lookup,
        force_skip_validation,
        started_at,
    )
    .await;

    let release = runtime.workspaces.release(workspace).await;

    let final_result = match (outcome, release) {
        (Ok(success), Ok(())) => Ok(success),
        (Ok(_), Err(release_err)) => Err(release_err),
        (Err(e), _) => Err(e),
    };

    if let Err(e) = &final_result {
        let classification = e.to_wave_error().classification();
        let hint = recovery::build(&run_id, &step.id, classification);
        let mut ev = step_event(
            &run_id,
            &runtime.clock,
            &step.id,
            EventState::Failed,
            Some(persona.name.clone()),
            Some(e.to_string()),
        );
        ev.failure_reason = Some(classification);
        ev.recovery_hints = Some(hint);
        events.emit(ev)?;
    }

    final_result
}

/// A failed attempt may retry unless it was the run's own cancellation
/// taking effect, which is never worth repeating.
fn is_retryable(classification: FailureClassification) -> bool {
    !matches!(classification, FailureClassification::Cancelled)
}

#[allow(clippy::too_many_arguments)]
async fn run_attempts(
    runtime: &Arc<StepRuntime>,
    events: &Arc<EventPipeline>,
    run_id: &RunId,
    step: &StepDef,
    persona: &Persona,
    input: &str,
    workspace: &WorkspaceHandle,
    refs: &[(StepId, ArtifactName, PathBuf)],
    artifact_lookup: &HashMap<(StepId, ArtifactName), PathBuf>,
    force_skip_validation: bool,
    started_at: DateTime<Utc>,
) -> Result<StepSuccess, EngineError> {
    let injected = runtime.artifacts.inject(&workspace.path, refs, artifact_lookup).await?;
    write_permission_guidance(&workspace.path, persona).await?;
    let binding = adapter_registry::resolve(&persona.adapter);
    let timeout = step.timeout.unwrap_or(runtime.default_step_timeout);
    let max_attempts = step.max_retries + 1;
    let mut attempt = 1u32;

    loop {
        let prompt = resolve_prompt(runtime, step, input, &injected).await?;
        let args = adapter_registry::build_args(&binding, persona, &prompt);

        events.emit(step_event(
            run_id,
            &runtime.clock,
            &step.id,
            EventState::Running,
            Some(persona.name.clone()),
            None,
        ))?;

        let cfg = AdapterConfig {
            program: binding.program.clone(),
            args,
            workspace_path: workspace.path.clone(),
            prompt,
            env: Vec::new(),
            timeout,
            tool_allow: persona.permissions.allow.clone(),
            tool_deny: persona.permissions.deny.clone(),
            model: persona.model.clone(),
            temperature: persona.temperature.clone(),
        };

        let poll_run_id = run_id.clone();
        let cancellations = Arc::clone(&runtime.cancellations);
        let poll = move || cancellations.lock().get(&poll_run_id).cloned();

        let adapter_result = match runtime.adapter_runner.run(cfg, &poll).await {
            Ok(r) => r,
            Err(e) => {
                let classification = classify_adapter_error(&e);
                if matches!(classification, FailureClassification::Cancelled) {
                    return Err(EngineError::Cancelled);
                }
                if attempt < max_attempts && is_retryable(classification) {
                    events.emit(failed_event(
                        run_id,
                        &runtime.clock,
                        &step.id,
                        persona.name.clone(),
                        classification,
                        Some(e.to_string()),
                    ))?;
                    events.emit(retrying_event(run_id, &runtime.clock, &step.id, attempt))?;
                    attempt += 1;
                    continue;
                }
                return Err(EngineError::AdapterFailed(e));
            }
        };

        for (name, target) in &adapter_result.tool_activity {
            let mut ev = step_event(
                run_id,
                &runtime.clock,
                &step.id,
                EventState::StreamActivity,
                Some(persona.name.clone()),
                None,
            );
            ev.tool_activity = Some(ToolActivity {
                name: name.clone(),
                target: target.clone(),
            });
            events.emit(ev)?;

            // Fail-secure: a denied tool call observed in the stream is a
            // step failure regardless of what the subprocess later exits
            // with (spec.md §4.3, §7 `SecurityError`).
            if !persona.permissions.is_allowed(name) {
                return Err(EngineError::Security(format!(
                    "denied tool observed: {name}"
                )));
            }
        }

        if adapter_result.exit_code != 0 {
            let classification = adapter_result.failure_reason.unwrap_or(FailureClassification::GeneralError);
            if matches!(classification, FailureClassification::Cancelled) {
                return Err(EngineError::Cancelled);
            }
            if attempt < max_attempts && is_retryable(classification) {
                events.emit(failed_event(
                    run_id,
                    &runtime.clock,
                    &step.id,
                    persona.name.clone(),
                    classification,
                    Some(format!("adapter exited with status {}", adapter_result.exit_code)),
                ))?;
                events.emit(retrying_event(run_id, &runtime.clock, &step.id, attempt))?;
                attempt += 1;
                continue;
            }
            return Err(EngineError::StepFailed(
                step.id.clone(),
                format!("adapter exited with status {}", adapter_result.exit_code),
            ));
        }

        let mut validation = ArtifactValidation::NotValidated;
        let mut decision_message = None;

        if let Some(contract) = &step.contract {
            if !force_skip_validation {
                events.emit(step_event(
                    run_id,
                    &runtime.clock,
                    &step.id,
                    EventState::ContractValidating,
                    Some(persona.name.clone()),
                    None,
                ))?;

                let mut artifact_paths = HashMap::new();
                for decl in &step.output_artifacts {
                    artifact_paths.insert(decl.name.to_string(), workspace.path.join(&decl.path));
                }
                let ctx = ValidationContext {
                    workspace_path: workspace.path.clone(),
                    schema_dir: runtime.schema_dir.clone(),
                    artifact_paths,
                };
                let decision = wave_contracts::validate(&contract.kind, contract.must_pass, &ctx, attempt, step.max_retries).await;
                match decision {
                    Decision::Pass => validation = ArtifactValidation::Passed,
                    Decision::Warn(err) => {
                        decision_message = Some(err.message.clone());
                        validation = ArtifactValidation::Warned { details: err.details };
                    }
                    Decision::Fail(err) => {
                        if attempt < max_attempts && err.retryable {
                            events.emit(failed_event(
                                run_id,
                                &runtime.clock,
                                &step.id,
                                persona.name.clone(),
                                FailureClassification::ContractFailed,
                                Some(err.message.clone()),
                            ))?;
                            events.emit(retrying_event(run_id, &runtime.clock, &step.id, attempt))?;
                            attempt += 1;
                            continue;
                        }
                        return Err(EngineError::ContractFailed {
                            message: err.message,
                            attempt,
                        });
                    }
                }
            }
        }

        let now = runtime.clock.now();
        let registered = runtime
            .artifacts
            .register_artifacts(run_id, &step.id, &workspace.path, &step.output_artifacts, validation, now)
            .await?;
        for artifact in &registered {
            events.put_artifact(artifact.clone())?;
        }

        let mut completed_event = step_event(
            run_id,
            &runtime.clock,
            &step.id,
            EventState::Completed,
            Some(persona.name.clone()),
            decision_message,
        );
        completed_event.artifacts = registered.iter().map(|a| a.name.clone()).collect();
        completed_event.tokens_used = Some(adapter_result.tokens_estimate);
        completed_event.duration_ms = Some((now - started_at).num_milliseconds().max(0) as u64);
        events.emit(completed_event)?;

        return Ok(StepSuccess {
            step_id: step.id.clone(),
            produced: registered.into_iter().map(|a| (a.step_id, a.name, a.path)).collect(),
        });
    }
}

fn retrying_event(run_id: &RunId, clock: &Arc<dyn Clock>, step_id: &StepId, attempt: u32) -> Event {
    let mut e = step_event(run_id, clock, step_id, EventState::Retrying, None, None);
    e.attempt = Some(attempt);
    e
}

/// The `failed` transition that precedes a `retrying` one (spec.md §4.1's
/// `running → failed → (retrying → running …)` state machine). No
/// recovery hint is attached: the failure isn't terminal, the run is
/// about to retry the step.
fn failed_event(
    run_id: &RunId,
    clock: &Arc<dyn Clock>,
    step_id: &StepId,
    persona: PersonaName,
    classification: FailureClassification,
    message: Option<String>,
) -> Event {
    let mut e = step_event(run_id, clock, step_id, EventState::Failed, Some(persona), message);
    e.failure_reason = Some(classification);
    e
}

fn classify_adapter_error(e: &wave_adapters::AdapterError) -> FailureClassification {
    use wave_adapters::AdapterError;
    match e {
        AdapterError::Timeout(_) => FailureClassification::Timeout,
        AdapterError::Cancelled => FailureClassification::Cancelled,
        AdapterError::ContextExhaustion => FailureClassification::ContextExhaustion,
        AdapterError::RateLimit => FailureClassification::RateLimit,
        AdapterError::Spawn(_) | AdapterError::Signal(_) | AdapterError::Wait(_) | AdapterError::GeneralError(_) => {
            FailureClassification::GeneralError
        }
    }
}

/// Resolve a step's prompt template against the run's literal input and
/// its injected artifacts' local aliases, then append the structured
/// reference block so the adapter can locate injected files.
async fn resolve_prompt(
    runtime: &StepRuntime,
    step: &StepDef,
    input: &str,
    injected: &[(String, PathBuf)],
) -> Result<String, EngineError> {
    let raw = match &step.exec {
        wave_core::Exec::Prompt { source: wave_core::PromptSource::Inline(text) } => text.clone(),
        wave_core::Exec::Prompt { source: wave_core::PromptSource::File { file } } => {
            let path = runtime.repo_root.join(file);
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| EngineError::WorkspaceUnavailable(format!("prompt file {}: {e}", path.display())))?
        }
    };

    let mut keys = vec!["input".to_string()];
    for (alias, _) in injected {
        let stem = Path::new(alias)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(alias.as_str());
        keys.push(format!("artifacts.{stem}"));
    }

    let mut values: wave_pipeline::template::Values = std::collections::BTreeMap::new();
    values.insert(keys[0].as_str(), input.to_string());
    for (i, (alias, _)) in injected.iter().enumerate() {
        values.insert(keys[i + 1].as_str(), alias.clone());
    }

    let body = wave_pipeline::template::render(&raw, &values);
    let refs: Vec<(String, &Path)> = injected.iter().map(|(a, p)| (a.clone(), p.as_path())).collect();
    let block = wave_pipeline::template::artifact_reference_block(&refs);
    Ok(format!("{body}{block}"))
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
