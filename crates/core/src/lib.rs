// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wave-core: domain types shared across the Wave pipeline executor —
//! `Pipeline`/`Step`/`Persona` definitions, `Run`, `Event`, `Artifact`,
//! `StepProgress`, `PipelineProgress`, `Cancellation`, the shared error
//! taxonomy, id newtypes, and a `Clock` abstraction for deterministic tests.

pub mod artifact;
pub mod cancellation;
pub mod clock;
pub mod error;
pub mod event;
pub mod id;
pub mod ids;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod run;
pub mod time_fmt;
pub mod workspace;

#[cfg(feature = "test-support")]
pub mod test_support;

pub use artifact::{Artifact, ArtifactValidation};
pub use cancellation::Cancellation;
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{MissingArtifactRef, WaveError};
pub use event::{
    Event, EventState, FailureClassification, RecoveryCommand, RecoveryHint, ToolActivity,
};
pub use id::{IdGen, SequentialIdGen, ShortId, UuidIdGen};
pub use ids::{ArtifactName, EventId, PersonaName, PipelineName, RunId, StepId, WorkspaceId};
pub use logging::LogLevel;
pub use pipeline::{
    ArtifactRef, Contract, ContractKind, Exec, InputSource, MemoryConfig, MemoryStrategy, Mount,
    MountMode, OutputArtifactDecl, Permissions, Persona, Pipeline, PromptSource, Requirements,
    StepDef, WorkspaceConfig,
};
pub use progress::{PipelineProgress, StepProgress};
pub use run::{derive_run_id, Run, RunStatus};
pub use workspace::{WorkspaceMode, WorkspaceStatus};
