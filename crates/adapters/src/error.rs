// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter-runner errors. These sit beneath `wave_core::WaveError` —
//! `wave-engine` maps an `AdapterError` onto `WaveError::AdapterFailed`
//! carrying the corresponding [`wave_core::FailureClassification`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to spawn adapter process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to signal adapter process group: {0}")]
    Signal(#[source] std::io::Error),

    #[error("failed to wait on adapter process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("adapter timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("adapter run was cancelled")]
    Cancelled,

    #[error("adapter exited with context exhaustion")]
    ContextExhaustion,

    #[error("adapter exited with a rate limit error")]
    RateLimit,

    #[error("adapter exited with status {0}")]
    GeneralError(i32),
}
