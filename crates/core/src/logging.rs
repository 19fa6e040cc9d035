// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging init helper shared by every Wave binary.
//!
//! Library crates only ever call `tracing::{debug,info,warn,error}!` — this
//! module is the one place a subscriber gets installed, so the same policy
//! (env-filter precedence, stderr target) applies everywhere `wave` runs.

use tracing_subscriber::{fmt, EnvFilter};

/// Verbosity requested by a binary's own flags, overridable by `RUST_LOG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Install a global `tracing` subscriber writing human-readable lines to
/// stderr. `RUST_LOG`, when set, always wins over `level`.
///
/// Safe to call at most once per process; a second call is a no-op (the
/// `set_global_default` error is swallowed, matching `tracing`'s own advice
/// for libraries that may be embedded in a larger binary).
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
