// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wave-adapters: launches a persona's subprocess, supervises its process
//! group, parses its NDJSON stdout stream, and classifies its exit
//!. The production path is [`runner::ProcessAdapterRunner`];
//! a programmable [`fake::FakeAdapterRunner`] is available behind the
//! `test-support` feature for the executor's tests.

pub mod classify;
pub mod error;
pub mod process;
pub mod runner;
pub mod stream;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use classify::{classify, TerminationCause};
pub use error::AdapterError;
pub use process::{ProcessHandle, SpawnConfig, TERMINATION_GRACE};
pub use runner::{AdapterConfig, AdapterResult, AdapterRunner, ProcessAdapterRunner};
pub use stream::{parse_line, AdapterRecord, StreamReader};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeAdapterRunner, RecordedCall};
