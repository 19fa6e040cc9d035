// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NDJSON stdout stream parsing.
//!
//! An adapter subprocess writes one JSON object per line. Recognized record
//! kinds update [`wave_core::StepProgress`] and surface as `stream_activity`
//! events; a trailing `result` record carries the cumulative token estimate
//! and completion subtype. A line that isn't valid JSON, or is valid JSON
//! without a recognized `type`, is discarded but counted (see DESIGN.md).

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

/// One parsed record from an adapter's stdout stream.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterRecord {
    ToolUse {
        name: String,
        target: Option<String>,
    },
    Progress {
        percent: Option<u8>,
        message: Option<String>,
        tokens_used: Option<u64>,
    },
    /// The final record of a successful run.
    Result {
        tokens_estimate: u64,
        subtype: Option<String>,
        content: Option<String>,
        artifacts: Vec<String>,
    },
}

/// Parse a single line. Returns `None` for anything not recognized, which
/// the caller should count as discarded rather than treat as an error.
pub fn parse_line(line: &str) -> Option<AdapterRecord> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(trimmed).ok()?;
    let kind = value.get("type")?.as_str()?;
    match kind {
        "tool_use" => Some(AdapterRecord::ToolUse {
            name: str_field(&value, "name")?,
            target: opt_str_field(&value, "target"),
        }),
        "progress" => Some(AdapterRecord::Progress {
            percent: value
                .get("percent")
                .and_then(Value::as_u64)
                .map(|n| n.min(100) as u8),
            message: opt_str_field(&value, "message"),
            tokens_used: value.get("tokens_used").and_then(Value::as_u64),
        }),
        "result" => Some(AdapterRecord::Result {
            tokens_estimate: value.get("tokens_estimate").and_then(Value::as_u64).unwrap_or(0),
            subtype: opt_str_field(&value, "subtype"),
            content: opt_str_field(&value, "content"),
            artifacts: value
                .get("artifacts")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
        }),
        _ => None,
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

fn opt_str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Incremental line reader over an adapter's stdout pipe. Kept separate
/// from [`parse_line`] so the pure parsing logic stays unit-testable
/// without an async runtime.
pub struct StreamReader<R> {
    lines: Lines<BufReader<R>>,
    discarded: u64,
}

impl<R: AsyncRead + Unpin> StreamReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            discarded: 0,
        }
    }

    /// Read and parse the next recognized record, skipping (and counting)
    /// any number of unrecognized lines along the way. Returns `Ok(None)`
    /// once the stream is exhausted.
    pub async fn next_record(&mut self) -> std::io::Result<Option<AdapterRecord>> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            if let Some(record) = parse_line(&line) {
                return Ok(Some(record));
            }
            self.discarded += 1;
        }
    }

    /// Count of lines that were not valid recognized records.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
