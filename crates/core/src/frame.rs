// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log frame classification.
//!
//! The server interleaves two reserved sentinel lines with ordinary console
//! output on the same stream:
//!
//! ```text
//! JOB_COMPLETED::<artifact name>
//! JOB_FAILED::<reason>
//! ```
//!
//! The payload is everything after the first `::`. A payload that itself
//! contains `::` is kept whole; there is no escaping in the wire format.

use serde::{Deserialize, Serialize};

pub const COMPLETED_PREFIX: &str = "JOB_COMPLETED::";
pub const FAILED_PREFIX: &str = "JOB_FAILED::";

/// A classified log frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Frame {
    /// Ordinary console output.
    Plain(String),
    /// The job finished; carries the result artifact name.
    Completed(String),
    /// The job failed; carries the reason.
    Failed(String),
}

impl Frame {
    /// Classify one raw frame.
    ///
    /// A sentinel prefix with an empty payload is not a usable terminal
    /// marker and is passed through as plain text.
    pub fn parse(raw: &str) -> Frame {
        let line = raw.trim_end_matches(['\r', '\n']);
        if let Some(name) = sentinel_payload(line, COMPLETED_PREFIX) {
            return Frame::Completed(name.to_string());
        }
        if let Some(reason) = sentinel_payload(line, FAILED_PREFIX) {
            return Frame::Failed(reason.to_string());
        }
        Frame::Plain(line.to_string())
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Frame::Plain(_))
    }
}

crate::simple_display! {
    Frame {
        Plain(..) => "plain",
        Completed(..) => "completed",
        Failed(..) => "failed",
    }
}

fn sentinel_payload<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let payload = line.strip_prefix(prefix)?;
    if payload.is_empty() {
        return None;
    }
    Some(payload)
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
