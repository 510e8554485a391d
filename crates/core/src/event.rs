// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events that drive the job state machine.
//!
//! Every input the controller reacts to is one of these: user actions,
//! responses to requests it issued, and channel activity. They are processed
//! one at a time, in arrival order.

use crate::job::{ChannelSeq, ExecuteOutcome, ExecuteRequest};
use crate::session::SessionRecord;
use serde::{Deserialize, Serialize};

/// Activity on one log channel, as reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelEvent {
    /// Channel is live. `attached` is true for transports where opening the
    /// channel is itself confirmation that the job is being run.
    Opened { attached: bool },
    /// One raw text frame, in arrival order
    Frame { text: String },
    /// The channel failed to open or broke
    Fault { reason: String },
    /// The server ended the stream
    Closed,
}

/// Inputs to [`crate::machine::dispatch`].
///
/// Serializes with `{"type": "area:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // -- user actions --
    #[serde(rename = "job:start")]
    Start { request: ExecuteRequest },

    #[serde(rename = "job:cancel")]
    CancelRequested,

    #[serde(rename = "job:reset")]
    ForceReset,

    /// Startup check of the persisted record
    #[serde(rename = "session:reconcile")]
    Reconcile { record: SessionRecord },

    // -- request outcomes --
    #[serde(rename = "history:clear_failed")]
    HistoryClearFailed { error: String },

    /// `seq` is the channel of the start that submitted the request.
    #[serde(rename = "execute:accepted")]
    ExecuteAccepted { seq: ChannelSeq, outcome: ExecuteOutcome },

    #[serde(rename = "execute:rejected")]
    ExecuteRejected { seq: ChannelSeq, detail: String },

    #[serde(rename = "stop:acknowledged")]
    StopAcknowledged,

    #[serde(rename = "stop:failed")]
    StopFailed { error: String },

    #[serde(rename = "status:reported")]
    StatusReported { running: bool },

    #[serde(rename = "status:unavailable")]
    StatusUnavailable { error: String },

    // -- channel --
    #[serde(rename = "channel")]
    Channel { seq: ChannelSeq, event: ChannelEvent },
}

impl Event {
    /// Shorthand for a frame on the given channel.
    pub fn frame(seq: ChannelSeq, text: impl Into<String>) -> Self {
        Event::Channel { seq, event: ChannelEvent::Frame { text: text.into() } }
    }

    /// Event name for log spans
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start { .. } => "job:start",
            Event::CancelRequested => "job:cancel",
            Event::ForceReset => "job:reset",
            Event::Reconcile { .. } => "session:reconcile",
            Event::HistoryClearFailed { .. } => "history:clear_failed",
            Event::ExecuteAccepted { .. } => "execute:accepted",
            Event::ExecuteRejected { .. } => "execute:rejected",
            Event::StopAcknowledged => "stop:acknowledged",
            Event::StopFailed { .. } => "stop:failed",
            Event::StatusReported { .. } => "status:reported",
            Event::StatusUnavailable { .. } => "status:unavailable",
            Event::Channel { event, .. } => match event {
                ChannelEvent::Opened { .. } => "channel:opened",
                ChannelEvent::Frame { .. } => "channel:frame",
                ChannelEvent::Fault { .. } => "channel:fault",
                ChannelEvent::Closed => "channel:closed",
            },
        }
    }

    /// One-line summary for logs. Frame text is left out; it can be long.
    pub fn log_summary(&self) -> String {
        match self {
            Event::Start { request } => format!("{} script={}", self.name(), request.script_name),
            Event::Reconcile { record } => {
                format!("{} running={}", self.name(), record.running)
            }
            Event::StatusReported { running } => format!("{} running={}", self.name(), running),
            Event::Channel { seq, .. }
            | Event::ExecuteAccepted { seq, .. }
            | Event::ExecuteRejected { seq, .. } => format!("{} seq={}", self.name(), seq),
            _ => self.name().to_string(),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
