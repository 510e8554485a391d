// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job state and the execute request.

use crate::id::ClientId;
use serde::{Deserialize, Serialize};

/// Lifecycle state of the client's current job.
///
/// ```text
/// Idle ─start─▶ Connecting ─ack/attach─▶ Running ─sentinel─▶ Completed | Failed
///                                           │
///                                        cancel
///                                           ▼
///                                       Cancelling ─sentinel─▶ Completed | Failed
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Idle,
    /// Channel is being opened and the execute request has not been acknowledged yet
    Connecting,
    /// Server accepted the job; frames are streaming
    Running,
    /// Stop was requested; waiting for the job's terminal frame
    Cancelling,
    Completed,
    Failed,
}

impl JobState {
    /// Connecting, Running or Cancelling: the states in which the persisted
    /// running flag must be set.
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Connecting | JobState::Running | JobState::Cancelling)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

crate::simple_display! {
    JobState {
        Idle => "idle",
        Connecting => "connecting",
        Running => "running",
        Cancelling => "cancelling",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Sequence number of an opened log channel.
///
/// Every `OpenChannel` gets a fresh number; channel events carry it so that
/// frames still queued from a superseded channel can be told apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelSeq(pub u64);

impl ChannelSeq {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for ChannelSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ch-{}", self.0)
    }
}

/// Inputs of the execute request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    /// Script identifier, e.g. `Update_Farmer_Tags.py`
    pub script_name: String,
    /// Server-side name of a previously uploaded input file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_filename: Option<String>,
    /// Opaque configuration payload, forwarded to the script as JSON
    #[serde(default)]
    pub config: serde_json::Value,
    pub client_id: ClientId,
}

impl ExecuteRequest {
    pub fn new(script_name: impl Into<String>, client_id: ClientId) -> Self {
        Self {
            script_name: script_name.into(),
            input_filename: None,
            config: serde_json::Value::Object(serde_json::Map::new()),
            client_id,
        }
    }

    crate::setters! {
        set {
            config: serde_json::Value,
            client_id: ClientId,
        }
        option {
            input_filename: String,
        }
    }
}

/// Successful answer to an execute request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExecuteOutcome {
    /// Job accepted and running in the background; the result arrives as a
    /// sentinel frame on the log channel.
    Queued { message: String },
    /// The server held the request open until the job finished and answered
    /// with the result artifact itself.
    Finished { artifact: String },
}

/// The controller's view of the client's current job.
///
/// Transient: only `SessionRecord` survives a restart. Mutated exclusively by
/// [`crate::machine::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct JobSession {
    pub(crate) client_id: ClientId,
    pub(crate) state: JobState,
    pub(crate) script: Option<String>,
    pub(crate) result_artifact: Option<String>,
    pub(crate) failure_reason: Option<String>,
    /// Channel currently open, if any
    pub(crate) channel: Option<ChannelSeq>,
    /// Last sequence number handed out
    pub(crate) last_seq: ChannelSeq,
    /// Execute request waiting for the channel to open
    pub(crate) pending_submit: Option<ExecuteRequest>,
    /// Channel of the start whose execute answers still apply; answers
    /// tagged with any other channel belong to a superseded job
    pub(crate) execute_seq: Option<ChannelSeq>,
    /// A status query for a persisted running flag is in flight
    pub(crate) reconciling: bool,
}

impl JobSession {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            state: JobState::Idle,
            script: None,
            result_artifact: None,
            failure_reason: None,
            channel: None,
            last_seq: ChannelSeq::default(),
            pending_submit: None,
            execute_seq: None,
            reconciling: false,
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// Artifact named by the completion sentinel, for the download step.
    pub fn result_artifact(&self) -> Option<&str> {
        self.result_artifact.as_deref()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn channel(&self) -> Option<ChannelSeq> {
        self.channel
    }

    pub fn is_channel_open(&self) -> bool {
        self.channel.is_some()
    }

    /// Nothing left to wait for: no job in flight and no status query pending.
    pub fn is_settled(&self) -> bool {
        !self.state.is_active() && !self.reconciling
    }

    pub(crate) fn allocate_channel(&mut self) -> ChannelSeq {
        self.last_seq = self.last_seq.next();
        self.channel = Some(self.last_seq);
        self.last_seq
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
