// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent side effects the controller needs to perform

use crate::id::ClientId;
use crate::job::{ChannelSeq, ExecuteRequest};
use crate::notice::Notice;
use serde::{Deserialize, Serialize};

/// Effects returned by the state machine and executed, in order, by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    // === Session store ===
    /// Persist the running flag for this script
    MarkRunning { script: String },

    /// Clear the running flag
    MarkIdle,

    // === Channel ===
    /// Open the log channel for this client (closes any other first)
    OpenChannel { client_id: ClientId, seq: ChannelSeq },

    /// Release the log channel
    CloseChannel { seq: ChannelSeq },

    // === Requests ===
    /// Best-effort wipe of server-side log history for this client
    ClearHistory { client_id: ClientId },

    /// Send the execute request; the answer is tagged with `seq`
    SubmitExecute { request: ExecuteRequest, seq: ChannelSeq },

    /// Ask the server to stop the client's job (cooperative)
    SendStop { client_id: ClientId },

    /// Ask the server whether the client's job is still running
    QueryStatus { client_id: ClientId },

    // === Display ===
    /// Forward a plain log line to the console
    Print { line: String },

    /// Show a status notice
    Notify { notice: Notice },

    /// The result artifact can be downloaded
    ArtifactReady { name: String },
}

impl Effect {
    /// Effect name for log spans (e.g., "open_channel", "submit_execute")
    pub fn name(&self) -> &'static str {
        match self {
            Effect::MarkRunning { .. } => "mark_running",
            Effect::MarkIdle => "mark_idle",
            Effect::OpenChannel { .. } => "open_channel",
            Effect::CloseChannel { .. } => "close_channel",
            Effect::ClearHistory { .. } => "clear_history",
            Effect::SubmitExecute { .. } => "submit_execute",
            Effect::SendStop { .. } => "send_stop",
            Effect::QueryStatus { .. } => "query_status",
            Effect::Print { .. } => "print",
            Effect::Notify { .. } => "notify",
            Effect::ArtifactReady { .. } => "artifact_ready",
        }
    }

    /// Key-value pairs for structured logging
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::MarkRunning { script } => vec![("script", script.clone())],
            Effect::MarkIdle | Effect::Print { .. } => vec![],
            Effect::OpenChannel { client_id, seq } => {
                vec![("client_id", client_id.to_string()), ("seq", seq.to_string())]
            }
            Effect::CloseChannel { seq } => vec![("seq", seq.to_string())],
            Effect::ClearHistory { client_id }
            | Effect::SendStop { client_id }
            | Effect::QueryStatus { client_id } => vec![("client_id", client_id.to_string())],
            Effect::SubmitExecute { request, seq } => {
                let mut fields = vec![
                    ("script", request.script_name.clone()),
                    ("client_id", request.client_id.to_string()),
                    ("seq", seq.to_string()),
                ];
                if let Some(ref input) = request.input_filename {
                    fields.push(("input", input.clone()));
                }
                fields
            }
            Effect::Notify { notice } => vec![("notice", format!("{:?}", notice.level()))],
            Effect::ArtifactReady { name } => vec![("artifact", name.clone())],
        }
    }

    /// Whether to log this effect at all; console output is too frequent.
    pub fn verbose(&self) -> bool {
        !matches!(self, Effect::Print { .. } | Effect::Notify { .. })
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
