// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing notices emitted by the controller.

use serde::{Deserialize, Serialize};

/// Severity of a notice, for console coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warn,
    Error,
}

/// Status lines shown next to the live console output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    Connecting,
    /// Clearing server-side history failed; the new job still starts
    HistoryNotCleared { error: String },
    /// Execute acknowledged with a queue message
    Queued { message: String },
    /// Reconciliation found the job still running on the server
    Resuming { script: Option<String> },
    /// Reconciliation found no job behind the persisted flag (ghost session)
    SessionLost,
    StatusCheckFailed { error: String },
    StopRequested,
    StopFailed { error: String },
    Completed { artifact: String },
    Failed { reason: String },
    ExecutionRejected { detail: String },
    TransportFault { reason: String },
    Reset,
}

impl Notice {
    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::Connecting | Notice::Queued { .. } => NoticeLevel::Info,
            Notice::Completed { .. } => NoticeLevel::Success,
            Notice::HistoryNotCleared { .. }
            | Notice::Resuming { .. }
            | Notice::SessionLost
            | Notice::StatusCheckFailed { .. }
            | Notice::StopRequested
            | Notice::StopFailed { .. }
            | Notice::Reset => NoticeLevel::Warn,
            Notice::Failed { .. }
            | Notice::ExecutionRejected { .. }
            | Notice::TransportFault { .. } => NoticeLevel::Error,
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Connecting => write!(f, "Connecting to console..."),
            Notice::HistoryNotCleared { error } => write!(
                f,
                "Warning: Could not clear previous session logs ({error}). You may see duplicate history."
            ),
            Notice::Queued { message } => write!(f, "{message}"),
            Notice::Resuming { script: Some(script) } => write!(
                f,
                "{script} is still running, please wait until finished or stop the process to proceed."
            ),
            Notice::Resuming { script: None } => write!(
                f,
                "The session is running, please wait until finished or stop the process to proceed."
            ),
            Notice::SessionLost => {
                write!(f, "Previous session was lost (server restarted). Ready for new run.")
            }
            Notice::StatusCheckFailed { error } => write!(f, "Status check failed: {error}"),
            Notice::StopRequested => write!(f, "Stop requested. Waiting for script to terminate..."),
            Notice::StopFailed { error } => write!(f, "Stop failed: {error}"),
            Notice::Completed { artifact } => write!(f, "Execution finished. Result: {artifact}"),
            Notice::Failed { reason } => write!(f, "ERROR: {reason}"),
            Notice::ExecutionRejected { detail } => write!(f, "Request failed: {detail}"),
            Notice::TransportFault { reason } => write!(f, "Connection lost: {reason}"),
            Notice::Reset => write!(f, "Session reset."),
        }
    }
}
