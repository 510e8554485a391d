// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted session record.

use crate::id::ClientId;
use serde::{Deserialize, Serialize};

/// What survives a client restart.
///
/// `running` is the persisted intent "a job is in flight". It is true exactly
/// while the controller is connecting, running or cancelling a job, and is
/// only a hint after a restart: reconciliation asks the server before trusting
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub client_id: ClientId,
    #[serde(default)]
    pub running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_script: Option<String>,
}

impl SessionRecord {
    /// A fresh, idle record for the given identity.
    pub fn new(client_id: ClientId) -> Self {
        Self { client_id, running: false, running_script: None }
    }

    pub fn mark_running(&mut self, script: impl Into<String>) {
        self.running = true;
        self.running_script = Some(script.into());
    }

    pub fn mark_idle(&mut self) {
        self.running = false;
        self.running_script = None;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
