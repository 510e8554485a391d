// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response calls against the script server.

pub(crate) mod http;

pub use http::HttpScriptApi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sj_core::{ClientId, ExecuteOutcome, ExecuteRequest};
use thiserror::Error;

/// Errors from script server calls
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Non-success status; `detail` is the server's message, verbatim
    #[error("{detail} (HTTP {status})")]
    Rejected { status: u16, detail: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("unknown script: {0}")]
    UnknownScript(String),
}

impl ApiError {
    /// Text suitable for showing to the user.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Rejected { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

fn yes() -> bool {
    true
}

/// A script offered by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptInfo {
    /// Script identifier, e.g. `Update_Farmer_Tags.py`
    pub name: String,
    /// Upstream endpoint the script talks to (informational)
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub label: String,
    /// Whether the script needs an uploaded input file
    #[serde(default = "yes")]
    pub requires_input: bool,
}

/// Server's answer to an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Name as sent by the client; pass this as `input_filename`
    pub filename: String,
    /// Name under which the server stored it
    pub server_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub is_running: bool,
}

/// Script server API
#[async_trait]
pub trait ScriptApi: Send + Sync + 'static {
    /// All scripts, sorted by name
    async fn list_scripts(&self) -> Result<Vec<ScriptInfo>, ApiError>;

    /// Look up one script's metadata by name.
    async fn script(&self, name: &str) -> Result<ScriptInfo, ApiError> {
        self.list_scripts()
            .await?
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ApiError::UnknownScript(name.to_string()))
    }

    /// Sample input workbook for a script
    async fn template(&self, script: &str) -> Result<Vec<u8>, ApiError>;

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, ApiError>;

    /// Submit a job. May not return until the job finishes when the server
    /// answers synchronously.
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteOutcome, ApiError>;

    /// Drop server-side log history for this client
    async fn clear_history(&self, client_id: &ClientId) -> Result<(), ApiError>;

    /// Ask the server to stop this client's job
    async fn stop(&self, client_id: &ClientId) -> Result<(), ApiError>;

    async fn status(&self, client_id: &ClientId) -> Result<JobStatus, ApiError>;

    /// Fetch a result artifact by name
    async fn download(&self, artifact: &str) -> Result<Vec<u8>, ApiError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ApiError, JobStatus, ScriptApi, ScriptInfo, UploadReceipt};
    use crate::journal::Journal;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use sj_core::{ClientId, ExecuteOutcome, ExecuteRequest};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Recorded API call
    #[derive(Debug, Clone, PartialEq)]
    pub enum ApiCall {
        ListScripts,
        Template { script: String },
        Upload { file_name: String, len: usize },
        Execute { request: ExecuteRequest },
        ClearHistory { client_id: ClientId },
        Stop { client_id: ClientId },
        Status { client_id: ClientId },
        Download { artifact: String },
    }

    struct FakeApiState {
        calls: Vec<ApiCall>,
        scripts: Vec<ScriptInfo>,
        files: HashMap<String, Vec<u8>>,
        execute_result: Result<ExecuteOutcome, ApiError>,
        /// Per-script overrides of `execute_result`
        execute_results: HashMap<String, Result<ExecuteOutcome, ApiError>>,
        clear_result: Result<(), ApiError>,
        stop_result: Result<(), ApiError>,
        status_result: Result<JobStatus, ApiError>,
        hold_execute: bool,
    }

    /// Scripted script server for testing
    #[derive(Clone)]
    pub struct FakeScriptApi {
        inner: Arc<Mutex<FakeApiState>>,
        release: Arc<Notify>,
        journal: Journal,
    }

    impl Default for FakeScriptApi {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FakeScriptApi {
        pub fn new() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeApiState {
                    calls: Vec::new(),
                    scripts: Vec::new(),
                    files: HashMap::new(),
                    execute_result: Ok(ExecuteOutcome::Queued {
                        message: "Script started in background".to_string(),
                    }),
                    execute_results: HashMap::new(),
                    clear_result: Ok(()),
                    stop_result: Ok(()),
                    status_result: Ok(JobStatus { is_running: false }),
                    hold_execute: false,
                })),
                release: Arc::new(Notify::new()),
                journal: Journal::default(),
            }
        }

        /// Share a call journal with other fakes to assert cross-adapter ordering.
        pub fn with_journal(mut self, journal: Journal) -> Self {
            self.journal = journal;
            self
        }

        pub fn calls(&self) -> Vec<ApiCall> {
            self.inner.lock().calls.clone()
        }

        pub fn add_script(&self, name: &str, requires_input: bool) {
            self.inner.lock().scripts.push(ScriptInfo {
                name: name.to_string(),
                url: String::new(),
                label: name.trim_end_matches(".py").replace('_', " "),
                requires_input,
            });
        }

        /// Bytes served by `template` and `download` for this name.
        pub fn add_file(&self, name: &str, bytes: &[u8]) {
            self.inner.lock().files.insert(name.to_string(), bytes.to_vec());
        }

        pub fn set_execute_result(&self, result: Result<ExecuteOutcome, ApiError>) {
            self.inner.lock().execute_result = result;
        }

        /// Answer execute requests for `script` with `result`.
        pub fn set_execute_result_for(&self, script: &str, result: Result<ExecuteOutcome, ApiError>) {
            self.inner.lock().execute_results.insert(script.to_string(), result);
        }

        pub fn set_clear_result(&self, result: Result<(), ApiError>) {
            self.inner.lock().clear_result = result;
        }

        pub fn set_stop_result(&self, result: Result<(), ApiError>) {
            self.inner.lock().stop_result = result;
        }

        pub fn set_status(&self, result: Result<JobStatus, ApiError>) {
            self.inner.lock().status_result = result;
        }

        /// Make `execute` block until [`FakeScriptApi::release_execute`],
        /// like a server that answers only when the job is done.
        pub fn hold_execute(&self) {
            self.inner.lock().hold_execute = true;
        }

        pub fn release_execute(&self) {
            self.inner.lock().hold_execute = false;
            self.release.notify_waiters();
        }

        fn record(&self, call: ApiCall) {
            let label = match &call {
                ApiCall::ListScripts => "api:list_scripts".to_string(),
                ApiCall::Template { .. } => "api:template".to_string(),
                ApiCall::Upload { .. } => "api:upload".to_string(),
                ApiCall::Execute { .. } => "api:execute".to_string(),
                ApiCall::ClearHistory { .. } => "api:clear_history".to_string(),
                ApiCall::Stop { .. } => "api:stop".to_string(),
                ApiCall::Status { .. } => "api:status".to_string(),
                ApiCall::Download { artifact } => format!("api:download {artifact}"),
            };
            self.journal.push(label);
            self.inner.lock().calls.push(call);
        }

        fn file(&self, name: &str) -> Result<Vec<u8>, ApiError> {
            self.inner.lock().files.get(name).cloned().ok_or_else(|| ApiError::Rejected {
                status: 404,
                detail: format!("{name} not found"),
            })
        }
    }

    #[async_trait]
    impl ScriptApi for FakeScriptApi {
        async fn list_scripts(&self) -> Result<Vec<ScriptInfo>, ApiError> {
            self.record(ApiCall::ListScripts);
            let mut scripts = self.inner.lock().scripts.clone();
            scripts.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(scripts)
        }

        async fn template(&self, script: &str) -> Result<Vec<u8>, ApiError> {
            self.record(ApiCall::Template { script: script.to_string() });
            self.file(script)
        }

        async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, ApiError> {
            self.record(ApiCall::Upload { file_name: file_name.to_string(), len: bytes.len() });
            Ok(UploadReceipt {
                filename: file_name.to_string(),
                server_path: format!("input_{file_name}"),
            })
        }

        async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteOutcome, ApiError> {
            self.record(ApiCall::Execute { request: request.clone() });
            loop {
                let released = self.release.notified();
                if !self.inner.lock().hold_execute {
                    break;
                }
                released.await;
            }
            let inner = self.inner.lock();
            inner
                .execute_results
                .get(&request.script_name)
                .unwrap_or(&inner.execute_result)
                .clone()
        }

        async fn clear_history(&self, client_id: &ClientId) -> Result<(), ApiError> {
            self.record(ApiCall::ClearHistory { client_id: client_id.clone() });
            self.inner.lock().clear_result.clone()
        }

        async fn stop(&self, client_id: &ClientId) -> Result<(), ApiError> {
            self.record(ApiCall::Stop { client_id: client_id.clone() });
            self.inner.lock().stop_result.clone()
        }

        async fn status(&self, client_id: &ClientId) -> Result<JobStatus, ApiError> {
            self.record(ApiCall::Status { client_id: client_id.clone() });
            self.inner.lock().status_result.clone()
        }

        async fn download(&self, artifact: &str) -> Result<Vec<u8>, ApiError> {
            self.record(ApiCall::Download { artifact: artifact.to_string() });
            self.file(artifact)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{ApiCall, FakeScriptApi};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
