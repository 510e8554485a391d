// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! reqwest-backed [`ScriptApi`].

use super::{ApiError, JobStatus, ScriptApi, ScriptInfo, UploadReceipt};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use sj_core::{ClientId, ExecuteOutcome, ExecuteRequest};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Script server client over HTTP.
///
/// Every call except `execute` is bounded by the configured timeout. Execute
/// is not: a server that answers synchronously holds the request open for the
/// whole job.
pub struct HttpScriptApi {
    client: Client,
    base: Url,
    timeout: Duration,
    /// Artifacts delivered inline by a synchronous execute, served by `download`
    artifacts: Mutex<HashMap<String, Vec<u8>>>,
}

#[derive(Deserialize)]
struct ScriptList {
    scripts: Vec<ScriptInfo>,
}

#[derive(Deserialize)]
struct QueuedBody {
    #[serde(default)]
    message: String,
}

impl HttpScriptApi {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(base).map_err(|e| ApiError::Transport(format!("bad server URL {base}: {e}")))?;
        let client = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { client, base, timeout, artifacts: Mutex::new(HashMap::new()) })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        endpoint(&self.base, segments)
            .ok_or_else(|| ApiError::Transport(format!("server URL cannot be a base: {}", self.base)))
    }

    async fn send(&self, op: &'static str, request: RequestBuilder) -> Result<Response, ApiError> {
        let start = Instant::now();
        let result = request.send().await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(op, elapsed_ms, error = %e, "request failed");
                return Err(ApiError::Transport(e.to_string()));
            }
        };
        let status = response.status();
        tracing::debug!(op, elapsed_ms, status = status.as_u16(), "response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        tracing::info!(op, status = status.as_u16(), %detail, "rejected");
        Err(ApiError::Rejected { status: status.as_u16(), detail })
    }

    async fn get_bytes(&self, op: &'static str, segments: &[&str]) -> Result<Vec<u8>, ApiError> {
        let url = self.url(segments)?;
        let response = self.send(op, self.client.get(url).timeout(self.timeout)).await?;
        let bytes = response.bytes().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn post_empty(&self, op: &'static str, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.url(segments)?;
        self.send(op, self.client.post(url).timeout(self.timeout)).await?;
        Ok(())
    }
}

#[async_trait]
impl ScriptApi for HttpScriptApi {
    async fn list_scripts(&self) -> Result<Vec<ScriptInfo>, ApiError> {
        let url = self.url(&["api", "scripts"])?;
        let response = self.send("list_scripts", self.client.get(url).timeout(self.timeout)).await?;
        let list: ScriptList = decode(response).await?;
        Ok(list.scripts)
    }

    async fn template(&self, script: &str) -> Result<Vec<u8>, ApiError> {
        self.get_bytes("template", &["api", "template", script]).await
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, ApiError> {
        let url = self.url(&["api", "upload"])?;
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        let response =
            self.send("upload", self.client.post(url).multipart(form).timeout(self.timeout)).await?;
        decode(response).await
    }

    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteOutcome, ApiError> {
        let url = self.url(&["api", "execute"])?;
        let config =
            serde_json::to_string(&request.config).map_err(|e| ApiError::Decode(e.to_string()))?;
        let mut form = Form::new()
            .text("script_name", request.script_name.clone())
            .text("config", config)
            .text("client_id", request.client_id.to_string());
        if let Some(ref input) = request.input_filename {
            form = form.text("input_filename", input.clone());
        }

        let response = self.send("execute", self.client.post(url).multipart(form)).await?;
        if is_json(response.headers()) {
            let body: QueuedBody = decode(response).await?;
            return Ok(ExecuteOutcome::Queued { message: body.message });
        }

        let artifact = attachment_name(response.headers())
            .unwrap_or_else(|| default_artifact_name(&request.script_name));
        let bytes = response.bytes().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        tracing::info!(%artifact, len = bytes.len(), "execute returned artifact inline");
        self.artifacts.lock().insert(artifact.clone(), bytes.to_vec());
        Ok(ExecuteOutcome::Finished { artifact })
    }

    async fn clear_history(&self, client_id: &ClientId) -> Result<(), ApiError> {
        self.post_empty("clear_history", &["api", "clear_session", client_id.as_str()]).await
    }

    async fn stop(&self, client_id: &ClientId) -> Result<(), ApiError> {
        self.post_empty("stop", &["api", "stop", client_id.as_str()]).await
    }

    async fn status(&self, client_id: &ClientId) -> Result<JobStatus, ApiError> {
        let url = self.url(&["api", "status", client_id.as_str()])?;
        let response = self.send("status", self.client.get(url).timeout(self.timeout)).await?;
        decode(response).await
    }

    async fn download(&self, artifact: &str) -> Result<Vec<u8>, ApiError> {
        if let Some(bytes) = self.artifacts.lock().get(artifact) {
            return Ok(bytes.clone());
        }
        self.get_bytes("download", &["api", "download", artifact]).await
    }
}

/// Append percent-encoded path segments to `base`.
///
/// Returns `None` for URLs that cannot carry a path (e.g. `mailto:`).
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
    Some(url)
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await.map_err(|e| ApiError::Transport(e.to_string()))?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Server error text from a `{"detail": ...}` body.
///
/// Validation errors carry a structured detail; those are returned as JSON.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// File name from `Content-Disposition: attachment; filename="..."`.
pub(crate) fn attachment_name(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;
    value.split(';').map(str::trim).find_map(|part| {
        let name = part.strip_prefix("filename=")?.trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}

/// Artifact name the server uses for a script's output: `Foo.py` -> `Foo_Output.xlsx`.
pub(crate) fn default_artifact_name(script: &str) -> String {
    format!("{}_Output.xlsx", script.trim_end_matches(".py"))
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
