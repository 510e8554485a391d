// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj status`: local record next to the server's view.

use super::Context;
use crate::color;
use crate::output::{print_json, OutputFormat};
use serde::Serialize;
use sj_adapters::{ScriptApi, SessionStore};

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub client_id: Option<String>,
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_script: Option<String>,
    /// Server's answer; `None` when there is no identity to ask about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_running: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_error: Option<String>,
}

impl StatusReport {
    pub fn render(&self) -> String {
        let Some(ref client_id) = self.client_id else {
            return "No client identity yet (nothing has been run)\n".to_string();
        };
        let local = match (self.running, &self.running_script) {
            (true, Some(script)) => format!("running {script}"),
            (true, None) => "running".to_string(),
            (false, _) => "idle".to_string(),
        };
        let server = match (self.server_running, &self.server_error) {
            (Some(true), _) => "job running".to_string(),
            (Some(false), _) => "no job".to_string(),
            (None, Some(error)) => format!("unreachable ({error})"),
            (None, None) => "-".to_string(),
        };
        format!(
            "{} {}\n{} {}\n{} {}\n",
            color::header("client:"),
            client_id,
            color::header("local: "),
            local,
            color::header("server:"),
            server
        )
    }
}

pub async fn handle(ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let record = ctx.store().read()?;
    let mut report = StatusReport {
        client_id: record.as_ref().map(|r| r.client_id.to_string()),
        running: record.as_ref().is_some_and(|r| r.running),
        running_script: record.as_ref().and_then(|r| r.running_script.clone()),
        server_running: None,
        server_error: None,
    };
    if let Some(record) = record {
        match ctx.api()?.status(&record.client_id).await {
            Ok(status) => report.server_running = Some(status.is_running),
            Err(e) => report.server_error = Some(e.detail()),
        }
    }

    match format {
        OutputFormat::Text => print!("{}", report.render()),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
