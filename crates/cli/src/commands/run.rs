// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj run`: start a job and follow it to the end.

use super::download::save_artifact;
use super::upload::upload_file;
use super::{api_failed, Context, Controller};
use crate::exit_error::{codes, ExitError};
use anyhow::Context as _;
use clap::Args;
use serde_json::{Map, Value};
use sj_adapters::{HttpScriptApi, ScriptApi};
use sj_core::{ExecuteRequest, JobState};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Script to run (see `sj scripts`)
    pub script: String,

    /// Input workbook to upload first
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Configuration as a JSON object
    #[arg(long, value_name = "JSON", conflicts_with = "config_file")]
    pub config: Option<String>,

    /// Read the configuration JSON object from a file
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Set one configuration string (repeatable), e.g. `--set tenant_code=acme`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Directory to save the result artifact in
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Do not download the result artifact
    #[arg(long)]
    pub no_download: bool,
}

/// Merge `--config`/`--config-file` with `--set` pairs into one JSON object.
pub fn build_config(json: Option<&str>, pairs: &[String]) -> Result<Value, ExitError> {
    let mut config = match json {
        Some(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(ExitError::usage("configuration must be a JSON object")),
            Err(e) => return Err(ExitError::usage(format!("invalid configuration JSON: {e}"))),
        },
        None => Map::new(),
    };
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| ExitError::usage(format!("expected KEY=VALUE, got '{pair}'")))?;
        config.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(Value::Object(config))
}

pub async fn handle(ctx: &Context, args: RunArgs) -> anyhow::Result<()> {
    let json = match &args.config_file {
        Some(path) => Some(
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        ),
        None => args.config.clone(),
    };
    let config = build_config(json.as_deref(), &args.set)?;

    let api = Arc::new(ctx.api()?);
    let script = api.script(&args.script).await.map_err(api_failed)?;
    if script.requires_input && args.input.is_none() {
        return Err(ExitError::usage(format!(
            "{} requires an input file (--input FILE); `sj template {}` fetches a sample",
            script.name, script.name
        ))
        .into());
    }

    let input_filename = match &args.input {
        Some(path) => Some(upload_file(api.as_ref(), path).await?.filename),
        None => None,
    };

    let mut controller = ctx.controller(Arc::clone(&api))?;
    let mut request =
        ExecuteRequest::new(script.name.clone(), controller.session().client_id().clone())
            .config(config);
    if let Some(name) = input_filename {
        request = request.input_filename(name);
    }

    tracing::info!(script = %script.name, client_id = %controller.session().client_id(), "starting job");
    controller.start(request).await;
    let state = watch(&mut controller).await;
    let download_dir = (!args.no_download).then_some(args.output_dir.as_path());
    finish(&controller, &api, state, download_dir).await
}

/// Follow the job until it settles. The first Ctrl-C asks the server to
/// stop it; the second drops it locally.
pub async fn watch(controller: &mut Controller) -> JobState {
    let handle = controller.handle();
    let interrupts = tokio::spawn(async move {
        let mut presses = 0;
        while tokio::signal::ctrl_c().await.is_ok() {
            presses += 1;
            if presses == 1 {
                eprintln!("{}", crate::color::hint(&interrupt_hint(handle.state())));
                handle.request_cancel().await;
            } else {
                handle.force_reset().await;
                break;
            }
        }
    });
    let state = controller.run_until_settled().await;
    interrupts.abort();
    state
}

/// What the first Ctrl-C does: only a running job can be asked to stop.
fn interrupt_hint(state: JobState) -> String {
    match state {
        JobState::Running => "Stopping... press Ctrl-C again to reset".to_string(),
        state => format!("Job is {state}, nothing to stop yet; press Ctrl-C again to reset"),
    }
}

/// Turn the final state into the command's result.
pub async fn finish(
    controller: &Controller,
    api: &HttpScriptApi,
    state: JobState,
    download_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let session = controller.session();
    match state {
        JobState::Completed => {
            let artifact = session.result_artifact().unwrap_or_default();
            match download_dir {
                Some(dir) => {
                    let path = save_artifact(api, artifact, dir).await?;
                    println!("Saved {}", path.display());
                }
                None => println!("Result: {artifact} (fetch with `sj download {artifact}`)"),
            }
            Ok(())
        }
        JobState::Failed => Err(ExitError::new(
            codes::JOB_FAILED,
            format!("job failed: {}", session.failure_reason().unwrap_or("unknown reason")),
        )
        .into()),
        JobState::Connecting | JobState::Running | JobState::Cancelling => Err(ExitError::new(
            codes::DETACHED,
            "lost the log stream; the job may still be running (reconnect with `sj attach`)",
        )
        .into()),
        JobState::Idle => Err(ExitError::failed("job ended without a result").into()),
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
