// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use crate::exit_error::ExitError;
use sj_adapters::TransportKind;
use std::path::PathBuf;
use std::time::Duration;

/// Server used when neither `--server` nor `SJ_SERVER` is given
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

/// Script server base URL: `SJ_SERVER` or the local default.
pub fn server_url() -> String {
    std::env::var("SJ_SERVER")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string())
}

/// Resolve state directory: SJ_STATE_DIR > XDG_STATE_HOME/sj > ~/.local/state/sj
pub fn state_dir() -> Result<PathBuf, ExitError> {
    if let Ok(dir) = std::env::var("SJ_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("sj"));
    }
    let home = std::env::var("HOME")
        .map_err(|_| ExitError::usage("cannot locate a state directory: set SJ_STATE_DIR or HOME"))?;
    Ok(PathBuf::from(home).join(".local/state/sj"))
}

/// Log channel backend from `SJ_TRANSPORT` (default `sse`).
pub fn transport() -> Result<TransportKind, ExitError> {
    match std::env::var("SJ_TRANSPORT") {
        Ok(value) if !value.is_empty() => value.parse().map_err(ExitError::usage),
        _ => Ok(TransportKind::default()),
    }
}

/// Timeout for request/response calls (default 30s, `SJ_HTTP_TIMEOUT_MS`).
/// Log streams and the execute request are not bounded by it.
pub fn http_timeout() -> Duration {
    std::env::var("SJ_HTTP_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// Log filter directive from `SJ_LOG` (default `info`).
pub fn log_filter() -> String {
    std::env::var("SJ_LOG").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "info".to_string())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
