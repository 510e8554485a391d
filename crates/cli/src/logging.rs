// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup. Logs go to `<state_dir>/sj.log`, never to the terminal,
//! so they cannot interleave with job output.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log file name inside the state directory
pub const LOG_FILE: &str = "sj.log";

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init(state_dir: &Path, filter: &str) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(state_dir)?;
    let file_appender = tracing_appender::rolling::never(state_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (tests); keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .try_init();
    Ok(guard)
}
