// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj stop`: ask the server to stop this client's job.
//!
//! The process following the job (if any) sees the job's terminal frame and
//! exits on its own.

use super::{api_failed, Context};
use crate::console::format_notice;
use crate::exit_error::ExitError;
use sj_adapters::{ScriptApi, SessionStore};
use sj_core::Notice;

pub async fn handle(ctx: &Context) -> anyhow::Result<()> {
    let record = ctx
        .store()
        .read()?
        .ok_or_else(|| ExitError::failed("no job has been started from this machine"))?;
    if !record.running {
        eprintln!("{}", crate::color::hint("No job is recorded as running; asking the server anyway"));
    }
    ctx.api()?.stop(&record.client_id).await.map_err(api_failed)?;
    tracing::info!(client_id = %record.client_id, "stop requested");
    eprintln!("{}", format_notice(&Notice::StopRequested));
    Ok(())
}
