// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj attach`: reconnect to a job started by an earlier invocation.

use super::run::{finish, watch};
use super::Context;
use crate::exit_error::ExitError;
use sj_adapters::SessionStore;
use sj_core::JobState;
use std::path::Path;
use std::sync::Arc;

pub async fn handle(ctx: &Context, download_dir: Option<&Path>) -> anyhow::Result<()> {
    let api = Arc::new(ctx.api()?);
    let mut controller = ctx.controller(Arc::clone(&api))?;
    controller.reconcile_on_load().await.map_err(|e| ExitError::failed(e.to_string()))?;

    if controller.state() == JobState::Idle {
        // Either nothing was running or the server could not confirm it.
        let still_flagged = ctx.store().read()?.is_some_and(|r| r.running);
        if still_flagged {
            return Err(ExitError::failed("could not confirm the job with the server").into());
        }
        println!("No job in progress");
        return Ok(());
    }

    let state = watch(&mut controller).await;
    finish(&controller, &api, state, download_dir).await
}
