// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj scripts`

use super::{api_failed, Context};
use crate::output::{format_scripts, print_json, OutputFormat};
use sj_adapters::ScriptApi;

pub async fn handle(ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let scripts = ctx.api()?.list_scripts().await.map_err(api_failed)?;
    match format {
        OutputFormat::Text => print!("{}", format_scripts(&scripts)),
        OutputFormat::Json => print_json(&scripts)?,
    }
    Ok(())
}
