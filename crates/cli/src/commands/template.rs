// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj template`

use super::{api_failed, Context};
use crate::output::template_file_name;
use anyhow::Context as _;
use sj_adapters::ScriptApi;
use std::path::PathBuf;

pub async fn handle(ctx: &Context, script: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let bytes = ctx.api()?.template(script).await.map_err(api_failed)?;
    let path = output.unwrap_or_else(|| PathBuf::from(template_file_name(script)));
    std::fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    println!("Template saved to {}", path.display());
    Ok(())
}
