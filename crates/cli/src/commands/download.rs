// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj download`, also used after a completed `sj run`.

use super::api_failed;
use anyhow::Context as _;
use sj_adapters::ScriptApi;
use std::path::{Path, PathBuf};

/// Fetch `artifact` into `dir`; returns the written path.
pub async fn save_artifact(api: &impl ScriptApi, artifact: &str, dir: &Path) -> anyhow::Result<PathBuf> {
    let bytes = api.download(artifact).await.map_err(api_failed)?;
    // Keep only the final component of a server-supplied name.
    let name = Path::new(artifact).file_name().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(artifact));
    let path = dir.join(name);
    std::fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(artifact, path = %path.display(), len = bytes.len(), "artifact saved");
    Ok(path)
}

pub async fn handle(ctx: &super::Context, artifact: &str, dir: &Path) -> anyhow::Result<()> {
    let path = save_artifact(&ctx.api()?, artifact, dir).await?;
    println!("Saved {}", path.display());
    Ok(())
}
