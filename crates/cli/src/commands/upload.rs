// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj upload`, also used by `sj run --input`.

use super::api_failed;
use crate::exit_error::ExitError;
use anyhow::Context as _;
use sj_adapters::{ScriptApi, UploadReceipt};
use std::path::Path;

/// Upload a local file; returns the server's receipt.
pub async fn upload_file(api: &impl ScriptApi, path: &Path) -> anyhow::Result<UploadReceipt> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ExitError::usage(format!("not a file: {}", path.display())))?;
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    tracing::info!(file = file_name, len = bytes.len(), "uploading input");
    Ok(api.upload(file_name, bytes).await.map_err(api_failed)?)
}

pub async fn handle(ctx: &super::Context, path: &Path) -> anyhow::Result<()> {
    let receipt = upload_file(&ctx.api()?, path).await?;
    println!("Uploaded {} (stored as {})", receipt.filename, receipt.server_path);
    Ok(())
}
