// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj reset`: forget the local job state without asking the server.
//!
//! An unreadable session file is moved aside first, so reset also recovers
//! from corruption. The client identity it held is lost.

use super::Context;
use std::sync::Arc;

pub async fn handle(ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.store();
    if let Some(backup) = store.set_aside_corrupt()? {
        eprintln!(
            "{}",
            crate::color::hint(&format!(
                "Moved unreadable session file {} to {}",
                store.path().display(),
                backup.display()
            ))
        );
    }
    let mut controller = ctx.controller(Arc::new(ctx.api()?))?;
    controller.force_reset().await;
    Ok(())
}
