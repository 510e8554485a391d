// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal rendering of job output.

use crate::color;
use sj_adapters::Console;
use sj_core::Notice;

/// Prints job lines to stdout and notices to stderr, prefixed with `> `.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn line(&self, text: &str) {
        println!("{text}");
    }

    fn notice(&self, notice: &Notice) {
        eprintln!("{}", format_notice(notice));
    }

    fn artifact_ready(&self, name: &str) {
        tracing::info!(artifact = name, "result ready");
    }
}

pub fn format_notice(notice: &Notice) -> String {
    color::notice(notice.level(), &format!("> {notice}"))
}

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
