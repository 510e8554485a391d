// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal palette. Job output and notices go to different streams, so
//! each stream decides on its own whether it gets ANSI codes.

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use sj_core::NoticeLevel;
use std::io::IsTerminal;

pub mod codes {
    /// Headings and field labels
    pub const HEADER: u8 = 74;
    /// Script names and other literals
    pub const LITERAL: u8 = 250;
    /// Informational notices, help placeholders
    pub const CONTEXT: u8 = 245;
    /// Hints and secondary text
    pub const MUTED: u8 = 240;
    pub const SUCCESS: u8 = 114;
    pub const WARN: u8 = 214;
    pub const ERROR: u8 = 203;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// `NO_COLOR` (any non-empty value) wins over `COLOR=1`; otherwise color
/// only when the stream is a terminal.
pub fn enabled(stream: Stream) -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| !v.is_empty()) {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    match stream {
        Stream::Stdout => std::io::stdout().is_terminal(),
        Stream::Stderr => std::io::stderr().is_terminal(),
    }
}

fn ansi(code: u8) -> Style {
    Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))))
}

/// Help styles for clap.
pub fn styles() -> Styles {
    if !enabled(Stream::Stdout) {
        return Styles::plain();
    }
    Styles::styled()
        .header(ansi(codes::HEADER))
        .usage(ansi(codes::HEADER))
        .literal(ansi(codes::LITERAL))
        .placeholder(ansi(codes::CONTEXT))
        .error(ansi(codes::ERROR))
}

fn paint(stream: Stream, code: u8, text: &str) -> String {
    if enabled(stream) {
        let style = ansi(code);
        format!("{style}{text}{style:#}")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(Stream::Stdout, codes::HEADER, text)
}

pub fn literal(text: &str) -> String {
    paint(Stream::Stdout, codes::LITERAL, text)
}

pub fn muted(text: &str) -> String {
    paint(Stream::Stdout, codes::MUTED, text)
}

/// Secondary text written to stderr.
pub fn hint(text: &str) -> String {
    paint(Stream::Stderr, codes::MUTED, text)
}

/// Notice text for stderr, in the color of its level.
pub fn notice(level: NoticeLevel, text: &str) -> String {
    let code = match level {
        NoticeLevel::Info => codes::CONTEXT,
        NoticeLevel::Success => codes::SUCCESS,
        NoticeLevel::Warn => codes::WARN,
        NoticeLevel::Error => codes::ERROR,
    };
    paint(Stream::Stderr, code, text)
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
