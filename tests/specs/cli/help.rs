// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Help and version output.

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    let output = cli().args(&["--help"]).passes().stdout_has("Usage:");
    for command in ["scripts", "template", "upload", "run", "attach", "stop", "status", "reset", "download"] {
        assert!(output.stdout.contains(command), "missing {command}");
    }
}

#[test]
fn run_help_shows_options() {
    cli()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--input")
        .stdout_has("--config")
        .stdout_has("--set")
        .stdout_has("--no-download");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn no_subcommand_is_a_usage_error() {
    cli().exits(2).stderr_has("Usage:");
}
