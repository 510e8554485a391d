// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Argument and environment validation happens before any request is sent.

use crate::prelude::*;

#[test]
fn unknown_transport_flag_is_a_usage_error() {
    cli().args(&["--transport", "carrier-pigeon", "status"]).exits(2).stderr_has("carrier-pigeon");
}

#[test]
fn unknown_transport_env_is_a_usage_error() {
    cli().env("SJ_TRANSPORT", "smoke").args(&["status"]).exits(2).stderr_has("smoke");
}

#[test]
fn websocket_transport_is_accepted() {
    cli().args(&["--transport", "ws", "status"]).passes();
}

#[test]
fn malformed_set_pair_is_a_usage_error() {
    cli().args(&["run", "Foo.py", "--set", "tenant_code"]).exits(2).stderr_has("KEY=VALUE");
}

#[test]
fn non_object_config_is_a_usage_error() {
    cli().args(&["run", "Foo.py", "--config", "[1, 2]"]).exits(2).stderr_has("JSON object");
}

#[test]
fn config_and_config_file_conflict() {
    cli()
        .args(&["run", "Foo.py", "--config", "{}", "--config-file", "cfg.json"])
        .exits(2)
        .stderr_has("cannot be used with");
}

#[test]
fn unreachable_server_fails_script_listing() {
    cli().args(&["scripts"]).exits(1).stderr_has("error:");
}

#[test]
fn unreachable_server_fails_run_before_any_state_change() {
    let sj = cli().args(&["run", "Foo.py"]);
    sj.exits(1);
    assert!(!sj.session_file().exists());
}
