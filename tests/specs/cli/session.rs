// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted session handling across invocations.

use crate::prelude::*;
use serde_json::json;

#[test]
fn status_without_identity() {
    cli().args(&["status"]).passes().stdout_has("No client identity yet").stdout_lacks("server:");
}

#[test]
fn status_json_without_identity() {
    let output = cli().args(&["status", "--format", "json"]).passes();
    assert_eq!(output.stdout_json(), json!({ "client_id": null, "running": false }));
}

#[test]
fn status_reports_unreachable_server() {
    cli()
        .with_record(json!({ "client_id": "client_c1", "running": true, "running_script": "Foo.py" }))
        .args(&["status"])
        .passes()
        .stdout_has("client_c1")
        .stdout_has("running Foo.py")
        .stdout_has("unreachable");
}

#[test]
fn attach_with_nothing_running() {
    let sj = cli().args(&["attach"]);
    sj.passes().stdout_has("No job in progress");
    // The identity is created on first use and stays idle.
    let record = sj.record();
    assert_eq!(record["running"], false);
    assert!(record["client_id"].as_str().is_some_and(|id| id.starts_with("client_")));
}

#[test]
fn attach_keeps_flag_when_server_unreachable() {
    let sj = cli()
        .with_record(json!({ "client_id": "client_c1", "running": true, "running_script": "Foo.py" }))
        .args(&["attach"]);
    sj.exits(1).stderr_has("Status check failed").stderr_has("could not confirm");
    assert_eq!(sj.record()["running"], true);
}

#[test]
fn reset_clears_running_flag() {
    let sj = cli()
        .with_record(json!({ "client_id": "client_c1", "running": true, "running_script": "Foo.py" }))
        .args(&["reset"]);
    sj.passes().stderr_has("Session reset.");
    assert_eq!(sj.record(), json!({ "client_id": "client_c1", "running": false }));
}

#[test]
fn corrupt_session_file_is_named_in_errors() {
    let sj = cli().args(&["status"]);
    std::fs::write(sj.session_file(), "{not json").unwrap();
    sj.exits(1).stderr_has("session.json").stderr_has("sj reset");
}

#[test]
fn reset_recovers_from_corrupt_session_file() {
    let sj = cli().args(&["reset"]);
    std::fs::write(sj.session_file(), "{not json").unwrap();
    sj.passes().stderr_has("Moved unreadable session file").stderr_has("Session reset.");
    assert_eq!(sj.record()["running"], false);
    assert!(sj.state_dir().join("session.json.corrupt").exists());
}

#[test]
fn stop_without_identity_fails() {
    cli().args(&["stop"]).exits(1).stderr_has("no job has been started");
}

#[test]
fn stop_reports_unreachable_server() {
    cli()
        .with_record(json!({ "client_id": "client_c1", "running": true }))
        .args(&["stop"])
        .exits(1)
        .stderr_has("error:");
}

#[test]
fn logs_go_to_the_state_directory() {
    let sj = cli().args(&["status"]);
    sj.passes();
    assert!(sj.state_dir().join("sj.log").exists());
}
