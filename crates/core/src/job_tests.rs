// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    idle       = { JobState::Idle,       false, false },
    connecting = { JobState::Connecting, true,  false },
    running    = { JobState::Running,    true,  false },
    cancelling = { JobState::Cancelling, true,  false },
    completed  = { JobState::Completed,  false, true },
    failed     = { JobState::Failed,     false, true },
)]
fn state_classification(state: JobState, active: bool, terminal: bool) {
    assert_eq!(state.is_active(), active);
    assert_eq!(state.is_terminal(), terminal);
}

#[test]
fn state_display_is_snake_case() {
    assert_eq!(JobState::Cancelling.to_string(), "cancelling");
    assert_eq!(serde_json::to_string(&JobState::Cancelling).unwrap(), "\"cancelling\"");
}

#[test]
fn channel_seq_increments() {
    let mut session = JobSession::new(ClientId::new("client_c1"));
    let first = session.allocate_channel();
    let second = session.allocate_channel();
    assert_eq!(first, ChannelSeq(1));
    assert_eq!(second, ChannelSeq(2));
    assert_eq!(session.channel(), Some(second));
    assert_eq!(second.to_string(), "ch-2");
}

#[test]
fn execute_request_builder() {
    let request = ExecuteRequest::new("Foo.py", ClientId::new("client_c1"))
        .input_filename("rows.xlsx")
        .config(serde_json::json!({ "tenant_code": "acme" }));
    assert_eq!(request.script_name, "Foo.py");
    assert_eq!(request.input_filename.as_deref(), Some("rows.xlsx"));
    assert_eq!(request.config["tenant_code"], "acme");
}

#[test]
fn execute_request_defaults_to_empty_config() {
    let request = ExecuteRequest::new("Foo.py", ClientId::new("client_c1"));
    assert_eq!(request.config, serde_json::json!({}));
    assert_eq!(request.input_filename, None);
}

#[test]
fn new_session_is_settled_and_idle() {
    let session = JobSession::new(ClientId::new("client_c1"));
    assert_eq!(session.state(), JobState::Idle);
    assert!(session.is_settled());
    assert!(!session.is_channel_open());
}
