// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{
    client, connected_session, run_events, running_session, start_event, strategies,
};
use crate::{ClientId, ExecuteRequest, SessionRecord};
use proptest::prelude::*;

const CH1: ChannelSeq = ChannelSeq(1);
const CH2: ChannelSeq = ChannelSeq(2);

fn opened(seq: ChannelSeq, attached: bool) -> Event {
    Event::Channel { seq, event: ChannelEvent::Opened { attached } }
}

fn queued() -> Event {
    Event::ExecuteAccepted {
        seq: CH1,
        outcome: ExecuteOutcome::Queued { message: "Job queued".to_string() },
    }
}

fn count_close(effects: &[Effect]) -> usize {
    effects.iter().filter(|e| matches!(e, Effect::CloseChannel { .. })).count()
}

// --- start ---

#[test]
fn start_clears_history_before_opening_channel() {
    let (session, effects) = dispatch(&JobSession::new(client()), &start_event("Foo.py"));

    assert_eq!(session.state(), JobState::Connecting);
    assert_eq!(session.script(), Some("Foo.py"));
    assert_eq!(
        effects,
        vec![
            Effect::ClearHistory { client_id: client() },
            Effect::MarkRunning { script: "Foo.py".to_string() },
            Effect::Notify { notice: Notice::Connecting },
            Effect::OpenChannel { client_id: client(), seq: CH1 },
        ]
    );
}

#[test]
fn start_waits_for_channel_before_submitting() {
    let (session, effects) = dispatch(&JobSession::new(client()), &start_event("Foo.py"));
    assert!(!effects.iter().any(|e| matches!(e, Effect::SubmitExecute { .. })));

    let (session, effects) = dispatch(&session, &opened(CH1, false));
    assert_eq!(
        effects,
        vec![Effect::SubmitExecute { request: ExecuteRequest::new("Foo.py", client()), seq: CH1 }]
    );
    assert_eq!(session.state(), JobState::Connecting);
}

#[test]
fn start_forces_session_identity_onto_request() {
    let request = ExecuteRequest::new("Foo.py", ClientId::new("client_other"));
    let (session, _) = dispatch(&JobSession::new(client()), &Event::Start { request });
    let (_, effects) = dispatch(&session, &opened(CH1, false));
    match &effects[..] {
        [Effect::SubmitExecute { request, .. }] => assert_eq!(request.client_id, client()),
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn start_while_running_hard_resets_previous_channel() {
    let session = running_session("Old.py");
    let (session, effects) = dispatch(&session, &start_event("New.py"));

    assert_eq!(effects[0], Effect::CloseChannel { seq: CH1 });
    assert!(effects.contains(&Effect::OpenChannel { client_id: client(), seq: CH2 }));
    assert_eq!(session.channel(), Some(CH2));
    assert_eq!(session.state(), JobState::Connecting);
    assert_eq!(session.script(), Some("New.py"));
}

#[test]
fn start_after_completion_resets_result() {
    let (session, _) = run_events(
        running_session("Foo.py"),
        &[Event::frame(CH1, "JOB_COMPLETED::Foo_Result.xlsx")],
    );
    let (session, effects) = dispatch(&session, &start_event("Foo.py"));
    assert_eq!(session.state(), JobState::Connecting);
    assert_eq!(session.result_artifact(), None);
    // The completed job's channel was already closed.
    assert_eq!(count_close(&effects), 0);
}

#[test]
fn history_clear_failure_warns_without_blocking() {
    let (session, _) = dispatch(&JobSession::new(client()), &start_event("Foo.py"));
    let (session, effects) =
        dispatch(&session, &Event::HistoryClearFailed { error: "502".to_string() });
    assert_eq!(
        effects,
        vec![Effect::Notify { notice: Notice::HistoryNotCleared { error: "502".to_string() } }]
    );
    assert_eq!(session.state(), JobState::Connecting);

    let (_, effects) = dispatch(&session, &opened(CH1, false));
    assert!(matches!(effects[0], Effect::SubmitExecute { .. }));
}

// --- acknowledgement / attachment ---

#[test]
fn queued_ack_moves_to_running() {
    let (session, effects) = dispatch(&connected_session("Foo.py"), &queued());
    assert_eq!(session.state(), JobState::Running);
    assert_eq!(
        effects,
        vec![Effect::Notify { notice: Notice::Queued { message: "Job queued".to_string() } }]
    );
}

#[test]
fn attached_channel_moves_to_running_on_open() {
    let (session, _) = dispatch(&JobSession::new(client()), &start_event("Foo.py"));
    let (session, effects) = dispatch(&session, &opened(CH1, true));
    assert_eq!(session.state(), JobState::Running);
    assert!(matches!(effects[0], Effect::SubmitExecute { .. }));
}

#[test]
fn synchronous_result_completes_job() {
    let (session, _) = run_events(
        JobSession::new(client()),
        &[start_event("Foo.py"), opened(CH1, true)],
    );
    let (session, effects) = dispatch(
        &session,
        &Event::ExecuteAccepted {
            seq: CH1,
            outcome: ExecuteOutcome::Finished { artifact: "Foo_Output.xlsx".to_string() },
        },
    );
    assert_eq!(session.state(), JobState::Completed);
    assert_eq!(session.result_artifact(), Some("Foo_Output.xlsx"));
    assert!(effects.contains(&Effect::MarkIdle));
    assert_eq!(count_close(&effects), 1);
}

#[test]
fn synchronous_result_after_sentinel_is_ignored() {
    let (session, _) = run_events(
        JobSession::new(client()),
        &[start_event("Foo.py"), opened(CH1, true), Event::frame(CH1, "JOB_COMPLETED::a.xlsx")],
    );
    let (session, effects) = dispatch(
        &session,
        &Event::ExecuteAccepted {
            seq: CH1,
            outcome: ExecuteOutcome::Finished { artifact: "b.xlsx".to_string() },
        },
    );
    assert!(effects.is_empty());
    assert_eq!(session.result_artifact(), Some("a.xlsx"));
}

#[test]
fn rejection_reverts_to_idle() {
    let (session, effects) = dispatch(
        &connected_session("Foo.py"),
        &Event::ExecuteRejected { seq: CH1, detail: "Script not found".to_string() },
    );
    assert_eq!(session.state(), JobState::Idle);
    assert!(!session.is_channel_open());
    assert_eq!(
        effects,
        vec![
            Effect::CloseChannel { seq: CH1 },
            Effect::MarkIdle,
            Effect::Notify {
                notice: Notice::ExecutionRejected { detail: "Script not found".to_string() }
            },
        ]
    );
}

#[test]
fn rejection_after_failure_sentinel_is_ignored() {
    let (session, _) =
        run_events(running_session("Foo.py"), &[Event::frame(CH1, "JOB_FAILED::boom")]);
    let (session, effects) =
        dispatch(&session, &Event::ExecuteRejected { seq: CH1, detail: "boom".to_string() });
    assert!(effects.is_empty());
    assert_eq!(session.state(), JobState::Failed);
}

/// Job A attached on ch-1, then superseded by job B attached on ch-2.
fn superseded_by_second_job() -> JobSession {
    let (session, _) = run_events(
        JobSession::new(client()),
        &[start_event("A.py"), opened(CH1, true), start_event("B.py"), opened(CH2, true)],
    );
    assert_eq!(session.state(), JobState::Running);
    session
}

#[test]
fn late_result_from_superseded_job_is_ignored() {
    let session = superseded_by_second_job();
    let (next, effects) = dispatch(
        &session,
        &Event::ExecuteAccepted {
            seq: CH1,
            outcome: ExecuteOutcome::Finished { artifact: "A_Output.xlsx".to_string() },
        },
    );
    assert!(effects.is_empty(), "{effects:?}");
    assert_eq!(next.state(), JobState::Running);
    assert_eq!(next.result_artifact(), None);
    assert_eq!(next.channel(), Some(CH2));
}

#[test]
fn late_rejection_from_superseded_job_is_ignored() {
    let session = superseded_by_second_job();
    let (next, effects) =
        dispatch(&session, &Event::ExecuteRejected { seq: CH1, detail: "boom".to_string() });
    assert!(effects.is_empty(), "{effects:?}");
    assert_eq!(next.state(), JobState::Running);
    assert!(next.is_channel_open());
}

#[test]
fn late_queued_ack_does_not_promote_new_job() {
    let (session, _) = run_events(
        JobSession::new(client()),
        &[start_event("A.py"), opened(CH1, false), start_event("B.py")],
    );
    let (next, effects) = dispatch(&session, &queued());
    assert!(effects.is_empty());
    assert_eq!(next.state(), JobState::Connecting);
}

#[test]
fn answers_for_current_job_still_apply_after_channel_loss() {
    let (session, _) = run_events(
        connected_session("Foo.py"),
        &[Event::Channel { seq: CH1, event: ChannelEvent::Closed }],
    );
    assert!(!session.is_channel_open());
    let (next, _) = dispatch(
        &session,
        &Event::ExecuteAccepted {
            seq: CH1,
            outcome: ExecuteOutcome::Finished { artifact: "Foo_Output.xlsx".to_string() },
        },
    );
    assert_eq!(next.state(), JobState::Completed);
}

#[test]
fn answers_after_force_reset_are_ignored() {
    let (session, _) = run_events(connected_session("Foo.py"), &[Event::ForceReset]);
    let (next, effects) =
        dispatch(&session, &Event::ExecuteRejected { seq: CH1, detail: "late".to_string() });
    assert!(effects.is_empty());
    assert_eq!(next.state(), JobState::Idle);
}

// --- frames ---

#[yare::parameterized(
    connecting = { false },
    running    = { true },
)]
fn plain_frames_are_printed_while_active(ack: bool) {
    let session =
        if ack { running_session("Foo.py") } else { connected_session("Foo.py") };
    let (next, effects) = dispatch(&session, &Event::frame(CH1, "row 3 updated"));
    assert_eq!(effects, vec![Effect::Print { line: "row 3 updated".to_string() }]);
    assert_eq!(next.state(), session.state());
}

#[test]
fn completion_sentinel_ends_job() {
    let (session, effects) = dispatch(
        &running_session("Foo.py"),
        &Event::frame(CH1, "JOB_COMPLETED::Foo_Result.xlsx"),
    );
    assert_eq!(session.state(), JobState::Completed);
    assert_eq!(session.result_artifact(), Some("Foo_Result.xlsx"));
    assert!(!session.is_channel_open());
    assert_eq!(
        effects,
        vec![
            Effect::MarkIdle,
            Effect::CloseChannel { seq: CH1 },
            Effect::Notify { notice: Notice::Completed { artifact: "Foo_Result.xlsx".to_string() } },
            Effect::ArtifactReady { name: "Foo_Result.xlsx".to_string() },
        ]
    );
}

#[test]
fn failure_sentinel_ends_job() {
    let (session, effects) =
        dispatch(&running_session("Foo.py"), &Event::frame(CH1, "JOB_FAILED::Upstream timeout"));
    assert_eq!(session.state(), JobState::Failed);
    assert_eq!(session.failure_reason(), Some("Upstream timeout"));
    assert_eq!(
        effects,
        vec![
            Effect::MarkIdle,
            Effect::CloseChannel { seq: CH1 },
            Effect::Notify { notice: Notice::Failed { reason: "Upstream timeout".to_string() } },
        ]
    );
}

#[test]
fn stale_channel_frames_are_ignored() {
    // ch-1 was superseded by a new start; its queued frames must not leak.
    let (session, _) = dispatch(&running_session("Old.py"), &start_event("New.py"));
    let (session, effects) = run_events(
        session,
        &[Event::frame(CH1, "old output"), Event::frame(CH1, "JOB_COMPLETED::Old.xlsx")],
    );
    assert!(effects.is_empty());
    assert_eq!(session.state(), JobState::Connecting);
}

// --- channel loss ---

#[test]
fn transport_fault_leaves_state_and_closes_once() {
    let (session, effects) = dispatch(
        &running_session("Foo.py"),
        &Event::Channel { seq: CH1, event: ChannelEvent::Fault { reason: "reset".to_string() } },
    );
    assert_eq!(session.state(), JobState::Running);
    assert!(!session.is_channel_open());
    assert_eq!(
        effects,
        vec![
            Effect::CloseChannel { seq: CH1 },
            Effect::Notify { notice: Notice::TransportFault { reason: "reset".to_string() } },
        ]
    );

    // Nothing more arrives from a dead channel.
    let (_, effects) =
        dispatch(&session, &Event::Channel { seq: CH1, event: ChannelEvent::Closed });
    assert!(effects.is_empty());
}

#[test]
fn stream_end_before_sentinel_is_a_fault() {
    let (_, effects) = dispatch(
        &running_session("Foo.py"),
        &Event::Channel { seq: CH1, event: ChannelEvent::Closed },
    );
    assert!(matches!(
        effects.last(),
        Some(Effect::Notify { notice: Notice::TransportFault { .. } })
    ));
}

// --- cancellation ---

#[test]
fn cancel_from_running_sends_stop() {
    let (session, effects) = dispatch(&running_session("Foo.py"), &Event::CancelRequested);
    assert_eq!(session.state(), JobState::Cancelling);
    assert_eq!(effects, vec![Effect::SendStop { client_id: client() }]);
    assert!(session.is_channel_open());
}

#[test]
fn cancel_outside_running_is_noop() {
    let idle = JobSession::new(client());
    let connecting = connected_session("Foo.py");
    let (cancelling, _) = dispatch(&running_session("Foo.py"), &Event::CancelRequested);
    let (completed, _) =
        run_events(running_session("Foo.py"), &[Event::frame(CH1, "JOB_COMPLETED::r.xlsx")]);

    for session in [idle, connecting, cancelling, completed] {
        let (next, effects) = dispatch(&session, &Event::CancelRequested);
        assert!(effects.is_empty(), "state {}", session.state());
        assert_eq!(next, session);
    }
}

#[test]
fn cancelling_job_still_needs_terminal_frame() {
    let (session, effects) = run_events(
        running_session("Foo.py"),
        &[
            Event::CancelRequested,
            Event::StopAcknowledged,
            Event::frame(CH1, "stopping after current row"),
        ],
    );
    assert_eq!(session.state(), JobState::Cancelling);
    assert!(effects.contains(&Effect::Notify { notice: Notice::StopRequested }));
    assert!(effects.contains(&Effect::Print { line: "stopping after current row".to_string() }));

    let (session, _) = dispatch(&session, &Event::frame(CH1, "JOB_FAILED::Stopped by user"));
    assert_eq!(session.state(), JobState::Failed);
}

#[test]
fn stop_failure_is_reported_without_transition() {
    let (cancelling, _) = dispatch(&running_session("Foo.py"), &Event::CancelRequested);
    let (session, effects) =
        dispatch(&cancelling, &Event::StopFailed { error: "timeout".to_string() });
    assert_eq!(session.state(), JobState::Cancelling);
    assert_eq!(
        effects,
        vec![Effect::Notify { notice: Notice::StopFailed { error: "timeout".to_string() } }]
    );
}

// --- reset ---

#[test]
fn force_reset_from_cancelling() {
    let (cancelling, _) = dispatch(&running_session("Foo.py"), &Event::CancelRequested);
    let (session, effects) = dispatch(&cancelling, &Event::ForceReset);
    assert_eq!(session.state(), JobState::Idle);
    assert!(!session.is_channel_open());
    assert_eq!(
        effects,
        vec![
            Effect::CloseChannel { seq: CH1 },
            Effect::MarkIdle,
            Effect::Notify { notice: Notice::Reset },
        ]
    );
}

// --- reconciliation ---

fn persisted(running: bool) -> SessionRecord {
    let mut record = SessionRecord::new(client());
    if running {
        record.mark_running("Foo.py");
    }
    record
}

#[test]
fn reconcile_idle_record_does_nothing() {
    let session = JobSession::new(client());
    let (next, effects) = dispatch(&session, &Event::Reconcile { record: persisted(false) });
    assert!(effects.is_empty());
    assert_eq!(next, session);
}

#[test]
fn reconcile_confirmed_reattaches_without_resubmitting() {
    let (session, effects) = run_events(
        JobSession::new(client()),
        &[
            Event::Reconcile { record: persisted(true) },
            Event::StatusReported { running: true },
            opened(CH1, false),
        ],
    );
    assert_eq!(session.state(), JobState::Running);
    assert_eq!(session.channel(), Some(CH1));
    assert_eq!(
        effects,
        vec![
            Effect::QueryStatus { client_id: client() },
            Effect::Notify { notice: Notice::Resuming { script: Some("Foo.py".to_string()) } },
            Effect::OpenChannel { client_id: client(), seq: CH1 },
        ]
    );
}

#[test]
fn reconcile_denied_clears_ghost_session() {
    let (session, effects) = run_events(
        JobSession::new(client()),
        &[Event::Reconcile { record: persisted(true) }, Event::StatusReported { running: false }],
    );
    assert_eq!(session.state(), JobState::Idle);
    assert!(session.is_settled());
    assert_eq!(
        effects,
        vec![
            Effect::QueryStatus { client_id: client() },
            Effect::MarkIdle,
            Effect::Notify { notice: Notice::SessionLost },
        ]
    );
}

#[test]
fn reconcile_status_failure_keeps_flag() {
    let (session, effects) = run_events(
        JobSession::new(client()),
        &[
            Event::Reconcile { record: persisted(true) },
            Event::StatusUnavailable { error: "connection refused".to_string() },
        ],
    );
    assert_eq!(session.state(), JobState::Idle);
    assert!(session.is_settled());
    assert!(!effects.contains(&Effect::MarkIdle));
}

#[test]
fn unsolicited_status_is_ignored() {
    let session = JobSession::new(client());
    let (next, effects) = dispatch(&session, &Event::StatusReported { running: true });
    assert!(effects.is_empty());
    assert_eq!(next, session);
}

#[test]
fn resumed_job_completes_normally() {
    let (session, effects) = run_events(
        JobSession::new(client()),
        &[
            Event::Reconcile { record: persisted(true) },
            Event::StatusReported { running: true },
            opened(CH1, false),
            Event::frame(CH1, "JOB_COMPLETED::Foo_Result.xlsx"),
        ],
    );
    assert_eq!(session.state(), JobState::Completed);
    assert_eq!(count_close(&effects), 1);
}

// --- properties ---

fn terminal_notices(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| {
            matches!(
                e,
                Effect::Notify { notice: Notice::Completed { .. } | Notice::Failed { .. } }
            )
        })
        .count()
}

proptest! {
    #[test]
    fn at_most_one_terminal_transition(frames in strategies::arb_frames(40)) {
        let events: Vec<Event> = frames.iter().map(|f| Event::frame(CH1, f.clone())).collect();
        let (session, effects) = run_events(running_session("Foo.py"), &events);

        let sentinels = frames.iter().filter(|f| crate::Frame::parse(f).is_terminal()).count();
        let expected = usize::from(sentinels > 0);
        prop_assert_eq!(terminal_notices(&effects), expected);
        prop_assert_eq!(count_close(&effects), expected);
        prop_assert_eq!(session.state().is_terminal(), sentinels > 0);
        prop_assert_eq!(effects.iter().filter(|e| **e == Effect::MarkIdle).count(), expected);
    }

    #[test]
    fn frames_after_terminal_are_noops(frames in strategies::arb_frames(20)) {
        let (done, _) = run_events(
            running_session("Foo.py"),
            &[Event::frame(CH1, "JOB_COMPLETED::Foo_Result.xlsx")],
        );
        let events: Vec<Event> = frames.iter().map(|f| Event::frame(CH1, f.clone())).collect();
        let (after, effects) = run_events(done.clone(), &events);
        prop_assert!(effects.is_empty());
        prop_assert_eq!(after, done);
    }
}
