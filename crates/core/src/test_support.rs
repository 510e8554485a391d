// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{ChannelSeq, ClientId, Effect, Event, ExecuteRequest, JobSession};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for raw log frames.
pub mod strategies {
    use proptest::prelude::*;

    /// A frame that is plain text, a completion sentinel, a failure
    /// sentinel, or a malformed sentinel.
    pub fn arb_raw_frame() -> impl Strategy<Value = String> {
        prop_oneof![
            4 => "[a-z0-9 %:]{0,24}",
            1 => "[A-Za-z0-9_.]{1,12}".prop_map(|name| format!("JOB_COMPLETED::{name}")),
            1 => "[A-Za-z0-9 ]{1,16}".prop_map(|reason| format!("JOB_FAILED::{reason}")),
            1 => Just("JOB_COMPLETED::".to_string()),
        ]
    }

    pub fn arb_frames(max: usize) -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec(arb_raw_frame(), 0..max)
    }
}

// ── Factories ───────────────────────────────────────────────────────────

pub fn client() -> ClientId {
    ClientId::new("client_c1")
}

pub fn start_event(script: &str) -> Event {
    Event::Start { request: ExecuteRequest::new(script, client()) }
}

/// Feed events through the machine, collecting every effect produced.
pub fn run_events(session: JobSession, events: &[Event]) -> (JobSession, Vec<Effect>) {
    let mut session = session;
    let mut all = Vec::new();
    for event in events {
        let (next, effects) = crate::machine::dispatch(&session, event);
        session = next;
        all.extend(effects);
    }
    (session, all)
}

/// A session that has started `script` and whose channel `ch-1` is open.
pub fn connected_session(script: &str) -> JobSession {
    let (session, _) = run_events(
        JobSession::new(client()),
        &[
            start_event(script),
            Event::Channel {
                seq: ChannelSeq(1),
                event: crate::ChannelEvent::Opened { attached: false },
            },
        ],
    );
    session
}

/// A session in `Running` on channel `ch-1` (push strategy, execute queued).
pub fn running_session(script: &str) -> JobSession {
    let (session, _) = run_events(
        connected_session(script),
        &[Event::ExecuteAccepted {
            seq: ChannelSeq(1),
            outcome: crate::ExecuteOutcome::Queued { message: "queued".to_string() },
        }],
    );
    session
}
