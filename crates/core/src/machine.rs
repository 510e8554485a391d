// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job state machine.
//!
//! [`dispatch`] is pure: it takes the current session and one event and
//! returns the next session plus the effects to run, in order. All I/O lives
//! in the driver that executes those effects.
//!
//! Invariants held here:
//! - at most one channel is open; `start` closes the previous one first
//! - a job sees exactly one terminal transition; later sentinels are ignored
//! - every opened channel is closed exactly once
//! - events tagged with a channel other than the current one are ignored
//! - execute answers count only for the start that submitted them

use crate::effect::Effect;
use crate::event::{ChannelEvent, Event};
use crate::frame::Frame;
use crate::job::{ChannelSeq, ExecuteOutcome, JobSession, JobState};
use crate::notice::Notice;

/// Compute the next session and the effects for one event.
pub fn dispatch(session: &JobSession, event: &Event) -> (JobSession, Vec<Effect>) {
    let mut next = session.clone();
    let mut effects = Vec::new();

    match event {
        Event::Start { request } => {
            // Hard reset: whatever the previous job was doing is discarded.
            close_channel(&mut next, &mut effects);
            let mut request = request.clone();
            request.client_id = next.client_id.clone();
            let script = request.script_name.clone();

            next.state = JobState::Connecting;
            next.script = Some(script.clone());
            next.result_artifact = None;
            next.failure_reason = None;
            next.reconciling = false;

            effects.push(Effect::ClearHistory { client_id: next.client_id.clone() });
            effects.push(Effect::MarkRunning { script });
            effects.push(Effect::Notify { notice: Notice::Connecting });
            let seq = next.allocate_channel();
            effects.push(Effect::OpenChannel { client_id: next.client_id.clone(), seq });
            next.pending_submit = Some(request);
            next.execute_seq = Some(seq);
        }

        Event::HistoryClearFailed { error } => {
            if next.state == JobState::Connecting {
                effects.push(Effect::Notify {
                    notice: Notice::HistoryNotCleared { error: error.clone() },
                });
            }
        }

        Event::ExecuteAccepted { seq, .. } | Event::ExecuteRejected { seq, .. }
            if next.execute_seq != Some(*seq) => {}

        Event::ExecuteAccepted { outcome, .. } => match outcome {
            ExecuteOutcome::Queued { message } => {
                if next.state == JobState::Connecting {
                    next.state = JobState::Running;
                }
                if next.state.is_active() && !message.is_empty() {
                    effects.push(Effect::Notify { notice: Notice::Queued { message: message.clone() } });
                }
            }
            ExecuteOutcome::Finished { artifact } => complete(&mut next, &mut effects, artifact),
        },

        Event::ExecuteRejected { detail, .. } => {
            // A rejection after the job already ended (e.g. an error response
            // following a failure sentinel) changes nothing.
            if next.state.is_active() {
                close_channel(&mut next, &mut effects);
                next.state = JobState::Idle;
                next.script = None;
                next.pending_submit = None;
                effects.push(Effect::MarkIdle);
                effects.push(Effect::Notify {
                    notice: Notice::ExecutionRejected { detail: detail.clone() },
                });
            }
        }

        Event::CancelRequested => {
            if next.state == JobState::Running {
                next.state = JobState::Cancelling;
                effects.push(Effect::SendStop { client_id: next.client_id.clone() });
            }
        }

        Event::StopAcknowledged => {
            if next.state == JobState::Cancelling {
                effects.push(Effect::Notify { notice: Notice::StopRequested });
            }
        }

        Event::StopFailed { error } => {
            if next.state == JobState::Cancelling {
                effects.push(Effect::Notify { notice: Notice::StopFailed { error: error.clone() } });
            }
        }

        Event::ForceReset => {
            close_channel(&mut next, &mut effects);
            next.state = JobState::Idle;
            next.script = None;
            next.result_artifact = None;
            next.failure_reason = None;
            next.pending_submit = None;
            next.execute_seq = None;
            next.reconciling = false;
            effects.push(Effect::MarkIdle);
            effects.push(Effect::Notify { notice: Notice::Reset });
        }

        Event::Reconcile { record } => {
            if record.running && next.state == JobState::Idle && !next.reconciling {
                next.reconciling = true;
                next.script = record.running_script.clone();
                effects.push(Effect::QueryStatus { client_id: next.client_id.clone() });
            }
        }

        Event::StatusReported { running } => {
            if next.reconciling {
                next.reconciling = false;
                if *running {
                    // Reattach to the live job; the execute request is not resent.
                    next.state = JobState::Running;
                    effects.push(Effect::Notify {
                        notice: Notice::Resuming { script: next.script.clone() },
                    });
                    let seq = next.allocate_channel();
                    effects.push(Effect::OpenChannel { client_id: next.client_id.clone(), seq });
                } else {
                    next.script = None;
                    effects.push(Effect::MarkIdle);
                    effects.push(Effect::Notify { notice: Notice::SessionLost });
                }
            }
        }

        Event::StatusUnavailable { error } => {
            // Server unreachable: the persisted flag can be neither confirmed
            // nor cleared, so it stays for the next startup to check.
            if next.reconciling {
                next.reconciling = false;
                next.script = None;
                effects.push(Effect::Notify {
                    notice: Notice::StatusCheckFailed { error: error.clone() },
                });
            }
        }

        Event::Channel { seq, event } => {
            if next.channel == Some(*seq) {
                on_channel(&mut next, &mut effects, *seq, event);
            }
        }
    }

    (next, effects)
}

fn on_channel(next: &mut JobSession, effects: &mut Vec<Effect>, seq: ChannelSeq, event: &ChannelEvent) {
    match event {
        ChannelEvent::Opened { attached } => {
            if let Some(request) = next.pending_submit.take() {
                effects.push(Effect::SubmitExecute { request, seq });
            }
            if *attached && next.state == JobState::Connecting {
                next.state = JobState::Running;
            }
        }
        ChannelEvent::Frame { text } => match Frame::parse(text) {
            Frame::Plain(line) => {
                if next.state.is_active() {
                    effects.push(Effect::Print { line });
                }
            }
            Frame::Completed(artifact) => complete(next, effects, &artifact),
            Frame::Failed(reason) => fail(next, effects, &reason),
        },
        ChannelEvent::Fault { reason } => lose_channel(next, effects, seq, reason),
        ChannelEvent::Closed => {
            lose_channel(next, effects, seq, "stream ended before the job reported a result")
        }
    }
}

/// Terminal success. Ignored unless a job is in flight.
fn complete(next: &mut JobSession, effects: &mut Vec<Effect>, artifact: &str) {
    if !next.state.is_active() {
        return;
    }
    next.state = JobState::Completed;
    next.result_artifact = Some(artifact.to_string());
    next.pending_submit = None;
    effects.push(Effect::MarkIdle);
    close_channel(next, effects);
    effects.push(Effect::Notify { notice: Notice::Completed { artifact: artifact.to_string() } });
    effects.push(Effect::ArtifactReady { name: artifact.to_string() });
}

/// Terminal failure. Ignored unless a job is in flight.
fn fail(next: &mut JobSession, effects: &mut Vec<Effect>, reason: &str) {
    if !next.state.is_active() {
        return;
    }
    next.state = JobState::Failed;
    next.failure_reason = Some(reason.to_string());
    next.pending_submit = None;
    effects.push(Effect::MarkIdle);
    close_channel(next, effects);
    effects.push(Effect::Notify { notice: Notice::Failed { reason: reason.to_string() } });
}

/// The current channel died without a terminal frame. The job state is left
/// alone: the job may still be running server-side.
fn lose_channel(next: &mut JobSession, effects: &mut Vec<Effect>, seq: ChannelSeq, reason: &str) {
    next.channel = None;
    next.pending_submit = None;
    effects.push(Effect::CloseChannel { seq });
    if next.state.is_active() {
        effects.push(Effect::Notify {
            notice: Notice::TransportFault { reason: reason.to_string() },
        });
    }
}

fn close_channel(next: &mut JobSession, effects: &mut Vec<Effect>) {
    if let Some(seq) = next.channel.take() {
        effects.push(Effect::CloseChannel { seq });
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
