// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job controller: the event loop around the pure state machine.
//!
//! Events are pulled from one queue and handled one at a time. Each is
//! dispatched through [`sj_core::dispatch`]; the resulting effects are
//! executed in order, and any event an effect produces is handled before
//! the next queued one.

use crate::executor::{ExecuteError, Executor};
use sj_adapters::{Console, ScriptApi, SessionStore, Transport};
use sj_core::{dispatch, Event, ExecuteRequest, JobSession, JobState};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Capacity of the controller's event queue
const EVENT_QUEUE: usize = 256;

/// Adapters the controller drives
pub struct ControllerDeps<S, A, T, C> {
    pub store: S,
    pub api: Arc<A>,
    pub transport: T,
    pub console: C,
}

/// Cloneable handle for injecting user actions into a running loop (e.g.
/// from a Ctrl-C handler while [`JobController::run_until_settled`] owns
/// the controller).
#[derive(Clone)]
pub struct ControllerHandle {
    event_tx: mpsc::Sender<Event>,
    state: watch::Receiver<JobState>,
}

impl ControllerHandle {
    /// State after the last event the loop handled.
    pub fn state(&self) -> JobState {
        *self.state.borrow()
    }

    pub async fn request_cancel(&self) {
        let _ = self.event_tx.send(Event::CancelRequested).await;
    }

    pub async fn force_reset(&self) {
        let _ = self.event_tx.send(Event::ForceReset).await;
    }
}

pub struct JobController<S, A, T, C> {
    session: JobSession,
    executor: Executor<S, A, T, C>,
    event_tx: mpsc::Sender<Event>,
    event_rx: mpsc::Receiver<Event>,
    state_tx: watch::Sender<JobState>,
}

impl<S, A, T, C> JobController<S, A, T, C>
where
    S: SessionStore,
    A: ScriptApi,
    T: Transport,
    C: Console,
{
    /// Build a controller for the persisted client identity, creating the
    /// identity on first use.
    pub fn new(deps: ControllerDeps<S, A, T, C>) -> Result<Self, ExecuteError> {
        let client_id = deps.store.ensure_identity()?;
        tracing::debug!(%client_id, "controller ready");
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE);
        let executor =
            Executor::new(deps.store, deps.api, deps.transport, deps.console, event_tx.clone());
        let session = JobSession::new(client_id);
        let (state_tx, _) = watch::channel(session.state());
        Ok(Self { session, executor, event_tx, event_rx, state_tx })
    }

    pub fn session(&self) -> &JobSession {
        &self.session
    }

    pub fn state(&self) -> JobState {
        self.session.state()
    }

    pub fn executor(&self) -> &Executor<S, A, T, C> {
        &self.executor
    }

    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle { event_tx: self.event_tx.clone(), state: self.state_tx.subscribe() }
    }

    /// Start a job, discarding whatever the previous one was doing.
    pub async fn start(&mut self, request: ExecuteRequest) {
        self.process(Event::Start { request }).await;
    }

    /// Ask the server to stop the running job. Ignored unless `Running`.
    pub async fn request_cancel(&mut self) {
        self.process(Event::CancelRequested).await;
    }

    /// Drop the job locally from any state and clear the running flag.
    pub async fn force_reset(&mut self) {
        self.process(Event::ForceReset).await;
    }

    /// Check a running flag left by a previous process against the server.
    pub async fn reconcile_on_load(&mut self) -> Result<(), ExecuteError> {
        let record = self.executor.store().read()?;
        match record {
            Some(record) if record.running => self.process(Event::Reconcile { record }).await,
            _ => tracing::debug!("no job to reconcile"),
        }
        Ok(())
    }

    /// Handle one event and everything it causes.
    pub async fn process(&mut self, event: Event) {
        if matches!(event, Event::ExecuteAccepted { .. } | Event::ExecuteRejected { .. }) {
            self.executor.execute_answered();
        }
        let mut pending = VecDeque::from([event]);
        while let Some(event) = pending.pop_front() {
            let (next, effects) = dispatch(&self.session, &event);
            if next.state() != self.session.state() {
                tracing::info!(
                    from = %self.session.state(),
                    to = %next.state(),
                    "{}",
                    event.log_summary()
                );
            } else {
                tracing::debug!("{}", event.log_summary());
            }
            self.session = next;
            self.state_tx.send_replace(self.session.state());

            // Store failures are logged by the executor; the job goes on.
            for effect in effects {
                if let Ok(Some(feedback)) = self.executor.execute(effect).await {
                    pending.push_back(feedback);
                }
            }
        }
    }

    /// No further event can change the job: it is active but its channel is
    /// gone and no execute response is outstanding.
    pub fn is_detached(&self) -> bool {
        self.session.state().is_active()
            && !self.session.is_channel_open()
            && !self.executor.execute_in_flight()
    }

    /// Process queued events until the job settles or detaches.
    ///
    /// Returns the final state. A detached job is still active: it may be
    /// running server-side, and a later `reconcile_on_load` can reattach.
    pub async fn run_until_settled(&mut self) -> JobState {
        loop {
            if self.session.is_settled() {
                break;
            }
            if self.is_detached() {
                tracing::info!(state = %self.session.state(), "job detached from its channel");
                break;
            }
            match self.event_rx.recv().await {
                Some(event) => self.process(event).await,
                None => break,
            }
        }
        self.session.state()
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
