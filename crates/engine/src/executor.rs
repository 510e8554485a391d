// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use sj_adapters::{Console, ScriptApi, SessionStore, StoreError, Transport};
use sj_core::{ChannelEvent, Effect, Event};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during effect execution
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
}

/// Executes effects using the configured adapters
pub struct Executor<S, A, T, C> {
    store: S,
    api: Arc<A>,
    transport: T,
    console: C,
    /// Queue the channel tasks and background requests report into
    event_tx: mpsc::Sender<Event>,
    /// Execute responses not yet taken off the queue
    in_flight: AtomicUsize,
}

impl<S, A, T, C> Executor<S, A, T, C>
where
    S: SessionStore,
    A: ScriptApi,
    T: Transport,
    C: Console,
{
    pub fn new(store: S, api: Arc<A>, transport: T, console: C, event_tx: mpsc::Sender<Event>) -> Self {
        Self { store, api, transport, console, event_tx, in_flight: AtomicUsize::new(0) }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether an execute response is still to be handled
    pub fn execute_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// The event loop dequeued an execute response.
    pub fn execute_answered(&self) {
        let _ = self.in_flight.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    /// Execute a single effect with tracing
    ///
    /// Returns an optional event that should be fed back into the event loop.
    pub async fn execute(&self, effect: Effect) -> Result<Option<Event>, ExecuteError> {
        // Format the fields as `key=val`
        let info = effect
            .fields()
            .into_iter()
            .map(|(key, val)| format!("{key}={val}"))
            .collect::<Vec<_>>()
            .join(" ");

        let op = effect.name();
        let verbose = effect.verbose();
        if verbose {
            tracing::info!("executing effect={} {}", op, info);
        }

        let start = std::time::Instant::now();
        let result = self.execute_inner(effect).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(event) if verbose => tracing::info!(
                event = event.as_ref().map(Event::name),
                elapsed_ms,
                "completed"
            ),
            Ok(_) => tracing::trace!(elapsed_ms, "executed effect={} {}", op, info),
            Err(e) => tracing::error!(error = %e, elapsed_ms, "failed effect={} {}", op, info),
        }

        result
    }

    async fn execute_inner(&self, effect: Effect) -> Result<Option<Event>, ExecuteError> {
        match effect {
            // === Session store ===
            Effect::MarkRunning { script } => {
                self.store.mark_running(&script)?;
                Ok(None)
            }

            Effect::MarkIdle => {
                self.store.mark_idle()?;
                Ok(None)
            }

            // === Channel ===
            Effect::OpenChannel { client_id, seq } => {
                match self.transport.open(&client_id, seq, self.event_tx.clone()).await {
                    Ok(()) => Ok(None),
                    Err(e) => Ok(Some(Event::Channel {
                        seq,
                        event: ChannelEvent::Fault { reason: e.to_string() },
                    })),
                }
            }

            Effect::CloseChannel { seq } => {
                self.transport.close(seq);
                Ok(None)
            }

            // === Requests ===
            Effect::ClearHistory { client_id } => match self.api.clear_history(&client_id).await {
                Ok(()) => Ok(None),
                Err(e) => {
                    tracing::warn!(%client_id, error = %e, "could not clear log history");
                    Ok(Some(Event::HistoryClearFailed { error: e.detail() }))
                }
            },

            Effect::SubmitExecute { request, seq } => {
                // The response may take as long as the job itself; it comes
                // back through the event queue.
                let api = Arc::clone(&self.api);
                let event_tx = self.event_tx.clone();
                self.in_flight.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let event = match api.execute(&request).await {
                        Ok(outcome) => Event::ExecuteAccepted { seq, outcome },
                        Err(e) => {
                            tracing::warn!(script = %request.script_name, error = %e, "execute rejected");
                            Event::ExecuteRejected { seq, detail: e.detail() }
                        }
                    };
                    let _ = event_tx.send(event).await;
                });
                Ok(None)
            }

            Effect::SendStop { client_id } => match self.api.stop(&client_id).await {
                Ok(()) => Ok(Some(Event::StopAcknowledged)),
                Err(e) => Ok(Some(Event::StopFailed { error: e.detail() })),
            },

            Effect::QueryStatus { client_id } => match self.api.status(&client_id).await {
                Ok(status) => Ok(Some(Event::StatusReported { running: status.is_running })),
                Err(e) => Ok(Some(Event::StatusUnavailable { error: e.detail() })),
            },

            // === Display ===
            Effect::Print { line } => {
                self.console.line(&line);
                Ok(None)
            }

            Effect::Notify { notice } => {
                self.console.notice(&notice);
                Ok(None)
            }

            Effect::ArtifactReady { name } => {
                self.console.artifact_ready(&name);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
