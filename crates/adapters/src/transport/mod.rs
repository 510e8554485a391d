// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live log channel to the script server.
//!
//! A transport delivers the ordered text frames of one client's job as
//! [`ChannelEvent`]s tagged with the channel's [`ChannelSeq`]. At most one
//! channel is open per transport; opening a new one tears down the old one
//! first. Faults are reported, never retried.

mod slot;
mod sse;
mod ws;

pub use sse::{EventTooLong, SseDecoder, SseTransport, MAX_EVENT_BYTES};
pub use ws::WsTransport;

use async_trait::async_trait;
use sj_core::{ChannelEvent, ChannelSeq, ClientId, Event};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors raised before a channel task could be started
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid stream URL: {0}")]
    Url(String),
    #[error("client setup failed: {0}")]
    Client(String),
}

/// Which stream endpoint to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportKind {
    /// Server-sent events; the execute acknowledgement confirms the job
    #[default]
    Sse,
    /// WebSocket; opening the socket confirms attachment
    Ws,
}

impl std::str::FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sse" => Ok(TransportKind::Sse),
            "ws" | "websocket" => Ok(TransportKind::Ws),
            other => Err(format!("unknown transport '{other}' (expected sse or ws)")),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TransportKind::Sse => "sse",
            TransportKind::Ws => "ws",
        })
    }
}

/// Log channel backend
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Open the channel for `client_id`, closing any open one first.
    ///
    /// Returns once the background task is started. Connection success is
    /// reported as [`ChannelEvent::Opened`], failure as [`ChannelEvent::Fault`].
    async fn open(
        &self,
        client_id: &ClientId,
        seq: ChannelSeq,
        events: mpsc::Sender<Event>,
    ) -> Result<(), TransportError>;

    /// Release channel `seq`. No-op if it is not the open one.
    fn close(&self, seq: ChannelSeq);

    fn is_open(&self) -> bool;

    /// Whether a successful open by itself means the job is attached.
    fn confirms_attachment(&self) -> bool;
}

/// Backend chosen at runtime
#[async_trait]
impl Transport for Box<dyn Transport> {
    async fn open(
        &self,
        client_id: &ClientId,
        seq: ChannelSeq,
        events: mpsc::Sender<Event>,
    ) -> Result<(), TransportError> {
        (**self).open(client_id, seq, events).await
    }

    fn close(&self, seq: ChannelSeq) {
        (**self).close(seq)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn confirms_attachment(&self) -> bool {
        (**self).confirms_attachment()
    }
}

/// Forward one channel event. Returns false once the receiver is gone.
pub(crate) async fn emit(events: &mpsc::Sender<Event>, seq: ChannelSeq, event: ChannelEvent) -> bool {
    events.send(Event::Channel { seq, event }).await.is_ok()
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{Transport, TransportError};
    use crate::journal::Journal;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use sj_core::{ChannelEvent, ChannelSeq, ClientId, Event};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    /// Recorded transport call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum TransportCall {
        Open { client_id: ClientId, seq: ChannelSeq },
        Close { seq: ChannelSeq },
    }

    struct FakeTransportState {
        calls: Vec<TransportCall>,
        current: Option<ChannelSeq>,
        senders: HashMap<ChannelSeq, mpsc::Sender<Event>>,
        /// Frames delivered right after `Opened` on the next open
        scripted: Vec<String>,
        open_fault: Option<String>,
    }

    /// Scripted transport for testing
    #[derive(Clone)]
    pub struct FakeTransport {
        inner: Arc<Mutex<FakeTransportState>>,
        attached: bool,
        journal: Journal,
    }

    impl Default for FakeTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FakeTransport {
        /// Push-strategy fake: opening does not confirm attachment.
        pub fn new() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeTransportState {
                    calls: Vec::new(),
                    current: None,
                    senders: HashMap::new(),
                    scripted: Vec::new(),
                    open_fault: None,
                })),
                attached: false,
                journal: Journal::default(),
            }
        }

        /// Duplex-strategy fake: opening confirms attachment.
        pub fn duplex() -> Self {
            Self { attached: true, ..Self::new() }
        }

        pub fn with_journal(mut self, journal: Journal) -> Self {
            self.journal = journal;
            self
        }

        pub fn calls(&self) -> Vec<TransportCall> {
            self.inner.lock().calls.clone()
        }

        pub fn open_count(&self) -> usize {
            self.calls().iter().filter(|c| matches!(c, TransportCall::Open { .. })).count()
        }

        pub fn close_count(&self, seq: ChannelSeq) -> usize {
            self.calls().iter().filter(|c| **c == TransportCall::Close { seq }).count()
        }

        pub fn current(&self) -> Option<ChannelSeq> {
            self.inner.lock().current
        }

        /// Frames to deliver, in order, right after the next open.
        pub fn script_frames<I, S>(&self, frames: I)
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.inner.lock().scripted = frames.into_iter().map(Into::into).collect();
        }

        /// Make the next open fail with this reason.
        pub fn fail_next_open(&self, reason: &str) {
            self.inner.lock().open_fault = Some(reason.to_string());
        }

        /// Deliver a frame on the open channel.
        pub fn push_frame(&self, text: &str) -> bool {
            match self.current() {
                Some(seq) => self.push_frame_on(seq, text),
                None => false,
            }
        }

        /// Deliver a frame tagged with `seq`, open or not (late delivery).
        pub fn push_frame_on(&self, seq: ChannelSeq, text: &str) -> bool {
            self.send(seq, ChannelEvent::Frame { text: text.to_string() })
        }

        /// Break the open channel.
        pub fn fault(&self, reason: &str) -> bool {
            match self.current() {
                Some(seq) => self.send(seq, ChannelEvent::Fault { reason: reason.to_string() }),
                None => false,
            }
        }

        /// End the open channel's stream from the server side.
        pub fn end(&self) -> bool {
            match self.current() {
                Some(seq) => self.send(seq, ChannelEvent::Closed),
                None => false,
            }
        }

        fn send(&self, seq: ChannelSeq, event: ChannelEvent) -> bool {
            let sender = self.inner.lock().senders.get(&seq).cloned();
            sender.is_some_and(|tx| tx.try_send(Event::Channel { seq, event }).is_ok())
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn open(
            &self,
            client_id: &ClientId,
            seq: ChannelSeq,
            events: mpsc::Sender<Event>,
        ) -> Result<(), TransportError> {
            self.journal.push(format!("transport:open {seq}"));
            let (scripted, fault) = {
                let mut inner = self.inner.lock();
                inner.calls.push(TransportCall::Open { client_id: client_id.clone(), seq });
                inner.current = Some(seq);
                inner.senders.insert(seq, events.clone());
                (std::mem::take(&mut inner.scripted), inner.open_fault.take())
            };

            if let Some(reason) = fault {
                self.inner.lock().current = None;
                let _ = events.send(Event::Channel { seq, event: ChannelEvent::Fault { reason } }).await;
                return Ok(());
            }

            let _ = events
                .send(Event::Channel { seq, event: ChannelEvent::Opened { attached: self.attached } })
                .await;
            for text in scripted {
                let _ = events.send(Event::Channel { seq, event: ChannelEvent::Frame { text } }).await;
            }
            Ok(())
        }

        fn close(&self, seq: ChannelSeq) {
            self.journal.push(format!("transport:close {seq}"));
            let mut inner = self.inner.lock();
            inner.calls.push(TransportCall::Close { seq });
            if inner.current == Some(seq) {
                inner.current = None;
            }
        }

        fn is_open(&self) -> bool {
            self.inner.lock().current.is_some()
        }

        fn confirms_attachment(&self) -> bool {
            self.attached
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTransport, TransportCall};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
