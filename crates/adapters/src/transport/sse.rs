// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server-sent events channel: `GET /api/logs/{client}`.

use super::slot::ChannelSlot;
use super::{emit, Transport, TransportError};
use crate::api::http::endpoint;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use sj_core::{ChannelEvent, ChannelSeq, ClientId, Event};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Push-strategy transport. The stream carries frames only; the execute
/// acknowledgement is what confirms the job.
pub struct SseTransport {
    client: Client,
    base: Url,
    slot: Arc<ChannelSlot>,
}

impl SseTransport {
    pub fn new(base: &str) -> Result<Self, TransportError> {
        let base = Url::parse(base).map_err(|e| TransportError::Url(format!("{base}: {e}")))?;
        // No overall timeout: the stream lives as long as the job.
        let client = Client::builder().build().map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client, base, slot: Arc::new(ChannelSlot::default()) })
    }
}

#[async_trait]
impl Transport for SseTransport {
    async fn open(
        &self,
        client_id: &ClientId,
        seq: ChannelSeq,
        events: mpsc::Sender<Event>,
    ) -> Result<(), TransportError> {
        let url = endpoint(&self.base, &["api", "logs", client_id.as_str()])
            .ok_or_else(|| TransportError::Url(self.base.to_string()))?;
        let shutdown_rx = self.slot.replace(seq);
        let slot = Arc::clone(&self.slot);
        let client = self.client.clone();
        tokio::spawn(async move {
            sse_bridge(client, url, seq, events, shutdown_rx).await;
            slot.finished(seq);
        });
        Ok(())
    }

    fn close(&self, seq: ChannelSeq) {
        if self.slot.close(seq) {
            tracing::debug!(%seq, "sse channel closed");
        }
    }

    fn is_open(&self) -> bool {
        self.slot.is_open()
    }

    fn confirms_attachment(&self) -> bool {
        false
    }
}

/// Background task: read the event stream and forward each `data` payload.
async fn sse_bridge(
    client: Client,
    url: Url,
    seq: ChannelSeq,
    events: mpsc::Sender<Event>,
    shutdown_rx: oneshot::Receiver<()>,
) {
    let mut shutdown_rx = shutdown_rx;

    let request = client.get(url.clone()).header(ACCEPT, "text/event-stream").send();
    let response = tokio::select! {
        response = request => response,
        _ = &mut shutdown_rx => return,
    };
    let response = match response {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            let reason = format!("log stream refused: HTTP {}", r.status().as_u16());
            tracing::warn!(%seq, %url, %reason, "sse connect failed");
            emit(&events, seq, ChannelEvent::Fault { reason }).await;
            return;
        }
        Err(e) => {
            tracing::warn!(%seq, %url, error = %e, "sse connect failed");
            emit(&events, seq, ChannelEvent::Fault { reason: e.to_string() }).await;
            return;
        }
    };

    tracing::info!(%seq, %url, "sse channel connected");
    if !emit(&events, seq, ChannelEvent::Opened { attached: false }).await {
        return;
    }

    let mut stream = response.bytes_stream();
    let mut decoder = SseDecoder::default();
    loop {
        tokio::select! {
            chunk = stream.next() => match chunk {
                Some(Ok(bytes)) => {
                    let frames = match decoder.feed(&bytes) {
                        Ok(frames) => frames,
                        Err(e) => {
                            tracing::warn!(%seq, error = %e, "sse stream rejected");
                            emit(&events, seq, ChannelEvent::Fault { reason: e.to_string() }).await;
                            break;
                        }
                    };
                    for text in frames {
                        if !emit(&events, seq, ChannelEvent::Frame { text }).await {
                            return;
                        }
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(%seq, error = %e, "sse stream error");
                    emit(&events, seq, ChannelEvent::Fault { reason: e.to_string() }).await;
                    break;
                }
                None => {
                    tracing::info!(%seq, "sse stream ended");
                    emit(&events, seq, ChannelEvent::Closed).await;
                    break;
                }
            },
            _ = &mut shutdown_rx => break,
        }
    }
}

/// Longest line, or multi-line event, the decoder buffers before giving up
pub const MAX_EVENT_BYTES: usize = 1024 * 1024;

/// The stream sent more than the decoder's limit without completing a line
/// or event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("log stream event exceeds {limit} bytes")]
pub struct EventTooLong {
    pub limit: usize,
}

/// Incremental `text/event-stream` decoder.
///
/// Yields the `data` of each dispatched event. Multi-line data is joined with
/// `\n`; comments and the `event`, `id` and `retry` fields are ignored. An
/// event not terminated by a blank line before the stream ends is dropped.
#[derive(Debug)]
pub struct SseDecoder {
    buf: Vec<u8>,
    data: Option<String>,
    limit: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_limit(MAX_EVENT_BYTES)
    }
}

impl SseDecoder {
    pub fn with_limit(limit: usize) -> Self {
        Self { buf: Vec::new(), data: None, limit }
    }

    /// Feed raw bytes; returns the events completed by them.
    ///
    /// Fails once a single line or a pending event outgrows the limit. The
    /// decoder is not usable afterwards.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<String>, EventTooLong> {
        self.buf.extend_from_slice(bytes);
        let mut out = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            if pos > self.limit {
                return Err(EventTooLong { limit: self.limit });
            }
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(data) = self.line(&line) {
                out.push(data);
            }
            if self.data.as_ref().is_some_and(|d| d.len() > self.limit) {
                return Err(EventTooLong { limit: self.limit });
            }
        }
        if self.buf.len() > self.limit {
            return Err(EventTooLong { limit: self.limit });
        }
        Ok(out)
    }

    fn line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.data.take();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            match self.data {
                Some(ref mut data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;
