// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket channel: `/ws/{client}`.
//!
//! Duplex strategy: once the socket is accepted the server is streaming this
//! client's job, so the open itself confirms attachment. Only `ws://` is
//! supported.

use super::slot::ChannelSlot;
use super::{emit, Transport, TransportError};
use crate::api::http::endpoint;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Url;
use sj_core::{ChannelEvent, ChannelSeq, ClientId, Event};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;

pub struct WsTransport {
    base: Url,
    slot: Arc<ChannelSlot>,
}

impl WsTransport {
    /// `base` is the server's HTTP URL; the scheme is switched to `ws`.
    pub fn new(base: &str) -> Result<Self, TransportError> {
        let mut base = Url::parse(base).map_err(|e| TransportError::Url(format!("{base}: {e}")))?;
        let scheme = match base.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => return Err(TransportError::Url(format!("unsupported scheme '{other}'"))),
        };
        base.set_scheme(scheme).map_err(|()| TransportError::Url(base.to_string()))?;
        Ok(Self { base, slot: Arc::new(ChannelSlot::default()) })
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn open(
        &self,
        client_id: &ClientId,
        seq: ChannelSeq,
        events: mpsc::Sender<Event>,
    ) -> Result<(), TransportError> {
        let url = endpoint(&self.base, &["ws", client_id.as_str()])
            .ok_or_else(|| TransportError::Url(self.base.to_string()))?;
        let shutdown_rx = self.slot.replace(seq);
        let slot = Arc::clone(&self.slot);
        tokio::spawn(async move {
            ws_bridge(url, seq, events, shutdown_rx).await;
            slot.finished(seq);
        });
        Ok(())
    }

    fn close(&self, seq: ChannelSeq) {
        if self.slot.close(seq) {
            tracing::debug!(%seq, "ws channel closed");
        }
    }

    fn is_open(&self) -> bool {
        self.slot.is_open()
    }

    fn confirms_attachment(&self) -> bool {
        true
    }
}

/// Background task: forward each text message as a frame.
async fn ws_bridge(
    url: Url,
    seq: ChannelSeq,
    events: mpsc::Sender<Event>,
    shutdown_rx: oneshot::Receiver<()>,
) {
    let mut shutdown_rx = shutdown_rx;

    let connect = tokio_tungstenite::connect_async(url.as_str());
    let connected = tokio::select! {
        connected = connect => connected,
        _ = &mut shutdown_rx => return,
    };
    let mut ws = match connected {
        Ok((ws, _)) => ws,
        Err(e) => {
            tracing::warn!(%seq, %url, error = %e, "ws connect failed");
            emit(&events, seq, ChannelEvent::Fault { reason: e.to_string() }).await;
            return;
        }
    };

    tracing::info!(%seq, %url, "ws channel connected");
    if !emit(&events, seq, ChannelEvent::Opened { attached: true }).await {
        return;
    }

    loop {
        tokio::select! {
            msg = ws.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if !emit(&events, seq, ChannelEvent::Frame { text: text.as_str().to_string() }).await {
                        break;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(%seq, ?frame, "ws channel: received close frame");
                    emit(&events, seq, ChannelEvent::Closed).await;
                    return;
                }
                None => {
                    tracing::info!(%seq, "ws channel: stream ended");
                    emit(&events, seq, ChannelEvent::Closed).await;
                    return;
                }
                Some(Err(e)) => {
                    tracing::warn!(%seq, error = %e, "ws channel: error");
                    emit(&events, seq, ChannelEvent::Fault { reason: e.to_string() }).await;
                    return;
                }
                _ => {} // ping, pong and binary frames carry no log text
            },
            _ = &mut shutdown_rx => break,
        }
    }

    let _ = ws.close(None).await;
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
