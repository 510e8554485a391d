// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bookkeeping for the single open channel of a transport.

use parking_lot::Mutex;
use sj_core::ChannelSeq;
use tokio::sync::oneshot;

struct OpenChannel {
    seq: ChannelSeq,
    shutdown_tx: oneshot::Sender<()>,
}

/// Holds the shutdown handle of the channel task currently running.
#[derive(Default)]
pub(crate) struct ChannelSlot {
    current: Mutex<Option<OpenChannel>>,
}

impl ChannelSlot {
    /// Register channel `seq`, shutting down whatever was open before.
    pub(crate) fn replace(&self, seq: ChannelSeq) -> oneshot::Receiver<()> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let previous = self.current.lock().replace(OpenChannel { seq, shutdown_tx });
        if let Some(previous) = previous {
            tracing::info!(seq = %previous.seq, next = %seq, "closing superseded channel");
            let _ = previous.shutdown_tx.send(());
        }
        shutdown_rx
    }

    /// Shut down channel `seq` if it is the open one.
    pub(crate) fn close(&self, seq: ChannelSeq) -> bool {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|c| c.seq == seq) {
            if let Some(open) = current.take() {
                let _ = open.shutdown_tx.send(());
            }
            return true;
        }
        false
    }

    /// The task for `seq` ended on its own.
    pub(crate) fn finished(&self, seq: ChannelSeq) {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|c| c.seq == seq) {
            *current = None;
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.current.lock().is_some()
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
