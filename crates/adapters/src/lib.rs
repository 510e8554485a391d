// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! I/O adapters for the script job client: session file, script server API,
//! log channel transports and the console port.

pub mod api;
pub mod console;
pub mod store;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod journal;

#[cfg(test)]
mod test_server;

pub use api::{ApiError, HttpScriptApi, JobStatus, ScriptApi, ScriptInfo, UploadReceipt};
pub use console::Console;
pub use store::{FileSessionStore, SessionStore, StoreError};
pub use transport::{SseTransport, Transport, TransportError, TransportKind, WsTransport};

// Test support exports
#[cfg(any(test, feature = "test-support"))]
pub use api::{ApiCall, FakeScriptApi};
#[cfg(any(test, feature = "test-support"))]
pub use console::{ConsoleEntry, FakeConsole};
#[cfg(any(test, feature = "test-support"))]
pub use journal::Journal;
#[cfg(any(test, feature = "test-support"))]
pub use store::FakeSessionStore;
#[cfg(any(test, feature = "test-support"))]
pub use transport::{FakeTransport, TransportCall};
