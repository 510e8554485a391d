// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod attach;
pub mod download;
pub mod reset;
pub mod run;
pub mod scripts;
pub mod status;
pub mod stop;
pub mod template;
pub mod upload;

use crate::console::TerminalConsole;
use crate::exit_error::ExitError;
use sj_adapters::{
    FileSessionStore, HttpScriptApi, SseTransport, Transport, TransportKind, WsTransport,
};
use sj_engine::{ControllerDeps, JobController};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Controller wired to the real adapters
pub type Controller =
    JobController<FileSessionStore, HttpScriptApi, Box<dyn Transport>, TerminalConsole>;

/// Resolved configuration shared by all commands
#[derive(Debug, Clone)]
pub struct Context {
    pub server: String,
    pub transport: TransportKind,
    pub timeout: Duration,
    pub state_dir: PathBuf,
}

impl Context {
    pub fn api(&self) -> Result<HttpScriptApi, ExitError> {
        HttpScriptApi::new(&self.server, self.timeout).map_err(|e| ExitError::usage(e.to_string()))
    }

    pub fn store(&self) -> FileSessionStore {
        FileSessionStore::in_dir(&self.state_dir)
    }

    fn transport(&self) -> Result<Box<dyn Transport>, ExitError> {
        let transport: Box<dyn Transport> = match self.transport {
            TransportKind::Sse => Box::new(SseTransport::new(&self.server).map_err(usage)?),
            TransportKind::Ws => Box::new(WsTransport::new(&self.server).map_err(usage)?),
        };
        Ok(transport)
    }

    /// Controller for this client's persisted identity.
    pub fn controller(&self, api: Arc<HttpScriptApi>) -> Result<Controller, ExitError> {
        let deps = ControllerDeps {
            store: self.store(),
            api,
            transport: self.transport()?,
            console: TerminalConsole,
        };
        JobController::new(deps).map_err(|e| ExitError::failed(e.to_string()))
    }
}

fn usage(e: impl std::fmt::Display) -> ExitError {
    ExitError::usage(e.to_string())
}

/// Map an API failure to an exit error, keeping the server's detail.
pub fn api_failed(e: sj_adapters::ApiError) -> ExitError {
    ExitError::failed(e.detail())
}
