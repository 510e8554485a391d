// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session store: the persisted client identity and running intent.
//!
//! The store is the only state that survives a client restart. Every write is
//! persisted before the call returns, so an abrupt exit never loses a
//! `mark_running`.

mod file;

pub use file::FileSessionStore;

use sj_core::{ClientId, SessionRecord};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from session store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt session file {path}: {source} (delete it or run `sj reset` to start over)")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence boundary for the [`SessionRecord`].
pub trait SessionStore: Send + Sync + 'static {
    /// Return the client identity, creating and persisting one on first use.
    fn ensure_identity(&self) -> Result<ClientId, StoreError>;

    /// Record that a job for `script` is in flight.
    fn mark_running(&self, script: &str) -> Result<(), StoreError>;

    /// Clear the running flag and script name.
    fn mark_idle(&self) -> Result<(), StoreError>;

    /// Current record, or `None` before an identity was ever created.
    fn read(&self) -> Result<Option<SessionRecord>, StoreError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{SessionStore, StoreError};
    use parking_lot::Mutex;
    use sj_core::{ClientId, SessionRecord};
    use std::sync::Arc;

    /// In-memory session store for testing
    #[derive(Clone, Default)]
    pub struct FakeSessionStore {
        inner: Arc<Mutex<Option<SessionRecord>>>,
    }

    impl FakeSessionStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Start from an existing persisted record (simulates a restart).
        pub fn with_record(record: SessionRecord) -> Self {
            Self { inner: Arc::new(Mutex::new(Some(record))) }
        }

        pub fn record(&self) -> Option<SessionRecord> {
            self.inner.lock().clone()
        }

        pub fn is_running(&self) -> bool {
            self.inner.lock().as_ref().is_some_and(|r| r.running)
        }
    }

    impl SessionStore for FakeSessionStore {
        fn ensure_identity(&self) -> Result<ClientId, StoreError> {
            let mut inner = self.inner.lock();
            let record = inner.get_or_insert_with(|| SessionRecord::new(ClientId::generate()));
            Ok(record.client_id.clone())
        }

        fn mark_running(&self, script: &str) -> Result<(), StoreError> {
            let mut inner = self.inner.lock();
            inner
                .get_or_insert_with(|| SessionRecord::new(ClientId::generate()))
                .mark_running(script);
            Ok(())
        }

        fn mark_idle(&self) -> Result<(), StoreError> {
            if let Some(record) = self.inner.lock().as_mut() {
                record.mark_idle();
            }
            Ok(())
        }

        fn read(&self) -> Result<Option<SessionRecord>, StoreError> {
            Ok(self.inner.lock().clone())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSessionStore;
