// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON file-backed session store.

use super::{SessionStore, StoreError};
use parking_lot::Mutex;
use sj_core::{ClientId, SessionRecord};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name inside the state directory
pub const SESSION_FILE: &str = "session.json";

/// Session store persisted as a small JSON document.
///
/// Writes go to a sibling temp file that is fsynced and renamed over the
/// target, so a crash mid-write leaves either the old or the new record.
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    /// Store at `<state_dir>/session.json`.
    pub fn in_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move an unreadable session file to `session.json.corrupt` so the next
    /// access starts from a fresh identity. Returns where it was moved.
    pub fn set_aside_corrupt(&self) -> Result<Option<PathBuf>, StoreError> {
        let _guard = self.lock.lock();
        match self.load() {
            Err(StoreError::Corrupt { source: error, .. }) => {
                let backup = self.path.with_extension("json.corrupt");
                fs::rename(&self.path, &backup)
                    .map_err(|source| StoreError::Io { path: self.path.clone(), source })?;
                tracing::warn!(path = %self.path.display(), %error, "set aside corrupt session file");
                Ok(Some(backup))
            }
            Err(e) => Err(e),
            Ok(_) => Ok(None),
        }
    }

    fn load(&self) -> Result<Option<SessionRecord>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path: self.path.clone(), source }),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { path: self.path.clone(), source })
    }

    fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_vec_pretty(record)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp).map_err(io_err)?;
            file.write_all(&json).map_err(io_err)?;
            file.sync_all().map_err(io_err)?;
        }
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    /// Load the record, creating a fresh identity if none exists, apply `f`
    /// and persist the result.
    fn update(&self, f: impl FnOnce(&mut SessionRecord)) -> Result<SessionRecord, StoreError> {
        let _guard = self.lock.lock();
        let mut record = match self.load()? {
            Some(record) => record,
            None => {
                let record = SessionRecord::new(ClientId::generate());
                tracing::info!(client_id = %record.client_id, path = %self.path.display(), "created client identity");
                record
            }
        };
        f(&mut record);
        self.save(&record)?;
        Ok(record)
    }
}

impl SessionStore for FileSessionStore {
    fn ensure_identity(&self) -> Result<ClientId, StoreError> {
        {
            let _guard = self.lock.lock();
            if let Some(record) = self.load()? {
                return Ok(record.client_id);
            }
        }
        self.update(|_| {}).map(|record| record.client_id)
    }

    fn mark_running(&self, script: &str) -> Result<(), StoreError> {
        self.update(|record| record.mark_running(script)).map(|_| ())
    }

    fn mark_idle(&self) -> Result<(), StoreError> {
        self.update(SessionRecord::mark_idle).map(|_| ())
    }

    fn read(&self) -> Result<Option<SessionRecord>, StoreError> {
        let _guard = self.lock.lock();
        self.load()
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
