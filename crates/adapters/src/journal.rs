// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared call log for fake adapters.

use parking_lot::Mutex;
use std::sync::Arc;

/// Ordered log of calls made across several fakes.
///
/// Each fake records into its own journal by default; hand the same journal
/// to several of them to assert the order of calls between adapters
/// (e.g. history cleared before the channel opened).
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Position of the first entry starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.entries.lock().iter().position(|e| e.starts_with(prefix))
    }
}
