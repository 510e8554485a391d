// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Display port: where job output and notices go.

use sj_core::Notice;

/// Receives everything the user should see about the job.
pub trait Console: Send + Sync + 'static {
    /// One plain log line from the job
    fn line(&self, text: &str);

    fn notice(&self, notice: &Notice);

    /// The result artifact can now be downloaded
    fn artifact_ready(&self, name: &str);
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::Console;
    use parking_lot::Mutex;
    use sj_core::Notice;
    use std::sync::Arc;

    /// Recorded console output
    #[derive(Debug, Clone, PartialEq)]
    pub enum ConsoleEntry {
        Line(String),
        Notice(Notice),
        ArtifactReady(String),
    }

    /// Console that records output for testing
    #[derive(Clone, Default)]
    pub struct FakeConsole {
        entries: Arc<Mutex<Vec<ConsoleEntry>>>,
    }

    impl FakeConsole {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn entries(&self) -> Vec<ConsoleEntry> {
            self.entries.lock().clone()
        }

        pub fn lines(&self) -> Vec<String> {
            self.entries
                .lock()
                .iter()
                .filter_map(|e| match e {
                    ConsoleEntry::Line(line) => Some(line.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn notices(&self) -> Vec<Notice> {
            self.entries
                .lock()
                .iter()
                .filter_map(|e| match e {
                    ConsoleEntry::Notice(notice) => Some(notice.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn artifacts(&self) -> Vec<String> {
            self.entries
                .lock()
                .iter()
                .filter_map(|e| match e {
                    ConsoleEntry::ArtifactReady(name) => Some(name.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Console for FakeConsole {
        fn line(&self, text: &str) {
            self.entries.lock().push(ConsoleEntry::Line(text.to_string()));
        }

        fn notice(&self, notice: &Notice) {
            self.entries.lock().push(ConsoleEntry::Notice(notice.clone()));
        }

        fn artifact_ready(&self, name: &str) {
            self.entries.lock().push(ConsoleEntry::ArtifactReady(name.to_string()));
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{ConsoleEntry, FakeConsole};
