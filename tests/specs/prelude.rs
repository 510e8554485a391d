// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers: an isolated state directory and fluent output checks.

use assert_cmd::Command;
use std::path::{Path, PathBuf};

/// Nothing listens here, so every request fails fast with "connection refused".
pub const DEAD_SERVER: &str = "http://127.0.0.1:9";

/// `sj` with an empty state directory that is not shared with other tests.
pub fn cli() -> Sj {
    Sj::new()
}

pub struct Sj {
    state: tempfile::TempDir,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl Sj {
    fn new() -> Self {
        Self { state: tempfile::tempdir().unwrap(), args: Vec::new(), envs: Vec::new() }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn state_dir(&self) -> &Path {
        self.state.path()
    }

    pub fn session_file(&self) -> PathBuf {
        self.state.path().join("session.json")
    }

    /// Seed the persisted session record.
    pub fn with_record(self, record: serde_json::Value) -> Self {
        std::fs::write(self.session_file(), record.to_string()).unwrap();
        self
    }

    pub fn record(&self) -> serde_json::Value {
        let text = std::fs::read_to_string(self.session_file()).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    fn run(&self) -> Output {
        let mut cmd = Command::cargo_bin("sj").unwrap();
        for key in ["SJ_SERVER", "SJ_TRANSPORT", "SJ_LOG", "SJ_HTTP_TIMEOUT_MS"] {
            cmd.env_remove(key);
        }
        cmd.env("SJ_STATE_DIR", self.state.path())
            .env("SJ_SERVER", DEAD_SERVER)
            .env("NO_COLOR", "1")
            .env("SJ_HTTP_TIMEOUT_MS", "2000");
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        let output = cmd.args(&self.args).output().unwrap();
        Output {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// Run and require exit code 0.
    pub fn passes(&self) -> Output {
        self.exits(0)
    }

    /// Run and require the given exit code.
    pub fn exits(&self, code: i32) -> Output {
        let output = self.run();
        assert_eq!(
            output.code,
            Some(code),
            "args {:?}\nstdout:\n{}\nstderr:\n{}",
            self.args,
            output.stdout,
            output.stderr
        );
        output
    }
}

pub struct Output {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout lacks {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout.contains(needle), "stdout has {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr lacks {needle:?}:\n{}", self.stderr);
        self
    }

    pub fn stdout_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }
}
