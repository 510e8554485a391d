// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to flush logs before terminating.

use std::fmt;

pub mod codes {
    /// Request failed or the job ended without a result
    pub const FAILED: i32 = 1;
    /// Bad arguments or configuration
    pub const USAGE: i32 = 2;
    /// The job ran and reported failure
    pub const JOB_FAILED: i32 = 3;
    /// Lost the log stream while the job may still be running
    pub const DETACHED: i32 = 4;
}

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(codes::USAGE, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(codes::FAILED, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
