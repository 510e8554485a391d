// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sj-engine: drives the job state machine against real or fake adapters

mod controller;
mod executor;

pub use controller::{ControllerDeps, ControllerHandle, JobController};
pub use executor::{ExecuteError, Executor};
