// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sj-core: job session state machine for the script job client

pub mod macros;

pub mod effect;
pub mod event;
pub mod frame;
pub mod id;
pub mod job;
pub mod machine;
pub mod notice;
pub mod session;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use effect::Effect;
pub use event::{ChannelEvent, Event};
pub use frame::Frame;
pub use id::ClientId;
pub use job::{ChannelSeq, ExecuteOutcome, ExecuteRequest, JobSession, JobState};
pub use machine::dispatch;
pub use notice::{Notice, NoticeLevel};
pub use session::SessionRecord;
