// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Resource lifecycle engine: coordinator, async tracking, sweeping and eviction

mod coordinator;
mod error;
mod evictor;
mod retry;
mod settlement;
mod sweeper;
mod tracker;

pub use coordinator::{Coordinator, CoordinatorDeps};
pub use error::LifecycleError;
pub use evictor::{CacheEvictor, RefCountSource};
pub use retry::retry_on_conflict;
pub use settlement::{Settlement, SettlementBus, SettlementReceiver};
pub use sweeper::StaleOperationSweeper;
pub use tracker::{AsyncOperationTracker, CompletionCallback, PendingOperation};
