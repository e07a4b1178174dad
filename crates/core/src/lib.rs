// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lifecycle-core: pure building blocks of the resource lifecycle engine
//!
//! This crate provides:
//! - Resource states, lifecycle events and per-kind state tables
//! - The entity record and its persisted operations
//! - The completion contract shared by dispatchers and the tracker
//! - Cache victim selection
//! - Clock and id abstractions, engine configuration

pub mod clock;
pub mod id;

pub mod cache;
pub mod completion;
pub mod config;
pub mod entity;
pub mod model;
pub mod operation;
pub mod state;

pub use cache::{CacheCandidate, LeastRecentlyUsed, ReplacementPolicy};
pub use clock::{Clock, FakeClock, SystemClock};
pub use completion::{CompletionSink, OperationResult};
pub use config::{ConfigError, EngineConfig};
pub use entity::Entity;
pub use id::{CorrelationId, EntityId, IdGen, ResourceKind, SequentialIdGen, UuidIdGen};
pub use model::{ModelError, StateModel};
pub use operation::Operation;
pub use state::{LifecycleEvent, ResourceState, WorkKind};
