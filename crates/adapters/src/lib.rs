// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters that perform lifecycle work, and the registry that picks them

pub mod adapter;
pub mod agent;
pub mod registry;
pub mod traced;

pub use adapter::{AdapterError, AdapterOutcome, LifecycleAdapter, WorkContext, WorkRequest};
pub use agent::{
    AgentAdapter, AgentCommand, AgentTransport, CommandError, CommandTable, CommandTag,
    LocalAgent, TransportError,
};
pub use registry::{AdapterRegistration, AdapterRegistry, RegistryError};
pub use traced::TracedAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeAdapter, FakeBehavior};
