// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake lifecycle adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::adapter::{AdapterError, AdapterOutcome, LifecycleAdapter, WorkRequest};
use async_trait::async_trait;
use lifecycle_core::WorkKind;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// What the fake does when asked to perform work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeBehavior {
    /// Return `Completed`
    Succeed,
    /// Return `Pending`; the test reports the completion itself
    Defer,
    /// Return `AdapterError::Failed` with this message
    Fail(String),
    /// Panic inside `perform`
    Panic,
}

/// Scriptable adapter that records every request it receives
#[derive(Clone)]
pub struct FakeAdapter {
    works: Option<BTreeSet<WorkKind>>,
    behavior: Arc<Mutex<FakeBehavior>>,
    requests: Arc<Mutex<Vec<WorkRequest>>>,
}

impl Default for FakeAdapter {
    fn default() -> Self {
        Self::new(FakeBehavior::Succeed)
    }
}

impl FakeAdapter {
    /// A fake that handles every kind of work
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            works: None,
            behavior: Arc::new(Mutex::new(behavior)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(FakeBehavior::Succeed)
    }

    pub fn deferring() -> Self {
        Self::new(FakeBehavior::Defer)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(FakeBehavior::Fail(message.into()))
    }

    /// Restrict the fake to the given work kinds
    pub fn handling(mut self, works: impl IntoIterator<Item = WorkKind>) -> Self {
        self.works = Some(works.into_iter().collect());
        self
    }

    pub fn set_behavior(&self, behavior: FakeBehavior) {
        *self.behavior.lock().unwrap_or_else(|e| e.into_inner()) = behavior;
    }

    /// Get all recorded requests
    pub fn requests(&self) -> Vec<WorkRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Correlation id of the most recent request
    pub fn last_correlation_id(&self) -> Option<lifecycle_core::CorrelationId> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .map(|r| r.correlation_id.clone())
    }
}

#[async_trait]
impl LifecycleAdapter for FakeAdapter {
    fn handles(&self, work: WorkKind) -> bool {
        match &self.works {
            Some(works) => works.contains(&work),
            None => true,
        }
    }

    #[allow(clippy::panic)]
    async fn perform(&self, request: WorkRequest) -> Result<AdapterOutcome, AdapterError> {
        let work = request.work;
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let behavior = self
            .behavior
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match behavior {
            FakeBehavior::Succeed => Ok(AdapterOutcome::Completed),
            FakeBehavior::Defer => Ok(AdapterOutcome::Pending),
            FakeBehavior::Fail(message) => Err(AdapterError::Failed(message)),
            FakeBehavior::Panic => panic!("fake adapter panicked during {work}"),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
