// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The adapter contract
//!
//! An adapter performs the real provisioning or teardown behind a requested
//! event. It either finishes inline ([`AdapterOutcome::Completed`]) or hands
//! the work off and returns [`AdapterOutcome::Pending`]; in the second case
//! the result must later be delivered to the completion sink under the
//! request's correlation id.

use async_trait::async_trait;
use lifecycle_core::{CorrelationId, Entity, LifecycleEvent, WorkKind};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::agent::{CommandError, TransportError};

/// Errors raised by an adapter while performing work
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("operation failed: {0}")]
    Failed(String),
    #[error("adapter does not perform {0}")]
    Unsupported(WorkKind),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("command error: {0}")]
    Command(#[from] CommandError),
}

/// Caller-supplied parameters passed through to the adapter untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkContext {
    params: BTreeMap<String, String>,
}

impl WorkContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

/// One unit of work handed to an adapter
#[derive(Debug, Clone)]
pub struct WorkRequest {
    /// The entity as persisted in its transitional state
    pub entity: Entity,
    pub event: LifecycleEvent,
    pub work: WorkKind,
    /// Id under which an asynchronous completion must be reported
    pub correlation_id: CorrelationId,
    pub context: WorkContext,
}

/// How `perform` handed back control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterOutcome {
    /// The work finished successfully before returning
    Completed,
    /// The work continues elsewhere; its result arrives through the tracker
    Pending,
}

/// A named strategy that performs lifecycle work for a resource kind
#[async_trait]
pub trait LifecycleAdapter: Send + Sync + 'static {
    /// Whether this adapter is willing to perform `work`
    fn handles(&self, work: WorkKind) -> bool;

    async fn perform(&self, request: WorkRequest) -> Result<AdapterOutcome, AdapterError>;
}
