// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion contract between dispatched work and the lifecycle core
//!
//! Carries only correlation ids and outcomes; how a command travels to a
//! worker and back is the transport's business.

use crate::id::CorrelationId;
use crate::state::LifecycleEvent;
use serde::{Deserialize, Serialize};

/// How a dispatched operation ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationResult {
    Succeeded,
    Failed { reason: String },
    /// Abandoned by the caller, e.g. a timeout sweep or teardown
    Cancelled { reason: String },
}

impl OperationResult {
    pub fn failed(reason: impl Into<String>) -> Self {
        OperationResult::Failed {
            reason: reason.into(),
        }
    }

    pub fn cancelled(reason: impl Into<String>) -> Self {
        OperationResult::Cancelled {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Succeeded)
    }

    /// The report event that settles the entity; cancellation counts as failure
    pub fn report_event(&self) -> LifecycleEvent {
        match self {
            OperationResult::Succeeded => LifecycleEvent::OperationSucceeded,
            OperationResult::Failed { .. } | OperationResult::Cancelled { .. } => {
                LifecycleEvent::OperationFailed
            }
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            OperationResult::Succeeded => None,
            OperationResult::Failed { reason } | OperationResult::Cancelled { reason } => {
                Some(reason)
            }
        }
    }
}

impl<E: std::fmt::Display> From<Result<(), E>> for OperationResult {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => OperationResult::Succeeded,
            Err(e) => OperationResult::failed(e.to_string()),
        }
    }
}

/// Receiver of completions delivered by a worker or transport
pub trait CompletionSink: Send + Sync {
    /// Deliver the result for `id`. Returns `false` when nothing was pending
    /// under that id (already completed, cancelled, or never issued).
    fn complete(&self, id: &CorrelationId, result: OperationResult) -> bool;
}
