// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending asynchronous operations keyed by correlation id
//!
//! Each pending operation owns a callback that runs exactly once: whichever
//! of `complete`, `cancel` or `cancel_all` removes the entry first invokes
//! it, and every later attempt is a logged no-op. `withdraw` removes an
//! entry without running its callback. Callbacks always run after the table
//! lock is released.
//!
//! The tracker enforces no timeouts. [`AsyncOperationTracker::list_stale_operations`]
//! lets an external sweeper find operations that have been pending too long.

use crate::error::LifecycleError;
use lifecycle_core::{Clock, CompletionSink, CorrelationId, OperationResult};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Callback run with the operation's result
pub type CompletionCallback = Box<dyn FnOnce(OperationResult) + Send>;

/// Snapshot of one in-flight operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub correlation_id: CorrelationId,
    pub issued_at: Instant,
}

struct Entry {
    issued_at: Instant,
    callback: CompletionCallback,
}

/// Table of in-flight operations
pub struct AsyncOperationTracker<C: Clock> {
    clock: C,
    pending: Mutex<HashMap<CorrelationId, Entry>>,
}

impl<C: Clock> AsyncOperationTracker<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Register a pending operation under `id`
    pub fn issue<F>(&self, id: CorrelationId, callback: F) -> Result<PendingOperation, LifecycleError>
    where
        F: FnOnce(OperationResult) + Send + 'static,
    {
        let issued_at = self.clock.now();
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if pending.contains_key(&id) {
            tracing::error!(correlation_id = %id, "duplicate correlation id");
            return Err(LifecycleError::DuplicateCorrelationId(id));
        }
        pending.insert(
            id.clone(),
            Entry {
                issued_at,
                callback: Box::new(callback),
            },
        );
        drop(pending);

        tracing::debug!(correlation_id = %id, "operation issued");
        Ok(PendingOperation {
            correlation_id: id,
            issued_at,
        })
    }

    /// Deliver `result` to the operation's callback; `false` if nothing was pending
    pub fn complete(&self, id: &CorrelationId, result: OperationResult) -> bool {
        let Some(entry) = self.take(id) else {
            tracing::warn!(correlation_id = %id, "completion for unknown or finished operation ignored");
            return false;
        };

        tracing::info!(
            correlation_id = %id,
            success = result.is_success(),
            pending_ms = self.clock.elapsed_since(entry.issued_at).as_millis() as u64,
            "operation completed"
        );
        (entry.callback)(result);
        true
    }

    /// Give up on an operation; its callback receives a cancellation result
    pub fn cancel(&self, id: &CorrelationId, reason: &str) -> bool {
        let Some(entry) = self.take(id) else {
            tracing::debug!(correlation_id = %id, "cancel for unknown or finished operation ignored");
            return false;
        };

        tracing::warn!(correlation_id = %id, reason, "operation cancelled");
        (entry.callback)(OperationResult::cancelled(reason));
        true
    }

    /// Remove an operation without running its callback
    pub fn withdraw(&self, id: &CorrelationId) -> bool {
        let withdrawn = self.take(id).is_some();
        if withdrawn {
            tracing::trace!(correlation_id = %id, "operation withdrawn");
        }
        withdrawn
    }

    /// Cancel every pending operation; returns how many were cancelled
    pub fn cancel_all(&self, reason: &str) -> usize {
        let drained: Vec<(CorrelationId, Entry)> = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain()
            .collect();

        let count = drained.len();
        if count > 0 {
            tracing::warn!(count, reason, "cancelling all pending operations");
        }
        for (_, entry) in drained {
            (entry.callback)(OperationResult::cancelled(reason));
        }
        count
    }

    /// Operations pending for longer than `older_than`, oldest first
    pub fn list_stale_operations(&self, older_than: Duration) -> Vec<PendingOperation> {
        let now = self.clock.now();
        let mut stale: Vec<PendingOperation> = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.issued_at) > older_than)
            .map(|(id, entry)| PendingOperation {
                correlation_id: id.clone(),
                issued_at: entry.issued_at,
            })
            .collect();
        stale.sort_by(|a, b| {
            a.issued_at
                .cmp(&b.issued_at)
                .then_with(|| a.correlation_id.cmp(&b.correlation_id))
        });
        stale
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn contains(&self, id: &CorrelationId) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }

    fn take(&self, id: &CorrelationId) -> Option<Entry> {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
    }
}

impl<C: Clock> CompletionSink for AsyncOperationTracker<C> {
    fn complete(&self, id: &CorrelationId, result: OperationResult) -> bool {
        AsyncOperationTracker::complete(self, id, result)
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
