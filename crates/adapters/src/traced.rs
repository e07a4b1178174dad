// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::adapter::{AdapterError, AdapterOutcome, LifecycleAdapter, WorkRequest};
use async_trait::async_trait;
use lifecycle_core::WorkKind;
use tracing::Instrument;

/// Wrapper that adds tracing to any LifecycleAdapter
#[derive(Clone)]
pub struct TracedAdapter<A> {
    name: String,
    inner: A,
}

impl<A> TracedAdapter<A> {
    pub fn new(name: impl Into<String>, inner: A) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<A: LifecycleAdapter> LifecycleAdapter for TracedAdapter<A> {
    fn handles(&self, work: WorkKind) -> bool {
        let handles = self.inner.handles(work);
        tracing::trace!(adapter = %self.name, %work, handles, "checked");
        handles
    }

    async fn perform(&self, request: WorkRequest) -> Result<AdapterOutcome, AdapterError> {
        let span = tracing::info_span!(
            "adapter.perform",
            adapter = %self.name,
            entity = %request.entity.id,
            work = %request.work,
            correlation_id = %request.correlation_id,
        );

        async move {
            tracing::info!(kind = %request.entity.kind, "starting");

            let start = std::time::Instant::now();
            let result = self.inner.perform(request).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(AdapterOutcome::Completed) => tracing::info!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "completed"
                ),
                Ok(AdapterOutcome::Pending) => tracing::info!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "dispatched, awaiting completion"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
