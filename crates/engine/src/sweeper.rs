// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic cancellation of operations that never completed

use crate::tracker::AsyncOperationTracker;
use lifecycle_core::{Clock, CorrelationId, EngineConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Cancels pending operations older than a threshold
pub struct StaleOperationSweeper<C: Clock> {
    tracker: Arc<AsyncOperationTracker<C>>,
    threshold: Duration,
    interval: Duration,
}

impl<C: Clock> StaleOperationSweeper<C> {
    pub fn new(tracker: Arc<AsyncOperationTracker<C>>, config: &EngineConfig) -> Self {
        Self {
            tracker,
            threshold: config.stale_operation_threshold,
            interval: config.sweep_interval,
        }
    }

    /// Cancel every stale operation; returns the ids actually cancelled
    pub fn sweep(&self) -> Vec<CorrelationId> {
        let reason = format!(
            "no completion within {}s",
            self.threshold.as_secs_f64()
        );
        let cancelled: Vec<CorrelationId> = self
            .tracker
            .list_stale_operations(self.threshold)
            .into_iter()
            .map(|op| op.correlation_id)
            .filter(|id| self.tracker.cancel(id, &reason))
            .collect();

        if !cancelled.is_empty() {
            tracing::warn!(count = cancelled.len(), "swept stale operations");
        }
        cancelled
    }

    /// Sweep every interval until `shutdown` turns true or its sender is dropped
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            threshold_ms = self.threshold.as_millis() as u64,
            "sweeper started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("sweeper stopped");
    }
}

#[cfg(test)]
#[path = "sweeper_tests.rs"]
mod tests;
