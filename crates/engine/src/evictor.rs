// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cache eviction driven through the lifecycle
//!
//! The replacement policy only nominates a victim. The live reference count
//! is read again right before the expunge is requested, and a victim that
//! picked up a reference in between is skipped for this round.

use crate::coordinator::Coordinator;
use crate::error::LifecycleError;
use lifecycle_adapters::WorkContext;
use lifecycle_core::{
    CacheCandidate, Clock, EngineConfig, Entity, EntityId, IdGen, LifecycleEvent,
    ReplacementPolicy,
};
use lifecycle_storage::EntityStore;
use std::time::Duration;

/// Live reference counts for cached objects
pub trait RefCountSource: Send + Sync {
    fn ref_count(&self, id: &EntityId) -> u32;
}

impl<F> RefCountSource for F
where
    F: Fn(&EntityId) -> u32 + Send + Sync,
{
    fn ref_count(&self, id: &EntityId) -> u32 {
        self(id)
    }
}

/// Picks and expunges unused cached objects
pub struct CacheEvictor<P, R, C> {
    policy: P,
    refs: R,
    clock: C,
    unused_threshold: Duration,
}

impl<P, R, C> CacheEvictor<P, R, C>
where
    P: ReplacementPolicy,
    R: RefCountSource,
    C: Clock,
{
    pub fn new(policy: P, refs: R, clock: C, config: &EngineConfig) -> Self {
        Self {
            policy,
            refs,
            clock,
            unused_threshold: config.cache_unused_threshold,
        }
    }

    /// Evict at most one candidate
    ///
    /// `Ok(None)` means nothing was evictable this round.
    pub async fn evict_one<S, TC, I>(
        &self,
        coordinator: &Coordinator<S, TC, I>,
        candidates: &[CacheCandidate],
    ) -> Result<Option<Entity>, LifecycleError>
    where
        S: EntityStore + 'static,
        TC: Clock,
        I: IdGen,
    {
        let now = self.clock.now();
        let Some(victim) = self
            .policy
            .choose_victim(candidates, self.unused_threshold, now)
        else {
            tracing::debug!(candidates = candidates.len(), "no eviction candidate");
            return Ok(None);
        };

        let live = self.refs.ref_count(&victim.id);
        if live > 0 {
            tracing::debug!(entity = %victim.id, refs = live, "victim referenced again, skipping");
            return Ok(None);
        }

        tracing::info!(
            entity = %victim.id,
            idle_ms = now.saturating_duration_since(victim.last_accessed).as_millis() as u64,
            "evicting"
        );
        coordinator
            .request_transition(&victim.id, LifecycleEvent::ExpungeRequested, WorkContext::new())
            .await
            .map(Some)
    }
}

#[cfg(test)]
#[path = "evictor_tests.rs"]
mod tests;
