// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Victim selection for bounded cache stores
//!
//! Selection is a hint, not a lock: whoever evicts must re-check the
//! reference count at eviction time.

use crate::id::EntityId;
use crate::state::ResourceState;
use std::time::{Duration, Instant};

/// Read-only view of an evictable cached object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheCandidate {
    pub id: EntityId,
    pub state: ResourceState,
    pub ref_count: u32,
    pub last_accessed: Instant,
}

impl CacheCandidate {
    pub fn new(id: impl Into<EntityId>, last_accessed: Instant) -> Self {
        Self {
            id: id.into(),
            state: ResourceState::Ready,
            ref_count: 0,
            last_accessed,
        }
    }

    pub fn with_ref_count(mut self, ref_count: u32) -> Self {
        self.ref_count = ref_count;
        self
    }

    pub fn with_state(mut self, state: ResourceState) -> Self {
        self.state = state;
        self
    }

    /// Present in the store, unreferenced, and idle for longer than `unused_threshold`
    pub fn is_evictable(&self, unused_threshold: Duration, now: Instant) -> bool {
        self.state == ResourceState::Ready
            && self.ref_count == 0
            && now.saturating_duration_since(self.last_accessed) > unused_threshold
    }
}

/// Chooses which cached object to evict next
pub trait ReplacementPolicy: Send + Sync {
    /// `None` means nothing can be evicted right now; that is not an error
    fn choose_victim<'a>(
        &self,
        candidates: &'a [CacheCandidate],
        unused_threshold: Duration,
        now: Instant,
    ) -> Option<&'a CacheCandidate>;
}

/// Least-recently-used among evictable candidates; ties go to the smaller id
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastRecentlyUsed;

impl ReplacementPolicy for LeastRecentlyUsed {
    fn choose_victim<'a>(
        &self,
        candidates: &'a [CacheCandidate],
        unused_threshold: Duration,
        now: Instant,
    ) -> Option<&'a CacheCandidate> {
        candidates
            .iter()
            .filter(|c| c.is_evictable(unused_threshold, now))
            .min_by(|a, b| {
                a.last_accessed
                    .cmp(&b.last_accessed)
                    .then_with(|| a.id.cmp(&b.id))
            })
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
