// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-side retry on optimistic-lock conflicts

use crate::error::LifecycleError;
use std::future::Future;

/// Run `op` until it succeeds, fails with anything but a conflict, or
/// `max_attempts` attempts have been made
///
/// Each attempt must reload whatever it reads; a conflict means the entity
/// moved on. A `max_attempts` of zero still makes one attempt.
pub async fn retry_on_conflict<T, F, Fut>(max_attempts: u32, mut op: F) -> Result<T, LifecycleError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LifecycleError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if e.is_conflict() && attempt < max_attempts => {
                tracing::debug!(attempt, max_attempts, error = %e, "conflict, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}
