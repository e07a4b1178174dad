// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Entity persistence for the lifecycle engine
//!
//! The engine only ever loads an entity by id and writes a new state guarded
//! by the version it read. Queries, joins and filters belong to whatever
//! system owns the records; this crate supplies the narrow [`EntityStore`]
//! boundary plus an in-memory and a write-ahead-logged implementation.

mod durable;
mod memory;
mod state;
mod wal;

pub use durable::WalStore;
pub use memory::MemoryStore;
pub use state::MaterializedState;
pub use wal::{Replay, Wal, WalEntry, WalError};

use lifecycle_core::{Entity, EntityId, ResourceState};
use std::sync::Arc;
use thiserror::Error;

/// Errors from entity persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity not found: {0}")]
    NotFound(EntityId),
    #[error("entity already exists: {0}")]
    AlreadyExists(EntityId),
    #[error("concurrent modification of {id}: expected version {expected}, found {actual}")]
    ConcurrentModification {
        id: EntityId,
        expected: u64,
        actual: u64,
    },
    #[error("wal error: {0}")]
    Wal(#[from] WalError),
}

/// Load/save boundary between the lifecycle engine and entity storage
///
/// Implementations may block the calling thread.
pub trait EntityStore: Send + Sync {
    /// Current record for `id`
    fn load(&self, id: &EntityId) -> Result<Entity, StoreError>;

    /// Write `new_state` if the stored version still equals
    /// `expected_updated_count`; the returned record carries the bumped version.
    fn save(
        &self,
        id: &EntityId,
        new_state: ResourceState,
        expected_updated_count: u64,
    ) -> Result<Entity, StoreError>;

    /// Add a record created outside the engine
    fn insert(&self, entity: Entity) -> Result<(), StoreError>;

    /// Drop a record; removal is never performed by the engine itself
    fn remove(&self, id: &EntityId) -> Result<(), StoreError>;
}

impl<S: EntityStore + ?Sized> EntityStore for Arc<S> {
    fn load(&self, id: &EntityId) -> Result<Entity, StoreError> {
        (**self).load(id)
    }

    fn save(
        &self,
        id: &EntityId,
        new_state: ResourceState,
        expected_updated_count: u64,
    ) -> Result<Entity, StoreError> {
        (**self).save(id, new_state, expected_updated_count)
    }

    fn insert(&self, entity: Entity) -> Result<(), StoreError> {
        (**self).insert(entity)
    }

    fn remove(&self, id: &EntityId) -> Result<(), StoreError> {
        (**self).remove(id)
    }
}

/// Optimistic-lock check shared by the store implementations
fn check_version(current: &Entity, expected: u64) -> Result<(), StoreError> {
    if current.updated_count == expected {
        Ok(())
    } else {
        Err(StoreError::ConcurrentModification {
            id: current.id.clone(),
            expected,
            actual: current.updated_count,
        })
    }
}
