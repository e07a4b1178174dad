// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable entity store backed by the write-ahead log

use crate::state::MaterializedState;
use crate::wal::Wal;
use crate::{check_version, EntityStore, StoreError};
use lifecycle_core::{Entity, EntityId, Operation, ResourceState};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

struct Inner {
    wal: Wal,
    state: MaterializedState,
}

/// Entity store whose table is rebuilt from its log on open
///
/// Each mutation is appended and fsynced before the in-memory table changes,
/// so a write that returned `Ok` survives a restart.
pub struct WalStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl WalStore {
    /// Open the store at `path`, replaying any existing log
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let (wal, replay) = Wal::recover(path)?;
        let state = MaterializedState::from_operations(&replay.operations);

        tracing::info!(
            path = %path.display(),
            entities = state.entities.len(),
            sequence = wal.sequence(),
            "entity store opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(Inner { wal, state }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sequence number of the last durable write
    pub fn sequence(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .wal
            .sequence()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .state
            .entities
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Inner {
    fn commit(&mut self, op: Operation) -> Result<(), StoreError> {
        self.wal.append(&op)?;
        self.state.apply(&op);
        Ok(())
    }
}

impl EntityStore for WalStore {
    fn load(&self, id: &EntityId) -> Result<Entity, StoreError> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .state
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn save(
        &self,
        id: &EntityId,
        new_state: ResourceState,
        expected_updated_count: u64,
    ) -> Result<Entity, StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let current = inner
            .state
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        check_version(current, expected_updated_count)?;

        let next = current.advanced(new_state);
        inner.commit(Operation::transition(&next))?;
        Ok(next)
    }

    fn insert(&self, entity: Entity) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.state.get(&entity.id).is_some() {
            return Err(StoreError::AlreadyExists(entity.id));
        }
        inner.commit(Operation::create(&entity))
    }

    fn remove(&self, id: &EntityId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.state.get(id).is_none() {
            return Err(StoreError::NotFound(id.clone()));
        }
        inner.commit(Operation::EntityDelete { id: id.clone() })
    }
}

#[cfg(test)]
#[path = "durable_tests.rs"]
mod tests;
