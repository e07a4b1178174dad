// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory entity store

use crate::{check_version, EntityStore, StoreError};
use lifecycle_core::{Entity, EntityId, Operation, ResourceState};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Cloneable in-memory store; clones share the same table
///
/// Every successful mutation is also recorded as an [`Operation`] so callers
/// can count and inspect persisted writes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entities: Arc<Mutex<HashMap<EntityId, Entity>>>,
    operations: Arc<Mutex<Vec<Operation>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `entities`
    pub fn with_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let store = Self::new();
        {
            let mut table = store.entities.lock().unwrap_or_else(|e| e.into_inner());
            for entity in entities {
                table.insert(entity.id.clone(), entity);
            }
        }
        store
    }

    /// All mutations applied so far, oldest first
    pub fn operations(&self) -> Vec<Operation> {
        self.operations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of versioned state writes
    pub fn transition_count(&self) -> usize {
        self.operations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|op| matches!(op, Operation::EntityTransition { .. }))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entities.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, op: Operation) {
        self.operations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(op);
    }
}

impl EntityStore for MemoryStore {
    fn load(&self, id: &EntityId) -> Result<Entity, StoreError> {
        self.entities
            .lock()
            .unwrap_or_else(|e| e.into_inner())
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
        let next = {
            let mut table = self.entities.lock().unwrap_or_else(|e| e.into_inner());
            let current = table
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            check_version(current, expected_updated_count)?;
            *current = current.advanced(new_state);
            current.clone()
        };
        self.record(Operation::transition(&next));
        Ok(next)
    }

    fn insert(&self, entity: Entity) -> Result<(), StoreError> {
        {
            let mut table = self.entities.lock().unwrap_or_else(|e| e.into_inner());
            if table.contains_key(&entity.id) {
                return Err(StoreError::AlreadyExists(entity.id));
            }
            table.insert(entity.id.clone(), entity.clone());
        }
        self.record(Operation::create(&entity));
        Ok(())
    }

    fn remove(&self, id: &EntityId) -> Result<(), StoreError> {
        let removed = self
            .entities
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
        match removed {
            Some(_) => {
                self.record(Operation::EntityDelete { id: id.clone() });
                Ok(())
            }
            None => Err(StoreError::NotFound(id.clone())),
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
