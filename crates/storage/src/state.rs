// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity table materialized from WAL replay

use lifecycle_core::{Entity, EntityId, Operation};
use std::collections::HashMap;

/// Current entity records, rebuilt by applying operations in log order
#[derive(Debug, Default, Clone)]
pub struct MaterializedState {
    pub entities: HashMap<EntityId, Entity>,
}

impl MaterializedState {
    pub fn from_operations<'a>(ops: impl IntoIterator<Item = &'a Operation>) -> Self {
        let mut state = Self::default();
        for op in ops {
            state.apply(op);
        }
        state
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Apply an operation to update the table
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::EntityCreate {
                id,
                kind,
                state,
                updated_count,
                attributes,
            } => {
                self.entities.insert(
                    id.clone(),
                    Entity {
                        id: id.clone(),
                        kind: kind.clone(),
                        state: *state,
                        updated_count: *updated_count,
                        attributes: attributes.clone(),
                    },
                );
            }

            Operation::EntityTransition {
                id,
                state,
                updated_count,
            } => {
                // Transitions for unknown ids come from records deleted later in the log
                if let Some(entity) = self.entities.get_mut(id) {
                    entity.state = *state;
                    entity.updated_count = *updated_count;
                }
            }

            Operation::EntityDelete { id } => {
                self.entities.remove(id);
            }
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
