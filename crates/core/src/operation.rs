// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations recorded by durable entity stores

use crate::entity::Entity;
use crate::id::{EntityId, ResourceKind};
use crate::state::ResourceState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single persisted mutation of the entity table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Insert a new entity record
    EntityCreate {
        id: EntityId,
        kind: ResourceKind,
        state: ResourceState,
        #[serde(default)]
        updated_count: u64,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
    },

    /// Versioned state change; `updated_count` is the version after the write
    EntityTransition {
        id: EntityId,
        state: ResourceState,
        updated_count: u64,
    },

    /// Remove an entity record
    EntityDelete { id: EntityId },
}

impl Operation {
    pub fn create(entity: &Entity) -> Self {
        Operation::EntityCreate {
            id: entity.id.clone(),
            kind: entity.kind.clone(),
            state: entity.state,
            updated_count: entity.updated_count,
            attributes: entity.attributes.clone(),
        }
    }

    pub fn transition(entity: &Entity) -> Self {
        Operation::EntityTransition {
            id: entity.id.clone(),
            state: entity.state,
            updated_count: entity.updated_count,
        }
    }

    /// Id of the entity this operation touches
    pub fn entity_id(&self) -> &EntityId {
        match self {
            Operation::EntityCreate { id, .. }
            | Operation::EntityTransition { id, .. }
            | Operation::EntityDelete { id } => id,
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
