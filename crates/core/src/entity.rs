// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle-governed entity record

use crate::id::{EntityId, ResourceKind};
use crate::state::ResourceState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A host, file share, cached object, or any other resource under lifecycle control
///
/// `updated_count` is the optimistic-concurrency version: every persisted
/// write must present the count it read and bumps it by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: ResourceKind,
    pub state: ResourceState,
    pub updated_count: u64,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Entity {
    /// A fresh entity at version zero
    pub fn new(
        id: impl Into<EntityId>,
        kind: impl Into<ResourceKind>,
        state: ResourceState,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            state,
            updated_count: 0,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn is_transitional(&self) -> bool {
        self.state.is_transitional()
    }

    /// The record as it looks after a successful versioned write
    pub fn advanced(&self, state: ResourceState) -> Self {
        Self {
            state,
            updated_count: self.updated_count + 1,
            ..self.clone()
        }
    }
}
