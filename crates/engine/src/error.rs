// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the lifecycle engine

use lifecycle_core::{
    CorrelationId, EntityId, LifecycleEvent, ModelError, ResourceKind, ResourceState, WorkKind,
};
use lifecycle_storage::StoreError;
use thiserror::Error;

/// Errors surfaced to callers of the coordinator and tracker
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("illegal transition for {kind}: {event} from {from}")]
    IllegalTransition {
        kind: ResourceKind,
        from: ResourceState,
        event: LifecycleEvent,
    },
    #[error("no adapter for {kind} performs {work} (entity {entity})")]
    AdapterNotFound {
        entity: EntityId,
        kind: ResourceKind,
        work: WorkKind,
    },
    #[error("concurrent modification of {entity}: expected version {expected}, found {actual}")]
    ConcurrentModification {
        entity: EntityId,
        expected: u64,
        actual: u64,
    },
    #[error("adapter failed for {entity}: {reason}")]
    AdapterFailure { entity: EntityId, reason: String },
    #[error("correlation id already pending: {0}")]
    DuplicateCorrelationId(CorrelationId),
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),
    #[error("storage error: {0}")]
    Storage(StoreError),
    #[error("state model error: {0}")]
    Model(ModelError),
}

impl LifecycleError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, LifecycleError::ConcurrentModification { .. })
    }
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => LifecycleError::EntityNotFound(id),
            StoreError::ConcurrentModification {
                id,
                expected,
                actual,
            } => LifecycleError::ConcurrentModification {
                entity: id,
                expected,
                actual,
            },
            other => LifecycleError::Storage(other),
        }
    }
}

impl From<ModelError> for LifecycleError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::IllegalTransition { kind, from, event } => {
                LifecycleError::IllegalTransition { kind, from, event }
            }
            other => LifecycleError::Model(other),
        }
    }
}
