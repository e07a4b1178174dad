// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State tables and the transition lookup
//!
//! A [`StateModel`] maps `(kind, state, event)` to the next state. It is
//! built once while the system is composed and is read-only afterwards, so
//! it is shared behind an `Arc` without further locking.

use crate::id::ResourceKind;
use crate::state::{LifecycleEvent, ResourceState};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

use LifecycleEvent::*;
use ResourceState::*;

/// Kind name for physical or virtual hosts
pub const HOST: &str = "host";
/// Kind name for shared file systems
pub const FILE_SHARE: &str = "file-share";
/// Kind name for objects staged in a cache store
pub const CACHE_OBJECT: &str = "cache-object";

type Edge = (ResourceState, LifecycleEvent, ResourceState);

/// Provision, initialize, stop/start, destroy, recover and expunge
const STANDARD_LIFECYCLE: &[Edge] = &[
    (Allocated, DeployRequested, Deploying),
    (Deploying, OperationSucceeded, Deployed),
    (Deploying, OperationFailed, Allocated),
    (Deployed, InitializeRequested, Initializing),
    (Initializing, OperationSucceeded, Ready),
    (Initializing, OperationFailed, Deployed),
    (Ready, StopRequested, Stopping),
    (Stopping, OperationSucceeded, Stopped),
    (Stopping, OperationFailed, Ready),
    (Stopped, StartRequested, Starting),
    (Starting, OperationSucceeded, Ready),
    (Starting, OperationFailed, Stopped),
    (Allocated, DestroyRequested, Destroyed),
    (Deployed, DestroyRequested, Destroyed),
    (Stopped, DestroyRequested, Destroyed),
    (Destroyed, RecoverRequested, Stopped),
    (Destroyed, ExpungeRequested, Expunging),
    (Expunging, OperationSucceeded, Expunged),
    (Expunging, OperationFailed, Destroyed),
];

/// Copy into the cache, then evict; `Ready` means present in the store
const CACHE_LIFECYCLE: &[Edge] = &[
    (Allocated, DeployRequested, Deploying),
    (Deploying, OperationSucceeded, Ready),
    (Deploying, OperationFailed, Allocated),
    (Ready, ExpungeRequested, Expunging),
    (Expunging, OperationSucceeded, Expunged),
    (Expunging, OperationFailed, Ready),
    (Allocated, DestroyRequested, Destroyed),
];

/// Errors from building or querying a state model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error(
        "conflicting transition for {kind}: {from} on {event} already leads to {existing}, not {attempted}"
    )]
    ConflictingTransition {
        kind: ResourceKind,
        from: ResourceState,
        event: LifecycleEvent,
        existing: ResourceState,
        attempted: ResourceState,
    },
    #[error("illegal transition for {kind}: no edge from {from} on {event}")]
    IllegalTransition {
        kind: ResourceKind,
        from: ResourceState,
        event: LifecycleEvent,
    },
    #[error("malformed state table for {kind} at {state}: {reason}")]
    Malformed {
        kind: ResourceKind,
        state: ResourceState,
        reason: String,
    },
}

/// Transition tables for every registered resource kind
#[derive(Debug, Clone, Default)]
pub struct StateModel {
    tables: HashMap<ResourceKind, BTreeMap<(ResourceState, LifecycleEvent), ResourceState>>,
}

impl StateModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hosts and file shares on the standard table, cache objects on the cache table
    pub fn with_defaults() -> Result<Self, ModelError> {
        let mut model = Self::new();
        model.register_standard_lifecycle(HOST)?;
        model.register_standard_lifecycle(FILE_SHARE)?;
        model.register_cache_lifecycle(CACHE_OBJECT)?;
        Ok(model)
    }

    /// Add one edge. Re-registering the same edge is a no-op; a different
    /// target for an existing `(kind, from, event)` key is rejected.
    pub fn register_transition(
        &mut self,
        kind: impl Into<ResourceKind>,
        from: ResourceState,
        event: LifecycleEvent,
        to: ResourceState,
    ) -> Result<(), ModelError> {
        let kind = kind.into();
        let table = self.tables.entry(kind.clone()).or_default();
        match table.get(&(from, event)) {
            Some(&existing) if existing != to => Err(ModelError::ConflictingTransition {
                kind,
                from,
                event,
                existing,
                attempted: to,
            }),
            Some(_) => Ok(()),
            None => {
                table.insert((from, event), to);
                Ok(())
            }
        }
    }

    pub fn register_standard_lifecycle(
        &mut self,
        kind: impl Into<ResourceKind>,
    ) -> Result<(), ModelError> {
        self.register_edges(kind.into(), STANDARD_LIFECYCLE)
    }

    pub fn register_cache_lifecycle(
        &mut self,
        kind: impl Into<ResourceKind>,
    ) -> Result<(), ModelError> {
        self.register_edges(kind.into(), CACHE_LIFECYCLE)
    }

    fn register_edges(&mut self, kind: ResourceKind, edges: &[Edge]) -> Result<(), ModelError> {
        for &(from, event, to) in edges {
            self.register_transition(kind.clone(), from, event, to)?;
        }
        Ok(())
    }

    /// Look up the state `event` leads to from `current`
    pub fn apply(
        &self,
        kind: &ResourceKind,
        current: ResourceState,
        event: LifecycleEvent,
    ) -> Result<ResourceState, ModelError> {
        self.tables
            .get(kind)
            .and_then(|table| table.get(&(current, event)))
            .copied()
            .ok_or_else(|| ModelError::IllegalTransition {
                kind: kind.clone(),
                from: current,
                event,
            })
    }

    pub fn has_kind(&self, kind: &ResourceKind) -> bool {
        self.tables.contains_key(kind)
    }

    /// Registered kinds in sorted order
    pub fn kinds(&self) -> Vec<ResourceKind> {
        let mut kinds: Vec<_> = self.tables.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// All edges of one kind, ordered by source state then event
    pub fn transitions(&self, kind: &ResourceKind) -> Vec<Edge> {
        self.tables
            .get(kind)
            .map(|table| {
                table
                    .iter()
                    .map(|(&(from, event), &to)| (from, event, to))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Events accepted in `state`
    pub fn events_from(&self, kind: &ResourceKind, state: ResourceState) -> Vec<LifecycleEvent> {
        self.tables
            .get(kind)
            .map(|table| {
                table
                    .keys()
                    .filter(|(from, _)| *from == state)
                    .map(|&(_, event)| event)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check the fork-join shape of every table.
    ///
    /// Each transitional state must have exactly an `OperationSucceeded` and
    /// an `OperationFailed` edge, both into stable states, and nothing else.
    /// Report events must never leave a stable state.
    pub fn validate(&self) -> Result<(), ModelError> {
        for kind in self.kinds() {
            self.validate_kind(&kind)?;
        }
        Ok(())
    }

    fn validate_kind(&self, kind: &ResourceKind) -> Result<(), ModelError> {
        let Some(table) = self.tables.get(kind) else {
            return Ok(());
        };

        let states: BTreeSet<ResourceState> = table
            .iter()
            .flat_map(|(&(from, _), &to)| [from, to])
            .collect();

        let malformed = |state: ResourceState, reason: String| ModelError::Malformed {
            kind: kind.clone(),
            state,
            reason,
        };

        for state in states {
            let outgoing: Vec<(LifecycleEvent, ResourceState)> = table
                .iter()
                .filter(|((from, _), _)| *from == state)
                .map(|(&(_, event), &to)| (event, to))
                .collect();

            if state.is_stable() {
                if let Some((event, _)) = outgoing.iter().find(|(event, _)| event.is_report()) {
                    return Err(malformed(
                        state,
                        format!("report event {event} cannot leave a stable state"),
                    ));
                }
                continue;
            }

            for report in [OperationSucceeded, OperationFailed] {
                match outgoing.iter().find(|(event, _)| *event == report) {
                    None => {
                        return Err(malformed(state, format!("missing {report} edge")));
                    }
                    Some((_, target)) if target.is_transitional() => {
                        return Err(malformed(
                            state,
                            format!("{report} leads to transitional state {target}"),
                        ));
                    }
                    Some(_) => {}
                }
            }

            if let Some((event, _)) = outgoing.iter().find(|(event, _)| !event.is_report()) {
                return Err(malformed(
                    state,
                    format!("request event {event} cannot leave a transitional state"),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
