// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-kind adapter registry
//!
//! Adapters compete for work: [`AdapterRegistry::resolve`] walks the list for
//! a kind in registration order and returns the first adapter the predicate
//! accepts. A registration may name adapters it supersedes; those are never
//! returned while the superseding adapter is registered.
//!
//! The table is copy-on-write. Resolution loads the current snapshot without
//! locking; registration and removal serialize on a writer mutex and publish
//! a fresh snapshot.

use crate::adapter::LifecycleAdapter;
use arc_swap::ArcSwap;
use lifecycle_core::ResourceKind;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors from adapter registration
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("adapter {name} is already registered for {kind}")]
    DuplicateName { kind: ResourceKind, name: String },
}

/// A named adapter plus the names it supersedes
#[derive(Clone)]
pub struct AdapterRegistration {
    name: String,
    adapter: Arc<dyn LifecycleAdapter>,
    supersedes: BTreeSet<String>,
}

impl AdapterRegistration {
    pub fn new(name: impl Into<String>, adapter: impl LifecycleAdapter) -> Self {
        Self::from_arc(name, Arc::new(adapter))
    }

    pub fn from_arc(name: impl Into<String>, adapter: Arc<dyn LifecycleAdapter>) -> Self {
        Self {
            name: name.into(),
            adapter,
            supersedes: BTreeSet::new(),
        }
    }

    /// Declare adapters this one replaces for the same kind
    pub fn superseding<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supersedes.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn adapter(&self) -> &Arc<dyn LifecycleAdapter> {
        &self.adapter
    }

    pub fn supersedes(&self, name: &str) -> bool {
        self.supersedes.contains(name)
    }
}

impl std::fmt::Debug for AdapterRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistration")
            .field("name", &self.name)
            .field("supersedes", &self.supersedes)
            .finish_non_exhaustive()
    }
}

type Table = HashMap<ResourceKind, Arc<Vec<AdapterRegistration>>>;

/// Ordered adapter lists keyed by resource kind
pub struct AdapterRegistry {
    table: ArcSwap<Table>,
    writer: Mutex<()>,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(Table::new()),
            writer: Mutex::new(()),
        }
    }

    /// Append `registration` to the list for `kind`
    pub fn register(
        &self,
        kind: impl Into<ResourceKind>,
        registration: AdapterRegistration,
    ) -> Result<(), RegistryError> {
        let kind = kind.into();
        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());

        let current = self.table.load_full();
        let mut list: Vec<AdapterRegistration> = current
            .get(&kind)
            .map(|list| list.as_ref().clone())
            .unwrap_or_default();
        if list.iter().any(|r| r.name == registration.name) {
            return Err(RegistryError::DuplicateName {
                kind,
                name: registration.name,
            });
        }

        tracing::info!(
            kind = %kind,
            adapter = %registration.name,
            supersedes = ?registration.supersedes,
            "adapter registered"
        );
        list.push(registration);

        let mut next = current.as_ref().clone();
        next.insert(kind, Arc::new(list));
        self.table.store(Arc::new(next));
        Ok(())
    }

    /// Remove the adapter called `name` from `kind`; returns whether it was present
    pub fn unregister(&self, kind: &ResourceKind, name: &str) -> bool {
        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());

        let current = self.table.load_full();
        let Some(list) = current.get(kind) else {
            return false;
        };
        if !list.iter().any(|r| r.name == name) {
            return false;
        }

        let remaining: Vec<AdapterRegistration> =
            list.iter().filter(|r| r.name != name).cloned().collect();
        let mut next = current.as_ref().clone();
        if remaining.is_empty() {
            next.remove(kind);
        } else {
            next.insert(kind.clone(), Arc::new(remaining));
        }
        self.table.store(Arc::new(next));

        tracing::info!(kind = %kind, adapter = name, "adapter unregistered");
        true
    }

    /// First non-superseded adapter for `kind` that `predicate` accepts
    pub fn resolve<P>(&self, kind: &ResourceKind, predicate: P) -> Option<AdapterRegistration>
    where
        P: Fn(&dyn LifecycleAdapter) -> bool,
    {
        let snapshot = self.table.load();
        let list = snapshot.get(kind)?;

        let resolved = list
            .iter()
            .filter(|candidate| !list.iter().any(|other| other.supersedes(&candidate.name)))
            .find(|candidate| predicate(candidate.adapter.as_ref()))
            .cloned();

        tracing::trace!(
            kind = %kind,
            adapter = resolved.as_ref().map(|r| r.name.as_str()),
            "resolved"
        );
        resolved
    }

    /// Adapter names for `kind` in registration order
    pub fn names(&self, kind: &ResourceKind) -> Vec<String> {
        self.table
            .load()
            .get(kind)
            .map(|list| list.iter().map(|r| r.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn kinds(&self) -> Vec<ResourceKind> {
        let mut kinds: Vec<_> = self.table.load().keys().cloned().collect();
        kinds.sort();
        kinds
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
