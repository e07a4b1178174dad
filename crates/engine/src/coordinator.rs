// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource lifecycle coordinator
//!
//! Drives one requested event through load, table lookup, the transitional
//! write, adapter work and the terminal write. Every write carries the
//! version that was read; a lost race surfaces as
//! [`LifecycleError::ConcurrentModification`] and is never retried here.
//!
//! Writes per request:
//! - event whose next state is stable: one write, no adapter
//! - work finishing inline (success, failure or panic): two writes
//! - work finishing later: one write now, one when the completion arrives
//!
//! Once the transitional write has happened the entity always reaches a
//! stable state again, through the adapter's result, the tracker's
//! completion, a cancellation, or [`Coordinator::shutdown`]. Each of these
//! settles against the version written at the transitional step, so a
//! completion that arrives after its work was resolved some other way is
//! discarded instead of settling newer work.

use crate::error::LifecycleError;
use crate::settlement::{Settlement, SettlementBus, SettlementReceiver};
use crate::tracker::AsyncOperationTracker;
use lifecycle_adapters::{
    AdapterOutcome, AdapterRegistry, LifecycleAdapter, WorkContext, WorkRequest,
};
use lifecycle_core::{
    Clock, CorrelationId, Entity, EntityId, IdGen, LifecycleEvent, OperationResult, StateModel,
};
use lifecycle_storage::EntityStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::Instrument;

/// Collaborators the coordinator is composed from
pub struct CoordinatorDeps<S, C: Clock, I> {
    pub store: S,
    pub model: Arc<StateModel>,
    pub registry: Arc<AdapterRegistry>,
    pub tracker: Arc<AsyncOperationTracker<C>>,
    pub id_gen: I,
}

/// The part of the coordinator that completion callbacks re-enter
struct Settler<S> {
    store: S,
    model: Arc<StateModel>,
    bus: SettlementBus,
    /// Correlation id of the tracked work each transitional entity is waiting on
    in_flight: Mutex<HashMap<EntityId, CorrelationId>>,
}

impl<S: EntityStore> Settler<S> {
    /// Apply the report event for `result` to the version written when
    /// `correlation_id` started, and announce the outcome
    ///
    /// Fails with a conflict when the entity has moved on since, so a late
    /// completion can never settle newer work.
    fn settle(
        &self,
        id: &EntityId,
        version: u64,
        correlation_id: &CorrelationId,
        result: OperationResult,
    ) -> Result<Entity, LifecycleError> {
        self.forget(id, correlation_id);

        let entity = self.store.load(id)?;
        if entity.updated_count != version {
            return Err(LifecycleError::ConcurrentModification {
                entity: id.clone(),
                expected: version,
                actual: entity.updated_count,
            });
        }
        let next = self
            .model
            .apply(&entity.kind, entity.state, result.report_event())?;
        let saved = self.store.save(id, next, version)?;

        tracing::info!(
            entity = %id,
            %correlation_id,
            from = %entity.state,
            to = %saved.state,
            reason = result.reason(),
            "settled"
        );
        self.bus.publish(Settlement {
            entity: saved.clone(),
            result,
        });
        Ok(saved)
    }

    fn track(&self, id: &EntityId, correlation_id: &CorrelationId) {
        self.lock().insert(id.clone(), correlation_id.clone());
    }

    fn forget(&self, id: &EntityId, correlation_id: &CorrelationId) {
        let mut in_flight = self.lock();
        if in_flight.get(id) == Some(correlation_id) {
            in_flight.remove(id);
        }
    }

    fn take(&self, id: &EntityId) -> Option<CorrelationId> {
        self.lock().remove(id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<EntityId, CorrelationId>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Work handed to an adapter, finished on its own task
///
/// Owns everything needed to bring the entity back to a stable state, so
/// dropping the `request_transition` future cannot strand it.
struct Dispatch<S, C: Clock> {
    settler: Arc<Settler<S>>,
    tracker: Arc<AsyncOperationTracker<C>>,
    adapter: Arc<dyn LifecycleAdapter>,
    adapter_name: String,
    transitional: Entity,
    correlation_id: CorrelationId,
}

impl<S, C> Dispatch<S, C>
where
    S: EntityStore + 'static,
    C: Clock,
{
    async fn run(self, request: WorkRequest) -> Result<Entity, LifecycleError> {
        let adapter = Arc::clone(&self.adapter);
        let joined = tokio::spawn(async move { adapter.perform(request).await }).await;
        let outcome = match joined {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) if e.is_panic() => Err(format!("adapter {} panicked", self.adapter_name)),
            Err(_) => Err(format!("adapter {} was cancelled", self.adapter_name)),
        };

        let id = self.transitional.id.clone();
        match outcome {
            Ok(AdapterOutcome::Pending) => {
                tracing::debug!(correlation_id = %self.correlation_id, "awaiting completion");
                Ok(self.transitional)
            }
            Ok(AdapterOutcome::Completed) => {
                if self.tracker.withdraw(&self.correlation_id) {
                    self.settle(OperationResult::Succeeded)
                } else {
                    // A completion already arrived through the tracker
                    Ok(self.settler.store.load(&id)?)
                }
            }
            Err(reason) => {
                if self.tracker.withdraw(&self.correlation_id) {
                    self.settle(OperationResult::failed(reason.clone()))?;
                }
                Err(LifecycleError::AdapterFailure {
                    entity: id.clone(),
                    reason,
                })
            }
        }
    }

    fn settle(&self, result: OperationResult) -> Result<Entity, LifecycleError> {
        self.settler.settle(
            &self.transitional.id,
            self.transitional.updated_count,
            &self.correlation_id,
            result,
        )
    }
}

/// Coordinates lifecycle transitions across the state model, adapters and storage
pub struct Coordinator<S, C: Clock, I> {
    settler: Arc<Settler<S>>,
    registry: Arc<AdapterRegistry>,
    tracker: Arc<AsyncOperationTracker<C>>,
    id_gen: I,
}

impl<S, C, I> Coordinator<S, C, I>
where
    S: EntityStore + 'static,
    C: Clock,
    I: IdGen,
{
    /// Compose a coordinator; the model must pass [`StateModel::validate`]
    pub fn new(deps: CoordinatorDeps<S, C, I>) -> Result<Self, LifecycleError> {
        deps.model.validate()?;
        Ok(Self {
            settler: Arc::new(Settler {
                store: deps.store,
                model: deps.model,
                bus: SettlementBus::new(),
                in_flight: Mutex::new(HashMap::new()),
            }),
            registry: deps.registry,
            tracker: deps.tracker,
            id_gen: deps.id_gen,
        })
    }

    pub fn store(&self) -> &S {
        &self.settler.store
    }

    pub fn model(&self) -> &StateModel {
        &self.settler.model
    }

    pub fn tracker(&self) -> &Arc<AsyncOperationTracker<C>> {
        &self.tracker
    }

    /// Receive a [`Settlement`] for every terminal transition driven by work
    pub fn subscribe(&self) -> SettlementReceiver {
        self.settler.bus.subscribe()
    }

    /// Apply `event` to the entity
    ///
    /// Returns the entity as last written by this call: its terminal state
    /// when the work finished inline, its transitional state when the work
    /// continues asynchronously. Once the transitional write has happened,
    /// dropping the returned future does not stop the work from settling.
    pub async fn request_transition(
        &self,
        id: &EntityId,
        event: LifecycleEvent,
        context: WorkContext,
    ) -> Result<Entity, LifecycleError> {
        let span = tracing::info_span!("transition", entity = %id, %event);
        async {
            let start = Instant::now();
            let result = self.drive(id, event, context).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(entity) => tracing::info!(state = %entity.state, elapsed_ms, "done"),
                Err(e) => tracing::warn!(error = %e, elapsed_ms, "rejected"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Cancel every pending operation; each affected entity settles as failed
    pub fn shutdown(&self, reason: &str) -> usize {
        let cancelled = self.tracker.cancel_all(reason);
        tracing::info!(cancelled, reason, "coordinator shut down");
        cancelled
    }

    async fn drive(
        &self,
        id: &EntityId,
        event: LifecycleEvent,
        context: WorkContext,
    ) -> Result<Entity, LifecycleError> {
        let store = &self.settler.store;
        let entity = store.load(id)?;
        let next = self.settler.model.apply(&entity.kind, entity.state, event)?;

        // Reports and moves between stable states need no adapter
        let work = match event.work() {
            Some(work) if next.is_transitional() => work,
            _ => {
                let saved = store.save(id, next, entity.updated_count)?;
                if event.is_report() {
                    self.release_reported(id);
                }
                return Ok(saved);
            }
        };

        let registration = self
            .registry
            .resolve(&entity.kind, |adapter| adapter.handles(work))
            .ok_or_else(|| LifecycleError::AdapterNotFound {
                entity: id.clone(),
                kind: entity.kind.clone(),
                work,
            })?;

        let transitional = store.save(id, next, entity.updated_count)?;
        tracing::debug!(
            adapter = registration.name(),
            state = %transitional.state,
            "work started"
        );

        let correlation_id = CorrelationId::new(self.id_gen.next());
        let settler = Arc::clone(&self.settler);
        let entity_id = id.clone();
        let version = transitional.updated_count;
        let callback_id = correlation_id.clone();
        let issued = self.tracker.issue(correlation_id.clone(), move |result| {
            match settler.settle(&entity_id, version, &callback_id, result) {
                Ok(_) => {}
                Err(e) if e.is_conflict() => tracing::warn!(
                    entity = %entity_id,
                    correlation_id = %callback_id,
                    "stale completion ignored, entity has moved on"
                ),
                Err(e) => tracing::error!(
                    entity = %entity_id,
                    error = %e,
                    "failed to settle completed operation"
                ),
            }
        });
        if let Err(e) = issued {
            self.settler.settle(
                id,
                version,
                &correlation_id,
                OperationResult::failed(e.to_string()),
            )?;
            return Err(e);
        }
        self.settler.track(id, &correlation_id);

        let request = WorkRequest {
            entity: transitional.clone(),
            event,
            work,
            correlation_id: correlation_id.clone(),
            context,
        };
        let dispatch = Dispatch {
            settler: Arc::clone(&self.settler),
            tracker: Arc::clone(&self.tracker),
            adapter: Arc::clone(registration.adapter()),
            adapter_name: registration.name().to_string(),
            transitional,
            correlation_id,
        };
        match tokio::spawn(dispatch.run(request).in_current_span()).await {
            Ok(result) => result,
            Err(e) => Err(LifecycleError::AdapterFailure {
                entity: id.clone(),
                reason: format!("work task for {} ended early: {e}", registration.name()),
            }),
        }
    }

    /// A report applied directly resolves whatever work the entity was
    /// waiting on; its completion is no longer wanted.
    fn release_reported(&self, id: &EntityId) {
        if let Some(correlation_id) = self.settler.take(id) {
            if self.tracker.withdraw(&correlation_id) {
                tracing::debug!(%correlation_id, "pending operation resolved by direct report");
            }
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
