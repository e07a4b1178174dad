//! Shared fixtures for lifecycle specs

#![allow(dead_code)]

pub use lifecycle_adapters::{
    AdapterRegistration, AdapterRegistry, AgentAdapter, CommandTable, CommandTag, FakeAdapter,
    FakeBehavior, LocalAgent, WorkContext,
};
pub use lifecycle_core::model::{CACHE_OBJECT, FILE_SHARE, HOST};
pub use lifecycle_core::{
    CacheCandidate, Clock, EngineConfig, Entity, EntityId, FakeClock, LeastRecentlyUsed,
    LifecycleEvent, OperationResult, ReplacementPolicy, ResourceState, SequentialIdGen,
    StateModel, WorkKind,
};
pub use lifecycle_engine::{
    AsyncOperationTracker, CacheEvictor, Coordinator, CoordinatorDeps, LifecycleError,
    Settlement, StaleOperationSweeper,
};
pub use lifecycle_storage::{EntityStore, MemoryStore, WalStore};
pub use std::sync::Arc;
pub use std::time::Duration;

/// A fully composed engine over store `S`
pub struct World<S: EntityStore + 'static> {
    pub coordinator: Arc<Coordinator<S, FakeClock, SequentialIdGen>>,
    pub store: S,
    pub registry: Arc<AdapterRegistry>,
    pub tracker: Arc<AsyncOperationTracker<FakeClock>>,
    pub clock: FakeClock,
}

impl World<MemoryStore> {
    pub fn new(entities: impl IntoIterator<Item = Entity>) -> Self {
        Self::with_store(MemoryStore::with_entities(entities))
    }
}

impl<S: EntityStore + Clone + 'static> World<S> {
    pub fn with_store(store: S) -> Self {
        let clock = FakeClock::new();
        let registry = Arc::new(AdapterRegistry::new());
        let tracker = Arc::new(AsyncOperationTracker::new(clock.clone()));
        let coordinator = Coordinator::new(CoordinatorDeps {
            store: store.clone(),
            model: Arc::new(StateModel::with_defaults().unwrap()),
            registry: Arc::clone(&registry),
            tracker: Arc::clone(&tracker),
            id_gen: SequentialIdGen::new("op"),
        })
        .unwrap();
        Self {
            coordinator: Arc::new(coordinator),
            store,
            registry,
            tracker,
            clock,
        }
    }

    pub fn register(&self, kind: &str, name: &str, adapter: FakeAdapter) -> FakeAdapter {
        self.registry
            .register(kind, AdapterRegistration::new(name, adapter.clone()))
            .unwrap();
        adapter
    }

    pub async fn request(
        &self,
        id: &str,
        event: LifecycleEvent,
    ) -> Result<Entity, LifecycleError> {
        self.coordinator
            .request_transition(&EntityId::new(id), event, WorkContext::new())
            .await
    }

    pub fn entity(&self, id: &str) -> Entity {
        self.store.load(&EntityId::new(id)).unwrap()
    }
}

pub fn host(id: &str, state: ResourceState) -> Entity {
    Entity::new(id, HOST, state)
}

pub fn file_share(id: &str, state: ResourceState) -> Entity {
    Entity::new(id, FILE_SHARE, state)
}
