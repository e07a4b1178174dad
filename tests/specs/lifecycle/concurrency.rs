//! Concurrency specs
//!
//! Verify that racing requests for one entity never both write.

use crate::prelude::*;
use lifecycle_storage::StoreError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;

/// Store whose first two loads wait for each other
#[derive(Clone)]
struct LockstepStore {
    inner: MemoryStore,
    barrier: Arc<Barrier>,
    loads: Arc<AtomicUsize>,
}

impl EntityStore for LockstepStore {
    fn load(&self, id: &EntityId) -> Result<Entity, StoreError> {
        let entity = self.inner.load(id)?;
        if self.loads.fetch_add(1, Ordering::SeqCst) < 2 {
            self.barrier.wait();
        }
        Ok(entity)
    }

    fn save(
        &self,
        id: &EntityId,
        new_state: ResourceState,
        expected_updated_count: u64,
    ) -> Result<Entity, StoreError> {
        self.inner.save(id, new_state, expected_updated_count)
    }

    fn insert(&self, entity: Entity) -> Result<(), StoreError> {
        self.inner.insert(entity)
    }

    fn remove(&self, id: &EntityId) -> Result<(), StoreError> {
        self.inner.remove(id)
    }
}

#[test]
fn racing_deploys_have_exactly_one_winner() {
    let mut entity = file_share("fs-1", ResourceState::Allocated);
    entity.updated_count = 5;
    let store = LockstepStore {
        inner: MemoryStore::with_entities([entity]),
        barrier: Arc::new(Barrier::new(2)),
        loads: Arc::new(AtomicUsize::new(0)),
    };
    let world = World::with_store(store);
    let adapter = world.register(FILE_SHARE, "nfs", FakeAdapter::succeeding());

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let coordinator = Arc::clone(&world.coordinator);
            std::thread::spawn(move || {
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap()
                    .block_on(coordinator.request_transition(
                        &EntityId::new("fs-1"),
                        LifecycleEvent::DeployRequested,
                        WorkContext::new(),
                    ))
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].state, ResourceState::Deployed);

    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(
        matches!(loser, LifecycleError::ConcurrentModification { expected: 5, .. }),
        "unexpected error: {loser:?}"
    );
    assert_eq!(adapter.call_count(), 1);
    assert_eq!(world.entity("fs-1").updated_count, 7);
}

#[tokio::test]
async fn retry_helper_does_not_retry_illegal_transitions() {
    let world = World::new([file_share("fs-1", ResourceState::Allocated)]);
    world.register(FILE_SHARE, "nfs", FakeAdapter::deferring());

    world
        .request("fs-1", LifecycleEvent::DeployRequested)
        .await
        .unwrap();

    // The entity already moved on; a retry sees the new state and is rejected
    let world = &world;
    let err = lifecycle_engine::retry_on_conflict(3, move || {
        world.request("fs-1", LifecycleEvent::DeployRequested)
    })
    .await
    .unwrap_err();
    assert!(matches!(err, LifecycleError::IllegalTransition { .. }));
}

#[tokio::test]
async fn distinct_entities_progress_independently() {
    let world = World::new((0..8).map(|i| host(&format!("h-{i}"), ResourceState::Allocated)));
    world.register(HOST, "kvm", FakeAdapter::succeeding());

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let coordinator = Arc::clone(&world.coordinator);
            tokio::spawn(async move {
                coordinator
                    .request_transition(
                        &EntityId::new(format!("h-{i}")),
                        LifecycleEvent::DeployRequested,
                        WorkContext::new(),
                    )
                    .await
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap().state, ResourceState::Deployed);
    }
}
