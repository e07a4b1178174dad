//! Durable store specs
//!
//! Verify that lifecycle progress survives reopening the store.

use crate::prelude::*;

#[tokio::test]
async fn progress_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("entities.jsonl");

    {
        let store = Arc::new(WalStore::open(&path).unwrap());
        store
            .insert(host("h-1", ResourceState::Allocated))
            .unwrap();
        let world = World::with_store(Arc::clone(&store));
        world.register(HOST, "kvm", FakeAdapter::succeeding());

        world
            .request("h-1", LifecycleEvent::DeployRequested)
            .await
            .unwrap();
        world
            .request("h-1", LifecycleEvent::InitializeRequested)
            .await
            .unwrap();
    }

    let reopened = WalStore::open(&path).unwrap();
    let entity = reopened.load(&EntityId::new("h-1")).unwrap();
    assert_eq!(entity.state, ResourceState::Ready);
    assert_eq!(entity.updated_count, 4);
    assert_eq!(reopened.sequence(), 5);
}

#[tokio::test]
async fn pending_work_is_visible_as_transitional_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entities.jsonl");

    {
        let store = Arc::new(WalStore::open(&path).unwrap());
        store
            .insert(file_share("fs-1", ResourceState::Allocated))
            .unwrap();
        let world = World::with_store(store);
        world.register(FILE_SHARE, "nfs", FakeAdapter::deferring());
        world
            .request("fs-1", LifecycleEvent::DeployRequested)
            .await
            .unwrap();
    }

    // A restarted host sees the in-flight marker and can report the outcome
    let world = World::with_store(Arc::new(WalStore::open(&path).unwrap()));
    assert_eq!(world.entity("fs-1").state, ResourceState::Deploying);
    let entity = world
        .request("fs-1", LifecycleEvent::OperationFailed)
        .await
        .unwrap();
    assert_eq!(entity.state, ResourceState::Allocated);
}
