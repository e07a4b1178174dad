//! Deploy lifecycle specs
//!
//! Verify that work requested through the coordinator always ends in a
//! stable state, whether it finishes inline or later.

use crate::prelude::*;

#[tokio::test]
async fn deploy_with_inline_success_reaches_deployed_in_two_writes() {
    let world = World::new([file_share("fs-1", ResourceState::Allocated)]);
    world.register(FILE_SHARE, "nfs", FakeAdapter::succeeding());
    let before = world.entity("fs-1").updated_count;

    let entity = world
        .request("fs-1", LifecycleEvent::DeployRequested)
        .await
        .unwrap();

    assert_eq!(entity.state, ResourceState::Deployed);
    // One write for Deploying, one for Deployed
    assert_eq!(entity.updated_count, before + 2);
    assert_eq!(world.store.transition_count(), 2);
}

#[tokio::test]
async fn deploy_with_async_failure_returns_to_allocated() {
    let world = World::new([file_share("fs-1", ResourceState::Allocated)]);
    let adapter = world.register(FILE_SHARE, "nfs", FakeAdapter::deferring());
    let mut settlements = world.coordinator.subscribe();

    let entity = world
        .request("fs-1", LifecycleEvent::DeployRequested)
        .await
        .unwrap();
    assert_eq!(entity.state, ResourceState::Deploying);

    let id = adapter.last_correlation_id().unwrap();
    assert!(world
        .tracker
        .complete(&id, OperationResult::failed("backend unreachable")));

    let Settlement { entity, result } = settlements.recv().await.unwrap();
    assert_eq!(entity.state, ResourceState::Allocated);
    assert_eq!(result.reason(), Some("backend unreachable"));
    assert_eq!(world.entity("fs-1").state, ResourceState::Allocated);
}

#[tokio::test]
async fn full_host_lifecycle() {
    let world = World::new([host("h-1", ResourceState::Allocated)]);
    world.register(HOST, "kvm", FakeAdapter::succeeding());

    let steps = [
        (LifecycleEvent::DeployRequested, ResourceState::Deployed),
        (LifecycleEvent::InitializeRequested, ResourceState::Ready),
        (LifecycleEvent::StopRequested, ResourceState::Stopped),
        (LifecycleEvent::StartRequested, ResourceState::Ready),
        (LifecycleEvent::StopRequested, ResourceState::Stopped),
        (LifecycleEvent::DestroyRequested, ResourceState::Destroyed),
        (LifecycleEvent::RecoverRequested, ResourceState::Stopped),
        (LifecycleEvent::DestroyRequested, ResourceState::Destroyed),
        (LifecycleEvent::ExpungeRequested, ResourceState::Expunged),
    ];
    for (event, expected) in steps {
        let entity = world.request("h-1", event).await.unwrap();
        assert_eq!(entity.state, expected, "after {event}");
    }
}

#[tokio::test]
async fn stale_async_work_is_swept_into_failure() {
    let world = World::new([host("h-1", ResourceState::Stopped)]);
    world.register(HOST, "kvm", FakeAdapter::deferring());
    let config = EngineConfig::new().with_stale_operation_threshold(Duration::from_secs(600));
    let sweeper = StaleOperationSweeper::new(Arc::clone(&world.tracker), &config);

    world
        .request("h-1", LifecycleEvent::StartRequested)
        .await
        .unwrap();
    assert!(sweeper.sweep().is_empty());

    world.clock.advance(Duration::from_secs(601));
    assert_eq!(sweeper.sweep().len(), 1);
    assert_eq!(world.entity("h-1").state, ResourceState::Stopped);
}
