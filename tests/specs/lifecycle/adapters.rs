//! Adapter resolution specs
//!
//! Verify how the coordinator finds adapters and what happens without one.

use crate::prelude::*;

#[tokio::test]
async fn start_without_adapter_fails_and_leaves_entity_unchanged() {
    let world = World::new([host("h-1", ResourceState::Stopped)]);
    let before = world.entity("h-1");

    let err = world
        .request("h-1", LifecycleEvent::StartRequested)
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::AdapterNotFound { .. }));
    assert_eq!(world.entity("h-1"), before);
}

#[tokio::test]
async fn superseding_adapter_takes_the_work() {
    let world = World::new([host("h-1", ResourceState::Allocated)]);
    let legacy = world.register(HOST, "legacy", FakeAdapter::succeeding());
    let modern = FakeAdapter::succeeding();
    world
        .registry
        .register(
            HOST,
            AdapterRegistration::new("modern", modern.clone()).superseding(["legacy"]),
        )
        .unwrap();

    world
        .request("h-1", LifecycleEvent::DeployRequested)
        .await
        .unwrap();

    assert_eq!(legacy.call_count(), 0);
    assert_eq!(modern.call_count(), 1);
}

#[tokio::test]
async fn agent_commands_complete_through_the_tracker() {
    let world = World::new([file_share("fs-1", ResourceState::Allocated)]);
    let table = CommandTable::new().with(CommandTag::CreateResource, |cmd| {
        match cmd.params.get("size_gb") {
            Some(_) => Ok(()),
            None => Err("size_gb is required".to_string()),
        }
    });
    let agent = LocalAgent::new(table, world.tracker.clone());
    world
        .registry
        .register(
            FILE_SHARE,
            AdapterRegistration::new("agent", AgentAdapter::new(agent, [WorkKind::Deploy])),
        )
        .unwrap();
    let mut settlements = world.coordinator.subscribe();

    world
        .coordinator
        .request_transition(
            &EntityId::new("fs-1"),
            LifecycleEvent::DeployRequested,
            WorkContext::new().with("size_gb", "50"),
        )
        .await
        .unwrap();

    let settlement = settlements.recv().await.unwrap();
    assert!(settlement.result.is_success());
    assert_eq!(world.entity("fs-1").state, ResourceState::Deployed);
    assert_eq!(world.tracker.pending_count(), 0);
}

#[tokio::test]
async fn agent_handler_failure_rolls_back() {
    let world = World::new([file_share("fs-1", ResourceState::Allocated)]);
    let table = CommandTable::new()
        .with(CommandTag::CreateResource, |_| Err("quota exceeded".to_string()));
    let agent = LocalAgent::new(table, world.tracker.clone());
    world
        .registry
        .register(
            FILE_SHARE,
            AdapterRegistration::new("agent", AgentAdapter::new(agent, [WorkKind::Deploy])),
        )
        .unwrap();
    let mut settlements = world.coordinator.subscribe();

    world
        .request("fs-1", LifecycleEvent::DeployRequested)
        .await
        .unwrap();

    let settlement = settlements.recv().await.unwrap();
    assert!(settlement.result.reason().unwrap().contains("quota exceeded"));
    assert_eq!(world.entity("fs-1").state, ResourceState::Allocated);
}
