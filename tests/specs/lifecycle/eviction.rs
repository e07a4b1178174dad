//! Cache eviction specs
//!
//! Verify victim selection and eviction through the cache lifecycle.

use crate::prelude::*;

#[test]
fn referenced_oldest_candidate_is_passed_over() {
    let base = std::time::Instant::now();
    let hour = Duration::from_secs(3600);
    let candidates = vec![
        CacheCandidate::new("obj-oldest", base).with_ref_count(1),
        CacheCandidate::new("obj-second", base + hour),
        CacheCandidate::new("obj-newest", base + 2 * hour),
    ];
    let now = base + 4 * hour;

    let victim = LeastRecentlyUsed
        .choose_victim(&candidates, hour, now)
        .unwrap();
    assert_eq!(victim.id, EntityId::new("obj-second"));
}

#[tokio::test]
async fn eviction_expunges_through_the_cache_lifecycle() {
    let world = World::new([
        Entity::new("obj-1", CACHE_OBJECT, ResourceState::Ready),
        Entity::new("obj-2", CACHE_OBJECT, ResourceState::Ready),
    ]);
    world.register(
        CACHE_OBJECT,
        "image-cache",
        FakeAdapter::succeeding().handling([WorkKind::Deploy, WorkKind::Expunge]),
    );
    let start = world.clock.now();
    let candidates = vec![
        CacheCandidate::new("obj-1", start + Duration::from_secs(30)),
        CacheCandidate::new("obj-2", start),
    ];
    world.clock.advance(Duration::from_secs(2 * 3600));

    let config = EngineConfig::from_toml_str("cache_unused_threshold = \"1h\"").unwrap();
    let evictor = CacheEvictor::new(
        LeastRecentlyUsed,
        |_: &EntityId| 0u32,
        world.clock.clone(),
        &config,
    );

    let evicted = evictor
        .evict_one(&world.coordinator, &candidates)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(evicted.id, EntityId::new("obj-2"));
    assert_eq!(evicted.state, ResourceState::Expunged);
    assert_eq!(world.entity("obj-1").state, ResourceState::Ready);
}
