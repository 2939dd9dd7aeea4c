//! Tests for the room registry.

use std::sync::Arc;

use super::RoomRegistry;

#[tokio::test]
async fn snapshot_reflects_joins_and_leaves() {
    let registry = RoomRegistry::new();

    registry.register_room("room-1", "alice's room").await;
    registry.participant_joined("room-1").await;
    registry.participant_joined("room-1").await;

    let snapshot = registry.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].room_id, "room-1");
    assert_eq!(snapshot[0].display_name, "alice's room");
    assert_eq!(snapshot[0].participant_count, 2);

    registry.participant_left("room-1").await;
    assert_eq!(registry.snapshot().await[0].participant_count, 1);
}

#[tokio::test]
async fn participant_count_never_goes_below_zero() {
    let registry = RoomRegistry::new();

    registry.participant_joined("room-1").await;
    registry.participant_left("room-1").await;
    registry.participant_left("room-1").await;

    assert_eq!(registry.snapshot().await[0].participant_count, 0);
}

#[tokio::test]
async fn join_for_unknown_room_creates_it() {
    let registry = RoomRegistry::new();

    registry.participant_joined("surprise").await;

    let snapshot = registry.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].room_id, "surprise");
    assert_eq!(snapshot[0].participant_count, 1);
}

#[tokio::test]
async fn finished_room_is_removed() {
    let registry = RoomRegistry::new();

    registry.register_room("room-1", "room one").await;
    registry.room_finished("room-1").await;

    assert!(registry.snapshot().await.is_empty());
}

#[tokio::test]
async fn every_change_broadcasts_a_full_snapshot() {
    let registry = RoomRegistry::new();
    let mut rx = registry.subscribe();

    registry.register_room("room-1", "room one").await;
    let first = rx.recv().await.expect("first snapshot");
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].participant_count, 0);

    registry.participant_joined("room-1").await;
    let second = rx.recv().await.expect("second snapshot");
    assert_eq!(second[0].participant_count, 1);
}

#[tokio::test]
async fn concurrent_mutations_broadcast_in_generation_order() {
    let registry = Arc::new(RoomRegistry::new());
    let mut rx = registry.subscribe();

    // Snapshot and send share the mutator's critical section, so counts must
    // arrive strictly increasing even when the joins race each other.
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move {
            registry.participant_joined("room-1").await;
        }));
    }
    for task in tasks {
        task.await.expect("join task");
    }

    let mut last = 0;
    for _ in 0..8 {
        let snapshot = rx.recv().await.expect("snapshot");
        assert_eq!(snapshot[0].participant_count, last + 1);
        last = snapshot[0].participant_count;
    }
    assert_eq!(last, 8);
}

#[tokio::test]
async fn registering_an_existing_room_is_a_noop() {
    let registry = RoomRegistry::new();

    registry.register_room("room-1", "original").await;
    registry.participant_joined("room-1").await;
    registry.register_room("room-1", "imposter").await;

    let snapshot = registry.snapshot().await;
    assert_eq!(snapshot[0].display_name, "original");
    assert_eq!(snapshot[0].participant_count, 1);
}
