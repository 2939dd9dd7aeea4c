//! Room Registry
//!
//! Process-lifetime `roomId -> RoomSummary` state. Every mutation recomputes
//! the full snapshot and broadcasts it; there is no persistence, the registry
//! is rebuilt from engine webhooks after a restart.

use std::collections::BTreeMap;

use sr_common::RoomSummary;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

/// Broadcast channel capacity. A lagged subscriber resynchronizes from the
/// current snapshot, so skipped generations are harmless.
const BROADCAST_CAPACITY: usize = 16;

struct RoomEntry {
    display_name: String,
    participant_count: u32,
}

/// The authoritative registry of active rooms.
///
/// Snapshots are pushed whole to all directory subscribers on every change.
/// Per-subscriber ordering is generation order; generations may be skipped
/// but never reordered.
pub struct RoomRegistry {
    rooms: RwLock<BTreeMap<String, RoomEntry>>,
    tx: broadcast::Sender<Vec<RoomSummary>>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            rooms: RwLock::new(BTreeMap::new()),
            tx,
        }
    }

    /// Subscribe to snapshot broadcasts.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<RoomSummary>> {
        self.tx.subscribe()
    }

    /// Current full snapshot, one entry per tracked room.
    pub async fn snapshot(&self) -> Vec<RoomSummary> {
        snapshot_of(&*self.rooms.read().await)
    }

    /// Register a room ahead of anyone joining it (host token path).
    ///
    /// The room starts at zero participants; clients filter it out until the
    /// engine reports the first join. Registering an existing room is a no-op.
    pub async fn register_room(&self, room_id: &str, display_name: &str) {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(room_id) {
            return;
        }
        rooms.insert(
            room_id.to_owned(),
            RoomEntry {
                display_name: display_name.to_owned(),
                participant_count: 0,
            },
        );
        info!(room_id = %room_id, "Room registered");
        self.broadcast(&rooms);
    }

    /// Mark a room as started by the media engine.
    pub async fn room_started(&self, room_id: &str) {
        let mut rooms = self.rooms.write().await;
        rooms.entry(room_id.to_owned()).or_insert_with(|| RoomEntry {
            display_name: room_id.to_owned(),
            participant_count: 0,
        });
        debug!(room_id = %room_id, "Room started");
        self.broadcast(&rooms);
    }

    /// Remove a finished room from the registry.
    pub async fn room_finished(&self, room_id: &str) {
        let mut rooms = self.rooms.write().await;
        if rooms.remove(room_id).is_none() {
            return;
        }
        info!(room_id = %room_id, "Room finished");
        self.broadcast(&rooms);
    }

    /// Record a participant joining a room.
    ///
    /// A join for an unknown room creates it, so a missed `room_started`
    /// webhook cannot leave the directory stale.
    pub async fn participant_joined(&self, room_id: &str) {
        let mut rooms = self.rooms.write().await;
        let entry = rooms.entry(room_id.to_owned()).or_insert_with(|| RoomEntry {
            display_name: room_id.to_owned(),
            participant_count: 0,
        });
        entry.participant_count += 1;
        debug!(room_id = %room_id, "Participant joined");
        self.broadcast(&rooms);
    }

    /// Record a participant leaving a room. The count never goes below zero.
    pub async fn participant_left(&self, room_id: &str) {
        let mut rooms = self.rooms.write().await;
        let Some(entry) = rooms.get_mut(room_id) else {
            return;
        };
        entry.participant_count = entry.participant_count.saturating_sub(1);
        debug!(room_id = %room_id, "Participant left");
        self.broadcast(&rooms);
    }

    /// Push a snapshot to all subscribers, best-effort.
    ///
    /// Called with the mutator's write guard still held: the send happens
    /// inside the critical section, so snapshots enter the channel in the
    /// same order the mutations took effect.
    fn broadcast(&self, rooms: &BTreeMap<String, RoomEntry>) {
        // send only fails when there are no subscribers, which is fine
        let _ = self.tx.send(snapshot_of(rooms));
    }
}

fn snapshot_of(rooms: &BTreeMap<String, RoomEntry>) -> Vec<RoomSummary> {
    rooms
        .iter()
        .map(|(room_id, entry)| RoomSummary {
            room_id: room_id.clone(),
            display_name: entry.display_name.clone(),
            participant_count: entry.participant_count,
        })
        .collect()
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;
