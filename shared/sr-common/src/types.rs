//! Directory Types

use serde::{Deserialize, Serialize};

/// One active room as reported by the directory service.
///
/// Produced by the server; the client never mutates it. A room with zero
/// participants may briefly exist in the registry during teardown and is
/// filtered out of user-facing lists on the client side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    /// Unique, stable room identifier.
    pub room_id: String,
    /// Human-readable room name shown in the join picker.
    pub display_name: String,
    /// Number of participants currently connected.
    pub participant_count: u32,
}
