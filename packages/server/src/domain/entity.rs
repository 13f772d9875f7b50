//! Core domain models for the relay.

use serde::{Deserialize, Serialize};

use super::value_object::{ConnectionId, DisplayName, RoomCode, Timestamp};

/// One live connection that has joined a room.
///
/// A session exists in the registry only while its connection is joined;
/// absence means "not joined".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSession {
    /// Primary key, assigned by the transport at connect time
    pub connection_id: ConnectionId,
    /// Display name chosen at join time
    pub name: DisplayName,
    /// Room the connection has joined
    pub room_code: RoomCode,
    /// Timestamp when the connection joined the room
    pub joined_at: Timestamp,
}

impl ConnectionSession {
    /// Create a new session
    pub fn new(
        connection_id: ConnectionId,
        name: DisplayName,
        room_code: RoomCode,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            connection_id,
            name,
            room_code,
            joined_at,
        }
    }

    /// Whether this session belongs to the given connection.
    pub fn is_connection(&self, connection_id: &ConnectionId) -> bool {
        &self.connection_id == connection_id
    }
}
