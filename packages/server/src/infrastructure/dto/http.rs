//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Room detail for the room endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub room_code: String,
    pub members: Vec<MemberDto>,
}

/// One connection in a room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub connection_id: String,
    pub name: String,
    pub joined_at: String, // ISO 8601
}
