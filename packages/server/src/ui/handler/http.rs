//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use huddle_shared::time::timestamp_to_jst_rfc3339;

use crate::{
    domain::RoomCode,
    infrastructure::dto::http::{MemberDto, RoomDetailDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get the connections currently in a room
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_code): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_code = RoomCode::new(room_code).map_err(|_| StatusCode::NOT_FOUND)?;

    let members = state.room_index.query(&room_code).await.map_err(|e| {
        tracing::error!("Failed to query room '{}': {}", room_code, e);
        StatusCode::BAD_GATEWAY
    })?;
    if members.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }

    let room_detail = RoomDetailDto {
        room_code: room_code.as_str().to_string(),
        members: members
            .into_iter()
            .map(|m| MemberDto {
                connection_id: m.connection_id.into_string(),
                name: m.name.as_str().to_string(),
                joined_at: timestamp_to_jst_rfc3339(m.joined_at.value()),
            })
            .collect(),
    };

    Ok(Json(room_detail))
}
