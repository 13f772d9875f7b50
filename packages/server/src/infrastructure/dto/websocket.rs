//! WebSocket frame DTOs.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Inbound text frame, routed by its `action` field.
///
/// For `message` the whole frame is handed to the relay as the request body,
/// so its fields are not modelled here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ActionFrame {
    CreateRoom {
        #[serde(default)]
        name: Option<String>,
    },
    JoinRoom {
        #[serde(default)]
        name: Option<String>,
        #[serde(default, rename = "roomCode")]
        room_code: Option<String>,
    },
    Message {},
    LeaveRoom {},
}

impl ActionFrame {
    /// Parse a text frame. `None` for anything without a known action.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "createRoom",
            Self::JoinRoom { .. } => "joinRoom",
            Self::Message {} => "message",
            Self::LeaveRoom {} => "leaveRoom",
        }
    }
}

/// Structured result of handling one action.
///
/// `{"statusCode":200,"body":{}}` on success, or a failure status with
/// `{"message": ..}` in the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub status_code: u16,
    pub body: Value,
}

impl ActionResponse {
    pub fn ok() -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            body: json!({}),
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            body: json!({ "message": message.into() }),
        }
    }

    /// `502` carrying the description of an internal failure
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::failure(StatusCode::BAD_GATEWAY, message)
    }

    pub fn is_success(&self) -> bool {
        StatusCode::from_u16(self.status_code).is_ok_and(|status| status.is_success())
    }
}
