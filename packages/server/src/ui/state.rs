//! Server state shared by the handlers.

use std::sync::Arc;

use crate::{
    domain::{ConnectionRegistry, Endpoint, RoomIndex},
    infrastructure::delivery::WebSocketTransport,
};

/// Shared application state
pub struct AppState {
    /// Connection registry（データアクセス層の抽象化）
    pub registry: Arc<dyn ConnectionRegistry>,
    /// Room index over the registry
    pub room_index: Arc<dyn RoomIndex>,
    /// Outbound queues of the live sockets
    pub transport: Arc<WebSocketTransport>,
    /// Endpoint this server's sockets are reached through
    pub endpoint: Endpoint,
    /// Remove sessions whose connection is found gone during a fan-out
    pub prune_stale: bool,
}
