//! Server configuration from command-line flags and environment variables.

use clap::Parser;

/// Runtime configuration of the relay server.
#[derive(Debug, Clone, Parser)]
#[command(name = "huddle-server", version, about = "Room-based WebSocket relay")]
pub struct ServerConfig {
    /// Address to bind the HTTP / WebSocket listener to
    #[arg(long, env = "HUDDLE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "HUDDLE_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Stage name, combined with the bound address to form the delivery endpoint
    #[arg(long, env = "HUDDLE_STAGE", default_value = "local")]
    pub stage: String,

    /// Name of the connection registry / room index store
    #[arg(long, env = "ROOM_CONNECTION_TABLE", default_value = "room-connections")]
    pub table_name: String,

    /// Remove a recipient's session when a delivery finds its connection gone
    #[arg(long, env = "HUDDLE_PRUNE_STALE_CONNECTIONS")]
    pub prune_stale_connections: bool,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "HUDDLE_LOG_LEVEL", default_value = "debug")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            stage: "local".to_string(),
            table_name: "room-connections".to_string(),
            prune_stale_connections: false,
            log_level: "debug".to_string(),
        }
    }
}
