//! Room-based WebSocket relay server.
//!
//! Fans each chat message out to every other connection in the sender's room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin huddle-server -- --port 8080
//! ```

use clap::Parser;
use huddle_server::ServerConfig;
use huddle_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = huddle_server::run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
