//! Room-based WebSocket relay.
//!
//! Clients join a room over a WebSocket connection; every chat message a
//! client sends is fanned out to all other connections in the same room.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use ui::{run, serve};
