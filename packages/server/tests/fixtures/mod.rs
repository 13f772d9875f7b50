//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use futures_util::{SinkExt, StreamExt};
use huddle_server::ServerConfig;
use serde_json::Value;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Relay server running in-process on an ephemeral port.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        huddle_shared::logger::setup_logger("huddle-server", "debug");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = huddle_server::serve(listener, config, shutdown).await {
                panic!("Test server failed: {e}");
            }
        });

        Self {
            addr,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub async fn connect(&self) -> WsClient {
        let (ws, _) = connect_async(self.ws_url())
            .await
            .expect("Failed to connect WebSocket");
        ws
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

pub async fn send_json(ws: &mut WsClient, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Next text frame as JSON, failing the test after two seconds.
pub async fn recv_json(ws: &mut WsClient) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Stream ended")
            .expect("WebSocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
        }
    }
}

/// Assert that no text frame arrives within `wait`.
pub async fn assert_silent(ws: &mut WsClient, wait: Duration) {
    if let Ok(Some(Ok(Message::Text(text)))) = tokio::time::timeout(wait, ws.next()).await {
        panic!("Unexpected frame: {}", text.as_str());
    }
}

/// Create a room as `name` and return its code.
pub async fn create_room(ws: &mut WsClient, name: &str) -> String {
    send_json(ws, serde_json::json!({"action": "createRoom", "name": name})).await;
    let joined = recv_json(ws).await;
    joined["roomCode"]
        .as_str()
        .expect("createRoom reply has no roomCode")
        .to_string()
}

pub async fn join_room(ws: &mut WsClient, name: &str, room_code: &str) {
    send_json(
        ws,
        serde_json::json!({"action": "joinRoom", "name": name, "roomCode": room_code}),
    )
    .await;
    let joined = recv_json(ws).await;
    assert_eq!(joined["type"], "info", "join failed: {joined}");
}
