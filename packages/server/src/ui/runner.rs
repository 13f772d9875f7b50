//! Server wiring and lifecycle.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::Endpoint,
    infrastructure::{delivery::WebSocketTransport, repository::InMemoryConnectionRepository},
    ui::{
        handler::{get_room_detail, health_check, websocket_handler},
        signal::shutdown_signal,
        state::AppState,
    },
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/rooms/{room_code}", get(get_room_detail))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind to the configured address and serve until Ctrl+C / SIGTERM.
pub async fn run(config: ServerConfig) -> Result<(), BoxError> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    serve(listener, config, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, config: ServerConfig, shutdown: F) -> Result<(), BoxError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    let endpoint = Endpoint::new(local_addr.to_string(), config.stage.clone());
    let repository = Arc::new(InMemoryConnectionRepository::new(config.table_name.clone()));

    let state = Arc::new(AppState {
        registry: repository.clone(),
        room_index: repository,
        transport: Arc::new(WebSocketTransport::new()),
        endpoint,
        prune_stale: config.prune_stale_connections,
    });

    tracing::info!(
        "Listening on {} (stage '{}', table '{}', prune stale: {})",
        local_addr,
        config.stage,
        config.table_name,
        config.prune_stale_connections
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
