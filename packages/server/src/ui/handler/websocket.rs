//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, ConnectionSession, DeliveryTransport, OutboundEnvelope},
    infrastructure::dto::websocket::{ActionFrame, ActionResponse},
    ui::state::AppState,
    usecase::{
        JoinError, JoinRoomUseCase, LeaveRoomUseCase, MessageEvent, RelayMessageUseCase,
        RequestContext,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    // The transport assigns connection ids
    let connection_id = match ConnectionId::new(uuid::Uuid::new_v4().to_string()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to assign connection id: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
        .into_response()
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (mut sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive pushed frames
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state.transport.register(connection_id.clone(), tx).await;
    tracing::info!("Connection '{}' opened", connection_id);

    let recv_state = state.clone();
    let recv_connection_id = connection_id.clone();

    // Spawn a task to receive action frames from this connection
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", recv_connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!(
                        "Received text from '{}': {}",
                        recv_connection_id,
                        text.as_str()
                    );
                    let response =
                        handle_action(&recv_state, &recv_connection_id, text.as_str()).await;
                    if response.is_success() {
                        tracing::debug!(
                            "Action response for '{}': {:?}",
                            recv_connection_id,
                            response
                        );
                    } else {
                        tracing::error!(
                            "Action failed for '{}': {:?}",
                            recv_connection_id,
                            response
                        );
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", recv_connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to forward pushed frames to this connection
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.transport.unregister(&connection_id).await;

    let leave_usecase = LeaveRoomUseCase::new(state.registry.clone());
    match leave_usecase.execute(&connection_id).await {
        Ok(_) => tracing::info!("Connection '{}' closed", connection_id),
        Err(e) => tracing::warn!("Failed to remove session for '{}': {}", connection_id, e),
    }
}

/// Route one inbound text frame to its use case.
pub(crate) async fn handle_action(
    state: &AppState,
    connection_id: &ConnectionId,
    text: &str,
) -> ActionResponse {
    let Some(frame) = ActionFrame::parse(text) else {
        return reply(state, connection_id, OutboundEnvelope::error("Unknown action")).await;
    };
    tracing::debug!("Handling '{}' from '{}'", frame.name(), connection_id);

    match frame {
        ActionFrame::Message {} => {
            let relay_usecase = RelayMessageUseCase::new(
                state.registry.clone(),
                state.room_index.clone(),
                state.transport.clone(),
            )
            .with_stale_pruning(state.prune_stale);
            let event = MessageEvent {
                body: text.to_string(),
                context: RequestContext {
                    connection_id: connection_id.clone(),
                    endpoint: state.endpoint.clone(),
                },
            };

            match relay_usecase.execute(event).await {
                Ok(_) => ActionResponse::ok(),
                Err(e) => ActionResponse::bad_gateway(e.to_string()),
            }
        }
        ActionFrame::CreateRoom { name } => {
            let join_usecase =
                JoinRoomUseCase::new(state.registry.clone(), state.room_index.clone());
            let result = join_usecase
                .create_room(connection_id.clone(), name.unwrap_or_default())
                .await;
            reply_join(state, connection_id, result).await
        }
        ActionFrame::JoinRoom { name, room_code } => {
            let join_usecase =
                JoinRoomUseCase::new(state.registry.clone(), state.room_index.clone());
            let result = join_usecase
                .join_room(
                    connection_id.clone(),
                    name.unwrap_or_default(),
                    room_code.unwrap_or_default(),
                )
                .await;
            reply_join(state, connection_id, result).await
        }
        ActionFrame::LeaveRoom {} => {
            let leave_usecase = LeaveRoomUseCase::new(state.registry.clone());
            match leave_usecase.execute(connection_id).await {
                Ok(_) => ActionResponse::ok(),
                Err(e) => ActionResponse::bad_gateway(e.to_string()),
            }
        }
    }
}

async fn reply_join(
    state: &AppState,
    connection_id: &ConnectionId,
    result: Result<ConnectionSession, JoinError>,
) -> ActionResponse {
    let envelope = match result {
        Ok(session) => OutboundEnvelope::joined(session.room_code.as_str()),
        Err(e) => match e.reply() {
            Some(text) => OutboundEnvelope::error(text),
            None => return ActionResponse::bad_gateway(e.to_string()),
        },
    };
    reply(state, connection_id, envelope).await
}

/// Push an envelope back to the connection a frame arrived on.
async fn reply(
    state: &AppState,
    connection_id: &ConnectionId,
    envelope: OutboundEnvelope,
) -> ActionResponse {
    match state
        .transport
        .channel(&state.endpoint)
        .send(connection_id, &envelope)
        .await
    {
        Ok(()) => ActionResponse::ok(),
        Err(e) => ActionResponse::bad_gateway(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::Endpoint, infrastructure::delivery::WebSocketTransport,
        infrastructure::repository::InMemoryConnectionRepository,
    };
    use serde_json::{Value, json};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn create_test_state() -> AppState {
        let repository = Arc::new(InMemoryConnectionRepository::new("room-connections"));
        AppState {
            registry: repository.clone(),
            room_index: repository,
            transport: Arc::new(WebSocketTransport::new()),
            endpoint: Endpoint::new("127.0.0.1:0", "test"),
            prune_stale: false,
        }
    }

    async fn connect(state: &AppState, id: &str) -> (ConnectionId, UnboundedReceiver<String>) {
        let connection_id = ConnectionId::new(id.to_string()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        state.transport.register(connection_id.clone(), tx).await;
        (connection_id, rx)
    }

    fn next_frame(rx: &mut UnboundedReceiver<String>) -> Value {
        serde_json::from_str(&rx.try_recv().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_action_replies_error() {
        // テスト項目: 未知のアクションにはエラーエンベロープで応答する
        // given (前提条件):
        let state = create_test_state();
        let (u1, mut rx1) = connect(&state, "u1").await;

        // when (操作):
        let response = handle_action(&state, &u1, r#"{"action":"dance"}"#).await;

        // then (期待する結果):
        assert_eq!(response, ActionResponse::ok());
        assert_eq!(
            next_frame(&mut rx1),
            json!({"message": "Unknown action", "type": "err"})
        );
    }

    #[tokio::test]
    async fn test_create_join_and_relay() {
        // テスト項目: ルーム作成・参加・発言の一連の流れで、発言が他の参加者だけに届く
        // given (前提条件):
        let state = create_test_state();
        let (u1, mut rx1) = connect(&state, "u1").await;
        let (u2, mut rx2) = connect(&state, "u2").await;

        handle_action(&state, &u1, r#"{"action":"createRoom","name":"Alice"}"#).await;
        let joined = next_frame(&mut rx1);
        assert_eq!(joined["type"], "info");
        let room_code = joined["roomCode"].as_str().unwrap().to_string();

        let join_frame = json!({"action": "joinRoom", "name": "Bob", "roomCode": room_code});
        handle_action(&state, &u2, &join_frame.to_string()).await;
        assert_eq!(next_frame(&mut rx2)["roomCode"], room_code.as_str());

        // when (操作):
        let response = handle_action(&state, &u1, r#"{"action":"message","message":"hi"}"#).await;

        // then (期待する結果):
        assert!(response.is_success());
        assert_eq!(next_frame(&mut rx2), json!({"message": "hi", "from": "Alice"}));
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_message_before_join_replies_error() {
        // テスト項目: 参加前の発言には「ルームに参加してください」エラーが返る
        // given (前提条件):
        let state = create_test_state();
        let (u1, mut rx1) = connect(&state, "u1").await;

        // when (操作):
        let response = handle_action(&state, &u1, r#"{"action":"message","message":"hi"}"#).await;

        // then (期待する結果):
        assert!(response.is_success());
        assert_eq!(
            next_frame(&mut rx1),
            json!({"message": "You need to connect or join a room", "type": "err"})
        );
    }

    #[tokio::test]
    async fn test_join_unknown_room_replies_error() {
        // テスト項目: 存在しないルームへの参加にはエラーエンベロープが返る
        // given (前提条件):
        let state = create_test_state();
        let (u1, mut rx1) = connect(&state, "u1").await;

        // when (操作):
        handle_action(
            &state,
            &u1,
            r#"{"action":"joinRoom","name":"Alice","roomCode":"NOPE"}"#,
        )
        .await;

        // then (期待する結果):
        assert_eq!(
            next_frame(&mut rx1),
            json!({"message": "Room NOPE does not exist", "type": "err"})
        );
    }

    #[tokio::test]
    async fn test_reply_to_unregistered_connection_is_bad_gateway() {
        // テスト項目: 応答先の接続が存在しない場合は 502 になる
        // given (前提条件):
        let state = create_test_state();
        let ghost = ConnectionId::new("ghost".to_string()).unwrap();

        // when (操作):
        let response = handle_action(&state, &ghost, r#"{"action":"message"}"#).await;

        // then (期待する結果):
        assert_eq!(response.status_code, 502);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_leave_room_stops_fanout() {
        // テスト項目: 退出した接続には以後の発言が届かない
        // given (前提条件):
        let state = create_test_state();
        let (u1, mut rx1) = connect(&state, "u1").await;
        let (u2, mut rx2) = connect(&state, "u2").await;
        handle_action(&state, &u1, r#"{"action":"createRoom","name":"Alice"}"#).await;
        let room_code = next_frame(&mut rx1)["roomCode"].as_str().unwrap().to_string();
        let join_frame = json!({"action": "joinRoom", "name": "Bob", "roomCode": room_code});
        handle_action(&state, &u2, &join_frame.to_string()).await;
        next_frame(&mut rx2);

        // when (操作):
        handle_action(&state, &u2, r#"{"action":"leaveRoom"}"#).await;
        handle_action(&state, &u1, r#"{"action":"message","message":"anyone?"}"#).await;

        // then (期待する結果):
        assert!(rx2.try_recv().is_err());
    }
}
