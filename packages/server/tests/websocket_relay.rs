//! WebSocket relay integration tests.
//!
//! Real sockets against an in-process server: room join, fan-out, sender
//! exclusion, error envelopes and disconnect cleanup.

mod fixtures;

use std::time::Duration;

use fixtures::{TestServer, assert_silent, create_room, join_room, recv_json, send_json};
use serde_json::json;

const QUIET: Duration = Duration::from_millis(300);

#[tokio::test]
async fn test_message_fans_out_to_room_except_sender() {
    // テスト項目: Alice の発言が同じルームの Bob と Carol に届き、Alice 自身には届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    let mut carol = server.connect().await;
    let room_code = create_room(&mut alice, "Alice").await;
    join_room(&mut bob, "Bob", &room_code).await;
    join_room(&mut carol, "Carol", &room_code).await;

    // when (操作):
    send_json(&mut alice, json!({"action": "message", "message": "hi"})).await;

    // then (期待する結果):
    let expected = json!({"message": "hi", "from": "Alice"});
    assert_eq!(recv_json(&mut bob).await, expected);
    assert_eq!(recv_json(&mut carol).await, expected);
    assert_silent(&mut alice, QUIET).await;
}

#[tokio::test]
async fn test_empty_message_replies_error_to_sender() {
    // テスト項目: 空のメッセージには送信者だけにエラーが返り、他の参加者には何も届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    let room_code = create_room(&mut alice, "Alice").await;
    join_room(&mut bob, "Bob", &room_code).await;

    // when (操作):
    send_json(&mut alice, json!({"action": "message", "message": ""})).await;

    // then (期待する結果):
    assert_eq!(
        recv_json(&mut alice).await,
        json!({"message": "You need a 'message' on message actions", "type": "err"})
    );
    assert_silent(&mut bob, QUIET).await;
}

#[tokio::test]
async fn test_message_before_join_replies_error() {
    // テスト項目: ルーム参加前の発言にはエラーが返り、他の接続には何も届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    create_room(&mut bob, "Bob").await;

    // when (操作):
    send_json(&mut alice, json!({"action": "message", "message": "hi"})).await;

    // then (期待する結果):
    assert_eq!(
        recv_json(&mut alice).await,
        json!({"message": "You need to connect or join a room", "type": "err"})
    );
    assert_silent(&mut bob, QUIET).await;
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    // テスト項目: 別ルームの発言は届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a1 = server.connect().await;
    let mut a2 = server.connect().await;
    let mut b1 = server.connect().await;
    let mut b2 = server.connect().await;
    let room_a = create_room(&mut a1, "Ann").await;
    join_room(&mut a2, "Abe", &room_a).await;
    let room_b = create_room(&mut b1, "Ben").await;
    join_room(&mut b2, "Bea", &room_b).await;

    // when (操作):
    send_json(&mut a1, json!({"action": "message", "message": "from A"})).await;
    send_json(&mut b1, json!({"action": "message", "message": "from B"})).await;

    // then (期待する結果):
    assert_eq!(
        recv_json(&mut a2).await,
        json!({"message": "from A", "from": "Ann"})
    );
    assert_eq!(
        recv_json(&mut b2).await,
        json!({"message": "from B", "from": "Ben"})
    );
    assert_silent(&mut a2, QUIET).await;
    assert_silent(&mut b2, QUIET).await;
}

#[tokio::test]
async fn test_disconnected_member_is_skipped() {
    // テスト項目: 切断した参加者はルームから外れ、残りの参加者には引き続き届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    let mut carol = server.connect().await;
    let room_code = create_room(&mut alice, "Alice").await;
    join_room(&mut bob, "Bob", &room_code).await;
    join_room(&mut carol, "Carol", &room_code).await;

    // when (操作):
    bob.close(None).await.expect("Failed to close");
    tokio::time::sleep(QUIET).await;
    send_json(&mut alice, json!({"action": "message", "message": "still here?"})).await;

    // then (期待する結果):
    assert_eq!(
        recv_json(&mut carol).await,
        json!({"message": "still here?", "from": "Alice"})
    );
    let members: serde_json::Value = reqwest::get(format!(
        "{}/api/rooms/{}",
        server.base_url(),
        room_code
    ))
    .await
    .expect("Failed to send request")
    .json()
    .await
    .expect("Failed to parse JSON");
    assert_eq!(members["members"].as_array().unwrap().len(), 2);
}
