//! UseCase: ルーム作成・参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::create_room() / join_room() メソッド
//!
//! ### なぜこのテストが必要か
//! - レジストリとルームインデックスへの登録がファンアウトの前提になる
//! - 存在しないルームへの参加を防ぐ
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム作成、既存ルームへの参加、別ルームへの移動
//! - 異常系：名前・ルームコードの欠落、存在しないルーム

use std::sync::Arc;

use huddle_shared::time::get_jst_timestamp;

use crate::domain::{
    ConnectionId, ConnectionRegistry, ConnectionSession, DisplayName, RoomCode, RoomCodeFactory,
    RoomIndex, Timestamp,
};

use super::error::JoinError;

/// ルーム作成・参加のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    room_index: Arc<dyn RoomIndex>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>, room_index: Arc<dyn RoomIndex>) -> Self {
        Self {
            registry,
            room_index,
        }
    }

    /// 新しいルームを作成し、その最初のメンバーとして参加する
    pub async fn create_room(
        &self,
        connection_id: ConnectionId,
        name: String,
    ) -> Result<ConnectionSession, JoinError> {
        let name = DisplayName::new(name).map_err(JoinError::InvalidName)?;
        let room_code = RoomCodeFactory::generate().map_err(JoinError::InvalidRoomCode)?;

        self.register(connection_id, name, room_code).await
    }

    /// 既存のルームに参加する
    ///
    /// # Errors
    ///
    /// メンバーが 1 人もいないルームは存在しないものとして `JoinError::RoomNotFound` を返す
    pub async fn join_room(
        &self,
        connection_id: ConnectionId,
        name: String,
        room_code: String,
    ) -> Result<ConnectionSession, JoinError> {
        let name = DisplayName::new(name).map_err(JoinError::InvalidName)?;
        let room_code = RoomCode::new(room_code).map_err(JoinError::InvalidRoomCode)?;

        let members = self.room_index.query(&room_code).await?;
        if members.is_empty() {
            return Err(JoinError::RoomNotFound(room_code.as_str().to_string()));
        }

        self.register(connection_id, name, room_code).await
    }

    async fn register(
        &self,
        connection_id: ConnectionId,
        name: DisplayName,
        room_code: RoomCode,
    ) -> Result<ConnectionSession, JoinError> {
        let session = ConnectionSession::new(
            connection_id,
            name,
            room_code,
            Timestamp::new(get_jst_timestamp()),
        );
        self.registry.put(session.clone()).await?;
        tracing::info!(
            "'{}' joined room '{}' as '{}'",
            session.connection_id,
            session.room_code,
            session.name
        );
        Ok(session)
    }
}
