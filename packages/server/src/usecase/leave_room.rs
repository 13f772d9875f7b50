//! UseCase: ルーム退出処理

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, ConnectionSession, RepositoryError};

/// ルーム退出のユースケース
///
/// 明示的な退出と、ソケット切断時の後始末の両方で使われます。
pub struct LeaveRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 退出を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Some(session))` - 参加中だったセッション
    /// * `Ok(None)` - どのルームにも参加していなかった
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<ConnectionSession>, RepositoryError> {
        let removed = self.registry.remove(connection_id).await?;
        if let Some(session) = &removed {
            tracing::info!("'{}' left room '{}'", connection_id, session.room_code);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DisplayName, MockConnectionRegistry, RoomCode, RoomIndex, Timestamp},
        infrastructure::repository::InMemoryConnectionRepository,
    };

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_leave_removes_session() {
        // テスト項目: 退出するとセッションがレジストリとインデックスから消える
        // given (前提条件):
        let repository = Arc::new(InMemoryConnectionRepository::new("room-connections"));
        let room = RoomCode::new("R1".to_string()).unwrap();
        repository
            .put(ConnectionSession::new(
                id("u1"),
                DisplayName::new("Alice".to_string()).unwrap(),
                room.clone(),
                Timestamp::new(0),
            ))
            .await
            .unwrap();
        let usecase = LeaveRoomUseCase::new(repository.clone());

        // when (操作):
        let removed = usecase.execute(&id("u1")).await.unwrap();

        // then (期待する結果):
        assert!(removed.is_some());
        assert!(repository.get(&id("u1")).await.unwrap().is_none());
        assert!(repository.query(&room).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_leave_when_not_joined_is_noop() {
        // テスト項目: 未参加の接続の退出は何もせず None を返す
        // given (前提条件):
        let mut registry = MockConnectionRegistry::new();
        registry.expect_remove().times(1).returning(|_| Ok(None));
        let usecase = LeaveRoomUseCase::new(Arc::new(registry));

        // when (操作):
        let removed = usecase.execute(&id("u1")).await;

        // then (期待する結果):
        assert_eq!(removed, Ok(None));
    }
}
