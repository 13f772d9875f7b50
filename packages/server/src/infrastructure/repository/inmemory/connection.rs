//! InMemory Connection Repository 実装
//!
//! ドメイン層が定義する ConnectionRegistry / RoomIndex trait の具体的な実装。
//! 接続 ID をキーとする主テーブルと、ルームコードをキーとする二次インデックスを
//! 1 つの Mutex で守り、両者の整合性を保ちます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionRegistry, ConnectionSession, RepositoryError, RoomCode, RoomIndex,
};

#[derive(Debug, Default)]
struct ConnectionTable {
    /// 主テーブル: connection_id -> session
    sessions: HashMap<ConnectionId, ConnectionSession>,
    /// 二次インデックス: room_code -> connection_id（参加順）
    rooms: HashMap<RoomCode, Vec<ConnectionId>>,
}

impl ConnectionTable {
    fn unindex(&mut self, session: &ConnectionSession) {
        if let Some(members) = self.rooms.get_mut(&session.room_code) {
            members.retain(|id| id != &session.connection_id);
            if members.is_empty() {
                self.rooms.remove(&session.room_code);
            }
        }
    }
}

/// インメモリ Connection Repository 実装
///
/// ConnectionRegistry と RoomIndex の両方を実装します（依存性の逆転）。
#[derive(Clone)]
pub struct InMemoryConnectionRepository {
    /// ストア名（ログ・エラーメッセージ用）
    table_name: String,
    table: Arc<Mutex<ConnectionTable>>,
}

impl InMemoryConnectionRepository {
    /// 新しい InMemoryConnectionRepository を作成
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            table: Arc::new(Mutex::new(ConnectionTable::default())),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// 登録済みセッション数
    pub async fn count_sessions(&self) -> usize {
        self.table.lock().await.sessions.len()
    }

    /// インデックスに存在するルーム数
    pub async fn count_rooms(&self) -> usize {
        self.table.lock().await.rooms.len()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRepository {
    async fn get(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<ConnectionSession>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table.sessions.get(connection_id).cloned())
    }

    async fn put(&self, session: ConnectionSession) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;

        if let Some(previous) = table.sessions.remove(&session.connection_id) {
            table.unindex(&previous);
        }

        table
            .rooms
            .entry(session.room_code.clone())
            .or_default()
            .push(session.connection_id.clone());
        tracing::debug!(
            "[{}] put '{}' into room '{}'",
            self.table_name,
            session.connection_id,
            session.room_code
        );
        table.sessions.insert(session.connection_id.clone(), session);

        Ok(())
    }

    async fn remove(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<ConnectionSession>, RepositoryError> {
        let mut table = self.table.lock().await;
        let removed = table.sessions.remove(connection_id);
        if let Some(session) = &removed {
            table.unindex(session);
            tracing::debug!(
                "[{}] removed '{}' from room '{}'",
                self.table_name,
                connection_id,
                session.room_code
            );
        }
        Ok(removed)
    }
}

#[async_trait]
impl RoomIndex for InMemoryConnectionRepository {
    async fn query(&self, room_code: &RoomCode) -> Result<Vec<ConnectionSession>, RepositoryError> {
        let table = self.table.lock().await;
        let Some(members) = table.rooms.get(room_code) else {
            return Ok(Vec::new());
        };

        members
            .iter()
            .map(|id| {
                table.sessions.get(id).cloned().ok_or_else(|| {
                    RepositoryError::Unavailable {
                        table: self.table_name.clone(),
                        reason: format!("index entry '{id}' has no session"),
                    }
                })
            })
            .collect()
    }
}
