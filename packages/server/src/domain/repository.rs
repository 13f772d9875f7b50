//! Store contracts consumed by the use cases.
//!
//! Implementations live in the infrastructure layer (dependency inversion).

use async_trait::async_trait;

use super::{ConnectionId, ConnectionSession, RoomCode, error::RepositoryError};

/// Key-value store of joined connections, keyed by connection id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Point lookup. `Ok(None)` means the connection has not joined a room.
    async fn get(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<ConnectionSession>, RepositoryError>;

    /// Insert or replace the session for its connection id.
    async fn put(&self, session: ConnectionSession) -> Result<(), RepositoryError>;

    /// Remove a session, returning it if it existed.
    async fn remove(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<ConnectionSession>, RepositoryError>;
}

/// Secondary index over the registry, keyed by room code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomIndex: Send + Sync {
    /// All sessions currently in `room_code`, in join order.
    async fn query(&self, room_code: &RoomCode) -> Result<Vec<ConnectionSession>, RepositoryError>;
}
