//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{DeliveryError, RepositoryError, ValueObjectError};

/// Fatal failure of one relay request.
///
/// Rendered at the boundary as a `502` response carrying the description.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Registry lookup or room index query failed
    #[error("connection store failed: {0}")]
    Registry(#[from] RepositoryError),

    /// The error envelope could not be delivered back to the sender
    #[error("failed to reply to sender: {0}")]
    ErrorReply(DeliveryError),

    /// A delivery task aborted instead of reporting a result
    #[error("delivery task aborted: {0}")]
    DeliveryTask(String),
}

/// Failure to create or join a room
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    #[error("invalid name: {0}")]
    InvalidName(ValueObjectError),

    #[error("invalid room code: {0}")]
    InvalidRoomCode(ValueObjectError),

    #[error("room '{0}' does not exist")]
    RoomNotFound(String),

    #[error("connection store failed: {0}")]
    Registry(#[from] RepositoryError),
}

impl JoinError {
    /// Text of the error envelope sent back to the client, if this failure is
    /// the client's to fix.
    pub fn reply(&self) -> Option<String> {
        match self {
            Self::InvalidName(_) => Some("You need a 'name' to join a room".to_string()),
            Self::InvalidRoomCode(_) => Some("You need a 'roomCode' to join a room".to_string()),
            Self::RoomNotFound(code) => Some(format!("Room {code} does not exist")),
            Self::Registry(_) => None,
        }
    }
}
