//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// ConnectionId validation error
    #[error("ConnectionId cannot be empty")]
    ConnectionIdEmpty,

    /// ConnectionId too long error
    #[error("ConnectionId cannot exceed {max} characters (got {actual})")]
    ConnectionIdTooLong { max: usize, actual: usize },

    /// DisplayName validation error
    #[error("DisplayName cannot be empty")]
    DisplayNameEmpty,

    /// DisplayName too long error
    #[error("DisplayName cannot exceed {max} characters (got {actual})")]
    DisplayNameTooLong { max: usize, actual: usize },

    /// RoomCode validation error
    #[error("RoomCode cannot be empty")]
    RoomCodeEmpty,

    /// RoomCode too long error
    #[error("RoomCode cannot exceed {max} characters (got {actual})")]
    RoomCodeTooLong { max: usize, actual: usize },

    /// MessageContent validation error
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,

    /// Request body is not a JSON object or `message` is not a string
    #[error("malformed message payload: {0}")]
    MalformedPayload(String),
}

/// Errors raised by the connection registry and room index stores
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store could not serve the request
    #[error("store '{table}' unavailable: {reason}")]
    Unavailable { table: String, reason: String },

    /// No session is stored under the given connection id
    #[error("connection '{0}' not found")]
    NotFound(String),
}

/// Per-recipient delivery failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The recipient connection is closed or was never registered
    #[error("connection '{0}' is gone")]
    Gone(String),

    /// The envelope could not be serialized
    #[error("failed to encode envelope: {0}")]
    Encode(String),

    /// Any other transport failure
    #[error("transport error for '{connection_id}': {reason}")]
    Transport {
        connection_id: String,
        reason: String,
    },
}
