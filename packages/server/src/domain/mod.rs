//! Domain layer for the relay.
//!
//! This module contains business types and the store/transport contracts,
//! independent of data transfer objects (DTOs) and infrastructure concerns.

pub mod delivery;
pub mod entity;
pub mod error;
pub mod factory;
pub mod message;
pub mod repository;
pub mod value_object;

pub use delivery::{DeliveryChannel, DeliveryTransport};
pub use entity::ConnectionSession;
pub use error::{DeliveryError, RepositoryError, ValueObjectError};
pub use factory::RoomCodeFactory;
pub use message::{EnvelopeKind, InboundMessage, OutboundEnvelope};
pub use repository::{ConnectionRegistry, RoomIndex};
pub use value_object::{ConnectionId, DisplayName, Endpoint, MessageContent, RoomCode, Timestamp};

#[cfg(test)]
pub use repository::{MockConnectionRegistry, MockRoomIndex};
