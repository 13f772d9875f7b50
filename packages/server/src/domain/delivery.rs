//! Transport contract used to push envelopes to connections.

use std::sync::Arc;

use async_trait::async_trait;

use super::{ConnectionId, Endpoint, OutboundEnvelope, error::DeliveryError};

/// Pushes envelopes to individual connections.
///
/// Every call is one delivery attempt to one recipient and fails on its own;
/// a slow or closed recipient must not hold up calls for other recipients.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send(
        &self,
        recipient: &ConnectionId,
        envelope: &OutboundEnvelope,
    ) -> Result<(), DeliveryError>;
}

/// Hands out delivery channels bound to a transport endpoint.
pub trait DeliveryTransport: Send + Sync {
    /// Channel shared by every delivery made on behalf of one request.
    fn channel(&self, endpoint: &Endpoint) -> Arc<dyn DeliveryChannel>;
}
