//! WebSocket delivery transport.
//!
//! Every upgraded socket registers the sending half of an unbounded mpsc
//! channel here; its send task drains the receiver into the socket. Pushing
//! an envelope therefore never waits on a slow socket.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::UnboundedSender};

use crate::domain::{
    ConnectionId, DeliveryChannel, DeliveryError, DeliveryTransport, Endpoint, OutboundEnvelope,
};

type Outboxes = Arc<Mutex<HashMap<ConnectionId, UnboundedSender<String>>>>;

/// Registry of live sockets' outbound queues.
#[derive(Clone, Default)]
pub struct WebSocketTransport {
    outboxes: Outboxes,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the outbound queue of a freshly upgraded socket.
    pub async fn register(&self, connection_id: ConnectionId, sender: UnboundedSender<String>) {
        let mut outboxes = self.outboxes.lock().await;
        outboxes.insert(connection_id, sender);
    }

    /// Forget a socket. Further deliveries to it fail with `DeliveryError::Gone`.
    pub async fn unregister(&self, connection_id: &ConnectionId) {
        let mut outboxes = self.outboxes.lock().await;
        outboxes.remove(connection_id);
    }

    pub async fn count_connections(&self) -> usize {
        self.outboxes.lock().await.len()
    }
}

impl DeliveryTransport for WebSocketTransport {
    fn channel(&self, endpoint: &Endpoint) -> Arc<dyn DeliveryChannel> {
        Arc::new(WebSocketDeliveryChannel {
            endpoint: endpoint.clone(),
            outboxes: self.outboxes.clone(),
        })
    }
}

/// Channel bound to one endpoint, shared by all deliveries of one request.
pub struct WebSocketDeliveryChannel {
    endpoint: Endpoint,
    outboxes: Outboxes,
}

#[async_trait]
impl DeliveryChannel for WebSocketDeliveryChannel {
    async fn send(
        &self,
        recipient: &ConnectionId,
        envelope: &OutboundEnvelope,
    ) -> Result<(), DeliveryError> {
        let frame = envelope
            .to_json()
            .map_err(|e| DeliveryError::Encode(e.to_string()))?;

        // Clone the sender so the map lock is not held while pushing
        let sender = {
            let outboxes = self.outboxes.lock().await;
            outboxes.get(recipient).cloned()
        };
        let Some(sender) = sender else {
            return Err(DeliveryError::Gone(recipient.to_string()));
        };

        sender
            .send(frame)
            .map_err(|_| DeliveryError::Gone(recipient.to_string()))?;
        tracing::trace!("[{}] pushed frame to '{}'", self.endpoint, recipient);
        Ok(())
    }
}
