use parley_types::events::ChatEvent;
use parley_types::records::MessageCard;
use serde_json::Value;
use tracing::error;
use uuid::Uuid;

use crate::transport::{Transport, TransportError};

/// Name of the private channel carrying one user's realtime session.
pub fn private_channel(user_id: Uuid) -> String {
    format!("private-chat.{user_id}")
}

/// Publishes chat events to recipient channels. Delivery is at-most-once:
/// a transport failure is logged and handed back to the caller, never
/// retried — clients reconcile missed events with a pull-based refresh.
pub struct Dispatcher<T: Transport> {
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn publish(
        &self,
        channel: &str,
        event: &str,
        payload: Value,
    ) -> Result<(), TransportError> {
        if let Err(e) = self.transport.publish(channel, event, payload).await {
            error!("Failed to publish '{}' to {}: {}", event, channel, e);
            return Err(e);
        }
        Ok(())
    }

    /// Deliver a chat event to one user's private channel.
    pub async fn dispatch_to(&self, user_id: Uuid, event: &ChatEvent) -> Result<(), TransportError> {
        self.publish(&private_channel(user_id), event.name(), event.payload())
            .await
    }

    /// Fan a freshly persisted message out to its recipient. The card should
    /// be projected from the recipient's point of view.
    pub async fn message_created(&self, card: &MessageCard) -> Result<(), TransportError> {
        let event = ChatEvent::NewMessage {
            from_id: card.from_id,
            to_id: card.to_id,
            message: card.clone(),
        };
        self.dispatch_to(card.to_id, &event).await
    }

    /// Tell `conversation_with` that `by` has read their messages.
    pub async fn seen(&self, by: Uuid, conversation_with: Uuid) -> Result<(), TransportError> {
        let event = ChatEvent::Seen {
            by,
            conversation_with,
        };
        self.dispatch_to(conversation_with, &event).await
    }

    pub async fn typing(&self, from_id: Uuid, to_id: Uuid) -> Result<(), TransportError> {
        let event = ChatEvent::Typing { from_id, to_id };
        self.dispatch_to(to_id, &event).await
    }
}
