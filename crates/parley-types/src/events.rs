use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::records::MessageCard;

/// Events fanned out to a recipient's private channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChatEvent {
    /// A new message was persisted; carries the projected card so clients
    /// can render it without a round trip.
    NewMessage {
        from_id: Uuid,
        to_id: Uuid,
        message: MessageCard,
    },

    /// `by` read their conversation with `conversation_with`.
    Seen {
        by: Uuid,
        conversation_with: Uuid,
    },

    /// `from_id` is typing in their conversation with `to_id`.
    Typing {
        from_id: Uuid,
        to_id: Uuid,
    },
}

impl ChatEvent {
    /// Wire-level event name published alongside the payload.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewMessage { .. } => "new-message",
            Self::Seen { .. } => "seen",
            Self::Typing { .. } => "typing",
        }
    }

    /// Payload published for this event: the `data` half of the tagged
    /// serialization, without the tag.
    pub fn payload(&self) -> serde_json::Value {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.remove("data").unwrap_or(serde_json::Value::Null)
            }
            _ => serde_json::Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_strips_the_tag() {
        let event = ChatEvent::Typing {
            from_id: Uuid::new_v4(),
            to_id: Uuid::new_v4(),
        };
        assert_eq!(event.name(), "typing");

        let payload = event.payload();
        assert!(payload.get("from_id").is_some());
        assert!(payload.get("type").is_none());
    }
}
