use std::collections::HashMap;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;
use tokio::sync::{RwLock, broadcast};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to publish '{event}' to channel '{channel}': {reason}")]
    Publish {
        channel: String,
        event: String,
        reason: String,
    },

    #[error("failed to sign subscription: {0}")]
    Signing(String),
}

/// What a subscriber receives: the event name and its JSON payload.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub event: String,
    pub payload: Value,
}

/// The pub/sub collaborator boundary. Delivery is at-most-once and
/// fire-and-forget; per-channel publish order is preserved, nothing is
/// durable, and nobody waits for subscriber acknowledgment.
pub trait Transport {
    fn publish(
        &self,
        channel: &str,
        event: &str,
        payload: Value,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Sign a channel-subscription request for a connected socket, returning
    /// an opaque token the client hands back to the transport.
    fn sign_subscription(
        &self,
        channel: &str,
        socket_id: &str,
        auth_payload: &str,
    ) -> Result<String, TransportError>;
}

impl<T: Transport> Transport for Arc<T> {
    fn publish(
        &self,
        channel: &str,
        event: &str,
        payload: Value,
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).publish(channel, event, payload)
    }

    fn sign_subscription(
        &self,
        channel: &str,
        socket_id: &str,
        auth_payload: &str,
    ) -> Result<String, TransportError> {
        (**self).sign_subscription(channel, socket_id, auth_payload)
    }
}

/// In-process transport: one broadcast channel per named topic, HMAC-SHA256
/// subscription tokens in `key:signature` form.
pub struct LocalTransport {
    key: String,
    secret: String,
    channels: RwLock<HashMap<String, broadcast::Sender<Envelope>>>,
}

impl LocalTransport {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe to a named channel. The channel is created on first use.
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<Envelope> {
        let mut channels = self.channels.write().await;
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(256).0)
            .subscribe()
    }
}

impl Transport for LocalTransport {
    async fn publish(
        &self,
        channel: &str,
        event: &str,
        payload: Value,
    ) -> Result<(), TransportError> {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(channel) {
            // A send error here means every subscriber is gone, which for
            // fire-and-forget delivery is the same as nobody listening.
            let _ = tx.send(Envelope {
                event: event.to_string(),
                payload,
            });
        }
        Ok(())
    }

    fn sign_subscription(
        &self,
        channel: &str,
        socket_id: &str,
        auth_payload: &str,
    ) -> Result<String, TransportError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| TransportError::Signing(e.to_string()))?;
        mac.update(format!("{socket_id}:{channel}:{auth_payload}").as_bytes());

        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(format!("{}:{}", self.key, signature))
    }
}
