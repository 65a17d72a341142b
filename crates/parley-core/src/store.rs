use chrono::{SecondsFormat, Utc};
use parley_db::models::MessageRow;
use parley_types::attachment::AttachmentRef;
use tracing::{error, warn};
use uuid::Uuid;

use crate::Messenger;
use crate::error::ChatError;
use crate::storage::BlobStore;

/// Input for persisting one message. Content validation (body length,
/// attachment extension, upload size) happens before this layer.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub from_id: Uuid,
    pub to_id: Uuid,
    pub body: Option<String>,
    pub attachment: Option<AttachmentRef>,
}

impl<S: BlobStore> Messenger<S> {
    /// All messages between the two users, either direction, oldest first.
    pub fn conversation(&self, self_id: Uuid, other_id: Uuid) -> Result<Vec<MessageRow>, ChatError> {
        Ok(self
            .db
            .conversation(&self_id.to_string(), &other_id.to_string())?)
    }

    /// Persist a message with seen=false and return the stored row.
    pub fn new_message(&self, new: NewMessage) -> Result<MessageRow, ChatError> {
        let now = timestamp_now();
        let row = MessageRow {
            id: Uuid::new_v4().to_string(),
            from_id: new.from_id.to_string(),
            to_id: new.to_id.to_string(),
            body: new.body,
            attachment: new.attachment,
            seen: false,
            created_at: now.clone(),
            updated_at: now,
        };

        self.db.insert_message(&row)?;
        Ok(row)
    }

    /// Mark everything `other_id` sent to `self_id` as seen. Idempotent;
    /// returns the number of rows flipped.
    pub fn mark_seen(&self, self_id: Uuid, other_id: Uuid) -> Result<usize, ChatError> {
        Ok(self.db.mark_seen(
            &self_id.to_string(),
            &other_id.to_string(),
            &timestamp_now(),
        )?)
    }

    pub fn count_unseen(&self, self_id: Uuid, other_id: Uuid) -> Result<u64, ChatError> {
        Ok(self
            .db
            .count_unseen(&self_id.to_string(), &other_id.to_string())?)
    }

    pub fn last_message(
        &self,
        self_id: Uuid,
        other_id: Uuid,
    ) -> Result<Option<MessageRow>, ChatError> {
        Ok(self
            .db
            .last_message_between(&self_id.to_string(), &other_id.to_string())?)
    }

    /// Delete one message, only if `self_id` sent it. Any attachment blob is
    /// cleaned up first, best-effort: a storage failure never blocks the row
    /// deletion.
    pub async fn delete_message(&self, self_id: Uuid, message_id: Uuid) -> Result<(), ChatError> {
        let msg = self
            .db
            .message_owned_by(&message_id.to_string(), &self_id.to_string())?
            .ok_or(ChatError::NotFound)?;

        if let Some(att) = &msg.attachment {
            self.remove_attachment_blob(att).await;
        }

        self.db.delete_message(&msg.id)?;
        Ok(())
    }

    /// Delete the whole conversation, both directions. The per-message loop
    /// is not wrapped in a transaction: on an unexpected error the call
    /// reports `false`, but messages already deleted stay deleted.
    pub async fn delete_conversation(&self, self_id: Uuid, other_id: Uuid) -> bool {
        match self.delete_conversation_inner(self_id, other_id).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "Failed to delete conversation between {} and {}: {}",
                    self_id, other_id, e
                );
                false
            }
        }
    }

    async fn delete_conversation_inner(
        &self,
        self_id: Uuid,
        other_id: Uuid,
    ) -> Result<(), ChatError> {
        for msg in self.conversation(self_id, other_id)? {
            if let Some(att) = &msg.attachment {
                self.remove_attachment_blob(att).await;
            }
            self.db.delete_message(&msg.id)?;
        }
        Ok(())
    }

    /// Best-effort blob cleanup: missing blobs are skipped, storage failures
    /// are logged and ignored.
    async fn remove_attachment_blob(&self, att: &AttachmentRef) {
        let path = self.attachment_path(&att.new_name);
        if !self.storage.exists(&path).await {
            return;
        }
        if let Err(e) = self.storage.delete(&path).await {
            warn!("Failed to delete attachment blob {}: {}", path, e);
        }
    }
}

/// RFC 3339 UTC with microsecond precision. Written by the application so
/// lexicographic order on the column matches chronological order.
pub(crate) fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
