use chrono::{DateTime, NaiveDateTime, Utc};
use md5::{Digest, Md5};
use parley_db::models::MessageRow;
use parley_types::attachment::AttachmentKind;
use parley_types::profile::Profile;
use parley_types::records::{AttachmentView, ContactRow, MessageCard, ProfileView};
use tracing::warn;
use uuid::Uuid;

use crate::Messenger;
use crate::error::ChatError;
use crate::storage::BlobStore;

impl<S: BlobStore> Messenger<S> {
    /// Build the display record for one message as seen by `viewer_id`.
    pub fn project_message(&self, msg: &MessageRow, viewer_id: Uuid) -> MessageCard {
        self.project_message_at(msg, viewer_id, Utc::now())
    }

    /// Same as [`project_message`](Self::project_message) with an explicit
    /// clock, so relative ages are deterministic under test.
    pub fn project_message_at(
        &self,
        msg: &MessageRow,
        viewer_id: Uuid,
        now: DateTime<Utc>,
    ) -> MessageCard {
        let created_at = parse_timestamp(&msg.created_at, &msg.id);

        let attachment = msg.attachment.as_ref().map(|att| AttachmentView {
            file: att.new_name.clone(),
            title: html_escape::encode_safe(att.old_name.trim()).into_owned(),
            kind: att.kind(&self.config.allowed_images),
        });

        MessageCard {
            id: parse_uuid(&msg.id, "id", &msg.id),
            from_id: parse_uuid(&msg.from_id, "from_id", &msg.id),
            to_id: parse_uuid(&msg.to_id, "to_id", &msg.id),
            message: msg.body.clone(),
            attachment,
            time_ago: time_ago(created_at, now),
            created_at: created_at.to_rfc3339(),
            is_sender: msg.from_id == viewer_id.to_string(),
            seen: msg.seen,
        }
    }

    /// One contact-list row for `user` as seen by `viewer_id`: resolved
    /// profile, projected last message, unseen counter. Store failures are
    /// wrapped, not swallowed.
    pub fn contact_row<P: Profile>(
        &self,
        user: &P,
        viewer_id: Uuid,
    ) -> Result<ContactRow, ChatError> {
        self.contact_row_inner(user, viewer_id)
            .map_err(|e| ChatError::Projection(Box::new(e)))
    }

    fn contact_row_inner<P: Profile>(
        &self,
        user: &P,
        viewer_id: Uuid,
    ) -> Result<ContactRow, ChatError> {
        let last_message = self.last_message(viewer_id, user.id())?;
        let unseen_count = self.count_unseen(viewer_id, user.id())?;

        Ok(ContactRow {
            user: ProfileView {
                id: user.id(),
                name: user.name().to_string(),
                avatar_url: self.avatar_url(user),
            },
            last_message: last_message.map(|msg| self.project_message(&msg, viewer_id)),
            unseen_count,
        })
    }

    /// Stored file names of every image attachment in the conversation,
    /// most recent first. Non-image attachments and bare messages are
    /// skipped; an imageless conversation yields an empty list.
    pub fn shared_images(&self, self_id: Uuid, other_id: Uuid) -> Result<Vec<String>, ChatError> {
        let msgs = self.conversation(self_id, other_id)?;

        Ok(msgs
            .iter()
            .rev()
            .filter_map(|msg| msg.attachment.as_ref())
            .filter(|att| att.kind(&self.config.allowed_images) == AttachmentKind::Image)
            .map(|att| att.new_name.clone())
            .collect())
    }

    /// Resolve a user's avatar URL. Users still on the default avatar get a
    /// gravatar (when enabled); everyone else resolves through blob storage.
    pub fn avatar_url<P: Profile>(&self, user: &P) -> String {
        if user.avatar_name() == self.config.default_avatar && self.config.gravatar.enabled {
            let hash = hex::encode(Md5::digest(user.email().trim().to_lowercase()));
            format!(
                "https://www.gravatar.com/avatar/{}?s={}&d={}",
                hash, self.config.gravatar.image_size, self.config.gravatar.imageset
            )
        } else {
            self.storage.url(&format!(
                "{}/{}",
                self.config.avatars_folder,
                user.avatar_name()
            ))
        }
    }
}

fn parse_uuid(raw: &str, field: &str, message_id: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on message '{}': {}", field, raw, message_id, e);
        Uuid::default()
    })
}

fn parse_timestamp(raw: &str, message_id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // Rows written by SQLite's datetime('now') carry no timezone.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on message '{}': {}", raw, message_id, e);
            DateTime::default()
        })
}

/// Coarse humanized age, the contact-list kind: "just now", "5 minutes ago",
/// "3 weeks ago".
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    if secs < 60 {
        return "just now".into();
    }

    let minutes = secs / 60;
    if minutes < 60 {
        return plural(minutes, "minute");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }

    let days = hours / 24;
    if days < 7 {
        return plural(days, "day");
    }
    if days < 30 {
        return plural(days / 7, "week");
    }
    if days < 365 {
        return plural(days / 30, "month");
    }
    plural(days / 365, "year")
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}
