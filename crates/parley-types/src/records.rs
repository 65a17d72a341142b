use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attachment::AttachmentKind;

/// Display-ready view of one message, projected for a specific viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCard {
    pub id: Uuid,
    pub from_id: Uuid,
    pub to_id: Uuid,
    pub message: Option<String>,
    pub attachment: Option<AttachmentView>,
    /// Coarse relative age, e.g. "5 minutes ago".
    pub time_ago: String,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    /// Whether the viewer is the sender of this message.
    pub is_sender: bool,
    pub seen: bool,
}

/// Attachment fields as the rendering layer consumes them. `title` is the
/// original file name, already HTML-escaped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentView {
    pub file: String,
    pub title: String,
    pub kind: AttachmentKind,
}

/// One row of the contact list: the contact, the latest message either way,
/// and how many of their messages the viewer has not seen yet. Recomputed on
/// demand, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRow {
    pub user: ProfileView,
    pub last_message: Option<MessageCard>,
    pub unseen_count: u64,
}

/// Resolved identity fields for display (avatar already a full URL).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: String,
}
