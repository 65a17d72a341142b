/// Database row types — these map directly to SQLite rows.
/// Ids and timestamps stay as strings at this layer; the attachment column
/// is the exception, parsed into its structured form at the row boundary.
use parley_types::attachment::AttachmentRef;

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub body: Option<String>,
    pub attachment: Option<AttachmentRef>,
    pub seen: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct FavoriteRow {
    pub id: String,
    pub user_id: String,
    pub favorite_id: String,
    pub created_at: String,
    pub updated_at: String,
}
