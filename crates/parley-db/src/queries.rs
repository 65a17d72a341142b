use parley_types::attachment::AttachmentRef;
use rusqlite::{Connection, Row, params};
use tracing::warn;

use crate::models::{FavoriteRow, MessageRow};
use crate::{Database, DbResult};

impl Database {
    // -- Messages --

    pub fn insert_message(&self, msg: &MessageRow) -> DbResult<()> {
        let attachment = msg
            .attachment
            .as_ref()
            .and_then(|a| serde_json::to_string(a).ok());

        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (id, from_id, to_id, body, attachment, seen, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    msg.id,
                    msg.from_id,
                    msg.to_id,
                    msg.body,
                    attachment,
                    msg.seen as i64,
                    msg.created_at,
                    msg.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Every message exchanged between the two users, either direction,
    /// oldest first.
    pub fn conversation(&self, a: &str, b: &str) -> DbResult<Vec<MessageRow>> {
        self.with_conn(|conn| query_conversation(conn, a, b))
    }

    /// Most recent message of the conversation, if any.
    pub fn last_message_between(&self, a: &str, b: &str) -> DbResult<Option<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, from_id, to_id, body, attachment, seen, created_at, updated_at
                 FROM messages
                 WHERE (from_id = ?1 AND to_id = ?2) OR (from_id = ?2 AND to_id = ?1)
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT 1",
            )?;

            match stmt.query_row(params![a, b], map_message) {
                Ok(row) => Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Flip every unseen message from `other_id` to `self_id` to seen.
    /// Returns the number of rows affected; calling again is a no-op.
    pub fn mark_seen(&self, self_id: &str, other_id: &str, now: &str) -> DbResult<usize> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "UPDATE messages SET seen = 1, updated_at = ?3
                 WHERE from_id = ?1 AND to_id = ?2 AND seen = 0",
                params![other_id, self_id, now],
            )?;
            Ok(affected)
        })
    }

    pub fn count_unseen(&self, self_id: &str, other_id: &str) -> DbResult<u64> {
        self.with_conn(|conn| {
            let count: u64 = conn.query_row(
                "SELECT COUNT(*) FROM messages
                 WHERE from_id = ?1 AND to_id = ?2 AND seen = 0",
                params![other_id, self_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Fetch a message only if `from_id` sent it. The ownership check for
    /// single-message deletion.
    pub fn message_owned_by(&self, message_id: &str, from_id: &str) -> DbResult<Option<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, from_id, to_id, body, attachment, seen, created_at, updated_at
                 FROM messages
                 WHERE id = ?1 AND from_id = ?2",
            )?;

            match stmt.query_row(params![message_id, from_id], map_message) {
                Ok(row) => Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn delete_message(&self, id: &str) -> DbResult<usize> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(affected)
        })
    }

    // -- Favorites --

    pub fn favorite_exists(&self, user_id: &str, favorite_id: &str) -> DbResult<bool> {
        self.with_conn(|conn| {
            let count: u64 = conn.query_row(
                "SELECT COUNT(*) FROM favorites WHERE user_id = ?1 AND favorite_id = ?2",
                params![user_id, favorite_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// No dedup check: inserting the same pair twice stores two rows.
    pub fn insert_favorite(&self, fav: &FavoriteRow) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO favorites (id, user_id, favorite_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    fav.id,
                    fav.user_id,
                    fav.favorite_id,
                    fav.created_at,
                    fav.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn delete_favorites(&self, user_id: &str, favorite_id: &str) -> DbResult<usize> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "DELETE FROM favorites WHERE user_id = ?1 AND favorite_id = ?2",
                params![user_id, favorite_id],
            )?;
            Ok(affected)
        })
    }
}

fn query_conversation(conn: &Connection, a: &str, b: &str) -> DbResult<Vec<MessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, from_id, to_id, body, attachment, seen, created_at, updated_at
         FROM messages
         WHERE (from_id = ?1 AND to_id = ?2) OR (from_id = ?2 AND to_id = ?1)
         ORDER BY created_at ASC, rowid ASC",
    )?;

    let rows = stmt
        .query_map(params![a, b], map_message)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_message(row: &Row) -> rusqlite::Result<MessageRow> {
    let id: String = row.get(0)?;
    let raw_attachment: Option<String> = row.get(4)?;
    let seen: i64 = row.get(5)?;

    Ok(MessageRow {
        from_id: row.get(1)?,
        to_id: row.get(2)?,
        body: row.get(3)?,
        attachment: parse_attachment(raw_attachment, &id),
        seen: seen != 0,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        id,
    })
}

/// Parse the stored attachment JSON once, here at the row boundary.
/// A corrupt blob is logged and read as "no attachment" rather than
/// poisoning the whole query.
fn parse_attachment(raw: Option<String>, message_id: &str) -> Option<AttachmentRef> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(att) => Some(att),
        Err(e) => {
            warn!("Corrupt attachment on message '{}': {}", message_id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, from: &str, to: &str, at: &str) -> MessageRow {
        MessageRow {
            id: id.into(),
            from_id: from.into(),
            to_id: to.into(),
            body: Some("hello".into()),
            attachment: None,
            seen: false,
            created_at: at.into(),
            updated_at: at.into(),
        }
    }

    #[test]
    fn conversation_is_direction_agnostic() {
        let db = Database::open_in_memory().unwrap();
        db.insert_message(&row("m1", "alice", "bob", "2026-01-01T10:00:00.000000Z"))
            .unwrap();
        db.insert_message(&row("m2", "bob", "alice", "2026-01-01T10:01:00.000000Z"))
            .unwrap();
        db.insert_message(&row("m3", "alice", "carol", "2026-01-01T10:02:00.000000Z"))
            .unwrap();

        let ab: Vec<String> = db
            .conversation("alice", "bob")
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        let ba: Vec<String> = db
            .conversation("bob", "alice")
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();

        assert_eq!(ab, vec!["m1", "m2"]);
        assert_eq!(ab, ba);
    }

    #[test]
    fn mark_seen_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.insert_message(&row("m1", "alice", "bob", "2026-01-01T10:00:00.000000Z"))
            .unwrap();
        db.insert_message(&row("m2", "alice", "bob", "2026-01-01T10:01:00.000000Z"))
            .unwrap();

        let first = db
            .mark_seen("bob", "alice", "2026-01-01T11:00:00.000000Z")
            .unwrap();
        let second = db
            .mark_seen("bob", "alice", "2026-01-01T11:00:01.000000Z")
            .unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 0);
    }

    #[test]
    fn unseen_count_tracks_the_recipient_only() {
        let db = Database::open_in_memory().unwrap();
        db.insert_message(&row("m1", "alice", "bob", "2026-01-01T10:00:00.000000Z"))
            .unwrap();

        assert_eq!(db.count_unseen("bob", "alice").unwrap(), 1);
        assert_eq!(db.count_unseen("alice", "bob").unwrap(), 0);

        db.mark_seen("bob", "alice", "2026-01-01T11:00:00.000000Z")
            .unwrap();
        assert_eq!(db.count_unseen("bob", "alice").unwrap(), 0);
    }

    #[test]
    fn last_message_is_the_most_recent_either_direction() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.last_message_between("alice", "bob").unwrap().is_none());

        db.insert_message(&row("m1", "alice", "bob", "2026-01-01T10:00:00.000000Z"))
            .unwrap();
        db.insert_message(&row("m2", "bob", "alice", "2026-01-01T10:05:00.000000Z"))
            .unwrap();

        let last = db.last_message_between("alice", "bob").unwrap().unwrap();
        assert_eq!(last.id, "m2");
    }

    #[test]
    fn ownership_lookup_only_matches_the_sender() {
        let db = Database::open_in_memory().unwrap();
        db.insert_message(&row("m1", "alice", "bob", "2026-01-01T10:00:00.000000Z"))
            .unwrap();

        assert!(db.message_owned_by("m1", "alice").unwrap().is_some());
        assert!(db.message_owned_by("m1", "bob").unwrap().is_none());
        assert!(db.message_owned_by("missing", "alice").unwrap().is_none());
    }

    #[test]
    fn attachment_round_trips_and_tolerates_corruption() {
        let db = Database::open_in_memory().unwrap();

        let mut with_att = row("m1", "alice", "bob", "2026-01-01T10:00:00.000000Z");
        with_att.attachment = Some(AttachmentRef::new("stored.png", "My Pic.png"));
        db.insert_message(&with_att).unwrap();

        // Corrupt blob written behind the API's back
        db.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (id, from_id, to_id, body, attachment, seen, created_at, updated_at)
                 VALUES ('m2', 'alice', 'bob', NULL, 'not json', 0,
                         '2026-01-01T10:01:00.000000Z', '2026-01-01T10:01:00.000000Z')",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let msgs = db.conversation("alice", "bob").unwrap();
        assert_eq!(
            msgs[0].attachment,
            Some(AttachmentRef::new("stored.png", "My Pic.png"))
        );
        assert_eq!(msgs[1].attachment, None);
    }

    #[test]
    fn favorites_allow_duplicates_and_bulk_delete() {
        let db = Database::open_in_memory().unwrap();
        let fav = |id: &str| FavoriteRow {
            id: id.into(),
            user_id: "alice".into(),
            favorite_id: "bob".into(),
            created_at: "2026-01-01T10:00:00.000000Z".into(),
            updated_at: "2026-01-01T10:00:00.000000Z".into(),
        };

        assert!(!db.favorite_exists("alice", "bob").unwrap());

        db.insert_favorite(&fav("f1")).unwrap();
        db.insert_favorite(&fav("f2")).unwrap();
        assert!(db.favorite_exists("alice", "bob").unwrap());
        assert!(!db.favorite_exists("bob", "alice").unwrap());

        assert_eq!(db.delete_favorites("alice", "bob").unwrap(), 2);
        assert!(!db.favorite_exists("alice", "bob").unwrap());
    }
}
