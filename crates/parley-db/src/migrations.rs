use rusqlite::Connection;
use tracing::info;

use crate::DbResult;

pub fn run(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            from_id     TEXT NOT NULL,
            to_id       TEXT NOT NULL,
            body        TEXT,
            attachment  TEXT,
            seen        INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_pair
            ON messages(from_id, to_id, created_at);

        CREATE INDEX IF NOT EXISTS idx_messages_unseen
            ON messages(to_id, from_id, seen);

        -- No UNIQUE(user_id, favorite_id): duplicate stars are accepted and
        -- reads go through an existence check.
        CREATE TABLE IF NOT EXISTS favorites (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            favorite_id TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_favorites_owner
            ON favorites(user_id, favorite_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
