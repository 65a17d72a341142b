use parley_db::models::FavoriteRow;
use uuid::Uuid;

use crate::Messenger;
use crate::error::ChatError;
use crate::storage::BlobStore;
use crate::store::timestamp_now;

impl<S: BlobStore> Messenger<S> {
    /// Whether `target_id` is on `owner_id`'s starred-contacts list.
    pub fn is_favorite(&self, owner_id: Uuid, target_id: Uuid) -> Result<bool, ChatError> {
        Ok(self
            .db
            .favorite_exists(&owner_id.to_string(), &target_id.to_string())?)
    }

    /// Star or unstar a contact. Starring inserts without a dedup check
    /// (callers are expected to consult `is_favorite` first); unstarring
    /// deletes every matching row and reports whether any existed.
    pub fn set_favorite(&self, owner_id: Uuid, target_id: Uuid, on: bool) -> Result<bool, ChatError> {
        if on {
            let now = timestamp_now();
            self.db.insert_favorite(&FavoriteRow {
                id: Uuid::new_v4().to_string(),
                user_id: owner_id.to_string(),
                favorite_id: target_id.to_string(),
                created_at: now.clone(),
                updated_at: now,
            })?;
            Ok(true)
        } else {
            let removed = self
                .db
                .delete_favorites(&owner_id.to_string(), &target_id.to_string())?;
            Ok(removed > 0)
        }
    }
}
