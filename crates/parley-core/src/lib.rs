pub mod error;
pub mod favorites;
pub mod projector;
pub mod storage;
pub mod store;

use std::sync::Arc;

use parley_db::Database;
use parley_types::config::ChatConfig;

pub use error::ChatError;
pub use storage::{BlobStore, LocalBlobStore};
pub use store::NewMessage;

/// The messenger facade: one value owning the persistence handle, the blob
/// storage collaborator, and the static configuration. Every operation takes
/// the acting user's id explicitly; nothing is read from ambient state.
pub struct Messenger<S: BlobStore> {
    db: Arc<Database>,
    storage: S,
    config: ChatConfig,
}

impl<S: BlobStore> Messenger<S> {
    pub fn new(db: Arc<Database>, storage: S, config: ChatConfig) -> Self {
        Self {
            db,
            storage,
            config,
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn allowed_images(&self) -> &[String] {
        &self.config.allowed_images
    }

    pub fn allowed_files(&self) -> &[String] {
        &self.config.allowed_files
    }

    /// Maximum attachment upload size, in bytes.
    pub fn max_upload_size(&self) -> u64 {
        self.config.max_upload_size_bytes()
    }

    pub fn colors(&self) -> &[String] {
        &self.config.colors
    }

    pub fn fallback_color(&self) -> &str {
        self.config.fallback_color()
    }

    /// Storage path of an attachment blob by stored name.
    pub(crate) fn attachment_path(&self, stored_name: &str) -> String {
        format!("{}/{}", self.config.attachments_folder, stored_name)
    }

    /// Public URL of an attachment blob by stored name.
    pub fn attachment_url(&self, stored_name: &str) -> String {
        self.storage.url(&self.attachment_path(stored_name))
    }
}
