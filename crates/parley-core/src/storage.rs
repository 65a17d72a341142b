use std::path::PathBuf;

use anyhow::Result;
use tokio::fs;
use tracing::{info, warn};

/// Blob storage collaborator. The core only ever asks whether a blob exists,
/// deletes one, or resolves its public URL; upload and serving live outside
/// this crate.
pub trait BlobStore {
    fn exists(&self, path: &str) -> impl Future<Output = bool> + Send;
    fn delete(&self, path: &str) -> impl Future<Output = Result<()>> + Send;
    fn url(&self, path: &str) -> String;
}

/// Local-filesystem blob store: blobs live under `{root}/{path}` and are
/// served by something else at `{public_base}/{path}`.
pub struct LocalBlobStore {
    root: PathBuf,
    public_base: String,
}

impl LocalBlobStore {
    pub async fn new(root: PathBuf, public_base: impl Into<String>) -> Result<Self> {
        fs::create_dir_all(&root).await?;
        info!("Blob storage directory: {}", root.display());
        Ok(Self {
            root,
            public_base: public_base.into(),
        })
    }

    fn disk_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl BlobStore for LocalBlobStore {
    async fn exists(&self, path: &str) -> bool {
        fs::try_exists(self.disk_path(path)).await.unwrap_or(false)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        match fs::remove_file(self.disk_path(path)).await {
            Ok(()) => {
                info!("Deleted blob {}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Blob {} already gone", path);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("parley-blob-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn exists_then_delete_then_gone() {
        let store = LocalBlobStore::new(scratch_dir(), "https://cdn.example/files")
            .await
            .unwrap();

        fs::create_dir_all(store.disk_path("attachments"))
            .await
            .unwrap();
        fs::write(store.disk_path("attachments/a.png"), b"png")
            .await
            .unwrap();

        assert!(store.exists("attachments/a.png").await);
        store.delete("attachments/a.png").await.unwrap();
        assert!(!store.exists("attachments/a.png").await);
    }

    #[tokio::test]
    async fn deleting_a_missing_blob_succeeds() {
        let store = LocalBlobStore::new(scratch_dir(), "https://cdn.example/files")
            .await
            .unwrap();
        store.delete("attachments/never-uploaded.png").await.unwrap();
    }

    #[tokio::test]
    async fn urls_join_cleanly() {
        let store = LocalBlobStore::new(scratch_dir(), "https://cdn.example/files/")
            .await
            .unwrap();
        assert_eq!(
            store.url("attachments/a.png"),
            "https://cdn.example/files/attachments/a.png"
        );
    }
}
