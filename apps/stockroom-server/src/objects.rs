//! Object storage seam for product images.
//!
//! `add_product` stores the image first and only persists the product once a
//! URL came back; an upload failure fails the whole operation.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Where uploaded images live. The returned URL is what gets attached to the
/// product record.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, file_name: &str, bytes: &[u8]) -> Result<String, ObjectStoreError>;
}

/// Local-disk implementation serving `/uploads/<file>` URLs.
pub struct DiskObjectStore {
    root: PathBuf,
}

impl DiskObjectStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait::async_trait]
impl ObjectStore for DiskObjectStore {
    async fn put(&self, file_name: &str, bytes: &[u8]) -> Result<String, ObjectStoreError> {
        // Strip any path components the client sent; prefix with a v7 uuid so
        // repeated uploads of the same name never collide.
        let base = file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(file_name)
            .replace(|c: char| !c.is_ascii_alphanumeric() && c != '.' && c != '-' && c != '_', "_");
        let stored = format!("{}-{}", Uuid::now_v7(), base);

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&stored), bytes).await?;

        Ok(format!("/uploads/{}", stored))
    }
}
