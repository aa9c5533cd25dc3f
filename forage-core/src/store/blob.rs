//! Blob storage for recipe images.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::{BlobStorage, StoreError};
use crate::http::HttpClient;
use crate::image::fetch_and_validate_image;

/// Downloads the transient image, validates it, and writes it to a directory.
///
/// Returned references are `{public_base}/{recipe_id}.{ext}`.
pub struct DiskBlobStorage<C: HttpClient> {
    client: C,
    dir: PathBuf,
    public_base: String,
}

impl<C: HttpClient> DiskBlobStorage<C> {
    pub fn new(client: C, dir: impl Into<PathBuf>, public_base: &str) -> Self {
        Self {
            client,
            dir: dir.into(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl<C: HttpClient> BlobStorage for DiskBlobStorage<C> {
    async fn upload_image(&self, recipe_id: Uuid, source_url: &str) -> Result<String, StoreError> {
        let image = fetch_and_validate_image(&self.client, source_url).await?;

        let file_name = format!("{}.{}", recipe_id, image.extension);
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.dir.join(&file_name), &image.data).await?;

        tracing::debug!(
            %recipe_id,
            content_type = %image.content_type,
            bytes = image.data.len(),
            "Image stored"
        );
        Ok(format!("{}/{}", self.public_base, file_name))
    }
}

/// Records uploads without fetching anything.
#[derive(Debug, Default)]
pub struct MemoryBlobStorage {
    uploads: Mutex<Vec<(Uuid, String)>>,
    failure: Option<String>,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upload fail with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// `(recipe_id, source_url)` for every upload attempt, in order.
    pub fn uploads(&self) -> Vec<(Uuid, String)> {
        self.uploads.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn upload_image(&self, recipe_id: Uuid, source_url: &str) -> Result<String, StoreError> {
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push((recipe_id, source_url.to_string()));
        }
        match &self.failure {
            Some(message) => Err(StoreError::Unavailable(message.clone())),
            None => Ok(format!("memory://images/{}", recipe_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockClient;
    use crate::image::tiny_png;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_disk_upload_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let client = MockClient::new().with_bytes("https://img.test/a.png", tiny_png());
        let storage = DiskBlobStorage::new(client, temp_dir.path(), "https://cdn.test/images/");

        let id = Uuid::new_v4();
        let reference = storage
            .upload_image(id, "https://img.test/a.png")
            .await
            .unwrap();

        assert_eq!(reference, format!("https://cdn.test/images/{}.png", id));
        assert!(temp_dir.path().join(format!("{}.png", id)).exists());
    }

    #[tokio::test]
    async fn test_disk_upload_rejects_non_image() {
        let temp_dir = TempDir::new().unwrap();
        let client = MockClient::new().with_bytes("https://img.test/a", b"<html>".to_vec());
        let storage = DiskBlobStorage::new(client, temp_dir.path(), "file:///images");

        let result = storage.upload_image(Uuid::new_v4(), "https://img.test/a").await;
        assert!(matches!(result, Err(StoreError::Image(_))));
    }

    #[tokio::test]
    async fn test_disk_upload_fetch_error() {
        let temp_dir = TempDir::new().unwrap();
        let client = MockClient::new().with_error("https://img.test/gone", "expired");
        let storage = DiskBlobStorage::new(client, temp_dir.path(), "file:///images");

        assert!(storage
            .upload_image(Uuid::new_v4(), "https://img.test/gone")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let id = Uuid::new_v4();
        let storage = MemoryBlobStorage::new();
        assert!(storage.upload_image(id, "https://x").await.is_ok());
        assert_eq!(storage.uploads(), vec![(id, "https://x".to_string())]);

        let failing = MemoryBlobStorage::failing("bucket full");
        assert!(failing.upload_image(id, "https://x").await.is_err());
        assert_eq!(failing.uploads().len(), 1);
    }
}
