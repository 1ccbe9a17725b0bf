//! Local filesystem media storage
//!
//! Files are written under `<root>/<club id>/<uuid>.<ext>` and served
//! statically under `/uploads`.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

use crate::models::Media;
use crate::storage::{file_extension, MediaStorage, StorageError, StoredObject};

/// Media storage backed by a local directory.
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a served URL back to a path under the upload root.
    ///
    /// Returns None for URLs that do not point into `/uploads`, such as
    /// external embeds or another backend's objects.
    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let relative = url.strip_prefix("/uploads/")?;
        // Reject anything trying to climb out of the root
        if relative.split('/').any(|part| part == ".." || part.is_empty()) {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn store(
        &self,
        club_id: &str,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<StoredObject, StorageError> {
        let club_dir = self.root.join(club_id);
        if !club_dir.exists() {
            fs::create_dir_all(&club_dir).await?;
        }

        let ext = file_extension(filename, content_type);
        let stored_name = format!("{}.{}", Uuid::new_v4(), ext);
        fs::write(club_dir.join(&stored_name), data).await?;

        Ok(StoredObject {
            url: format!("/uploads/{}/{}", club_id, stored_name),
            storage_ref: None,
        })
    }

    async fn delete(&self, media: &Media) -> Result<(), StorageError> {
        let Some(path) = self.path_for_url(&media.url) else {
            // Nothing on disk to remove (external embed or foreign URL)
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already gone counts as deleted
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaKind, MediaStatus};
    use chrono::Utc;
    use tempfile::TempDir;

    fn media_for(url: &str) -> Media {
        Media {
            id: "m-1".to_string(),
            kind: MediaKind::Image,
            url: url.to_string(),
            caption: None,
            original_name: None,
            size: 3,
            upload_date: Utc::now(),
            status: MediaStatus::Pending,
            storage_ref: None,
            platform: None,
        }
    }

    #[tokio::test]
    async fn test_store_writes_under_club_directory() {
        let dir = TempDir::new().unwrap();
        let storage = LocalMediaStorage::new(dir.path());

        let stored = storage
            .store("chess-club", "board.png", "image/png", b"abc")
            .await
            .unwrap();

        assert!(stored.url.starts_with("/uploads/chess-club/"));
        assert!(stored.url.ends_with(".png"));
        assert!(stored.storage_ref.is_none());

        let relative = stored.url.strip_prefix("/uploads/").unwrap();
        let content = std::fs::read(dir.path().join(relative)).unwrap();
        assert_eq!(content, b"abc");
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalMediaStorage::new(dir.path());

        let stored = storage
            .store("chess-club", "board.png", "image/png", b"abc")
            .await
            .unwrap();
        storage.delete(&media_for(&stored.url)).await.unwrap();

        let relative = stored.url.strip_prefix("/uploads/").unwrap();
        assert!(!dir.path().join(relative).exists());
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let dir = TempDir::new().unwrap();
        let storage = LocalMediaStorage::new(dir.path());

        let result = storage
            .delete(&media_for("/uploads/chess-club/gone.png"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_ignores_external_urls() {
        let dir = TempDir::new().unwrap();
        let storage = LocalMediaStorage::new(dir.path());

        let result = storage
            .delete(&media_for("https://www.youtube.com/watch?v=abc123"))
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_path_traversal_rejected() {
        let storage = LocalMediaStorage::new("uploads");
        assert!(storage.path_for_url("/uploads/../etc/passwd").is_none());
        assert!(storage.path_for_url("/uploads//etc").is_none());
        assert!(storage.path_for_url("/elsewhere/a.png").is_none());
    }
}
