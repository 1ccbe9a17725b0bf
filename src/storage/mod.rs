//! Media storage layer
//!
//! This module abstracts where uploaded files live. It supports:
//! - Local filesystem under the configured upload root - default
//! - Managed cloud asset store - for deployments without durable disk
//!
//! The backend is selected from configuration; both sides of the
//! capability surface (`store`, `delete`) behave identically from the
//! handlers' point of view, so upload and deletion code is written once.

pub mod cloud;
pub mod local;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::models::Media;

pub use cloud::CloudMediaStorage;
pub use local::LocalMediaStorage;

/// Error types for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem write or remove failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cloud asset store request failure
    #[error("Asset store request failed: {0}")]
    Request(String),

    /// Cloud asset store rejected the operation
    #[error("Asset store error ({status}): {message}")]
    Remote { status: u16, message: String },
}

/// A stored object: the stable URL it is served from plus the backend
/// reference needed to delete it later (cloud public id; local backends
/// derive the path from the URL instead).
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub url: String,
    pub storage_ref: Option<String>,
}

/// Capability interface for media content stores.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Persist an uploaded file under the club's namespace and return
    /// its stable reference.
    async fn store(
        &self,
        club_id: &str,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<StoredObject, StorageError>;

    /// Remove the backing object for a media entry. Callers treat
    /// failures as best-effort: the list entry is already gone.
    async fn delete(&self, media: &Media) -> Result<(), StorageError>;
}

/// Build the storage backend selected by configuration.
pub fn create_storage(config: &Config) -> anyhow::Result<Arc<dyn MediaStorage>> {
    match config.storage.backend {
        StorageBackend::Local => Ok(Arc::new(LocalMediaStorage::new(
            config.upload.path.clone(),
        ))),
        StorageBackend::Cloud => {
            let creds = config.storage.cloud.clone().ok_or_else(|| {
                anyhow::anyhow!(
                    "Cloud storage selected but CLUBHUB_STORAGE_CLOUD_NAME/_KEY/_SECRET are not set"
                )
            })?;
            Ok(Arc::new(CloudMediaStorage::new(creds)))
        }
    }
}

/// Map a filename/MIME pair to the extension used for stored files.
pub(crate) fn file_extension(filename: &str, content_type: &str) -> String {
    if let Some(ext) = filename.rsplit('.').next() {
        if ext != filename && !ext.is_empty() && ext.len() < 10 {
            return ext.to_lowercase();
        }
    }

    match content_type {
        "image/jpeg" => "jpg".to_string(),
        "image/png" => "png".to_string(),
        "image/gif" => "gif".to_string(),
        "image/webp" => "webp".to_string(),
        "video/mp4" => "mp4".to_string(),
        "video/webm" => "webm".to_string(),
        "video/quicktime" => "mov".to_string(),
        _ => "bin".to_string(),
    }
}
