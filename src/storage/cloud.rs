//! Cloud asset store media storage
//!
//! Talks to a Cloudinary-style managed asset store over HTTPS. Uploads
//! go through the unsigned-friendly upload endpoint with a SHA-256
//! signature; deletes use the destroy endpoint with the object's public
//! id. Credentials (cloud name, API key, API secret) come from the
//! environment.

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::config::CloudCredentials;
use crate::models::Media;
use crate::storage::{file_extension, MediaStorage, StorageError, StoredObject};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Media storage backed by a managed cloud asset store.
pub struct CloudMediaStorage {
    creds: CloudCredentials,
    client: reqwest::Client,
}

impl CloudMediaStorage {
    pub fn new(creds: CloudCredentials) -> Self {
        Self {
            creds,
            client: reqwest::Client::new(),
        }
    }

    /// Sign a sorted parameter string the way the asset store expects:
    /// `key=value` pairs joined with `&`, the API secret appended, then
    /// SHA-256 hex digested.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<(&str, &str)> = params.to_vec();
        sorted.sort_by_key(|(k, _)| *k);
        let to_sign: String = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let digest = Sha256::digest(format!("{}{}", to_sign, self.creds.api_secret).as_bytes());
        hex::encode(digest)
    }

    fn resource_kind(content_type: &str) -> &'static str {
        if content_type.starts_with("video/") {
            "video"
        } else {
            "image"
        }
    }
}

/// Subset of the asset store's upload/destroy responses we consume
#[derive(Debug, serde::Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, serde::Deserialize)]
struct DestroyResponse {
    result: String,
}

#[async_trait]
impl MediaStorage for CloudMediaStorage {
    async fn store(
        &self,
        club_id: &str,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<StoredObject, StorageError> {
        let timestamp = Utc::now().timestamp().to_string();
        let folder = format!("clubhub/{}", club_id);
        let signature = self.sign(&[
            ("folder", &folder),
            ("timestamp", &timestamp),
            ("signature_algorithm", "sha256"),
        ]);

        let ext = file_extension(filename, content_type);
        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(format!("upload.{}", ext))
            .mime_str(content_type)
            .map_err(|e| StorageError::Request(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("api_key", self.creds.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder)
            .text("signature_algorithm", "sha256")
            .text("signature", signature)
            .part("file", part);

        let url = format!(
            "{}/{}/{}/upload",
            API_BASE,
            self.creds.cloud_name,
            Self::resource_kind(content_type)
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        Ok(StoredObject {
            url: body.secure_url,
            storage_ref: Some(body.public_id),
        })
    }

    async fn delete(&self, media: &Media) -> Result<(), StorageError> {
        let Some(public_id) = media.storage_ref.as_deref() else {
            // Not one of our cloud objects; nothing to destroy
            return Ok(());
        };

        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", public_id),
            ("timestamp", &timestamp),
            ("signature_algorithm", "sha256"),
        ]);

        let url = format!(
            "{}/{}/{}/destroy",
            API_BASE,
            self.creds.cloud_name,
            match media.kind {
                crate::models::MediaKind::Video => "video",
                crate::models::MediaKind::Image => "image",
            }
        );

        let response = self
            .client
            .post(&url)
            .form(&[
                ("public_id", public_id),
                ("api_key", self.creds.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature_algorithm", "sha256"),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        // "not found" is fine: the object is gone either way
        if body.result == "ok" || body.result == "not found" {
            Ok(())
        } else {
            Err(StorageError::Remote {
                status: status.as_u16(),
                message: body.result,
            })
        }
    }
}
