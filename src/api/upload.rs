//! Upload API endpoints
//!
//! Handles media ingestion for club galleries:
//! - POST /api/upload - Multipart file batch bound to a club
//! - POST /api/video-urls - External embeddable video URLs
//! - DELETE /api/media/{id} - Remove a media entry and its stored object
//!
//! Files in a batch are processed independently: one rejected file never
//! aborts siblings that already passed validation.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Media, MediaKind, MediaStatus};
use crate::services::classify_video_url;
use crate::storage::StorageError;

/// Response for an upload batch
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub files: Vec<Media>,
    /// Per-file rejections ("name: reason"), empty when all were accepted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

/// Why a single file in a batch was rejected
enum FileRejection {
    UnsupportedType(String),
    TooLarge(u64),
    Read(String),
    Storage(StorageError),
}

impl FileRejection {
    fn describe(&self) -> String {
        match self {
            FileRejection::UnsupportedType(mime) => format!("invalid type {}", mime),
            FileRejection::TooLarge(limit) => {
                format!("file too large (max {} MB)", limit / 1024 / 1024)
            }
            FileRejection::Read(e) => e.clone(),
            FileRejection::Storage(e) => e.to_string(),
        }
    }

    /// Status used when no file in the batch was accepted
    fn into_api_error(self) -> ApiError {
        match self {
            FileRejection::UnsupportedType(mime) => ApiError::unsupported_media_type(format!(
                "Only image and video files are allowed (got {})",
                mime
            )),
            FileRejection::TooLarge(limit) => ApiError::invalid_input(format!(
                "File too large. Maximum size: {} MB",
                limit / 1024 / 1024
            )),
            FileRejection::Read(e) => ApiError::invalid_input(e),
            FileRejection::Storage(e) => e.into(),
        }
    }
}

/// POST /api/upload - Upload a batch of files for a club
///
/// Accepts multipart/form-data with `files` fields plus a `clubId` text
/// field. Each accepted file is stored through the configured backend
/// and appended to the club's gallery with status pending.
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let max_size = state.upload_config.max_file_size;
    let max_batch = state.upload_config.max_batch;

    let mut club_id: Option<String> = None;
    let mut pending: Vec<(String, String, Vec<u8>)> = Vec::new();
    let mut failed: Vec<(String, FileRejection)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_input(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "clubId" {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::invalid_input(format!("Failed to read clubId: {}", e)))?;
            club_id = Some(value.trim().to_string());
            continue;
        }

        if name != "files" && name != "file" {
            continue;
        }

        if pending.len() + failed.len() >= max_batch {
            return Err(ApiError::invalid_input(format!(
                "Too many files in one batch (max {})",
                max_batch
            )));
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        // MIME gate: images and videos only
        if !content_type.starts_with("image/") && !content_type.starts_with("video/") {
            failed.push((filename, FileRejection::UnsupportedType(content_type)));
            continue;
        }

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                failed.push((filename, FileRejection::Read(e.to_string())));
                continue;
            }
        };

        if data.len() as u64 > max_size {
            failed.push((filename, FileRejection::TooLarge(max_size)));
            continue;
        }

        pending.push((filename, content_type, data.to_vec()));
    }

    let club_id = club_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::invalid_input("Missing clubId"))?;

    if pending.is_empty() && failed.is_empty() {
        return Err(ApiError::invalid_input("No files uploaded"));
    }

    // The club must exist before anything is written
    state.club_store.get_by_id(&club_id).await?;

    let mut stored = Vec::new();
    for (filename, content_type, data) in pending {
        match state
            .storage
            .store(&club_id, &filename, &content_type, &data)
            .await
        {
            Ok(object) => {
                let kind = if content_type.starts_with("video/") {
                    MediaKind::Video
                } else {
                    MediaKind::Image
                };
                let caption = filename.rsplit_once('.').map(|(stem, _)| stem.to_string());
                let media = Media {
                    id: String::new(), // assigned by the store
                    kind,
                    url: object.url,
                    caption,
                    original_name: Some(filename),
                    size: data.len() as u64,
                    upload_date: Utc::now(),
                    status: MediaStatus::Pending,
                    storage_ref: object.storage_ref,
                    platform: None,
                };
                let media = state.club_store.add_media(&club_id, media).await?;
                stored.push(media);
            }
            Err(e) => {
                tracing::warn!("Failed to store {}: {}", filename, e);
                failed.push((filename, FileRejection::Storage(e)));
            }
        }
    }

    // Nothing accepted: surface the first rejection as the response
    if stored.is_empty() && !failed.is_empty() {
        let (_, rejection) = failed.swap_remove(0);
        return Err(rejection.into_api_error());
    }

    Ok(Json(UploadResponse {
        success: true,
        message: "Files uploaded successfully".to_string(),
        files: stored,
        failed: failed
            .into_iter()
            .map(|(name, rejection)| format!("{}: {}", name, rejection.describe()))
            .collect(),
    }))
}

/// Request body for external video URLs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUrlsRequest {
    pub club_id: String,
    pub urls: Vec<String>,
}

/// Response for an accepted video URL batch
#[derive(Debug, Serialize)]
pub struct VideoUrlsResponse {
    pub success: bool,
    pub videos: Vec<Media>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

/// POST /api/video-urls - Attach external embeddable videos to a club
///
/// Each URL must match one of the two recognized platforms. Descriptors
/// carry size zero and a platform tag.
pub async fn video_urls(
    State(state): State<AppState>,
    Json(body): Json<VideoUrlsRequest>,
) -> Result<Json<VideoUrlsResponse>, ApiError> {
    if body.urls.is_empty() {
        return Err(ApiError::invalid_input("No video URLs provided"));
    }

    state.club_store.get_by_id(&body.club_id).await?;

    let mut videos = Vec::new();
    let mut failed = Vec::new();

    for url in &body.urls {
        let Some(platform) = classify_video_url(url) else {
            failed.push(format!("{}: not a recognized video platform", url));
            continue;
        };

        let media = Media {
            id: String::new(),
            kind: MediaKind::Video,
            url: url.trim().to_string(),
            caption: None,
            original_name: None,
            size: 0,
            upload_date: Utc::now(),
            status: MediaStatus::Pending,
            storage_ref: None,
            platform: Some(platform),
        };
        let media = state.club_store.add_media(&body.club_id, media).await?;
        videos.push(media);
    }

    if videos.is_empty() {
        return Err(ApiError::invalid_input(
            "No valid video URLs. Only YouTube and Vimeo links are supported.",
        ));
    }

    Ok(Json(VideoUrlsResponse {
        success: true,
        videos,
        failed,
    }))
}

/// Request body for media deletion
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMediaRequest {
    pub club_id: String,
}

/// Response for media deletion
#[derive(Debug, Serialize)]
pub struct DeleteMediaResponse {
    pub success: bool,
}

/// DELETE /api/media/{id} - Remove a media entry
///
/// Removes the gallery entry first, then issues a best-effort delete
/// against the backing store. A storage failure is logged and swallowed:
/// the entry is already gone and that is the state the user asked for.
pub async fn delete_media(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    Json(body): Json<DeleteMediaRequest>,
) -> Result<Json<DeleteMediaResponse>, ApiError> {
    let removed = state
        .club_store
        .remove_media(&body.club_id, &media_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Media not found"))?;

    if let Err(e) = state.storage.delete(&removed).await {
        tracing::warn!("Failed to remove stored object for {}: {}", media_id, e);
    }

    Ok(Json(DeleteMediaResponse { success: true }))
}
