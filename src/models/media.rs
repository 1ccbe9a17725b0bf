//! Media model
//!
//! This module provides:
//! - `Media` descriptor for uploaded files and embedded videos
//! - `MediaKind` and `MediaStatus` enums
//! - `VideoPlatform` tag for allow-listed embed sources

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Media descriptor attached to exactly one club's gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    /// Identifier, unique within the owning club
    pub id: String,
    /// Image or video
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Source locator: served URL or external embed URL
    pub url: String,
    /// Optional caption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Original filename as uploaded, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    /// Size in bytes (zero for external embeds)
    #[serde(default)]
    pub size: u64,
    /// Upload timestamp
    pub upload_date: DateTime<Utc>,
    /// Moderation status
    #[serde(default)]
    pub status: MediaStatus,
    /// Backing-store reference used for deletion (cloud public id);
    /// absent for local files and external embeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_ref: Option<String>,
    /// Platform tag for external embeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<VideoPlatform>,
}

/// Media kind derived from the upload MIME type or embed source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Media moderation status.
///
/// Uploads start `Pending`; an admin approves or rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaStatus {
    #[default]
    Pending,
    Active,
    Rejected,
}

impl fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaStatus::Pending => write!(f, "pending"),
            MediaStatus::Active => write!(f, "active"),
            MediaStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for MediaStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(MediaStatus::Pending),
            "active" => Ok(MediaStatus::Active),
            "rejected" => Ok(MediaStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid media status: {}", s)),
        }
    }
}

/// Recognized embeddable-video platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoPlatform {
    Youtube,
    Vimeo,
}

impl fmt::Display for VideoPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoPlatform::Youtube => write!(f, "youtube"),
            VideoPlatform::Vimeo => write!(f, "vimeo"),
        }
    }
}

/// Carousel entry: a media descriptor tagged with its owning club
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItem {
    #[serde(flatten)]
    pub media: Media,
    pub club_id: String,
    pub club_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_wire_format() {
        let media = Media {
            id: "m-1".to_string(),
            kind: MediaKind::Image,
            url: "/uploads/chess-club/abc.jpg".to_string(),
            caption: Some("Tournament night".to_string()),
            original_name: Some("tournament.jpg".to_string()),
            size: 1024,
            upload_date: Utc::now(),
            status: MediaStatus::Pending,
            storage_ref: None,
            platform: None,
        };

        let json = serde_json::to_value(&media).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["status"], "pending");
        assert!(json.get("uploadDate").is_some());
        // Absent optionals stay off the wire
        assert!(json.get("storageRef").is_none());
        assert!(json.get("platform").is_none());
    }

    #[test]
    fn test_media_status_parse() {
        assert_eq!(MediaStatus::from_str("ACTIVE").unwrap(), MediaStatus::Active);
        assert!(MediaStatus::from_str("deleted").is_err());
    }
}
