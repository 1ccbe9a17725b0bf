//! Embeddable-video URL validation
//!
//! Only two platforms are recognized; anything else is rejected before a
//! descriptor is synthesized.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::VideoPlatform;

static YOUTUBE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(www\.)?(youtube\.com/watch\?v=[\w-]{6,}|youtube\.com/embed/[\w-]{6,}|youtu\.be/[\w-]{6,})",
    )
    .expect("valid youtube pattern")
});

static VIMEO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://(www\.)?vimeo\.com/\d+").expect("valid vimeo pattern"));

/// Classify a URL against the embeddable-video allow-list.
pub fn classify_video_url(url: &str) -> Option<VideoPlatform> {
    let url = url.trim();
    if YOUTUBE_RE.is_match(url) {
        Some(VideoPlatform::Youtube)
    } else if VIMEO_RE.is_match(url) {
        Some(VideoPlatform::Vimeo)
    } else {
        None
    }
}
