//! Club store
//!
//! Implements the in-memory club/media state manager:
//! - Club CRUD with partial updates (nested contact merged field-by-field)
//! - Media sub-operations (attach, remove, moderate)
//! - Admin moderation of club status
//! - Aggregations for the carousel feed and dashboard statistics
//!
//! The store is an explicit object owning its state behind an async
//! RwLock, constructed once per process and shared by reference through
//! the application state. When a persistence helper is attached every
//! mutation mirrors the full list under the `clubs` key; mirror-write
//! failures are logged and swallowed so the in-memory copy stays
//! authoritative.

use chrono::{Datelike, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    CarouselItem, Club, ClubStatus, CreateClubInput, Media, MediaStatus, UpdateClubInput,
};
use crate::persist::{JsonStore, CLUBS_KEY};

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unknown club identifier
    #[error("Club not found: {0}")]
    ClubNotFound(String),

    /// Unknown media identifier within an existing club
    #[error("Media not found: {0}")]
    MediaNotFound(String),
}

/// Aggregated dashboard statistics, computed from persisted records
/// rather than mocked counters.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubStats {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub rejected: usize,
    pub total_members: u64,
    pub total_media: usize,
    /// Media uploaded during the current calendar month
    pub media_this_month: usize,
    /// Club counts per category, sorted by name
    pub categories: BTreeMap<String, usize>,
}

/// In-memory club store with an optional JSON mirror.
pub struct ClubStore {
    clubs: Arc<RwLock<Vec<Club>>>,
    persist: Option<Arc<JsonStore>>,
}

impl ClubStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            clubs: Arc::new(RwLock::new(Vec::new())),
            persist: None,
        }
    }

    /// Create a store backed by a persistence helper.
    ///
    /// A previously mirrored club list is loaded if present; otherwise
    /// the store starts empty and mirrors from the first mutation on.
    pub fn with_persistence(persist: Arc<JsonStore>) -> Self {
        let clubs: Vec<Club> = persist.get(CLUBS_KEY).unwrap_or_default();
        Self {
            clubs: Arc::new(RwLock::new(clubs)),
            persist: Some(persist),
        }
    }

    /// Seed the store with sample clubs if it is empty.
    pub async fn seed_samples(&self) {
        let mut clubs = self.clubs.write().await;
        if clubs.is_empty() {
            *clubs = sample_clubs();
            self.mirror(&clubs);
        }
    }

    /// Write the full list through the persistence helper, if attached.
    /// Failures are logged, never propagated.
    fn mirror(&self, clubs: &[Club]) {
        if let Some(persist) = &self.persist {
            if let Err(e) = persist.set(CLUBS_KEY, &clubs.to_vec()) {
                tracing::warn!("Failed to mirror club state: {}", e);
            }
        }
    }

    /// List all clubs in insertion order.
    pub async fn list(&self) -> Vec<Club> {
        self.clubs.read().await.clone()
    }

    /// Look up a club by identifier.
    pub async fn get_by_id(&self, id: &str) -> Result<Club, StoreError> {
        self.clubs
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::ClubNotFound(id.to_string()))
    }

    /// Create a club with a fresh unique identifier.
    ///
    /// The identifier is a slug of the display name; a short random
    /// suffix is appended on collision. New clubs start `pending` with
    /// an empty gallery.
    pub async fn create(&self, input: CreateClubInput) -> Club {
        let mut clubs = self.clubs.write().await;

        let mut id = slugify(&input.name);
        if id.is_empty() || clubs.iter().any(|c| c.id == id) {
            let suffix = Uuid::new_v4().simple().to_string();
            id = if id.is_empty() {
                format!("club-{}", &suffix[..8])
            } else {
                format!("{}-{}", id, &suffix[..8])
            };
        }

        let club = Club {
            id,
            name: input.name,
            description: input.description,
            category: input.category,
            members: input.members,
            founded: input.founded,
            logo: input.logo,
            contact: input.contact,
            media: Vec::new(),
            status: ClubStatus::Pending,
            rejection_reason: None,
            registered_at: Utc::now(),
        };

        clubs.push(club.clone());
        self.mirror(&clubs);
        club
    }

    /// Merge a partial update into an existing club.
    pub async fn update(&self, id: &str, input: UpdateClubInput) -> Result<Club, StoreError> {
        let mut clubs = self.clubs.write().await;
        let club = clubs
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::ClubNotFound(id.to_string()))?;

        club.apply(input);
        let updated = club.clone();
        self.mirror(&clubs);
        Ok(updated)
    }

    /// Remove a club. Succeeds silently when the id is unknown.
    pub async fn delete(&self, id: &str) {
        let mut clubs = self.clubs.write().await;
        let before = clubs.len();
        clubs.retain(|c| c.id != id);
        if clubs.len() != before {
            self.mirror(&clubs);
        }
    }

    /// Move a club through the moderation lifecycle.
    pub async fn set_status(
        &self,
        id: &str,
        status: ClubStatus,
        reason: Option<String>,
    ) -> Result<Club, StoreError> {
        let mut clubs = self.clubs.write().await;
        let club = clubs
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::ClubNotFound(id.to_string()))?;

        club.status = status;
        club.rejection_reason = match status {
            ClubStatus::Rejected => reason,
            _ => None,
        };
        let updated = club.clone();
        self.mirror(&clubs);
        Ok(updated)
    }

    /// Attach a media descriptor to a club's gallery.
    ///
    /// Assigns an identifier when the descriptor lacks one and forces
    /// the status to `pending` so every upload passes moderation.
    pub async fn add_media(&self, club_id: &str, mut media: Media) -> Result<Media, StoreError> {
        let mut clubs = self.clubs.write().await;
        let club = clubs
            .iter_mut()
            .find(|c| c.id == club_id)
            .ok_or_else(|| StoreError::ClubNotFound(club_id.to_string()))?;

        if media.id.is_empty() {
            media.id = Uuid::new_v4().to_string();
        }
        media.status = MediaStatus::Pending;

        club.media.push(media.clone());
        self.mirror(&clubs);
        Ok(media)
    }

    /// Detach a media entry from a club's gallery.
    ///
    /// Returns the removed descriptor so the caller can clean up the
    /// backing store; `Ok(None)` when the media id was already gone
    /// (idempotent).
    pub async fn remove_media(
        &self,
        club_id: &str,
        media_id: &str,
    ) -> Result<Option<Media>, StoreError> {
        let mut clubs = self.clubs.write().await;
        let club = clubs
            .iter_mut()
            .find(|c| c.id == club_id)
            .ok_or_else(|| StoreError::ClubNotFound(club_id.to_string()))?;

        let removed = club
            .media
            .iter()
            .position(|m| m.id == media_id)
            .map(|idx| club.media.remove(idx));

        if removed.is_some() {
            self.mirror(&clubs);
        }
        Ok(removed)
    }

    /// Moderate a single media entry (approve/reject).
    pub async fn set_media_status(
        &self,
        club_id: &str,
        media_id: &str,
        status: MediaStatus,
    ) -> Result<Media, StoreError> {
        let mut clubs = self.clubs.write().await;
        let club = clubs
            .iter_mut()
            .find(|c| c.id == club_id)
            .ok_or_else(|| StoreError::ClubNotFound(club_id.to_string()))?;

        let media = club
            .media
            .iter_mut()
            .find(|m| m.id == media_id)
            .ok_or_else(|| StoreError::MediaNotFound(media_id.to_string()))?;

        media.status = status;
        let updated = media.clone();
        self.mirror(&clubs);
        Ok(updated)
    }

    /// All clubs in the given moderation state.
    pub async fn clubs_by_status(&self, status: ClubStatus) -> Vec<Club> {
        self.clubs
            .read()
            .await
            .iter()
            .filter(|c| c.status == status)
            .cloned()
            .collect()
    }

    /// Case-insensitive search over name, description and category.
    pub async fn search(&self, term: &str) -> Vec<Club> {
        let term = term.to_lowercase();
        self.clubs
            .read()
            .await
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&term)
                    || c.description.to_lowercase().contains(&term)
                    || c.category.to_lowercase().contains(&term)
            })
            .cloned()
            .collect()
    }

    /// Clubs in the given category (case-insensitive).
    pub async fn by_category(&self, category: &str) -> Vec<Club> {
        self.clubs
            .read()
            .await
            .iter()
            .filter(|c| c.category.eq_ignore_ascii_case(category))
            .cloned()
            .collect()
    }

    /// All media across clubs for the home carousel, newest first.
    ///
    /// The sort is stable, so entries sharing an upload timestamp keep
    /// their insertion order.
    pub async fn carousel_media(&self) -> Vec<CarouselItem> {
        let clubs = self.clubs.read().await;
        let mut items: Vec<CarouselItem> = clubs
            .iter()
            .flat_map(|club| {
                club.media.iter().map(|media| CarouselItem {
                    media: media.clone(),
                    club_id: club.id.clone(),
                    club_name: club.name.clone(),
                })
            })
            .collect();

        items.sort_by(|a, b| b.media.upload_date.cmp(&a.media.upload_date));
        items
    }

    /// Dashboard statistics aggregated from the stored records.
    pub async fn stats(&self) -> ClubStats {
        let clubs = self.clubs.read().await;
        let now = Utc::now();

        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_media = 0;
        let mut media_this_month = 0;

        for club in clubs.iter() {
            if !club.category.is_empty() {
                *categories.entry(club.category.clone()).or_insert(0) += 1;
            }
            total_media += club.media.len();
            media_this_month += club
                .media
                .iter()
                .filter(|m| {
                    m.upload_date.year() == now.year() && m.upload_date.month() == now.month()
                })
                .count();
        }

        ClubStats {
            total: clubs.len(),
            active: clubs.iter().filter(|c| c.status == ClubStatus::Active).count(),
            pending: clubs.iter().filter(|c| c.status == ClubStatus::Pending).count(),
            rejected: clubs.iter().filter(|c| c.status == ClubStatus::Rejected).count(),
            total_members: clubs.iter().map(|c| c.members as u64).sum(),
            total_media,
            media_this_month,
            categories,
        }
    }

    /// Number of stored clubs (health endpoint).
    pub async fn count(&self) -> usize {
        self.clubs.read().await.len()
    }
}

impl Default for ClubStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive a URL-friendly identifier from a club name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for ch in name.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_matches('-').to_string()
}

/// Sample clubs used when no persisted state exists.
fn sample_clubs() -> Vec<Club> {
    use crate::models::{Contact, MediaKind};
    use chrono::Duration;

    let now = Utc::now();
    let media = |id: &str, url: &str, caption: &str, days_ago: i64| Media {
        id: id.to_string(),
        kind: MediaKind::Image,
        url: url.to_string(),
        caption: Some(caption.to_string()),
        original_name: None,
        size: 0,
        upload_date: now - Duration::days(days_ago),
        status: MediaStatus::Active,
        storage_ref: None,
        platform: None,
    };

    vec![
        Club {
            id: "tech-club".to_string(),
            name: "Technology Club".to_string(),
            description: "Explore the latest in technology, programming, and innovation. \
                          Join us for hackathons, coding competitions, and tech talks."
                .to_string(),
            category: "Technology".to_string(),
            members: 150,
            founded: "2020".to_string(),
            logo: "💻".to_string(),
            contact: Contact {
                email: "tech@college.edu".to_string(),
                meeting_time: "Fridays 4:00 PM".to_string(),
                location: "Computer Lab A".to_string(),
            },
            media: vec![
                media("tech-1", "https://picsum.photos/800/500?random=1", "Annual Hackathon 2024", 2),
                media("tech-2", "https://picsum.photos/800/500?random=2", "AI Workshop Success", 5),
            ],
            status: ClubStatus::Active,
            rejection_reason: None,
            registered_at: now,
        },
        Club {
            id: "drama-club".to_string(),
            name: "Drama Society".to_string(),
            description: "Express yourself through theater and performing arts. From \
                          Shakespeare to modern plays, we bring stories to life."
                .to_string(),
            category: "Arts".to_string(),
            members: 85,
            founded: "2018".to_string(),
            logo: "🎭".to_string(),
            contact: Contact {
                email: "drama@college.edu".to_string(),
                meeting_time: "Tuesdays 6:00 PM".to_string(),
                location: "Auditorium".to_string(),
            },
            media: vec![
                media("drama-1", "https://picsum.photos/800/500?random=3", "Hamlet Performance Night", 1),
            ],
            status: ClubStatus::Active,
            rejection_reason: None,
            registered_at: now,
        },
        Club {
            id: "sports-club".to_string(),
            name: "Sports Club".to_string(),
            description: "Stay fit and competitive with various sports activities. \
                          Basketball, soccer, cricket, and more!"
                .to_string(),
            category: "Sports".to_string(),
            members: 200,
            founded: "2015".to_string(),
            logo: "⚽".to_string(),
            contact: Contact {
                email: "sports@college.edu".to_string(),
                meeting_time: "Daily 5:00 PM".to_string(),
                location: "Sports Ground".to_string(),
            },
            media: vec![
                media("sports-1", "https://picsum.photos/800/500?random=5", "Inter-college Tournament Victory", 4),
            ],
            status: ClubStatus::Active,
            rejection_reason: None,
            registered_at: now,
        },
        Club {
            id: "music-club".to_string(),
            name: "Music Society".to_string(),
            description: "Create beautiful melodies and harmonies. Whether you sing, \
                          play instruments, or produce music, join us!"
                .to_string(),
            category: "Arts".to_string(),
            members: 75,
            founded: "2019".to_string(),
            logo: "🎵".to_string(),
            contact: Contact {
                email: "music@college.edu".to_string(),
                meeting_time: "Thursdays 5:00 PM".to_string(),
                location: "Music Room".to_string(),
            },
            media: vec![
                media("music-1", "https://picsum.photos/800/500?random=7", "Annual Concert", 7),
            ],
            status: ClubStatus::Active,
            rejection_reason: None,
            registered_at: now,
        },
    ]
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Slugs only ever contain lowercase alphanumerics and single
        /// interior dashes.
        #[test]
        fn property_slug_shape(name in ".{0,40}") {
            let slug = slugify(&name);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        /// Creating N clubs with identical names yields N distinct ids.
        #[test]
        fn property_create_ids_unique(count in 1usize..8) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result: Result<(), TestCaseError> = rt.block_on(async {
                let store = ClubStore::new();
                let mut ids = std::collections::HashSet::new();
                for _ in 0..count {
                    let club = store
                        .create(CreateClubInput {
                            name: "Chess Club".to_string(),
                            description: String::new(),
                            category: String::new(),
                            members: 0,
                            founded: String::new(),
                            logo: String::new(),
                            contact: Default::default(),
                        })
                        .await;
                    prop_assert!(ids.insert(club.id));
                }
                Ok(())
            });
            result?;
        }
    }
}
