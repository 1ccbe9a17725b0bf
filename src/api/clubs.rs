//! Club API endpoints
//!
//! Handles HTTP requests for club management:
//! - GET /api/clubs - List all clubs
//! - GET /api/club/{id} - Get a club
//! - GET /api/club/{id}/media - Get a club's gallery
//! - POST /api/clubs - Register a club
//! - PUT /api/club/{id} - Update a club profile
//! - DELETE /api/club/{id} - Remove a club (admin)
//! - PUT /api/club/{id}/status - Approve/reject a club (admin)
//! - PUT /api/club/{id}/media/{mediaId}/status - Moderate media (admin)
//! - GET /api/media/carousel - All media, newest first
//! - GET /api/stats - Dashboard aggregation (admin)
//! - GET /api/health - Health check

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{AdminSession, ApiError, AppState};
use crate::models::{
    CarouselItem, Club, ClubStatus, CreateClubInput, Media, MediaStatus, UpdateClubInput,
};
use crate::store::ClubStats;

/// Response for the club list
#[derive(Debug, Serialize)]
pub struct ClubsResponse {
    pub success: bool,
    pub clubs: Vec<Club>,
}

/// Response for a single club
#[derive(Debug, Serialize)]
pub struct ClubResponse {
    pub success: bool,
    pub club: Club,
}

/// Response for a club's gallery
#[derive(Debug, Serialize)]
pub struct MediaListResponse {
    pub success: bool,
    pub media: Vec<Media>,
}

/// Response for the carousel feed
#[derive(Debug, Serialize)]
pub struct CarouselResponse {
    pub success: bool,
    pub media: Vec<CarouselItem>,
}

/// Bare success response
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub success: bool,
}

/// Query parameters for the club list
#[derive(Debug, Default, Deserialize)]
pub struct ListClubsQuery {
    /// Filter by moderation status
    pub status: Option<ClubStatus>,
    /// Filter by category (case-insensitive)
    pub category: Option<String>,
    /// Free-text search over name, description and category
    pub search: Option<String>,
}

/// GET /api/clubs - List clubs, optionally filtered
pub async fn list_clubs(
    State(state): State<AppState>,
    Query(query): Query<ListClubsQuery>,
) -> Json<ClubsResponse> {
    let clubs = if let Some(term) = query.search.as_deref() {
        state.club_store.search(term).await
    } else if let Some(category) = query.category.as_deref() {
        state.club_store.by_category(category).await
    } else if let Some(status) = query.status {
        state.club_store.clubs_by_status(status).await
    } else {
        state.club_store.list().await
    };

    Json(ClubsResponse {
        success: true,
        clubs,
    })
}

/// GET /api/club/{id} - Get a club by identifier
pub async fn get_club(
    State(state): State<AppState>,
    Path(club_id): Path<String>,
) -> Result<Json<ClubResponse>, ApiError> {
    let club = state.club_store.get_by_id(&club_id).await?;
    Ok(Json(ClubResponse {
        success: true,
        club,
    }))
}

/// GET /api/club/{id}/media - Get a club's gallery
pub async fn get_club_media(
    State(state): State<AppState>,
    Path(club_id): Path<String>,
) -> Result<Json<MediaListResponse>, ApiError> {
    let club = state.club_store.get_by_id(&club_id).await?;
    Ok(Json(MediaListResponse {
        success: true,
        media: club.media,
    }))
}

/// POST /api/clubs - Register a club
///
/// New clubs always start `pending` with an empty gallery.
pub async fn create_club(
    State(state): State<AppState>,
    Json(input): Json<CreateClubInput>,
) -> Result<(StatusCode, Json<ClubResponse>), ApiError> {
    if input.name.trim().is_empty() {
        return Err(ApiError::invalid_input("Club name is required"));
    }

    let club = state.club_store.create(input).await;
    Ok((
        StatusCode::CREATED,
        Json(ClubResponse {
            success: true,
            club,
        }),
    ))
}

/// PUT /api/club/{id} - Merge a partial update into a club profile
pub async fn update_club(
    State(state): State<AppState>,
    Path(club_id): Path<String>,
    Json(input): Json<UpdateClubInput>,
) -> Result<Json<ClubResponse>, ApiError> {
    let club = state.club_store.update(&club_id, input).await?;
    Ok(Json(ClubResponse {
        success: true,
        club,
    }))
}

/// DELETE /api/club/{id} - Remove a club (admin)
///
/// Idempotent: deleting an unknown id still succeeds.
pub async fn delete_club(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(club_id): Path<String>,
) -> Json<OkResponse> {
    state.club_store.delete(&club_id).await;
    Json(OkResponse { success: true })
}

/// Request body for moderation status changes
#[derive(Debug, Deserialize)]
pub struct ClubStatusRequest {
    pub status: ClubStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

/// PUT /api/club/{id}/status - Approve or reject a club (admin)
pub async fn set_club_status(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(club_id): Path<String>,
    Json(body): Json<ClubStatusRequest>,
) -> Result<Json<ClubResponse>, ApiError> {
    let club = state
        .club_store
        .set_status(&club_id, body.status, body.reason)
        .await?;
    Ok(Json(ClubResponse {
        success: true,
        club,
    }))
}

/// Request body for media moderation
#[derive(Debug, Deserialize)]
pub struct MediaStatusRequest {
    pub status: MediaStatus,
}

/// Response for a moderated media entry
#[derive(Debug, Serialize)]
pub struct MediaResponse {
    pub success: bool,
    pub media: Media,
}

/// PUT /api/club/{id}/media/{mediaId}/status - Moderate media (admin)
pub async fn set_media_status(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path((club_id, media_id)): Path<(String, String)>,
    Json(body): Json<MediaStatusRequest>,
) -> Result<Json<MediaResponse>, ApiError> {
    let media = state
        .club_store
        .set_media_status(&club_id, &media_id, body.status)
        .await?;
    Ok(Json(MediaResponse {
        success: true,
        media,
    }))
}

/// GET /api/media/carousel - All media across clubs, newest first
pub async fn carousel(State(state): State<AppState>) -> Json<CarouselResponse> {
    let media = state.club_store.carousel_media().await;
    Json(CarouselResponse {
        success: true,
        media,
    })
}

/// Response for dashboard statistics
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: ClubStats,
}

/// GET /api/stats - Aggregated dashboard statistics (admin)
pub async fn stats(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Json<StatsResponse> {
    let stats = state.club_store.stats().await;
    Json(StatsResponse {
        success: true,
        stats,
    })
}

/// Response for the health check
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    pub clubs_count: usize,
}

/// GET /api/health - Health check
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Server is running".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        clubs_count: state.club_store.count().await,
    })
}
