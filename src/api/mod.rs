//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints for the clubhub backend:
//! - Club CRUD and moderation
//! - Media upload, video URLs, deletion, carousel
//! - Authentication and sessions
//! - Static serving of uploaded content under /uploads

pub mod auth;
pub mod clubs;
pub mod middleware;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{AdminSession, ApiError, AppState, SessionClaims, SESSION_HEADER};

/// Build the API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .route("/clubs", get(clubs::list_clubs).post(clubs::create_club))
        .route(
            "/club/{id}",
            get(clubs::get_club)
                .put(clubs::update_club)
                .delete(clubs::delete_club),
        )
        .route("/club/{id}/media", get(clubs::get_club_media))
        .route("/club/{id}/status", put(clubs::set_club_status))
        .route(
            "/club/{id}/media/{media_id}/status",
            put(clubs::set_media_status),
        )
        .route("/upload", post(upload::upload_files))
        .route("/video-urls", post(upload::video_urls))
        .route("/media/carousel", get(clubs::carousel))
        .route("/media/{id}", delete(upload::delete_media))
        .route("/stats", get(clubs::stats))
        .route("/health", get(clubs::health))
        .route("/auth/login", post(auth::login))
        .route("/auth/signup", post(auth::signup))
        .route(
            "/auth/session",
            get(auth::current_session).post(auth::extend_session),
        )
}

/// Build the complete router with middleware and static file serving
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static(SESSION_HEADER),
        ])
        .allow_credentials(true);

    // Uploads can carry a whole batch; leave headroom over one file
    let body_limit = (state.upload_config.max_file_size as usize)
        .saturating_mul(state.upload_config.max_batch.max(1))
        .saturating_add(1024 * 1024);

    Router::new()
        .nest("/api", build_api_router())
        .nest_service("/uploads", ServeDir::new(&state.upload_config.path))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
