//! Authentication API endpoints
//!
//! Handles HTTP requests for the session module:
//! - POST /api/auth/login - Validate credentials, issue a session
//! - POST /api/auth/signup - Register an account, auto-login
//! - GET /api/auth/session - Echo the validated client-held session
//! - POST /api/auth/extend - Re-issue the session with a fresh expiry
//!
//! The returned session record is the sole authorization artifact; the
//! client holds it and sends it back in the `X-Session` header. Logout
//! is client-side deletion of that copy.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, SessionClaims};
use crate::models::Session;
use crate::services::SignupInput;

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response carrying an issued or validated session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub message: String,
    pub session: Session,
}

/// POST /api/auth/login - Validate credentials and issue a session
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.auth_service.login(&body.email, &body.password).await?;

    Ok(Json(SessionResponse {
        success: true,
        message: format!("Welcome back, {}!", session.name),
        session,
    }))
}

/// POST /api/auth/signup - Register an account and log it in
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupInput>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = state.auth_service.signup(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            success: true,
            message: format!("Account created successfully! Welcome {}!", session.name),
            session,
        }),
    ))
}

/// GET /api/auth/session - Echo the validated session claim
///
/// Validation is purely expiry-based; an expired or missing claim is a
/// 401 from the extractor.
pub async fn current_session(SessionClaims(session): SessionClaims) -> Json<SessionResponse> {
    Json(SessionResponse {
        success: true,
        message: "Session valid".to_string(),
        session,
    })
}

/// POST /api/auth/extend - Push the session expiry out by 24 hours
///
/// The client replaces its held copy with the returned record.
pub async fn extend_session(SessionClaims(mut session): SessionClaims) -> Json<SessionResponse> {
    session.extend();
    Json(SessionResponse {
        success: true,
        message: "Session extended".to_string(),
        session,
    })
}
