//! API middleware
//!
//! Contains:
//! - Application state shared by all handlers
//! - The uniform error envelope (`{"success": false, "message": ...}`)
//! - Session extraction from the `X-Session` header
//!
//! Sessions are client-held claims: the extractor deserializes the
//! header, checks expiry and role, and trusts the rest as-is. There is
//! no server-side session lookup to consult.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::config::UploadConfig;
use crate::models::Session;
use crate::services::{AuthError, AuthService};
use crate::storage::{MediaStorage, StorageError};
use crate::store::{ClubStore, StoreError};

/// Header carrying the client-held session claim as JSON
pub const SESSION_HEADER: &str = "x-session";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub club_store: Arc<ClubStore>,
    pub auth_service: Arc<AuthService>,
    pub storage: Arc<dyn MediaStorage>,
    pub upload_config: Arc<UploadConfig>,
}

/// Error response rendered as the uniform envelope with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// Envelope body for errors
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ClubNotFound(_) => ApiError::not_found("Club not found"),
            StoreError::MediaNotFound(_) => ApiError::not_found("Media not found"),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let message = e.to_string();
        let status = match e {
            AuthError::AccountNotFound | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::NotVerified => StatusCode::FORBIDDEN,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateAccount => StatusCode::CONFLICT,
        };
        ApiError::new(status, message)
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::storage(format!("Storage error: {}", e))
    }
}

/// Valid (unexpired) session claim extracted from the request
#[derive(Debug, Clone)]
pub struct SessionClaims(pub Session);

impl<S> FromRequestParts<S> for SessionClaims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(SESSION_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Please log in to access this page"))?;

        let raw = header
            .to_str()
            .map_err(|_| ApiError::unauthorized("Malformed session header"))?;

        let session: Session = serde_json::from_str(raw)
            .map_err(|_| ApiError::unauthorized("Malformed session header"))?;

        if !session.is_authenticated() {
            return Err(ApiError::unauthorized("Session expired. Please log in again."));
        }

        Ok(SessionClaims(session))
    }
}

/// Session claim that additionally carries an admin role
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let SessionClaims(session) = SessionClaims::from_request_parts(parts, state).await?;
        if !session.is_admin() {
            return Err(ApiError::forbidden("Access denied"));
        }
        Ok(AdminSession(session))
    }
}
