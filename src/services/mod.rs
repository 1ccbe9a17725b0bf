//! Services layer - Business logic
//!
//! This module contains the business logic services for the clubhub
//! backend. Services are responsible for:
//! - Implementing business rules
//! - Coordinating between the store, storage backends and persistence
//! - Handling validation and error cases

pub mod auth;
pub mod rate_limiter;
pub mod video;

pub use auth::{AuthError, AuthService, SignupInput};
pub use rate_limiter::LoginRateLimiter;
pub use video::classify_video_url;
