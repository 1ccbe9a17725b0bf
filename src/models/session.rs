//! Session model
//!
//! A session is a client-held, time-bounded authorization claim. The
//! server issues it on login and never stores it: authorization is
//! derived purely from the expiry and role carried in the claim itself.
//! This is demo-grade trust, not production security.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{User, UserRole};

/// Normal session lifetime
pub const SESSION_HOURS: i64 = 24;
/// Bootstrap (superadmin) session lifetime
pub const BOOTSTRAP_SESSION_DAYS: i64 = 7;

/// Client-held session claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session identifier
    pub id: String,
    /// Role snapshot taken at issue time
    pub role: UserRole,
    /// Account identity
    pub email: String,
    pub name: String,
    pub user_id: String,
    /// Managed club, for club-manager sessions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_name: Option<String>,
    /// Issue timestamp
    pub login_time: DateTime<Utc>,
    /// Absolute expiry
    pub expires: DateTime<Utc>,
}

impl Session {
    /// Issue a 24-hour session for a directory account.
    pub fn issue(user: &User) -> Self {
        Self::issue_at(user, Utc::now())
    }

    /// Issue a session with an explicit clock, for expiry tests.
    pub fn issue_at(user: &User, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: user.role,
            email: user.email.clone(),
            name: user.name.clone(),
            user_id: user.id.clone(),
            club_id: user.club_id.clone(),
            club_name: user.club_name.clone(),
            login_time: now,
            expires: now + Duration::hours(SESSION_HOURS),
        }
    }

    /// Issue a 7-day superadmin session through the administrative
    /// bootstrap path.
    pub fn issue_bootstrap(email: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: UserRole::Superadmin,
            email: email.to_string(),
            name: "Bootstrap Administrator".to_string(),
            user_id: "bootstrap".to_string(),
            club_id: None,
            club_name: None,
            login_time: now,
            expires: now + Duration::days(BOOTSTRAP_SESSION_DAYS),
        }
    }

    /// Check whether the claim is still within its validity window
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        self.expires > now
    }

    /// Whether this session may moderate clubs and media
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Superadmin)
    }

    /// Whether this session owns the given club
    pub fn owns_club(&self, club_id: &str) -> bool {
        self.role == UserRole::Club && self.club_id.as_deref() == Some(club_id)
    }

    /// Push the expiry out by another 24 hours from now
    pub fn extend(&mut self) {
        self.expires = Utc::now() + Duration::hours(SESSION_HOURS);
    }
}
