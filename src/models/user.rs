//! User model
//!
//! This module defines the mock user directory entry and the role set.
//!
//! Passwords are stored in plaintext: the directory is seeded demo data
//! and the system is explicitly not a production identity provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A registered account in the mock user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address (unique, case-insensitive)
    pub email: String,
    /// Plaintext password (demo data, never serialized outward)
    #[serde(skip_serializing)]
    pub password: String,
    /// Role
    pub role: UserRole,
    /// Managed club, for club-manager accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_name: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Whether the account passed email verification
    pub is_verified: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Superadmin)
    }

    /// Check if this account manages the given club
    pub fn manages_club(&self, club_id: &str) -> bool {
        self.role == UserRole::Club && self.club_id.as_deref() == Some(club_id)
    }
}

/// Account role.
///
/// - Admin: moderates clubs and media
/// - Club: manages a single club's profile and gallery
/// - Superadmin: elevated role issued only through the bootstrap
///   credentials provisioned via environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Club,
    Superadmin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Club
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Club => write!(f, "club"),
            UserRole::Superadmin => write!(f, "superadmin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "club" => Ok(UserRole::Club),
            "superadmin" => Ok(UserRole::Superadmin),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}
