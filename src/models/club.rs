//! Club model
//!
//! This module provides:
//! - `Club` entity representing a registered student club
//! - `ClubStatus` enum for the moderation lifecycle
//! - `Contact` block and its field-by-field update type
//! - Input types for creating and updating clubs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Media;

/// Club entity with profile fields and an associated media gallery.
///
/// Field names serialize in camelCase to match the wire format the
/// dashboards consume (`meetingTime`, `foundedYear` style keys).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    /// Unique identifier (URL-friendly slug)
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Category (open string: "Technology", "Arts", ...)
    pub category: String,
    /// Member count
    #[serde(default)]
    pub members: u32,
    /// Founding year, kept as a string ("2020")
    #[serde(default)]
    pub founded: String,
    /// Emoji/logo marker shown on cards
    #[serde(default)]
    pub logo: String,
    /// Contact block
    #[serde(default)]
    pub contact: Contact,
    /// Ordered media gallery
    #[serde(default)]
    pub media: Vec<Media>,
    /// Moderation status
    #[serde(default)]
    pub status: ClubStatus,
    /// Reason recorded when an admin rejects the club
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
}

/// Contact details for a club
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Contact email
    #[serde(default)]
    pub email: String,
    /// Meeting time ("Fridays 4:00 PM")
    #[serde(default)]
    pub meeting_time: String,
    /// Meeting location
    #[serde(default)]
    pub location: String,
}

impl Contact {
    /// Merge a partial update into this contact block.
    ///
    /// Only the sub-fields present in the update are replaced; the rest
    /// keep their current values, so updating `email` alone never erases
    /// `meeting_time` or `location`.
    pub fn apply(&mut self, update: ContactUpdate) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(meeting_time) = update.meeting_time {
            self.meeting_time = meeting_time;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
    }
}

/// Partial contact update: absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpdate {
    pub email: Option<String>,
    pub meeting_time: Option<String>,
    pub location: Option<String>,
}

/// Club moderation status.
///
/// New clubs start `Pending` and an admin moves them to `Active` or
/// `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClubStatus {
    /// Awaiting admin review
    #[default]
    Pending,
    /// Approved and publicly listed
    Active,
    /// Rejected by an admin
    Rejected,
}

impl fmt::Display for ClubStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClubStatus::Pending => write!(f, "pending"),
            ClubStatus::Active => write!(f, "active"),
            ClubStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for ClubStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ClubStatus::Pending),
            "active" => Ok(ClubStatus::Active),
            "rejected" => Ok(ClubStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid club status: {}", s)),
        }
    }
}

/// Input for creating a new club
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub members: u32,
    #[serde(default)]
    pub founded: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub contact: Contact,
}

/// Input for updating a club (all fields optional, shallow merge)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClubInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub members: Option<u32>,
    pub founded: Option<String>,
    pub logo: Option<String>,
    /// Nested block merged field-by-field, never replaced wholesale
    pub contact: Option<ContactUpdate>,
}

impl Club {
    /// Apply a partial update, merging the contact block field-by-field.
    pub fn apply(&mut self, update: UpdateClubInput) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(members) = update.members {
            self.members = members;
        }
        if let Some(founded) = update.founded {
            self.founded = founded;
        }
        if let Some(logo) = update.logo {
            self.logo = logo;
        }
        if let Some(contact) = update.contact {
            self.contact.apply(contact);
        }
    }

    /// Check if the club is visible on the public listing
    pub fn is_active(&self) -> bool {
        self.status == ClubStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_club() -> Club {
        Club {
            id: "chess-club".to_string(),
            name: "Chess Club".to_string(),
            description: "Strategy and tournaments".to_string(),
            category: "Games".to_string(),
            members: 10,
            founded: "2022".to_string(),
            logo: "♟".to_string(),
            contact: Contact {
                email: "chess@college.edu".to_string(),
                meeting_time: "Mondays 5:00 PM".to_string(),
                location: "Room 12".to_string(),
            },
            media: Vec::new(),
            status: ClubStatus::Pending,
            rejection_reason: None,
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn test_partial_contact_update_preserves_other_fields() {
        let mut club = sample_club();

        club.apply(UpdateClubInput {
            contact: Some(ContactUpdate {
                email: Some("new@college.edu".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert_eq!(club.contact.email, "new@college.edu");
        assert_eq!(club.contact.meeting_time, "Mondays 5:00 PM");
        assert_eq!(club.contact.location, "Room 12");
    }

    #[test]
    fn test_shallow_merge_only_touches_provided_fields() {
        let mut club = sample_club();

        club.apply(UpdateClubInput {
            members: Some(42),
            ..Default::default()
        });

        assert_eq!(club.members, 42);
        assert_eq!(club.name, "Chess Club");
        assert_eq!(club.status, ClubStatus::Pending);
    }

    #[test]
    fn test_status_display_roundtrip() {
        for status in [ClubStatus::Pending, ClubStatus::Active, ClubStatus::Rejected] {
            assert_eq!(ClubStatus::from_str(&status.to_string()).unwrap(), status);
        }
        assert!(ClubStatus::from_str("archived").is_err());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let club = sample_club();
        let json = serde_json::to_value(&club).unwrap();
        assert!(json.get("registeredAt").is_some());
        assert!(json["contact"].get("meetingTime").is_some());
    }
}
