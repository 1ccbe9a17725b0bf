//! Data models
//!
//! This module contains all data structures used throughout the clubhub
//! backend. Models represent:
//! - Domain entities (Club, Media, User, Session)
//! - Status lifecycles for moderation
//! - Input types for create/update operations

mod club;
mod media;
mod session;
mod user;

pub use club::{Club, ClubStatus, Contact, ContactUpdate, CreateClubInput, UpdateClubInput};
pub use media::{CarouselItem, Media, MediaKind, MediaStatus, VideoPlatform};
pub use session::{Session, BOOTSTRAP_SESSION_DAYS, SESSION_HOURS};
pub use user::{User, UserRole};
