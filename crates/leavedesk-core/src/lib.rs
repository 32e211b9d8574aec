//! # LeaveDesk Core
//!
//! Domain model and persistence for the LeaveDesk leave management service.
//!
//! This crate contains:
//! - Users, roles and public profiles
//! - Leave requests and their review lifecycle
//! - The team chat log
//! - Server-side login sessions
//! - Password hashing (bcrypt)
//! - The month calendar of approved absences
//! - redb-backed storage with versioned postcard records
//!
//! Nothing here is async and nothing reads the wall clock: every operation
//! that needs "now" takes it as an argument.

pub mod calendar;
pub mod chat;
pub mod error;
pub mod formats;
pub mod leave;
pub mod password;
pub mod roster;
pub mod session;
pub mod storage;
pub mod user;

pub use calendar::{Absence, CalendarDay, CalendarMonth, parse_month};
pub use chat::{ChatDraft, ChatMessage, DEFAULT_CHAT_HISTORY, MAX_MESSAGE_CHARS};
pub use error::{LeaveError, Result};
pub use leave::{LeaveFilter, LeaveId, LeaveOrder, LeaveRequest, LeaveStatus, NewLeave};
pub use password::{DEFAULT_COST, DEFAULT_PASSWORD, PasswordHasher};
pub use roster::{RosterEntry, SeedReport};
pub use session::{DEFAULT_SESSION_TTL_HOURS, Session};
pub use storage::RedbStore;
pub use user::{NewUser, Role, User, UserId, UserProfile};

/// Parse a string identifier into a UUID-backed id type.
pub(crate) fn parse_uuid(raw: &str, what: &'static str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(raw.trim()).map_err(|_| LeaveError::Invalid(format!("malformed {what}")))
}
