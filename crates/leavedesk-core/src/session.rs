//! # Session Module
//!
//! Server-side login sessions for the HTML pages.
//!
//! The browser only ever holds the opaque session id; role and display name
//! live here. Every session also carries a CSRF token that state-changing
//! forms must echo back.

use crate::user::{Role, User, UserId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime of a login session.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// A logged-in browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user: UserId,
    pub role: Role,
    pub user_name: String,
    pub csrf_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Open a session for `user` valid for `ttl`.
    #[must_use]
    pub fn issue(user: &User, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            user: user.id,
            role: user.role,
            user_name: user.name.clone(),
            csrf_token: Uuid::new_v4().simple().to_string(),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
