//! # Chat Module
//!
//! The shared team chat log. Messages are append-only; the store assigns
//! each one a monotonically increasing sequence number.

use crate::error::{LeaveError, Result};
use crate::user::{Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// How many messages the chat views show.
pub const DEFAULT_CHAT_HISTORY: usize = 50;

/// A message that has been validated but not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatDraft {
    pub sender: UserId,
    pub sender_name: String,
    pub sender_role: Role,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatDraft {
    pub fn new(
        sender: UserId,
        sender_name: &str,
        sender_role: Role,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let message = message.trim();
        if message.is_empty() {
            return Err(LeaveError::invalid("message is required"));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(LeaveError::invalid(format!(
                "message exceeds {MAX_MESSAGE_CHARS} characters"
            )));
        }
        Ok(Self {
            sender,
            sender_name: sender_name.to_owned(),
            sender_role,
            message: message.to_owned(),
            timestamp: now,
        })
    }

    /// Attach the sequence number the store allocated.
    #[must_use]
    pub fn into_message(self, id: u64) -> ChatMessage {
        ChatMessage {
            id,
            sender_id: self.sender,
            sender_name: self.sender_name,
            sender_role: self.sender_role,
            message: self.message,
            timestamp: self.timestamp,
        }
    }
}

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    pub sender_id: UserId,
    pub sender_name: String,
    pub sender_role: Role,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
