//! redb-backed store.
//!
//! Table layout:
//! - `users`: user id -> encoded `User`
//! - `users_by_email`: lowercased email -> user id
//! - `users_by_code`: employee code -> user id
//! - `leaves`: leave id -> encoded `LeaveRequest`
//! - `chat`: sequence number -> encoded `ChatMessage`
//! - `sessions`: session id -> encoded `Session`
//!
//! Both user indexes are written in the same transaction as the user row,
//! so they never disagree with it.

use crate::chat::{ChatDraft, ChatMessage};
use crate::error::{LeaveError, Result};
use crate::formats::{decode_record, encode_record};
use crate::leave::{LeaveFilter, LeaveId, LeaveRequest, LeaveStatus};
use crate::session::Session;
use crate::user::{Role, User, UserId};
use chrono::{DateTime, Utc};
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, Table, TableDefinition,
};
use std::path::Path;

const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
const USERS_BY_EMAIL: TableDefinition<&str, &str> = TableDefinition::new("users_by_email");
const USERS_BY_CODE: TableDefinition<&str, &str> = TableDefinition::new("users_by_code");
const LEAVES: TableDefinition<&str, &[u8]> = TableDefinition::new("leaves");
const CHAT: TableDefinition<u64, &[u8]> = TableDefinition::new("chat");
const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// Index key for an email address. Lookups ignore case.
fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// LeaveDesk storage on top of a single redb database.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open the database at `path`, creating the file if it is missing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Database::create(path)?)
    }

    /// Open an existing database; fails if `path` does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Database::open(path)?)
    }

    /// A throwaway database held entirely in memory.
    pub fn in_memory() -> Result<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    /// Make sure every table exists so read transactions never miss one.
    fn init(db: Database) -> Result<Self> {
        let txn = db.begin_write()?;
        {
            txn.open_table(USERS)?;
            txn.open_table(USERS_BY_EMAIL)?;
            txn.open_table(USERS_BY_CODE)?;
            txn.open_table(LEAVES)?;
            txn.open_table(CHAT)?;
            txn.open_table(SESSIONS)?;
        }
        txn.commit()?;
        Ok(Self { db })
    }

    // =========================================================================
    // USERS
    // =========================================================================

    /// Store a new user, enforcing unique email and employee code.
    pub fn insert_user(&self, user: &User) -> Result<()> {
        let id = user.id.to_string();
        let email = email_key(&user.email);
        let bytes = encode_record(user)?;

        let txn = self.db.begin_write()?;
        {
            let mut by_email = txn.open_table(USERS_BY_EMAIL)?;
            if by_email.get(email.as_str())?.is_some() {
                return Err(LeaveError::DuplicateEmail);
            }
            let mut by_code = txn.open_table(USERS_BY_CODE)?;
            if by_code.get(user.employee_code.as_str())?.is_some() {
                return Err(LeaveError::DuplicateEmployeeCode);
            }
            by_email.insert(email.as_str(), id.as_str())?;
            by_code.insert(user.employee_code.as_str(), id.as_str())?;

            let mut users = txn.open_table(USERS)?;
            users.insert(id.as_str(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let key = id.to_string();
        let txn = self.db.begin_read()?;
        let users = txn.open_table(USERS)?;
        users
            .get(key.as_str())?
            .map(|guard| decode_record(guard.value()))
            .transpose()
    }

    /// Look a user up by email, ignoring case.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let key = email_key(email);
        let txn = self.db.begin_read()?;
        let by_email = txn.open_table(USERS_BY_EMAIL)?;
        let Some(id) = by_email.get(key.as_str())?.map(|g| g.value().to_owned()) else {
            return Ok(None);
        };
        let users = txn.open_table(USERS)?;
        users
            .get(id.as_str())?
            .map(|guard| decode_record(guard.value()))
            .transpose()
    }

    /// Users with the given role (or all), sorted by name.
    pub fn list_users(&self, role: Option<Role>) -> Result<Vec<User>> {
        let txn = self.db.begin_read()?;
        let users = txn.open_table(USERS)?;

        let mut out = Vec::new();
        for entry in users.iter()? {
            let (_, value) = entry?;
            let user: User = decode_record(value.value())?;
            if role.is_none_or(|r| r == user.role) {
                out.push(user);
            }
        }
        out.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(out)
    }

    pub fn count_users(&self, role: Option<Role>) -> Result<usize> {
        match role {
            None => {
                let txn = self.db.begin_read()?;
                let users = txn.open_table(USERS)?;
                Ok(users.len()? as usize)
            }
            Some(_) => Ok(self.list_users(role)?.len()),
        }
    }

    /// Replace a user's password hash.
    pub fn set_password(&self, id: UserId, password_hash: String, now: DateTime<Utc>) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut users = txn.open_table(USERS)?;
            write_password(&mut users, id, password_hash, now)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Replace a user's password hash and drop all of their sessions in one
    /// transaction. Returns how many sessions were removed.
    pub fn reset_password(&self, id: UserId, password_hash: String, now: DateTime<Utc>) -> Result<usize> {
        let txn = self.db.begin_write()?;
        let revoked = {
            let mut users = txn.open_table(USERS)?;
            write_password(&mut users, id, password_hash, now)?;
            let mut sessions = txn.open_table(SESSIONS)?;
            sweep_sessions(&mut sessions, |s| s.is_none_or(|s| s.user == id))?
        };
        txn.commit()?;
        Ok(revoked)
    }

    // =========================================================================
    // LEAVES
    // =========================================================================

    pub fn insert_leave(&self, leave: &LeaveRequest) -> Result<()> {
        let key = leave.id.to_string();
        let bytes = encode_record(leave)?;
        let txn = self.db.begin_write()?;
        {
            let mut leaves = txn.open_table(LEAVES)?;
            leaves.insert(key.as_str(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_leave(&self, id: LeaveId) -> Result<Option<LeaveRequest>> {
        let key = id.to_string();
        let txn = self.db.begin_read()?;
        let leaves = txn.open_table(LEAVES)?;
        leaves
            .get(key.as_str())?
            .map(|guard| decode_record(guard.value()))
            .transpose()
    }

    /// Leaves matching `filter`, in the filter's order.
    pub fn list_leaves(&self, filter: &LeaveFilter) -> Result<Vec<LeaveRequest>> {
        let txn = self.db.begin_read()?;
        let leaves = txn.open_table(LEAVES)?;

        let mut out = Vec::new();
        for entry in leaves.iter()? {
            let (_, value) = entry?;
            let leave: LeaveRequest = decode_record(value.value())?;
            if filter.matches(&leave) {
                out.push(leave);
            }
        }
        filter.apply(&mut out);
        Ok(out)
    }

    /// Record a review decision and return the updated request.
    pub fn review_leave(
        &self,
        id: LeaveId,
        status: LeaveStatus,
        reviewer: &str,
        now: DateTime<Utc>,
    ) -> Result<LeaveRequest> {
        let key = id.to_string();
        let txn = self.db.begin_write()?;
        let leave = {
            let mut leaves = txn.open_table(LEAVES)?;
            let mut leave: LeaveRequest = match leaves.get(key.as_str())? {
                Some(guard) => decode_record(guard.value())?,
                None => return Err(LeaveError::NotFound("Leave")),
            };
            leave.review(status, reviewer, now);
            leaves.insert(key.as_str(), encode_record(&leave)?.as_slice())?;
            leave
        };
        txn.commit()?;
        Ok(leave)
    }

    // =========================================================================
    // CHAT
    // =========================================================================

    /// Append a message, assigning the next sequence number.
    pub fn append_message(&self, draft: ChatDraft) -> Result<ChatMessage> {
        let txn = self.db.begin_write()?;
        let message = {
            let mut chat = txn.open_table(CHAT)?;
            let next = match chat.last()? {
                Some((seq, _)) => seq.value().saturating_add(1),
                None => 1,
            };
            let message = draft.into_message(next);
            chat.insert(next, encode_record(&message)?.as_slice())?;
            message
        };
        txn.commit()?;
        Ok(message)
    }

    /// The newest `limit` messages, oldest first.
    pub fn recent_messages(&self, limit: usize) -> Result<Vec<ChatMessage>> {
        let txn = self.db.begin_read()?;
        let chat = txn.open_table(CHAT)?;

        let mut out = chat
            .iter()?
            .rev()
            .take(limit)
            .map(|entry| {
                let (_, value) = entry?;
                decode_record(value.value())
            })
            .collect::<Result<Vec<ChatMessage>>>()?;
        out.reverse();
        Ok(out)
    }

    // =========================================================================
    // SESSIONS
    // =========================================================================

    pub fn put_session(&self, session: &Session) -> Result<()> {
        let bytes = encode_record(session)?;
        let txn = self.db.begin_write()?;
        {
            let mut sessions = txn.open_table(SESSIONS)?;
            sessions.insert(session.id.as_str(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// A live session by id. Expired sessions are deleted and yield `None`.
    pub fn session(&self, id: &str, now: DateTime<Utc>) -> Result<Option<Session>> {
        let found: Option<Session> = {
            let txn = self.db.begin_read()?;
            let sessions = txn.open_table(SESSIONS)?;
            sessions
                .get(id)?
                .map(|guard| decode_record(guard.value()))
                .transpose()?
        };
        match found {
            Some(session) if session.is_expired(now) => {
                self.delete_session(id)?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Remove a session. Returns whether it existed.
    pub fn delete_session(&self, id: &str) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let existed = {
            let mut sessions = txn.open_table(SESSIONS)?;
            sessions.remove(id)?.is_some()
        };
        txn.commit()?;
        Ok(existed)
    }

    /// Drop every session of `user`, e.g. after a password reset.
    pub fn revoke_user_sessions(&self, user: UserId) -> Result<usize> {
        self.remove_sessions_where(|s| s.is_none_or(|s| s.user == user))
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        self.remove_sessions_where(|s| s.is_none_or(|s| s.is_expired(now)))
    }

    fn remove_sessions_where<F>(&self, doomed: F) -> Result<usize>
    where
        F: Fn(Option<&Session>) -> bool,
    {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut sessions = txn.open_table(SESSIONS)?;
            sweep_sessions(&mut sessions, doomed)?
        };
        txn.commit()?;
        Ok(removed)
    }
}

/// Rewrite the stored user `id` with a new password hash.
fn write_password(
    users: &mut Table<'_, &'static str, &'static [u8]>,
    id: UserId,
    password_hash: String,
    now: DateTime<Utc>,
) -> Result<()> {
    let key = id.to_string();
    let mut user: User = match users.get(key.as_str())? {
        Some(guard) => decode_record(guard.value())?,
        None => return Err(LeaveError::NotFound("User")),
    };
    user.password_hash = password_hash;
    user.updated_at = now;
    users.insert(key.as_str(), encode_record(&user)?.as_slice())?;
    Ok(())
}

/// Remove sessions selected by `doomed`, which sees `None` for rows that no
/// longer decode.
fn sweep_sessions<F>(sessions: &mut Table<'_, &'static str, &'static [u8]>, doomed: F) -> Result<usize>
where
    F: Fn(Option<&Session>) -> bool,
{
    let mut keys = Vec::new();
    for entry in sessions.iter()? {
        let (key, value) = entry?;
        let session = decode_record::<Session>(value.value()).ok();
        if doomed(session.as_ref()) {
            keys.push(key.value().to_owned());
        }
    }
    for key in &keys {
        sessions.remove(key.as_str())?;
    }
    Ok(keys.len())
}

// =============================================================================
// TESTS
// =============================================================================
