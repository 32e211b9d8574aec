//! # User Module
//!
//! Accounts, roles and the public projection of a user.
//!
//! A `User` owns its bcrypt hash, so it is never serialized to clients
//! directly. Anything leaving the process goes through `UserProfile`.

use crate::error::{LeaveError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Stable identifier of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Allocate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the hyphenated form used in URLs and tokens.
    pub fn parse(raw: &str) -> Result<Self> {
        crate::parse_uuid(raw, "user id").map(Self)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

// =============================================================================
// ROLE
// =============================================================================

/// What a user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Applies for leave, sees own requests.
    #[default]
    Employee,
    /// Reviews every request and manages the roster.
    Lead,
}

impl Role {
    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Lead => "lead",
        }
    }

    #[must_use]
    pub fn is_lead(&self) -> bool {
        matches!(self, Self::Lead)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = LeaveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(Self::Employee),
            "lead" => Ok(Self::Lead),
            other => Err(LeaveError::invalid(format!("unknown role '{other}'"))),
        }
    }
}

// =============================================================================
// USER
// =============================================================================

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// Company employee code, e.g. `EMP/014`.
    pub employee_code: String,
    pub phone: Option<String>,
    pub date_of_joining: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a user from validated input and an already computed hash.
    #[must_use]
    pub fn from_new(new: NewUser, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::generate(),
            name: new.name,
            email: new.email,
            password_hash,
            role: new.role,
            employee_code: new.employee_code,
            phone: new.phone,
            date_of_joining: new.date_of_joining,
            created_at: now,
            updated_at: now,
        }
    }

    /// The client-safe view of this account.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            employee_id: self.employee_code.clone(),
            phone: self.phone.clone(),
            date_of_joining: self.date_of_joining,
        }
    }
}

/// Input for creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub employee_code: String,
    pub role: Role,
    pub phone: Option<String>,
    pub date_of_joining: Option<NaiveDate>,
}

impl NewUser {
    /// Trim and validate the raw fields of an account.
    ///
    /// Name, email and employee code are required. Blank optional fields
    /// collapse to `None`.
    pub fn new(
        name: &str,
        email: &str,
        employee_code: &str,
        role: Role,
        phone: Option<&str>,
        date_of_joining: Option<NaiveDate>,
    ) -> Result<Self> {
        let name = required(name, "name")?;
        let email = required(email, "email")?;
        if !email.contains('@') {
            return Err(LeaveError::invalid("email must contain '@'"));
        }
        let employee_code = required(employee_code, "employee id")?;
        let phone = phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_owned);

        Ok(Self {
            name,
            email,
            employee_code,
            role,
            phone,
            date_of_joining,
        })
    }
}

fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LeaveError::invalid(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

/// A user as shown to clients: no password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Serialized as `employeeId` to match the employee code column.
    pub employee_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_joining: Option<NaiveDate>,
}

// =============================================================================
// TESTS
// =============================================================================
