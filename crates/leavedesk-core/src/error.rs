//! # Error Module
//!
//! The single error type shared by every core operation.

use thiserror::Error;

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, LeaveError>;

/// Errors raised by the LeaveDesk core.
#[derive(Debug, Error)]
pub enum LeaveError {
    /// The embedded database failed.
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    /// A record could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),

    /// A stored record carries a format version this build does not know.
    #[error("unsupported record version {0}")]
    RecordVersion(u8),

    /// Another user already owns this email address.
    #[error("Email already exists")]
    DuplicateEmail,

    /// Another user already owns this employee code.
    #[error("Employee ID already exists")]
    DuplicateEmployeeCode,

    /// The referenced record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Caller input failed validation.
    #[error("{0}")]
    Invalid(String),

    /// bcrypt failed to produce a hash.
    #[error("password hashing failed: {0}")]
    Password(#[from] bcrypt::BcryptError),
}

impl LeaveError {
    /// Shorthand for building a validation error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// True for errors caused by the caller rather than the system.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateEmail | Self::DuplicateEmployeeCode | Self::NotFound(_) | Self::Invalid(_)
        )
    }
}

// redb reports each stage (open, transaction, table, storage, commit) with its
// own error type; funnel them all through `redb::Error`.
macro_rules! storage_error_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for LeaveError {
                fn from(err: $ty) -> Self {
                    Self::Storage(err.into())
                }
            }
        )*
    };
}

storage_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);
