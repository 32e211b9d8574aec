//! # Password Module
//!
//! bcrypt hashing for account passwords.

use crate::error::Result;

/// Password given to new employees and after a lead resets an account.
pub const DEFAULT_PASSWORD: &str = "password";

/// bcrypt work factor used unless configured otherwise.
pub const DEFAULT_COST: u32 = 10;

/// Lowest work factor bcrypt accepts.
pub const MIN_COST: u32 = 4;
/// Highest work factor bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// Hashes and verifies passwords at a fixed bcrypt cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher {
    /// Clamp `cost` into bcrypt's accepted range (4..=31).
    #[must_use]
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }

    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Hash of `DEFAULT_PASSWORD`.
    pub fn hash_default(&self) -> Result<String> {
        self.hash(DEFAULT_PASSWORD)
    }

    /// Check `password` against a stored hash. Malformed hashes never match.
    #[must_use]
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}
