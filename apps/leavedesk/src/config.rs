//! Server configuration.
//!
//! Values come from the `serve` command line (with environment fallbacks,
//! see `cli::ServeArgs`); `Default` gives a local development setup.

use chrono::Duration;
use leavedesk_core::{DEFAULT_COST, DEFAULT_SESSION_TTL_HOURS};

/// Signing key used when `JWT_SECRET` is not provided. Development only.
pub const DEV_JWT_SECRET: &str = "leavedesk-dev-secret";

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Lifetime of an API bearer token.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind: String,
    /// HS256 key for API bearer tokens.
    pub jwt_secret: String,
    /// Origins allowed to call the server cross-site with credentials.
    pub allowed_origins: Vec<String>,
    /// Mark the session cookie `Secure` (behind HTTPS).
    pub secure_cookies: bool,
    pub bcrypt_cost: u32,
    /// Login attempts allowed per email per minute.
    pub login_per_minute: u32,
    pub session_ttl: Duration,
    pub token_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            secure_cookies: false,
            bcrypt_cost: DEFAULT_COST,
            login_per_minute: 10,
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            token_ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }
}
