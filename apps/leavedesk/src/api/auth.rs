//! Authentication for both surfaces.
//!
//! - Pages: `CurrentUser` / `LeadUser` resolve the session cookie and
//!   redirect when it is missing or lacks the role.
//! - API: `ApiUser` validates an HS256 bearer token.
//! - Forms: `csrf_matches` compares the posted token in constant time.
//!
//! bcrypt runs on the blocking pool so a slow hash never stalls the runtime.

use super::{ApiError, SharedState, with_store};
use crate::config::ServerConfig;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use leavedesk_core::{PasswordHasher, Role, Session, User, UserId};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::error;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "leavedesk.sid";

// =============================================================================
// SESSION COOKIE
// =============================================================================

/// The session id carried by the request, if any.
pub fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_owned())
}

/// The session cookie, kept by the browser for as long as the server-side
/// session lives.
pub fn session_cookie(id: String, secure: bool, ttl: chrono::Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// A request carrying a live session.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Session);

impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(id) = session_id(&jar) else {
            return Err(Redirect::to("/login"));
        };
        match with_store(state, move |s| s.session(&id, Utc::now())).await {
            Ok(Some(session)) => Ok(Self(session)),
            Ok(None) => Err(Redirect::to("/login")),
            Err(e) => {
                error!("session lookup failed: {}", e);
                Err(Redirect::to("/login"))
            }
        }
    }
}

/// A request carrying a live session of a lead.
#[derive(Debug, Clone)]
pub struct LeadUser(pub Session);

impl FromRequestParts<SharedState> for LeadUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(session) = CurrentUser::from_request_parts(parts, state).await?;
        if !session.role.is_lead() {
            return Err(Redirect::to("/employee-dashboard"));
        }
        Ok(Self(session))
    }
}

/// Constant-time comparison of a posted form token with the session's.
pub fn csrf_matches(session: &Session, posted: &str) -> bool {
    bool::from(session.csrf_token.as_bytes().ct_eq(posted.as_bytes()))
}

// =============================================================================
// BEARER TOKENS
// =============================================================================

/// JWT claims of an API token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub role: Role,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign a bearer token for `user`.
pub fn issue_token(config: &ServerConfig, user: &User, now: DateTime<Utc>) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role,
        name: user.name.clone(),
        iat: now.timestamp(),
        exp: (now + config.token_ttl).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// Check a bearer token's signature and expiry.
pub fn verify_token(config: &ServerConfig, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Forbidden("Invalid token"))
}

/// The caller of an API route, taken from its bearer token.
#[derive(Debug, Clone)]
pub struct ApiUser {
    pub id: UserId,
    pub role: Role,
    pub name: String,
}

impl FromRequestParts<SharedState> for ApiUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split_once(' '))
            .map(|(_, token)| token.trim())
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthorized("Access token required"))?;

        let claims = verify_token(&state.config, token)?;
        let id = UserId::parse(&claims.sub).map_err(|_| ApiError::Forbidden("Invalid token"))?;
        Ok(Self {
            id,
            role: claims.role,
            name: claims.name,
        })
    }
}

impl ApiUser {
    /// Reject callers that are not leads.
    pub fn require_lead(&self) -> Result<(), ApiError> {
        if self.role.is_lead() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Access denied"))
        }
    }
}

// =============================================================================
// PASSWORDS
// =============================================================================

pub async fn verify_password(hasher: PasswordHasher, password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .unwrap_or(false)
}

pub async fn hash_password(hasher: PasswordHasher, password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(ApiError::from)
}
