//! # HTTP Server
//!
//! axum router serving two surfaces over the same store:
//! - HTML pages authenticated by a server-side session cookie (`pages`)
//! - a JSON API under `/api` authenticated by bearer tokens (`rest`)
//!
//! Both go through the same `AppState` and core operations; only the
//! authentication and response shape differ.

pub mod auth;
pub mod error;
pub mod pages;
pub mod rest;
pub mod views;

use crate::config::{MAX_BODY_BYTES, ServerConfig};
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use leavedesk_core::{PasswordHasher, RedbStore};
use serde_json::{Value, json};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

pub use error::ApiError;

/// Pages carry one inline stylesheet and no scripts.
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; style-src 'self' 'unsafe-inline'; \
     script-src 'none'; object-src 'none'; frame-ancestors 'none'; base-uri 'self'; \
     form-action 'self'";

/// How often expired sessions are swept from the store.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Application state shared across handlers.
pub struct AppState {
    pub store: RedbStore,
    pub config: ServerConfig,
    pub hasher: PasswordHasher,
    /// Login attempts keyed by lowercased email.
    pub login_limiter: DefaultKeyedRateLimiter<String>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: RedbStore, config: ServerConfig) -> Self {
        let per_minute = NonZeroU32::new(config.login_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            store,
            hasher: PasswordHasher::new(config.bcrypt_cost),
            login_limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            config,
        }
    }

    /// Record a login attempt for `email`; false when over the limit.
    pub fn allow_login_attempt(&self, email: &str) -> bool {
        self.login_limiter
            .check_key(&email.trim().to_lowercase())
            .is_ok()
    }

    /// Forget limiter entries whose quota has fully replenished. Returns
    /// how many emails are still tracked.
    pub fn prune_login_limiter(&self) -> usize {
        self.login_limiter.retain_recent();
        self.login_limiter.shrink_to_fit();
        self.login_limiter.len()
    }
}

/// Run a store operation on the blocking pool.
///
/// redb transactions fsync on commit and listings scan whole tables, so they
/// stay off the async worker threads.
pub async fn with_store<T, F>(state: &SharedState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&RedbStore) -> leavedesk_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || op(&state.store))
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))?
        .map_err(ApiError::from)
}

/// Build the full router with middleware.
pub fn router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(pages::routes())
        .nest("/api", rest::routes())
        .route("/health", get(health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors)
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static(CONTENT_SECURITY_POLICY),
                ))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Run the HTTP server until Ctrl-C.
pub async fn serve(state: AppState) -> std::io::Result<()> {
    let state = Arc::new(state);
    let bind = state.config.bind.clone();

    spawn_session_sweeper(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Listening on http://{}", bind);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Hourly housekeeping: expired sessions and idle login-limiter entries.
fn spawn_session_sweeper(state: SharedState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            match with_store(&state, |s| s.purge_expired_sessions(Utc::now())).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "purged expired sessions"),
                Err(e) => warn!("session sweep failed: {}", e),
            }
            let tracked = state.prune_login_limiter();
            debug!(tracked, "pruned login limiter");
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
