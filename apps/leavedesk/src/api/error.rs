//! JSON error responses for the API surface.
//!
//! Every failure is rendered as `{"error": "<message>"}` with a matching
//! status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use leavedesk_core::LeaveError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401: no credentials were presented.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// 403: credentials are invalid or lack the required role.
    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// 409: uniqueness violated.
    #[error("{0}")]
    Conflict(String),

    #[error("Too many requests")]
    TooManyRequests,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True when the caller, not the server, is at fault.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl From<LeaveError> for ApiError {
    fn from(err: LeaveError) -> Self {
        match err {
            LeaveError::DuplicateEmail | LeaveError::DuplicateEmployeeCode => {
                Self::Conflict(err.to_string())
            }
            LeaveError::NotFound(_) => Self::NotFound(err.to_string()),
            LeaveError::Invalid(msg) => Self::BadRequest(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("API error: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
