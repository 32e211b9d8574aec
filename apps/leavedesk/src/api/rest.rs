//! JSON API under `/api` (bearer-token authenticated).

use super::auth::{ApiUser, issue_token, verify_password};
use super::{ApiError, SharedState, with_store};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use leavedesk_core::{
    ChatDraft, ChatMessage, DEFAULT_CHAT_HISTORY, LeaveError, LeaveFilter, LeaveId, LeaveRequest,
    LeaveStatus, NewLeave, Role, User, UserId, UserProfile,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::{info, warn};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/leaves", get(list_leaves).post(apply_leave))
        .route("/leaves/{id}/status", put(update_status))
        .route("/employees", get(employees))
        .route("/chat", get(chat).post(post_chat))
}

/// Unwrap a JSON body, turning a malformed one into a 400.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The account summary returned next to a fresh token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub employee_id: String,
}

impl From<&User> for LoginUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            employee_id: user.employee_code.clone(),
        }
    }
}

async fn login(
    State(state): State<SharedState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = body(payload)?;
    if !state.allow_login_attempt(&req.email) {
        warn!(email = %req.email, "API login rate limit exceeded");
        return Err(ApiError::TooManyRequests);
    }

    let email = req.email.clone();
    let Some(user) = with_store(&state, move |s| s.find_user_by_email(&email)).await? else {
        warn!(email = %req.email, "API login for unknown email");
        return Err(ApiError::Unauthorized("Invalid credentials"));
    };
    if !verify_password(state.hasher, req.password, user.password_hash.clone()).await {
        warn!(email = %req.email, "API login with wrong password");
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = issue_token(&state.config, &user, Utc::now())?;
    info!(user = %user.id, "API token issued");
    Ok(Json(json!({
        "token": token,
        "user": LoginUser::from(&user),
    })))
}

// =============================================================================
// LEAVES
// =============================================================================

/// Applicant summary embedded in leave listings.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeRef {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaveView {
    #[serde(flatten)]
    pub leave: LeaveRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<EmployeeRef>,
}

async fn list_leaves(
    State(state): State<SharedState>,
    caller: ApiUser,
) -> Result<Json<Vec<LeaveView>>, ApiError> {
    let filter = if caller.role.is_lead() {
        LeaveFilter::all()
    } else {
        LeaveFilter::for_employee(caller.id)
    };
    let (leaves, applicants) = with_store(&state, move |s| {
        let leaves = s.list_leaves(&filter)?;
        let mut applicants: HashMap<UserId, EmployeeRef> = HashMap::new();
        for leave in &leaves {
            if applicants.contains_key(&leave.employee) {
                continue;
            }
            if let Some(user) = s.get_user(leave.employee)? {
                applicants.insert(
                    user.id,
                    EmployeeRef {
                        id: user.id,
                        name: user.name,
                        email: user.email,
                    },
                );
            }
        }
        Ok((leaves, applicants))
    })
    .await?;

    Ok(Json(
        leaves
            .into_iter()
            .map(|leave| LeaveView {
                employee: applicants.get(&leave.employee).cloned(),
                leave,
            })
            .collect(),
    ))
}

async fn apply_leave(
    State(state): State<SharedState>,
    caller: ApiUser,
    payload: Result<Json<NewLeave>, JsonRejection>,
) -> Result<(StatusCode, Json<LeaveRequest>), ApiError> {
    let new = body(payload)?;
    let id = caller.id;
    let leave = with_store(&state, move |s| {
        let applicant = s.get_user(id)?.ok_or(LeaveError::NotFound("User"))?;
        let leave = LeaveRequest::apply(&applicant, new, Utc::now())?;
        s.insert_leave(&leave)?;
        Ok(leave)
    })
    .await?;
    info!(leave = %leave.id, user = %caller.id, "leave applied via API");
    Ok((StatusCode::CREATED, Json(leave)))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

async fn update_status(
    State(state): State<SharedState>,
    caller: ApiUser,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<LeaveRequest>, ApiError> {
    caller.require_lead()?;
    let update = body(payload)?;
    let id = LeaveId::parse(&id).map_err(|_| ApiError::NotFound("Leave not found".to_string()))?;
    let status: LeaveStatus = update.status.parse()?;

    let reviewer = caller.name.clone();
    let leave =
        with_store(&state, move |s| s.review_leave(id, status, &reviewer, Utc::now())).await?;
    info!(leave = %leave.id, status = %leave.status, by = %caller.id, "leave reviewed via API");
    Ok(Json(leave))
}

// =============================================================================
// EMPLOYEES AND CHAT
// =============================================================================

async fn employees(
    State(state): State<SharedState>,
    caller: ApiUser,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    caller.require_lead()?;
    let list = with_store(&state, |s| s.list_users(Some(Role::Employee))).await?;
    Ok(Json(list.iter().map(|u| u.profile()).collect()))
}

async fn chat(
    State(state): State<SharedState>,
    _caller: ApiUser,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = with_store(&state, |s| s.recent_messages(DEFAULT_CHAT_HISTORY)).await?;
    Ok(Json(messages))
}

#[derive(Debug, Deserialize)]
pub struct ChatPost {
    pub message: String,
}

async fn post_chat(
    State(state): State<SharedState>,
    caller: ApiUser,
    payload: Result<Json<ChatPost>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let post = body(payload)?;
    let draft = ChatDraft::new(caller.id, &caller.name, caller.role, &post.message, Utc::now())?;
    let message = with_store(&state, move |s| s.append_message(draft)).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
