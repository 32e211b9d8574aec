//! HTML page routes (session-cookie authenticated).
//!
//! Storage failures on read pages are logged and rendered as an inline notice
//! over an empty list; the user still gets a page.

use super::auth::{
    CurrentUser, LeadUser, clear_session_cookie, csrf_matches, hash_password, session_cookie,
    session_id, verify_password,
};
use super::views::{self, LeaveRow};
use super::{ApiError, SharedState, with_store};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Datelike, NaiveDate, Utc};
use leavedesk_core::{
    CalendarMonth, ChatDraft, DEFAULT_CHAT_HISTORY, DEFAULT_PASSWORD, LeaveError, LeaveFilter,
    LeaveId, LeaveRequest, LeaveStatus, NewLeave, NewUser, Role, Session, User, UserId,
    parse_month,
};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{error, info, warn};

/// Leaves shown on an employee's dashboard.
const EMPLOYEE_DASHBOARD_LIMIT: usize = 50;
/// Leaves shown on the lead dashboard.
const LEAD_DASHBOARD_LIMIT: usize = 100;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/login") }))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
        .route("/employee-dashboard", get(employee_dashboard))
        .route("/apply-leave", get(apply_leave_form).post(apply_leave))
        .route("/change-password", get(change_password_form).post(change_password))
        .route("/lead-dashboard", get(lead_dashboard))
        .route("/employees", get(employees))
        .route("/add-employee", get(add_employee_form).post(add_employee))
        .route("/reset-password/{id}", post(reset_password))
        .route("/update-leave/{id}", post(update_leave))
        .route("/calendar", get(calendar))
        .route("/chat", get(chat).post(post_chat))
}

/// `?error=` notice carried across a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct Notice {
    pub error: Option<String>,
}

/// Redirect to `path` with an `error` notice in the query string.
fn redirect_with_error(path: &str, message: &str) -> Redirect {
    match serde_urlencoded::to_string([("error", message)]) {
        Ok(query) => Redirect::to(&format!("{path}?{query}")),
        Err(_) => Redirect::to(path),
    }
}

fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, views::forbidden()).into_response()
}

fn parse_form_date(raw: &str, field: &str) -> Result<NaiveDate, LeaveError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| LeaveError::invalid(format!("{field} must be a date (YYYY-MM-DD)")))
}

// =============================================================================
// LOGIN / LOGOUT
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

async fn login_form() -> Html<String> {
    views::login(None)
}

async fn login(State(state): State<SharedState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    if !state.allow_login_attempt(&form.email) {
        warn!(email = %form.email, "login rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            views::login(Some("Too many login attempts. Try again in a minute.")),
        )
            .into_response();
    }

    let email = form.email.clone();
    let user = match with_store(&state, move |s| s.find_user_by_email(&email)).await {
        Ok(user) => user,
        Err(e) => {
            error!("Login error: {}", e);
            return views::login(Some("Login failed. Please try again.")).into_response();
        }
    };
    let Some(user) = user else {
        warn!(email = %form.email, "login for unknown email");
        return views::login(Some("Invalid credentials")).into_response();
    };
    if !verify_password(state.hasher, form.password, user.password_hash.clone()).await {
        warn!(email = %form.email, "login with wrong password");
        return views::login(Some("Invalid credentials")).into_response();
    }

    // Never reuse a session id that existed before authentication.
    let previous = session_id(&jar);
    let session = Session::issue(&user, Utc::now(), state.config.session_ttl);
    let fresh = session.clone();
    let stored = with_store(&state, move |s| {
        if let Some(old) = previous {
            s.delete_session(&old)?;
        }
        s.put_session(&fresh)
    })
    .await;
    if let Err(e) = stored {
        error!("Login error: {}", e);
        return views::login(Some("Login failed. Please try again.")).into_response();
    }
    info!(user = %user.id, role = %user.role, "login");

    let jar = jar.add(session_cookie(
        session.id,
        state.config.secure_cookies,
        state.config.session_ttl,
    ));
    let target = if user.role.is_lead() {
        "/lead-dashboard"
    } else {
        "/employee-dashboard"
    };
    (jar, Redirect::to(target)).into_response()
}

async fn logout(State(state): State<SharedState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(id) = session_id(&jar) {
        if let Err(e) = with_store(&state, move |s| s.delete_session(&id)).await {
            warn!("failed to delete session on logout: {}", e);
        }
    }
    (clear_session_cookie(jar), Redirect::to("/"))
}

// =============================================================================
// EMPLOYEE PAGES
// =============================================================================

async fn employee_dashboard(
    State(state): State<SharedState>,
    CurrentUser(session): CurrentUser,
    Query(notice): Query<Notice>,
) -> Html<String> {
    let filter = LeaveFilter::for_employee(session.user).limit(EMPLOYEE_DASHBOARD_LIMIT);
    match with_store(&state, move |s| s.list_leaves(&filter)).await {
        Ok(leaves) => views::employee_dashboard(&session, &leaves, notice.error.as_deref()),
        Err(e) => {
            error!("Employee dashboard error: {}", e);
            views::employee_dashboard(&session, &[], Some("Failed to load dashboard data"))
        }
    }
}

async fn apply_leave_form(CurrentUser(session): CurrentUser) -> Html<String> {
    views::apply_leave(&session)
}

#[derive(Debug, Deserialize)]
pub struct ApplyLeaveForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    pub reason: String,
}

async fn apply_leave(
    State(state): State<SharedState>,
    CurrentUser(session): CurrentUser,
    Form(form): Form<ApplyLeaveForm>,
) -> Response {
    if !csrf_matches(&session, &form.csrf) {
        return forbidden();
    }
    match file_leave(&state, &session, form).await {
        Ok(leave) => {
            info!(leave = %leave.id, user = %session.user, "leave applied");
            Redirect::to("/employee-dashboard").into_response()
        }
        Err(e) => {
            if !e.is_client_error() {
                error!("Apply leave error: {}", e);
            }
            redirect_with_error("/employee-dashboard", &format!("Failed to apply leave: {e}"))
                .into_response()
        }
    }
}

async fn file_leave(
    state: &SharedState,
    session: &Session,
    form: ApplyLeaveForm,
) -> Result<LeaveRequest, ApiError> {
    let new = NewLeave {
        start_date: parse_form_date(&form.start_date, "start date")?,
        end_date: parse_form_date(&form.end_date, "end date")?,
        reason: form.reason,
    };
    let applicant = session.user;
    with_store(state, move |s| {
        let user = s.get_user(applicant)?.ok_or(LeaveError::NotFound("User"))?;
        let leave = LeaveRequest::apply(&user, new, Utc::now())?;
        s.insert_leave(&leave)?;
        Ok(leave)
    })
    .await
}

async fn change_password_form(CurrentUser(session): CurrentUser) -> Html<String> {
    views::change_password(&session, None, None)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

async fn change_password(
    State(state): State<SharedState>,
    CurrentUser(session): CurrentUser,
    Form(form): Form<ChangePasswordForm>,
) -> Response {
    if !csrf_matches(&session, &form.csrf) {
        return forbidden();
    }
    let page = |error: Option<&str>, success: Option<&str>| {
        views::change_password(&session, error, success).into_response()
    };

    if form.new_password != form.confirm_password {
        return page(Some("New passwords do not match"), None);
    }
    if form.new_password.is_empty() {
        return page(Some("New password is required"), None);
    }

    let id = session.user;
    let user = match with_store(&state, move |s| s.get_user(id)).await {
        Ok(Some(user)) => user,
        Ok(None) => return page(Some("Account no longer exists"), None),
        Err(e) => {
            error!("Change password error: {}", e);
            return page(Some("Failed to change password. Please try again."), None);
        }
    };
    if !verify_password(state.hasher, form.current_password, user.password_hash).await {
        return page(Some("Current password is incorrect"), None);
    }

    let stored = match hash_password(state.hasher, form.new_password).await {
        Ok(hash) => with_store(&state, move |s| s.set_password(id, hash, Utc::now())).await,
        Err(e) => Err(e),
    };
    match stored {
        Ok(()) => {
            info!(user = %id, "password changed");
            page(None, Some("Password changed successfully!"))
        }
        Err(e) => {
            error!("Change password error: {}", e);
            page(Some("Failed to change password. Please try again."), None)
        }
    }
}

// =============================================================================
// LEAD PAGES
// =============================================================================

async fn lead_dashboard(
    State(state): State<SharedState>,
    LeadUser(session): LeadUser,
    Query(notice): Query<Notice>,
) -> Html<String> {
    let loaded = with_store(&state, |s| {
        let leaves = s.list_leaves(&LeaveFilter::all().limit(LEAD_DASHBOARD_LIMIT))?;
        // Applicant emails keyed by user id.
        let emails: HashMap<UserId, String> = s
            .list_users(None)?
            .into_iter()
            .map(|u| (u.id, u.email))
            .collect();
        Ok((leaves, emails))
    })
    .await;
    match loaded {
        Ok((leaves, emails)) => {
            let rows: Vec<LeaveRow> = leaves
                .into_iter()
                .map(|leave| LeaveRow {
                    email: emails.get(&leave.employee).cloned(),
                    leave,
                })
                .collect();
            views::lead_dashboard(&session, &rows, notice.error.as_deref())
        }
        Err(e) => {
            error!("Lead dashboard error: {}", e);
            views::lead_dashboard(&session, &[], Some("Failed to load dashboard data"))
        }
    }
}

async fn employees(
    State(state): State<SharedState>,
    LeadUser(session): LeadUser,
    Query(notice): Query<Notice>,
) -> Html<String> {
    match with_store(&state, |s| s.list_users(Some(Role::Employee))).await {
        Ok(list) => views::employees(&session, &list, notice.error.as_deref()),
        Err(e) => {
            error!("Employees list error: {}", e);
            views::employees(&session, &[], Some("Failed to load employees"))
        }
    }
}

async fn add_employee_form(LeadUser(session): LeadUser) -> Html<String> {
    views::add_employee(&session, None, None)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEmployeeForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    pub name: String,
    pub email: String,
    pub employee_id: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date_of_joining: String,
}

async fn add_employee(
    State(state): State<SharedState>,
    LeadUser(session): LeadUser,
    Form(form): Form<AddEmployeeForm>,
) -> Response {
    if !csrf_matches(&session, &form.csrf) {
        return forbidden();
    }

    let joined = if form.date_of_joining.trim().is_empty() {
        None
    } else {
        match parse_form_date(&form.date_of_joining, "date of joining") {
            Ok(date) => Some(date),
            Err(e) => {
                return views::add_employee(&session, Some(&e.to_string()), None).into_response();
            }
        }
    };
    let new = match NewUser::new(
        &form.name,
        &form.email,
        &form.employee_id,
        Role::Employee,
        Some(form.phone.as_str()),
        joined,
    ) {
        Ok(new) => new,
        Err(e) => return views::add_employee(&session, Some(&e.to_string()), None).into_response(),
    };

    let created = match hash_password(state.hasher, DEFAULT_PASSWORD.to_string()).await {
        Ok(hash) => {
            let user = User::from_new(new, hash, Utc::now());
            with_store(&state, move |s| s.insert_user(&user).map(|()| user)).await
        }
        Err(e) => Err(e),
    };

    match created {
        Ok(user) => {
            info!(user = %user.id, code = %user.employee_code, "employee added");
            views::add_employee(
                &session,
                None,
                Some("Employee added successfully! Default password: password"),
            )
            .into_response()
        }
        Err(ApiError::Conflict(msg)) => views::add_employee(&session, Some(&msg), None).into_response(),
        Err(e) => {
            error!("Add employee error: {}", e);
            views::add_employee(&session, Some("Failed to add employee. Please try again."), None)
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CsrfForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

async fn reset_password(
    State(state): State<SharedState>,
    LeadUser(session): LeadUser,
    Path(id): Path<String>,
    Form(form): Form<CsrfForm>,
) -> Response {
    if !csrf_matches(&session, &form.csrf) {
        return forbidden();
    }
    let Ok(id) = UserId::parse(&id) else {
        return redirect_with_error("/employees", "Employee not found").into_response();
    };

    let result = match hash_password(state.hasher, DEFAULT_PASSWORD.to_string()).await {
        Ok(hash) => with_store(&state, move |s| s.reset_password(id, hash, Utc::now())).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(revoked) => {
            info!(user = %id, revoked, by = %session.user, "password reset");
            Redirect::to("/employees").into_response()
        }
        Err(ApiError::NotFound(_)) => {
            redirect_with_error("/employees", "Employee not found").into_response()
        }
        Err(e) => {
            error!("Reset password error: {}", e);
            redirect_with_error("/employees", "Failed to reset password").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateLeaveForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    pub status: String,
}

async fn update_leave(
    State(state): State<SharedState>,
    LeadUser(session): LeadUser,
    Path(id): Path<String>,
    Form(form): Form<UpdateLeaveForm>,
) -> Response {
    if !csrf_matches(&session, &form.csrf) {
        return forbidden();
    }
    let reviewer = session.user_name.clone();
    let result = match LeaveId::parse(&id)
        .map_err(|_| LeaveError::NotFound("Leave"))
        .and_then(|id| Ok((id, form.status.parse::<LeaveStatus>()?)))
    {
        Ok((id, status)) => {
            with_store(&state, move |s| s.review_leave(id, status, &reviewer, Utc::now())).await
        }
        Err(e) => Err(ApiError::from(e)),
    };
    match result {
        Ok(leave) => {
            info!(leave = %leave.id, status = %leave.status, by = %session.user, "leave reviewed");
            Redirect::to("/lead-dashboard").into_response()
        }
        Err(e) => {
            if !e.is_client_error() {
                error!("Update leave error: {}", e);
            }
            redirect_with_error("/lead-dashboard", &format!("Failed to update leave: {e}"))
                .into_response()
        }
    }
}

// =============================================================================
// CALENDAR AND CHAT
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<String>,
}

async fn calendar(
    State(state): State<SharedState>,
    CurrentUser(session): CurrentUser,
    Query(query): Query<CalendarQuery>,
) -> Html<String> {
    let today = Utc::now().date_naive();
    let (year, month) = query
        .month
        .as_deref()
        .and_then(|m| parse_month(m).ok())
        .unwrap_or((today.year(), today.month()));

    let (approved, error) =
        match with_store(&state, |s| s.list_leaves(&LeaveFilter::approved_by_start())).await {
            Ok(leaves) => (leaves, None),
            Err(e) => {
                error!("Calendar error: {}", e);
                (Vec::new(), Some("Failed to load calendar data"))
            }
        };
    match CalendarMonth::build(year, month, &approved) {
        Ok(grid) => views::calendar(&session, &grid, &approved, error),
        Err(e) => {
            error!("Calendar error: {}", e);
            views::employee_dashboard(&session, &[], Some("Failed to load calendar data"))
        }
    }
}

async fn chat(
    State(state): State<SharedState>,
    CurrentUser(session): CurrentUser,
    Query(notice): Query<Notice>,
) -> Html<String> {
    match with_store(&state, |s| s.recent_messages(DEFAULT_CHAT_HISTORY)).await {
        Ok(messages) => views::chat(&session, &messages, notice.error.as_deref()),
        Err(e) => {
            error!("Chat error: {}", e);
            views::chat(&session, &[], Some("Failed to load chat messages"))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    pub message: String,
}

async fn post_chat(
    State(state): State<SharedState>,
    CurrentUser(session): CurrentUser,
    Form(form): Form<ChatForm>,
) -> Response {
    if !csrf_matches(&session, &form.csrf) {
        return forbidden();
    }
    let posted = match ChatDraft::new(
        session.user,
        &session.user_name,
        session.role,
        &form.message,
        Utc::now(),
    ) {
        Ok(draft) => with_store(&state, move |s| s.append_message(draft)).await,
        Err(e) => Err(ApiError::from(e)),
    };
    match posted {
        Ok(_) => Redirect::to("/chat").into_response(),
        Err(e) => {
            if !e.is_client_error() {
                error!("Chat post error: {}", e);
            }
            redirect_with_error("/chat", &e.to_string()).into_response()
        }
    }
}
