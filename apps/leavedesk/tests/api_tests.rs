//! Integration tests for the HTTP surfaces (HTML pages and JSON API).
//!
//! Uses axum-test against an in-memory store.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use axum_test::{TestResponse, TestServer};
use chrono::{NaiveDate, Utc};
use leavedesk::api::auth::SESSION_COOKIE;
use leavedesk::api::{AppState, SharedState, router};
use leavedesk::config::ServerConfig;
use leavedesk_core::{
    LeaveFilter, LeaveRequest, LeaveStatus, NewLeave, NewUser, PasswordHasher, RedbStore, Role,
    User,
};
use serde_json::{Value, json};
use std::sync::Arc;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

const LEAD_EMAIL: &str = "lead@example.com";
const EMPLOYEE_EMAIL: &str = "asha@example.com";
const PASSWORD: &str = "password";

fn test_config() -> ServerConfig {
    ServerConfig {
        bcrypt_cost: 4,
        ..ServerConfig::default()
    }
}

fn add_user(state: &SharedState, name: &str, email: &str, code: &str, role: Role) -> User {
    let hash = PasswordHasher::new(4).hash(PASSWORD).unwrap();
    let new = NewUser::new(name, email, code, role, None, None).unwrap();
    let user = User::from_new(new, hash, Utc::now());
    state.store.insert_user(&user).unwrap();
    user
}

/// A server with one lead ("Rhea Lead") and one employee ("Asha Menon").
fn setup_with(config: ServerConfig) -> (TestServer, SharedState) {
    let state = Arc::new(AppState::new(RedbStore::in_memory().unwrap(), config));
    add_user(&state, "Rhea Lead", LEAD_EMAIL, "LEAD/1", Role::Lead);
    add_user(&state, "Asha Menon", EMPLOYEE_EMAIL, "EMP/101", Role::Employee);
    let server = TestServer::new(router(Arc::clone(&state))).unwrap();
    (server, state)
}

fn setup() -> (TestServer, SharedState) {
    setup_with(test_config())
}

fn location(response: &TestResponse) -> String {
    response.header("location").to_str().unwrap().to_string()
}

/// Log in through the form and return the session cookie.
async fn login(server: &TestServer, email: &str, password: &str) -> Cookie<'static> {
    let response = server
        .post("/login")
        .form(&[("email", email), ("password", password)])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    response.cookie(SESSION_COOKIE)
}

/// Fetch a page and pull the CSRF token out of its form.
async fn csrf_token(server: &TestServer, cookie: &Cookie<'static>, path: &str) -> String {
    let html = server.get(path).add_cookie(cookie.clone()).await.text();
    let start = html
        .find("name=\"_csrf\" value=\"")
        .map(|i| i + "name=\"_csrf\" value=\"".len())
        .unwrap_or_else(|| panic!("no csrf field on {path}"));
    let end = html[start..].find('"').unwrap() + start;
    html[start..end].to_string()
}

async fn api_token(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

fn file_leave(state: &SharedState, email: &str, start: (i32, u32, u32), end: (i32, u32, u32)) -> LeaveRequest {
    let user = state.store.find_user_by_email(email).unwrap().unwrap();
    let new = NewLeave {
        start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
        end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        reason: "Family trip".to_string(),
    };
    let leave = LeaveRequest::apply(&user, new, Utc::now()).unwrap();
    state.store.insert_leave(&leave).unwrap();
    leave
}

// =============================================================================
// LOGIN AND NAVIGATION
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (server, _) = setup();
    let body: Value = server.get("/health").await.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_root_and_protected_pages_redirect_to_login() {
    let (server, _) = setup();

    let root = server.get("/").await;
    assert_eq!(location(&root), "/login");

    for path in ["/employee-dashboard", "/lead-dashboard", "/calendar", "/chat"] {
        let response = server.get(path).await;
        assert_eq!(location(&response), "/login", "{path}");
    }
}

#[tokio::test]
async fn test_login_redirects_by_role() {
    let (server, _) = setup();

    let response = server
        .post("/login")
        .form(&[("email", EMPLOYEE_EMAIL), ("password", PASSWORD)])
        .await;
    assert_eq!(location(&response), "/employee-dashboard");
    let cookie = response.cookie(SESSION_COOKIE);
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));

    let dashboard = server.get("/employee-dashboard").add_cookie(cookie).await;
    dashboard.assert_status_ok();
    assert!(dashboard.text().contains("Asha Menon"));

    let response = server
        .post("/login")
        .form(&[("email", "LEAD@example.com"), ("password", PASSWORD)])
        .await;
    assert_eq!(location(&response), "/lead-dashboard");
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let (server, _) = setup();

    for path in ["/login", "/health", "/api/leaves"] {
        let response = server.get(path).await;
        assert_eq!(response.header("x-frame-options"), "DENY", "{path}");
        assert_eq!(response.header("x-content-type-options"), "nosniff", "{path}");
        assert_eq!(response.header("referrer-policy"), "no-referrer", "{path}");
        let csp = response.header("content-security-policy");
        let csp = csp.to_str().unwrap();
        assert!(csp.contains("frame-ancestors 'none'"), "{path}: {csp}");
        assert!(csp.contains("script-src 'none'"), "{path}: {csp}");
    }
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let (server, _) = setup();

    for (email, password) in [(EMPLOYEE_EMAIL, "wrong"), ("nobody@example.com", PASSWORD)] {
        let response = server
            .post("/login")
            .form(&[("email", email), ("password", password)])
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("Invalid credentials"));
        assert!(response.maybe_cookie(SESSION_COOKIE).is_none());
    }
}

#[tokio::test]
async fn test_login_rate_limited_per_email() {
    let (server, _) = setup_with(ServerConfig {
        login_per_minute: 2,
        ..test_config()
    });

    for _ in 0..2 {
        server
            .post("/login")
            .form(&[("email", EMPLOYEE_EMAIL), ("password", "wrong")])
            .await
            .assert_status_ok();
    }
    let blocked = server
        .post("/login")
        .form(&[("email", EMPLOYEE_EMAIL), ("password", PASSWORD)])
        .await;
    blocked.assert_status(StatusCode::TOO_MANY_REQUESTS);

    // Another account is unaffected.
    login(&server, LEAD_EMAIL, PASSWORD).await;
}

#[tokio::test]
async fn test_employee_cannot_open_lead_pages() {
    let (server, _) = setup();
    let cookie = login(&server, EMPLOYEE_EMAIL, PASSWORD).await;

    for path in ["/lead-dashboard", "/employees", "/add-employee"] {
        let response = server.get(path).add_cookie(cookie.clone()).await;
        assert_eq!(location(&response), "/employee-dashboard", "{path}");
    }
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (server, _) = setup();
    let cookie = login(&server, EMPLOYEE_EMAIL, PASSWORD).await;

    let response = server.get("/logout").add_cookie(cookie.clone()).await;
    assert_eq!(location(&response), "/");

    let after = server.get("/employee-dashboard").add_cookie(cookie).await;
    assert_eq!(location(&after), "/login");
}

// =============================================================================
// LEAVE WORKFLOW
// =============================================================================

#[tokio::test]
async fn test_apply_leave_through_form() {
    let (server, state) = setup();
    let cookie = login(&server, EMPLOYEE_EMAIL, PASSWORD).await;
    let csrf = csrf_token(&server, &cookie, "/apply-leave").await;

    let response = server
        .post("/apply-leave")
        .add_cookie(cookie.clone())
        .form(&[
            ("_csrf", csrf.as_str()),
            ("startDate", "2030-03-10"),
            ("endDate", "2030-03-12"),
            ("reason", "Family trip"),
        ])
        .await;
    assert_eq!(location(&response), "/employee-dashboard");

    let leaves = state.store.list_leaves(&LeaveFilter::all()).unwrap();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].status, LeaveStatus::Pending);
    assert_eq!(leaves[0].employee_name, "Asha Menon");
    assert_eq!(leaves[0].days(), 3);

    let dashboard = server.get("/employee-dashboard").add_cookie(cookie).await;
    assert!(dashboard.text().contains("Family trip"));
}

#[tokio::test]
async fn test_apply_leave_rejects_bad_input() {
    let (server, state) = setup();
    let cookie = login(&server, EMPLOYEE_EMAIL, PASSWORD).await;
    let csrf = csrf_token(&server, &cookie, "/apply-leave").await;

    let response = server
        .post("/apply-leave")
        .add_cookie(cookie.clone())
        .form(&[
            ("_csrf", csrf.as_str()),
            ("startDate", "2030-03-12"),
            ("endDate", "2030-03-10"),
            ("reason", "Backwards"),
        ])
        .await;
    let target = location(&response);
    assert!(target.starts_with("/employee-dashboard?error="), "{target}");

    let page = server.get(&target).add_cookie(cookie).await;
    assert!(page.text().contains("Failed to apply leave"));
    assert!(state.store.list_leaves(&LeaveFilter::all()).unwrap().is_empty());
}

#[tokio::test]
async fn test_form_without_valid_csrf_is_forbidden() {
    let (server, state) = setup();
    let cookie = login(&server, EMPLOYEE_EMAIL, PASSWORD).await;

    let response = server
        .post("/apply-leave")
        .add_cookie(cookie.clone())
        .form(&[
            ("_csrf", "forged"),
            ("startDate", "2030-03-10"),
            ("endDate", "2030-03-12"),
            ("reason", "Family trip"),
        ])
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let missing = server
        .post("/apply-leave")
        .add_cookie(cookie.clone())
        .form(&[
            ("startDate", "2030-03-10"),
            ("endDate", "2030-03-12"),
            ("reason", "Family trip"),
        ])
        .await;
    missing.assert_status(StatusCode::FORBIDDEN);

    let chat = server
        .post("/chat")
        .add_cookie(cookie)
        .form(&[("message", "hello")])
        .await;
    chat.assert_status(StatusCode::FORBIDDEN);

    assert!(state.store.list_leaves(&LeaveFilter::all()).unwrap().is_empty());
    assert!(state.store.recent_messages(10).unwrap().is_empty());
}

#[tokio::test]
async fn test_lead_reviews_leave_and_calendar_shows_it() {
    let (server, state) = setup();
    let leave = file_leave(&state, EMPLOYEE_EMAIL, (2030, 3, 10), (2030, 3, 12));
    let cookie = login(&server, LEAD_EMAIL, PASSWORD).await;

    let dashboard = server.get("/lead-dashboard").add_cookie(cookie.clone()).await;
    let html = dashboard.text();
    assert!(html.contains("Asha Menon"));
    assert!(html.contains(EMPLOYEE_EMAIL));

    let csrf = csrf_token(&server, &cookie, "/lead-dashboard").await;
    let response = server
        .post(&format!("/update-leave/{}", leave.id))
        .add_cookie(cookie.clone())
        .form(&[("_csrf", csrf.as_str()), ("status", "approved")])
        .await;
    assert_eq!(location(&response), "/lead-dashboard");

    let stored = state.store.get_leave(leave.id).unwrap().unwrap();
    assert_eq!(stored.status, LeaveStatus::Approved);
    assert_eq!(stored.reviewed_by.as_deref(), Some("Rhea Lead"));

    let calendar = server
        .get("/calendar")
        .add_query_param("month", "2030-03")
        .add_cookie(cookie)
        .await;
    let html = calendar.text();
    assert!(html.contains("2030-03"));
    assert!(html.contains("Asha Menon"));
}

#[tokio::test]
async fn test_update_leave_with_unknown_id_or_status() {
    let (server, state) = setup();
    let leave = file_leave(&state, EMPLOYEE_EMAIL, (2030, 3, 10), (2030, 3, 12));
    let cookie = login(&server, LEAD_EMAIL, PASSWORD).await;
    let csrf = csrf_token(&server, &cookie, "/lead-dashboard").await;

    let response = server
        .post("/update-leave/not-a-leave")
        .add_cookie(cookie.clone())
        .form(&[("_csrf", csrf.as_str()), ("status", "approved")])
        .await;
    assert!(location(&response).starts_with("/lead-dashboard?error="));

    let response = server
        .post(&format!("/update-leave/{}", leave.id))
        .add_cookie(cookie)
        .form(&[("_csrf", csrf.as_str()), ("status", "maybe")])
        .await;
    assert!(location(&response).starts_with("/lead-dashboard?error="));
    assert_eq!(
        state.store.get_leave(leave.id).unwrap().unwrap().status,
        LeaveStatus::Pending
    );
}

// =============================================================================
// ACCOUNTS
// =============================================================================

#[tokio::test]
async fn test_change_password_flow() {
    let (server, _) = setup();
    let cookie = login(&server, EMPLOYEE_EMAIL, PASSWORD).await;
    let csrf = csrf_token(&server, &cookie, "/change-password").await;

    let post = |current: &'static str, new: &'static str, confirm: &'static str| {
        server
            .post("/change-password")
            .add_cookie(cookie.clone())
            .form(&[
                ("_csrf", csrf.clone()),
                ("currentPassword", current.to_string()),
                ("newPassword", new.to_string()),
                ("confirmPassword", confirm.to_string()),
            ])
    };

    let mismatch = post(PASSWORD, "new-secret", "other").await;
    assert!(mismatch.text().contains("New passwords do not match"));

    let wrong = post("wrong", "new-secret", "new-secret").await;
    assert!(wrong.text().contains("Current password is incorrect"));

    let ok = post(PASSWORD, "new-secret", "new-secret").await;
    assert!(ok.text().contains("Password changed successfully!"));

    login(&server, EMPLOYEE_EMAIL, "new-secret").await;
}

#[tokio::test]
async fn test_add_employee_and_duplicate() {
    let (server, state) = setup();
    let cookie = login(&server, LEAD_EMAIL, PASSWORD).await;
    let csrf = csrf_token(&server, &cookie, "/add-employee").await;

    let form = |email: &'static str, code: &'static str| {
        vec![
            ("_csrf", csrf.clone()),
            ("name", "Tomas Ek".to_string()),
            ("email", email.to_string()),
            ("employeeId", code.to_string()),
            ("phone", "555-0102".to_string()),
            ("dateOfJoining", "2025-02-20".to_string()),
        ]
    };

    let created = server
        .post("/add-employee")
        .add_cookie(cookie.clone())
        .form(&form("tomas@example.com", "EMP/102"))
        .await;
    assert!(created.text().contains("Employee added successfully! Default password: password"));

    let user = state
        .store
        .find_user_by_email("tomas@example.com")
        .unwrap()
        .unwrap();
    assert_eq!(user.role, Role::Employee);
    assert_eq!(user.date_of_joining, NaiveDate::from_ymd_opt(2025, 2, 20));

    let duplicate = server
        .post("/add-employee")
        .add_cookie(cookie.clone())
        .form(&form("TOMAS@example.com", "EMP/103"))
        .await;
    assert!(duplicate.text().contains("Email already exists"));

    let listing = server.get("/employees").add_cookie(cookie).await;
    assert!(listing.text().contains("EMP/102"));

    login(&server, "tomas@example.com", PASSWORD).await;
}

#[tokio::test]
async fn test_reset_password_signs_user_out() {
    let (server, state) = setup();
    let employee = state.store.find_user_by_email(EMPLOYEE_EMAIL).unwrap().unwrap();

    // Employee moves off the default password and keeps a session open.
    let employee_cookie = login(&server, EMPLOYEE_EMAIL, PASSWORD).await;
    let hash = PasswordHasher::new(4).hash("custom").unwrap();
    state.store.set_password(employee.id, hash, Utc::now()).unwrap();

    let lead_cookie = login(&server, LEAD_EMAIL, PASSWORD).await;
    let csrf = csrf_token(&server, &lead_cookie, "/employees").await;
    let response = server
        .post(&format!("/reset-password/{}", employee.id))
        .add_cookie(lead_cookie)
        .form(&[("_csrf", csrf.as_str())])
        .await;
    assert_eq!(location(&response), "/employees");

    let stale = server.get("/employee-dashboard").add_cookie(employee_cookie).await;
    assert_eq!(location(&stale), "/login");
    login(&server, EMPLOYEE_EMAIL, PASSWORD).await;
}

// =============================================================================
// CHAT
// =============================================================================

#[tokio::test]
async fn test_chat_post_and_view() {
    let (server, _) = setup();
    let cookie = login(&server, EMPLOYEE_EMAIL, PASSWORD).await;
    let csrf = csrf_token(&server, &cookie, "/chat").await;

    let response = server
        .post("/chat")
        .add_cookie(cookie.clone())
        .form(&[("_csrf", csrf.as_str()), ("message", "Out Friday <b>afternoon</b>")])
        .await;
    assert_eq!(location(&response), "/chat");

    let lead = login(&server, LEAD_EMAIL, PASSWORD).await;
    let html = server.get("/chat").add_cookie(lead).await.text();
    assert!(html.contains("Asha Menon"));
    assert!(html.contains("Out Friday &lt;b&gt;afternoon&lt;/b&gt;"));

    let empty = server
        .post("/chat")
        .add_cookie(cookie)
        .form(&[("_csrf", csrf.as_str()), ("message", "   ")])
        .await;
    assert!(location(&empty).starts_with("/chat?error="));
}

// =============================================================================
// JSON API
// =============================================================================

#[tokio::test]
async fn test_api_requires_token() {
    let (server, _) = setup();

    let missing = server.get("/api/leaves").await;
    missing.assert_status(StatusCode::UNAUTHORIZED);
    missing.assert_json(&json!({ "error": "Access token required" }));

    let bad = server.get("/api/leaves").authorization_bearer("garbage").await;
    bad.assert_status(StatusCode::FORBIDDEN);
    bad.assert_json(&json!({ "error": "Invalid token" }));
}

#[tokio::test]
async fn test_api_login() {
    let (server, state) = setup();

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": EMPLOYEE_EMAIL, "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["employeeId"], "EMP/101");
    assert_eq!(body["user"]["role"], "employee");
    assert!(body["user"].get("passwordHash").is_none());

    // Contact details stay out of the login payload even when on file.
    let hash = PasswordHasher::new(4).hash(PASSWORD).unwrap();
    let new = NewUser::new(
        "Tomas Ek",
        "tomas@example.com",
        "EMP/102",
        Role::Employee,
        Some("555-0102"),
        NaiveDate::from_ymd_opt(2024, 1, 15),
    )
    .unwrap();
    state
        .store
        .insert_user(&User::from_new(new, hash, Utc::now()))
        .unwrap();
    let body: Value = server
        .post("/api/auth/login")
        .json(&json!({ "email": "tomas@example.com", "password": PASSWORD }))
        .await
        .json();
    let mut keys: Vec<&str> = body["user"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(keys, ["email", "employeeId", "id", "name", "role"]);

    let wrong = server
        .post("/api/auth/login")
        .json(&json!({ "email": EMPLOYEE_EMAIL, "password": "nope" }))
        .await;
    wrong.assert_status(StatusCode::UNAUTHORIZED);
    wrong.assert_json(&json!({ "error": "Invalid credentials" }));
}

#[tokio::test]
async fn test_api_leave_lifecycle() {
    let (server, state) = setup();
    file_leave(&state, LEAD_EMAIL, (2030, 5, 1), (2030, 5, 2));
    let employee = api_token(&server, EMPLOYEE_EMAIL).await;
    let lead = api_token(&server, LEAD_EMAIL).await;

    let created = server
        .post("/api/leaves")
        .authorization_bearer(&employee)
        .json(&json!({ "startDate": "2030-04-01", "endDate": "2030-04-03", "reason": "Moving" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let leave: Value = created.json();
    assert_eq!(leave["status"], "pending");
    let id = leave["id"].as_str().unwrap().to_string();

    let own: Vec<Value> = server
        .get("/api/leaves")
        .authorization_bearer(&employee)
        .await
        .json();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0]["employee"]["email"], EMPLOYEE_EMAIL);
    assert_eq!(own[0]["employee"]["name"], "Asha Menon");

    let all: Vec<Value> = server.get("/api/leaves").authorization_bearer(&lead).await.json();
    assert_eq!(all.len(), 2);

    let denied = server
        .put(&format!("/api/leaves/{id}/status"))
        .authorization_bearer(&employee)
        .json(&json!({ "status": "approved" }))
        .await;
    denied.assert_status(StatusCode::FORBIDDEN);
    denied.assert_json(&json!({ "error": "Access denied" }));

    let bad_status = server
        .put(&format!("/api/leaves/{id}/status"))
        .authorization_bearer(&lead)
        .json(&json!({ "status": "maybe" }))
        .await;
    bad_status.assert_status(StatusCode::BAD_REQUEST);

    let unknown = server
        .put("/api/leaves/00000000-0000-0000-0000-000000000000/status")
        .authorization_bearer(&lead)
        .json(&json!({ "status": "approved" }))
        .await;
    unknown.assert_status(StatusCode::NOT_FOUND);
    unknown.assert_json(&json!({ "error": "Leave not found" }));

    let reviewed = server
        .put(&format!("/api/leaves/{id}/status"))
        .authorization_bearer(&lead)
        .json(&json!({ "status": "rejected" }))
        .await;
    reviewed.assert_status_ok();
    let body: Value = reviewed.json();
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["reviewedBy"], "Rhea Lead");
}

#[tokio::test]
async fn test_api_rejects_invalid_leave() {
    let (server, _) = setup();
    let token = api_token(&server, EMPLOYEE_EMAIL).await;

    let backwards = server
        .post("/api/leaves")
        .authorization_bearer(&token)
        .json(&json!({ "startDate": "2030-04-03", "endDate": "2030-04-01", "reason": "x" }))
        .await;
    backwards.assert_status(StatusCode::BAD_REQUEST);

    let malformed = server
        .post("/api/leaves")
        .authorization_bearer(&token)
        .json(&json!({ "startDate": "April", "endDate": "2030-04-01", "reason": "x" }))
        .await;
    malformed.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = malformed.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_api_employees_is_lead_only() {
    let (server, _) = setup();
    let employee = api_token(&server, EMPLOYEE_EMAIL).await;
    let lead = api_token(&server, LEAD_EMAIL).await;

    server
        .get("/api/employees")
        .authorization_bearer(&employee)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let list: Vec<Value> = server.get("/api/employees").authorization_bearer(&lead).await.json();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["email"], EMPLOYEE_EMAIL);
    assert!(list[0].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_api_chat() {
    let (server, _) = setup();
    let token = api_token(&server, LEAD_EMAIL).await;

    let posted = server
        .post("/api/chat")
        .authorization_bearer(&token)
        .json(&json!({ "message": "Standup moved to 10:00" }))
        .await;
    posted.assert_status(StatusCode::CREATED);
    let message: Value = posted.json();
    assert_eq!(message["senderName"], "Rhea Lead");
    assert_eq!(message["senderRole"], "lead");

    let history: Vec<Value> = server.get("/api/chat").authorization_bearer(&token).await.json();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["message"], "Standup moved to 10:00");
}
