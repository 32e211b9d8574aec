//! HTML rendering for the session-authenticated pages.
//!
//! Pages are assembled from plain `format!` fragments. Every value that
//! originates from user input passes through `escape` before it is embedded.

use axum::response::Html;
use leavedesk_core::{CalendarMonth, ChatMessage, LeaveRequest, LeaveStatus, Role, Session, User};

/// Escape text for HTML element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:sans-serif;margin:0;background:#f5f6f8;color:#222}\
nav{background:#234;padding:.6em 1em}nav a{color:#fff;margin-right:1em;text-decoration:none}\
main{max-width:960px;margin:1.5em auto;background:#fff;padding:1.5em;border-radius:6px}\
table{border-collapse:collapse;width:100%}td,th{border-bottom:1px solid #ddd;padding:.4em;text-align:left}\
.error{background:#fde2e2;color:#8a1f1f;padding:.6em;border-radius:4px}\
.success{background:#e0f5e4;color:#1d6b2c;padding:.6em;border-radius:4px}\
.status-pending{color:#a66b00}.status-approved{color:#1d6b2c}.status-rejected{color:#8a1f1f}\
.cal td{vertical-align:top;height:4.5em;width:14%;border:1px solid #ddd}.cal small{display:block}\
form.inline{display:inline}label{display:block;margin-top:.6em}";

fn page(title: &str, nav: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title} - LeaveDesk</title><style>{STYLE}</style></head>\
         <body>{nav}<main><h1>{title}</h1>{body}</main></body></html>",
        title = escape(title),
    ))
}

fn nav(session: &Session) -> String {
    let links = match session.role {
        Role::Lead => {
            "<a href=\"/lead-dashboard\">Dashboard</a><a href=\"/employees\">Employees</a>\
             <a href=\"/add-employee\">Add employee</a>"
        }
        Role::Employee => {
            "<a href=\"/employee-dashboard\">Dashboard</a><a href=\"/apply-leave\">Apply leave</a>"
        }
    };
    format!(
        "<nav>{links}<a href=\"/calendar\">Calendar</a><a href=\"/chat\">Chat</a>\
         <a href=\"/change-password\">Change password</a>\
         <a href=\"/logout\">Logout ({})</a></nav>",
        escape(&session.user_name)
    )
}

fn notices(error: Option<&str>, success: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(e) = error {
        out.push_str(&format!("<p class=\"error\">{}</p>", escape(e)));
    }
    if let Some(s) = success {
        out.push_str(&format!("<p class=\"success\">{}</p>", escape(s)));
    }
    out
}

fn csrf_field(session: &Session) -> String {
    format!(
        "<input type=\"hidden\" name=\"_csrf\" value=\"{}\">",
        escape(&session.csrf_token)
    )
}

fn status_cell(status: LeaveStatus) -> String {
    format!("<span class=\"status-{0}\">{0}</span>", status.as_str())
}

// =============================================================================
// PUBLIC PAGES
// =============================================================================

pub fn login(error: Option<&str>) -> Html<String> {
    let body = format!(
        "{}<form method=\"post\" action=\"/login\">\
         <label>Email <input type=\"email\" name=\"email\" required></label>\
         <label>Password <input type=\"password\" name=\"password\" required></label>\
         <p><button type=\"submit\">Log in</button></p></form>",
        notices(error, None)
    );
    page("Login", "", &body)
}

pub fn forbidden() -> Html<String> {
    page(
        "Forbidden",
        "",
        "<p class=\"error\">The form has expired or was not sent from this site. \
         Go back, reload the page and try again.</p>",
    )
}

// =============================================================================
// EMPLOYEE PAGES
// =============================================================================

pub fn employee_dashboard(session: &Session, leaves: &[LeaveRequest], error: Option<&str>) -> Html<String> {
    let rows: String = leaves
        .iter()
        .map(|l| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                l.start_date,
                l.end_date,
                l.days(),
                escape(&l.reason),
                status_cell(l.status),
                l.applied_at.format("%Y-%m-%d %H:%M"),
            )
        })
        .collect();
    let table = if leaves.is_empty() {
        "<p>No leave requests yet.</p>".to_string()
    } else {
        format!(
            "<table><tr><th>From</th><th>To</th><th>Days</th><th>Reason</th>\
             <th>Status</th><th>Applied</th></tr>{rows}</table>"
        )
    };
    let body = format!(
        "{}<p>Welcome, {}. <a href=\"/apply-leave\">Apply for leave</a></p>{table}",
        notices(error, None),
        escape(&session.user_name)
    );
    page("My leave", &nav(session), &body)
}

pub fn apply_leave(session: &Session) -> Html<String> {
    let body = format!(
        "<form method=\"post\" action=\"/apply-leave\">{}\
         <label>Start date <input type=\"date\" name=\"startDate\" required></label>\
         <label>End date <input type=\"date\" name=\"endDate\" required></label>\
         <label>Reason <textarea name=\"reason\" rows=\"4\" cols=\"50\" required></textarea></label>\
         <p><button type=\"submit\">Submit request</button></p></form>",
        csrf_field(session)
    );
    page("Apply for leave", &nav(session), &body)
}

pub fn change_password(session: &Session, error: Option<&str>, success: Option<&str>) -> Html<String> {
    let body = format!(
        "{}<form method=\"post\" action=\"/change-password\">{}\
         <label>Current password <input type=\"password\" name=\"currentPassword\" required></label>\
         <label>New password <input type=\"password\" name=\"newPassword\" required></label>\
         <label>Confirm new password <input type=\"password\" name=\"confirmPassword\" required></label>\
         <p><button type=\"submit\">Change password</button></p></form>",
        notices(error, success),
        csrf_field(session)
    );
    page("Change password", &nav(session), &body)
}

// =============================================================================
// LEAD PAGES
// =============================================================================

/// A leave with the applicant's current email, if the account still exists.
pub struct LeaveRow {
    pub leave: LeaveRequest,
    pub email: Option<String>,
}

pub fn lead_dashboard(session: &Session, rows: &[LeaveRow], error: Option<&str>) -> Html<String> {
    let pending = rows
        .iter()
        .filter(|r| r.leave.status == LeaveStatus::Pending)
        .count();
    let csrf = csrf_field(session);
    let body_rows: String = rows
        .iter()
        .map(|row| {
            let l = &row.leave;
            let actions = if l.status == LeaveStatus::Pending {
                format!(
                    "<form class=\"inline\" method=\"post\" action=\"/update-leave/{id}\">{csrf}\
                     <button name=\"status\" value=\"approved\">Approve</button>\
                     <button name=\"status\" value=\"rejected\">Reject</button></form>",
                    id = l.id
                )
            } else {
                format!(
                    "by {} on {}",
                    escape(l.reviewed_by.as_deref().unwrap_or("-")),
                    l.reviewed_at
                        .map(|t| t.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".to_string())
                )
            };
            format!(
                "<tr><td>{} ({})<br><small>{}</small></td><td>{} to {}</td><td>{}</td>\
                 <td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&l.employee_name),
                escape(&l.employee_code),
                escape(row.email.as_deref().unwrap_or("")),
                l.start_date,
                l.end_date,
                l.days(),
                escape(&l.reason),
                status_cell(l.status),
                actions,
            )
        })
        .collect();
    let body = format!(
        "{}<p>{} request(s), {} pending.</p>\
         <table><tr><th>Employee</th><th>Dates</th><th>Days</th><th>Reason</th>\
         <th>Status</th><th>Review</th></tr>{body_rows}</table>",
        notices(error, None),
        rows.len(),
        pending
    );
    page("Team leave requests", &nav(session), &body)
}

pub fn employees(session: &Session, employees: &[User], error: Option<&str>) -> Html<String> {
    let csrf = csrf_field(session);
    let rows: String = employees
        .iter()
        .map(|u| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>\
                 <form class=\"inline\" method=\"post\" action=\"/reset-password/{}\">{csrf}\
                 <button type=\"submit\">Reset password</button></form></td></tr>",
                escape(&u.name),
                escape(&u.employee_code),
                escape(&u.email),
                escape(u.phone.as_deref().unwrap_or("")),
                u.date_of_joining.map(|d| d.to_string()).unwrap_or_default(),
                u.id,
            )
        })
        .collect();
    let body = format!(
        "{}<p>{} employee(s). <a href=\"/add-employee\">Add employee</a></p>\
         <table><tr><th>Name</th><th>Employee ID</th><th>Email</th><th>Phone</th>\
         <th>Joined</th><th></th></tr>{rows}</table>",
        notices(error, None),
        employees.len()
    );
    page("Employees", &nav(session), &body)
}

pub fn add_employee(session: &Session, error: Option<&str>, success: Option<&str>) -> Html<String> {
    let body = format!(
        "{}<form method=\"post\" action=\"/add-employee\">{}\
         <label>Name <input name=\"name\" required></label>\
         <label>Email <input type=\"email\" name=\"email\" required></label>\
         <label>Employee ID <input name=\"employeeId\" required></label>\
         <label>Phone <input name=\"phone\"></label>\
         <label>Date of joining <input type=\"date\" name=\"dateOfJoining\"></label>\
         <p><button type=\"submit\">Add employee</button></p></form>",
        notices(error, success),
        csrf_field(session)
    );
    page("Add employee", &nav(session), &body)
}

// =============================================================================
// SHARED PAGES
// =============================================================================

pub fn calendar(
    session: &Session,
    month: &CalendarMonth,
    approved: &[LeaveRequest],
    error: Option<&str>,
) -> Html<String> {
    let (py, pm) = month.previous();
    let (ny, nm) = month.next();

    let mut grid = String::from(
        "<table class=\"cal\"><tr><th>Mon</th><th>Tue</th><th>Wed</th><th>Thu</th>\
         <th>Fri</th><th>Sat</th><th>Sun</th></tr><tr>",
    );
    let blanks = month.leading_blanks();
    for _ in 0..blanks {
        grid.push_str("<td></td>");
    }
    for (i, day) in month.days.iter().enumerate() {
        if i > 0 && (i + blanks) % 7 == 0 {
            grid.push_str("</tr><tr>");
        }
        let names: String = day
            .absent
            .iter()
            .map(|a| format!("<small>{}</small>", escape(&a.employee_name)))
            .collect();
        grid.push_str(&format!("<td><b>{}</b>{names}</td>", chrono::Datelike::day(&day.date)));
    }
    grid.push_str("</tr></table>");

    let list: String = approved
        .iter()
        .map(|l| {
            format!(
                "<tr><td>{} ({})</td><td>{}</td><td>{}</td></tr>",
                escape(&l.employee_name),
                escape(&l.employee_code),
                l.start_date,
                l.end_date
            )
        })
        .collect();

    let body = format!(
        "{}<p><a href=\"/calendar?month={py}-{pm:02}\">&larr; previous</a> \
         <b>{year}-{month:02}</b> \
         <a href=\"/calendar?month={ny}-{nm:02}\">next &rarr;</a></p>{grid}\
         <h2>Approved leave</h2><table><tr><th>Employee</th><th>From</th><th>To</th></tr>{list}</table>",
        notices(error, None),
        year = month.year,
        month = month.month,
    );
    page("Leave calendar", &nav(session), &body)
}

pub fn chat(session: &Session, messages: &[ChatMessage], error: Option<&str>) -> Html<String> {
    let log: String = messages
        .iter()
        .map(|m| {
            let who = if m.sender_id == session.user {
                "you".to_string()
            } else {
                format!("{} ({})", escape(&m.sender_name), m.sender_role)
            };
            format!(
                "<p><small>{}</small> <b>{who}</b>: {}</p>",
                m.timestamp.format("%Y-%m-%d %H:%M"),
                escape(&m.message)
            )
        })
        .collect();
    let body = format!(
        "{}<div>{}</div><form method=\"post\" action=\"/chat\">{}\
         <input name=\"message\" size=\"60\" required> <button type=\"submit\">Send</button></form>",
        notices(error, None),
        if messages.is_empty() { "<p>No messages yet.</p>".to_string() } else { log },
        csrf_field(session)
    );
    page("Team chat", &nav(session), &body)
}
