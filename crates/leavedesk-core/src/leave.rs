//! # Leave Module
//!
//! Leave requests and their review lifecycle.
//!
//! A request is created `pending` by its applicant and later set to
//! `approved` or `rejected` by a lead. The applicant's name and employee code
//! are copied onto the request when it is filed, so the history stays
//! readable even if the account is later edited.

use crate::error::{LeaveError, Result};
use crate::user::{User, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Longest accepted reason, in characters.
pub const MAX_REASON_CHARS: usize = 1000;

/// Stable identifier of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaveId(pub Uuid);

impl LeaveId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Result<Self> {
        crate::parse_uuid(raw, "leave id").map(Self)
    }
}

impl fmt::Display for LeaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

// =============================================================================
// STATUS
// =============================================================================

/// Review state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaveStatus {
    type Err = LeaveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(LeaveError::invalid(format!("unknown leave status '{other}'"))),
        }
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// What an employee submits when applying for leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeave {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

impl NewLeave {
    /// Check the date range and normalise the reason.
    pub fn validate(self) -> Result<Self> {
        if self.start_date > self.end_date {
            return Err(LeaveError::invalid("end date is before start date"));
        }
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(LeaveError::invalid("reason is required"));
        }
        if reason.chars().count() > MAX_REASON_CHARS {
            return Err(LeaveError::invalid(format!(
                "reason exceeds {MAX_REASON_CHARS} characters"
            )));
        }
        Ok(Self {
            reason: reason.to_owned(),
            ..self
        })
    }
}

/// A stored leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: LeaveId,
    /// The applicant's account; serialized as `employeeId`.
    #[serde(rename = "employeeId")]
    pub employee: UserId,
    pub employee_name: String,
    pub employee_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub applied_at: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// File a new pending request on behalf of `applicant`.
    pub fn apply(applicant: &User, leave: NewLeave, now: DateTime<Utc>) -> Result<Self> {
        let leave = leave.validate()?;
        Ok(Self {
            id: LeaveId::generate(),
            employee: applicant.id,
            employee_name: applicant.name.clone(),
            employee_code: applicant.employee_code.clone(),
            start_date: leave.start_date,
            end_date: leave.end_date,
            reason: leave.reason,
            status: LeaveStatus::Pending,
            applied_at: now,
            reviewed_by: None,
            reviewed_at: None,
        })
    }

    /// Record a lead's decision.
    pub fn review(&mut self, status: LeaveStatus, reviewer: &str, now: DateTime<Utc>) {
        self.status = status;
        self.reviewed_by = Some(reviewer.to_owned());
        self.reviewed_at = Some(now);
    }

    /// Number of calendar days covered, both ends inclusive.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Whether the request touches any day in `from..=to`.
    #[must_use]
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start_date <= to && from <= self.end_date
    }

    /// Whether the request covers `day`.
    #[must_use]
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.overlaps(day, day)
    }
}

// =============================================================================
// LISTING
// =============================================================================

/// Sort order for leave listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaveOrder {
    /// Most recently filed first (dashboards).
    #[default]
    AppliedDesc,
    /// Earliest start first (calendar).
    StartAsc,
}

/// Which leaves to list and how.
#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub employee: Option<UserId>,
    pub status: Option<LeaveStatus>,
    pub order: LeaveOrder,
    pub limit: Option<usize>,
}

impl LeaveFilter {
    /// Every request, newest first.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Requests filed by one employee, newest first.
    #[must_use]
    pub fn for_employee(employee: UserId) -> Self {
        Self {
            employee: Some(employee),
            ..Self::default()
        }
    }

    /// Approved requests ordered by start date.
    #[must_use]
    pub fn approved_by_start() -> Self {
        Self {
            status: Some(LeaveStatus::Approved),
            order: LeaveOrder::StartAsc,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `leave` passes the employee and status filters.
    #[must_use]
    pub fn matches(&self, leave: &LeaveRequest) -> bool {
        self.employee.is_none_or(|e| e == leave.employee)
            && self.status.is_none_or(|s| s == leave.status)
    }

    /// Filter, sort and truncate `leaves` in place.
    pub fn apply(&self, leaves: &mut Vec<LeaveRequest>) {
        leaves.retain(|l| self.matches(l));
        match self.order {
            LeaveOrder::AppliedDesc => leaves.sort_by(|a, b| {
                b.applied_at.cmp(&a.applied_at).then_with(|| a.id.cmp(&b.id))
            }),
            LeaveOrder::StartAsc => leaves.sort_by(|a, b| {
                a.start_date
                    .cmp(&b.start_date)
                    .then_with(|| a.applied_at.cmp(&b.applied_at))
            }),
        }
        if let Some(limit) = self.limit {
            leaves.truncate(limit);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
