//! # Calendar Module
//!
//! Month view of approved absences.
//!
//! Only approved requests appear; pending and rejected requests are not
//! absences yet.

use crate::error::{LeaveError, Result};
use crate::leave::{LeaveId, LeaveRequest, LeaveStatus};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// One employee away on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Absence {
    pub leave_id: LeaveId,
    pub employee_name: String,
    pub employee_code: String,
}

/// A single day cell of the month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub absent: Vec<Absence>,
}

/// All days of one month with who is away on each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    /// Lay out `year`-`month` and place every approved leave on its days.
    pub fn build(year: i32, month: u32, leaves: &[LeaveRequest]) -> Result<Self> {
        let first = first_of_month(year, month)?;
        let last = last_of_month(first)?;

        let approved: Vec<&LeaveRequest> = leaves
            .iter()
            .filter(|l| l.status == LeaveStatus::Approved && l.overlaps(first, last))
            .collect();

        let days = first
            .iter_days()
            .take_while(|d| *d <= last)
            .map(|date| CalendarDay {
                date,
                absent: approved
                    .iter()
                    .filter(|l| l.covers(date))
                    .map(|l| Absence {
                        leave_id: l.id,
                        employee_name: l.employee_name.clone(),
                        employee_code: l.employee_code.clone(),
                    })
                    .collect(),
            })
            .collect();

        Ok(Self { year, month, days })
    }

    /// Empty cells before day 1 in a Monday-first week.
    #[must_use]
    pub fn leading_blanks(&self) -> usize {
        self.days
            .first()
            .map(|d| d.date.weekday().num_days_from_monday() as usize)
            .unwrap_or(0)
    }

    /// `(year, month)` of the month before.
    #[must_use]
    pub fn previous(&self) -> (i32, u32) {
        if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        }
    }

    /// `(year, month)` of the month after.
    #[must_use]
    pub fn next(&self) -> (i32, u32) {
        if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        }
    }

    /// Total person-days of absence in the month.
    #[must_use]
    pub fn absence_days(&self) -> usize {
        self.days.iter().map(|d| d.absent.len()).sum()
    }
}

/// Parse a `YYYY-MM` month selector.
pub fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let (year, month) = raw
        .trim()
        .split_once('-')
        .ok_or_else(|| LeaveError::invalid("month must look like YYYY-MM"))?;
    let year: i32 = year
        .parse()
        .map_err(|_| LeaveError::invalid("invalid year"))?;
    let month: u32 = month
        .parse()
        .map_err(|_| LeaveError::invalid("invalid month"))?;
    first_of_month(year, month)?;
    Ok((year, month))
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| LeaveError::invalid(format!("no such month {year}-{month:02}")))
}

fn last_of_month(first: NaiveDate) -> Result<NaiveDate> {
    first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| LeaveError::invalid("month out of range"))
}

// =============================================================================
// TESTS
// =============================================================================
