//! # Roster Module
//!
//! Bulk account creation from a roster file.
//!
//! Seeding is idempotent: an entry whose email is already registered is
//! skipped, never overwritten.

use crate::error::{LeaveError, Result};
use crate::password::PasswordHasher;
use crate::storage::RedbStore;
use crate::user::{NewUser, Role, User};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One line of a roster file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub name: String,
    pub email: String,
    pub employee_id: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_joining: Option<NaiveDate>,
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// `(name, employee code)` of each account created.
    pub created: Vec<(String, String)>,
    /// Names of entries skipped because their email exists.
    pub skipped: Vec<String>,
}

/// Parse a JSON array of roster entries.
pub fn parse_roster(json: &str) -> Result<Vec<RosterEntry>> {
    serde_json::from_str(json).map_err(|e| LeaveError::invalid(format!("roster: {e}")))
}

/// Create an account with `role` and the default password for each entry.
///
/// The default password is hashed once and shared by every created account.
pub fn seed(
    store: &RedbStore,
    hasher: &PasswordHasher,
    entries: &[RosterEntry],
    role: Role,
    now: DateTime<Utc>,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let mut hash: Option<String> = None;

    for entry in entries {
        if store.find_user_by_email(&entry.email)?.is_some() {
            report.skipped.push(entry.name.clone());
            continue;
        }
        let new = NewUser::new(
            &entry.name,
            &entry.email,
            &entry.employee_id,
            role,
            entry.phone.as_deref(),
            entry.date_of_joining,
        )?;
        let password_hash = match &hash {
            Some(h) => h.clone(),
            None => {
                let h = hasher.hash_default()?;
                hash = Some(h.clone());
                h
            }
        };
        let user = User::from_new(new, password_hash, now);
        store.insert_user(&user)?;
        report.created.push((user.name, user.employee_code));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::DEFAULT_PASSWORD;

    const ROSTER: &str = r#"[
        {"name": "Asha Menon", "email": "asha@example.com", "employeeId": "EMP/101",
         "phone": "555-0101", "dateOfJoining": "2025-02-20"},
        {"name": "Tomas Ek", "email": "tomas@example.com", "employeeId": "EMP/102"}
    ]"#;

    #[test]
    fn parse_accepts_optional_fields() {
        let entries = parse_roster(ROSTER).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date_of_joining, NaiveDate::from_ymd_opt(2025, 2, 20));
        assert_eq!(entries[1].phone, None);
        assert!(parse_roster("{not json").is_err());
    }

    #[test]
    fn seeding_twice_skips_existing() {
        let store = RedbStore::in_memory().unwrap();
        let hasher = PasswordHasher::new(4);
        let entries = parse_roster(ROSTER).unwrap();

        let first = seed(&store, &hasher, &entries, Role::Employee, Utc::now()).unwrap();
        assert_eq!(first.created.len(), 2);
        assert!(first.skipped.is_empty());

        let second = seed(&store, &hasher, &entries, Role::Employee, Utc::now()).unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.skipped, vec!["Asha Menon", "Tomas Ek"]);

        let asha = store.find_user_by_email("asha@example.com").unwrap().unwrap();
        assert_eq!(asha.role, Role::Employee);
        assert!(hasher.verify(DEFAULT_PASSWORD, &asha.password_hash));
    }
}
