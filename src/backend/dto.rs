//! Data Transfer Objects
//!
//! Request and response bodies of the timesheet backend. The backend speaks
//! camelCase JSON; response types default every field they can so that a
//! sparse echo still decodes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================
// TIMESHEET DTOs
// ============================================

/// Timesheet record sent to `POST /api/timesheets/posttimesheet`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntry {
    /// Calendar day the work belongs to (`YYYY-MM-DD`)
    pub work_date: NaiveDate,
    /// Duration as `HH:MM:SS`
    pub hours_worked: String,
    pub details: String,
    pub category_id: i64,
    pub shift_id: i64,
    pub user_id: i64,
}

/// Timesheet as returned by the backend (listing or echo of a create)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timesheet {
    pub timesheet_id: Option<i64>,
    pub work_date: Option<String>,
    pub hours_worked: Option<String>,
    pub details: Option<String>,
    pub category_id: Option<i64>,
    pub shift_id: Option<i64>,
    pub user_id: Option<i64>,
}

impl Timesheet {
    /// Record mirroring `entry`, for backends that answer with an empty body
    pub fn from_entry(entry: &TimesheetEntry, timesheet_id: Option<i64>) -> Self {
        Self {
            timesheet_id,
            work_date: Some(entry.work_date.format("%Y-%m-%d").to_string()),
            hours_worked: Some(entry.hours_worked.clone()),
            details: Some(entry.details.clone()),
            category_id: Some(entry.category_id),
            shift_id: Some(entry.shift_id),
            user_id: Some(entry.user_id),
        }
    }
}

// ============================================
// REFERENCE DATA DTOs
// ============================================

/// Task category offered on the timesheet form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCategory {
    pub category_id: i64,
    #[serde(default)]
    pub category_name: String,
}

/// Shift offered on the timesheet form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub shift_id: i64,
    #[serde(default)]
    pub shift_name: String,
}

/// Entry of `GET /api/users/all`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserSummary {
    /// Username, else email, else `User <id>`
    pub fn label(&self) -> String {
        self.username
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.email.as_deref().filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("User {}", self.user_id))
    }
}

// ============================================
// IDENTITY DTOs
// ============================================

/// Body of `GET /api/users/me`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrentUser {
    /// Account id
    pub id: i64,
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// Profile attached to an account
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    /// Profile user id, the id timesheets are filed under
    #[serde(default, rename = "userid")]
    pub user_id: Option<i64>,
    #[serde(default, rename = "roleName")]
    pub role_name: Option<String>,
}

/// Role of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Other(String),
}

impl Role {
    /// Parse a backend role name; a missing or blank name is a plain user
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            None => Role::User,
            Some(n) if n.eq_ignore_ascii_case("admin") => Role::Admin,
            Some(n) if n.eq_ignore_ascii_case("user") => Role::User,
            Some(n) => Role::Other(n.to_uppercase()),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
            Role::Other(name) => write!(f, "{}", name.to_lowercase()),
        }
    }
}

/// Who is tracking time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub account_id: i64,
    /// Profile user id; timesheets cannot be filed without it
    pub profile_user_id: Option<i64>,
    pub role: Role,
}

impl Identity {
    /// User id timesheet entries are filed under
    pub fn timesheet_user_id(&self) -> Option<i64> {
        self.profile_user_id
    }
}

impl From<CurrentUser> for Identity {
    fn from(user: CurrentUser) -> Self {
        let (profile_user_id, role_name) = match user.profile {
            Some(profile) => (profile.user_id, profile.role_name),
            None => (None, None),
        };

        if profile_user_id.is_none() {
            tracing::warn!(account_id = user.id, "Account has no profile user id");
        }

        Self {
            account_id: user.id,
            profile_user_id,
            role: Role::from_name(role_name.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = TimesheetEntry {
            work_date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            hours_worked: "03:02:05".to_string(),
            details: "Inventory".to_string(),
            category_id: 2,
            shift_id: 1,
            user_id: 7,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "workDate": "2025-04-02",
                "hoursWorked": "03:02:05",
                "details": "Inventory",
                "categoryId": 2,
                "shiftId": 1,
                "userId": 7,
            })
        );
    }

    #[test]
    fn test_sparse_timesheet_decodes() {
        let ts: Timesheet =
            serde_json::from_str(r#"{"timesheetId": 4, "hoursWorked": "01:00:00", "extra": true}"#)
                .unwrap();
        assert_eq!(ts.timesheet_id, Some(4));
        assert_eq!(ts.hours_worked.as_deref(), Some("01:00:00"));
        assert_eq!(ts.details, None);
    }

    #[test]
    fn test_identity_from_current_user() {
        let user: CurrentUser = serde_json::from_str(
            r#"{"id": 3, "email": "a@b.c", "profile": {"userid": 11, "roleName": "Admin"}}"#,
        )
        .unwrap();
        let identity = Identity::from(user);
        assert_eq!(identity.account_id, 3);
        assert_eq!(identity.timesheet_user_id(), Some(11));
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn test_identity_without_profile() {
        let user: CurrentUser = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        let identity = Identity::from(user);
        assert_eq!(identity.timesheet_user_id(), None);
        assert_eq!(identity.role, Role::User);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from_name(Some("admin")), Role::Admin);
        assert_eq!(Role::from_name(Some("USER")), Role::User);
        assert_eq!(Role::from_name(Some("  ")), Role::User);
        assert_eq!(Role::from_name(Some("manager")), Role::Other("MANAGER".to_string()));
        assert_eq!(Role::from_name(Some("manager")).to_string(), "manager");
    }

    #[test]
    fn test_user_label_fallbacks() {
        let user = UserSummary {
            user_id: 5,
            username: None,
            email: Some("x@y.z".to_string()),
        };
        assert_eq!(user.label(), "x@y.z");

        let user = UserSummary {
            user_id: 5,
            username: Some(String::new()),
            email: None,
        };
        assert_eq!(user.label(), "User 5");
    }
}
