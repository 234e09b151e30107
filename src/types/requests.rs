//! Request payloads accepted by the record operations.

use chrono::NaiveDate;
use serde::Deserialize;

use super::records::OfferingCategory;
use super::role::Role;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceEntry {
    pub member_id: String,
    pub present: bool,
}

/// A full register for one (date, home cell group) session.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceSubmission {
    pub service_date: NaiveDate,
    pub home_cell_group: String,
    pub entries: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionQuery {
    pub date: NaiveDate,
    pub group: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfferingRequest {
    /// Defaults to today.
    #[serde(default)]
    pub service_date: Option<NaiveDate>,
    #[serde(default)]
    pub member_id: Option<String>,
    pub amount: f64,
    pub category: OfferingCategory,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WelfareEntry {
    pub member_id: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WelfareSubmission {
    #[serde(default)]
    pub service_date: Option<NaiveDate>,
    pub entries: Vec<WelfareEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementRequest {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub home_cell_group: Option<String>,
}

/// Partial update of an existing account. An empty `home_cell_group`
/// clears the assignment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub home_cell_group: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}
