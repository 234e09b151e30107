use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use super::role::Role;

/// Currency amount held in minor units (1/100 of the configured currency).
/// Serialized as a decimal number of major units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_minor(minor: i64) -> Self {
        Amount(minor)
    }

    /// Convert a major-unit value, rounding to the nearest minor unit.
    /// Returns `None` for NaN, infinities and values outside the i64 range.
    pub fn from_major(major: f64) -> Option<Self> {
        if !major.is_finite() {
            return None;
        }
        let minor = (major * 100.0).round();
        if minor < i64::MIN as f64 || minor > i64::MAX as f64 {
            return None;
        }
        Some(Amount(minor as i64))
    }

    pub fn minor(self) -> i64 {
        self.0
    }

    pub fn major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.major())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub member_id: String,
    pub name: String,
    pub home_cell_group: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AttendanceRecord {
    pub service_date: NaiveDate,
    pub home_cell_group: String,
    pub member_id: String,
    pub member_name: String,
    pub present: bool,
    pub recorded_by: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferingCategory {
    SundayService,
    WeekdayMeeting,
    SpecialOffering,
    Tithe,
    Thanksgiving,
    Other,
}

impl OfferingCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            OfferingCategory::SundayService => "sunday_service",
            OfferingCategory::WeekdayMeeting => "weekday_meeting",
            OfferingCategory::SpecialOffering => "special_offering",
            OfferingCategory::Tithe => "tithe",
            OfferingCategory::Thanksgiving => "thanksgiving",
            OfferingCategory::Other => "other",
        }
    }
}

impl FromStr for OfferingCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "sunday_service" => OfferingCategory::SundayService,
            "weekday_meeting" => OfferingCategory::WeekdayMeeting,
            "special_offering" => OfferingCategory::SpecialOffering,
            "tithe" => OfferingCategory::Tithe,
            "thanksgiving" => OfferingCategory::Thanksgiving,
            "other" => OfferingCategory::Other,
            other => return Err(format!("unknown offering category `{other}`")),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferingRecord {
    pub id: i64,
    pub service_date: NaiveDate,
    /// `None` for anonymous giving.
    pub member_id: Option<String>,
    pub amount: Amount,
    pub category: OfferingCategory,
    pub description: Option<String>,
    pub entered_by: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WelfareContribution {
    pub id: i64,
    pub service_date: NaiveDate,
    pub member_id: String,
    pub member_name: String,
    pub home_cell_group: String,
    pub amount: Amount,
    pub collected_by: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub posted_by: String,
    pub posted_at: DateTime<Utc>,
}

/// A member who missed enough recent services to need a follow-up call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtRiskMember {
    pub member_id: String,
    pub member_name: String,
    pub home_cell_group: String,
    pub phone: Option<String>,
    /// One flag per recent service date, newest first.
    pub recent_attendance: Vec<bool>,
    pub missed_count: usize,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub home_cell_group: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_rounds_to_minor_units() {
        assert_eq!(Amount::from_major(12.345).map(Amount::minor), Some(1235));
        assert_eq!(Amount::from_major(100.0).map(Amount::minor), Some(10000));
        assert_eq!(Amount::from_major(f64::NAN), None);
        assert_eq!(Amount::from_major(f64::INFINITY), None);
    }

    #[test]
    fn amount_displays_two_decimals() {
        assert_eq!(Amount::from_minor(123456).to_string(), "1234.56");
        assert_eq!(Amount::from_minor(-5).to_string(), "-0.05");
        let total: Amount = [Amount::from_minor(150), Amount::from_minor(250)].iter().sum();
        assert_eq!(total, Amount::from_minor(400));
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            username: "admin".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Admin,
            home_cell_group: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).expect("serialize user");
        assert!(!json.contains("argon2id"));
        assert!(json.contains(r#""role":"admin""#));
    }
}
