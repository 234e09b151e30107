use crate::types::{Amount, AtRiskMember, OfferingRecord, Role, User, WelfareContribution};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

fn decode_err<E>(e: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(e))
}

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub home_cell_group: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbUser> for User {
    type Error = sqlx::Error;

    fn try_from(d: DbUser) -> Result<Self, Self::Error> {
        let role: Role = d.role.parse().map_err(decode_err)?;
        Ok(User {
            username: d.username,
            password_hash: d.password_hash,
            role,
            home_cell_group: d.home_cell_group,
            created_at: d.created_at,
            updated_at: d.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbOffering {
    pub id: i64,
    pub service_date: NaiveDate,
    pub member_id: Option<String>,
    pub amount_minor: i64,
    pub category: String,
    pub description: Option<String>,
    pub entered_by: String,
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<DbOffering> for OfferingRecord {
    type Error = sqlx::Error;

    fn try_from(d: DbOffering) -> Result<Self, Self::Error> {
        let category = d
            .category
            .parse()
            .map_err(|e: String| sqlx::Error::Decode(e.into()))?;
        Ok(OfferingRecord {
            id: d.id,
            service_date: d.service_date,
            member_id: d.member_id,
            amount: Amount::from_minor(d.amount_minor),
            category,
            description: d.description,
            entered_by: d.entered_by,
            recorded_at: d.recorded_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbWelfare {
    pub id: i64,
    pub service_date: NaiveDate,
    pub member_id: String,
    pub member_name: String,
    pub home_cell_group: String,
    pub amount_minor: i64,
    pub collected_by: String,
    pub recorded_at: DateTime<Utc>,
}

impl From<DbWelfare> for WelfareContribution {
    fn from(d: DbWelfare) -> Self {
        WelfareContribution {
            id: d.id,
            service_date: d.service_date,
            member_id: d.member_id,
            member_name: d.member_name,
            home_cell_group: d.home_cell_group,
            amount: Amount::from_minor(d.amount_minor),
            collected_by: d.collected_by,
            recorded_at: d.recorded_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbAtRisk {
    pub member_id: String,
    pub member_name: String,
    pub home_cell_group: String,
    pub phone: Option<String>,
    pub recent_attendance: String,
    pub missed_count: i64,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbAtRisk> for AtRiskMember {
    type Error = sqlx::Error;

    fn try_from(d: DbAtRisk) -> Result<Self, Self::Error> {
        let recent_attendance: Vec<bool> =
            serde_json::from_str(&d.recent_attendance).map_err(decode_err)?;
        Ok(AtRiskMember {
            member_id: d.member_id,
            member_name: d.member_name,
            home_cell_group: d.home_cell_group,
            phone: d.phone,
            recent_attendance,
            missed_count: d.missed_count.max(0) as usize,
            updated_at: d.updated_at,
        })
    }
}
