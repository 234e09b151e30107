use crate::db::models::{DbAtRisk, DbOffering, DbUser, DbWelfare};
use crate::db::repository::{RecordStore, UserRepository};
use crate::db::schema::SQLITE_INIT;
use crate::error::ChurchError;
use crate::types::{
    Announcement, AtRiskMember, AttendanceRecord, Member, OfferingRecord, User,
    WelfareContribution,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

const USER_COLUMNS: &str =
    "username, password_hash, role, home_cell_group, created_at, updated_at";

/// `LIMIT -1` is "no limit" in SQLite.
fn limit_arg(limit: Option<usize>) -> i64 {
    limit.map(|l| l as i64).unwrap_or(-1)
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, ChurchError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let mut pool_opts = SqlitePoolOptions::new();
        if database_url.contains(":memory:") {
            // every connection gets its own in-memory database; keep exactly one alive
            pool_opts = pool_opts
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }
        let pool = pool_opts.connect_with(connect_opts).await?;
        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), ChurchError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn find_user(&self, username: &str) -> Result<Option<User>, ChurchError> {
        let row: Option<DbUser> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn insert_user(&self, user: &User) -> Result<(), ChurchError> {
        let res = sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"
        ))
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.home_cell_group)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(ChurchError::UserExists(user.username.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_user(&self, user: &User) -> Result<(), ChurchError> {
        let res = sqlx::query(
            r#"UPDATE users SET
                password_hash = ?,
                role = ?,
                home_cell_group = ?,
                updated_at = ?
              WHERE username = ?"#,
        )
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.home_cell_group)
        .bind(user.updated_at)
        .bind(&user.username)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(ChurchError::UserNotFound(user.username.clone()));
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, ChurchError> {
        let rows: Vec<DbUser> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<_, _>>()?)
    }

    async fn count_users(&self) -> Result<u64, ChurchError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0.max(0) as u64)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn upsert_members(&self, members: &[Member]) -> Result<usize, ChurchError> {
        let mut tx = self.pool.begin().await?;
        for m in members {
            sqlx::query(
                r#"
                INSERT INTO members (member_id, name, home_cell_group, phone, email, gender)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(member_id) DO UPDATE SET
                    name=excluded.name,
                    home_cell_group=excluded.home_cell_group,
                    phone=excluded.phone,
                    email=excluded.email,
                    gender=excluded.gender
                "#,
            )
            .bind(&m.member_id)
            .bind(&m.name)
            .bind(&m.home_cell_group)
            .bind(&m.phone)
            .bind(&m.email)
            .bind(&m.gender)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        debug!(count = members.len(), "members upserted");
        Ok(members.len())
    }

    async fn list_members(&self) -> Result<Vec<Member>, ChurchError> {
        let rows = sqlx::query_as::<_, Member>(
            "SELECT member_id, name, home_cell_group, phone, email, gender FROM members ORDER BY name, member_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn replace_attendance_session(
        &self,
        service_date: NaiveDate,
        home_cell_group: &str,
        records: &[AttendanceRecord],
    ) -> Result<(), ChurchError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            "DELETE FROM attendance WHERE service_date = ? AND home_cell_group = ?",
        )
        .bind(service_date)
        .bind(home_cell_group)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        for r in records {
            sqlx::query(
                r#"
                INSERT INTO attendance (
                    service_date, home_cell_group, member_id, member_name,
                    present, recorded_by, recorded_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(r.service_date)
            .bind(&r.home_cell_group)
            .bind(&r.member_id)
            .bind(&r.member_name)
            .bind(r.present)
            .bind(&r.recorded_by)
            .bind(r.recorded_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(
            %service_date,
            home_cell_group,
            removed,
            inserted = records.len(),
            "attendance session replaced"
        );
        Ok(())
    }

    async fn session_attendance(
        &self,
        service_date: NaiveDate,
        home_cell_group: &str,
    ) -> Result<Vec<AttendanceRecord>, ChurchError> {
        let rows = sqlx::query_as::<_, AttendanceRecord>(
            r#"SELECT service_date, home_cell_group, member_id, member_name,
               present, recorded_by, recorded_at
               FROM attendance WHERE service_date = ? AND home_cell_group = ?
               ORDER BY member_name, member_id"#,
        )
        .bind(service_date)
        .bind(home_cell_group)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>, ChurchError> {
        let rows = sqlx::query_as::<_, AttendanceRecord>(
            r#"SELECT service_date, home_cell_group, member_id, member_name,
               present, recorded_by, recorded_at
               FROM attendance ORDER BY service_date DESC, home_cell_group, member_name"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_offering(&self, offering: &OfferingRecord) -> Result<i64, ChurchError> {
        let res = sqlx::query(
            r#"
            INSERT INTO offerings (
                service_date, member_id, amount_minor, category,
                description, entered_by, recorded_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(offering.service_date)
        .bind(&offering.member_id)
        .bind(offering.amount.minor())
        .bind(offering.category.as_str())
        .bind(&offering.description)
        .bind(&offering.entered_by)
        .bind(offering.recorded_at)
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }

    async fn list_offerings(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<OfferingRecord>, ChurchError> {
        let rows: Vec<DbOffering> = sqlx::query_as(
            r#"SELECT id, service_date, member_id, amount_minor, category,
               description, entered_by, recorded_at
               FROM offerings ORDER BY id DESC LIMIT ?"#,
        )
        .bind(limit_arg(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(OfferingRecord::try_from)
            .collect::<Result<_, _>>()?)
    }

    async fn insert_welfare(&self, entries: &[WelfareContribution]) -> Result<(), ChurchError> {
        let mut tx = self.pool.begin().await?;
        for w in entries {
            sqlx::query(
                r#"
                INSERT INTO welfare (
                    service_date, member_id, member_name, home_cell_group,
                    amount_minor, collected_by, recorded_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(w.service_date)
            .bind(&w.member_id)
            .bind(&w.member_name)
            .bind(&w.home_cell_group)
            .bind(w.amount.minor())
            .bind(&w.collected_by)
            .bind(w.recorded_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_welfare(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<WelfareContribution>, ChurchError> {
        let rows: Vec<DbWelfare> = sqlx::query_as(
            r#"SELECT id, service_date, member_id, member_name, home_cell_group,
               amount_minor, collected_by, recorded_at
               FROM welfare ORDER BY id DESC LIMIT ?"#,
        )
        .bind(limit_arg(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_announcement(
        &self,
        announcement: &Announcement,
    ) -> Result<i64, ChurchError> {
        let res = sqlx::query(
            "INSERT INTO announcements (title, message, posted_by, posted_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&announcement.title)
        .bind(&announcement.message)
        .bind(&announcement.posted_by)
        .bind(announcement.posted_at)
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }

    async fn list_announcements(&self, limit: usize) -> Result<Vec<Announcement>, ChurchError> {
        let rows = sqlx::query_as::<_, Announcement>(
            r#"SELECT id, title, message, posted_by, posted_at
               FROM announcements ORDER BY id DESC LIMIT ?"#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn replace_summary(&self, rows: &[AtRiskMember]) -> Result<(), ChurchError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM attendance_summary")
            .execute(&mut *tx)
            .await?;
        for r in rows {
            let flags = serde_json::to_string(&r.recent_attendance)
                .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
            sqlx::query(
                r#"
                INSERT INTO attendance_summary (
                    member_id, member_name, home_cell_group, phone,
                    recent_attendance, missed_count, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&r.member_id)
            .bind(&r.member_name)
            .bind(&r.home_cell_group)
            .bind(&r.phone)
            .bind(flags)
            .bind(r.missed_count as i64)
            .bind(r.updated_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_summary(&self) -> Result<Vec<AtRiskMember>, ChurchError> {
        let rows: Vec<DbAtRisk> = sqlx::query_as(
            r#"SELECT member_id, member_name, home_cell_group, phone,
               recent_attendance, missed_count, updated_at
               FROM attendance_summary ORDER BY home_cell_group, member_name"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(AtRiskMember::try_from)
            .collect::<Result<_, _>>()?)
    }
}
