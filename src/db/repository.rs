use crate::error::ChurchError;
use crate::types::{
    Announcement, AtRiskMember, AttendanceRecord, Member, OfferingRecord, User,
    WelfareContribution,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Login accounts, looked up by username.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, username: &str) -> Result<Option<User>, ChurchError>;

    /// Insert a new account. Fails with `UserExists` if the username is taken.
    async fn insert_user(&self, user: &User) -> Result<(), ChurchError>;

    /// Overwrite an existing account in place. Fails with `UserNotFound`.
    async fn update_user(&self, user: &User) -> Result<(), ChurchError>;

    async fn list_users(&self) -> Result<Vec<User>, ChurchError>;

    async fn count_users(&self) -> Result<u64, ChurchError>;
}

/// The shared tables behind the record operations.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Upsert by `member_id`. Returns the number of rows written.
    async fn upsert_members(&self, members: &[Member]) -> Result<usize, ChurchError>;

    async fn list_members(&self) -> Result<Vec<Member>, ChurchError>;

    /// Replace every record of the (date, group) session with `records`.
    async fn replace_attendance_session(
        &self,
        service_date: NaiveDate,
        home_cell_group: &str,
        records: &[AttendanceRecord],
    ) -> Result<(), ChurchError>;

    async fn session_attendance(
        &self,
        service_date: NaiveDate,
        home_cell_group: &str,
    ) -> Result<Vec<AttendanceRecord>, ChurchError>;

    async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>, ChurchError>;

    /// Append one offering; returns its id.
    async fn insert_offering(&self, offering: &OfferingRecord) -> Result<i64, ChurchError>;

    /// Newest first; `None` returns everything.
    async fn list_offerings(&self, limit: Option<usize>)
    -> Result<Vec<OfferingRecord>, ChurchError>;

    async fn insert_welfare(&self, entries: &[WelfareContribution]) -> Result<(), ChurchError>;

    async fn list_welfare(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<WelfareContribution>, ChurchError>;

    async fn insert_announcement(
        &self,
        announcement: &Announcement,
    ) -> Result<i64, ChurchError>;

    async fn list_announcements(&self, limit: usize) -> Result<Vec<Announcement>, ChurchError>;

    async fn replace_summary(&self, rows: &[AtRiskMember]) -> Result<(), ChurchError>;

    async fn list_summary(&self) -> Result<Vec<AtRiskMember>, ChurchError>;
}
