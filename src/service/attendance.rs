use super::{ChurchService, Principal, SummaryOutcome};
use crate::error::ChurchError;
use crate::types::requests::AttendanceSubmission;
use crate::types::{AtRiskMember, AttendanceRecord, Operation};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceOutcome {
    pub service_date: NaiveDate,
    pub home_cell_group: String,
    pub recorded: usize,
    pub present: usize,
}

impl ChurchService {
    /// Store the register for one (date, group) session, replacing any earlier
    /// submission for that session.
    pub async fn log_attendance(
        &self,
        principal: &Principal,
        submission: AttendanceSubmission,
    ) -> Result<AttendanceOutcome, ChurchError> {
        principal.require(Operation::LogAttendance)?;
        let group = submission.home_cell_group.trim().to_string();
        if group.is_empty() {
            return Err(ChurchError::invalid("home_cell_group must not be empty"));
        }
        principal.ensure_in_scope(&group)?;
        if submission.entries.is_empty() {
            return Err(ChurchError::invalid("attendance register is empty"));
        }

        let mut seen = HashSet::new();
        for entry in &submission.entries {
            if !seen.insert(entry.member_id.trim()) {
                return Err(ChurchError::invalid(format!(
                    "member `{}` appears more than once",
                    entry.member_id.trim()
                )));
            }
        }

        let index = self.member_index().await?;
        let now = Utc::now();
        let records = submission
            .entries
            .iter()
            .map(|entry| {
                let id = entry.member_id.trim();
                let member = index
                    .get(id)
                    .ok_or_else(|| ChurchError::invalid(format!("unknown member `{id}`")))?;
                if member.home_cell_group != group {
                    return Err(ChurchError::invalid(format!(
                        "member `{id}` belongs to `{}`, not `{group}`",
                        member.home_cell_group
                    )));
                }
                Ok(AttendanceRecord {
                    service_date: submission.service_date,
                    home_cell_group: group.clone(),
                    member_id: member.member_id.clone(),
                    member_name: member.name.clone(),
                    present: entry.present,
                    recorded_by: principal.username.clone(),
                    recorded_at: now,
                })
            })
            .collect::<Result<Vec<_>, ChurchError>>()?;

        self.store
            .replace_attendance_session(submission.service_date, &group, &records)
            .await?;

        let present = records.iter().filter(|r| r.present).count();
        info!(
            by = %principal.username,
            date = %submission.service_date,
            group = %group,
            present,
            total = records.len(),
            "attendance saved"
        );
        self.summary.request_rebuild();

        Ok(AttendanceOutcome {
            service_date: submission.service_date,
            home_cell_group: group,
            recorded: records.len(),
            present,
        })
    }

    /// The stored register for a session, for editing.
    pub async fn session_attendance(
        &self,
        principal: &Principal,
        service_date: NaiveDate,
        home_cell_group: &str,
    ) -> Result<Vec<AttendanceRecord>, ChurchError> {
        principal.require(Operation::LogAttendance)?;
        let group = home_cell_group.trim();
        principal.ensure_in_scope(group)?;
        self.store.session_attendance(service_date, group).await
    }

    pub async fn at_risk_members(
        &self,
        principal: &Principal,
    ) -> Result<Vec<AtRiskMember>, ChurchError> {
        principal.require(Operation::ViewAtRisk)?;
        let rows = self.store.list_summary().await?;
        Ok(match principal.scoped_group() {
            Some(own) => rows.into_iter().filter(|r| r.home_cell_group == own).collect(),
            None => rows,
        })
    }

    pub async fn rebuild_at_risk(&self, principal: &Principal) -> Result<SummaryOutcome, ChurchError> {
        principal.require(Operation::ViewAtRisk)?;
        self.summary.rebuild().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{admin, member, principal, service};
    use crate::types::Role;
    use crate::types::requests::AttendanceEntry;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn register(date: NaiveDate, group: &str, entries: &[(&str, bool)]) -> AttendanceSubmission {
        AttendanceSubmission {
            service_date: date,
            home_cell_group: group.to_string(),
            entries: entries
                .iter()
                .map(|(id, present)| AttendanceEntry {
                    member_id: id.to_string(),
                    present: *present,
                })
                .collect(),
        }
    }

    async fn seeded() -> ChurchService {
        let svc = service().await;
        svc.upsert_members(
            &admin(),
            vec![
                member("M1", "Ama", "Bethel"),
                member("M2", "Kofi", "Bethel"),
                member("M3", "Esi", "Zion"),
            ],
        )
        .await
        .unwrap();
        svc
    }

    #[tokio::test]
    async fn resubmitting_a_session_overwrites_it() {
        let svc = seeded().await;
        let who = principal(Role::Member, Some("Bethel"));

        let first = svc
            .log_attendance(&who, register(day(2), "Bethel", &[("M1", true), ("M2", true)]))
            .await
            .unwrap();
        assert_eq!(first.present, 2);

        let second = svc
            .log_attendance(&who, register(day(2), "Bethel", &[("M1", false)]))
            .await
            .unwrap();
        assert_eq!((second.recorded, second.present), (1, 0));

        let stored = svc.session_attendance(&who, day(2), "Bethel").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].member_name, "Ama");
        assert!(!stored[0].present);
        assert_eq!(stored[0].recorded_by, who.username);
    }

    #[tokio::test]
    async fn rejects_bad_registers() {
        let svc = seeded().await;
        let who = admin();
        for bad in [
            register(day(2), "Bethel", &[]),
            register(day(2), " ", &[("M1", true)]),
            register(day(2), "Bethel", &[("M1", true), ("M1", false)]),
            register(day(2), "Bethel", &[("M404", true)]),
        ] {
            let err = svc.log_attendance(&who, bad).await.unwrap_err();
            assert!(matches!(err, ChurchError::InvalidInput(_)), "{err}");
        }
    }

    #[tokio::test]
    async fn register_only_accepts_members_of_its_cell() {
        let svc = seeded().await;
        let leader = principal(Role::Member, Some("Bethel"));
        let err = svc
            .log_attendance(&leader, register(day(2), "Bethel", &[("M1", true), ("M3", true)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChurchError::InvalidInput(_)), "{err}");

        let err = svc
            .log_attendance(&admin(), register(day(2), "Bethel", &[("M3", true)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChurchError::InvalidInput(_)), "{err}");
        assert!(svc.session_attendance(&admin(), day(2), "Bethel").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn leaders_are_confined_to_their_cell() {
        let svc = seeded().await;
        let leader = principal(Role::Member, Some("Bethel"));
        let err = svc
            .log_attendance(&leader, register(day(2), "Zion", &[("M3", true)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChurchError::Unauthorized));

        assert!(
            svc.log_attendance(&admin(), register(day(2), "Zion", &[("M3", true)]))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn rebuild_reports_at_risk_members_by_cell() {
        let svc = seeded().await;
        let who = admin();

        let outcome = svc.rebuild_at_risk(&who).await.unwrap();
        assert_eq!(outcome, SummaryOutcome::NotEnoughServices { have: 0, need: 3 });

        for d in [2, 9, 16] {
            svc.log_attendance(&who, register(day(d), "Bethel", &[("M1", false), ("M2", true)]))
                .await
                .unwrap();
            svc.log_attendance(&who, register(day(d), "Zion", &[("M3", false)]))
                .await
                .unwrap();
        }

        let outcome = svc.rebuild_at_risk(&who).await.unwrap();
        assert_eq!(outcome, SummaryOutcome::Rebuilt { at_risk: 2 });

        let all = svc.at_risk_members(&who).await.unwrap();
        assert_eq!(all.len(), 2);

        let leader = principal(Role::Member, Some("Bethel"));
        let mine = svc.at_risk_members(&leader).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].member_id, "M1");
        assert_eq!(mine[0].missed_count, 3);
    }
}
