use super::{ChurchService, Principal};
use crate::error::ChurchError;
use crate::types::{Amount, Operation};
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceReport {
    pub total_records: usize,
    pub present: usize,
    /// Percentage of records marked present; 0 with no records.
    pub rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WelfareReport {
    pub total: Amount,
    pub contributors: usize,
    pub records: usize,
    pub today: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferingReport {
    pub total: Amount,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryReport {
    pub members: usize,
    pub groups: usize,
    pub members_by_group: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reports {
    pub currency: String,
    pub attendance: AttendanceReport,
    pub welfare: WelfareReport,
    pub offerings: OfferingReport,
    pub directory: DirectoryReport,
}

impl ChurchService {
    pub async fn reports(&self, principal: &Principal) -> Result<Reports, ChurchError> {
        principal.require(Operation::ViewReports)?;

        let attendance = self.store.list_attendance().await?;
        let present = attendance.iter().filter(|r| r.present).count();
        let rate_percent = if attendance.is_empty() {
            0.0
        } else {
            present as f64 * 100.0 / attendance.len() as f64
        };

        let today = Utc::now().date_naive();
        let welfare = self.store.list_welfare(None).await?;
        let contributors: HashSet<&str> = welfare.iter().map(|w| w.member_id.as_str()).collect();
        let welfare_report = WelfareReport {
            total: welfare.iter().map(|w| w.amount).sum(),
            contributors: contributors.len(),
            records: welfare.len(),
            today: welfare
                .iter()
                .filter(|w| w.service_date == today)
                .map(|w| w.amount)
                .sum(),
        };

        let offerings = self.store.list_offerings(None).await?;

        let members = self.store.list_members().await?;
        let mut members_by_group = BTreeMap::new();
        for m in &members {
            *members_by_group.entry(m.home_cell_group.clone()).or_insert(0) += 1;
        }

        Ok(Reports {
            currency: self.settings.currency.clone(),
            attendance: AttendanceReport {
                total_records: attendance.len(),
                present,
                rate_percent,
            },
            welfare: welfare_report,
            offerings: OfferingReport {
                total: offerings.iter().map(|o| o.amount).sum(),
                records: offerings.len(),
            },
            directory: DirectoryReport {
                members: members.len(),
                groups: members_by_group.len(),
                members_by_group,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{admin, member, principal, service};
    use crate::types::requests::{AttendanceEntry, AttendanceSubmission, OfferingRequest};
    use crate::types::{OfferingCategory, Role};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn empty_store_reports_zeroes() {
        let svc = service().await;
        let r = svc.reports(&principal(Role::Accountant, None)).await.unwrap();
        assert_eq!(r.attendance.rate_percent, 0.0);
        assert_eq!(r.offerings.total, Amount::ZERO);
        assert_eq!(r.directory.members, 0);
        assert_eq!(r.currency, "GHS");
    }

    #[tokio::test]
    async fn members_cannot_view_reports() {
        let svc = service().await;
        assert!(matches!(
            svc.reports(&principal(Role::Member, None)).await,
            Err(ChurchError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn totals_cover_every_ledger() {
        let svc = service().await;
        let who = admin();
        svc.upsert_members(
            &who,
            vec![
                member("M1", "Ama", "Bethel"),
                member("M2", "Kofi", "Bethel"),
                member("M3", "Esi", "Zion"),
                member("M4", "Yaw", "Zion"),
            ],
        )
        .await
        .unwrap();
        let registers = [
            ("Bethel", [("M1", true), ("M2", true)]),
            ("Zion", [("M3", true), ("M4", false)]),
        ];
        for (group, ids) in registers {
            svc.log_attendance(
                &who,
                AttendanceSubmission {
                    service_date: NaiveDate::from_ymd_opt(2024, 7, 7).unwrap(),
                    home_cell_group: group.into(),
                    entries: ids
                        .iter()
                        .map(|(id, present)| AttendanceEntry {
                            member_id: id.to_string(),
                            present: *present,
                        })
                        .collect(),
                },
            )
            .await
            .unwrap();
        }
        for amount in [50.0, 25.5] {
            svc.record_offering(
                &who,
                OfferingRequest {
                    service_date: None,
                    member_id: None,
                    amount,
                    category: OfferingCategory::Tithe,
                    description: None,
                },
            )
            .await
            .unwrap();
        }

        let r = svc.reports(&who).await.unwrap();
        assert_eq!(r.attendance.total_records, 4);
        assert_eq!(r.attendance.present, 3);
        assert_eq!(r.attendance.rate_percent, 75.0);
        assert_eq!(r.offerings.total, Amount::from_minor(7550));
        assert_eq!(r.offerings.records, 2);
        assert_eq!(r.directory.groups, 2);
        assert_eq!(r.directory.members_by_group.get("Zion"), Some(&2));
    }
}
