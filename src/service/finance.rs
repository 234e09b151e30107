use super::{ChurchService, Principal};
use crate::error::ChurchError;
use crate::types::requests::{OfferingRequest, WelfareSubmission};
use crate::types::{Amount, OfferingRecord, Operation, WelfareContribution};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WelfareOutcome {
    pub recorded: usize,
    pub total: Amount,
    pub currency: String,
}

fn positive_amount(value: f64) -> Result<Amount, ChurchError> {
    Amount::from_major(value)
        .filter(|a| a.is_positive())
        .ok_or_else(|| ChurchError::invalid(format!("amount must be greater than zero, got {value}")))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ChurchService {
    /// Append one offering or tithe to the ledger.
    pub async fn record_offering(
        &self,
        principal: &Principal,
        req: OfferingRequest,
    ) -> Result<OfferingRecord, ChurchError> {
        principal.require(Operation::RecordOffering)?;
        let amount = positive_amount(req.amount)?;

        let now = Utc::now();
        let mut record = OfferingRecord {
            id: 0,
            service_date: req.service_date.unwrap_or_else(|| now.date_naive()),
            member_id: trimmed(req.member_id),
            amount,
            category: req.category,
            description: trimmed(req.description),
            entered_by: principal.username.clone(),
            recorded_at: now,
        };
        record.id = self.store.insert_offering(&record).await?;

        info!(
            by = %principal.username,
            id = record.id,
            amount = %record.amount,
            currency = %self.settings.currency,
            category = record.category.as_str(),
            "offering recorded"
        );
        Ok(record)
    }

    pub async fn recent_offerings(
        &self,
        principal: &Principal,
        limit: Option<usize>,
    ) -> Result<Vec<OfferingRecord>, ChurchError> {
        principal.require(Operation::ViewReports)?;
        self.store
            .list_offerings(Some(limit.unwrap_or(self.settings.recent_limit)))
            .await
    }

    /// Record a batch of welfare contributions. Zero amounts are skipped.
    pub async fn record_welfare(
        &self,
        principal: &Principal,
        submission: WelfareSubmission,
    ) -> Result<WelfareOutcome, ChurchError> {
        principal.require(Operation::RecordWelfare)?;

        let mut seen = HashSet::new();
        let mut contributing = Vec::new();
        for entry in submission.entries {
            let id = entry.member_id.trim().to_string();
            if !seen.insert(id.clone()) {
                return Err(ChurchError::invalid(format!("member `{id}` appears more than once")));
            }
            if entry.amount == 0.0 {
                continue;
            }
            contributing.push((id, positive_amount(entry.amount)?));
        }
        if contributing.is_empty() {
            return Err(ChurchError::invalid("no amounts entered"));
        }

        let index = self.member_index().await?;
        let now = Utc::now();
        let service_date = submission.service_date.unwrap_or_else(|| now.date_naive());
        let rows = contributing
            .into_iter()
            .map(|(id, amount)| {
                let member = index
                    .get(&id)
                    .ok_or_else(|| ChurchError::invalid(format!("unknown member `{id}`")))?;
                Ok(WelfareContribution {
                    id: 0,
                    service_date,
                    member_id: id,
                    member_name: member.name.clone(),
                    home_cell_group: member.home_cell_group.clone(),
                    amount,
                    collected_by: principal.username.clone(),
                    recorded_at: now,
                })
            })
            .collect::<Result<Vec<_>, ChurchError>>()?;

        self.store.insert_welfare(&rows).await?;
        let total: Amount = rows.iter().map(|r| r.amount).sum();
        info!(
            by = %principal.username,
            entries = rows.len(),
            total = %total,
            "welfare contributions recorded"
        );
        Ok(WelfareOutcome {
            recorded: rows.len(),
            total,
            currency: self.settings.currency.clone(),
        })
    }

    pub async fn recent_welfare(
        &self,
        principal: &Principal,
        limit: Option<usize>,
    ) -> Result<Vec<WelfareContribution>, ChurchError> {
        principal.require(Operation::RecordWelfare)?;
        self.store
            .list_welfare(Some(limit.unwrap_or(self.settings.recent_limit)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{admin, member, principal, service};
    use crate::types::requests::WelfareEntry;
    use crate::types::{OfferingCategory, Role};

    fn offering(amount: f64) -> OfferingRequest {
        OfferingRequest {
            service_date: None,
            member_id: None,
            amount,
            category: OfferingCategory::SundayService,
            description: Some("  ".into()),
        }
    }

    #[tokio::test]
    async fn non_positive_offerings_are_rejected() {
        let svc = service().await;
        let acct = principal(Role::Accountant, None);
        for bad in [-5.0, 0.0, f64::NAN, 0.001] {
            let err = svc.record_offering(&acct, offering(bad)).await.unwrap_err();
            assert!(matches!(err, ChurchError::InvalidInput(_)), "{bad}");
        }
        assert!(svc.recent_offerings(&acct, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn valid_offering_appends_exactly_one_record() {
        let svc = service().await;
        let acct = principal(Role::Accountant, None);
        let rec = svc.record_offering(&acct, offering(100.0)).await.unwrap();
        assert_eq!(rec.amount, Amount::from_minor(10_000));
        assert_eq!(rec.description, None);
        assert_eq!(rec.entered_by, acct.username);

        let all = svc.recent_offerings(&acct, None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, rec.id);
    }

    #[tokio::test]
    async fn members_cannot_record_offerings() {
        let svc = service().await;
        let err = svc
            .record_offering(&principal(Role::Member, None), offering(10.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ChurchError::Unauthorized));
    }

    #[tokio::test]
    async fn welfare_skips_zero_entries() {
        let svc = service().await;
        svc.upsert_members(
            &admin(),
            vec![member("M1", "Ama", "Bethel"), member("M2", "Kofi", "Zion")],
        )
        .await
        .unwrap();
        let who = principal(Role::Member, None);

        let submission = |entries: Vec<(&str, f64)>| WelfareSubmission {
            service_date: None,
            entries: entries
                .into_iter()
                .map(|(id, amount)| WelfareEntry {
                    member_id: id.to_string(),
                    amount,
                })
                .collect(),
        };

        let out = svc
            .record_welfare(&who, submission(vec![("M1", 5.0), ("M2", 0.0)]))
            .await
            .unwrap();
        assert_eq!(out.recorded, 1);
        assert_eq!(out.total, Amount::from_minor(500));

        let err = svc
            .record_welfare(&who, submission(vec![("M1", 0.0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChurchError::InvalidInput(msg) if msg == "no amounts entered"));

        let err = svc
            .record_welfare(&who, submission(vec![("M1", -2.0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChurchError::InvalidInput(_)));

        let recent = svc.recent_welfare(&who, None).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].home_cell_group, "Bethel");
    }
}
