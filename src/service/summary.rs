use crate::types::{AtRiskMember, AttendanceRecord, Member};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtRiskPolicy {
    /// Number of most recent distinct service dates considered.
    pub window: usize,
    /// Minimum missed services within the window.
    pub missed_threshold: usize,
}

impl Default for AtRiskPolicy {
    fn default() -> Self {
        Self {
            window: 3,
            missed_threshold: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummaryOutcome {
    NotEnoughServices { have: usize, need: usize },
    Rebuilt { at_risk: usize },
}

/// Most recent `window` distinct service dates, newest first.
pub fn recent_service_dates(attendance: &[AttendanceRecord], window: usize) -> Vec<NaiveDate> {
    let dates: BTreeSet<NaiveDate> = attendance.iter().map(|r| r.service_date).collect();
    dates.into_iter().rev().take(window).collect()
}

/// Compute the at-risk table. `Err(have)` when fewer than `policy.window`
/// distinct service dates exist.
///
/// A member without a record on a date counts as having missed it. Members
/// who attended any service in the window are never at risk.
pub fn compute_at_risk(
    members: &[Member],
    attendance: &[AttendanceRecord],
    policy: AtRiskPolicy,
    now: DateTime<Utc>,
) -> Result<Vec<AtRiskMember>, usize> {
    let window = policy.window.max(1);
    let dates = recent_service_dates(attendance, window);
    if dates.len() < window {
        return Err(dates.len());
    }

    let present: HashSet<(&str, NaiveDate)> = attendance
        .iter()
        .filter(|r| r.present)
        .map(|r| (r.member_id.as_str(), r.service_date))
        .collect();

    let rows = members
        .iter()
        .filter_map(|m| {
            let flags: Vec<bool> = dates
                .iter()
                .map(|d| present.contains(&(m.member_id.as_str(), *d)))
                .collect();
            let missed_count = flags.iter().filter(|p| !**p).count();
            let attended_any = flags.iter().any(|p| *p);
            (missed_count >= policy.missed_threshold && !attended_any).then(|| AtRiskMember {
                member_id: m.member_id.clone(),
                member_name: m.name.clone(),
                home_cell_group: m.home_cell_group.clone(),
                phone: m.phone.clone(),
                recent_attendance: flags,
                missed_count,
                updated_at: now,
            })
        })
        .collect();
    Ok(rows)
}
