use axum::{Json, extract::State};

use crate::middleware::{ChurchJson, ChurchQuery, Session};
use crate::service::SummaryOutcome;
use crate::service::attendance::AttendanceOutcome;
use crate::types::requests::{AttendanceSubmission, SessionQuery};
use crate::types::{AtRiskMember, AttendanceRecord};
use crate::{ChurchError, router::ChurchState};

/// GET /attendance?date=YYYY-MM-DD&group=... -> the stored register for a session.
pub async fn session(
    State(state): State<ChurchState>,
    Session(principal): Session,
    ChurchQuery(query): ChurchQuery<SessionQuery>,
) -> Result<Json<Vec<AttendanceRecord>>, ChurchError> {
    let rows = state
        .service
        .session_attendance(&principal, query.date, &query.group)
        .await?;
    Ok(Json(rows))
}

/// POST /attendance -> replaces the session's register.
pub async fn submit(
    State(state): State<ChurchState>,
    Session(principal): Session,
    ChurchJson(submission): ChurchJson<AttendanceSubmission>,
) -> Result<Json<AttendanceOutcome>, ChurchError> {
    Ok(Json(state.service.log_attendance(&principal, submission).await?))
}

pub async fn at_risk(
    State(state): State<ChurchState>,
    Session(principal): Session,
) -> Result<Json<Vec<AtRiskMember>>, ChurchError> {
    Ok(Json(state.service.at_risk_members(&principal).await?))
}

pub async fn rebuild(
    State(state): State<ChurchState>,
    Session(principal): Session,
) -> Result<Json<SummaryOutcome>, ChurchError> {
    Ok(Json(state.service.rebuild_at_risk(&principal).await?))
}
