use axum::{Json, extract::State, http::StatusCode};

use crate::middleware::{ChurchJson, ChurchQuery, Session};
use crate::service::finance::WelfareOutcome;
use crate::types::requests::{LimitQuery, OfferingRequest, WelfareSubmission};
use crate::types::{OfferingRecord, WelfareContribution};
use crate::{ChurchError, router::ChurchState};

pub async fn record_offering(
    State(state): State<ChurchState>,
    Session(principal): Session,
    ChurchJson(req): ChurchJson<OfferingRequest>,
) -> Result<(StatusCode, Json<OfferingRecord>), ChurchError> {
    let record = state.service.record_offering(&principal, req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn recent_offerings(
    State(state): State<ChurchState>,
    Session(principal): Session,
    ChurchQuery(query): ChurchQuery<LimitQuery>,
) -> Result<Json<Vec<OfferingRecord>>, ChurchError> {
    Ok(Json(
        state.service.recent_offerings(&principal, query.limit).await?,
    ))
}

pub async fn record_welfare(
    State(state): State<ChurchState>,
    Session(principal): Session,
    ChurchJson(submission): ChurchJson<WelfareSubmission>,
) -> Result<(StatusCode, Json<WelfareOutcome>), ChurchError> {
    let outcome = state.service.record_welfare(&principal, submission).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn recent_welfare(
    State(state): State<ChurchState>,
    Session(principal): Session,
    ChurchQuery(query): ChurchQuery<LimitQuery>,
) -> Result<Json<Vec<WelfareContribution>>, ChurchError> {
    Ok(Json(
        state.service.recent_welfare(&principal, query.limit).await?,
    ))
}
