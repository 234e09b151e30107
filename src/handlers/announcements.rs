use axum::{Json, extract::State, http::StatusCode};

use crate::middleware::{ChurchJson, Session};
use crate::types::Announcement;
use crate::types::requests::AnnouncementRequest;
use crate::{ChurchError, router::ChurchState};

pub async fn list(
    State(state): State<ChurchState>,
    Session(principal): Session,
) -> Result<Json<Vec<Announcement>>, ChurchError> {
    Ok(Json(state.service.announcements(&principal).await?))
}

pub async fn post(
    State(state): State<ChurchState>,
    Session(principal): Session,
    ChurchJson(req): ChurchJson<AnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>), ChurchError> {
    let posted = state.service.post_announcement(&principal, req).await?;
    Ok((StatusCode::CREATED, Json(posted)))
}
