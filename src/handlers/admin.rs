use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::middleware::{ChurchJson, Session};
use crate::service::reports::Reports;
use crate::types::User;
use crate::types::requests::{NewUserRequest, UserUpdate};
use crate::{ChurchError, router::ChurchState};

pub async fn list_users(
    State(state): State<ChurchState>,
    Session(principal): Session,
) -> Result<Json<Vec<User>>, ChurchError> {
    Ok(Json(state.service.list_users(&principal).await?))
}

pub async fn create_user(
    State(state): State<ChurchState>,
    Session(principal): Session,
    ChurchJson(req): ChurchJson<NewUserRequest>,
) -> Result<(StatusCode, Json<User>), ChurchError> {
    let user = state.service.create_user(&principal, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /users/{username} -> in-place update of password, role or cell.
pub async fn update_user(
    State(state): State<ChurchState>,
    Session(principal): Session,
    Path(username): Path<String>,
    ChurchJson(update): ChurchJson<UserUpdate>,
) -> Result<Json<User>, ChurchError> {
    Ok(Json(
        state
            .service
            .update_user(&principal, &username, update)
            .await?,
    ))
}

pub async fn reports(
    State(state): State<ChurchState>,
    Session(principal): Session,
) -> Result<Json<Reports>, ChurchError> {
    Ok(Json(state.service.reports(&principal).await?))
}
