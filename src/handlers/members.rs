use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::middleware::{ChurchJson, ChurchQuery, Session};
use crate::types::Member;
use crate::types::requests::SearchQuery;
use crate::{ChurchError, router::ChurchState};

/// GET /members?q=... -> case-insensitive name/group search.
pub async fn search(
    State(state): State<ChurchState>,
    Session(principal): Session,
    ChurchQuery(query): ChurchQuery<SearchQuery>,
) -> Result<Json<Vec<Member>>, ChurchError> {
    let found = state
        .service
        .search_members(&principal, query.q.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(found))
}

pub async fn groups(
    State(state): State<ChurchState>,
    Session(principal): Session,
) -> Result<Json<Vec<String>>, ChurchError> {
    Ok(Json(state.service.home_cell_groups(&principal).await?))
}

/// PUT /members -> bulk upsert by member_id (admin).
pub async fn upsert(
    State(state): State<ChurchState>,
    Session(principal): Session,
    ChurchJson(members): ChurchJson<Vec<Member>>,
) -> Result<Json<Value>, ChurchError> {
    let count = state.service.upsert_members(&principal, members).await?;
    Ok(Json(json!({ "upserted": count })))
}
