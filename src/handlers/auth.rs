use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::info;

use crate::middleware::auth::{clear_session_cookie, session_cookie};
use crate::middleware::{ChurchJson, Session};
use crate::service::Principal;
use crate::types::requests::{ChangePasswordRequest, LoginRequest};
use crate::{ChurchError, router::ChurchState};

/// POST /auth/login -> verifies credentials and sets the session cookie.
pub async fn login(
    State(state): State<ChurchState>,
    jar: PrivateCookieJar,
    ChurchJson(req): ChurchJson<LoginRequest>,
) -> Result<(PrivateCookieJar, Json<Principal>), ChurchError> {
    let principal = state.service.login(&req.username, &req.password).await?;
    let jar = jar.add(session_cookie(&principal.username, &state.cookies));
    info!(username = %principal.username, role = %principal.role, "login succeeded");
    Ok((jar, Json(principal)))
}

/// POST /auth/logout -> drops the session cookie.
pub async fn logout(jar: PrivateCookieJar) -> (PrivateCookieJar, StatusCode) {
    (jar.remove(clear_session_cookie()), StatusCode::NO_CONTENT)
}

pub async fn me(Session(principal): Session) -> Json<Principal> {
    Json(principal)
}

pub async fn change_password(
    State(state): State<ChurchState>,
    Session(principal): Session,
    ChurchJson(req): ChurchJson<ChangePasswordRequest>,
) -> Result<StatusCode, ChurchError> {
    state.service.change_own_password(&principal, req).await?;
    Ok(StatusCode::NO_CONTENT)
}
