use axum::extract::FromRef;
use axum::{
    Json, Router,
    routing::{get, patch, post, put},
};
use axum_extra::extract::cookie::Key;
use serde_json::{Value, json};
use tracing::warn;

use crate::config::BasicConfig;
use crate::handlers::{admin, announcements, attendance, auth, finance, members};
use crate::service::ChurchService;

/// One year.
pub const MAX_SESSION_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub secure: bool,
    pub session_hours: i64,
}

#[derive(Clone)]
pub struct ChurchState {
    pub service: ChurchService,
    pub cookies: CookieSettings,
    key: Key,
}

impl ChurchState {
    pub fn new(service: ChurchService, cfg: &BasicConfig) -> Self {
        let key = match cfg.session_key.as_deref() {
            Some(secret) => Key::try_from(secret.as_bytes()).unwrap_or_else(|e| {
                warn!(error = %e, "session_key shorter than 64 bytes; using a random key");
                Key::generate()
            }),
            None => {
                warn!("no session_key configured; sessions will not survive a restart");
                Key::generate()
            }
        };
        Self {
            service,
            cookies: CookieSettings {
                secure: !cfg.insecure_cookie,
                session_hours: cfg.session_hours.clamp(1, MAX_SESSION_HOURS),
            },
            key,
        }
    }
}

impl FromRef<ChurchState> for Key {
    fn from_ref(state: &ChurchState) -> Self {
        state.key.clone()
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn church_router(state: ChurchState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/password", put(auth::change_password))
        .route("/members", get(members::search).put(members::upsert))
        .route("/members/groups", get(members::groups))
        .route(
            "/attendance",
            get(attendance::session).post(attendance::submit),
        )
        .route("/at-risk", get(attendance::at_risk))
        .route("/at-risk/rebuild", post(attendance::rebuild))
        .route(
            "/offerings",
            get(finance::recent_offerings).post(finance::record_offering),
        )
        .route(
            "/welfare",
            get(finance::recent_welfare).post(finance::record_welfare),
        )
        .route(
            "/announcements",
            get(announcements::list).post(announcements::post),
        )
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{username}", patch(admin::update_user))
        .route("/reports", get(admin::reports))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::service;

    #[tokio::test]
    async fn session_lifetime_is_clamped() {
        let mut cfg = BasicConfig::default();
        cfg.session_hours = i64::MAX;
        let state = ChurchState::new(service().await, &cfg);
        assert_eq!(state.cookies.session_hours, MAX_SESSION_HOURS);

        cfg.session_hours = -3;
        let state = ChurchState::new(service().await, &cfg);
        assert_eq!(state.cookies.session_hours, 1);
    }
}
