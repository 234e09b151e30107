use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use time::Duration;
use tracing::debug;

use crate::error::ChurchError;
use crate::router::{ChurchState, CookieSettings};
use crate::service::Principal;

pub const SESSION_COOKIE: &str = "church_session";

/// The signed-in caller. The cookie only carries the username; role and
/// home cell are re-read from the user table on every request.
#[derive(Debug, Clone)]
pub struct Session(pub Principal);

impl FromRequestParts<ChurchState> for Session {
    type Rejection = ChurchError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ChurchState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(jar) = PrivateCookieJar::<Key>::from_request_parts(parts, state).await;
        let Some(username) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
            debug!("request without a valid session cookie");
            return Err(ChurchError::AuthenticationFailed);
        };
        let principal = state.service.gate().resolve(&username).await?;
        Ok(Self(principal))
    }
}

pub fn session_cookie(username: &str, settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, username.to_string()))
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(settings.session_hours))
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
