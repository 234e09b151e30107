use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ChurchError;

/// JSON body whose rejections render as `INVALID_INPUT`.
#[derive(Debug, Clone)]
pub struct ChurchJson<T>(pub T);

impl<T, S> FromRequest<S> for ChurchJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ChurchError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Query string whose rejections render as `INVALID_INPUT`.
#[derive(Debug, Clone)]
pub struct ChurchQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ChurchQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ChurchError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
