use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum ChurchError {
    #[error("invalid username or password")]
    AuthenticationFailed,

    #[error("role is not permitted to perform this operation")]
    Unauthorized,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("username already exists: {0}")]
    UserExists(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("record store unavailable: {0}")]
    BackendUnavailable(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("blocking task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ChurchError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ChurchError::InvalidInput(msg.into())
    }
}

impl From<argon2::password_hash::Error> for ChurchError {
    fn from(e: argon2::password_hash::Error) -> Self {
        ChurchError::PasswordHash(e.to_string())
    }
}

impl From<JsonRejection> for ChurchError {
    fn from(rejection: JsonRejection) -> Self {
        ChurchError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ChurchError {
    fn from(rejection: QueryRejection) -> Self {
        ChurchError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ChurchError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            ChurchError::AuthenticationFailed => (
                StatusCode::UNAUTHORIZED,
                "AUTHENTICATION_FAILED",
                "Invalid username or password.".to_string(),
            ),
            ChurchError::Unauthorized => (
                StatusCode::FORBIDDEN,
                "UNAUTHORIZED",
                "You don't have permission to perform this operation.".to_string(),
            ),
            ChurchError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg),
            ChurchError::UserExists(name) => (
                StatusCode::CONFLICT,
                "USER_EXISTS",
                format!("Username already exists: {name}"),
            ),
            ChurchError::UserNotFound(name) => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                format!("User not found: {name}"),
            ),
            ChurchError::BackendUnavailable(e) => {
                error!(error = %e, "record store request failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "BACKEND_UNAVAILABLE",
                    "Record store is unavailable; check the server logs.".to_string(),
                )
            }
            other @ (ChurchError::Io(_)
            | ChurchError::Json(_)
            | ChurchError::PasswordHash(_)
            | ChurchError::RactorError(_)
            | ChurchError::TaskJoin(_)) => {
                error!(error = %other, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred.".to_string(),
                )
            }
        };
        let body = ApiErrorBody {
            code: code.to_string(),
            message,
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
