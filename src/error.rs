use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Unified error type returned by every handler.
///
/// Client-input failures carry a human-readable message; storage and other
/// internal failures are logged and surface as an opaque 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("email address already in use")]
    DuplicateEmail,

    /// Same message for unknown email and wrong password so callers cannot
    /// probe which accounts exist.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// No bearer token on a guarded route.
    #[error("authentication token required")]
    Unauthenticated,

    /// Token present but failed verification (bad signature, malformed,
    /// or expired).
    #[error("invalid or expired token")]
    Forbidden,

    #[error("storage error")]
    Storage(#[source] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Error body shape: `{"message": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingField(_) | ApiError::DuplicateEmail => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                "internal server error".to_string()
            }
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal failure");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // The UNIQUE constraint on users.email is the final arbiter for
        // racing writers; the handler pre-checks are only an optimization.
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return ApiError::DuplicateEmail;
            }
        }
        ApiError::Storage(err)
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ApiError::Internal(err.into())
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ApiError::Internal(err.into())
    }
}
