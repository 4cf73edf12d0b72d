use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(sqlx::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("No price data available for {0}")]
    NoPriceData(String),
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Insufficient shares")]
    InsufficientShares,
    #[error("Amount too small to purchase any shares")]
    AmountTooSmall,
    #[error("Conflicting state: {0}")]
    ConflictingState(String),
    #[error("Rate limited by external provider")]
    RateLimited,
    #[error("External error: {0}")]
    External(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not authorized for this family")]
    Forbidden,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NoPriceData(ticker) => (
                StatusCode::BAD_REQUEST,
                format!("No price data available for {}", ticker),
            ),
            AppError::InsufficientBalance => {
                (StatusCode::BAD_REQUEST, "Insufficient balance".to_string())
            }
            AppError::InsufficientShares => {
                (StatusCode::BAD_REQUEST, "Insufficient shares".to_string())
            }
            AppError::AmountTooSmall => (
                StatusCode::BAD_REQUEST,
                "Amount too small to purchase any shares".to_string(),
            ),
            AppError::ConflictingState(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Not authorized".to_string()),
            AppError::RateLimited => {
                let mut headers = HeaderMap::new();
                headers.insert("Retry-After", HeaderValue::from_static("60"));
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    headers,
                    Json(json!({ "error": "Rate limited" })),
                )
                    .into_response();
            }
            AppError::External(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            // Original cause is logged at the call site; clients get a generic message.
            AppError::Db(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        AppError::Db(value)
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}

/// True when the error is a Postgres unique-constraint violation, optionally
/// on a specific named constraint.
pub fn is_unique_violation(err: &sqlx::Error, constraint: Option<&str>) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return match constraint {
                Some(name) => db_err.constraint() == Some(name),
                None => true,
            };
        }
    }
    false
}
