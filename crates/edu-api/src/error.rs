use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use edu_db::StoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound("Scheduled test not found".to_string()),
            StoreError::Persistence(e) => Self::Database(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, retryable) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), false),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), false),
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error while handling request");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage is temporarily unavailable, please retry".to_string(),
                    true,
                )
            }
        };

        (
            status,
            Json(json!({
                "error": message,
                "retryable": retryable,
            })),
        )
            .into_response()
    }
}
