use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::UserId;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Unknown user: {0}")]
    UnknownVertex(UserId),

    #[error("Users {0} and {1} are not matched")]
    NotAdjacent(UserId, UserId),

    #[error("Cannot match user {0} with themselves")]
    SelfEdge(UserId),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid rating: {0}")]
    InvalidRating(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Ingestion error: {0}")]
    Ingestion(#[from] csv::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::UnknownVertex(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotAdjacent(_, _) => StatusCode::CONFLICT,
            AppError::SelfEdge(_)
            | AppError::InvalidRating(_)
            | AppError::InvalidInput(_)
            | AppError::Ingestion(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_)
            | AppError::Cache(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
