// Error and outcome mapping to HTTP responses
use crate::application::collection_repository::RepositoryError;
use crate::domain::outcome::Outcome;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::UnknownCollection(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Repository(RepositoryError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Repository(RepositoryError::Status { status, .. })
                if (400..500).contains(status) =>
            {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Repository(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Loaded and empty outcomes are 200; a failed fetch is a 502 so clients
/// can tell it apart from an empty collection without parsing the body.
pub fn outcome_response<T: Serialize>(outcome: Outcome<T>) -> Response {
    let status = if outcome.is_failed() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    (status, Json(outcome)).into_response()
}
