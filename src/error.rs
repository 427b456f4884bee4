use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::InvalidEvent;
use crate::services::UploadError;
use crate::store::StoreError;

/// Ошибки на границе HTTP API. Каждая превращается в `{success: false, error}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("Not enough tickets available")]
    Capacity,
    #[error("{0}")]
    Persistence(String),
    #[error("{0}")]
    Remote(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Capacity => StatusCode::CONFLICT,
            ApiError::Persistence(_) | ApiError::Remote(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Логирует исходную ошибку хранилища, наружу уходит только `message`.
    pub fn persistence(message: &str, source: impl std::fmt::Debug) -> Self {
        tracing::error!("{}: {:?}", message, source);
        ApiError::Persistence(message.to_string())
    }

    /// `message` - что показать клиенту при сбое самого хранилища.
    pub fn from_store(message: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Event not found".to_string()),
            StoreError::InsufficientTickets => ApiError::Capacity,
            StoreError::Database(e) => ApiError::persistence(message, e),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Invalid(message) => ApiError::Validation(message),
            UploadError::MissingPermission => {
                ApiError::Forbidden(UploadError::MissingPermission.to_string())
            }
            UploadError::Remote(message) => ApiError::Remote(message),
        }
    }
}

impl From<InvalidEvent> for ApiError {
    fn from(err: InvalidEvent) -> Self {
        ApiError::Validation(err.0)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
